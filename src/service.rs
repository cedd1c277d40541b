use crate::error::Result;
use crate::guard::{GuardProbe, LifecycleGuard, LifecycleState};
use std::ops::Deref;
use tracing::{debug, error, info, warn};

/// A component whose start/stop logic runs only when its guard allows it.
///
/// Implementors supply the hooks and the guard; `start` and `stop` are
/// provided and should not normally be overridden.
pub trait Service {
    /// Name used in log output
    fn name(&self) -> &str;

    fn lifecycle(&self) -> &LifecycleGuard;

    /// Component start logic, run at most once
    fn on_start(&self) -> Result<()>;

    /// Component stop logic, run at most once.
    ///
    /// Also runs when a service that never started is retired with `stop`.
    fn on_stop(&self) -> Result<()>;

    /// Start the service.
    ///
    /// `Ok(false)` means the guard refused and `on_start` did not run. If
    /// `on_start` fails the guard stays `Started`; call `stop` to retire it.
    fn start(&self) -> Result<bool> {
        if !self.lifecycle().start() {
            debug!(
                "Service '{}' start ignored, already {}",
                self.name(),
                self.lifecycle().state()
            );
            return Ok(false);
        }

        info!("Starting service '{}'", self.name());
        self.on_start().map_err(|e| {
            error!("Service '{}' failed to start: {}", self.name(), e);
            e
        })?;

        info!("Service '{}' started", self.name());
        Ok(true)
    }

    /// Stop the service, whether or not it was started.
    ///
    /// `Ok(false)` means it was already stopped and `on_stop` did not run.
    fn stop(&self) -> Result<bool> {
        if !self.lifecycle().stop() {
            debug!("Service '{}' already stopped", self.name());
            return Ok(false);
        }

        info!("Stopping service '{}'", self.name());
        self.on_stop().map_err(|e| {
            error!("Service '{}' failed to stop cleanly: {}", self.name(), e);
            e
        })?;

        info!("Service '{}' stopped", self.name());
        Ok(true)
    }

    fn state(&self) -> LifecycleState {
        self.lifecycle().state()
    }

    fn is_running(&self) -> bool {
        self.state() == LifecycleState::Started
    }
}

/// Owner of a service that stops it on drop if it is still running.
///
/// A service dropped before it was ever started is discarded without running
/// `on_stop`.
pub struct Managed<S: Service> {
    // Always `Some` until `into_inner` or drop
    service: Option<S>,
}

impl<S: Service> Managed<S> {
    pub fn new(service: S) -> Self {
        Self {
            service: Some(service),
        }
    }

    /// Probe that keeps reporting state after this wrapper is dropped
    pub fn probe(&self) -> GuardProbe {
        self.lifecycle().probe()
    }

    /// Give up ownership without running the teardown.
    ///
    /// The guard's own `Drop` still stops the flags later, but `on_stop` is
    /// then the caller's business.
    pub fn into_inner(mut self) -> S {
        self.service
            .take()
            .expect("managed service is present until into_inner or drop")
    }

    fn teardown(service: &S) {
        if !service.lifecycle().destructor_check() {
            return;
        }

        warn!(
            "Service '{}' dropped while running, stopping it",
            service.name()
        );
        if let Err(e) = service.on_stop() {
            warn!("Service '{}' teardown failed: {}", service.name(), e);
        }
    }
}

impl<S: Service> Deref for Managed<S> {
    type Target = S;

    fn deref(&self) -> &S {
        self.service
            .as_ref()
            .expect("managed service is present until into_inner or drop")
    }
}

impl<S: Service> From<S> for Managed<S> {
    fn from(service: S) -> Self {
        Self::new(service)
    }
}

impl<S: Service> Drop for Managed<S> {
    fn drop(&mut self) {
        if let Some(service) = self.service.take() {
            Self::teardown(&service);
        }
    }
}
