//! Scripted driving of a demo worker through lifecycle transitions.

use crate::config::ServiceConfig;
use crate::error::{Result, StartStopError};
use crate::guard::{GuardProbe, LifecycleGuard, LifecycleState};
use crate::service::{Managed, Service};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, info};

/// One scripted action against the worker
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Step {
    Start,
    Stop,
    /// Drop the worker and let teardown run
    #[serde(alias = "drop")]
    Release,
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Step::Start => "start",
            Step::Stop => "stop",
            Step::Release => "release",
        };
        f.pad(name)
    }
}

impl FromStr for Step {
    type Err = StartStopError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "start" => Ok(Step::Start),
            "stop" => Ok(Step::Stop),
            "release" | "drop" => Ok(Step::Release),
            other => Err(StartStopError::system(format!("Unknown step '{}'", other))),
        }
    }
}

/// Hook invocation counters, shared so they survive the worker
#[derive(Debug, Default)]
pub struct WorkerStats {
    start_calls: AtomicU64,
    stop_calls: AtomicU64,
}

impl WorkerStats {
    pub fn start_calls(&self) -> u64 {
        self.start_calls.load(Ordering::Relaxed)
    }

    pub fn stop_calls(&self) -> u64 {
        self.stop_calls.load(Ordering::Relaxed)
    }
}

/// Demo service that only counts its hook calls
pub struct Worker {
    name: String,
    guard: LifecycleGuard,
    fail_on_start: bool,
    stats: Arc<WorkerStats>,
}

impl Worker {
    pub fn new<S: Into<String>>(name: S) -> Self {
        Self {
            name: name.into(),
            guard: LifecycleGuard::new(),
            fail_on_start: false,
            stats: Arc::new(WorkerStats::default()),
        }
    }

    pub fn from_config(config: &ServiceConfig) -> Self {
        Self::new(config.name.clone()).with_fail_on_start(config.fail_on_start)
    }

    pub fn with_fail_on_start(mut self, fail: bool) -> Self {
        self.fail_on_start = fail;
        self
    }

    pub fn stats(&self) -> Arc<WorkerStats> {
        Arc::clone(&self.stats)
    }
}

impl Service for Worker {
    fn name(&self) -> &str {
        &self.name
    }

    fn lifecycle(&self) -> &LifecycleGuard {
        &self.guard
    }

    fn on_start(&self) -> Result<()> {
        self.stats.start_calls.fetch_add(1, Ordering::Relaxed);
        if self.fail_on_start {
            return Err(StartStopError::component(
                self.name.as_str(),
                "configured to fail on start",
            ));
        }
        Ok(())
    }

    fn on_stop(&self) -> Result<()> {
        self.stats.stop_calls.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }
}

/// Result of a single scripted step
#[derive(Debug, Clone, PartialEq)]
pub struct StepOutcome {
    pub step: Step,
    /// Whether the guard granted the transition
    pub applied: bool,
    /// Guard state after the step
    pub state: LifecycleState,
    pub error: Option<String>,
}

impl fmt::Display for StepOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let verdict = if self.applied { "applied" } else { "ignored" };
        write!(f, "{:<8} {:<8} -> {}", self.step, verdict, self.state)?;
        if let Some(error) = &self.error {
            write!(f, " (error: {})", error)?;
        }
        Ok(())
    }
}

/// Drives a managed worker through a list of steps
pub struct ScriptRunner {
    worker: Option<Managed<Worker>>,
    probe: GuardProbe,
    stats: Arc<WorkerStats>,
}

impl ScriptRunner {
    pub fn new(worker: Worker) -> Self {
        let stats = worker.stats();
        let managed = Managed::new(worker);
        let probe = managed.probe();

        Self {
            worker: Some(managed),
            probe,
            stats,
        }
    }

    pub fn from_config(config: &ServiceConfig) -> Self {
        Self::new(Worker::from_config(config))
    }

    /// Run every step in order
    pub fn run(&mut self, steps: &[Step]) -> Vec<StepOutcome> {
        info!("Running {} scripted steps", steps.len());
        steps.iter().map(|step| self.step(*step)).collect()
    }

    pub fn step(&mut self, step: Step) -> StepOutcome {
        let (applied, error) = match (step, self.worker.as_ref()) {
            (_, None) => {
                debug!("Step '{}' ignored, worker already released", step);
                (false, None)
            }
            (Step::Start, Some(worker)) => Self::split(worker.start()),
            (Step::Stop, Some(worker)) => Self::split(worker.stop()),
            (Step::Release, Some(_)) => (true, None),
        };

        if step == Step::Release {
            // Dropping the managed worker runs its teardown
            self.worker = None;
        }

        let outcome = StepOutcome {
            step,
            applied,
            state: self.probe.state(),
            error,
        };
        debug!("Step outcome: {}", outcome);
        outcome
    }

    /// A hook failure still counts as applied since the guard granted it
    fn split(result: Result<bool>) -> (bool, Option<String>) {
        match result {
            Ok(applied) => (applied, None),
            Err(e) => (true, Some(e.to_string())),
        }
    }

    pub fn is_released(&self) -> bool {
        self.worker.is_none()
    }

    pub fn state(&self) -> LifecycleState {
        self.probe.state()
    }

    pub fn stats(&self) -> &WorkerStats {
        &self.stats
    }
}
