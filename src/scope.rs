use crate::guard::LifecycleGuard;

/// A started guard that is stopped again when the scope ends.
///
/// The stop also runs while unwinding from a panic, so the guard cannot be
/// left `Started` by an early exit.
#[must_use = "dropping the scope stops the guard immediately"]
#[derive(Debug)]
pub struct StartedScope<'a> {
    guard: &'a LifecycleGuard,
}

impl LifecycleGuard {
    /// Start the guard and tie its stop to the returned scope.
    ///
    /// Returns `None` when the start is refused.
    pub fn start_scoped(&self) -> Option<StartedScope<'_>> {
        if self.start() {
            Some(StartedScope { guard: self })
        } else {
            None
        }
    }
}

impl<'a> StartedScope<'a> {
    pub fn guard(&self) -> &'a LifecycleGuard {
        self.guard
    }

    /// Stop now instead of at scope exit
    pub fn finish(self) -> bool {
        self.guard.stop()
    }
}

impl Drop for StartedScope<'_> {
    fn drop(&mut self) {
        self.guard.destructor_check();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::guard::LifecycleState;
    use std::panic::{self, AssertUnwindSafe};

    #[test]
    fn test_scope_stops_on_exit() {
        let guard = LifecycleGuard::new();
        {
            let scope = guard.start_scoped().unwrap();
            assert_eq!(scope.guard().state(), LifecycleState::Started);
        }
        assert_eq!(guard.state(), LifecycleState::Stopped);
    }

    #[test]
    fn test_scope_refused_when_already_started() {
        let guard = LifecycleGuard::new();
        guard.start();
        assert!(guard.start_scoped().is_none());

        // Refusal must not stop the running guard
        assert_eq!(guard.state(), LifecycleState::Started);
    }

    #[test]
    fn test_scope_finish() {
        let guard = LifecycleGuard::new();
        let scope = guard.start_scoped().unwrap();
        assert!(scope.finish());
        assert!(guard.is_stopped());
        assert!(!guard.stop());
    }

    #[test]
    fn test_scope_after_external_stop() {
        let guard = LifecycleGuard::new();
        let scope = guard.start_scoped().unwrap();
        assert!(guard.stop());
        assert!(!scope.finish());
    }

    #[test]
    fn test_scope_stops_on_panic() {
        let guard = LifecycleGuard::new();

        let result = panic::catch_unwind(AssertUnwindSafe(|| {
            let _scope = guard.start_scoped().unwrap();
            panic!("worker blew up");
        }));

        assert!(result.is_err());
        assert_eq!(guard.state(), LifecycleState::Stopped);
    }
}
