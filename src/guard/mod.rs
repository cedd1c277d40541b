//! Run-once start/stop arbitration.
//!
//! A [`LifecycleGuard`] never does any work of its own. Owners ask it for
//! permission before running their start or stop logic, and it grants each
//! transition at most once. Refusals are plain `false` returns.

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;


/// Lifecycle state derived from the guard flags
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LifecycleState {
    NotStarted,
    Started,
    Stopped,
}

impl LifecycleState {
    /// No transition leaves `Stopped`
    pub fn is_terminal(self) -> bool {
        matches!(self, LifecycleState::Stopped)
    }
}

impl fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LifecycleState::NotStarted => "not_started",
            LifecycleState::Started => "started",
            LifecycleState::Stopped => "stopped",
        };
        f.pad(name)
    }
}

#[derive(Debug, Default, Clone, Copy)]
struct Flags {
    started: bool,
    stopped: bool,
}

impl Flags {
    fn start(&mut self) -> bool {
        if self.started || self.stopped {
            return false;
        }

        self.started = true;
        true
    }

    fn stop(&mut self) -> bool {
        if self.stopped {
            return false;
        }

        self.stopped = true;
        true
    }

    fn state(&self) -> LifecycleState {
        if self.stopped {
            LifecycleState::Stopped
        } else if self.started {
            LifecycleState::Started
        } else {
            LifecycleState::NotStarted
        }
    }
}

/// Guard that lets a component start once and stop once.
///
/// Both flags live behind one lock, so every check-then-set runs atomically
/// and racing callers see exactly one winner per transition. Dropping a
/// guard that was started but never stopped stops it.
pub struct LifecycleGuard {
    flags: Arc<Mutex<Flags>>,
}

impl LifecycleGuard {
    /// Create a guard in the `NotStarted` state
    pub fn new() -> Self {
        Self {
            flags: Arc::new(Mutex::new(Flags::default())),
        }
    }

    /// Move from `NotStarted` to `Started`.
    ///
    /// Returns `false` without touching state if the guard was already
    /// started or stopped.
    pub fn start(&self) -> bool {
        self.flags.lock().start()
    }

    /// Move to `Stopped` from either `NotStarted` or `Started`.
    ///
    /// Returns `false` if the guard was already stopped.
    pub fn stop(&self) -> bool {
        self.flags.lock().stop()
    }

    pub fn is_started(&self) -> bool {
        self.flags.lock().started
    }

    pub fn is_stopped(&self) -> bool {
        self.flags.lock().stopped
    }

    /// Both flags read under a single lock acquisition
    pub fn state(&self) -> LifecycleState {
        self.flags.lock().state()
    }

    /// Stop the guard if it is running.
    ///
    /// This is the check `Drop` runs. A guard that never started is left in
    /// `NotStarted`. Returns `true` only when this call performed the stop,
    /// which tells an owner with its own `Drop` that its stop logic is due.
    pub fn destructor_check(&self) -> bool {
        let mut flags = self.flags.lock();
        if !flags.stopped && flags.started {
            return flags.stop();
        }
        false
    }

    /// Read-only handle that outlives the guard
    pub fn probe(&self) -> GuardProbe {
        GuardProbe {
            flags: Arc::clone(&self.flags),
        }
    }
}

impl Default for LifecycleGuard {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for LifecycleGuard {
    fn drop(&mut self) {
        self.destructor_check();
    }
}

impl fmt::Debug for LifecycleGuard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LifecycleGuard")
            .field("state", &self.state())
            .finish()
    }
}

/// Read-only view of a guard's flags.
///
/// Shares the flags with the guard it came from, so it still answers after
/// that guard (and its owner) has been dropped.
#[derive(Clone)]
pub struct GuardProbe {
    flags: Arc<Mutex<Flags>>,
}

impl GuardProbe {
    pub fn is_started(&self) -> bool {
        self.flags.lock().started
    }

    pub fn is_stopped(&self) -> bool {
        self.flags.lock().stopped
    }

    pub fn state(&self) -> LifecycleState {
        self.flags.lock().state()
    }
}

impl fmt::Debug for GuardProbe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GuardProbe")
            .field("state", &self.state())
            .finish()
    }
}
