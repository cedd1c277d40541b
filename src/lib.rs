pub mod config;
pub mod error;
pub mod guard;
pub mod scope;
pub mod script;
pub mod service;

pub use config::StartStopConfig;
pub use error::{Result, StartStopError};
pub use guard::{GuardProbe, LifecycleGuard, LifecycleState};
pub use scope::StartedScope;
pub use script::{ScriptRunner, Step, StepOutcome, Worker, WorkerStats};
pub use service::{Managed, Service};
