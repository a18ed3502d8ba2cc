//! The deployment pipeline engine.
//!
//! A [`Pipeline`](runner::Pipeline) is a fixed, ordered sequence of
//! [`DeployStep`](step::DeployStep)s executed fail-fast against a
//! [`HostContext`](crate::host::HostContext). The host itself is the single
//! source of truth: nothing is cached between runs, so re-running against an
//! already-provisioned host converges to a no-op for satisfied steps.

pub mod lock;
pub mod report;
pub mod retry;
pub mod runner;
pub mod step;

pub use lock::{RunLock, DEFAULT_LOCK_PATH};
pub use report::{HealthVerdict, OverallResult, RunReport};
pub use retry::{with_backoff, Backoff};
pub use runner::{Pipeline, RunOptions};
pub use step::{DeployStep, OutcomeStatus, StepOutcome, StepState};
