//! The step abstraction: precondition, action, postcondition.

use crate::error::Result;
use crate::host::HostContext;

/// Classification of current host state relative to a step's goal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepState {
    /// Nothing of the target state exists; the action must run in full.
    Absent,

    /// The target state is fully satisfied; the action is skipped.
    Present,

    /// Partially satisfied (e.g. directory exists with drifted ownership);
    /// the action runs in repair mode, fixing only the deficient aspect.
    PartiallyPresent,
}

impl std::fmt::Display for StepState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            StepState::Absent => "absent",
            StepState::Present => "present",
            StepState::PartiallyPresent => "partially present",
        };
        write!(f, "{}", s)
    }
}

/// A named, idempotent unit of provisioning work.
///
/// The runner guarantees the contract: `action` is only invoked when
/// `precondition` returned something other than [`StepState::Present`], and
/// `postcondition` always runs afterwards to independently confirm the
/// target state. An action's own `Ok` is never trusted alone; this is what
/// catches collaborators that exit zero while leaving work undone.
pub trait DeployStep {
    /// Stable step name used in progress output and failure reports.
    fn name(&self) -> &'static str;

    /// Pure, side-effect-free query of host state.
    fn precondition(&self, host: &mut HostContext) -> Result<StepState>;

    /// Apply the step. `state` is the precondition result, so repair-mode
    /// actions can fix only what is deficient.
    fn action(&self, host: &mut HostContext, state: StepState) -> Result<()>;

    /// Re-verify the target state, independent of whether the action ran.
    fn postcondition(&self, host: &mut HostContext) -> Result<()>;
}

/// Terminal status of one step within a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutcomeStatus {
    /// Action ran in full from an absent state.
    Applied,

    /// Action ran in repair mode from a partially-present state.
    Repaired,

    /// Precondition was satisfied; action skipped as a no-op.
    Skipped,

    /// Precondition, action, or postcondition failed.
    Failed,

    /// An earlier step failed before this one could run.
    NotRun,
}

impl OutcomeStatus {
    /// Display character for progress output.
    pub fn display_char(&self) -> char {
        match self {
            OutcomeStatus::Applied | OutcomeStatus::Repaired => '✓',
            OutcomeStatus::Skipped => '⊘',
            OutcomeStatus::Failed => '✗',
            OutcomeStatus::NotRun => '○',
        }
    }
}

impl std::fmt::Display for OutcomeStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            OutcomeStatus::Applied => "applied",
            OutcomeStatus::Repaired => "repaired",
            OutcomeStatus::Skipped => "skipped",
            OutcomeStatus::Failed => "failed",
            OutcomeStatus::NotRun => "not run",
        };
        write!(f, "{}", s)
    }
}

/// Recorded result of one step.
#[derive(Debug, Clone)]
pub struct StepOutcome {
    /// Step name.
    pub name: String,

    /// Terminal status.
    pub status: OutcomeStatus,

    /// Error detail when the status is `Failed`.
    pub error: Option<String>,
}

impl StepOutcome {
    pub fn applied(name: &str) -> Self {
        Self {
            name: name.to_string(),
            status: OutcomeStatus::Applied,
            error: None,
        }
    }

    pub fn repaired(name: &str) -> Self {
        Self {
            name: name.to_string(),
            status: OutcomeStatus::Repaired,
            error: None,
        }
    }

    pub fn skipped(name: &str) -> Self {
        Self {
            name: name.to_string(),
            status: OutcomeStatus::Skipped,
            error: None,
        }
    }

    pub fn failed(name: &str, error: String) -> Self {
        Self {
            name: name.to_string(),
            status: OutcomeStatus::Failed,
            error: Some(error),
        }
    }

    pub fn not_run(name: &str) -> Self {
        Self {
            name: name.to_string(),
            status: OutcomeStatus::NotRun,
            error: None,
        }
    }

    /// Whether the step was skipped as already satisfied.
    pub fn is_skipped(&self) -> bool {
        self.status == OutcomeStatus::Skipped
    }

    /// Whether the step failed.
    pub fn is_failed(&self) -> bool {
        self.status == OutcomeStatus::Failed
    }

    /// One-line rendering for the final summary.
    pub fn summary_line(&self) -> String {
        match self.status {
            OutcomeStatus::Skipped => {
                format!("{} {} (already satisfied)", self.status.display_char(), self.name)
            }
            OutcomeStatus::Failed => {
                let error = self.error.as_deref().unwrap_or("unknown error");
                format!("{} {} - {}", self.status.display_char(), self.name, error)
            }
            _ => format!("{} {} ({})", self.status.display_char(), self.name, self.status),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn step_state_display() {
        assert_eq!(format!("{}", StepState::Absent), "absent");
        assert_eq!(
            format!("{}", StepState::PartiallyPresent),
            "partially present"
        );
    }

    #[test]
    fn outcome_constructors_set_status() {
        assert_eq!(StepOutcome::applied("a").status, OutcomeStatus::Applied);
        assert_eq!(StepOutcome::repaired("a").status, OutcomeStatus::Repaired);
        assert_eq!(StepOutcome::skipped("a").status, OutcomeStatus::Skipped);
        assert_eq!(StepOutcome::not_run("a").status, OutcomeStatus::NotRun);

        let failed = StepOutcome::failed("a", "boom".to_string());
        assert_eq!(failed.status, OutcomeStatus::Failed);
        assert_eq!(failed.error.as_deref(), Some("boom"));
    }

    #[test]
    fn skipped_and_failed_predicates() {
        assert!(StepOutcome::skipped("a").is_skipped());
        assert!(!StepOutcome::applied("a").is_skipped());
        assert!(StepOutcome::failed("a", "e".to_string()).is_failed());
        assert!(!StepOutcome::not_run("a").is_failed());
    }

    #[test]
    fn summary_line_includes_status() {
        let line = StepOutcome::skipped("service-account").summary_line();
        assert!(line.contains('⊘'));
        assert!(line.contains("already satisfied"));

        let line = StepOutcome::failed("proxy-site", "syntax error".to_string()).summary_line();
        assert!(line.contains('✗'));
        assert!(line.contains("syntax error"));
    }

    #[test]
    fn display_chars_are_distinct_per_group() {
        assert_eq!(OutcomeStatus::Applied.display_char(), '✓');
        assert_eq!(OutcomeStatus::Skipped.display_char(), '⊘');
        assert_eq!(OutcomeStatus::Failed.display_char(), '✗');
        assert_eq!(OutcomeStatus::NotRun.display_char(), '○');
    }
}
