//! Run report: what one invocation did.
//!
//! Owned exclusively by the runner for the duration of one run, then handed
//! to the reporter and discarded. State is never persisted across runs; the
//! next invocation re-queries the host.

use chrono::{DateTime, Local};

use super::step::StepOutcome;

/// Overall verdict of the fatal steps.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OverallResult {
    /// Every fatal step completed (ran, repaired, or skipped).
    Success,

    /// The named step failed; later steps were not run.
    Failed { at_step: String },
}

/// Verdict of the post-deployment health probe.
///
/// Deliberately independent of [`OverallResult`]: infrastructure setup and
/// application health are different failure domains. A failed probe leaves
/// the run structurally successful.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthVerdict {
    Passed,
    Failed { reason: String },
    Skipped,
}

/// Record of one pipeline invocation.
#[derive(Debug)]
pub struct RunReport {
    /// When the run started.
    pub started_at: DateTime<Local>,

    /// Per-step outcomes, in pipeline order.
    pub outcomes: Vec<StepOutcome>,

    /// Verdict of the fatal steps.
    pub overall: OverallResult,

    /// Verdict of the advisory health probe.
    pub health: HealthVerdict,
}

impl RunReport {
    /// Start an empty report.
    pub fn begin() -> Self {
        Self {
            started_at: Local::now(),
            outcomes: Vec::new(),
            overall: OverallResult::Success,
            health: HealthVerdict::Skipped,
        }
    }

    /// Append a step outcome; a failure flips the overall verdict.
    pub fn record(&mut self, outcome: StepOutcome) {
        if outcome.is_failed() {
            self.overall = OverallResult::Failed {
                at_step: outcome.name.clone(),
            };
        }
        self.outcomes.push(outcome);
    }

    /// Whether every fatal step completed.
    pub fn is_success(&self) -> bool {
        self.overall == OverallResult::Success
    }

    /// The outcome of the step that failed, if any.
    pub fn failed_outcome(&self) -> Option<&StepOutcome> {
        self.outcomes.iter().find(|o| o.is_failed())
    }

    /// Process exit code for this report. Health probe failures do not
    /// affect it: exit 0 means the infrastructure is in place.
    pub fn exit_code(&self) -> u8 {
        if self.is_success() {
            0
        } else {
            1
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_report_is_success_with_skipped_health() {
        let report = RunReport::begin();
        assert!(report.is_success());
        assert_eq!(report.health, HealthVerdict::Skipped);
        assert_eq!(report.exit_code(), 0);
    }

    #[test]
    fn recording_failure_flips_overall() {
        let mut report = RunReport::begin();
        report.record(StepOutcome::applied("packages"));
        report.record(StepOutcome::failed("proxy-site", "bad config".to_string()));
        report.record(StepOutcome::not_run("start-services"));

        assert!(!report.is_success());
        assert_eq!(
            report.overall,
            OverallResult::Failed {
                at_step: "proxy-site".to_string()
            }
        );
        assert_eq!(report.exit_code(), 1);
        assert_eq!(report.failed_outcome().unwrap().name, "proxy-site");
    }

    #[test]
    fn health_failure_does_not_change_exit_code() {
        let mut report = RunReport::begin();
        report.record(StepOutcome::applied("packages"));
        report.health = HealthVerdict::Failed {
            reason: "connection refused".to_string(),
        };

        assert!(report.is_success());
        assert_eq!(report.exit_code(), 0);
    }

    #[test]
    fn outcomes_keep_pipeline_order() {
        let mut report = RunReport::begin();
        report.record(StepOutcome::applied("first"));
        report.record(StepOutcome::skipped("second"));

        let names: Vec<_> = report.outcomes.iter().map(|o| o.name.as_str()).collect();
        assert_eq!(names, vec!["first", "second"]);
    }
}
