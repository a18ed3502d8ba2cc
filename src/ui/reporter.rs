//! Progress and summary reporting.

use std::time::Duration;

use chrono::Local;

use crate::config::DeployConfig;
use crate::pipeline::{HealthVerdict, OutcomeStatus, OverallResult, RunReport, StepOutcome};

use super::hints;
use super::output::OutputMode;
use super::theme::BerthTheme;

/// Console reporter for pipeline progress and the final summary.
pub struct Reporter {
    theme: BerthTheme,
    mode: OutputMode,
}

impl Reporter {
    pub fn new(theme: BerthTheme, mode: OutputMode) -> Self {
        Self { theme, mode }
    }

    /// A reporter that prints nothing; used by tests.
    pub fn silent() -> Self {
        Self::new(BerthTheme::plain(), OutputMode::Silent)
    }

    fn stamp(&self) -> String {
        format!(
            "{}",
            self.theme
                .timestamp
                .apply_to(Local::now().format("[%H:%M:%S]"))
        )
    }

    /// Announce a step about to run.
    pub fn step_starting(&mut self, index: usize, total: usize, name: &str) {
        if !self.mode.shows_progress() {
            return;
        }
        println!(
            "{} {} {}",
            self.stamp(),
            self.theme
                .step_number
                .apply_to(format!("[{}/{}]", index + 1, total)),
            self.theme.step_title.apply_to(name)
        );
    }

    /// Report a finished step.
    pub fn step_finished(&mut self, outcome: &StepOutcome) {
        if !self.mode.shows_progress() {
            return;
        }
        let line = match outcome.status {
            OutcomeStatus::Applied => self.theme.format_success(&format!("{} applied", outcome.name)),
            OutcomeStatus::Repaired => {
                self.theme.format_success(&format!("{} repaired", outcome.name))
            }
            OutcomeStatus::Skipped => self
                .theme
                .format_skipped(&format!("{} already satisfied", outcome.name)),
            OutcomeStatus::Failed => {
                let detail = outcome.error.as_deref().unwrap_or("unknown error");
                self.theme
                    .format_error(&format!("{} failed: {}", outcome.name, detail))
            }
            OutcomeStatus::NotRun => self
                .theme
                .format_skipped(&format!("{} not run", outcome.name)),
        };
        println!("{}   {}", self.stamp(), line);
    }

    /// Announce the settle delay before the health probe.
    pub fn settling(&mut self, delay: Duration) {
        if !self.mode.shows_progress() {
            return;
        }
        println!(
            "{}   {}",
            self.stamp(),
            self.theme
                .dim
                .apply_to(format!("waiting {}s for the service to settle", delay.as_secs()))
        );
    }

    /// Report a passing health probe.
    pub fn health_passed(&mut self, url: &str, status: u16) {
        if !self.mode.shows_progress() {
            return;
        }
        println!(
            "{}   {}",
            self.stamp(),
            self.theme
                .format_success(&format!("health probe {} answered HTTP {}", url, status))
        );
    }

    /// Report a failing health probe. Advisory: the deployment still stands.
    pub fn health_failed(&mut self, reason: &str) {
        if !self.mode.shows_summary() {
            return;
        }
        println!(
            "{}   {}",
            self.stamp(),
            self.theme
                .format_warning(&format!("health probe failed: {}", reason))
        );
    }

    /// Print the final summary block.
    pub fn summary(&mut self, report: &RunReport, config: &DeployConfig) {
        if !self.mode.shows_summary() {
            return;
        }

        println!();
        for outcome in &report.outcomes {
            println!("  {}", outcome.summary_line());
        }
        println!();

        match &report.overall {
            OverallResult::Success => {
                println!(
                    "{}",
                    self.theme.format_success(&format!(
                        "{} deployed at {}",
                        config.service_name,
                        config.service_url()
                    ))
                );
                match &report.health {
                    HealthVerdict::Passed => {
                        println!("{}", self.theme.format_success("service is answering"));
                    }
                    HealthVerdict::Failed { reason } => {
                        println!(
                            "{}",
                            self.theme.format_warning(&format!(
                                "deployed, but the service is not answering: {}",
                                reason
                            ))
                        );
                        for hint in hints::health_failure_hints(config) {
                            println!("  {}", self.theme.hint.apply_to(hint));
                        }
                    }
                    HealthVerdict::Skipped => {}
                }
                for hint in hints::next_steps(config) {
                    println!("  {}", self.theme.hint.apply_to(hint));
                }
            }
            OverallResult::Failed { at_step } => {
                println!(
                    "{}",
                    self.theme
                        .format_error(&format!("deployment failed at step '{}'", at_step))
                );
                if let Some(outcome) = report.failed_outcome() {
                    if let Some(error) = &outcome.error {
                        println!("  {}", self.theme.dim.apply_to(error));
                    }
                }
                for hint in hints::failure_hints(config) {
                    println!("  {}", self.theme.hint.apply_to(hint));
                }
            }
        }
    }

    /// Print an error line. Shown even in silent mode.
    pub fn error(&mut self, msg: &str) {
        eprintln!("{}", self.theme.format_error(msg));
    }

    /// Print a plain line, respecting the summary gate.
    pub fn println(&mut self, msg: &str) {
        if self.mode.shows_summary() {
            println!("{}", msg);
        }
    }
}
