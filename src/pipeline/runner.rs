//! Pipeline execution.
//!
//! Steps run strictly in order, fail-fast: the first step whose
//! precondition, action, or postcondition fails aborts the run, and every
//! later step is recorded as not run. Nothing is rolled back; the pipeline
//! is forward-only and converges by being safely re-runnable.

use tracing::{debug, info};

use crate::error::BerthError;
use crate::host::HostContext;
use crate::ui::Reporter;

use super::report::{HealthVerdict, RunReport};
use super::retry::{with_backoff, Backoff};
use super::step::{DeployStep, StepOutcome, StepState};

/// Options for one pipeline run.
#[derive(Debug)]
pub struct RunOptions {
    /// Skip the post-deployment health probe entirely.
    pub skip_health: bool,

    /// Retry policy for the health probe (instant in tests).
    pub probe_backoff: Backoff,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            skip_health: false,
            probe_backoff: Backoff::for_probe(),
        }
    }
}

/// An ordered sequence of steps, fixed at build time.
pub struct Pipeline {
    steps: Vec<Box<dyn DeployStep>>,
}

impl Pipeline {
    pub fn new(steps: Vec<Box<dyn DeployStep>>) -> Self {
        Self { steps }
    }

    /// Step names in execution order.
    pub fn step_names(&self) -> Vec<&'static str> {
        self.steps.iter().map(|s| s.name()).collect()
    }

    /// Number of steps.
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Execute the pipeline against the host.
    ///
    /// The fatal steps decide the overall verdict; the health probe that
    /// follows a fully-successful run is advisory and only sets the
    /// report's health field.
    pub fn run(
        &self,
        host: &mut HostContext,
        reporter: &mut Reporter,
        options: &RunOptions,
    ) -> RunReport {
        let mut report = RunReport::begin();
        let total = self.steps.len();
        let mut aborted = false;

        for (index, step) in self.steps.iter().enumerate() {
            if aborted {
                report.record(StepOutcome::not_run(step.name()));
                continue;
            }

            reporter.step_starting(index, total, step.name());
            let outcome = run_step(step.as_ref(), host);
            reporter.step_finished(&outcome);

            if outcome.is_failed() {
                aborted = true;
            }
            report.record(outcome);
        }

        if report.is_success() && !options.skip_health {
            report.health = self.probe_health(host, reporter, options);
        }

        report
    }

    fn probe_health(
        &self,
        host: &mut HostContext,
        reporter: &mut Reporter,
        options: &RunOptions,
    ) -> HealthVerdict {
        let delay = host.config.settle_delay();
        if !delay.is_zero() {
            reporter.settling(delay);
            std::thread::sleep(delay);
        }

        let url = host.config.health_url();
        let timeout = host.config.probe_timeout();

        let result = with_backoff(&options.probe_backoff, || {
            let status = host.prober.probe(&url, timeout)?;
            if (200..300).contains(&status) {
                Ok(status)
            } else {
                Err(BerthError::Probe {
                    url: url.clone(),
                    message: format!("endpoint answered HTTP {}", status),
                })
            }
        });

        match result {
            Ok(status) => {
                reporter.health_passed(&url, status);
                HealthVerdict::Passed
            }
            Err(err) => {
                let reason = err.to_string();
                reporter.health_failed(&reason);
                HealthVerdict::Failed { reason }
            }
        }
    }
}

/// Run one step through the precondition/action/postcondition contract.
fn run_step(step: &dyn DeployStep, host: &mut HostContext) -> StepOutcome {
    let name = step.name();

    let state = match step.precondition(host) {
        Ok(state) => state,
        Err(err) => return StepOutcome::failed(name, format!("precondition: {}", err)),
    };
    debug!(step = name, state = %state, "precondition evaluated");

    if state == StepState::Present {
        info!(step = name, "target state already satisfied, skipping action");
    } else if let Err(err) = step.action(host, state) {
        return StepOutcome::failed(name, err.to_string());
    }

    // Postcondition runs regardless of whether the action did, and converts
    // a still-unsatisfied state into a failure.
    if let Err(err) = step.postcondition(host) {
        return StepOutcome::failed(name, format!("postcondition: {}", err));
    }

    match state {
        StepState::Absent => StepOutcome::applied(name),
        StepState::PartiallyPresent => StepOutcome::repaired(name),
        StepState::Present => StepOutcome::skipped(name),
    }
}
