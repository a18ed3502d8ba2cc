//! Package index refresh and dependency installation.

use crate::error::{BerthError, Result};
use crate::host::HostContext;
use crate::pipeline::{with_backoff, Backoff, DeployStep, StepState};

/// Refresh the system package index.
///
/// Always attempted: a stale index makes every later install unreliable, and
/// refreshing twice is harmless. Network failures here are fatal to the run.
pub struct RefreshPackageIndex {
    backoff: Backoff,
}

impl RefreshPackageIndex {
    pub fn new() -> Self {
        Self {
            backoff: Backoff::for_installer(),
        }
    }

    pub fn with_backoff(backoff: Backoff) -> Self {
        Self { backoff }
    }
}

impl Default for RefreshPackageIndex {
    fn default() -> Self {
        Self::new()
    }
}

impl DeployStep for RefreshPackageIndex {
    fn name(&self) -> &'static str {
        "package-index"
    }

    fn precondition(&self, _host: &mut HostContext) -> Result<StepState> {
        Ok(StepState::Absent)
    }

    fn action(&self, host: &mut HostContext, _state: StepState) -> Result<()> {
        with_backoff(&self.backoff, || host.packages.refresh())
    }

    fn postcondition(&self, _host: &mut HostContext) -> Result<()> {
        // A refresh leaves no independently checkable state; the action's
        // own exit status is all there is.
        Ok(())
    }
}

/// Install the runtime, process supervisor, reverse proxy, and HTTP tooling.
///
/// Only the missing subset is installed; already-present packages are left
/// untouched.
pub struct InstallDependencies {
    backoff: Backoff,
}

impl InstallDependencies {
    pub fn new() -> Self {
        Self {
            backoff: Backoff::for_installer(),
        }
    }

    pub fn with_backoff(backoff: Backoff) -> Self {
        Self { backoff }
    }
}

impl Default for InstallDependencies {
    fn default() -> Self {
        Self::new()
    }
}

impl DeployStep for InstallDependencies {
    fn name(&self) -> &'static str {
        "dependencies"
    }

    fn precondition(&self, host: &mut HostContext) -> Result<StepState> {
        let missing = host.packages.missing(&host.config.packages)?;
        Ok(if missing.is_empty() {
            StepState::Present
        } else if missing.len() == host.config.packages.len() {
            StepState::Absent
        } else {
            StepState::PartiallyPresent
        })
    }

    fn action(&self, host: &mut HostContext, _state: StepState) -> Result<()> {
        let missing = host.packages.missing(&host.config.packages)?;
        with_backoff(&self.backoff, || host.packages.install(&missing))
    }

    fn postcondition(&self, host: &mut HostContext) -> Result<()> {
        // Catches a package manager that exits zero while leaving
        // packages uninstalled.
        let missing = host.packages.missing(&host.config.packages)?;
        if missing.is_empty() {
            Ok(())
        } else {
            Err(BerthError::Install {
                message: format!(
                    "packages still missing after install: {}",
                    missing.join(", ")
                ),
            })
        }
    }
}
