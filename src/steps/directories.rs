//! Application and log directory materialization.

use crate::error::{BerthError, Result};
use crate::host::HostContext;
use crate::pipeline::{DeployStep, StepState};

const DIR_MODE: u32 = 0o755;

/// Create the application root and log directory.
///
/// Ownership drift is a partial-failure mode worth correcting
/// unconditionally, so this step never reports `Present`: when the
/// directories exist it runs in repair mode and re-applies owner and mode
/// on every invocation.
pub struct Directories;

impl Directories {
    fn targets(host: &HostContext) -> [std::path::PathBuf; 2] {
        [host.config.app_root.clone(), host.config.log_dir.clone()]
    }
}

impl DeployStep for Directories {
    fn name(&self) -> &'static str {
        "directories"
    }

    fn precondition(&self, host: &mut HostContext) -> Result<StepState> {
        let account = host.config.account.clone();
        let mut any_exists = false;
        for dir in Self::targets(host) {
            let probe = host.fs.dir_probe(&dir, &account, DIR_MODE)?;
            any_exists |= probe.exists;
        }
        Ok(if any_exists {
            StepState::PartiallyPresent
        } else {
            StepState::Absent
        })
    }

    fn action(&self, host: &mut HostContext, _state: StepState) -> Result<()> {
        let account = host.config.account.clone();
        for dir in Self::targets(host) {
            host.fs.ensure_directory(&dir, &account, DIR_MODE)?;
        }
        Ok(())
    }

    fn postcondition(&self, host: &mut HostContext) -> Result<()> {
        let account = host.config.account.clone();
        for dir in Self::targets(host) {
            let probe = host.fs.dir_probe(&dir, &account, DIR_MODE)?;
            if !probe.satisfied() {
                return Err(BerthError::Filesystem {
                    path: dir.display().to_string(),
                    message: "directory missing or ownership/mode incorrect".to_string(),
                });
            }
        }
        Ok(())
    }
}
