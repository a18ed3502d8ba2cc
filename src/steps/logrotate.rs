//! Log rotation policy installation.

use std::path::PathBuf;

use crate::error::{BerthError, Result};
use crate::host::HostContext;
use crate::payload;
use crate::pipeline::{DeployStep, StepState};

const POLICY_MODE: u32 = 0o644;

/// Drop the logrotate policy for the service's log directory.
pub struct LogRotation;

impl LogRotation {
    fn policy_path(host: &HostContext) -> PathBuf {
        PathBuf::from("/etc/logrotate.d").join(&host.config.service_name)
    }
}

impl DeployStep for LogRotation {
    fn name(&self) -> &'static str {
        "log-rotation"
    }

    fn precondition(&self, host: &mut HostContext) -> Result<StepState> {
        let rendered = payload::logrotate_policy(&host.config);
        let path = Self::policy_path(host);
        Ok(if host.fs.file_matches(&path, &rendered) {
            StepState::Present
        } else if host.fs.path_exists(&path) {
            StepState::PartiallyPresent
        } else {
            StepState::Absent
        })
    }

    fn action(&self, host: &mut HostContext, _state: StepState) -> Result<()> {
        let rendered = payload::logrotate_policy(&host.config);
        let path = Self::policy_path(host);
        host.fs.write_file(&path, &rendered, POLICY_MODE)
    }

    fn postcondition(&self, host: &mut HostContext) -> Result<()> {
        let rendered = payload::logrotate_policy(&host.config);
        let path = Self::policy_path(host);
        if host.fs.file_matches(&path, &rendered) {
            Ok(())
        } else {
            Err(BerthError::Filesystem {
                path: path.display().to_string(),
                message: "rotation policy missing or stale after write".to_string(),
            })
        }
    }
}
