//! Application file deployment.

use std::path::PathBuf;

use tracing::debug;

use crate::error::{BerthError, Result};
use crate::host::HostContext;
use crate::pipeline::{DeployStep, StepState};

/// Copy the application source, dependency manifest, process-manager config,
/// and static front-end assets into the application root.
///
/// Like the directory step, this never reports `Present`: ownership and the
/// executable bits on entry points are re-applied on every run. Optional
/// artifacts (test fixtures) are copied only when present at the source;
/// their absence is not an error.
pub struct ApplicationFiles;

impl ApplicationFiles {
    fn destinations(host: &HostContext) -> Vec<PathBuf> {
        host.config
            .app_files
            .iter()
            .map(|f| host.config.app_root.join(f))
            .collect()
    }
}

impl DeployStep for ApplicationFiles {
    fn name(&self) -> &'static str {
        "application-files"
    }

    fn precondition(&self, host: &mut HostContext) -> Result<StepState> {
        let any_deployed = Self::destinations(host)
            .iter()
            .any(|dst| host.fs.path_exists(dst));
        Ok(if any_deployed {
            StepState::PartiallyPresent
        } else {
            StepState::Absent
        })
    }

    fn action(&self, host: &mut HostContext, _state: StepState) -> Result<()> {
        let config = host.config.clone();

        for file in &config.app_files {
            let src = config.source_dir.join(file);
            let dst = config.app_root.join(file);
            let executable = config.executable_files.contains(file);
            host.fs.copy_file(&src, &dst, &config.account, executable)?;
        }

        for file in &config.optional_files {
            let src = config.source_dir.join(file);
            if host.fs.path_exists(&src) {
                let dst = config.app_root.join(file);
                host.fs.copy_file(&src, &dst, &config.account, false)?;
            } else {
                debug!(file, "optional artifact not present at source, skipping");
            }
        }

        let static_src = config.source_dir.join("static");
        if host.fs.path_exists(&static_src) {
            let static_dst = config.app_root.join("static");
            host.fs
                .copy_tree(&static_src, &static_dst, &config.account)?;
        }

        Ok(())
    }

    fn postcondition(&self, host: &mut HostContext) -> Result<()> {
        for dst in Self::destinations(host) {
            if !host.fs.path_exists(&dst) {
                return Err(BerthError::Filesystem {
                    path: dst.display().to_string(),
                    message: "application file missing after deployment".to_string(),
                });
            }
        }
        Ok(())
    }
}
