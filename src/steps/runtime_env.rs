//! Isolated runtime environment setup.

use crate::error::{BerthError, Result};
use crate::host::HostContext;
use crate::pipeline::{DeployStep, StepState};

/// Create the per-application venv and install the dependency manifest.
///
/// An existing environment is treated as `Present` and left alone:
/// dependency drift is handled by an explicit update path, not by the
/// deploy pipeline recreating environments under a possibly-running service.
pub struct RuntimeEnvironment;

impl DeployStep for RuntimeEnvironment {
    fn name(&self) -> &'static str {
        "runtime-environment"
    }

    fn precondition(&self, host: &mut HostContext) -> Result<StepState> {
        Ok(if host.runtime.exists() {
            StepState::Present
        } else {
            StepState::Absent
        })
    }

    fn action(&self, host: &mut HostContext, _state: StepState) -> Result<()> {
        let account = host.config.account.clone();
        let manifest = host.config.manifest_path();
        host.runtime.create(&account)?;
        host.runtime.install_manifest(&manifest, &account)
    }

    fn postcondition(&self, host: &mut HostContext) -> Result<()> {
        if !host.runtime.exists() {
            return Err(BerthError::StepFailed {
                step: self.name().to_string(),
                message: "runtime environment missing after setup".to_string(),
            });
        }
        if !host.runtime.binary_exists("gunicorn") {
            return Err(BerthError::StepFailed {
                step: self.name().to_string(),
                message: "gunicorn not installed into the runtime environment".to_string(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DeployConfig;
    use crate::host::fake::FakeHost;
    use std::path::PathBuf;

    fn deployed_manifest(state: &crate::host::fake::FakeState) -> bool {
        state
            .files
            .contains_key(&PathBuf::from("/opt/pdf-parser/requirements.txt"))
    }

    #[test]
    fn creates_venv_and_installs_manifest() {
        let step = RuntimeEnvironment;
        let (mut host, state) = FakeHost::context(DeployConfig::default());
        // Manifest deployed by the earlier application-files step
        state.lock().unwrap().files.insert(
            PathBuf::from("/opt/pdf-parser/requirements.txt"),
            "flask".to_string(),
        );
        assert!(deployed_manifest(&state.lock().unwrap()));

        assert_eq!(step.precondition(&mut host).unwrap(), StepState::Absent);
        step.action(&mut host, StepState::Absent).unwrap();
        step.postcondition(&mut host).unwrap();

        let state = state.lock().unwrap();
        assert!(state.venv_exists);
        assert_eq!(state.manifest_installs, 1);
    }

    #[test]
    fn existing_environment_is_present_and_untouched() {
        let step = RuntimeEnvironment;
        let (mut host, state) = FakeHost::context(DeployConfig::default());
        {
            let mut s = state.lock().unwrap();
            s.venv_exists = true;
            s.venv_binaries.insert("gunicorn".to_string());
        }

        assert_eq!(step.precondition(&mut host).unwrap(), StepState::Present);
        step.postcondition(&mut host).unwrap();
        assert_eq!(state.lock().unwrap().manifest_installs, 0);
    }

    #[test]
    fn action_fails_when_manifest_not_deployed() {
        let step = RuntimeEnvironment;
        let (mut host, _state) = FakeHost::context(DeployConfig::default());

        let err = step.action(&mut host, StepState::Absent).unwrap_err();
        assert!(err.to_string().contains("not deployed"));
    }

    #[test]
    fn postcondition_requires_gunicorn() {
        let step = RuntimeEnvironment;
        let (mut host, state) = FakeHost::context(DeployConfig::default());
        state.lock().unwrap().venv_exists = true;
        // venv exists but gunicorn was never installed

        let err = step.postcondition(&mut host).unwrap_err();
        assert!(err.to_string().contains("gunicorn"));
    }
}
