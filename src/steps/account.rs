//! Service account creation.

use crate::error::{BerthError, Result};
use crate::host::HostContext;
use crate::pipeline::{DeployStep, StepState};

/// Create the restricted system account that owns and runs the application.
///
/// The account gets no login shell and its home pinned to the application
/// root. Safe to run twice: an existing account is left untouched.
pub struct ServiceAccount;

impl DeployStep for ServiceAccount {
    fn name(&self) -> &'static str {
        "service-account"
    }

    fn precondition(&self, host: &mut HostContext) -> Result<StepState> {
        Ok(if host.accounts.exists(&host.config.account)? {
            StepState::Present
        } else {
            StepState::Absent
        })
    }

    fn action(&self, host: &mut HostContext, _state: StepState) -> Result<()> {
        let account = host.config.account.clone();
        let home = host.config.app_root.clone();
        host.accounts.create_system_account(&account, &home)
    }

    fn postcondition(&self, host: &mut HostContext) -> Result<()> {
        if host.accounts.exists(&host.config.account)? {
            Ok(())
        } else {
            Err(BerthError::StepFailed {
                step: self.name().to_string(),
                message: format!(
                    "account '{}' still missing after creation",
                    host.config.account
                ),
            })
        }
    }
}
