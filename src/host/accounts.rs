//! Service account management via getent/useradd.

use std::path::Path;

use crate::error::{BerthError, Result};
use crate::shell::{execute_check, execute_quiet};

use super::AccountManager;

/// Manages system accounts through the standard passwd tooling.
pub struct SystemAccounts;

impl SystemAccounts {
    pub fn new() -> Self {
        Self
    }
}

impl Default for SystemAccounts {
    fn default() -> Self {
        Self::new()
    }
}

impl AccountManager for SystemAccounts {
    fn exists(&self, name: &str) -> Result<bool> {
        Ok(execute_check(&format!("getent passwd {}", name)))
    }

    fn create_system_account(&mut self, name: &str, home: &Path) -> Result<()> {
        // The home directory itself is materialized by a later step; useradd
        // only records it in the passwd entry.
        let command = format!(
            "useradd --system --shell /usr/sbin/nologin --home-dir {} --no-create-home {}",
            home.display(),
            name
        );
        let result = execute_quiet(&command)?;
        if result.success {
            Ok(())
        } else {
            Err(BerthError::StepFailed {
                step: "service-account".to_string(),
                message: format!("useradd failed for '{}': {}", name, result.diagnostic()),
            })
        }
    }
}
