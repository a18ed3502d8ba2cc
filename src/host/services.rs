//! systemd service manager.

use std::fs;
use std::path::PathBuf;

use crate::error::{BerthError, Result};
use crate::shell::{execute_check, execute_quiet};

use super::ServiceManager;

/// Drives systemd through systemctl and the unit directory.
pub struct SystemdManager {
    unit_dir: PathBuf,
}

impl SystemdManager {
    pub fn new() -> Self {
        Self {
            unit_dir: PathBuf::from("/etc/systemd/system"),
        }
    }

    /// Manager writing units under a custom directory (used in tests).
    pub fn with_unit_dir(unit_dir: PathBuf) -> Self {
        Self { unit_dir }
    }

    fn unit_path(&self, name: &str) -> PathBuf {
        self.unit_dir.join(format!("{}.service", name))
    }

    fn systemctl(&self, operation: &str, name: &str) -> Result<()> {
        let result = execute_quiet(&format!("systemctl {} {}", operation, name))?;
        if result.success {
            Ok(())
        } else {
            Err(BerthError::ServiceManager {
                operation: format!("{} {}", operation, name),
                message: result.diagnostic().to_string(),
            })
        }
    }
}

impl Default for SystemdManager {
    fn default() -> Self {
        Self::new()
    }
}

impl ServiceManager for SystemdManager {
    fn install_unit(&mut self, name: &str, content: &str) -> Result<()> {
        let path = self.unit_path(name);
        fs::write(&path, content).map_err(|e| BerthError::ServiceManager {
            operation: format!("install-unit {}", name),
            message: format!("write {} failed: {}", path.display(), e),
        })?;
        self.systemctl("daemon-reload", "")
    }

    fn unit_matches(&self, name: &str, content: &str) -> Result<bool> {
        Ok(fs::read_to_string(self.unit_path(name))
            .map(|existing| existing == content)
            .unwrap_or(false))
    }

    fn enable(&mut self, name: &str) -> Result<()> {
        self.systemctl("enable", name)
    }

    fn start(&mut self, name: &str) -> Result<()> {
        self.systemctl("start", name)
    }

    fn reload(&mut self, name: &str) -> Result<()> {
        self.systemctl("reload", name)
    }

    fn is_enabled(&self, name: &str) -> Result<bool> {
        Ok(execute_check(&format!("systemctl is-enabled --quiet {}", name)))
    }

    fn is_active(&self, name: &str) -> Result<bool> {
        Ok(execute_check(&format!("systemctl is-active --quiet {}", name)))
    }
}
