//! apt-backed package installer.

use crate::error::{BerthError, Result};
use crate::shell::{execute, execute_check, CommandOptions};

use super::PackageInstaller;

/// Installs packages through apt-get, non-interactively.
pub struct AptInstaller;

impl AptInstaller {
    pub fn new() -> Self {
        Self
    }

    fn apt_options() -> CommandOptions {
        let mut options = CommandOptions {
            capture_stdout: true,
            capture_stderr: true,
            ..Default::default()
        };
        options.env.insert(
            "DEBIAN_FRONTEND".to_string(),
            "noninteractive".to_string(),
        );
        options
    }
}

impl Default for AptInstaller {
    fn default() -> Self {
        Self::new()
    }
}

impl PackageInstaller for AptInstaller {
    fn refresh(&mut self) -> Result<()> {
        let result = execute("apt-get update -qq", &Self::apt_options())?;
        if result.success {
            Ok(())
        } else {
            Err(BerthError::Install {
                message: format!("apt-get update failed: {}", result.diagnostic()),
            })
        }
    }

    fn missing(&self, packages: &[String]) -> Result<Vec<String>> {
        Ok(packages
            .iter()
            .filter(|pkg| !execute_check(&installed_query(pkg)))
            .cloned()
            .collect())
    }

    fn install(&mut self, packages: &[String]) -> Result<()> {
        if packages.is_empty() {
            return Ok(());
        }
        let command = format!("apt-get install -y -qq {}", packages.join(" "));
        let result = execute(&command, &Self::apt_options())?;
        if result.success {
            Ok(())
        } else {
            Err(BerthError::Install {
                message: format!(
                    "apt-get install failed for [{}]: {}",
                    packages.join(", "),
                    result.diagnostic()
                ),
            })
        }
    }
}

/// Query whether a single package is in the "install ok installed" state.
fn installed_query(package: &str) -> String {
    format!(
        "dpkg-query -W -f='${{Status}}' {} 2>/dev/null | grep -q 'install ok installed'",
        package
    )
}
