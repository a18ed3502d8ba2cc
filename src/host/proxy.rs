//! nginx reverse-proxy manager.
//!
//! Sites follow the Debian layout: the config lands in sites-available and
//! is enabled through a symlink in sites-enabled. `validate_config` wraps
//! `nginx -t`; the pipeline guarantees it runs before every reload.

use std::fs;
use std::path::PathBuf;

use crate::error::{BerthError, Result};
use crate::shell::execute_quiet;

use super::ProxyManager;

/// Manages nginx sites and reloads.
pub struct NginxManager {
    available_dir: PathBuf,
    enabled_dir: PathBuf,
}

impl NginxManager {
    pub fn new() -> Self {
        Self {
            available_dir: PathBuf::from("/etc/nginx/sites-available"),
            enabled_dir: PathBuf::from("/etc/nginx/sites-enabled"),
        }
    }

    /// Manager rooted at custom directories (used in tests).
    pub fn with_dirs(available_dir: PathBuf, enabled_dir: PathBuf) -> Self {
        Self {
            available_dir,
            enabled_dir,
        }
    }

    fn available_path(&self, name: &str) -> PathBuf {
        self.available_dir.join(name)
    }

    fn enabled_path(&self, name: &str) -> PathBuf {
        self.enabled_dir.join(name)
    }
}

impl Default for NginxManager {
    fn default() -> Self {
        Self::new()
    }
}

impl ProxyManager for NginxManager {
    fn install_site(&mut self, name: &str, content: &str) -> Result<()> {
        let path = self.available_path(name);
        fs::write(&path, content).map_err(|e| BerthError::Filesystem {
            path: path.display().to_string(),
            message: format!("write site config failed: {}", e),
        })
    }

    fn site_matches(&self, name: &str, content: &str) -> Result<bool> {
        Ok(fs::read_to_string(self.available_path(name))
            .map(|existing| existing == content)
            .unwrap_or(false))
    }

    fn enable_site(&mut self, name: &str) -> Result<()> {
        let target = self.available_path(name);
        let link = self.enabled_path(name);

        // Re-linking is safe: drop a stale or wrong link, then recreate.
        if link.symlink_metadata().is_ok() {
            if fs::read_link(&link).map(|t| t == target).unwrap_or(false) {
                return Ok(());
            }
            fs::remove_file(&link).map_err(|e| BerthError::Filesystem {
                path: link.display().to_string(),
                message: format!("removing stale site link failed: {}", e),
            })?;
        }

        symlink(&target, &link).map_err(|e| BerthError::Filesystem {
            path: link.display().to_string(),
            message: format!("enabling site link failed: {}", e),
        })
    }

    fn site_enabled(&self, name: &str) -> Result<bool> {
        let link = self.enabled_path(name);
        Ok(fs::read_link(&link)
            .map(|target| target == self.available_path(name))
            .unwrap_or(false))
    }

    fn validate_config(&self) -> Result<()> {
        let result = execute_quiet("nginx -t")?;
        if result.success {
            Ok(())
        } else {
            Err(BerthError::ConfigSyntax {
                detail: result.diagnostic().to_string(),
            })
        }
    }

    fn reload(&mut self) -> Result<()> {
        let result = execute_quiet("systemctl reload nginx")?;
        if result.success {
            Ok(())
        } else {
            Err(BerthError::ServiceManager {
                operation: "reload nginx".to_string(),
                message: result.diagnostic().to_string(),
            })
        }
    }
}

#[cfg(unix)]
fn symlink(target: &std::path::Path, link: &std::path::Path) -> std::io::Result<()> {
    std::os::unix::fs::symlink(target, link)
}

#[cfg(not(unix))]
fn symlink(_target: &std::path::Path, _link: &std::path::Path) -> std::io::Result<()> {
    Err(std::io::Error::new(
        std::io::ErrorKind::Unsupported,
        "symlinks unsupported on this platform",
    ))
}
