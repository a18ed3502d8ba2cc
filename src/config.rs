//! Deploy configuration.
//!
//! All knobs for one deployment live in [`DeployConfig`]. Every field has a
//! default tuned for the stock gunicorn-behind-nginx layout, so a bare
//! `berth deploy` works with no config file at all; a YAML file can override
//! any subset of fields.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::error::{BerthError, Result};

/// Configuration for a single-host deployment.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DeployConfig {
    /// Service name: systemd unit, nginx site, and logrotate policy name.
    pub service_name: String,

    /// System account that owns and runs the application.
    pub account: String,

    /// Application root directory on the target host.
    pub app_root: PathBuf,

    /// Log directory on the target host.
    pub log_dir: PathBuf,

    /// Directory containing the application source to deploy.
    pub source_dir: PathBuf,

    /// Address the application server binds to (proxied by nginx).
    pub bind_address: String,

    /// nginx `server_name` (underscore matches any host).
    pub server_name: String,

    /// Path of the liveness endpoint, probed through the proxy.
    pub health_path: String,

    /// Seconds to let the service settle before the health probe.
    pub settle_secs: u64,

    /// Per-request timeout for the health probe, in seconds.
    pub probe_timeout_secs: u64,

    /// System packages the application depends on.
    pub packages: Vec<String>,

    /// Application files copied from `source_dir` into `app_root`.
    pub app_files: Vec<String>,

    /// Files that must carry the executable bit after deployment.
    pub executable_files: Vec<String>,

    /// Optional artifacts copied only when present in `source_dir`.
    pub optional_files: Vec<String>,
}

impl Default for DeployConfig {
    fn default() -> Self {
        Self {
            service_name: "pdf-parser".to_string(),
            account: "pdf-parser".to_string(),
            app_root: PathBuf::from("/opt/pdf-parser"),
            log_dir: PathBuf::from("/var/log/pdf-parser"),
            source_dir: PathBuf::from("."),
            bind_address: "127.0.0.1:5000".to_string(),
            server_name: "_".to_string(),
            health_path: "/health".to_string(),
            settle_secs: 5,
            probe_timeout_secs: 10,
            packages: vec![
                "python3".to_string(),
                "python3-venv".to_string(),
                "python3-pip".to_string(),
                "nginx".to_string(),
                "curl".to_string(),
            ],
            app_files: vec![
                "app.py".to_string(),
                "pdf_parser.py".to_string(),
                "wsgi.py".to_string(),
                "requirements.txt".to_string(),
                "gunicorn.conf.py".to_string(),
            ],
            executable_files: vec!["app.py".to_string(), "wsgi.py".to_string()],
            optional_files: vec!["sample_invoice.pdf".to_string()],
        }
    }
}

impl DeployConfig {
    /// Load configuration from a YAML file, or defaults when `path` is None.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config = match path {
            Some(p) => {
                let raw = std::fs::read_to_string(p).map_err(|e| BerthError::Config {
                    message: format!("cannot read {}: {}", p.display(), e),
                })?;
                serde_yaml::from_str(&raw).map_err(|e| BerthError::Config {
                    message: format!("cannot parse {}: {}", p.display(), e),
                })?
            }
            None => Self::default(),
        };
        config.validate()?;
        Ok(config)
    }

    /// Reject values that would produce a broken deployment.
    pub fn validate(&self) -> Result<()> {
        if self.service_name.is_empty() {
            return Err(BerthError::Config {
                message: "service_name must not be empty".to_string(),
            });
        }
        if self.account.is_empty() {
            return Err(BerthError::Config {
                message: "account must not be empty".to_string(),
            });
        }
        if !self.app_root.is_absolute() {
            return Err(BerthError::Config {
                message: format!("app_root must be absolute, got {}", self.app_root.display()),
            });
        }
        if !self.log_dir.is_absolute() {
            return Err(BerthError::Config {
                message: format!("log_dir must be absolute, got {}", self.log_dir.display()),
            });
        }
        if !self.health_path.starts_with('/') {
            return Err(BerthError::Config {
                message: format!("health_path must start with '/', got {}", self.health_path),
            });
        }
        Ok(())
    }

    /// Isolated runtime environment directory (python venv).
    pub fn venv_dir(&self) -> PathBuf {
        self.app_root.join("venv")
    }

    /// Dependency manifest inside the deployed app root.
    pub fn manifest_path(&self) -> PathBuf {
        self.app_root.join("requirements.txt")
    }

    /// URL probed after deployment, through the reverse proxy.
    pub fn health_url(&self) -> String {
        format!("http://127.0.0.1{}", self.health_path)
    }

    /// Public URL shown in the final summary.
    pub fn service_url(&self) -> String {
        if self.server_name == "_" {
            "http://<server-ip>/".to_string()
        } else {
            format!("http://{}/", self.server_name)
        }
    }

    /// Settle delay before the health probe.
    pub fn settle_delay(&self) -> Duration {
        Duration::from_secs(self.settle_secs)
    }

    /// Health probe request timeout.
    pub fn probe_timeout(&self) -> Duration {
        Duration::from_secs(self.probe_timeout_secs)
    }
}
