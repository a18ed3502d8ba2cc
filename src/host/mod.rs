//! External collaborator interfaces and their host-backed implementations.
//!
//! The pipeline never talks to apt, useradd, systemctl, nginx, or the
//! network directly; it goes through the narrow traits defined here. The
//! production implementations shell out to the real tools, and tests
//! substitute in-memory fakes at the same seams.

pub mod accounts;
pub mod fake;
pub mod fs;
pub mod packages;
pub mod probe;
pub mod proxy;
pub mod runtime_env;
pub mod services;

use std::path::Path;
use std::time::Duration;

use crate::config::DeployConfig;
use crate::error::Result;

pub use accounts::SystemAccounts;
pub use fs::{DirProbe, HostFs};
pub use packages::AptInstaller;
pub use probe::HttpProber;
pub use proxy::NginxManager;
pub use runtime_env::PythonVenv;
pub use services::SystemdManager;

/// System package installation.
pub trait PackageInstaller {
    /// Refresh the package index. Always attempted; network failures are fatal.
    fn refresh(&mut self) -> Result<()>;

    /// Subset of `packages` not currently installed.
    fn missing(&self, packages: &[String]) -> Result<Vec<String>>;

    /// Install the given packages.
    fn install(&mut self, packages: &[String]) -> Result<()>;
}

/// Service account management.
pub trait AccountManager {
    /// Whether the account already exists.
    fn exists(&self, name: &str) -> Result<bool>;

    /// Create a system account with no login shell and the given home.
    fn create_system_account(&mut self, name: &str, home: &Path) -> Result<()>;
}

/// Filesystem materialization: directories, file copies, rendered configs.
pub trait Materializer {
    /// Whether a path exists on the host (or at the deployment source).
    fn path_exists(&self, path: &Path) -> bool;

    /// Query a directory against its target owner and mode.
    fn dir_probe(&self, path: &Path, owner: &str, mode: u32) -> Result<DirProbe>;

    /// Create a directory if absent and (re)apply owner and mode.
    fn ensure_directory(&mut self, path: &Path, owner: &str, mode: u32) -> Result<()>;

    /// Copy a file, apply ownership, optionally mark it executable.
    fn copy_file(&mut self, src: &Path, dst: &Path, owner: &str, executable: bool) -> Result<()>;

    /// Recursively copy a directory tree, applying ownership throughout.
    fn copy_tree(&mut self, src: &Path, dst: &Path, owner: &str) -> Result<()>;

    /// Write rendered config content with the given mode (root-owned).
    fn write_file(&mut self, path: &Path, content: &str, mode: u32) -> Result<()>;

    /// Whether the file at `path` exists with exactly `content`.
    fn file_matches(&self, path: &Path, content: &str) -> bool;
}

/// Process supervisor (systemd) control.
pub trait ServiceManager {
    /// Install a unit definition and reload the daemon.
    fn install_unit(&mut self, name: &str, content: &str) -> Result<()>;

    /// Whether the installed unit file matches `content` exactly.
    fn unit_matches(&self, name: &str, content: &str) -> Result<bool>;

    /// Enable a unit for boot persistence.
    fn enable(&mut self, name: &str) -> Result<()>;

    /// Start a unit.
    fn start(&mut self, name: &str) -> Result<()>;

    /// Reload a unit without dropping in-flight requests.
    fn reload(&mut self, name: &str) -> Result<()>;

    /// Whether a unit is enabled.
    fn is_enabled(&self, name: &str) -> Result<bool>;

    /// Whether a unit is active.
    fn is_active(&self, name: &str) -> Result<bool>;
}

/// Reverse-proxy (nginx) site management.
pub trait ProxyManager {
    /// Install the site config into sites-available.
    fn install_site(&mut self, name: &str, content: &str) -> Result<()>;

    /// Whether the installed site file matches `content` exactly.
    fn site_matches(&self, name: &str, content: &str) -> Result<bool>;

    /// Enable the site via symlink. Re-linking is safe.
    fn enable_site(&mut self, name: &str) -> Result<()>;

    /// Whether the enabling symlink exists.
    fn site_enabled(&self, name: &str) -> Result<bool>;

    /// Validate the full proxy configuration syntactically.
    ///
    /// Must be called before [`ProxyManager::reload`]; a syntax error blocks
    /// the reload unconditionally.
    fn validate_config(&self) -> Result<()>;

    /// Reload the proxy. Only legal after a successful `validate_config`.
    fn reload(&mut self) -> Result<()>;
}

/// Isolated per-application runtime environment (python venv).
pub trait RuntimeEnv {
    /// Whether the environment already exists.
    fn exists(&self) -> bool;

    /// Create a fresh environment owned by the service account.
    fn create(&mut self, owner: &str) -> Result<()>;

    /// Install the dependency manifest into the environment.
    fn install_manifest(&mut self, manifest: &Path, owner: &str) -> Result<()>;

    /// Whether a binary is present inside the environment.
    fn binary_exists(&self, name: &str) -> bool;
}

/// Liveness probing of the deployed service.
pub trait HealthProber {
    /// Issue `GET url` and return the HTTP status code.
    fn probe(&self, url: &str, timeout: Duration) -> Result<u16>;
}

/// Everything a step needs: the deploy configuration plus one handle per
/// external collaborator.
pub struct HostContext {
    pub config: DeployConfig,
    pub packages: Box<dyn PackageInstaller>,
    pub accounts: Box<dyn AccountManager>,
    pub fs: Box<dyn Materializer>,
    pub services: Box<dyn ServiceManager>,
    pub proxy: Box<dyn ProxyManager>,
    pub runtime: Box<dyn RuntimeEnv>,
    pub prober: Box<dyn HealthProber>,
}

impl HostContext {
    /// Context backed by the real host tools.
    pub fn for_host(config: DeployConfig) -> Self {
        let venv = PythonVenv::new(config.venv_dir());
        Self {
            config,
            packages: Box::new(AptInstaller::new()),
            accounts: Box::new(SystemAccounts::new()),
            fs: Box::new(HostFs::new()),
            services: Box::new(SystemdManager::new()),
            proxy: Box::new(NginxManager::new()),
            runtime: Box::new(venv),
            prober: Box::new(HttpProber::new()),
        }
    }
}
