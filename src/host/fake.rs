//! In-memory fakes of every external collaborator.
//!
//! Tests drive the pipeline against a [`FakeHost`] instead of a real
//! machine. All fakes share one [`FakeState`] behind a mutex so a test can
//! pre-provision host state and inspect mutations after a run.

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::config::DeployConfig;
use crate::error::{BerthError, Result};

use super::fs::DirProbe;
use super::{
    AccountManager, HealthProber, HostContext, Materializer, PackageInstaller, ProxyManager,
    RuntimeEnv, ServiceManager,
};

/// Shared, inspectable state of the simulated host.
#[derive(Debug, Default)]
pub struct FakeState {
    // Package manager
    pub refresh_calls: u32,
    pub fail_refresh: bool,
    pub installed: BTreeSet<String>,
    pub install_calls: Vec<Vec<String>>,
    pub fail_install: bool,
    /// When set, installs report success but don't register the packages
    /// (simulates a package manager exiting zero with nothing installed).
    pub install_silently_noops: bool,

    // Accounts
    pub accounts: BTreeMap<String, PathBuf>,

    // Filesystem
    pub source_files: BTreeSet<PathBuf>,
    pub source_dirs: BTreeSet<PathBuf>,
    pub dirs: BTreeMap<PathBuf, (String, u32)>,
    pub files: BTreeMap<PathBuf, String>,
    pub executable_files: BTreeSet<PathBuf>,

    // systemd
    pub units: BTreeMap<String, String>,
    pub enabled_units: BTreeSet<String>,
    pub active_units: BTreeSet<String>,
    pub reloaded_units: Vec<String>,
    pub daemon_reloads: u32,
    pub fail_start: bool,

    // nginx
    pub sites: BTreeMap<String, String>,
    pub enabled_sites: BTreeSet<String>,
    pub proxy_config_valid: bool,
    pub validate_calls: u32,
    pub proxy_reloads: u32,

    // venv
    pub venv_exists: bool,
    pub venv_binaries: BTreeSet<String>,
    pub manifest_installs: u32,

    // probe
    /// HTTP status the health endpoint answers with; `None` means the
    /// endpoint is unreachable.
    pub probe_status: Option<u16>,
    pub probe_calls: u32,
}

impl FakeState {
    /// Populate the deployment source with everything the config expects.
    pub fn provision_source(&mut self, config: &DeployConfig) {
        for file in &config.app_files {
            self.source_files.insert(config.source_dir.join(file));
        }
        self.source_dirs.insert(config.source_dir.join("static"));
    }
}

type Shared = Arc<Mutex<FakeState>>;

/// Builder for a [`HostContext`] wired entirely to fakes.
pub struct FakeHost;

impl FakeHost {
    /// Build a fake-backed context plus a handle to its shared state.
    pub fn context(config: DeployConfig) -> (HostContext, Shared) {
        let state: Shared = Arc::new(Mutex::new(FakeState {
            proxy_config_valid: true,
            ..Default::default()
        }));
        let host = HostContext {
            config,
            packages: Box::new(FakePackages(state.clone())),
            accounts: Box::new(FakeAccounts(state.clone())),
            fs: Box::new(FakeFs(state.clone())),
            services: Box::new(FakeServices(state.clone())),
            proxy: Box::new(FakeProxy(state.clone())),
            runtime: Box::new(FakeRuntime(state.clone())),
            prober: Box::new(FakeProber(state.clone())),
        };
        (host, state)
    }
}

struct FakePackages(Shared);

impl PackageInstaller for FakePackages {
    fn refresh(&mut self) -> Result<()> {
        let mut state = self.0.lock().unwrap();
        state.refresh_calls += 1;
        if state.fail_refresh {
            Err(BerthError::Install {
                message: "repository unreachable".to_string(),
            })
        } else {
            Ok(())
        }
    }

    fn missing(&self, packages: &[String]) -> Result<Vec<String>> {
        let state = self.0.lock().unwrap();
        Ok(packages
            .iter()
            .filter(|p| !state.installed.contains(*p))
            .cloned()
            .collect())
    }

    fn install(&mut self, packages: &[String]) -> Result<()> {
        let mut state = self.0.lock().unwrap();
        state.install_calls.push(packages.to_vec());
        if state.fail_install {
            return Err(BerthError::Install {
                message: "apt-get install failed".to_string(),
            });
        }
        if !state.install_silently_noops {
            for p in packages {
                state.installed.insert(p.clone());
            }
        }
        Ok(())
    }
}

struct FakeAccounts(Shared);

impl AccountManager for FakeAccounts {
    fn exists(&self, name: &str) -> Result<bool> {
        Ok(self.0.lock().unwrap().accounts.contains_key(name))
    }

    fn create_system_account(&mut self, name: &str, home: &Path) -> Result<()> {
        self.0
            .lock()
            .unwrap()
            .accounts
            .insert(name.to_string(), home.to_path_buf());
        Ok(())
    }
}

struct FakeFs(Shared);

impl Materializer for FakeFs {
    fn path_exists(&self, path: &Path) -> bool {
        let state = self.0.lock().unwrap();
        state.source_files.contains(path)
            || state.source_dirs.contains(path)
            || state.files.contains_key(path)
            || state.dirs.contains_key(path)
    }

    fn dir_probe(&self, path: &Path, owner: &str, mode: u32) -> Result<DirProbe> {
        let state = self.0.lock().unwrap();
        match state.dirs.get(path) {
            Some((dir_owner, dir_mode)) => Ok(DirProbe {
                exists: true,
                owner_ok: dir_owner == owner,
                mode_ok: *dir_mode == mode,
            }),
            None => Ok(DirProbe::absent()),
        }
    }

    fn ensure_directory(&mut self, path: &Path, owner: &str, mode: u32) -> Result<()> {
        self.0
            .lock()
            .unwrap()
            .dirs
            .insert(path.to_path_buf(), (owner.to_string(), mode));
        Ok(())
    }

    fn copy_file(&mut self, src: &Path, dst: &Path, _owner: &str, executable: bool) -> Result<()> {
        let mut state = self.0.lock().unwrap();
        if !state.source_files.contains(src) {
            return Err(BerthError::Filesystem {
                path: dst.display().to_string(),
                message: format!("source {} does not exist", src.display()),
            });
        }
        state
            .files
            .insert(dst.to_path_buf(), format!("copy of {}", src.display()));
        if executable {
            state.executable_files.insert(dst.to_path_buf());
        }
        Ok(())
    }

    fn copy_tree(&mut self, src: &Path, dst: &Path, owner: &str) -> Result<()> {
        let mut state = self.0.lock().unwrap();
        if !state.source_dirs.contains(src) {
            return Err(BerthError::Filesystem {
                path: dst.display().to_string(),
                message: format!("source tree {} does not exist", src.display()),
            });
        }
        state
            .dirs
            .insert(dst.to_path_buf(), (owner.to_string(), 0o755));
        Ok(())
    }

    fn write_file(&mut self, path: &Path, content: &str, _mode: u32) -> Result<()> {
        self.0
            .lock()
            .unwrap()
            .files
            .insert(path.to_path_buf(), content.to_string());
        Ok(())
    }

    fn file_matches(&self, path: &Path, content: &str) -> bool {
        self.0
            .lock()
            .unwrap()
            .files
            .get(path)
            .map(|existing| existing == content)
            .unwrap_or(false)
    }
}

struct FakeServices(Shared);

impl ServiceManager for FakeServices {
    fn install_unit(&mut self, name: &str, content: &str) -> Result<()> {
        let mut state = self.0.lock().unwrap();
        state.units.insert(name.to_string(), content.to_string());
        state.daemon_reloads += 1;
        Ok(())
    }

    fn unit_matches(&self, name: &str, content: &str) -> Result<bool> {
        Ok(self
            .0
            .lock()
            .unwrap()
            .units
            .get(name)
            .map(|existing| existing == content)
            .unwrap_or(false))
    }

    fn enable(&mut self, name: &str) -> Result<()> {
        self.0.lock().unwrap().enabled_units.insert(name.to_string());
        Ok(())
    }

    fn start(&mut self, name: &str) -> Result<()> {
        let mut state = self.0.lock().unwrap();
        if state.fail_start {
            return Err(BerthError::ServiceManager {
                operation: format!("start {}", name),
                message: "unit failed to start".to_string(),
            });
        }
        state.active_units.insert(name.to_string());
        Ok(())
    }

    fn reload(&mut self, name: &str) -> Result<()> {
        self.0.lock().unwrap().reloaded_units.push(name.to_string());
        Ok(())
    }

    fn is_enabled(&self, name: &str) -> Result<bool> {
        Ok(self.0.lock().unwrap().enabled_units.contains(name))
    }

    fn is_active(&self, name: &str) -> Result<bool> {
        Ok(self.0.lock().unwrap().active_units.contains(name))
    }
}

struct FakeProxy(Shared);

impl ProxyManager for FakeProxy {
    fn install_site(&mut self, name: &str, content: &str) -> Result<()> {
        self.0
            .lock()
            .unwrap()
            .sites
            .insert(name.to_string(), content.to_string());
        Ok(())
    }

    fn site_matches(&self, name: &str, content: &str) -> Result<bool> {
        Ok(self
            .0
            .lock()
            .unwrap()
            .sites
            .get(name)
            .map(|existing| existing == content)
            .unwrap_or(false))
    }

    fn enable_site(&mut self, name: &str) -> Result<()> {
        self.0.lock().unwrap().enabled_sites.insert(name.to_string());
        Ok(())
    }

    fn site_enabled(&self, name: &str) -> Result<bool> {
        Ok(self.0.lock().unwrap().enabled_sites.contains(name))
    }

    fn validate_config(&self) -> Result<()> {
        let mut state = self.0.lock().unwrap();
        state.validate_calls += 1;
        if state.proxy_config_valid {
            Ok(())
        } else {
            Err(BerthError::ConfigSyntax {
                detail: "unexpected end of file, expecting \"}\"".to_string(),
            })
        }
    }

    fn reload(&mut self) -> Result<()> {
        self.0.lock().unwrap().proxy_reloads += 1;
        Ok(())
    }
}

struct FakeRuntime(Shared);

impl RuntimeEnv for FakeRuntime {
    fn exists(&self) -> bool {
        self.0.lock().unwrap().venv_exists
    }

    fn create(&mut self, _owner: &str) -> Result<()> {
        let mut state = self.0.lock().unwrap();
        state.venv_exists = true;
        state.venv_binaries.insert("python".to_string());
        state.venv_binaries.insert("pip".to_string());
        Ok(())
    }

    fn install_manifest(&mut self, manifest: &Path, _owner: &str) -> Result<()> {
        let mut state = self.0.lock().unwrap();
        if !state.files.contains_key(manifest) {
            return Err(BerthError::StepFailed {
                step: "runtime-environment".to_string(),
                message: format!("manifest {} not deployed", manifest.display()),
            });
        }
        state.manifest_installs += 1;
        state.venv_binaries.insert("gunicorn".to_string());
        Ok(())
    }

    fn binary_exists(&self, name: &str) -> bool {
        self.0.lock().unwrap().venv_binaries.contains(name)
    }
}

struct FakeProber(Shared);

impl HealthProber for FakeProber {
    fn probe(&self, url: &str, _timeout: Duration) -> Result<u16> {
        let mut state = self.0.lock().unwrap();
        state.probe_calls += 1;
        match state.probe_status {
            Some(status) => Ok(status),
            None => Err(BerthError::Probe {
                url: url.to_string(),
                message: "connection refused".to_string(),
            }),
        }
    }
}
