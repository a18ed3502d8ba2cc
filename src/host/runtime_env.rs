//! Isolated python runtime environment (venv).

use std::path::{Path, PathBuf};

use crate::error::{BerthError, Result};
use crate::shell::execute_quiet;

use super::RuntimeEnv;

/// A python venv rooted inside the application directory.
pub struct PythonVenv {
    venv_dir: PathBuf,
}

impl PythonVenv {
    pub fn new(venv_dir: PathBuf) -> Self {
        Self { venv_dir }
    }

    fn bin(&self, name: &str) -> PathBuf {
        self.venv_dir.join("bin").join(name)
    }

    fn chown_tree(&self, owner: &str) -> Result<()> {
        let result = execute_quiet(&format!(
            "chown -R {}:{} {}",
            owner,
            owner,
            self.venv_dir.display()
        ))?;
        if result.success {
            Ok(())
        } else {
            Err(BerthError::Filesystem {
                path: self.venv_dir.display().to_string(),
                message: format!("chown of runtime environment failed: {}", result.diagnostic()),
            })
        }
    }
}

impl RuntimeEnv for PythonVenv {
    fn exists(&self) -> bool {
        self.bin("python").exists()
    }

    fn create(&mut self, owner: &str) -> Result<()> {
        let result = execute_quiet(&format!("python3 -m venv {}", self.venv_dir.display()))?;
        if !result.success {
            return Err(BerthError::StepFailed {
                step: "runtime-environment".to_string(),
                message: format!("venv creation failed: {}", result.diagnostic()),
            });
        }
        self.chown_tree(owner)
    }

    fn install_manifest(&mut self, manifest: &Path, owner: &str) -> Result<()> {
        let pip = self.bin("pip");
        let result = execute_quiet(&format!(
            "{} install --quiet --upgrade pip && {} install --quiet -r {}",
            pip.display(),
            pip.display(),
            manifest.display()
        ))?;
        if !result.success {
            return Err(BerthError::StepFailed {
                step: "runtime-environment".to_string(),
                message: format!("pip install failed: {}", result.diagnostic()),
            });
        }
        // pip runs as root; hand the tree back to the service account.
        self.chown_tree(owner)
    }

    fn binary_exists(&self, name: &str) -> bool {
        self.bin(name).exists()
    }
}
