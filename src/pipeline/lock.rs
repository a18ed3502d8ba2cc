//! Advisory run lock.
//!
//! Two concurrent deployments against the same host would interleave
//! irreversible mutations of shared system state. An exclusive flock taken
//! before the first step rejects the second invocation outright.

use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};

use fs2::FileExt;

use crate::error::{BerthError, Result};

/// Default lock location on the target host.
pub const DEFAULT_LOCK_PATH: &str = "/var/lock/berth.lock";

/// Held for the duration of one run; released on drop.
#[derive(Debug)]
pub struct RunLock {
    file: File,
    path: PathBuf,
}

impl RunLock {
    /// Take the exclusive lock, failing fast if another run holds it.
    pub fn acquire(path: &Path) -> Result<Self> {
        let file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(path)
            .map_err(|e| BerthError::Filesystem {
                path: path.display().to_string(),
                message: format!("cannot open lock file: {}", e),
            })?;

        file.try_lock_exclusive().map_err(|_| BerthError::LockHeld {
            path: path.display().to_string(),
        })?;

        Ok(Self {
            file,
            path: path.to_path_buf(),
        })
    }

    /// Path of the held lock file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for RunLock {
    fn drop(&mut self) {
        let _ = fs2::FileExt::unlock(&self.file);
    }
}
