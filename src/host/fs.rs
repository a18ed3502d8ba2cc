//! Filesystem materializer.
//!
//! Creates directories, copies application files, and writes rendered config
//! payloads, applying ownership and permission bits as it goes. Ownership is
//! re-applied unconditionally by the repair-mode steps, so drift on an
//! already-provisioned host converges back on every run.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use crate::error::{BerthError, Result};
use crate::shell::execute_quiet;

use super::Materializer;

/// Result of probing a directory against its target owner and mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DirProbe {
    /// The path exists and is a directory.
    pub exists: bool,
    /// Ownership matches the target account.
    pub owner_ok: bool,
    /// Permission bits match the target mode.
    pub mode_ok: bool,
}

impl DirProbe {
    /// Probe result for a missing directory.
    pub fn absent() -> Self {
        Self {
            exists: false,
            owner_ok: false,
            mode_ok: false,
        }
    }

    /// Whether the directory fully matches its target state.
    pub fn satisfied(&self) -> bool {
        self.exists && self.owner_ok && self.mode_ok
    }
}

/// Materializer backed by the host filesystem.
pub struct HostFs {
    /// uid/gid cache per account name; one passwd lookup per account per run.
    ids: HashMap<String, (u32, u32)>,
}

impl HostFs {
    pub fn new() -> Self {
        Self {
            ids: HashMap::new(),
        }
    }

    fn resolve_ids(&mut self, owner: &str) -> Result<(u32, u32)> {
        if let Some(ids) = self.ids.get(owner) {
            return Ok(*ids);
        }
        let ids = lookup_ids(owner)?;
        self.ids.insert(owner.to_string(), ids);
        Ok(ids)
    }

    fn apply_owner(&mut self, path: &Path, owner: &str) -> Result<()> {
        let (uid, gid) = self.resolve_ids(owner)?;
        chown(path, uid, gid)
    }
}

impl Default for HostFs {
    fn default() -> Self {
        Self::new()
    }
}

impl Materializer for HostFs {
    fn path_exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn dir_probe(&self, path: &Path, owner: &str, mode: u32) -> Result<DirProbe> {
        let metadata = match fs::metadata(path) {
            Ok(m) if m.is_dir() => m,
            Ok(_) => {
                return Err(BerthError::Filesystem {
                    path: path.display().to_string(),
                    message: "exists but is not a directory".to_string(),
                })
            }
            Err(_) => return Ok(DirProbe::absent()),
        };

        #[cfg(unix)]
        {
            use std::os::unix::fs::MetadataExt;
            let (uid, gid) = lookup_ids(owner)?;
            Ok(DirProbe {
                exists: true,
                owner_ok: metadata.uid() == uid && metadata.gid() == gid,
                mode_ok: metadata.mode() & 0o7777 == mode,
            })
        }
        #[cfg(not(unix))]
        {
            let _ = (metadata, owner, mode);
            Ok(DirProbe {
                exists: true,
                owner_ok: true,
                mode_ok: true,
            })
        }
    }

    fn ensure_directory(&mut self, path: &Path, owner: &str, mode: u32) -> Result<()> {
        fs::create_dir_all(path).map_err(|e| BerthError::Filesystem {
            path: path.display().to_string(),
            message: format!("create failed: {}", e),
        })?;
        set_mode(path, mode)?;
        self.apply_owner(path, owner)
    }

    fn copy_file(&mut self, src: &Path, dst: &Path, owner: &str, executable: bool) -> Result<()> {
        fs::copy(src, dst).map_err(|e| BerthError::Filesystem {
            path: dst.display().to_string(),
            message: format!("copy from {} failed: {}", src.display(), e),
        })?;
        set_mode(dst, if executable { 0o755 } else { 0o644 })?;
        self.apply_owner(dst, owner)
    }

    fn copy_tree(&mut self, src: &Path, dst: &Path, owner: &str) -> Result<()> {
        self.ensure_directory(dst, owner, 0o755)?;
        let entries = fs::read_dir(src).map_err(|e| BerthError::Filesystem {
            path: src.display().to_string(),
            message: format!("read dir failed: {}", e),
        })?;
        for entry in entries {
            let entry = entry.map_err(|e| BerthError::Filesystem {
                path: src.display().to_string(),
                message: format!("read dir entry failed: {}", e),
            })?;
            let target = dst.join(entry.file_name());
            if entry.path().is_dir() {
                self.copy_tree(&entry.path(), &target, owner)?;
            } else {
                self.copy_file(&entry.path(), &target, owner, false)?;
            }
        }
        Ok(())
    }

    fn write_file(&mut self, path: &Path, content: &str, mode: u32) -> Result<()> {
        fs::write(path, content).map_err(|e| BerthError::Filesystem {
            path: path.display().to_string(),
            message: format!("write failed: {}", e),
        })?;
        set_mode(path, mode)
    }

    fn file_matches(&self, path: &Path, content: &str) -> bool {
        fs::read_to_string(path)
            .map(|existing| existing == content)
            .unwrap_or(false)
    }
}

/// Resolve an account's uid and gid from the passwd database.
fn lookup_ids(owner: &str) -> Result<(u32, u32)> {
    let result = execute_quiet(&format!("id -u {0} && id -g {0}", owner))?;
    if !result.success {
        return Err(BerthError::Filesystem {
            path: owner.to_string(),
            message: format!("cannot resolve account ids: {}", result.diagnostic()),
        });
    }
    let mut lines = result.stdout.lines();
    let parse = |line: Option<&str>| -> Option<u32> { line?.trim().parse().ok() };
    match (parse(lines.next()), parse(lines.next())) {
        (Some(uid), Some(gid)) => Ok((uid, gid)),
        _ => Err(BerthError::Filesystem {
            path: owner.to_string(),
            message: format!("unexpected id output: {}", result.stdout.trim()),
        }),
    }
}

#[cfg(unix)]
fn chown(path: &Path, uid: u32, gid: u32) -> Result<()> {
    std::os::unix::fs::chown(path, Some(uid), Some(gid)).map_err(|e| BerthError::Filesystem {
        path: path.display().to_string(),
        message: format!("chown to {}:{} failed: {}", uid, gid, e),
    })
}

#[cfg(not(unix))]
fn chown(_path: &Path, _uid: u32, _gid: u32) -> Result<()> {
    Ok(())
}

#[cfg(unix)]
fn set_mode(path: &Path, mode: u32) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(mode)).map_err(|e| {
        BerthError::Filesystem {
            path: path.display().to_string(),
            message: format!("chmod {:o} failed: {}", mode, e),
        }
    })
}

#[cfg(not(unix))]
fn set_mode(_path: &Path, _mode: u32) -> Result<()> {
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn current_user() -> String {
        execute_quiet("id -un").unwrap().stdout.trim().to_string()
    }

    #[test]
    fn dir_probe_reports_absent() {
        let fs_impl = HostFs::new();
        let probe = fs_impl
            .dir_probe(Path::new("/nonexistent/berth/dir"), &current_user(), 0o755)
            .unwrap();
        assert!(!probe.exists);
        assert!(!probe.satisfied());
    }

    #[cfg(unix)]
    #[test]
    fn dir_probe_rejects_file_at_path() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("not-a-dir");
        fs::write(&path, "x").unwrap();

        let fs_impl = HostFs::new();
        let err = fs_impl
            .dir_probe(&path, &current_user(), 0o755)
            .unwrap_err();
        assert!(err.to_string().contains("not a directory"));
    }

    #[cfg(unix)]
    #[test]
    fn ensure_directory_creates_with_mode() {
        use std::os::unix::fs::PermissionsExt;

        let temp = TempDir::new().unwrap();
        let path = temp.path().join("app");
        let mut fs_impl = HostFs::new();

        fs_impl
            .ensure_directory(&path, &current_user(), 0o755)
            .unwrap();

        let metadata = fs::metadata(&path).unwrap();
        assert!(metadata.is_dir());
        assert_eq!(metadata.permissions().mode() & 0o7777, 0o755);

        let probe = fs_impl.dir_probe(&path, &current_user(), 0o755).unwrap();
        assert!(probe.satisfied());
    }

    #[cfg(unix)]
    #[test]
    fn ensure_directory_repairs_drifted_mode() {
        use std::os::unix::fs::PermissionsExt;

        let temp = TempDir::new().unwrap();
        let path = temp.path().join("app");
        fs::create_dir(&path).unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o700)).unwrap();

        let mut fs_impl = HostFs::new();
        fs_impl
            .ensure_directory(&path, &current_user(), 0o755)
            .unwrap();

        let metadata = fs::metadata(&path).unwrap();
        assert_eq!(metadata.permissions().mode() & 0o7777, 0o755);
    }

    #[cfg(unix)]
    #[test]
    fn copy_file_marks_entry_point_executable() {
        use std::os::unix::fs::PermissionsExt;

        let temp = TempDir::new().unwrap();
        let src = temp.path().join("app.py");
        let dst = temp.path().join("deployed-app.py");
        fs::write(&src, "print('ok')").unwrap();

        let mut fs_impl = HostFs::new();
        fs_impl
            .copy_file(&src, &dst, &current_user(), true)
            .unwrap();

        let mode = fs::metadata(&dst).unwrap().permissions().mode();
        assert_ne!(mode & 0o111, 0);
        assert_eq!(fs::read_to_string(&dst).unwrap(), "print('ok')");
    }

    #[test]
    fn copy_tree_copies_nested_layout() {
        let temp = TempDir::new().unwrap();
        let src = temp.path().join("static");
        fs::create_dir_all(src.join("css")).unwrap();
        fs::write(src.join("index.html"), "<html>").unwrap();
        fs::write(src.join("css/site.css"), "body{}").unwrap();

        let dst = temp.path().join("deployed-static");
        let mut fs_impl = HostFs::new();
        fs_impl.copy_tree(&src, &dst, &current_user()).unwrap();

        assert!(dst.join("index.html").exists());
        assert!(dst.join("css/site.css").exists());
    }

    #[test]
    fn write_file_then_file_matches() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("site.conf");
        let mut fs_impl = HostFs::new();

        fs_impl.write_file(&path, "server {}", 0o644).unwrap();

        assert!(fs_impl.file_matches(&path, "server {}"));
        assert!(!fs_impl.file_matches(&path, "server { changed }"));
    }

    #[test]
    fn file_matches_is_false_for_missing_file() {
        let fs_impl = HostFs::new();
        assert!(!fs_impl.file_matches(Path::new("/nonexistent/file"), "x"));
    }

    #[test]
    fn lookup_ids_resolves_current_user() {
        let (uid, _gid) = lookup_ids(&current_user()).unwrap();
        #[cfg(unix)]
        assert_eq!(uid, unsafe { libc::getuid() });
        #[cfg(not(unix))]
        let _ = uid;
    }

    #[test]
    fn lookup_ids_fails_for_unknown_account() {
        assert!(lookup_ids("berth-test-account-that-should-not-exist").is_err());
    }
}
