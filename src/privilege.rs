//! Privilege guard.
//!
//! Every step in the pipeline assumes unrestricted access to the package
//! manager, the filesystem, and the service manager. Checking once up front
//! avoids partial, confusing failures deep into a run. The uid source is
//! injectable so tests don't need to run as root.

use crate::error::{BerthError, Result};

/// Verify the effective user is root.
///
/// Called exactly once, before the run lock and before any step.
pub fn check() -> Result<()> {
    check_with_uid(effective_uid())
}

/// Verify a given effective uid is the privileged account.
pub fn check_with_uid(euid: u32) -> Result<()> {
    if euid == 0 {
        Ok(())
    } else {
        Err(BerthError::Permission {
            message: format!(
                "deployment mutates system state and must run as root (euid {}); re-run with sudo",
                euid
            ),
        })
    }
}

#[cfg(unix)]
fn effective_uid() -> u32 {
    // SAFETY: geteuid has no failure modes and touches no memory.
    unsafe { libc::geteuid() }
}

#[cfg(not(unix))]
fn effective_uid() -> u32 {
    // Non-unix hosts are not deployment targets; always fail the guard.
    u32::MAX
}
