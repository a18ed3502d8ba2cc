//! Error types for Berth operations.
//!
//! This module defines [`BerthError`], the primary error type used throughout
//! the application, and a [`Result`] type alias for convenience.
//!
//! # Error Handling Strategy
//!
//! - Every fatal step error aborts the pipeline immediately; the runner
//!   records which step failed and surfaces the underlying cause
//! - Health probe failures are advisory and never become a `BerthError`
//!   at the pipeline level (see `pipeline::report::HealthVerdict`)
//! - Use `anyhow::Error` (via `BerthError::Other`) for unexpected errors

use thiserror::Error;

/// Core error type for Berth operations.
#[derive(Debug, Error)]
pub enum BerthError {
    /// The invoking user lacks the privileges every step assumes.
    #[error("Insufficient privileges: {message}")]
    Permission { message: String },

    /// Another deployment run already holds the advisory lock.
    #[error("Another deployment is already in progress (lock held at {path})")]
    LockHeld { path: String },

    /// Package manager refresh or install failed.
    #[error("Package installation failed: {message}")]
    Install { message: String },

    /// Filesystem materialization failed (copy, ownership, permissions).
    #[error("Filesystem operation failed for {path}: {message}")]
    Filesystem { path: String, message: String },

    /// Process supervisor (systemd) operation failed.
    #[error("Service manager operation '{operation}' failed: {message}")]
    ServiceManager { operation: String, message: String },

    /// Reverse-proxy configuration failed syntax validation.
    ///
    /// By contract this always blocks the proxy reload: a live proxy is
    /// never reloaded with a broken config.
    #[error("Reverse-proxy config validation failed: {detail}")]
    ConfigSyntax { detail: String },

    /// Health probe could not reach the endpoint or got a non-success status.
    #[error("Health probe failed for {url}: {message}")]
    Probe { url: String, message: String },

    /// A step failed with a cause that doesn't fit a narrower variant.
    #[error("Step '{step}' failed: {message}")]
    StepFailed { step: String, message: String },

    /// Deploy configuration is missing or invalid.
    #[error("Invalid configuration: {message}")]
    Config { message: String },

    /// IO error wrapper.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic wrapped error for anyhow interop.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl BerthError {
    /// Process exit code for this error.
    ///
    /// The privilege check and the run lock get their own codes so wrapper
    /// scripts can tell "re-run with sudo" and "wait for the other run"
    /// apart from genuine step failures.
    pub fn exit_code(&self) -> u8 {
        match self {
            BerthError::Permission { .. } => 2,
            BerthError::LockHeld { .. } => 3,
            _ => 1,
        }
    }
}

/// Result type alias for Berth operations.
pub type Result<T> = std::result::Result<T, BerthError>;
