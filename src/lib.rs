//! Berth - idempotent single-host deployment of a gunicorn web service.
//!
//! Berth takes a bare Debian/Ubuntu host to a running web service behind
//! nginx under systemd supervision, in one ordered, fail-fast pipeline.
//! Every step queries the host before acting, so re-running a finished or
//! interrupted deployment converges instead of breaking.
//!
//! # Modules
//!
//! - [`cli`] - Command-line interface and argument parsing
//! - [`config`] - Deploy configuration loading and validation
//! - [`error`] - Error types and result aliases
//! - [`host`] - External collaborator traits and their host-backed implementations
//! - [`payload`] - Rendered systemd/nginx/logrotate configuration payloads
//! - [`pipeline`] - The step contract, runner, report, retry, and run lock
//! - [`privilege`] - Root privilege check
//! - [`shell`] - Shell command execution
//! - [`steps`] - The concrete deployment steps, in order
//! - [`ui`] - Terminal output: theme, progress reporting, hints

pub mod cli;
pub mod config;
pub mod error;
pub mod host;
pub mod payload;
pub mod pipeline;
pub mod privilege;
pub mod shell;
pub mod steps;
pub mod ui;

pub use error::{BerthError, Result};
