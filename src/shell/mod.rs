//! Shell command execution for external collaborators.

mod command;

pub use command::{execute, execute_check, execute_quiet, CommandOptions, CommandResult};
