//! CLI argument definitions.
//!
//! All arguments are defined with clap's derive macros; the entry point is
//! the [`Cli`] struct.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Berth - single-host deployment of a gunicorn web service behind nginx.
#[derive(Debug, Parser)]
#[command(name = "berth")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to config file (defaults are used when omitted)
    #[arg(short, long, global = true, env = "BERTH_CONFIG")]
    pub config: Option<PathBuf>,

    /// Show verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Minimal output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Run the deployment pipeline against this host (requires root)
    Deploy(DeployArgs),

    /// Show the step order and rendered file destinations without touching the host
    Plan,
}

/// Arguments for the `deploy` command.
#[derive(Debug, Clone, clap::Args)]
pub struct DeployArgs {
    /// Skip the post-deployment health probe
    #[arg(long)]
    pub skip_health: bool,

    /// Override the settle delay before the health probe, in seconds
    #[arg(long, value_name = "SECS")]
    pub settle_secs: Option<u64>,

    /// Override the run lock file location
    #[arg(long, value_name = "PATH")]
    pub lock_file: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_parses() {
        Cli::command().debug_assert();
    }

    #[test]
    fn deploy_flags_parse() {
        let cli = Cli::parse_from(["berth", "deploy", "--skip-health", "--settle-secs", "0"]);
        match cli.command {
            Commands::Deploy(args) => {
                assert!(args.skip_health);
                assert_eq!(args.settle_secs, Some(0));
            }
            _ => panic!("expected deploy"),
        }
    }

    #[test]
    fn global_flags_apply_after_subcommand() {
        let cli = Cli::parse_from(["berth", "plan", "--quiet", "--no-color"]);
        assert!(cli.quiet);
        assert!(cli.no_color);
    }
}
