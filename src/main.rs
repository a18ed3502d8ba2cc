//! Berth CLI entry point.

use std::process::ExitCode;

use berth::cli::{commands, Cli, Commands};
use berth::ui::{should_use_colors, BerthTheme, OutputMode, Reporter};
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Initialize the tracing subscriber for logging.
///
/// Log level is controlled by:
/// 1. `--debug` flag sets level to DEBUG
/// 2. `RUST_LOG` environment variable (if set)
/// 3. Default is INFO
fn init_tracing(debug: bool) {
    let filter = if debug {
        EnvFilter::new("berth=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("berth=info"))
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false))
        .with(filter)
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.debug);

    tracing::debug!("berth starting with args: {:?}", cli);

    let output_mode = if cli.quiet {
        OutputMode::Quiet
    } else if cli.verbose {
        OutputMode::Verbose
    } else {
        OutputMode::Normal
    };

    if cli.no_color {
        std::env::set_var("NO_COLOR", "1");
    }

    let theme = if should_use_colors() {
        BerthTheme::new()
    } else {
        BerthTheme::plain()
    };
    let mut reporter = Reporter::new(theme, output_mode);

    let config_path = cli.config.as_deref();
    let result = match &cli.command {
        Commands::Deploy(args) => commands::deploy(config_path, args, &mut reporter),
        Commands::Plan => commands::plan(config_path, &mut reporter),
    };

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            reporter.error(&e.to_string());
            ExitCode::from(e.exit_code())
        }
    }
}
