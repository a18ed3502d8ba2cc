//! Command implementations.

use std::path::{Path, PathBuf};

use tracing::info;

use crate::config::DeployConfig;
use crate::error::Result;
use crate::host::HostContext;
use crate::payload;
use crate::pipeline::{RunLock, RunOptions, DEFAULT_LOCK_PATH};
use crate::privilege;
use crate::steps::standard_pipeline;
use crate::ui::Reporter;

use super::args::DeployArgs;

/// Run the full deployment pipeline against this host.
///
/// Returns the process exit code: 0 for a structurally complete run (even if
/// the advisory health probe failed), 1 when a step failed. Privilege and
/// lock failures propagate as errors and carry their own exit codes.
pub fn deploy(
    config_path: Option<&Path>,
    args: &DeployArgs,
    reporter: &mut Reporter,
) -> Result<u8> {
    privilege::check()?;

    let mut config = DeployConfig::load(config_path)?;
    if let Some(secs) = args.settle_secs {
        config.settle_secs = secs;
    }

    let lock_path: PathBuf = args
        .lock_file
        .clone()
        .unwrap_or_else(|| PathBuf::from(DEFAULT_LOCK_PATH));
    let _lock = RunLock::acquire(&lock_path)?;
    info!(lock = %lock_path.display(), "run lock acquired");

    let mut host = HostContext::for_host(config);
    let pipeline = standard_pipeline();
    let options = RunOptions {
        skip_health: args.skip_health,
        ..Default::default()
    };

    let report = pipeline.run(&mut host, reporter, &options);
    reporter.summary(&report, &host.config);

    Ok(report.exit_code())
}

/// Print what a deployment would do, without touching the host.
///
/// Needs no privileges: everything shown is computed from configuration.
pub fn plan(config_path: Option<&Path>, reporter: &mut Reporter) -> Result<u8> {
    let config = DeployConfig::load(config_path)?;
    let pipeline = standard_pipeline();

    reporter.println(&format!("deployment plan for '{}':", config.service_name));
    for (index, name) in pipeline.step_names().iter().enumerate() {
        reporter.println(&format!("  {}. {}", index + 1, name));
    }

    reporter.println("");
    reporter.println("files this deployment materializes:");
    reporter.println(&format!(
        "  /etc/systemd/system/{}.service",
        config.service_name
    ));
    reporter.println(&format!(
        "  /etc/nginx/sites-available/{}",
        config.service_name
    ));
    reporter.println(&format!("  /etc/logrotate.d/{}", config.service_name));
    reporter.println(&format!(
        "  {} ({} application files)",
        config.app_root.display(),
        config.app_files.len()
    ));

    reporter.println("");
    reporter.println(&format!(
        "app server: gunicorn on {} (unit '{}')",
        config.bind_address, config.service_name
    ));
    reporter.println(&format!(
        "health probe: GET {} after a {}s settle",
        config.health_url(),
        config.settle_secs
    ));

    // Render the payloads so a syntactically broken config fails here, not
    // mid-deployment.
    let _ = payload::systemd_unit(&config);
    let _ = payload::nginx_site(&config);
    let _ = payload::logrotate_policy(&config);

    Ok(0)
}
