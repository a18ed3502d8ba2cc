//! Contextual hints printed after a run.

use crate::config::DeployConfig;

/// Diagnostics to try when a step failed.
pub fn failure_hints(config: &DeployConfig) -> Vec<String> {
    vec![
        format!("journalctl -u {} --no-pager -n 50", config.service_name),
        "re-run the same command once the cause is fixed; completed steps are skipped".to_string(),
    ]
}

/// Diagnostics to try when the deployment stands but the service won't answer.
pub fn health_failure_hints(config: &DeployConfig) -> Vec<String> {
    vec![
        format!("journalctl -u {} -f", config.service_name),
        format!("tail -f {}/gunicorn-error.log", config.log_dir.display()),
        format!("curl -v {}", config.health_url()),
    ]
}

/// Manual follow-ups after a successful deployment.
pub fn next_steps(config: &DeployConfig) -> Vec<String> {
    let mut steps = Vec::new();
    if config.server_name == "_" {
        steps.push("point DNS at this host and set server_name in the config".to_string());
    }
    steps.push("obtain a TLS certificate (e.g. certbot --nginx)".to_string());
    steps.push("open port 80/443 in the firewall if one is active".to_string());
    steps
}
