//! End-to-end pipeline scenarios against the in-memory fake host.

use std::path::PathBuf;
use std::time::Duration;

use berth::config::DeployConfig;
use berth::host::fake::FakeHost;
use berth::host::HostContext;
use berth::pipeline::{
    Backoff, HealthVerdict, OutcomeStatus, OverallResult, Pipeline, RunOptions, RunReport,
};
use berth::steps::{
    ApplicationFiles, Directories, InstallDependencies, LogRotation, ProxySite,
    RefreshPackageIndex, RuntimeEnvironment, ServiceAccount, StartServices, SupervisionUnit,
};
use berth::ui::Reporter;

fn test_config() -> DeployConfig {
    DeployConfig {
        source_dir: PathBuf::from("/srv/checkout"),
        settle_secs: 0,
        ..Default::default()
    }
}

fn instant() -> Backoff {
    Backoff::new(3, Duration::ZERO, Duration::ZERO)
}

/// The standard pipeline with all retry delays zeroed.
fn instant_pipeline() -> Pipeline {
    Pipeline::new(vec![
        Box::new(RefreshPackageIndex::with_backoff(instant())),
        Box::new(InstallDependencies::with_backoff(instant())),
        Box::new(ServiceAccount),
        Box::new(Directories),
        Box::new(ApplicationFiles),
        Box::new(RuntimeEnvironment),
        Box::new(SupervisionUnit),
        Box::new(ProxySite),
        Box::new(LogRotation),
        Box::new(StartServices),
    ])
}

fn run(host: &mut HostContext) -> RunReport {
    let mut reporter = Reporter::silent();
    let options = RunOptions {
        skip_health: false,
        probe_backoff: instant(),
    };
    instant_pipeline().run(host, &mut reporter, &options)
}

fn statuses(report: &RunReport) -> Vec<(String, OutcomeStatus)> {
    report
        .outcomes
        .iter()
        .map(|o| (o.name.clone(), o.status))
        .collect()
}

#[test]
fn fresh_host_applies_every_step_and_passes_health() {
    let (mut host, state) = FakeHost::context(test_config());
    {
        let mut s = state.lock().unwrap();
        s.provision_source(&host.config);
        s.probe_status = Some(200);
    }

    let report = run(&mut host);

    assert!(report.is_success());
    assert_eq!(report.exit_code(), 0);
    assert_eq!(report.health, HealthVerdict::Passed);
    for (name, status) in statuses(&report) {
        assert_eq!(status, OutcomeStatus::Applied, "step {}", name);
    }

    let s = state.lock().unwrap();
    assert!(s.installed.contains("nginx"));
    assert!(s.accounts.contains_key("pdf-parser"));
    assert!(s.venv_exists);
    assert!(s.active_units.contains("pdf-parser"));
    assert!(s.active_units.contains("nginx"));
    assert_eq!(s.proxy_reloads, 1);
    assert!(s.validate_calls >= 1);
    assert_eq!(s.probe_calls, 1);
}

#[test]
fn partially_provisioned_host_skips_and_repairs() {
    let (mut host, state) = FakeHost::context(test_config());
    {
        let mut s = state.lock().unwrap();
        s.provision_source(&host.config);
        s.probe_status = Some(200);
        // Account and directories were set up by hand earlier.
        s.accounts
            .insert("pdf-parser".to_string(), PathBuf::from("/opt/pdf-parser"));
        s.dirs.insert(
            PathBuf::from("/opt/pdf-parser"),
            ("root".to_string(), 0o700),
        );
    }

    let report = run(&mut host);

    assert!(report.is_success());
    let by_name: std::collections::BTreeMap<_, _> = statuses(&report).into_iter().collect();
    assert_eq!(by_name["service-account"], OutcomeStatus::Skipped);
    assert_eq!(by_name["directories"], OutcomeStatus::Repaired);
    assert_eq!(by_name["application-files"], OutcomeStatus::Applied);
    assert_eq!(by_name["start-services"], OutcomeStatus::Applied);

    // Drifted ownership got fixed.
    let s = state.lock().unwrap();
    assert_eq!(
        s.dirs.get(&PathBuf::from("/opt/pdf-parser")),
        Some(&("pdf-parser".to_string(), 0o755))
    );
}

#[test]
fn invalid_proxy_config_aborts_without_reload() {
    let (mut host, state) = FakeHost::context(test_config());
    {
        let mut s = state.lock().unwrap();
        s.provision_source(&host.config);
        s.probe_status = Some(200);
        s.proxy_config_valid = false;
    }

    let report = run(&mut host);

    assert!(!report.is_success());
    assert_eq!(report.exit_code(), 1);
    assert_eq!(
        report.overall,
        OverallResult::Failed {
            at_step: "proxy-site".to_string()
        }
    );
    assert_eq!(report.health, HealthVerdict::Skipped);

    let by_name: std::collections::BTreeMap<_, _> = statuses(&report).into_iter().collect();
    assert_eq!(by_name["log-rotation"], OutcomeStatus::NotRun);
    assert_eq!(by_name["start-services"], OutcomeStatus::NotRun);

    let s = state.lock().unwrap();
    // validate ran, reload never did, nothing was started
    assert_eq!(s.validate_calls, 1);
    assert_eq!(s.proxy_reloads, 0);
    assert!(!s.active_units.contains("pdf-parser"));
    // Work from earlier steps persists; nothing is rolled back.
    assert!(s.venv_exists);
    assert!(s.accounts.contains_key("pdf-parser"));
    assert_eq!(s.probe_calls, 0);
}

#[test]
fn unreachable_health_endpoint_is_advisory() {
    let (mut host, state) = FakeHost::context(test_config());
    {
        let mut s = state.lock().unwrap();
        s.provision_source(&host.config);
        s.probe_status = None;
    }

    let report = run(&mut host);

    assert!(report.is_success());
    assert_eq!(report.exit_code(), 0);
    match report.health {
        HealthVerdict::Failed { ref reason } => assert!(reason.contains("connection refused")),
        ref other => panic!("expected failed health verdict, got {:?}", other),
    }
    // Probe was retried before giving up.
    assert_eq!(state.lock().unwrap().probe_calls, 3);
}

#[test]
fn second_run_converges_to_skips_and_repairs() {
    let (mut host, state) = FakeHost::context(test_config());
    {
        let mut s = state.lock().unwrap();
        s.provision_source(&host.config);
        s.probe_status = Some(200);
    }

    let first = run(&mut host);
    assert!(first.is_success());
    let reloads_after_first = state.lock().unwrap().proxy_reloads;

    let second = run(&mut host);
    assert!(second.is_success());

    let by_name: std::collections::BTreeMap<_, _> = statuses(&second).into_iter().collect();
    // The index refresh is always re-attempted; the two ownership-repair
    // steps re-apply; everything else is a no-op.
    assert_eq!(by_name["package-index"], OutcomeStatus::Applied);
    assert_eq!(by_name["directories"], OutcomeStatus::Repaired);
    assert_eq!(by_name["application-files"], OutcomeStatus::Repaired);
    for name in [
        "dependencies",
        "service-account",
        "runtime-environment",
        "supervision-unit",
        "proxy-site",
        "log-rotation",
        "start-services",
    ] {
        assert_eq!(by_name[name], OutcomeStatus::Skipped, "step {}", name);
    }

    let s = state.lock().unwrap();
    // No second install, no second venv build, no second proxy reload.
    assert_eq!(s.install_calls.len(), 1);
    assert_eq!(s.manifest_installs, 1);
    assert_eq!(s.proxy_reloads, reloads_after_first);
}

#[test]
fn install_failure_stops_everything_downstream() {
    let (mut host, state) = FakeHost::context(test_config());
    {
        let mut s = state.lock().unwrap();
        s.provision_source(&host.config);
        s.fail_install = true;
    }

    let report = run(&mut host);

    assert!(!report.is_success());
    assert_eq!(
        report.overall,
        OverallResult::Failed {
            at_step: "dependencies".to_string()
        }
    );

    let s = state.lock().unwrap();
    // Install was retried, then the run stopped before touching anything else.
    assert_eq!(s.install_calls.len(), 3);
    assert!(s.accounts.is_empty());
    assert!(s.dirs.is_empty());
    assert!(!s.venv_exists);
}

#[test]
fn skip_health_never_probes() {
    let (mut host, state) = FakeHost::context(test_config());
    {
        let mut s = state.lock().unwrap();
        s.provision_source(&host.config);
        s.probe_status = Some(200);
    }

    let mut reporter = Reporter::silent();
    let options = RunOptions {
        skip_health: true,
        probe_backoff: instant(),
    };
    let report = instant_pipeline().run(&mut host, &mut reporter, &options);

    assert!(report.is_success());
    assert_eq!(report.health, HealthVerdict::Skipped);
    assert_eq!(state.lock().unwrap().probe_calls, 0);
}

#[test]
fn error_status_from_health_endpoint_fails_probe() {
    let (mut host, state) = FakeHost::context(test_config());
    {
        let mut s = state.lock().unwrap();
        s.provision_source(&host.config);
        s.probe_status = Some(500);
    }

    let report = run(&mut host);

    assert!(report.is_success());
    match report.health {
        HealthVerdict::Failed { ref reason } => assert!(reason.contains("500")),
        ref other => panic!("expected failed health verdict, got {:?}", other),
    }
}
