//! Rendered configuration payloads.
//!
//! These are the opaque config-file texts the pipeline materializes onto the
//! host: the systemd unit, the nginx site, and the logrotate policy. Each is
//! a pure function of the deploy configuration, so the steps can both write
//! them and compare the installed files against the expected content.

use crate::config::DeployConfig;

/// systemd unit for the application service.
///
/// Reload sends HUP so gunicorn recycles workers without dropping in-flight
/// requests; logrotate's postrotate relies on this.
pub fn systemd_unit(config: &DeployConfig) -> String {
    format!(
        "\
[Unit]
Description={service} web service
After=network.target

[Service]
Type=simple
User={account}
Group={account}
WorkingDirectory={app_root}
Environment=\"PATH={venv}/bin\"
ExecStart={venv}/bin/gunicorn --config {app_root}/gunicorn.conf.py wsgi:application
ExecReload=/bin/kill -s HUP $MAINPID
Restart=always
RestartSec=5

[Install]
WantedBy=multi-user.target
",
        service = config.service_name,
        account = config.account,
        app_root = config.app_root.display(),
        venv = config.venv_dir().display(),
    )
}

/// nginx site proxying to the application server.
pub fn nginx_site(config: &DeployConfig) -> String {
    format!(
        "\
server {{
    listen 80;
    server_name {server_name};

    client_max_body_size 16M;

    access_log {log_dir}/nginx-access.log;
    error_log {log_dir}/nginx-error.log;

    location /static/ {{
        alias {app_root}/static/;
    }}

    location / {{
        proxy_pass http://{bind};
        proxy_set_header Host $host;
        proxy_set_header X-Real-IP $remote_addr;
        proxy_set_header X-Forwarded-For $proxy_add_x_forwarded_for;
        proxy_set_header X-Forwarded-Proto $scheme;
        proxy_read_timeout 30s;
    }}
}}
",
        server_name = config.server_name,
        log_dir = config.log_dir.display(),
        app_root = config.app_root.display(),
        bind = config.bind_address,
    )
}

/// logrotate policy for the service's log directory.
///
/// postrotate reloads instead of restarting, so rotation never drops
/// in-flight requests.
pub fn logrotate_policy(config: &DeployConfig) -> String {
    format!(
        "\
{log_dir}/*.log {{
    daily
    rotate 14
    compress
    delaycompress
    missingok
    notifempty
    create 0640 {account} {account}
    sharedscripts
    postrotate
        systemctl reload {service} >/dev/null 2>&1 || true
    endscript
}}
",
        log_dir = config.log_dir.display(),
        account = config.account,
        service = config.service_name,
    )
}
