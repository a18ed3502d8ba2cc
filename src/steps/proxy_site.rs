//! Reverse-proxy site installation.

use crate::error::{BerthError, Result};
use crate::host::HostContext;
use crate::payload;
use crate::pipeline::{DeployStep, StepState};

/// Install and enable the nginx site, then validate and reload.
///
/// The reload only happens after `nginx -t` passes. A syntax error in the
/// full configuration (including sites this tool never wrote) aborts the
/// step before nginx is asked to pick anything up.
pub struct ProxySite;

impl DeployStep for ProxySite {
    fn name(&self) -> &'static str {
        "proxy-site"
    }

    fn precondition(&self, host: &mut HostContext) -> Result<StepState> {
        let rendered = payload::nginx_site(&host.config);
        let name = host.config.service_name.clone();
        let matches = host.proxy.site_matches(&name, &rendered)?;
        let enabled = host.proxy.site_enabled(&name)?;
        Ok(match (matches, enabled) {
            (true, true) => StepState::Present,
            (false, false) => StepState::Absent,
            _ => StepState::PartiallyPresent,
        })
    }

    fn action(&self, host: &mut HostContext, _state: StepState) -> Result<()> {
        let rendered = payload::nginx_site(&host.config);
        let name = host.config.service_name.clone();
        if !host.proxy.site_matches(&name, &rendered)? {
            host.proxy.install_site(&name, &rendered)?;
        }
        if !host.proxy.site_enabled(&name)? {
            host.proxy.enable_site(&name)?;
        }
        // validate gates the reload unconditionally
        host.proxy.validate_config()?;
        host.proxy.reload()
    }

    fn postcondition(&self, host: &mut HostContext) -> Result<()> {
        let rendered = payload::nginx_site(&host.config);
        let name = host.config.service_name.clone();
        if !host.proxy.site_matches(&name, &rendered)? {
            return Err(BerthError::StepFailed {
                step: self.name().to_string(),
                message: "installed site does not match expected definition".to_string(),
            });
        }
        if !host.proxy.site_enabled(&name)? {
            return Err(BerthError::StepFailed {
                step: self.name().to_string(),
                message: "site not enabled after installation".to_string(),
            });
        }
        Ok(())
    }
}
