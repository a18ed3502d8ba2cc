//! Process-supervision unit installation.

use crate::error::{BerthError, Result};
use crate::host::HostContext;
use crate::payload;
use crate::pipeline::{DeployStep, StepState};

/// Install and enable (but do not start) the long-running service unit.
///
/// Starting happens in the final step, after the proxy and log rotation are
/// in place.
pub struct SupervisionUnit;

impl DeployStep for SupervisionUnit {
    fn name(&self) -> &'static str {
        "supervision-unit"
    }

    fn precondition(&self, host: &mut HostContext) -> Result<StepState> {
        let rendered = payload::systemd_unit(&host.config);
        let name = host.config.service_name.clone();
        let matches = host.services.unit_matches(&name, &rendered)?;
        let enabled = host.services.is_enabled(&name)?;
        Ok(match (matches, enabled) {
            (true, true) => StepState::Present,
            (false, false) => StepState::Absent,
            _ => StepState::PartiallyPresent,
        })
    }

    fn action(&self, host: &mut HostContext, _state: StepState) -> Result<()> {
        let rendered = payload::systemd_unit(&host.config);
        let name = host.config.service_name.clone();
        // Repair mode: only touch the deficient aspect.
        if !host.services.unit_matches(&name, &rendered)? {
            host.services.install_unit(&name, &rendered)?;
        }
        if !host.services.is_enabled(&name)? {
            host.services.enable(&name)?;
        }
        Ok(())
    }

    fn postcondition(&self, host: &mut HostContext) -> Result<()> {
        let rendered = payload::systemd_unit(&host.config);
        let name = host.config.service_name.clone();
        if !host.services.unit_matches(&name, &rendered)? {
            return Err(BerthError::ServiceManager {
                operation: format!("install-unit {}", name),
                message: "installed unit does not match expected definition".to_string(),
            });
        }
        if !host.services.is_enabled(&name)? {
            return Err(BerthError::ServiceManager {
                operation: format!("enable {}", name),
                message: "unit not enabled after installation".to_string(),
            });
        }
        Ok(())
    }
}
