//! Service activation.

use crate::error::{BerthError, Result};
use crate::host::HostContext;
use crate::pipeline::{DeployStep, StepState};

/// Enable and start the application service and nginx.
///
/// When the application service is already running during a repair pass it
/// gets a reload instead of a restart, so freshly deployed code is picked up
/// without dropping in-flight requests.
pub struct StartServices;

impl StartServices {
    fn units(host: &HostContext) -> [String; 2] {
        [host.config.service_name.clone(), "nginx".to_string()]
    }
}

impl DeployStep for StartServices {
    fn name(&self) -> &'static str {
        "start-services"
    }

    fn precondition(&self, host: &mut HostContext) -> Result<StepState> {
        let mut satisfied = 0;
        let units = Self::units(host);
        for unit in &units {
            if host.services.is_active(unit)? && host.services.is_enabled(unit)? {
                satisfied += 1;
            }
        }
        Ok(match satisfied {
            0 => StepState::Absent,
            n if n == units.len() => StepState::Present,
            _ => StepState::PartiallyPresent,
        })
    }

    fn action(&self, host: &mut HostContext, _state: StepState) -> Result<()> {
        let app_unit = host.config.service_name.clone();
        for unit in Self::units(host) {
            if !host.services.is_enabled(&unit)? {
                host.services.enable(&unit)?;
            }
            if host.services.is_active(&unit)? {
                // Already running: pick up the redeployed code gracefully.
                if unit == app_unit {
                    host.services.reload(&unit)?;
                }
            } else {
                host.services.start(&unit)?;
            }
        }
        Ok(())
    }

    fn postcondition(&self, host: &mut HostContext) -> Result<()> {
        for unit in Self::units(host) {
            if !host.services.is_active(&unit)? {
                return Err(BerthError::ServiceManager {
                    operation: format!("start {}", unit),
                    message: "unit not active after start".to_string(),
                });
            }
        }
        Ok(())
    }
}
