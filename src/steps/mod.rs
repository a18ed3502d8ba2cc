//! The concrete deployment steps, in their required order.
//!
//! The order is load-bearing: the service account must exist before files
//! are chowned to it, packages before the service unit that needs them, and
//! proxy validation before any reload. [`standard_pipeline`] is the single
//! place the sequence is defined.

mod account;
mod app_files;
mod directories;
mod logrotate;
mod packages;
mod proxy_site;
mod runtime_env;
mod services;
mod systemd_unit;

pub use account::ServiceAccount;
pub use app_files::ApplicationFiles;
pub use directories::Directories;
pub use logrotate::LogRotation;
pub use packages::{InstallDependencies, RefreshPackageIndex};
pub use proxy_site::ProxySite;
pub use runtime_env::RuntimeEnvironment;
pub use services::StartServices;
pub use systemd_unit::SupervisionUnit;

use crate::pipeline::Pipeline;

/// Build the fixed deployment pipeline.
pub fn standard_pipeline() -> Pipeline {
    Pipeline::new(vec![
        Box::new(RefreshPackageIndex::new()),
        Box::new(InstallDependencies::new()),
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
