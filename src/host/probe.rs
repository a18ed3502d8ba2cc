//! HTTP health prober.

use std::time::Duration;

use crate::error::{BerthError, Result};

use super::HealthProber;

/// Probes the deployed service over HTTP with a per-request timeout.
pub struct HttpProber;

impl HttpProber {
    pub fn new() -> Self {
        Self
    }
}

impl Default for HttpProber {
    fn default() -> Self {
        Self::new()
    }
}

impl HealthProber for HttpProber {
    fn probe(&self, url: &str, timeout: Duration) -> Result<u16> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| BerthError::Probe {
                url: url.to_string(),
                message: format!("client construction failed: {}", e),
            })?;

        let response = client.get(url).send().map_err(|e| BerthError::Probe {
            url: url.to_string(),
            message: e.to_string(),
        })?;

        Ok(response.status().as_u16())
    }
}
