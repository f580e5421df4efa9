//! One-shot lookup of the tracking endpoint path.
//!
//! The settings service answers `GET` with a JSON object carrying at least an
//! `endpoint` string. Any failure falls back to the configured default path.

use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;
use tracing::{info, warn};

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("settings request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("settings service returned HTTP {0}")]
    Status(u16),

    #[error("settings response is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("settings response has no endpoint")]
    MissingEndpoint,
}

#[derive(Debug, Deserialize)]
struct RemoteSettings {
    endpoint: Option<String>,
}

pub struct SettingsClient {
    client: reqwest::Client,
    url: String,
    timeout: Duration,
}

impl SettingsClient {
    pub fn new(client: reqwest::Client, url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            client,
            url: url.into(),
            timeout,
        }
    }

    pub async fn fetch_endpoint(&self) -> Result<String, SettingsError> {
        let resp = self
            .client
            .get(&self.url)
            .timeout(self.timeout)
            .send()
            .await?;

        let status = resp.status();
        if status != reqwest::StatusCode::OK {
            return Err(SettingsError::Status(status.as_u16()));
        }

        let body = resp.bytes().await?;
        let settings: RemoteSettings = serde_json::from_slice(&body)?;
        settings
            .endpoint
            .as_deref()
            .and_then(normalize_endpoint)
            .ok_or(SettingsError::MissingEndpoint)
    }

    /// Fetch the endpoint, falling back to `default` on any failure
    pub async fn resolve_endpoint(&self, default: &str) -> String {
        match self.fetch_endpoint().await {
            Ok(endpoint) => {
                info!(%endpoint, "loaded settings");
                endpoint
            }
            Err(e) => {
                warn!(error = %e, fallback = default, "failed to load settings, using default endpoint");
                default.to_string()
            }
        }
    }
}

/// Trim and ensure a leading slash; `None` for blank input
fn normalize_endpoint(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    if trimmed.starts_with('/') {
        Some(trimmed.to_string())
    } else {
        Some(format!("/{trimmed}"))
    }
}
