use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;
use validator::{Validate, ValidationError, ValidationErrors};

use crate::driver::LoadModel;
use crate::payload::PayloadSchema;

const CONFIG_FILE: &str = "config/default.toml";
const ENV_PREFIX: &str = "LOADGEN__";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read configuration: {0}")]
    Load(#[from] figment::Error),

    #[error("invalid configuration: {0}")]
    Invalid(#[from] ValidationErrors),
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct Config {
    #[validate(nested)]
    pub target: TargetConfig,
    #[validate(nested)]
    pub settings: SettingsConfig,
    #[validate(nested)]
    pub load: LoadConfig,
    #[validate(nested)]
    pub payload: PayloadConfig,
    #[validate(nested)]
    pub stats: StatsConfig,
    pub log_format: LogFormat,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct TargetConfig {
    #[validate(url)]
    pub base_url: String,
    #[validate(length(min = 1))]
    pub default_endpoint: String,
    #[validate(range(min = 1))]
    pub request_timeout_seconds: u64,
}

impl Default for TargetConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8081".to_string(),
            default_endpoint: "/track".to_string(),
            request_timeout_seconds: 10,
        }
    }
}

impl TargetConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_seconds)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct SettingsConfig {
    pub enabled: bool,
    #[validate(url)]
    pub url: String,
    #[validate(range(min = 1))]
    pub timeout_seconds: u64,
}

impl Default for SettingsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            url: "http://localhost:3000/api/settings".to_string(),
            timeout_seconds: 3,
        }
    }
}

impl SettingsConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(default)]
#[validate(schema(function = "validate_load_ranges"))]
pub struct LoadConfig {
    pub model: LoadModel,
    /// Sessions (pool model) or in-flight requests (semaphore model)
    #[validate(range(min = 1))]
    pub concurrency: usize,
    pub delay_min_ms: u64,
    pub delay_max_ms: u64,
    pub error_backoff_ms: u64,
    #[validate(range(min = 1))]
    pub session_min_events: usize,
    pub session_max_events: usize,
    pub submit_interval_min_ms: u64,
    pub submit_interval_max_ms: u64,
}

impl Default for LoadConfig {
    fn default() -> Self {
        Self {
            model: LoadModel::Semaphore,
            concurrency: 500,
            delay_min_ms: 0,
            delay_max_ms: 0,
            error_backoff_ms: 100,
            session_min_events: 1,
            session_max_events: 50,
            submit_interval_min_ms: 500,
            submit_interval_max_ms: 2_000,
        }
    }
}

impl LoadConfig {
    pub fn error_backoff(&self) -> Duration {
        Duration::from_millis(self.error_backoff_ms)
    }
}

fn validate_load_ranges(cfg: &LoadConfig) -> Result<(), ValidationError> {
    if cfg.delay_min_ms > cfg.delay_max_ms {
        return Err(ValidationError::new("delay_range"));
    }
    if cfg.session_min_events > cfg.session_max_events {
        return Err(ValidationError::new("session_events_range"));
    }
    if cfg.submit_interval_min_ms > cfg.submit_interval_max_ms {
        return Err(ValidationError::new("submit_interval_range"));
    }
    Ok(())
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(default)]
#[validate(schema(function = "validate_purchase_range"))]
pub struct PayloadConfig {
    pub schema: PayloadSchema,
    #[validate(url)]
    pub site_origin: String,
    #[validate(length(equal = 3))]
    pub currency: String,
    pub purchase_min: u32,
    pub purchase_max: u32,
    pub spoof_user_agent: bool,
    /// Fixed RNG seed for reproducible payload streams
    pub seed: Option<u64>,
}

impl Default for PayloadConfig {
    fn default() -> Self {
        Self {
            schema: PayloadSchema::Flat,
            site_origin: "https://pixel.example.com".to_string(),
            currency: "USD".to_string(),
            purchase_min: 10,
            purchase_max: 500,
            spoof_user_agent: true,
            seed: None,
        }
    }
}

fn validate_purchase_range(cfg: &PayloadConfig) -> Result<(), ValidationError> {
    if cfg.purchase_min > cfg.purchase_max {
        return Err(ValidationError::new("purchase_range"));
    }
    Ok(())
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct StatsConfig {
    #[validate(range(min = 1))]
    pub report_interval_ms: u64,
}

impl Default for StatsConfig {
    fn default() -> Self {
        Self {
            report_interval_ms: 1_000,
        }
    }
}

impl StatsConfig {
    pub fn report_interval(&self) -> Duration {
        Duration::from_millis(self.report_interval_ms)
    }
}

impl Config {
    /// Built-in defaults, then `config/default.toml`, then `LOADGEN__*` env vars
    pub fn figment() -> Figment {
        Figment::from(Serialized::defaults(Config::default()))
            .merge(Toml::file(CONFIG_FILE))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    pub fn load() -> Result<Self, ConfigError> {
        Self::from_figment(Self::figment())
    }

    pub fn from_figment(figment: Figment) -> Result<Self, ConfigError> {
        let cfg: Config = figment.extract()?;
        cfg.validate()?;
        Ok(cfg)
    }
}
