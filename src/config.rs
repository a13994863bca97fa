use config::{Config, ConfigError, Environment, File};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::env;
use tracing::info;
use validator::{Validate, ValidationError};

/// Default values for configuration
const DEFAULT_LOG_LEVEL: &str = "info";
const DEFAULT_ENV: &str = "development";
const DEFAULT_CURRENCY: &str = "INR";
const DEFAULT_BNPL_MINIMUM: u64 = 3000;
const DEFAULT_REWARD_COIN_RATE: &str = "0.02";
const DEFAULT_IMAGE_UPLOAD_TIMEOUT_SECS: u64 = 30;
const DEFAULT_EVENT_BUFFER: usize = 1024;
const CONFIG_DIR: &str = "config";

/// Application configuration with validation.
///
/// Commerce policy knobs (deferred-payment threshold, reward rate) live here
/// rather than in the services so a storefront can retune them without code
/// changes.
#[derive(Clone, Debug, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct AppConfig {
    /// Runtime environment name ("development", "production", ...)
    #[serde(default = "default_env")]
    pub environment: String,

    /// Log level used when RUST_LOG is unset
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Emit logs as JSON
    #[serde(default)]
    pub log_json: bool,

    /// ISO 4217 display currency for checkout requests
    #[validate(length(min = 3, max = 3, message = "currency must be 3 characters"))]
    #[serde(default = "default_currency")]
    pub currency: String,

    /// Minimum cart total for the deferred-payment (pay-later) option
    #[validate(custom = "validate_non_negative")]
    #[serde(default = "default_bnpl_minimum")]
    pub bnpl_minimum: Decimal,

    /// Fraction of a paid order's total credited as reward coins
    #[validate(custom = "validate_rate")]
    #[serde(default = "default_reward_coin_rate")]
    pub reward_coin_rate: Decimal,

    /// Per-image upload deadline for review photos
    #[serde(default = "default_image_upload_timeout_secs")]
    pub image_upload_timeout_secs: u64,

    /// Buffer size for the domain event channel
    #[serde(default = "default_event_buffer")]
    pub event_buffer: usize,
}

fn default_env() -> String {
    DEFAULT_ENV.to_string()
}

fn default_log_level() -> String {
    DEFAULT_LOG_LEVEL.to_string()
}

fn default_currency() -> String {
    DEFAULT_CURRENCY.to_string()
}

fn default_bnpl_minimum() -> Decimal {
    Decimal::from(DEFAULT_BNPL_MINIMUM)
}

fn default_reward_coin_rate() -> Decimal {
    DEFAULT_REWARD_COIN_RATE
        .parse()
        .unwrap_or_else(|_| Decimal::ZERO)
}

fn default_image_upload_timeout_secs() -> u64 {
    DEFAULT_IMAGE_UPLOAD_TIMEOUT_SECS
}

fn default_event_buffer() -> usize {
    DEFAULT_EVENT_BUFFER
}

fn validate_non_negative(value: &Decimal) -> Result<(), ValidationError> {
    if value.is_sign_negative() {
        return Err(ValidationError::new("must be non-negative"));
    }
    Ok(())
}

fn validate_rate(value: &Decimal) -> Result<(), ValidationError> {
    if value.is_sign_negative() || *value > Decimal::ONE {
        return Err(ValidationError::new("must be within [0, 1]"));
    }
    Ok(())
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            environment: default_env(),
            log_level: default_log_level(),
            log_json: false,
            currency: default_currency(),
            bnpl_minimum: default_bnpl_minimum(),
            reward_coin_rate: default_reward_coin_rate(),
            image_upload_timeout_secs: default_image_upload_timeout_secs(),
            event_buffer: default_event_buffer(),
        }
    }
}

impl AppConfig {
    pub fn log_level(&self) -> &str {
        &self.log_level
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}

/// Loads configuration from `config/default.toml`, an environment-specific
/// overlay, and `APP__`-prefixed environment variables (in that order).
pub fn load_config() -> Result<AppConfig, ConfigError> {
    let run_env = env::var("RUN_ENV").unwrap_or_else(|_| DEFAULT_ENV.to_string());

    let config = Config::builder()
        .add_source(File::with_name(&format!("{}/default", CONFIG_DIR)).required(false))
        .add_source(File::with_name(&format!("{}/{}", CONFIG_DIR, run_env)).required(false))
        .add_source(Environment::with_prefix("APP").separator("__"))
        .build()?;

    let app_config: AppConfig = config.try_deserialize()?;

    app_config
        .validate()
        .map_err(|e| ConfigError::Message(format!("invalid configuration: {}", e)))?;

    info!(environment = %app_config.environment, "Configuration loaded");
    Ok(app_config)
}

/// Initializes the global tracing subscriber.
///
/// RUST_LOG, when set and non-empty, overrides the configured level.
pub fn init_tracing(level: &str, json: bool) {
    use tracing_subscriber::{fmt, EnvFilter};

    let default_directive = format!("storefront_core={}", level);
    let filter_directive = env::var("RUST_LOG")
        .ok()
        .filter(|s| !s.trim().is_empty())
        .unwrap_or(default_directive);

    if json {
        let _ = fmt()
            .with_env_filter(EnvFilter::new(filter_directive))
            .json()
            .try_init();
    } else {
        let _ = fmt()
            .with_env_filter(EnvFilter::new(filter_directive))
            .try_init();
    }
}
