//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! All optional:
//! - `STOREFRONT_DATA_DIR` - Local persistence directory (default: `.storefront`)
//! - `STOREFRONT_CATALOG_PATH` - Catalog JSON file (default: `fixtures/demo_catalog.json`)
//! - `STOREFRONT_SUBMIT_TIMEOUT_MS` - Per-step checkout timeout (default: 10000)
//! - `STOREFRONT_PICKUP_DELAYS` - Offered pickup delays in minutes (default: `20,30,40,60`)
//! - `STOREFRONT_ACTOR_BUFFER` - Actor channel capacity (default: 32)

use crate::checkout::{CheckoutSettings, DEFAULT_PICKUP_DELAYS};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Storefront runtime configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// Where the cart and the sign-in record are kept
    pub data_dir: PathBuf,
    pub catalog_path: PathBuf,
    /// Upper bound for each checkout step
    pub submit_timeout: Duration,
    pub pickup_delays: Vec<u32>,
    pub actor_buffer: usize,
}

impl Default for StorefrontConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(".storefront"),
            catalog_path: PathBuf::from("fixtures/demo_catalog.json"),
            submit_timeout: Duration::from_millis(10_000),
            pickup_delays: DEFAULT_PICKUP_DELAYS.to_vec(),
            actor_buffer: 32,
        }
    }
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set but does not parse.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let defaults = Self::default();
        let data_dir = get_optional_env("STOREFRONT_DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or(defaults.data_dir);
        let catalog_path = get_optional_env("STOREFRONT_CATALOG_PATH")
            .map(PathBuf::from)
            .unwrap_or(defaults.catalog_path);
        let submit_timeout =
            Duration::from_millis(get_parsed_env("STOREFRONT_SUBMIT_TIMEOUT_MS", 10_000)?);
        let pickup_delays = match get_optional_env("STOREFRONT_PICKUP_DELAYS") {
            Some(raw) => parse_pickup_delays(&raw).map_err(|e| {
                ConfigError::InvalidEnvVar("STOREFRONT_PICKUP_DELAYS".to_string(), e)
            })?,
            None => defaults.pickup_delays,
        };
        let actor_buffer = get_parsed_env("STOREFRONT_ACTOR_BUFFER", defaults.actor_buffer)?;
        if actor_buffer == 0 {
            return Err(ConfigError::InvalidEnvVar(
                "STOREFRONT_ACTOR_BUFFER".to_string(),
                "must be greater than zero".to_string(),
            ));
        }

        Ok(Self {
            data_dir,
            catalog_path,
            submit_timeout,
            pickup_delays,
            actor_buffer,
        })
    }

    pub fn checkout_settings(&self) -> CheckoutSettings {
        CheckoutSettings {
            submit_timeout: self.submit_timeout,
            pickup_delays: self.pickup_delays.clone(),
        }
    }
}

/// Parses a comma-separated list of minutes, e.g. `20, 30,40`.
fn parse_pickup_delays(raw: &str) -> Result<Vec<u32>, String> {
    let delays = raw
        .split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(|part| part.parse::<u32>().map_err(|e| format!("{part}: {e}")))
        .collect::<Result<Vec<_>, _>>()?;
    if delays.is_empty() {
        return Err("at least one delay is required".to_string());
    }
    Ok(delays)
}

fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

fn get_parsed_env<T>(key: &str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match get_optional_env(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string())),
        None => Ok(default),
    }
}
