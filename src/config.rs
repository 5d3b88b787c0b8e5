//! Configuration module
//!
//! Loads configuration from environment variables (and `.env`, via dotenvy).

use std::env;

use crate::domain::{CurrencyConverter, RateTable};

/// Default SQLite database path
pub const DEFAULT_DATABASE: &str = "fxledger.db";

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// SQLite database path
    pub database_path: String,

    /// Exchange rates: built-in table with any overrides applied
    pub rates: RateTable,

    /// Report errors with the flattened per-operation messages of the older API
    pub legacy_errors: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_path: DEFAULT_DATABASE.to_string(),
            rates: RateTable::default(),
            legacy_errors: false,
        }
    }
}

impl Config {
    /// Load configuration from the process environment, reading `.env` first if present.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_path = lookup("FXLEDGER_DATABASE")
            .filter(|path| !path.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_DATABASE.to_string());

        let rates = match lookup("FXLEDGER_RATES") {
            Some(raw) => {
                let overrides = RateTable::parse(&raw)
                    .map_err(|_| ConfigError::InvalidValue("FXLEDGER_RATES"))?;
                RateTable::default()
                    .merge(overrides)
                    .map_err(|_| ConfigError::InvalidValue("FXLEDGER_RATES"))?
            }
            None => RateTable::default(),
        };

        let legacy_errors = match lookup("FXLEDGER_LEGACY_ERRORS") {
            Some(raw) => parse_bool(&raw)
                .ok_or(ConfigError::InvalidValue("FXLEDGER_LEGACY_ERRORS"))?,
            None => false,
        };

        Ok(Self {
            database_path,
            rates,
            legacy_errors,
        })
    }

    /// Build a converter over the configured rate table.
    pub fn converter(&self) -> CurrencyConverter {
        CurrencyConverter::new(self.rates.clone())
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Configuration error types
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for environment variable: {0}")]
    InvalidValue(&'static str),
}
