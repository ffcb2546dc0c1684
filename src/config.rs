//! Runtime configuration
//!
//! Read once at startup from `MACROTRACKR_*` environment variables.

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

use crate::lookup::{openfoodfacts, usda};

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("{var} must be a number, got '{value}'")]
    NotANumber { var: &'static str, value: String },

    #[error("MACROTRACKR_RECOGNITION_THRESHOLD must be between 0 and 1, got {0}")]
    ThresholdOutOfRange(f64),

    #[error("MACROTRACKR_LOOKUP_TIMEOUT_SECS must be positive")]
    ZeroTimeout,

    #[error("MACROTRACKR_USER_ID must not be empty")]
    EmptyUserId,
}

pub const DEFAULT_USER_ID: &str = "local";
pub const DEFAULT_RECOGNITION_THRESHOLD: f64 = 0.3;
pub const DEFAULT_LOOKUP_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub database_path: PathBuf,
    pub user_id: String,
    pub recognition_threshold: f64,
    pub openfoodfacts_url: String,
    pub usda_url: String,
    pub usda_api_key: Option<String>,
    pub lookup_timeout: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup; empty values count as unset
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let database_path = get("MACROTRACKR_DATABASE_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(default_database_path);

        let user_id = match lookup("MACROTRACKR_USER_ID") {
            Some(v) if v.trim().is_empty() => return Err(ConfigError::EmptyUserId),
            Some(v) => v.trim().to_string(),
            None => DEFAULT_USER_ID.to_string(),
        };

        let recognition_threshold = match get("MACROTRACKR_RECOGNITION_THRESHOLD") {
            Some(raw) => {
                let value: f64 = raw.trim().parse().map_err(|_| ConfigError::NotANumber {
                    var: "MACROTRACKR_RECOGNITION_THRESHOLD",
                    value: raw.clone(),
                })?;
                if !(0.0..=1.0).contains(&value) {
                    return Err(ConfigError::ThresholdOutOfRange(value));
                }
                value
            }
            None => DEFAULT_RECOGNITION_THRESHOLD,
        };

        let timeout_secs = match get("MACROTRACKR_LOOKUP_TIMEOUT_SECS") {
            Some(raw) => raw.trim().parse::<u64>().map_err(|_| ConfigError::NotANumber {
                var: "MACROTRACKR_LOOKUP_TIMEOUT_SECS",
                value: raw.clone(),
            })?,
            None => DEFAULT_LOOKUP_TIMEOUT_SECS,
        };
        if timeout_secs == 0 {
            return Err(ConfigError::ZeroTimeout);
        }

        Ok(Self {
            database_path,
            user_id,
            recognition_threshold,
            openfoodfacts_url: get("MACROTRACKR_OPENFOODFACTS_URL")
                .unwrap_or_else(|| openfoodfacts::DEFAULT_BASE_URL.to_string()),
            usda_url: get("MACROTRACKR_USDA_URL").unwrap_or_else(|| usda::DEFAULT_BASE_URL.to_string()),
            usda_api_key: get("MACROTRACKR_USDA_API_KEY"),
            lookup_timeout: Duration::from_secs(timeout_secs),
        })
    }
}

/// `<project>/data/macrotrackr.db`, next to the executable's project root
pub fn default_database_path() -> PathBuf {
    let mut path = std::env::current_exe()
        .ok()
        .and_then(|p| p.parent().map(|p| p.to_path_buf()))
        .unwrap_or_else(|| PathBuf::from("."));

    // Go up from target/release or target/debug to project root
    if path.ends_with("release") || path.ends_with("debug") {
        if let Some(grandparent) = path.parent().and_then(|p| p.parent()) {
            path = grandparent.to_path_buf();
        }
    }

    path.push("data");
    path.push("macrotrackr.db");
    path
}
