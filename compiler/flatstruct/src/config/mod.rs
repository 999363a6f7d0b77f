//! Engine configuration.

use serde::Deserialize;

use crate::error::ConfigError;

pub const MAX_ARRAY_CAPACITY_VAR: &str = "FLATSTRUCT_MAX_ARRAY_CAPACITY";
pub const LOG_LISTINGS_VAR: &str = "FLATSTRUCT_LOG_LISTINGS";

/// Tunables shared by the factories.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    /// Largest capacity hint an array factory accepts.
    pub max_array_capacity: usize,
    /// Log the pseudo-source of every newly specialized type at debug level.
    pub log_method_listings: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            max_array_capacity: 1 << 20,
            log_method_listings: false,
        }
    }
}

impl EngineConfig {
    /// Parse a JSON object. Missing keys keep their defaults.
    pub fn from_json(text: &str) -> Result<EngineConfig, ConfigError> {
        Ok(serde_json::from_str(text)?)
    }

    /// Defaults overridden by `FLATSTRUCT_*` environment variables.
    pub fn from_env() -> Result<EngineConfig, ConfigError> {
        EngineConfig::from_vars(|var| std::env::var(var).ok())
    }

    /// Like [`from_env`](Self::from_env), reading variables through `lookup`.
    pub fn from_vars(lookup: impl Fn(&str) -> Option<String>) -> Result<EngineConfig, ConfigError> {
        let mut config = EngineConfig::default();
        if let Some(value) = lookup(MAX_ARRAY_CAPACITY_VAR) {
            config.max_array_capacity =
                value.trim().parse().map_err(|_| ConfigError::InvalidEnv {
                    var: MAX_ARRAY_CAPACITY_VAR,
                    value: value.clone(),
                })?;
        }
        if let Some(value) = lookup(LOG_LISTINGS_VAR) {
            config.log_method_listings = match value.trim() {
                "1" | "true" | "yes" => true,
                "0" | "false" | "no" | "" => false,
                _ => {
                    return Err(ConfigError::InvalidEnv {
                        var: LOG_LISTINGS_VAR,
                        value,
                    })
                }
            };
        }
        Ok(config)
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    reason = "tests use unwrap to panic on unexpected state"
)]
mod tests;
