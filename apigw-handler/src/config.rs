use std::time::Duration;

use crate::error::ConfigError;
use crate::writer::RetryPolicy;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub table_name: String,
    pub retry: RetryPolicy,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let table_name = lookup("TABLE_NAME")
            .filter(|value| !value.trim().is_empty())
            .ok_or(ConfigError::Missing("TABLE_NAME"))?;

        let defaults = RetryPolicy::default();
        let max_attempts = match lookup("PUT_MAX_ATTEMPTS") {
            Some(value) => match value.trim().parse::<u32>() {
                Ok(attempts) if attempts >= 1 => attempts,
                _ => {
                    return Err(ConfigError::Invalid {
                        name: "PUT_MAX_ATTEMPTS",
                        value,
                    })
                }
            },
            None => defaults.max_attempts,
        };
        let backoff_base = match lookup("PUT_BACKOFF_BASE_MS") {
            Some(value) => value
                .trim()
                .parse::<u64>()
                .map(Duration::from_millis)
                .map_err(|_| ConfigError::Invalid {
                    name: "PUT_BACKOFF_BASE_MS",
                    value,
                })?,
            None => defaults.backoff_base,
        };
        let retry_enabled = lookup("PUT_RETRY_ENABLED")
            .map(|value| match value.trim().to_ascii_lowercase().as_str() {
                "0" | "false" | "no" | "off" => false,
                _ => true,
            })
            .unwrap_or(true);

        let retry = if retry_enabled {
            RetryPolicy {
                max_attempts,
                backoff_base,
            }
        } else {
            RetryPolicy::disabled()
        };

        Ok(Config { table_name, retry })
    }
}

/// Where an invocation gets its configuration from.
pub trait ConfigSource {
    fn load(&self) -> Result<Config, ConfigError>;
}

/// Reads the process environment on every call.
pub struct Env;

impl ConfigSource for Env {
    fn load(&self) -> Result<Config, ConfigError> {
        Config::from_env()
    }
}

impl ConfigSource for Config {
    fn load(&self) -> Result<Config, ConfigError> {
        Ok(self.clone())
    }
}
