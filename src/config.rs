use crate::data::{DEFAULT_MAX_ATTEMPTS, MAX_ATTEMPTS_CEILING};
use std::env;
use std::net::SocketAddr;
use thiserror::Error;

pub const ENV_BIND_ADDR: &str = "SANTA_BIND_ADDR";
pub const ENV_LOG: &str = "SANTA_LOG";
pub const ENV_MAX_ATTEMPTS: &str = "SANTA_MAX_ATTEMPTS";

const DEFAULT_BIND_ADDR: &str = "127.0.0.1:8080";
const DEFAULT_LOG_FILTER: &str = "info";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{key} must be a socket address like 127.0.0.1:8080, got {value:?}")]
    BadAddress { key: &'static str, value: String },

    #[error("{key} must be an integer between 1 and {max}, got {value:?}", max = MAX_ATTEMPTS_CEILING)]
    BadAttempts { key: &'static str, value: String },
}

/// Server settings, read from the environment (and a `.env` file if present).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub bind_addr: SocketAddr,
    pub log_filter: String,
    /// Attempt budget for requests that do not name their own.
    pub max_attempts: u32,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenv::dotenv();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds a config from any key lookup; `from_env` passes the process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let bind_addr = match lookup(ENV_BIND_ADDR) {
            Some(value) => value.trim().parse().map_err(|_| ConfigError::BadAddress {
                key: ENV_BIND_ADDR,
                value: value.clone(),
            })?,
            None => DEFAULT_BIND_ADDR
                .parse()
                .map_err(|_| ConfigError::BadAddress {
                    key: ENV_BIND_ADDR,
                    value: DEFAULT_BIND_ADDR.to_string(),
                })?,
        };

        let log_filter = lookup(ENV_LOG)
            .filter(|value| !value.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_LOG_FILTER.to_string());

        let max_attempts = match lookup(ENV_MAX_ATTEMPTS) {
            Some(value) => match value.trim().parse::<u32>() {
                Ok(n) if (1..=MAX_ATTEMPTS_CEILING).contains(&n) => n,
                _ => {
                    return Err(ConfigError::BadAttempts {
                        key: ENV_MAX_ATTEMPTS,
                        value,
                    });
                }
            },
            None => DEFAULT_MAX_ATTEMPTS,
        };

        Ok(Self {
            bind_addr,
            log_filter,
            max_attempts,
        })
    }
}
