//! Environment-based Configuration
//!
//! Runtime settings are loaded once at startup from environment variables:
//! a typed config struct, a `from_env()` constructor returning a typed
//! [`ConfigError`] rather than panicking, and sensible defaults for
//! everything optional.
//!
//! # Environment Variables
//!
//! - `BTC_SPV_DATA_DIR` - directory of `blk*.dat` files to index (required
//!   for the `index` subcommand; not consulted by `headers`/`verify`)
//! - `BTC_SPV_LISTEN_ADDR` - HTTP adapter bind address (default: "127.0.0.1")
//! - `BTC_SPV_LISTEN_PORT` - HTTP adapter bind port (default: "8080")
//! - `BTC_SPV_LOG_LEVEL` - "trace", "debug", "info", "warn", or "error" (default: "info")
//! - `BTC_SPV_LOG_FORMAT` - "pretty" or "json" (default: "pretty")

use std::env;
use std::str::FromStr;

use thiserror::Error;

use crate::logging::LogLevel;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {0}: {1}")]
    InvalidValue(String, String),
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Json,
}

impl FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pretty" => Ok(LogFormat::Pretty),
            "json" => Ok(LogFormat::Json),
            other => Err(ConfigError::InvalidValue(
                "BTC_SPV_LOG_FORMAT".to_string(),
                format!("unknown format: {other}"),
            )),
        }
    }
}

/// Process-wide runtime configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub data_dir: Option<String>,
    pub listen_addr: String,
    pub listen_port: u16,
    pub log_level: LogLevel,
    pub log_format: LogFormat,
}

impl Config {
    /// Load configuration from the environment, falling back to defaults
    /// for everything optional. `data_dir` is left unset rather than
    /// erroring, since only the `index` subcommand needs one.
    pub fn from_env() -> Result<Self, ConfigError> {
        let data_dir = env::var("BTC_SPV_DATA_DIR").ok();

        let listen_addr =
            env::var("BTC_SPV_LISTEN_ADDR").unwrap_or_else(|_| "127.0.0.1".to_string());

        let listen_port = match env::var("BTC_SPV_LISTEN_PORT") {
            Ok(raw) => raw.parse().map_err(|_| {
                ConfigError::InvalidValue("BTC_SPV_LISTEN_PORT".to_string(), raw)
            })?,
            Err(_) => 8080,
        };

        let log_level = match env::var("BTC_SPV_LOG_LEVEL") {
            Ok(raw) => LogLevel::from(raw.as_str()),
            Err(_) => LogLevel::Info,
        };

        let log_format = match env::var("BTC_SPV_LOG_FORMAT") {
            Ok(raw) => raw.parse()?,
            Err(_) => LogFormat::Pretty,
        };

        Ok(Self {
            data_dir,
            listen_addr,
            listen_port,
            log_level,
            log_format,
        })
    }

    pub fn listen_socket(&self) -> String {
        format!("{}:{}", self.listen_addr, self.listen_port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_format_parses_known_values() {
        assert_eq!("pretty".parse::<LogFormat>().unwrap(), LogFormat::Pretty);
        assert_eq!("JSON".parse::<LogFormat>().unwrap(), LogFormat::Json);
        assert!("yaml".parse::<LogFormat>().is_err());
    }

    #[test]
    fn listen_socket_combines_addr_and_port() {
        let config = Config {
            data_dir: None,
            listen_addr: "0.0.0.0".to_string(),
            listen_port: 9000,
            log_level: LogLevel::Info,
            log_format: LogFormat::Pretty,
        };
        assert_eq!(config.listen_socket(), "0.0.0.0:9000");
    }
}
