//! Process configuration, read once from the environment at startup.
//!
//! | Variable         | Default   |
//! |------------------|-----------|
//! | `SERVER_HOST`    | `0.0.0.0` |
//! | `SERVER_PORT`    | `8080`    |
//! | `GAME_ID_LENGTH` | `4`       |
//! | `DEBUG`          | `0`       |

use std::str::FromStr;

use roundkeep_session::{StoreConfig, DEFAULT_ID_LENGTH};

/// Errors from reading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// A variable is set but can't be parsed.
    #[error("invalid value for {var}: {value:?}")]
    Invalid { var: &'static str, value: String },
}

/// Server settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// Host or IP to listen on.
    pub host: String,
    /// TCP port to listen on.
    pub port: u16,
    /// Length of generated game codes.
    pub id_length: usize,
    /// Debug logging when `DEBUG=1`.
    pub debug: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            id_length: DEFAULT_ID_LENGTH,
            debug: false,
        }
    }
}

impl ServerConfig {
    /// Reads the process environment.
    ///
    /// # Errors
    /// Returns [`ConfigError::Invalid`] if `SERVER_PORT` or
    /// `GAME_ID_LENGTH` is set to something that isn't a number.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Reads configuration through `lookup` instead of the real
    /// environment. Missing variables fall back to defaults.
    pub fn from_lookup(
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let defaults = Self::default();
        Ok(Self {
            host: lookup("SERVER_HOST").unwrap_or(defaults.host),
            port: parse_var(&lookup, "SERVER_PORT", defaults.port)?,
            id_length: parse_var(&lookup, "GAME_ID_LENGTH", defaults.id_length)?,
            debug: lookup("DEBUG").is_some_and(|v| v.trim() == "1"),
        })
    }

    /// `host:port`, ready for binding.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Session store settings derived from this config.
    pub fn store_config(&self) -> StoreConfig {
        StoreConfig {
            id_length: self.id_length,
        }
    }

    /// Default `tracing` filter when `RUST_LOG` is not set.
    pub fn log_filter(&self) -> &'static str {
        if self.debug { "debug" } else { "info" }
    }
}

fn parse_var<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    var: &'static str,
    default: T,
) -> Result<T, ConfigError> {
    match lookup(var) {
        None => Ok(default),
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { var, value }),
    }
}
