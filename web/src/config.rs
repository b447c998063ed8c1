//! Configuration management for the broker server.
//!
//! Loads configuration from environment variables with sensible defaults:
//!
//! | Variable              | Default   |
//! |-----------------------|-----------|
//! | `BROKER_HOST`         | `0.0.0.0` |
//! | `BROKER_PORT`         | `8080`    |
//! | `BROKER_LOG_LEVEL`    | `info`    |
//! | `BROKER_API_VERSION`  | `*`       |
//! | `BROKER_METRICS_ADDR` | unset     |

use crate::middleware::ANY_API_VERSION;
use serde::{Deserialize, Serialize};
use std::env;
use std::net::SocketAddr;
use thiserror::Error;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Errors while loading configuration.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    /// A variable is present but unparseable
    #[error("Invalid value for {name}: {value}")]
    Invalid {
        /// Variable name
        name: &'static str,
        /// Offending value
        value: String,
    },
}

/// Server configuration loaded from environment variables.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BrokerConfig {
    /// Host to bind to
    pub host: String,
    /// Port to bind to
    pub port: u16,
    /// Default log filter when `RUST_LOG` is unset
    pub log_level: String,
    /// Expected `X-Broker-API-Version`; `*` accepts any
    pub api_version: String,
    /// Prometheus scrape listener, if metrics are enabled
    pub metrics_addr: Option<SocketAddr>,
}

impl Default for BrokerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            log_level: "info".to_string(),
            api_version: ANY_API_VERSION.to_string(),
            metrics_addr: None,
        }
    }
}

impl BrokerConfig {
    /// Load configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] if `BROKER_PORT` or
    /// `BROKER_METRICS_ADDR` cannot be parsed.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Same as [`Self::from_env`].
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let port = match lookup("BROKER_PORT") {
            Some(value) => value.parse().map_err(|_| ConfigError::Invalid {
                name: "BROKER_PORT",
                value,
            })?,
            None => defaults.port,
        };

        let metrics_addr = lookup("BROKER_METRICS_ADDR")
            .map(|value| {
                value.parse().map_err(|_| ConfigError::Invalid {
                    name: "BROKER_METRICS_ADDR",
                    value,
                })
            })
            .transpose()?;

        Ok(Self {
            host: lookup("BROKER_HOST").unwrap_or(defaults.host),
            port,
            log_level: lookup("BROKER_LOG_LEVEL").unwrap_or(defaults.log_level),
            api_version: lookup("BROKER_API_VERSION").unwrap_or(defaults.api_version),
            metrics_addr,
        })
    }

    /// `host:port` to bind the broker API on.
    #[must_use]
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Install the global tracing subscriber.
///
/// `RUST_LOG` wins over the configured level. Calling this twice is harmless.
pub fn init_tracing(config: &BrokerConfig) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| format!("{},tower_http=debug", config.log_level).into());

    let installed = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .try_init();

    if installed.is_err() {
        tracing::debug!("Tracing subscriber already installed");
    }
}
