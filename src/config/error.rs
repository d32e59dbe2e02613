//! Configuration error types.

use thiserror::Error;

/// Errors that can occur during configuration loading and validation.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Port value is outside valid range (1-65535).
    #[error("invalid port '{value}': must be between 1 and 65535")]
    InvalidPort { value: String },

    /// Port string could not be parsed as a number.
    #[error("failed to parse port '{value}': {source}")]
    PortParseError {
        value: String,
        #[source]
        source: std::num::ParseIntError,
    },

    /// Bind address string could not be parsed.
    #[error("failed to parse bind address '{value}': {source}")]
    InvalidBindAddr {
        value: String,
        #[source]
        source: std::net::AddrParseError,
    },

    #[error("invalid store backend '{value}': expected 'redis' or 'memory'")]
    InvalidStoreBackend { value: String },

    #[error("invalid similarity threshold {value}: must be in (0, 1]")]
    InvalidThreshold { value: f32 },

    #[error("invalid TTL: must be greater than zero seconds")]
    InvalidTtl,

    /// A variable was set but could not be parsed.
    #[error("invalid value for {name}: '{value}'")]
    InvalidValue { name: &'static str, value: String },
}
