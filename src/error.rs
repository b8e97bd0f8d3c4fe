/* src/error.rs */

use thiserror::Error;

/// Result type alias for operations that may fail with `RealIpError`.
pub type Result<T> = std::result::Result<T, RealIpError>;

/// Errors that can occur while loading the middleware configuration.
///
/// Request handling itself never fails; malformed forwarded-for chains degrade
/// to leaving `X-Real-Ip` untouched.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RealIpError {
    /// Configuration text could not be decoded.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl From<serde_json::Error> for RealIpError {
    fn from(err: serde_json::Error) -> Self {
        Self::InvalidConfig(err.to_string())
    }
}

impl From<toml::de::Error> for RealIpError {
    fn from(err: toml::de::Error) -> Self {
        Self::InvalidConfig(err.to_string())
    }
}
