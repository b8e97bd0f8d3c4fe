/* src/config.rs */

use std::num::NonZeroUsize;

use serde::{Deserialize, Serialize};

use crate::error::Result;

const DEFAULT_FORWARDED_FOR_DEPTH: usize = 1;

fn default_forwarded_for_depth() -> usize {
    DEFAULT_FORWARDED_FOR_DEPTH
}

/// Middleware configuration, as supplied by the host.
///
/// `forwarded_for_depth` counts hops from the tail of `X-Forwarded-For`:
/// depth 1 picks the last entry, depth 2 the one before it, and so on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Number of trusted hops, counted from the end of the chain.
    #[serde(default = "default_forwarded_for_depth")]
    pub forwarded_for_depth: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            forwarded_for_depth: DEFAULT_FORWARDED_FOR_DEPTH,
        }
    }
}

impl Config {
    /// Create the default configuration (`forwardedForDepth = 1`).
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the trusted hop depth.
    pub fn with_forwarded_for_depth(mut self, depth: usize) -> Self {
        self.forwarded_for_depth = depth;
        self
    }

    /// Load the configuration from a JSON document.
    ///
    /// ```rust
    /// use real_ip_depth::Config;
    ///
    /// let config = Config::from_json(r#"{"forwardedForDepth": 2}"#).unwrap();
    /// assert_eq!(config.forwarded_for_depth, 2);
    /// ```
    pub fn from_json(source: &str) -> Result<Self> {
        Ok(serde_json::from_str(source)?)
    }

    /// Load the configuration from a TOML document.
    pub fn from_toml(source: &str) -> Result<Self> {
        Ok(toml::from_str(source)?)
    }

    /// Depth actually used when resolving. A depth of 0 behaves as 1.
    pub fn effective_depth(&self) -> NonZeroUsize {
        NonZeroUsize::new(self.forwarded_for_depth).unwrap_or(NonZeroUsize::MIN)
    }
}
