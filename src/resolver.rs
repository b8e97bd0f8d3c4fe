/* src/resolver.rs */

use std::num::NonZeroUsize;

use crate::config::Config;
use crate::headers::ForwardedHeaders;

/// Selects the real client address from an `X-Forwarded-For` chain.
///
/// The chain is split on commas and the hop `depth` places from the end is
/// taken. When the chain is shorter than `depth` the first hop is used instead.
/// Hops are trimmed but otherwise passed through untouched; no IP syntax
/// checking is performed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ForwardedForResolver {
    depth: NonZeroUsize,
}

impl Default for ForwardedForResolver {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

impl ForwardedForResolver {
    /// Create a resolver trusting `depth` hops.
    pub fn new(depth: NonZeroUsize) -> Self {
        Self { depth }
    }

    /// Create a resolver from host configuration.
    pub fn from_config(config: &Config) -> Self {
        Self::new(config.effective_depth())
    }

    /// Trusted hop depth.
    pub fn depth(&self) -> NonZeroUsize {
        self.depth
    }

    /// Pick the hop for this depth out of a raw header value.
    ///
    /// Returns `None` when the selected hop is empty after trimming.
    pub fn select<'a>(&self, forwarded_for: &'a str) -> Option<&'a str> {
        // A chain shorter than the depth falls back to its first hop.
        forwarded_for
            .rsplit(',')
            .nth(self.depth.get() - 1)
            .or_else(|| forwarded_for.split(',').next())
            .map(str::trim)
            .filter(|hop| !hop.is_empty())
    }

    /// Stamp `X-Real-Ip` on `headers` from their `X-Forwarded-For` chain.
    ///
    /// A missing header is treated as an empty chain. If the selected hop is
    /// empty or cannot be written, `X-Real-Ip` is left as it was. Returns the
    /// stamped value.
    pub fn apply<H>(&self, headers: &mut H) -> Option<String>
    where
        H: ForwardedHeaders + ?Sized,
    {
        let ip = {
            let raw = headers.forwarded_for().unwrap_or_default();
            self.select(&raw)?.to_owned()
        };
        headers.set_real_ip(&ip).then_some(ip)
    }
}

/// Convenience function to select the real IP from a raw `X-Forwarded-For` value.
///
/// A depth of 0 behaves as 1.
///
/// # Examples
///
/// ```rust
/// use real_ip_depth::resolve_real_ip;
///
/// assert_eq!(resolve_real_ip("10.0.0.1, 192.168.1.1", 1), Some("192.168.1.1"));
/// assert_eq!(resolve_real_ip("10.0.0.1, 192.168.1.1", 2), Some("10.0.0.1"));
/// assert_eq!(resolve_real_ip("10.0.0.1, 192.168.1.1", 5), Some("10.0.0.1"));
/// assert_eq!(resolve_real_ip("   ", 1), None);
/// ```
pub fn resolve_real_ip(forwarded_for: &str, depth: usize) -> Option<&str> {
    let config = Config::new().with_forwarded_for_depth(depth);
    ForwardedForResolver::from_config(&config).select(forwarded_for)
}
