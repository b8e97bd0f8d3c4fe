/* src/overwriter.rs */

use std::num::NonZeroUsize;

use tracing::{debug, trace, warn};

use crate::config::Config;
use crate::headers::ForwardedHeaders;
use crate::resolver::ForwardedForResolver;

/// The next step in a handler chain.
///
/// Implemented for every `Fn(R) -> O`, so plain closures can terminate a chain.
pub trait Handler<R> {
    /// What the handler produces for a request.
    type Output;

    /// Handle a request.
    fn handle(&self, request: R) -> Self::Output;
}

impl<R, O, F> Handler<R> for F
where
    F: Fn(R) -> O,
{
    type Output = O;

    fn handle(&self, request: R) -> O {
        self(request)
    }
}

/// Interceptor that stamps `X-Real-Ip` from `X-Forwarded-For` and hands the
/// request on to the next handler.
///
/// # Examples
///
/// ```rust
/// use real_ip_depth::{Config, HeaderMap, RealIpOverwriter};
///
/// let next = |headers: &mut HeaderMap| headers.get("x-real-ip").cloned();
/// let overwriter = RealIpOverwriter::new(next, &Config::default(), "real-ip");
///
/// let mut headers = HeaderMap::new();
/// headers.insert("x-forwarded-for".to_string(), "10.0.0.1, 192.168.1.1".to_string());
///
/// assert_eq!(overwriter.intercept(&mut headers), Some("192.168.1.1".to_string()));
/// ```
#[derive(Debug, Clone)]
pub struct RealIpOverwriter<N> {
    next: N,
    resolver: ForwardedForResolver,
    name: String,
}

impl<N> RealIpOverwriter<N> {
    /// Create a new interceptor in front of `next`.
    ///
    /// Never fails. A configured depth of 0 is treated as 1.
    pub fn new(next: N, config: &Config, name: impl Into<String>) -> Self {
        let name = name.into();
        if config.forwarded_for_depth == 0 {
            warn!(name = %name, "forwardedForDepth is 0, using 1");
        }

        let resolver = ForwardedForResolver::from_config(config);
        debug!(name = %name, depth = resolver.depth().get(), "real ip overwriter created");

        Self {
            next,
            resolver,
            name,
        }
    }

    /// Instance name, used in diagnostics.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Trusted hop depth in effect.
    pub fn depth(&self) -> NonZeroUsize {
        self.resolver.depth()
    }

    /// Stamp `X-Real-Ip` on the request, then invoke the next handler once
    /// and return whatever it returns.
    pub fn intercept<R>(&self, mut request: R) -> N::Output
    where
        R: ForwardedHeaders,
        N: Handler<R>,
    {
        match self.resolver.apply(&mut request) {
            Some(ip) => trace!(name = %self.name, real_ip = %ip, "x-real-ip set"),
            None => trace!(name = %self.name, "no usable x-forwarded-for hop"),
        }

        self.next.handle(request)
    }
}

impl<R, N> Handler<R> for RealIpOverwriter<N>
where
    R: ForwardedHeaders,
    N: Handler<R>,
{
    type Output = N::Output;

    fn handle(&self, request: R) -> Self::Output {
        self.intercept(request)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::headers::HeaderMap;
    use std::cell::Cell;

    fn forwarded(chain: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-for".to_string(), chain.to_string());
        headers
    }

    fn real_ip(headers: &HeaderMap) -> Option<&str> {
        headers.get("x-real-ip").map(String::as_str)
    }

    #[test]
    fn test_intercept_scenarios() {
        let cases = [
            (Some("10.0.0.1, 192.168.1.1"), 1, Some("192.168.1.1")),
            (Some("10.0.0.1, 192.168.1.1"), 2, Some("10.0.0.1")),
            (Some("10.0.0.1, 192.168.1.1"), 5, Some("10.0.0.1")),
            (None, 1, None),
            (None, 4, None),
            (Some("   "), 1, None),
        ];

        for (chain, depth, expected) in cases {
            let overwriter = RealIpOverwriter::new(
                |_: &mut HeaderMap| (),
                &Config::new().with_forwarded_for_depth(depth),
                "test",
            );
            let mut headers = chain.map(forwarded).unwrap_or_default();

            overwriter.intercept(&mut headers);
            assert_eq!(real_ip(&headers), expected, "chain {chain:?}, depth {depth}");
        }
    }

    #[test]
    fn test_next_invoked_exactly_once() {
        let calls = Cell::new(0);
        let next = |_: &mut HeaderMap| calls.set(calls.get() + 1);
        let overwriter = RealIpOverwriter::new(next, &Config::default(), "test");

        overwriter.intercept(&mut forwarded("192.0.2.1"));
        assert_eq!(calls.get(), 1);

        overwriter.intercept(&mut HeaderMap::new());
        assert_eq!(calls.get(), 2);

        overwriter.intercept(&mut forwarded(" , "));
        assert_eq!(calls.get(), 3);
    }

    #[test]
    fn test_next_sees_stamped_request_and_output_is_returned() {
        let next = |headers: &mut HeaderMap| headers.get("x-real-ip").cloned();
        let overwriter = RealIpOverwriter::new(next, &Config::default(), "test");

        let seen = overwriter.intercept(&mut forwarded("10.0.0.1, 192.168.1.1"));
        assert_eq!(seen.as_deref(), Some("192.168.1.1"));
    }

    #[test]
    fn test_idempotent() {
        let overwriter = RealIpOverwriter::new(
            |_: &mut HeaderMap| (),
            &Config::new().with_forwarded_for_depth(2),
            "test",
        );
        let mut headers = forwarded("203.0.113.1, 10.0.0.1, 192.168.1.1");

        overwriter.intercept(&mut headers);
        let once = real_ip(&headers).map(str::to_string);
        overwriter.intercept(&mut headers);

        assert_eq!(real_ip(&headers), once.as_deref());
        assert_eq!(once.as_deref(), Some("10.0.0.1"));
    }

    #[test]
    fn test_existing_real_ip_kept_when_hop_empty() {
        let overwriter = RealIpOverwriter::new(|_: &mut HeaderMap| (), &Config::default(), "test");
        let mut headers = forwarded("");
        headers.insert("x-real-ip".to_string(), "198.51.100.9".to_string());

        overwriter.intercept(&mut headers);
        assert_eq!(real_ip(&headers), Some("198.51.100.9"));
    }

    #[test]
    fn test_zero_depth() {
        let overwriter = RealIpOverwriter::new(
            |_: &mut HeaderMap| (),
            &Config::new().with_forwarded_for_depth(0),
            "zero",
        );
        assert_eq!(overwriter.depth().get(), 1);
        assert_eq!(overwriter.name(), "zero");

        let mut headers = forwarded("10.0.0.1, 192.168.1.1");
        overwriter.intercept(&mut headers);
        assert_eq!(real_ip(&headers), Some("192.168.1.1"));
    }

    fn request_with_raw_chain(chain: &[u8]) -> http::Request<()> {
        let mut req = http::Request::new(());
        req.headers_mut().insert(
            crate::headers::X_FORWARDED_FOR,
            http::HeaderValue::from_bytes(chain).unwrap(),
        );
        req
    }

    #[test]
    fn test_non_ascii_hop_does_not_block_selected_hop() {
        let overwriter = RealIpOverwriter::new(|_: &mut http::Request<()>| (), &Config::default(), "test");

        for chain in ["caf\u{e9}, 10.0.0.1".as_bytes(), &b"\xff\xfe, 10.0.0.1"[..]] {
            let mut req = request_with_raw_chain(chain);
            overwriter.intercept(&mut req);
            assert_eq!(req.headers().get("x-real-ip").unwrap(), "10.0.0.1");
        }
    }

    #[test]
    fn test_non_ascii_selected_hop_leaves_real_ip_untouched() {
        let calls = Cell::new(0);
        let next = |_: &mut http::Request<()>| calls.set(calls.get() + 1);
        let overwriter = RealIpOverwriter::new(next, &Config::new().with_forwarded_for_depth(2), "test");

        let mut req = request_with_raw_chain("caf\u{e9}, 10.0.0.1".as_bytes());
        req.headers_mut()
            .insert("x-real-ip", http::HeaderValue::from_static("198.51.100.9"));
        overwriter.intercept(&mut req);
        assert_eq!(req.headers().get("x-real-ip").unwrap(), "198.51.100.9");

        let mut req = request_with_raw_chain(b"\xff, 10.0.0.1");
        overwriter.intercept(&mut req);
        assert!(req.headers().get("x-real-ip").is_none());
        assert_eq!(calls.get(), 2);
    }

    #[test]
    fn test_mixed_case_string_headers() {
        let overwriter = RealIpOverwriter::new(|_: &mut HeaderMap| (), &Config::default(), "test");
        let mut headers = HeaderMap::new();
        headers.insert("X-Forwarded-For".to_string(), "10.0.0.1, 192.168.1.1".to_string());

        overwriter.intercept(&mut headers);
        assert_eq!(real_ip(&headers), Some("192.168.1.1"));
    }

    #[test]
    fn test_chained_overwriters() {
        // Inner runs last, so its depth decides the final value.
        let inner = RealIpOverwriter::new(
            |req: http::Request<()>| req,
            &Config::new().with_forwarded_for_depth(1),
            "inner",
        );
        let outer = RealIpOverwriter::new(inner, &Config::new().with_forwarded_for_depth(2), "outer");

        let req = http::Request::builder()
            .header("x-forwarded-for", "10.0.0.1, 192.168.1.1")
            .body(())
            .unwrap();

        let req = outer.handle(req);
        assert_eq!(req.headers().get("x-real-ip").unwrap(), "192.168.1.1");
    }
}
