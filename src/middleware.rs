/* src/middleware.rs */

use axum::{
    extract::{ConnectInfo, FromRequestParts},
    http::{StatusCode, request::Parts},
};
use std::{
    net::{IpAddr, SocketAddr},
    sync::Arc,
    task::{Context, Poll},
};
use tower::{Layer, Service};
use tracing::{trace, warn};

use crate::config::Config;
use crate::headers::X_REAL_IP;
use crate::resolver::ForwardedForResolver;

/// The `X-Real-Ip` value seen by a handler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RealIp(pub String);

impl RealIp {
    /// The raw header value.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The value parsed as an IP address, if it is one.
    pub fn ip(&self) -> Option<IpAddr> {
        self.0.parse().ok()
    }
}

/// Layer that stamps `X-Real-Ip` from `X-Forwarded-For` before the inner service runs.
///
/// # Examples
///
/// ```rust,no_run
/// use axum::{Router, routing::get};
/// use real_ip_depth::{Config, RealIp, RealIpLayer};
///
/// async fn handler(real_ip: RealIp) -> String {
///     real_ip.as_str().to_string()
/// }
///
/// let config = Config::new().with_forwarded_for_depth(2);
/// let app: Router = Router::new()
///     .route("/", get(handler))
///     .layer(RealIpLayer::new(&config, "edge"));
/// ```
#[derive(Debug, Clone)]
pub struct RealIpLayer {
    resolver: ForwardedForResolver,
    name: Arc<str>,
}

impl Default for RealIpLayer {
    fn default() -> Self {
        Self::new(&Config::default(), "real-ip")
    }
}

impl RealIpLayer {
    /// Create a new layer from host configuration. A depth of 0 is treated as 1.
    pub fn new(config: &Config, name: impl Into<Arc<str>>) -> Self {
        let name = name.into();
        if config.forwarded_for_depth == 0 {
            warn!(name = %name, "forwardedForDepth is 0, using 1");
        }

        Self {
            resolver: ForwardedForResolver::from_config(config),
            name,
        }
    }

    /// Create a layer that trusts `depth` hops with the default name.
    pub fn with_depth(depth: usize) -> Self {
        Self::new(
            &Config::new().with_forwarded_for_depth(depth),
            "real-ip",
        )
    }
}

impl<S> Layer<S> for RealIpLayer {
    type Service = RealIpService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        RealIpService {
            inner,
            resolver: self.resolver,
            name: Arc::clone(&self.name),
        }
    }
}

/// Service that stamps `X-Real-Ip` and forwards to the inner service.
#[derive(Debug, Clone)]
pub struct RealIpService<S> {
    inner: S,
    resolver: ForwardedForResolver,
    name: Arc<str>,
}

impl<S, B> Service<http::Request<B>> for RealIpService<S>
where
    S: Service<http::Request<B>>,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = S::Future;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut req: http::Request<B>) -> Self::Future {
        match self.resolver.apply(req.headers_mut()) {
            Some(ip) => trace!(name = %self.name, real_ip = %ip, "x-real-ip set"),
            None => trace!(name = %self.name, "no usable x-forwarded-for hop"),
        }

        self.inner.call(req)
    }
}

/// Axum extractor for the stamped real IP.
///
/// Falls back to the peer address when `X-Real-Ip` is absent, and rejects the
/// request with `400 Bad Request` when neither is available.
///
/// # Examples
///
/// ```rust,no_run
/// use axum::{response::Json, routing::get, Router};
/// use real_ip_depth::{RealIp, RealIpLayer};
/// use serde_json::json;
///
/// async fn handler(real_ip: RealIp) -> Json<serde_json::Value> {
///     Json(json!({ "ip": real_ip.as_str() }))
/// }
///
/// let app: Router = Router::new()
///     .route("/", get(handler))
///     .layer(RealIpLayer::default());
/// ```
impl<S> FromRequestParts<S> for RealIp
where
    S: Send + Sync,
{
    type Rejection = (StatusCode, &'static str);

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        if let Some(value) = parts
            .headers
            .get(X_REAL_IP)
            .and_then(|value| value.to_str().ok())
        {
            return Ok(RealIp(value.to_string()));
        }

        parts
            .extensions
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| RealIp(addr.ip().to_string()))
            .ok_or((StatusCode::BAD_REQUEST, "Could not determine real IP"))
    }
}
