/* src/lib.rs */
//! # Real IP Depth
//!
//! A lightweight request middleware that derives the real client IP from the
//! `X-Forwarded-For` chain at a configurable trusted hop depth and stamps it onto
//! `X-Real-Ip` before handing the request to the next handler.
//!
//! ## Features
//!
//! - Depth-based selection counted from the tail of the chain (depth 1 = last hop)
//! - Tolerant of missing, empty, and short chains; never fails a request
//! - Host configuration from JSON or TOML (`forwardedForDepth`)
//! - Works on `http::Request`, `http::HeaderMap`, or a plain `HashMap`
//! - Optional tower layer and axum extractor via the `axum` feature
//!
//! ## Examples
//!
//! ### Basic Usage
//!
//! ```rust
//! use real_ip_depth::{Config, RealIpOverwriter};
//!
//! let config = Config::new().with_forwarded_for_depth(2);
//! let overwriter = RealIpOverwriter::new(
//!     |req: http::Request<()>| req,
//!     &config,
//!     "edge",
//! );
//!
//! let req = http::Request::builder()
//!     .header("x-forwarded-for", "10.0.0.1, 192.168.1.1")
//!     .body(())
//!     .unwrap();
//!
//! let req = overwriter.intercept(req);
//! assert_eq!(req.headers()["x-real-ip"], "10.0.0.1");
//! ```

pub mod config;
pub mod error;
pub mod headers;
pub mod overwriter;
pub mod resolver;

#[cfg(feature = "axum")]
pub mod middleware;

pub use config::Config;
pub use error::{RealIpError, Result};
pub use headers::{ForwardedHeaders, HeaderMap, X_FORWARDED_FOR, X_REAL_IP};
pub use overwriter::{Handler, RealIpOverwriter};
pub use resolver::{ForwardedForResolver, resolve_real_ip};

#[cfg(feature = "axum")]
pub use middleware::{RealIp, RealIpLayer, RealIpService};
