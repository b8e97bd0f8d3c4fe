/* src/headers.rs */

use std::borrow::Cow;
use std::collections::HashMap;

use http::{HeaderName, HeaderValue};

/// Header the forwarded chain is read from.
pub const X_FORWARDED_FOR: HeaderName = HeaderName::from_static("x-forwarded-for");

/// Header the selected hop is written to.
pub const X_REAL_IP: HeaderName = HeaderName::from_static("x-real-ip");

/// Type alias for plain header maps with string keys.
pub type HeaderMap = HashMap<String, String>;

/// A request (or its header map) the middleware can read and stamp.
pub trait ForwardedHeaders {
    /// Raw `X-Forwarded-For` value, if present.
    ///
    /// Bytes that are not valid UTF-8 are replaced with U+FFFD; hops holding
    /// them can never be written back as `X-Real-Ip`.
    fn forwarded_for(&self) -> Option<Cow<'_, str>>;

    /// Overwrite `X-Real-Ip` with `ip`. Returns `false` if it was not written.
    fn set_real_ip(&mut self, ip: &str) -> bool;
}

/// Only the first `X-Forwarded-For` line is read. `X-Real-Ip` is written as a
/// visible-ASCII header value; anything else is skipped.
impl ForwardedHeaders for http::HeaderMap {
    fn forwarded_for(&self) -> Option<Cow<'_, str>> {
        self.get(X_FORWARDED_FOR)
            .map(|value| String::from_utf8_lossy(value.as_bytes()))
    }

    fn set_real_ip(&mut self, ip: &str) -> bool {
        match HeaderValue::from_str(ip) {
            Ok(value) => {
                self.insert(X_REAL_IP, value);
                true
            }
            Err(err) => {
                tracing::debug!(%err, ip, "skipping unencodable x-real-ip value");
                false
            }
        }
    }
}

impl<B> ForwardedHeaders for http::Request<B> {
    fn forwarded_for(&self) -> Option<Cow<'_, str>> {
        self.headers().forwarded_for()
    }

    fn set_real_ip(&mut self, ip: &str) -> bool {
        self.headers_mut().set_real_ip(ip)
    }
}

/// Keys are matched case-insensitively. `X-Real-Ip` is stored under the
/// lowercase key, replacing any differently-cased entry.
impl ForwardedHeaders for HeaderMap {
    fn forwarded_for(&self) -> Option<Cow<'_, str>> {
        self.iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(X_FORWARDED_FOR.as_str()))
            .map(|(_, value)| Cow::Borrowed(value.as_str()))
    }

    fn set_real_ip(&mut self, ip: &str) -> bool {
        self.retain(|name, _| !name.eq_ignore_ascii_case(X_REAL_IP.as_str()));
        self.insert(X_REAL_IP.as_str().to_string(), ip.to_string());
        true
    }
}

impl<T: ForwardedHeaders + ?Sized> ForwardedHeaders for &mut T {
    fn forwarded_for(&self) -> Option<Cow<'_, str>> {
        (**self).forwarded_for()
    }

    fn set_real_ip(&mut self, ip: &str) -> bool {
        (**self).set_real_ip(ip)
    }
}
