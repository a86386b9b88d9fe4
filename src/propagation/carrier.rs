//! Carriers: where inbound context is read from and outbound context is written to.
//!
//! OpenTelemetry's `Extractor` / `Injector` traits are the getter/setter
//! surface. `RequestCarrier` adds the one thing classification needs on top
//! of that: the request path, when the carrier has one.

use axum::extract::OriginalUri;
use axum::http::{request::Parts, HeaderMap, HeaderName, HeaderValue, Request};
use opentelemetry::propagation::{Extractor, Injector};

/// An inbound carrier that may know which path it was received on.
pub trait RequestCarrier {
    /// Request path, or `None` if the carrier is not tied to a request.
    fn request_path(&self) -> Option<&str>;

    /// Header access for the standard codec.
    fn extractor(&self) -> &dyn Extractor;
}

/// Read access to an `http::HeaderMap`.
#[derive(Debug)]
pub struct HeaderExtractor<'a>(pub &'a HeaderMap);

impl Extractor for HeaderExtractor<'_> {
    fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(|value| value.to_str().ok())
    }

    fn keys(&self) -> Vec<&str> {
        self.0.keys().map(HeaderName::as_str).collect()
    }
}

/// Write access to an `http::HeaderMap`.
#[derive(Debug)]
pub struct HeaderInjector<'a>(pub &'a mut HeaderMap);

impl Injector for HeaderInjector<'_> {
    fn set(&mut self, key: &str, value: String) {
        let name = match HeaderName::from_bytes(key.as_bytes()) {
            Ok(name) => name,
            Err(e) => {
                tracing::debug!(key, error = %e, "Skipping invalid header name for context injection");
                return;
            }
        };
        match HeaderValue::from_str(&value) {
            Ok(value) => {
                self.0.insert(name, value);
            }
            Err(e) => {
                tracing::debug!(key, error = %e, "Skipping invalid header value for context injection");
            }
        }
    }
}

/// An inbound HTTP request viewed as a carrier.
#[derive(Debug)]
pub struct HttpCarrier<'a> {
    path: &'a str,
    headers: HeaderExtractor<'a>,
}

impl<'a> HttpCarrier<'a> {
    pub fn new(path: &'a str, headers: &'a HeaderMap) -> Self {
        Self {
            path,
            headers: HeaderExtractor(headers),
        }
    }

    /// Classification uses the path as received, before any `Router::nest`
    /// prefix was stripped.
    pub fn from_request<B>(request: &'a Request<B>) -> Self {
        let uri = request
            .extensions()
            .get::<OriginalUri>()
            .map_or(request.uri(), |original| &original.0);
        Self::new(uri.path(), request.headers())
    }

    pub fn from_parts(parts: &'a Parts) -> Self {
        let uri = parts
            .extensions
            .get::<OriginalUri>()
            .map_or(&parts.uri, |original| &original.0);
        Self::new(uri.path(), &parts.headers)
    }
}

impl RequestCarrier for HttpCarrier<'_> {
    fn request_path(&self) -> Option<&str> {
        Some(self.path)
    }

    fn extractor(&self) -> &dyn Extractor {
        &self.headers
    }
}

/// Any text map (e.g. a `HashMap<String, String>`), optionally tagged with a path.
///
/// Without a path the carrier is never classified and always gets standard extraction.
pub struct TextMapCarrier<'a> {
    extractor: &'a dyn Extractor,
    path: Option<&'a str>,
}

impl<'a> TextMapCarrier<'a> {
    pub fn new(extractor: &'a dyn Extractor) -> Self {
        Self {
            extractor,
            path: None,
        }
    }

    pub fn with_path(mut self, path: &'a str) -> Self {
        self.path = Some(path);
        self
    }
}

impl RequestCarrier for TextMapCarrier<'_> {
    fn request_path(&self) -> Option<&str> {
        self.path
    }

    fn extractor(&self) -> &dyn Extractor {
        self.extractor
    }
}
