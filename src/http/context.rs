//! Inbound trace context middleware.
//!
//! # Responsibilities
//! - Run the installed propagation policy on every inbound request
//! - Attach the resulting context to the request as `InboundContext`
//! - Inject context into outbound request headers
//!
//! # Design Decisions
//! - Runs inline before the inner service; no spawned tasks
//! - Inbound headers are left untouched, only the extension is added
//! - Handlers receive context explicitly via the `InboundContext` extractor

use std::convert::Infallible;
use std::task::{Context as TaskContext, Poll};

use axum::extract::FromRequestParts;
use axum::http::{request::Parts, HeaderMap, Request};
use opentelemetry::Context;
use tower::{Layer, Service};

use crate::propagation::{HeaderInjector, HttpCarrier, Propagation};

/// Trace context extracted from an inbound request by the active policy.
#[derive(Debug, Clone)]
pub struct InboundContext(pub Context);

impl InboundContext {
    pub fn context(&self) -> &Context {
        &self.0
    }

    pub fn into_inner(self) -> Context {
        self.0
    }
}

impl Default for InboundContext {
    fn default() -> Self {
        Self(Context::new())
    }
}

impl<S> FromRequestParts<S> for InboundContext
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(parts
            .extensions
            .get::<InboundContext>()
            .cloned()
            .unwrap_or_default())
    }
}

/// Layer that applies a `Propagation` to inbound requests.
#[derive(Debug, Clone)]
pub struct TraceContextLayer {
    propagation: Propagation,
}

impl TraceContextLayer {
    pub fn new(propagation: Propagation) -> Self {
        Self { propagation }
    }
}

impl<S> Layer<S> for TraceContextLayer {
    type Service = TraceContextService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        TraceContextService {
            inner,
            propagation: self.propagation.clone(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct TraceContextService<S> {
    inner: S,
    propagation: Propagation,
}

impl<S, B> Service<Request<B>> for TraceContextService<S>
where
    S: Service<Request<B>>,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = S::Future;

    fn poll_ready(&mut self, cx: &mut TaskContext<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut request: Request<B>) -> Self::Future {
        let cx = self.propagation.extract(&HttpCarrier::from_request(&request));
        request.extensions_mut().insert(InboundContext(cx));
        self.inner.call(request)
    }
}

/// Write `cx` into outbound request headers using the active policy.
pub fn inject_headers(propagation: &Propagation, cx: &Context, headers: &mut HeaderMap) {
    propagation.inject_context(cx, &mut HeaderInjector(headers));
}
