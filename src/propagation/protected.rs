//! Per-endpoint protection: drop inbound context on public routes.
//!
//! # Responsibilities
//! - Classify the carrier's request path against the live route table
//! - Return a neutral context for public endpoints
//! - Delegate to the standard codec for everything else
//!
//! # Design Decisions
//! - One classification per extraction, shared by the trace and baggage propagators
//! - Carriers without a path are never classified (standard extraction)
//! - Injection is never classified

use opentelemetry::propagation::text_map_propagator::FieldIter;
use opentelemetry::propagation::{
    Extractor, Injector, TextMapCompositePropagator, TextMapPropagator,
};
use opentelemetry::Context;
use opentelemetry_sdk::propagation::{BaggagePropagator, TraceContextPropagator};

use crate::config::PropagationMode;
use crate::observability::metrics::{self, Decision};
use crate::propagation::carrier::RequestCarrier;
use crate::propagation::policy::{PropagationPolicy, PropagatorPair};
use crate::routing::RouteClassifier;

/// Wraps one standard propagator and refuses inbound context on public endpoints.
#[derive(Debug, Clone)]
pub struct ProtectedPropagator<P> {
    inner: P,
    classifier: RouteClassifier,
}

impl<P: TextMapPropagator> ProtectedPropagator<P> {
    pub fn new(inner: P, classifier: RouteClassifier) -> Self {
        Self { inner, classifier }
    }

    /// Extract from a request carrier, classifying its path.
    pub fn extract_from(&self, cx: &Context, carrier: &dyn RequestCarrier) -> Context {
        let public = carrier
            .request_path()
            .is_some_and(|path| self.classifier.is_public_endpoint(path));
        self.extract_classified(cx, carrier.extractor(), public)
    }

    /// Extract with a classification decision that was already made.
    pub fn extract_classified(&self, cx: &Context, extractor: &dyn Extractor, public: bool) -> Context {
        if public {
            Context::new()
        } else {
            self.inner.extract_with_context(cx, extractor)
        }
    }
}

/// Plain text maps carry no path, so they always get standard extraction.
impl<P: TextMapPropagator> TextMapPropagator for ProtectedPropagator<P> {
    fn inject_context(&self, cx: &Context, injector: &mut dyn Injector) {
        self.inner.inject_context(cx, injector);
    }

    fn extract_with_context(&self, cx: &Context, extractor: &dyn Extractor) -> Context {
        self.inner.extract_with_context(cx, extractor)
    }

    fn fields(&self) -> FieldIter<'_> {
        self.inner.fields()
    }
}

/// Trace-context and baggage protection driven by a single route classifier.
#[derive(Debug, Clone)]
pub struct PublicEndpointPolicy {
    classifier: RouteClassifier,
    codec: PropagatorPair<
        ProtectedPropagator<TraceContextPropagator>,
        ProtectedPropagator<BaggagePropagator>,
    >,
}

impl PublicEndpointPolicy {
    pub fn new(classifier: RouteClassifier) -> Self {
        let codec = PropagatorPair::new(
            ProtectedPropagator::new(TraceContextPropagator::new(), classifier.clone()),
            ProtectedPropagator::new(BaggagePropagator::new(), classifier.clone()),
        );
        Self { classifier, codec }
    }

    pub fn classifier(&self) -> &RouteClassifier {
        &self.classifier
    }
}

impl PropagationPolicy for PublicEndpointPolicy {
    fn extract_with_context(&self, cx: &Context, carrier: &dyn RequestCarrier) -> Context {
        let extractor = carrier.extractor();

        let Some(path) = carrier.request_path() else {
            metrics::record_extraction(PropagationMode::PublicEndpoints, Decision::Propagated);
            return self.codec.extract(cx, extractor);
        };

        let classification = self.classifier.classify(path);
        if classification.public {
            tracing::debug!(
                path,
                route = ?classification.route,
                table_published = classification.table_published,
                "Discarding inbound trace context for public endpoint"
            );
        }
        let decision = if classification.public {
            Decision::Stripped
        } else {
            Decision::Propagated
        };
        metrics::record_extraction(PropagationMode::PublicEndpoints, decision);

        let cx = self
            .codec
            .trace
            .extract_classified(cx, extractor, classification.public);
        self.codec
            .baggage
            .extract_classified(&cx, extractor, classification.public)
    }

    fn inject_context(&self, cx: &Context, injector: &mut dyn Injector) {
        self.codec.inject(cx, injector);
    }

    fn fields(&self) -> FieldIter<'_> {
        self.codec.fields()
    }

    fn text_map_propagator(&self) -> TextMapCompositePropagator {
        self.codec.composite()
    }
}
