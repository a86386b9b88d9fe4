//! Global disable mode: never honor inbound context.
//!
//! Every extraction yields a neutral context regardless of carrier, path or
//! the context passed in. Injection still writes the service's own context,
//! so its outbound calls stay correlated.

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

/// Wraps one standard propagator and discards everything it would extract.
#[derive(Debug, Clone, Default)]
pub struct IsolatedPropagator<P> {
    inner: P,
}

impl<P: TextMapPropagator> IsolatedPropagator<P> {
    pub fn new(inner: P) -> Self {
        Self { inner }
    }
}

impl<P: TextMapPropagator> TextMapPropagator for IsolatedPropagator<P> {
    fn inject_context(&self, cx: &Context, injector: &mut dyn Injector) {
        self.inner.inject_context(cx, injector);
    }

    fn extract_with_context(&self, _cx: &Context, _extractor: &dyn Extractor) -> Context {
        Context::new()
    }

    fn fields(&self) -> FieldIter<'_> {
        self.inner.fields()
    }
}

#[derive(Debug, Clone)]
pub struct DisableAllPolicy {
    codec: PropagatorPair<
        IsolatedPropagator<TraceContextPropagator>,
        IsolatedPropagator<BaggagePropagator>,
    >,
}

impl DisableAllPolicy {
    pub fn new() -> Self {
        Self {
            codec: PropagatorPair::new(
                IsolatedPropagator::new(TraceContextPropagator::new()),
                IsolatedPropagator::new(BaggagePropagator::new()),
            ),
        }
    }
}

impl Default for DisableAllPolicy {
    fn default() -> Self {
        Self::new()
    }
}

impl PropagationPolicy for DisableAllPolicy {
    fn extract_with_context(&self, cx: &Context, carrier: &dyn RequestCarrier) -> Context {
        tracing::trace!(path = ?carrier.request_path(), "Discarding inbound trace context (propagation disabled)");
        metrics::record_extraction(PropagationMode::DisableAll, Decision::Stripped);
        self.codec.extract(cx, carrier.extractor())
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
