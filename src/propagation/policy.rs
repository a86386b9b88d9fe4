//! The propagation policy seam and the trust-all default.

use std::sync::Arc;

use opentelemetry::propagation::text_map_propagator::FieldIter;
use opentelemetry::propagation::{
    Extractor, Injector, TextMapCompositePropagator, TextMapPropagator,
};
use opentelemetry::Context;
use opentelemetry_sdk::propagation::{BaggagePropagator, TraceContextPropagator};

use crate::config::PropagationMode;
use crate::observability::metrics::{self, Decision};
use crate::propagation::carrier::RequestCarrier;

/// Decides what inbound context a request may carry into the service.
///
/// Implementations differ only on extraction. Injection always writes the
/// given context in the standard W3C format.
pub trait PropagationPolicy: std::fmt::Debug + Send + Sync {
    /// Extract inbound context from `carrier`, starting from `cx`.
    fn extract_with_context(&self, cx: &Context, carrier: &dyn RequestCarrier) -> Context;

    /// Write `cx` into an outbound carrier.
    fn inject_context(&self, cx: &Context, injector: &mut dyn Injector);

    /// Header names this policy reads and writes.
    fn fields(&self) -> FieldIter<'_>;

    /// The policy as a plain text-map propagator, for SDK integrations that
    /// only hand over header maps. Such carriers have no path.
    fn text_map_propagator(&self) -> TextMapCompositePropagator;
}

/// A trace-context propagator followed by a baggage propagator.
#[derive(Debug)]
pub(crate) struct PropagatorPair<T, B> {
    pub(crate) trace: Arc<T>,
    pub(crate) baggage: Arc<B>,
    fields: Vec<String>,
}

impl<T, B> Clone for PropagatorPair<T, B> {
    fn clone(&self) -> Self {
        Self {
            trace: Arc::clone(&self.trace),
            baggage: Arc::clone(&self.baggage),
            fields: self.fields.clone(),
        }
    }
}

impl<T, B> PropagatorPair<T, B>
where
    T: TextMapPropagator + Send + Sync + 'static,
    B: TextMapPropagator + Send + Sync + 'static,
{
    pub(crate) fn new(trace: T, baggage: B) -> Self {
        let fields = trace
            .fields()
            .chain(baggage.fields())
            .map(String::from)
            .collect();
        Self {
            trace: Arc::new(trace),
            baggage: Arc::new(baggage),
            fields,
        }
    }

    pub(crate) fn extract(&self, cx: &Context, extractor: &dyn Extractor) -> Context {
        let cx = self.trace.extract_with_context(cx, extractor);
        self.baggage.extract_with_context(&cx, extractor)
    }

    pub(crate) fn inject(&self, cx: &Context, injector: &mut dyn Injector) {
        self.trace.inject_context(cx, injector);
        self.baggage.inject_context(cx, injector);
    }

    pub(crate) fn fields(&self) -> FieldIter<'_> {
        FieldIter::new(&self.fields)
    }

    pub(crate) fn composite(&self) -> TextMapCompositePropagator {
        let propagators: Vec<Box<dyn TextMapPropagator + Send + Sync>> = vec![
            Box::new(Shared(Arc::clone(&self.trace))),
            Box::new(Shared(Arc::clone(&self.baggage))),
        ];
        TextMapCompositePropagator::new(propagators)
    }
}

/// A propagator handed out to a composite while the pair keeps using it.
#[derive(Debug)]
struct Shared<P>(Arc<P>);

impl<P: TextMapPropagator> TextMapPropagator for Shared<P> {
    fn inject_context(&self, cx: &Context, injector: &mut dyn Injector) {
        self.0.inject_context(cx, injector);
    }

    fn extract_with_context(&self, cx: &Context, extractor: &dyn Extractor) -> Context {
        self.0.extract_with_context(cx, extractor)
    }

    fn fields(&self) -> FieldIter<'_> {
        self.0.fields()
    }
}

/// The W3C trace-context + baggage codec.
pub(crate) type StandardPair = PropagatorPair<TraceContextPropagator, BaggagePropagator>;

pub(crate) fn standard_pair() -> StandardPair {
    PropagatorPair::new(TraceContextPropagator::new(), BaggagePropagator::new())
}

/// No policy: inbound context is honored everywhere.
#[derive(Debug, Clone)]
pub struct TrustAll {
    codec: StandardPair,
}

impl TrustAll {
    pub fn new() -> Self {
        Self {
            codec: standard_pair(),
        }
    }
}

impl Default for TrustAll {
    fn default() -> Self {
        Self::new()
    }
}

impl PropagationPolicy for TrustAll {
    fn extract_with_context(&self, cx: &Context, carrier: &dyn RequestCarrier) -> Context {
        metrics::record_extraction(PropagationMode::TrustAll, Decision::Propagated);
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::propagation::carrier::TextMapCarrier;
    use opentelemetry::baggage::BaggageExt;
    use opentelemetry::trace::TraceContextExt;
    use std::collections::HashMap;

    #[test]
    fn test_fields_cover_both_codecs() {
        let policy = TrustAll::new();
        let fields: Vec<&str> = policy.fields().collect();
        assert!(fields.contains(&"traceparent"));
        assert!(fields.contains(&"tracestate"));
        assert!(fields.contains(&"baggage"));
    }

    #[test]
    fn test_trust_all_extracts_inbound_headers() {
        let mut headers = HashMap::new();
        headers.insert(
            "traceparent".to_string(),
            "00-0af7651916cd43dd8448eb211c80319c-b7ad6b7169203331-01".to_string(),
        );
        headers.insert("baggage".to_string(), "tenant=acme".to_string());

        let cx = TrustAll::new()
            .extract_with_context(&Context::new(), &TextMapCarrier::new(&headers).with_path("/health"));

        assert_eq!(
            cx.span().span_context().trace_id().to_string(),
            "0af7651916cd43dd8448eb211c80319c"
        );
        assert_eq!(
            cx.baggage().get("tenant").map(|v| v.to_string()),
            Some("acme".to_string())
        );
    }
}
