//! Shared helpers for integration tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Arc;

use opentelemetry::baggage::BaggageExt;
use opentelemetry::trace::{SpanContext, SpanId, TraceContextExt, TraceFlags, TraceId, TraceState};
use opentelemetry::{Context, KeyValue};

use propagation_guard::routing::{RouteClassifier, RouteEntry, RouteTable};

pub const TRACE_ID: &str = "aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa";
pub const SPAN_ID: &str = "bbbbbbbbbbbbbbbb";
pub const TRACEPARENT: &str = "00-aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa-bbbbbbbbbbbbbbbb-01";

/// `/health` public at order 0, `/api/{id}` trusted at order 1.
pub fn health_and_api_table() -> Arc<RouteTable> {
    Arc::new(RouteTable::with_routes(vec![
        RouteEntry::parse("health", "/health").unwrap().public(),
        RouteEntry::parse("api", "/api/{id}").unwrap().with_order(1),
    ]))
}

pub fn classifier(table: Arc<RouteTable>) -> RouteClassifier {
    RouteClassifier::new(table)
}

/// Context with trace id `aaaa…`, span id `bbbb…`, sampled, and baggage `k=v`.
pub fn known_context() -> Context {
    let span_context = SpanContext::new(
        TraceId::from_hex(TRACE_ID).unwrap(),
        SpanId::from_hex(SPAN_ID).unwrap(),
        TraceFlags::SAMPLED,
        true,
        TraceState::default(),
    );
    Context::new()
        .with_remote_span_context(span_context)
        .with_baggage(vec![KeyValue::new("k", "v")])
}

/// Headers a caller would send with a valid trace and some baggage.
pub fn inbound_headers() -> HashMap<String, String> {
    let mut headers = HashMap::new();
    headers.insert("traceparent".to_string(), TRACEPARENT.to_string());
    headers.insert("tracestate".to_string(), "vendor=value".to_string());
    headers.insert("baggage".to_string(), "tenant=other,user=mallory".to_string());
    headers
}

/// Comparable view of a context: trace id (if valid) and sorted baggage.
pub fn observed(cx: &Context) -> (Option<String>, Vec<(String, String)>) {
    let span = cx.span();
    let span_context = span.span_context();
    let trace_id = span_context
        .is_valid()
        .then(|| span_context.trace_id().to_string());

    let mut baggage: Vec<(String, String)> = cx
        .baggage()
        .iter()
        .map(|(k, (v, _))| (k.to_string(), v.to_string()))
        .collect();
    baggage.sort();

    (trace_id, baggage)
}

/// The neutral context as seen through `observed`.
pub fn neutral() -> (Option<String>, Vec<(String, String)>) {
    (None, Vec::new())
}
