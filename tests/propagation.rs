//! Propagation policy behaviour across classification, extraction and injection.

use std::collections::HashMap;
use std::sync::Arc;

use opentelemetry::Context;

use propagation_guard::config::UnpublishedRoutes;
use propagation_guard::propagation::{Propagation, TextMapCarrier};
use propagation_guard::routing::{RouteClassifier, RouteEntry, RouteTable};

mod common;

use common::{known_context, neutral, observed, SPAN_ID, TRACE_ID};

#[test]
fn test_health_and_api_scenario() {
    let classifier = common::classifier(common::health_and_api_table());

    assert!(classifier.is_public_endpoint("/health"));
    assert!(!classifier.is_public_endpoint("/api/123"));
    assert!(!classifier.is_public_endpoint("/unknown"));
}

#[test]
fn test_unmatched_paths_are_never_public() {
    let classifier = common::classifier(common::health_and_api_table());

    for path in ["/", "/healthz", "/health/live", "/api", "/api/1/2", "/static/app.js", ""] {
        assert!(!classifier.is_public_endpoint(path), "{path} should not be public");
    }
}

#[test]
fn test_every_path_of_a_public_route_is_public() {
    let table = Arc::new(RouteTable::with_routes(vec![
        RouteEntry::parse("webhooks", "/hooks/{provider:alpha}/{*rest}")
            .unwrap()
            .public(),
        RouteEntry::parse("internal", "/internal/{*rest}").unwrap(),
    ]));
    let classifier = RouteClassifier::new(table);

    for path in ["/hooks/github", "/hooks/stripe/events/1", "/HOOKS/Slack/"] {
        assert!(classifier.is_public_endpoint(path), "{path} should be public");
    }
    assert!(!classifier.is_public_endpoint("/hooks/123"));
    assert!(!classifier.is_public_endpoint("/internal/jobs"));
}

#[test]
fn test_lower_order_decides_overlapping_routes() {
    let public_first = RouteClassifier::new(Arc::new(RouteTable::with_routes(vec![
        RouteEntry::parse("trusted", "/orders/{id}").unwrap().with_order(5),
        RouteEntry::parse("public", "/orders/{id:int}").unwrap().with_order(2).public(),
    ])));
    assert!(public_first.is_public_endpoint("/orders/42"));
    // Constraint fails, so only the trusted route matches.
    assert!(!public_first.is_public_endpoint("/orders/abc"));

    let trusted_first = RouteClassifier::new(Arc::new(RouteTable::with_routes(vec![
        RouteEntry::parse("trusted", "/orders/{id}").unwrap().with_order(1),
        RouteEntry::parse("public", "/orders/{id:int}").unwrap().with_order(2).public(),
    ])));
    assert!(!trusted_first.is_public_endpoint("/orders/42"));
}

#[test]
fn test_disable_all_always_returns_neutral_context() {
    let propagation = Propagation::disable_all();
    let headers = common::inbound_headers();
    let empty: HashMap<String, String> = HashMap::new();

    for current in [Context::new(), known_context()] {
        for carrier in [
            TextMapCarrier::new(&headers),
            TextMapCarrier::new(&headers).with_path("/api/1"),
            TextMapCarrier::new(&empty).with_path("/health"),
        ] {
            let cx = propagation.extract_with_context(&current, &carrier);
            assert_eq!(observed(&cx), neutral());
        }
    }
}

#[test]
fn test_public_endpoint_ignores_valid_inbound_headers() {
    let propagation = Propagation::public_endpoints(common::classifier(common::health_and_api_table()));
    let headers = common::inbound_headers();

    let cx = propagation.extract(&TextMapCarrier::new(&headers).with_path("/health"));
    assert_eq!(observed(&cx), neutral());

    let cx = propagation.extract_with_context(
        &known_context(),
        &TextMapCarrier::new(&headers).with_path("/health"),
    );
    assert_eq!(observed(&cx), neutral());
}

#[test]
fn test_trusted_endpoint_round_trips_known_context() {
    let propagation = Propagation::public_endpoints(common::classifier(common::health_and_api_table()));

    let mut carrier: HashMap<String, String> = HashMap::new();
    propagation.inject_context(&known_context(), &mut carrier);
    assert_eq!(
        carrier.get("traceparent").map(String::as_str),
        Some(format!("00-{TRACE_ID}-{SPAN_ID}-01").as_str())
    );

    for path in ["/api/123", "/unknown"] {
        let cx = propagation.extract(&TextMapCarrier::new(&carrier).with_path(path));
        assert_eq!(
            observed(&cx),
            (
                Some(TRACE_ID.to_string()),
                vec![("k".to_string(), "v".to_string())]
            )
        );
    }
}

#[test]
fn test_injection_ignores_mode_and_classification() {
    let table = common::health_and_api_table();
    let modes = [
        Propagation::trust_all(),
        Propagation::disable_all(),
        Propagation::public_endpoints(common::classifier(table.clone())),
        Propagation::public_endpoints(
            RouteClassifier::new(Arc::new(RouteTable::new())).with_unpublished(UnpublishedRoutes::Public),
        ),
    ];

    let mut expected: HashMap<String, String> = HashMap::new();
    Propagation::trust_all().inject_context(&known_context(), &mut expected);
    assert!(expected.contains_key("traceparent"));
    assert!(expected.contains_key("baggage"));

    for propagation in modes {
        let mut carrier: HashMap<String, String> = HashMap::new();
        propagation.inject_context(&known_context(), &mut carrier);
        assert_eq!(carrier, expected, "mode {}", propagation.mode());
    }
}

#[test]
fn test_extraction_is_idempotent_and_leaves_carrier_alone() {
    let table = common::health_and_api_table();
    let propagation = Propagation::public_endpoints(common::classifier(table.clone()));
    let headers = common::inbound_headers();
    let before = headers.clone();

    for path in ["/health", "/api/7"] {
        let first = propagation.extract(&TextMapCarrier::new(&headers).with_path(path));
        let second = propagation.extract(&TextMapCarrier::new(&headers).with_path(path));
        assert_eq!(observed(&first), observed(&second));
    }

    assert_eq!(headers, before);
    assert!(table.is_published());
}

#[test]
fn test_neutral_context_survives_inject_then_extract() {
    let modes = [
        Propagation::trust_all(),
        Propagation::disable_all(),
        Propagation::public_endpoints(common::classifier(common::health_and_api_table())),
    ];

    for propagation in modes {
        let mut carrier: HashMap<String, String> = HashMap::new();
        propagation.inject_context(&Context::new(), &mut carrier);
        assert!(!carrier.contains_key("traceparent"));

        for path in ["/health", "/api/1"] {
            let cx = propagation.extract(&TextMapCarrier::new(&carrier).with_path(path));
            assert_eq!(observed(&cx), neutral(), "mode {} path {path}", propagation.mode());
        }
    }
}

#[test]
fn test_routes_published_after_startup_take_effect() {
    let table = Arc::new(RouteTable::new());
    let propagation = Propagation::public_endpoints(RouteClassifier::new(table.clone()));
    let headers = common::inbound_headers();
    let carrier = TextMapCarrier::new(&headers).with_path("/health");

    // Unpublished table defaults to trusted.
    assert_eq!(observed(&propagation.extract(&carrier)).0, Some(TRACE_ID.to_string()));

    table.publish(vec![RouteEntry::parse("health", "/health").unwrap().public()]);
    assert_eq!(observed(&propagation.extract(&carrier)), neutral());
}
