//! Startup-time selection of the active propagation policy.
//!
//! A `Propagation` handle is built once and cloned into every call site that
//! extracts or injects context. Nothing is installed globally.

use std::sync::Arc;

use opentelemetry::propagation::{Injector, TextMapCompositePropagator};
use opentelemetry::Context;

use crate::config::{PropagationConfig, PropagationMode};
use crate::propagation::carrier::RequestCarrier;
use crate::propagation::isolated::DisableAllPolicy;
use crate::propagation::policy::{PropagationPolicy, TrustAll};
use crate::propagation::protected::PublicEndpointPolicy;
use crate::routing::{RouteClassifier, RouteSource};

/// The installed propagation policy.
#[derive(Debug, Clone)]
pub struct Propagation {
    mode: PropagationMode,
    policy: Arc<dyn PropagationPolicy>,
}

impl Propagation {
    /// Honor inbound context everywhere.
    pub fn trust_all() -> Self {
        Self {
            mode: PropagationMode::TrustAll,
            policy: Arc::new(TrustAll::new()),
        }
    }

    /// Never honor inbound context.
    pub fn disable_all() -> Self {
        Self {
            mode: PropagationMode::DisableAll,
            policy: Arc::new(DisableAllPolicy::new()),
        }
    }

    /// Discard inbound context on routes marked public.
    pub fn public_endpoints(classifier: RouteClassifier) -> Self {
        Self {
            mode: PropagationMode::PublicEndpoints,
            policy: Arc::new(PublicEndpointPolicy::new(classifier)),
        }
    }

    /// Build the policy selected in config. `routes` is only consulted in
    /// `public_endpoints` mode, and only at request time.
    pub fn from_config(config: &PropagationConfig, routes: Arc<dyn RouteSource>) -> Self {
        let propagation = match config.mode {
            PropagationMode::TrustAll => Self::trust_all(),
            PropagationMode::DisableAll => Self::disable_all(),
            PropagationMode::PublicEndpoints => Self::public_endpoints(
                RouteClassifier::new(routes).with_unpublished(config.unpublished_routes),
            ),
        };

        tracing::info!(
            mode = %config.mode,
            unpublished_routes = ?config.unpublished_routes,
            "Propagation policy installed"
        );
        propagation
    }

    pub fn mode(&self) -> PropagationMode {
        self.mode
    }

    /// Extract inbound context starting from a neutral context.
    pub fn extract(&self, carrier: &dyn RequestCarrier) -> Context {
        self.policy.extract_with_context(&Context::new(), carrier)
    }

    pub fn extract_with_context(&self, cx: &Context, carrier: &dyn RequestCarrier) -> Context {
        self.policy.extract_with_context(cx, carrier)
    }

    /// Write `cx` into an outbound carrier. Never classified.
    pub fn inject_context(&self, cx: &Context, injector: &mut dyn Injector) {
        self.policy.inject_context(cx, injector);
    }

    /// Header names read and written by the active policy.
    pub fn fields(&self) -> Vec<String> {
        self.policy.fields().map(String::from).collect()
    }

    /// The active policy as a text-map propagator for SDK integrations.
    pub fn text_map_propagator(&self) -> TextMapCompositePropagator {
        self.policy.text_map_propagator()
    }
}

impl Default for Propagation {
    fn default() -> Self {
        Self::trust_all()
    }
}
