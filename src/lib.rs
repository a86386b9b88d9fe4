//! Endpoint-aware trace context propagation.
//!
//! Decides per inbound request whether W3C trace context and baggage from
//! the caller are honored, based on whether the request path resolves to a
//! route marked public. Outbound injection is never affected.

pub mod config;
pub mod http;
pub mod observability;
pub mod propagation;
pub mod routing;

pub use config::GuardConfig;
pub use http::{InboundContext, TraceContextLayer};
pub use propagation::Propagation;
pub use routing::{RouteClassifier, RouteEntry, RouteTable};
