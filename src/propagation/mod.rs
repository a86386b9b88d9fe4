//! Trace-context propagation policies.
//!
//! # Data Flow
//! ```text
//! Inbound request
//!     → carrier.rs (headers + request path)
//!     → registry.rs (installed Propagation)
//!         trust_all        → standard W3C extraction
//!         disable_all      → isolated.rs (neutral context)
//!         public_endpoints → protected.rs
//!                              → routing::RouteClassifier (is this path public?)
//!                              → public: neutral context / else: standard extraction
//!     → Context threaded through request handling
//!
//! Outbound call
//!     → registry.rs → standard W3C injection (never classified)
//! ```
//!
//! # Design Decisions
//! - Composition over the SDK propagators, not replacement of them
//! - Context is passed explicitly; no ambient "current baggage"
//! - Policy is chosen once at startup and never changes
//! - Policies fail closed toward standard extraction; nothing here returns an error

pub mod carrier;
pub mod isolated;
pub mod policy;
pub mod protected;
pub mod registry;

pub use carrier::{HeaderExtractor, HeaderInjector, HttpCarrier, RequestCarrier, TextMapCarrier};
pub use isolated::{DisableAllPolicy, IsolatedPropagator};
pub use policy::{PropagationPolicy, TrustAll};
pub use protected::{ProtectedPropagator, PublicEndpointPolicy};
pub use registry::Propagation;
