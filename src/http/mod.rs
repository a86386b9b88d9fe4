//! HTTP integration.
//!
//! # Data Flow
//! ```text
//! Inbound request
//!     → context.rs (TraceContextLayer: extract via Propagation)
//!     → request extensions: InboundContext
//!     → handler (InboundContext extractor)
//!     → outbound call: inject_headers(...)
//! ```

pub mod context;

pub use context::{inject_headers, InboundContext, TraceContextLayer, TraceContextService};
