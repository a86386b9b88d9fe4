//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → logging.rs (structured log events)
//!     → metrics.rs (extraction decisions, route table publishes)
//!
//! Consumers:
//!     → Log aggregation (stdout)
//!     → Whatever metrics recorder the host installs
//! ```
//!
//! # Design Decisions
//! - Strip decisions log at debug; table publishes at info
//! - Metrics are cheap (counter increments)

pub mod logging;
pub mod metrics;
