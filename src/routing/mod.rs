//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Inbound request path
//!     → classifier.rs (snapshot live table, pick winning route)
//!     → pattern.rs (match path against each route template)
//!     → Return: public / trusted
//!
//! Route Publication (startup and hot reload):
//!     RouteConfig[]
//!     → Parse templates into RouteEntry
//!     → Swap into RouteTable as one immutable snapshot
//! ```
//!
//! # Design Decisions
//! - Routes are immutable once published; updates replace the whole set
//! - No regex in the hot path
//! - Deterministic: same table and path always yield the same classification
//! - Lowest order wins, mirroring dispatch precedence

pub mod classifier;
pub mod pattern;
pub mod table;

pub use classifier::{Classification, RouteClassifier};
pub use pattern::{PatternError, RoutePattern, RouteValues};
pub use table::{RouteEntry, RouteSource, RouteTable};
