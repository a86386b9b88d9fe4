//! Route entries and the live route table.
//!
//! # Responsibilities
//! - Hold registered routes (template, order, public marker)
//! - Publish new route sets atomically (config load, hot reload)
//! - Hand out consistent snapshots to readers without locking
//!
//! # Design Decisions
//! - Copy-on-write: a publish swaps in a whole new `Arc<Vec<RouteEntry>>`
//! - Entries are immutable once published
//! - "Not yet published" is distinct from "published but empty"

use std::sync::Arc;

use arc_swap::ArcSwapOption;

use crate::config::RouteConfig;
use crate::observability::metrics;
use crate::routing::pattern::{PatternError, RoutePattern};

/// A registered endpoint.
#[derive(Debug, Clone, PartialEq)]
pub struct RouteEntry {
    name: String,
    pattern: RoutePattern,
    order: i32,
    public: bool,
}

impl RouteEntry {
    /// Parse a template into a route entry with order 0 and no marker.
    pub fn parse(name: impl Into<String>, pattern: &str) -> Result<Self, PatternError> {
        Ok(Self {
            name: name.into(),
            pattern: RoutePattern::parse(pattern)?,
            order: 0,
            public: false,
        })
    }

    /// Set the dispatch order.
    pub fn with_order(mut self, order: i32) -> Self {
        self.order = order;
        self
    }

    /// Attach the public-endpoint marker.
    pub fn public(mut self) -> Self {
        self.public = true;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn pattern(&self) -> &RoutePattern {
        &self.pattern
    }

    pub fn order(&self) -> i32 {
        self.order
    }

    /// Whether inbound trace context must not be trusted on this route.
    pub fn is_public(&self) -> bool {
        self.public
    }
}

impl TryFrom<&RouteConfig> for RouteEntry {
    type Error = PatternError;

    fn try_from(config: &RouteConfig) -> Result<Self, Self::Error> {
        let entry = RouteEntry::parse(config.name.clone(), &config.pattern)?.with_order(config.order);
        Ok(if config.public { entry.public() } else { entry })
    }
}

/// Read side of a route table, as consumed by the classifier.
pub trait RouteSource: Send + Sync + std::fmt::Debug {
    /// Current routes, or `None` if the table has not been published yet.
    fn snapshot(&self) -> Option<Arc<Vec<RouteEntry>>>;
}

/// The live, externally updated route table.
#[derive(Debug, Default)]
pub struct RouteTable {
    routes: ArcSwapOption<Vec<RouteEntry>>,
}

impl RouteTable {
    /// Create an unpublished table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a table that is already published with the given routes.
    pub fn with_routes(routes: Vec<RouteEntry>) -> Self {
        let table = Self::new();
        table.publish(routes);
        table
    }

    /// Replace the current routes.
    pub fn publish(&self, routes: Vec<RouteEntry>) {
        let public = routes.iter().filter(|r| r.is_public()).count();
        tracing::info!(routes = routes.len(), public, "Route table published");
        metrics::record_route_publish();
        self.routes.store(Some(Arc::new(routes)));
    }

    /// Build entries from config and publish them. Nothing is published on error.
    pub fn publish_config(&self, routes: &[RouteConfig]) -> Result<usize, PatternError> {
        let entries = routes
            .iter()
            .map(RouteEntry::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        let count = entries.len();
        self.publish(entries);
        Ok(count)
    }

    /// Return the table to the unpublished state.
    pub fn unpublish(&self) {
        tracing::info!("Route table unpublished");
        self.routes.store(None);
    }

    pub fn is_published(&self) -> bool {
        self.routes.load().is_some()
    }
}

impl RouteSource for RouteTable {
    fn snapshot(&self) -> Option<Arc<Vec<RouteEntry>>> {
        self.routes.load_full()
    }
}
