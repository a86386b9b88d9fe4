//! Public endpoint classification.
//!
//! # Responsibilities
//! - Find the route the router would dispatch a path to
//! - Report whether that route carries the public-endpoint marker
//!
//! # Design Decisions
//! - Queries the live table on every call (no caching), so hot reloads apply immediately
//! - Lowest `order` wins among matching routes; ties go to table order
//! - Never fails: no match means "not public"
//! - An unpublished table follows `UnpublishedRoutes` (default: trusted)

use std::sync::Arc;

use serde::Serialize;

use crate::config::UnpublishedRoutes;
use crate::routing::table::{RouteEntry, RouteSource};

/// Outcome of classifying a single path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Classification {
    /// Treat the request as public: inbound trace context is discarded.
    pub public: bool,
    /// Name of the winning route, if any route matched.
    pub route: Option<String>,
    /// Whether a route table was available at classification time.
    pub table_published: bool,
}

/// Classifies request paths against a route source.
#[derive(Debug, Clone)]
pub struct RouteClassifier {
    routes: Arc<dyn RouteSource>,
    unpublished: UnpublishedRoutes,
}

impl RouteClassifier {
    /// Create a classifier that trusts requests while the table is unpublished.
    pub fn new(routes: Arc<dyn RouteSource>) -> Self {
        Self {
            routes,
            unpublished: UnpublishedRoutes::default(),
        }
    }

    /// Choose how requests are classified before routes are published.
    pub fn with_unpublished(mut self, unpublished: UnpublishedRoutes) -> Self {
        self.unpublished = unpublished;
        self
    }

    /// Returns true if the path resolves to a route marked public.
    pub fn is_public_endpoint(&self, path: &str) -> bool {
        self.classify(path).public
    }

    /// Classify a path, reporting the winning route.
    pub fn classify(&self, path: &str) -> Classification {
        let Some(routes) = self.routes.snapshot() else {
            return Classification {
                public: self.unpublished == UnpublishedRoutes::Public,
                route: None,
                table_published: false,
            };
        };

        match select_route(&routes, path) {
            Some(entry) => Classification {
                public: entry.is_public(),
                route: Some(entry.name().to_string()),
                table_published: true,
            },
            None => Classification {
                public: false,
                route: None,
                table_published: true,
            },
        }
    }
}

/// Pick the matching route with the lowest order; the first one wins on ties.
fn select_route<'a>(routes: &'a [RouteEntry], path: &str) -> Option<&'a RouteEntry> {
    routes
        .iter()
        .filter(|entry| entry.pattern().matches(path))
        .min_by_key(|entry| entry.order())
}
