//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the guard.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for the propagation guard.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct GuardConfig {
    /// Which propagation policy is installed at startup.
    pub propagation: PropagationConfig,

    /// Route definitions used to classify inbound request paths.
    pub routes: Vec<RouteConfig>,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

impl GuardConfig {
    /// Number of routes carrying the public-endpoint marker.
    pub fn public_route_count(&self) -> usize {
        self.routes.iter().filter(|r| r.public).count()
    }
}

/// Propagation policy selection.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct PropagationConfig {
    /// Active mode. Exactly one mode is installed per process.
    pub mode: PropagationMode,

    /// How requests are classified while the route table is not yet published.
    pub unpublished_routes: UnpublishedRoutes,
}

/// The three mutually exclusive propagation modes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PropagationMode {
    /// Honor inbound context everywhere.
    #[default]
    TrustAll,
    /// Never honor inbound context.
    DisableAll,
    /// Discard inbound context on routes marked public.
    PublicEndpoints,
}

impl PropagationMode {
    /// Stable label used in logs and metrics.
    pub fn as_str(&self) -> &'static str {
        match self {
            PropagationMode::TrustAll => "trust_all",
            PropagationMode::DisableAll => "disable_all",
            PropagationMode::PublicEndpoints => "public_endpoints",
        }
    }
}

impl std::fmt::Display for PropagationMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classification used before the first route table is published.
///
/// This is a trust decision for operators: `Trusted` keeps tracing working
/// during startup, `Public` keeps inbound context out until routes are known.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UnpublishedRoutes {
    #[default]
    Trusted,
    Public,
}

/// A single route entry as written in the config file.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RouteConfig {
    /// Route identifier for logging/metrics.
    pub name: String,

    /// Route template, e.g. `/api/{id:int}` or `/files/{*path}`.
    pub pattern: String,

    /// Dispatch order (lower = preferred when several routes match).
    #[serde(default)]
    pub order: i32,

    /// Public-endpoint marker: inbound trace context is not trusted here.
    #[serde(default)]
    pub public: bool,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}
