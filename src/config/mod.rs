//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks, route templates)
//!     → GuardConfig (validated, immutable)
//!     → propagation mode chosen once at startup
//!     → routes published into the live RouteTable
//!
//! On file change:
//!     watcher.rs detects change
//!     → loader.rs loads new config
//!     → validation.rs validates
//!     → routes republished (atomic swap); propagation mode is NOT changed
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; changes require full reload
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks
//! - Only the route table is hot-reloadable; the installed policy is set once

pub mod loader;
pub mod schema;
pub mod validation;
pub mod watcher;

pub use loader::{load_config, parse_config, ConfigError};
pub use schema::GuardConfig;
pub use schema::ObservabilityConfig;
pub use schema::PropagationConfig;
pub use schema::PropagationMode;
pub use schema::RouteConfig;
pub use schema::UnpublishedRoutes;
pub use watcher::{spawn_route_reloader, ConfigWatcher, ReloadOutcome};
