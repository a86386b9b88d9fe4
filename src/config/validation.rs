//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Reject route templates that cannot be parsed
//! - Detect empty and duplicate route names
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: GuardConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::collections::HashSet;

use thiserror::Error;

use crate::config::schema::GuardConfig;
use crate::routing::pattern::{PatternError, RoutePattern};

/// A single semantic problem found in a config.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("route #{index} has an empty name")]
    EmptyRouteName { index: usize },

    #[error("route name `{name}` is used more than once")]
    DuplicateRouteName { name: String },

    #[error("route `{name}` has an invalid pattern: {source}")]
    InvalidPattern { name: String, source: PatternError },
}

/// Validate a parsed configuration.
pub fn validate_config(config: &GuardConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();
    let mut seen = HashSet::new();

    for (index, route) in config.routes.iter().enumerate() {
        if route.name.trim().is_empty() {
            errors.push(ValidationError::EmptyRouteName { index });
        } else if !seen.insert(route.name.as_str()) {
            errors.push(ValidationError::DuplicateRouteName {
                name: route.name.clone(),
            });
        }

        if let Err(source) = RoutePattern::parse(&route.pattern) {
            errors.push(ValidationError::InvalidPattern {
                name: route.name.clone(),
                source,
            });
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::RouteConfig;

    fn route(name: &str, pattern: &str) -> RouteConfig {
        RouteConfig {
            name: name.into(),
            pattern: pattern.into(),
            order: 0,
            public: false,
        }
    }

    #[test]
    fn test_valid_config() {
        let mut config = GuardConfig::default();
        config.routes.push(route("health", "/health"));
        config.routes.push(route("api", "/api/{id:int}"));
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_collects_all_errors() {
        let mut config = GuardConfig::default();
        config.routes.push(route("", "/ok"));
        config.routes.push(route("api", "/api/{id"));
        config.routes.push(route("api", "/other"));

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 3);
        assert_eq!(errors[0], ValidationError::EmptyRouteName { index: 0 });
        assert!(matches!(errors[1], ValidationError::InvalidPattern { .. }));
        assert_eq!(
            errors[2],
            ValidationError::DuplicateRouteName { name: "api".into() }
        );
    }
}
