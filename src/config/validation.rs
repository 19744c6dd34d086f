//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Detect duplicate or empty route names before the router sees them
//! - Validate value ranges and addresses
//!
//! # Design Decisions
//! - Returns all validation errors, not just the first
//! - Pure function: &MvcConfig → Result<(), Vec<ValidationError>>
//! - Pattern compilation errors are left to the router, which owns the syntax

use std::collections::HashSet;
use std::net::SocketAddr;

use thiserror::Error;

use crate::config::schema::MvcConfig;

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("namespace must not be empty")]
    EmptyNamespace,

    #[error("route #{index} has an empty name")]
    EmptyRouteName { index: usize },

    #[error("route '{name}' is defined more than once")]
    DuplicateRouteName { name: String },

    #[error("route '{name}' has an empty pattern")]
    EmptyPattern { name: String },

    #[error("{field} '{value}' is not a valid socket address")]
    InvalidAddress { field: &'static str, value: String },

    #[error("server.request_timeout_secs must be greater than zero")]
    ZeroTimeout,
}

/// Check a parsed configuration for semantic errors.
pub fn validate_config(config: &MvcConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.namespace.trim().is_empty() {
        errors.push(ValidationError::EmptyNamespace);
    }

    let mut seen = HashSet::new();
    for (index, route) in config.routes.iter().enumerate() {
        if route.name.trim().is_empty() {
            errors.push(ValidationError::EmptyRouteName { index });
            continue;
        }
        if !seen.insert(route.name.as_str()) {
            errors.push(ValidationError::DuplicateRouteName {
                name: route.name.clone(),
            });
        }
        if route.pattern.trim().is_empty() {
            errors.push(ValidationError::EmptyPattern {
                name: route.name.clone(),
            });
        }
    }

    if config.server.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidAddress {
            field: "server.bind_address",
            value: config.server.bind_address.clone(),
        });
    }
    if config.observability.metrics_enabled
        && config
            .observability
            .metrics_address
            .parse::<SocketAddr>()
            .is_err()
    {
        errors.push(ValidationError::InvalidAddress {
            field: "observability.metrics_address",
            value: config.observability.metrics_address.clone(),
        });
    }

    if config.server.request_timeout_secs == 0 {
        errors.push(ValidationError::ZeroTimeout);
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
    use crate::config::schema::{RouteConfig, RouteParameters};

    fn route(name: &str, pattern: &str) -> RouteConfig {
        RouteConfig {
            name: name.to_string(),
            pattern: pattern.to_string(),
            parameters: RouteParameters::default(),
        }
    }

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate_config(&MvcConfig::default()).is_ok());
    }

    #[test]
    fn test_collects_every_error() {
        let mut config = MvcConfig::default();
        config.namespace = " ".into();
        config.server.bind_address = "not-an-address".into();
        config.server.request_timeout_secs = 0;
        config.routes = vec![route("a", "/a"), route("a", ""), route("", "/c")];

        let errors = validate_config(&config).unwrap_err();
        assert!(errors.contains(&ValidationError::EmptyNamespace));
        assert!(errors.contains(&ValidationError::DuplicateRouteName { name: "a".into() }));
        assert!(errors.contains(&ValidationError::EmptyPattern { name: "a".into() }));
        assert!(errors.contains(&ValidationError::EmptyRouteName { index: 2 }));
        assert!(errors.contains(&ValidationError::ZeroTimeout));
        assert_eq!(errors.len(), 6);
    }

    #[test]
    fn test_metrics_address_checked_only_when_enabled() {
        let mut config = MvcConfig::default();
        config.observability.metrics_address = "nope".into();
        assert!(validate_config(&config).is_ok());

        config.observability.metrics_enabled = true;
        assert!(validate_config(&config).is_err());
    }
}
