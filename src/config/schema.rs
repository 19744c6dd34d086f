//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the dispatch
//! core and its host server. All types derive Serde traits for
//! deserialization from config files.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::routing::{DefaultFill, Parameters};

/// Root configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct MvcConfig {
    /// Namespace controllers are looked up in (`{namespace}\controllers\...`).
    pub namespace: String,

    /// Application home directory; views are resolved relative to it.
    pub home: PathBuf,

    /// Host server settings.
    pub server: ServerConfig,

    /// Route definitions, in match order.
    pub routes: Vec<RouteConfig>,

    /// Dispatch behaviour switches.
    pub dispatch: DispatchConfig,

    /// View lookup settings.
    pub views: ViewConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

impl Default for MvcConfig {
    fn default() -> Self {
        Self {
            namespace: "app".to_string(),
            home: PathBuf::from("."),
            server: ServerConfig::default(),
            routes: Vec::new(),
            dispatch: DispatchConfig::default(),
            views: ViewConfig::default(),
            observability: ObservabilityConfig::default(),
        }
    }
}

/// Host server configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,

    /// Total time allowed per request, in seconds.
    pub request_timeout_secs: u64,

    /// Largest request body collected for posted data.
    pub body_limit_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
            request_timeout_secs: 30,
            body_limit_bytes: 1024 * 1024,
        }
    }
}

/// A named route pattern with its parameters.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RouteConfig {
    /// Unique route name.
    pub name: String,

    /// URL pattern with `{name}`, `{*name}` and `{#name}` placeholders.
    pub pattern: String,

    #[serde(default)]
    pub parameters: RouteParameters,
}

impl RouteConfig {
    pub fn new(name: impl Into<String>, pattern: impl Into<String>, defaults: Parameters) -> Self {
        Self {
            name: name.into(),
            pattern: pattern.into(),
            parameters: RouteParameters { default: defaults },
        }
    }
}

/// Extra parameters attached to a route.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct RouteParameters {
    /// Values used when a placeholder matched nothing.
    #[serde(default)]
    pub default: Parameters,
}

/// Dispatch behaviour switches.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct DispatchConfig {
    /// Whether empty matched values count as missing when filling defaults.
    pub default_fill: DefaultFill,

    /// Treat actions without an HTTP-method guard as GET-only.
    pub implicit_get_guard: bool,
}

/// View lookup settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ViewConfig {
    /// Directory under `home` holding per-controller view folders.
    pub directory: String,

    /// Template file extension.
    pub extension: String,

    /// Search paths (relative to `home`) consulted after the controller folder.
    pub shared: Vec<String>,
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            directory: "views".to_string(),
            extension: "tpl.html".to_string(),
            shared: vec!["views/shared".to_string(), "views/layouts".to_string()],
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Default `tracing` filter; `RUST_LOG` wins when set.
    pub log_filter: String,

    /// Enable the Prometheus exporter.
    pub metrics_enabled: bool,

    /// Exporter listen address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_filter: "mvc_dispatch=info,tower_http=info".to_string(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routing::ParamValue;

    #[test]
    fn test_minimal_config_uses_defaults() {
        let config: MvcConfig = toml::from_str("").unwrap();
        assert_eq!(config.namespace, "app");
        assert_eq!(config.server.bind_address, "0.0.0.0:8080");
        assert_eq!(config.dispatch.default_fill, DefaultFill::Absent);
        assert!(!config.dispatch.implicit_get_guard);
        assert_eq!(config.views.extension, "tpl.html");
    }

    #[test]
    fn test_routes_with_defaults() {
        let config: MvcConfig = toml::from_str(
            r#"
            namespace = "blog"

            [dispatch]
            default_fill = "absent_or_empty"

            [[routes]]
            name = "post"
            pattern = "/posts/{id}"
            parameters.default = { controller = "posts", action = "show" }

            [[routes]]
            name = "tags"
            pattern = "/tags/{#names}"

            [routes.parameters.default]
            controller = "tags"
            action = "index"
            names = ["all"]
            "#,
        )
        .unwrap();

        assert_eq!(config.namespace, "blog");
        assert_eq!(config.dispatch.default_fill, DefaultFill::AbsentOrEmpty);
        assert_eq!(config.routes.len(), 2);
        assert_eq!(
            config.routes[0].parameters.default.get("action"),
            Some(&ParamValue::from("show"))
        );
        assert_eq!(
            config.routes[1].parameters.default.get("names"),
            Some(&ParamValue::List(vec!["all".into()]))
        );
    }
}
