//! Route table and lookup.
//!
//! # Responsibilities
//! - Store named routes in match order
//! - Match a request path against routes, first match wins
//! - Fill in configured default values, then add query keys the route left open
//! - Return the parameter map or an explicit `RouteNotFound`
//!
//! # Design Decisions
//! - Populated at startup, read-only while serving (shared via `Arc`, no locks)
//! - Route names are unique; a duplicate is a startup error
//! - Matching never mutates the table, so identical input yields identical output
//! - A placeholder that matched nothing and has no default disqualifies the route

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::RouteConfig;
use crate::routing::matcher::PatternMatcher;
use crate::routing::params::{parse_urlencoded, ParamValue, Parameters};

/// Parameters every successful route must produce.
const TARGET_KEYS: [&str; 2] = ["controller", "action"];

/// Routing errors.
#[derive(Debug, Error)]
pub enum RouteError {
    /// A route with the same name is already registered.
    #[error("a route named '{name}' already exists")]
    DuplicateRoute { name: String },

    /// No registered route matches the path.
    #[error("failed to find a route for the requested path \"{path}\"")]
    RouteNotFound { path: String },

    /// The pattern could not be compiled.
    #[error("route '{name}' has an invalid pattern: {source}")]
    InvalidPattern {
        name: String,
        #[source]
        source: regex::Error,
    },

    /// The route can never produce a controller or action.
    #[error("route '{name}' neither declares nor defaults '{key}'")]
    MissingTarget { name: String, key: &'static str },
}

/// When a configured default replaces a matched value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DefaultFill {
    /// Only parameters missing from the match are filled.
    #[default]
    Absent,
    /// Parameters missing from the match or matched as empty are filled.
    AbsentOrEmpty,
}

/// A named, compiled route.
#[derive(Debug, Clone)]
pub struct Route {
    name: String,
    matcher: PatternMatcher,
    defaults: Parameters,
}

impl Route {
    fn new(name: String, pattern: &str, defaults: Parameters) -> Result<Self, RouteError> {
        let matcher = PatternMatcher::compile(pattern).map_err(|source| {
            RouteError::InvalidPattern {
                name: name.clone(),
                source,
            }
        })?;

        for key in TARGET_KEYS {
            let declared = matcher.placeholders().iter().any(|p| p.name == key);
            if !declared && !defaults.contains_key(key) {
                return Err(RouteError::MissingTarget { name, key });
            }
        }

        Ok(Self {
            name,
            matcher,
            defaults,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn pattern(&self) -> &str {
        self.matcher.pattern()
    }

    /// Declared variable names, in pattern order.
    pub fn variables(&self) -> impl Iterator<Item = &str> {
        self.matcher.placeholders().iter().map(|p| p.name.as_str())
    }

    pub fn defaults(&self) -> &Parameters {
        &self.defaults
    }

    pub fn matcher(&self) -> &PatternMatcher {
        &self.matcher
    }

    fn fill_defaults(&self, params: &mut Parameters, fill: DefaultFill) {
        for (key, value) in &self.defaults {
            let replace = match params.get(key) {
                None => true,
                Some(current) => fill == DefaultFill::AbsentOrEmpty && current.is_empty(),
            };
            if replace {
                params.insert(key.clone(), value.clone());
            }
        }
    }

    fn first_missing<'a>(&'a self, params: &Parameters) -> Option<&'a str> {
        self.variables().find(|name| !params.contains_key(*name))
    }
}

/// Ordered route table.
#[derive(Debug, Default)]
pub struct Router {
    routes: Vec<Route>,
    fill: DefaultFill,
}

impl Router {
    /// Create an empty router with strict-absence default filling.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty router with the given default-fill policy.
    pub fn with_default_fill(fill: DefaultFill) -> Self {
        Self {
            routes: Vec::new(),
            fill,
        }
    }

    /// Register a route after all existing routes.
    pub fn append_route(
        &mut self,
        name: impl Into<String>,
        pattern: &str,
        defaults: Parameters,
    ) -> Result<(), RouteError> {
        let route = self.create_route(name.into(), pattern, defaults)?;
        self.routes.push(route);
        Ok(())
    }

    /// Register a route before all existing routes.
    pub fn prepend_route(
        &mut self,
        name: impl Into<String>,
        pattern: &str,
        defaults: Parameters,
    ) -> Result<(), RouteError> {
        let route = self.create_route(name.into(), pattern, defaults)?;
        self.routes.insert(0, route);
        Ok(())
    }

    /// Append every configured route, in order.
    pub fn set_routes(&mut self, routes: &[RouteConfig]) -> Result<(), RouteError> {
        for route in routes {
            self.append_route(
                route.name.clone(),
                &route.pattern,
                route.parameters.default.clone(),
            )?;
        }
        Ok(())
    }

    fn create_route(
        &self,
        name: String,
        pattern: &str,
        defaults: Parameters,
    ) -> Result<Route, RouteError> {
        if self.get_route(&name).is_some() {
            return Err(RouteError::DuplicateRoute { name });
        }
        let route = Route::new(name, pattern, defaults)?;
        tracing::debug!(
            route = %route.name,
            pattern = %route.pattern(),
            regex = %route.matcher.regex(),
            "Route compiled"
        );
        Ok(route)
    }

    /// Look up a route by name.
    pub fn get_route(&self, name: &str) -> Option<&Route> {
        self.routes.iter().find(|r| r.name == name)
    }

    /// Routes in match order.
    pub fn routes(&self) -> impl Iterator<Item = &Route> {
        self.routes.iter()
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    pub fn default_fill(&self) -> DefaultFill {
        self.fill
    }

    /// Resolve a request path and optional query string to route parameters.
    ///
    /// Defaults fill what the path did not capture (see [`DefaultFill`]).
    /// Query keys are added afterwards and never replace a captured or
    /// defaulted value, nor stand in for a missing placeholder.
    pub fn route(&self, path: &str, query: Option<&str>) -> Result<Parameters, RouteError> {
        let query = query.map(parse_urlencoded).unwrap_or_default();

        for route in &self.routes {
            let Some(mut params) = route.matcher.captures(path) else {
                continue;
            };
            route.fill_defaults(&mut params, self.fill);

            if let Some(missing) = route.first_missing(&params) {
                tracing::trace!(
                    route = %route.name,
                    parameter = missing,
                    "Route skipped, placeholder has no value or default"
                );
                continue;
            }

            // Captured and defaulted keys are final; the query only adds.
            for (key, value) in &query {
                params.entry(key.clone()).or_insert_with(|| value.clone());
            }

            tracing::debug!(route = %route.name, path, "Route matched");
            return Ok(params);
        }

        Err(RouteError::RouteNotFound {
            path: path.to_string(),
        })
    }
}

/// Convenience for building default maps in code.
pub fn defaults<K, V, I>(entries: I) -> Parameters
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<ParamValue>,
{
    entries
        .into_iter()
        .map(|(k, v)| (k.into(), v.into()))
        .collect()
}
