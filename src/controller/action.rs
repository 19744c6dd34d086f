//! Action declarations.
//!
//! An action is a controller method registered together with its declared
//! action path, its match filters and its formal parameter list. The table
//! is built once at startup; the resolver only ever reads it.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use axum::http::Method;
use thiserror::Error;

use crate::binding::{Arguments, Param};
use crate::container::Instance;
use crate::controller::filters::MatchFilter;

/// Errors raised by, or while calling, an action handler.
#[derive(Debug, Error)]
pub enum ActionError {
    #[error("controller instance is not a `{expected}`")]
    ControllerType { expected: &'static str },

    #[error("argument `{0}` was not bound")]
    MissingArgument(String),

    #[error("argument `{name}` is not a {expected}")]
    ArgumentType { name: String, expected: &'static str },

    #[error("{0}")]
    Failed(String),
}

/// Type-erased call into a controller method.
pub type Handler =
    Arc<dyn Fn(&mut (dyn Any + Send), Arguments) -> Result<Instance, ActionError> + Send + Sync>;

/// Declarative description of one action, used with `ControllerBuilder::action`.
#[derive(Debug, Clone)]
pub struct Action {
    method_name: String,
    path: String,
    filters: Vec<MatchFilter>,
    parameters: Vec<Param>,
}

impl Action {
    /// An action whose path is the method name.
    pub fn new(method_name: impl Into<String>) -> Self {
        Self {
            method_name: method_name.into(),
            path: String::new(),
            filters: Vec::new(),
            parameters: Vec::new(),
        }
    }

    /// Serve the action under `path` instead of the method name.
    pub fn at(mut self, path: impl Into<String>) -> Self {
        self.path = path.into();
        self
    }

    /// Guard on the HTTP method.
    pub fn method(self, method: Method) -> Self {
        self.filter(MatchFilter::Method(method))
    }

    pub fn filter(mut self, filter: MatchFilter) -> Self {
        self.filters.push(filter);
        self
    }

    /// Append a formal parameter. Arguments are bound in declaration order.
    pub fn param(mut self, param: Param) -> Self {
        self.parameters.push(param);
        self
    }

    pub(crate) fn into_descriptor(
        self,
        declared_in: &str,
        output_type: &'static str,
        handler: Handler,
    ) -> ActionDescriptor {
        ActionDescriptor {
            method_name: self.method_name,
            path: self.path,
            declared_in: declared_in.to_string(),
            filters: self.filters,
            parameters: self.parameters,
            output_type,
            handler,
        }
    }
}

/// A registered, invocable action.
#[derive(Clone)]
pub struct ActionDescriptor {
    method_name: String,
    path: String,
    declared_in: String,
    filters: Vec<MatchFilter>,
    parameters: Vec<Param>,
    output_type: &'static str,
    handler: Handler,
}

impl fmt::Debug for ActionDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActionDescriptor")
            .field("method_name", &self.method_name)
            .field("path", &self.path)
            .field("declared_in", &self.declared_in)
            .field("filters", &self.filters)
            .field("parameters", &self.parameters)
            .field("output_type", &self.output_type)
            .finish_non_exhaustive()
    }
}

impl ActionDescriptor {
    pub fn method_name(&self) -> &str {
        &self.method_name
    }

    /// The declared path; empty when the method name is the action.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// The action name requests must ask for to reach this method.
    pub fn action_name(&self) -> &str {
        if self.path.is_empty() {
            &self.method_name
        } else {
            &self.path
        }
    }

    /// Class name of the controller that declares the method.
    pub fn declared_in(&self) -> &str {
        &self.declared_in
    }

    pub fn filters(&self) -> &[MatchFilter] {
        &self.filters
    }

    pub fn parameters(&self) -> &[Param] {
        &self.parameters
    }

    /// Rust type name of the handler's return value.
    pub fn output_type(&self) -> &'static str {
        self.output_type
    }

    /// The HTTP method guard, if one is declared.
    pub fn http_method(&self) -> Option<&Method> {
        self.filters.iter().find_map(|filter| match filter {
            MatchFilter::Method(method) => Some(method),
            _ => None,
        })
    }

    pub fn invoke(
        &self,
        controller: &mut (dyn Any + Send),
        arguments: Arguments,
    ) -> Result<Instance, ActionError> {
        (self.handler)(controller, arguments)
    }

    /// The same action reached through a projection, owned by a subclass.
    pub(crate) fn with_handler(&self, handler: Handler) -> Self {
        Self {
            handler,
            ..self.clone()
        }
    }

    pub(crate) fn handler(&self) -> &Handler {
        &self.handler
    }
}
