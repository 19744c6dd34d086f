//! Dispatch failures.
//!
//! Every failure is raised where it is discovered and returned unchanged to
//! the host. The host decides how to present it; `status()` is the mapping
//! the bundled server uses.

use std::fmt;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

use crate::binding::BindError;
use crate::container::ContainerError;
use crate::controller::ActionError;
use crate::routing::RouteError;
use crate::view::TemplateError;

/// Pipeline stages, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchStage {
    Routing,
    Locating,
    ResolvingAction,
    Binding,
    Invoking,
    Normalizing,
}

impl fmt::Display for DispatchStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            DispatchStage::Routing => "routing",
            DispatchStage::Locating => "locating",
            DispatchStage::ResolvingAction => "resolving_action",
            DispatchStage::Binding => "binding",
            DispatchStage::Invoking => "invoking",
            DispatchStage::Normalizing => "normalizing",
        })
    }
}

#[derive(Debug, Error)]
pub enum DispatchError {
    #[error(transparent)]
    Route(#[from] RouteError),

    #[error("failed to load controller `{class}`: {source}")]
    Controller {
        class: String,
        #[source]
        source: ContainerError,
    },

    #[error("could not resolve a controller/method combination for action \"{action}\" of `{controller}` [{path}]")]
    ActionNotFound {
        controller: String,
        action: String,
        path: String,
    },

    #[error("could not find a value to bind to [${parameter}]: {source}")]
    ParameterResolution {
        parameter: String,
        #[source]
        source: ContainerError,
    },

    #[error("failed to bind [${parameter}]: {source}")]
    Binding {
        parameter: String,
        #[source]
        source: BindError,
    },

    #[error("action `{action}` failed: {source}")]
    Action {
        action: String,
        #[source]
        source: ActionError,
    },

    #[error("controller returned an unexpected {found}")]
    UnexpectedOutput { found: String },

    #[error("failed to render view: {0}")]
    Render(#[from] TemplateError),
}

impl DispatchError {
    /// The stage that raised the error.
    pub fn stage(&self) -> DispatchStage {
        match self {
            DispatchError::Route(_) => DispatchStage::Routing,
            DispatchError::Controller { .. } => DispatchStage::Locating,
            DispatchError::ActionNotFound { .. } => DispatchStage::ResolvingAction,
            DispatchError::ParameterResolution { .. } | DispatchError::Binding { .. } => {
                DispatchStage::Binding
            }
            DispatchError::Action { .. } => DispatchStage::Invoking,
            DispatchError::UnexpectedOutput { .. } | DispatchError::Render(_) => {
                DispatchStage::Normalizing
            }
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            DispatchError::Route(RouteError::RouteNotFound { .. })
            | DispatchError::ActionNotFound { .. } => StatusCode::NOT_FOUND,
            DispatchError::ParameterResolution { .. }
            | DispatchError::Binding { .. }
            | DispatchError::Action {
                source: ActionError::MissingArgument(_) | ActionError::ArgumentType { .. },
                ..
            } => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Short outcome label for metrics.
    pub fn outcome(&self) -> &'static str {
        match self {
            DispatchError::Route(_) => "route_not_found",
            DispatchError::Controller { .. } => "controller_error",
            DispatchError::ActionNotFound { .. } => "action_not_found",
            DispatchError::ParameterResolution { .. } => "parameter_resolution",
            DispatchError::Binding { .. } => "binding_error",
            DispatchError::Action { .. } => "action_error",
            DispatchError::UnexpectedOutput { .. } => "unexpected_output",
            DispatchError::Render(_) => "render_error",
        }
    }
}

impl IntoResponse for DispatchError {
    fn into_response(self) -> Response {
        // Already logged by `Dispatcher::handle`.
        (self.status(), self.to_string()).into_response()
    }
}
