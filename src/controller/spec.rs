//! Controller specification and locator.
//!
//! Turns routed parameters into the class name the container resolves and
//! the action name the resolver looks for. Pure string work; a malformed
//! controller name just yields a class name nothing is bound under.

use heck::ToUpperCamelCase;

use crate::routing::{ParamValue, Parameters};

/// Fully-qualified class name for a short controller name.
///
/// `("app", "blog_posts")` → `app\controllers\BlogPostsController`
pub fn controller_class_name(namespace: &str, controller: &str) -> String {
    format!(
        "{namespace}\\controllers\\{}Controller",
        controller.to_upper_camel_case()
    )
}

/// The per-request record of which controller and action were routed to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControllerSpec {
    controller_class: String,
    controller_name: String,
    action: String,
    parameters: Parameters,
}

impl ControllerSpec {
    /// Derive the specification from a routed parameter map.
    pub fn locate(namespace: &str, parameters: Parameters) -> Self {
        let scalar = |key: &str| {
            parameters
                .get(key)
                .map(ParamValue::to_string)
                .unwrap_or_default()
        };
        let controller_name = scalar("controller");
        let action = scalar("action");

        Self {
            controller_class: controller_class_name(namespace, &controller_name),
            controller_name,
            action,
            parameters,
        }
    }

    pub fn controller_class(&self) -> &str {
        &self.controller_class
    }

    /// The short controller name as routed, e.g. `posts`.
    pub fn controller_name(&self) -> &str {
        &self.controller_name
    }

    pub fn action(&self) -> &str {
        &self.action
    }

    pub fn parameter(&self, name: &str) -> Option<&ParamValue> {
        self.parameters.get(name)
    }

    pub fn parameters(&self) -> &Parameters {
        &self.parameters
    }
}
