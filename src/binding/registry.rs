//! Model binder contract and registry.
//!
//! # Responsibilities
//! - Define how a binder turns a container-provided instance into an argument
//! - Map parameter types to binders, with one default for unmapped types
//!
//! # Design Decisions
//! - The registry is filled at startup and shared read-only afterwards
//! - Binders see the routed controller specification, the request and the
//!   request's container scope, never mutable dispatch state

use std::any::{type_name, Any, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use thiserror::Error;

use crate::binding::default::DefaultModelBinder;
use crate::binding::param::NamedType;
use crate::container::{Instance, ServiceContainer};
use crate::controller::ControllerSpec;
use crate::http::DispatchRequest;

/// Errors raised by model binders.
#[derive(Debug, Error)]
pub enum BindError {
    /// The instance cannot take request data, or is not the type the binder
    /// handles.
    #[error("`{type_name}` cannot be bound from request data")]
    NotBindable { type_name: &'static str },

    /// A request value does not fit the field it targets.
    #[error("field `{field}` expects {expected}, got \"{value}\"")]
    InvalidValue {
        field: String,
        value: String,
        expected: &'static str,
    },

    #[error("bound value does not fit its type: {0}")]
    Serde(#[from] serde_json::Error),
}

/// An instance to bind, with its declared type.
pub struct BindTarget<'a> {
    pub instance: Instance,
    pub ty: &'a NamedType,
}

/// What a binder may read while binding.
#[derive(Clone, Copy)]
pub struct BindContext<'a> {
    pub spec: &'a ControllerSpec,
    pub request: &'a DispatchRequest,
    pub container: &'a ServiceContainer,
}

/// Produces an action argument from a container-provided instance.
pub trait ModelBinder: Send + Sync {
    fn bind(
        &self,
        target: BindTarget<'_>,
        parameter: &str,
        context: &BindContext<'_>,
    ) -> Result<Instance, BindError>;
}

/// Parameter type → binder, with a default.
#[derive(Clone)]
pub struct BinderRegistry {
    default: Arc<dyn ModelBinder>,
    binders: HashMap<TypeId, (&'static str, Arc<dyn ModelBinder>)>,
}

impl fmt::Debug for BinderRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut types: Vec<_> = self.binders.values().map(|(name, _)| *name).collect();
        types.sort_unstable();
        f.debug_struct("BinderRegistry")
            .field("types", &types)
            .finish_non_exhaustive()
    }
}

impl Default for BinderRegistry {
    fn default() -> Self {
        Self::new(Arc::new(DefaultModelBinder))
    }
}

impl BinderRegistry {
    pub fn new(default: Arc<dyn ModelBinder>) -> Self {
        Self {
            default,
            binders: HashMap::new(),
        }
    }

    pub fn set_default(&mut self, binder: Arc<dyn ModelBinder>) -> &mut Self {
        self.default = binder;
        self
    }

    /// Use `binder` for parameters of type `T`.
    pub fn register<T: Any>(&mut self, binder: Arc<dyn ModelBinder>) -> &mut Self {
        self.binders
            .insert(TypeId::of::<T>(), (type_name::<T>(), binder));
        self
    }

    pub fn contains(&self, id: TypeId) -> bool {
        self.binders.contains_key(&id)
    }

    /// The binder for `id`, or the default one.
    pub fn get(&self, id: TypeId) -> &Arc<dyn ModelBinder> {
        self.binders
            .get(&id)
            .map(|(_, binder)| binder)
            .unwrap_or(&self.default)
    }
}
