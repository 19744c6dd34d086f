//! Formal parameter declarations.
//!
//! Each action lists its parameters in call order. A parameter either has a
//! builtin type (bound from the routed value of the same name when there is
//! one), a named type (obtained from the container and handed to a model
//! binder), or no usable type at all (bound as absent).

use std::any::{type_name, Any, TypeId};
use std::fmt;

use crate::binding::default::{overlay, Overlay};
use crate::container::{Instance, ServiceKey};
use crate::model::Bindable;
use crate::view::View;

/// Builtin parameter types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Primitive {
    String,
    Int,
    Float,
    Bool,
    Array,
}

impl Primitive {
    pub fn name(self) -> &'static str {
        match self {
            Primitive::String => "string",
            Primitive::Int => "int",
            Primitive::Float => "float",
            Primitive::Bool => "bool",
            Primitive::Array => "array",
        }
    }
}

/// A named, non-builtin parameter type.
#[derive(Clone, Copy)]
pub struct NamedType {
    id: TypeId,
    name: &'static str,
    construct: Option<fn() -> Instance>,
    overlay: Option<Overlay>,
}

impl fmt::Debug for NamedType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NamedType")
            .field("name", &self.name)
            .field("constructible", &self.construct.is_some())
            .field("bindable", &self.overlay.is_some())
            .finish()
    }
}

impl NamedType {
    pub fn of<T: Any>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: type_name::<T>(),
            construct: None,
            overlay: None,
        }
    }

    pub fn id(&self) -> TypeId {
        self.id
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn key(&self) -> ServiceKey {
        ServiceKey::Type(self.id)
    }

    /// Builds an instance when the container has no binding for the type.
    pub fn construct(&self) -> Option<fn() -> Instance> {
        self.construct
    }

    /// Writes request data onto an instance of this type.
    pub fn overlay(&self) -> Option<Overlay> {
        self.overlay
    }
}

#[derive(Debug, Clone, Copy)]
pub enum ParamType {
    Primitive(Primitive),
    Named(NamedType),
    /// A type the binder cannot name; always bound as absent.
    Unnamed,
}

/// One formal parameter of an action.
#[derive(Debug, Clone)]
pub struct Param {
    name: String,
    ty: ParamType,
    optional: bool,
}

impl Param {
    fn primitive(name: impl Into<String>, primitive: Primitive) -> Self {
        Self {
            name: name.into(),
            ty: ParamType::Primitive(primitive),
            optional: false,
        }
    }

    pub fn string(name: impl Into<String>) -> Self {
        Self::primitive(name, Primitive::String)
    }

    pub fn int(name: impl Into<String>) -> Self {
        Self::primitive(name, Primitive::Int)
    }

    pub fn float(name: impl Into<String>) -> Self {
        Self::primitive(name, Primitive::Float)
    }

    pub fn bool(name: impl Into<String>) -> Self {
        Self::primitive(name, Primitive::Bool)
    }

    pub fn array(name: impl Into<String>) -> Self {
        Self::primitive(name, Primitive::Array)
    }

    /// A request-bindable value type. Built with `Default` unless the
    /// container binds `T`.
    pub fn model<T: Bindable + Default>(name: impl Into<String>) -> Self {
        let ty = NamedType {
            construct: Some(|| Box::new(T::default()) as Instance),
            overlay: Some(overlay::<T>),
            ..NamedType::of::<T>()
        };
        Self {
            name: name.into(),
            ty: ParamType::Named(ty),
            optional: false,
        }
    }

    /// A service the container must provide.
    pub fn service<T: Any + Send>(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ty: ParamType::Named(NamedType::of::<T>()),
            optional: false,
        }
    }

    /// A view prepared by the view binder.
    pub fn view(name: impl Into<String>) -> Self {
        Self::service::<View>(name)
    }

    pub fn untyped(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ty: ParamType::Unnamed,
            optional: false,
        }
    }

    /// Bind a builtin parameter as absent instead of failing when no routed
    /// value carries its name.
    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn ty(&self) -> &ParamType {
        &self.ty
    }

    pub fn is_optional(&self) -> bool {
        self.optional
    }
}
