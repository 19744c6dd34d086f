//! Static controller tables.
//!
//! # Responsibilities
//! - Record, per controller class, how to build it and which actions it has
//! - Model inheritance: a controller can extend another controller's table
//!   through a projection onto the embedded parent value
//! - Keep scan order stable: own actions first, then inherited ones
//!
//! # Design Decisions
//! - Tables are built at startup and frozen; nothing is discovered per request
//! - "Declared directly on the resolved class" is a plain comparison of the
//!   action's declaring class name with the descriptor's class name
//! - An own method hides an inherited method of the same name

use std::any::{type_name, Any};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::binding::Arguments;
use crate::container::{ContainerError, Factory, Instance, ServiceContainer};
use crate::controller::action::{Action, ActionDescriptor, ActionError, Handler};

/// Builds a `ControllerDescriptor` for controller type `C`.
pub struct ControllerBuilder<C> {
    class_name: String,
    factory: Factory,
    own: Vec<ActionDescriptor>,
    inherited: Vec<ActionDescriptor>,
    _controller: std::marker::PhantomData<fn() -> C>,
}

impl<C: Any + Send> ControllerBuilder<C> {
    /// Start a table for the class `class_name`, built by `factory`.
    pub fn new<F>(class_name: impl Into<String>, factory: F) -> Self
    where
        F: Fn(&ServiceContainer) -> Result<C, ContainerError> + Send + Sync + 'static,
    {
        let factory: Factory =
            Arc::new(move |c: &ServiceContainer| factory(c).map(|v| Box::new(v) as Instance));
        Self {
            class_name: class_name.into(),
            factory,
            own: Vec::new(),
            inherited: Vec::new(),
            _controller: std::marker::PhantomData,
        }
    }

    /// Inherit every action of `parent`, reached through `project`.
    pub fn extends<P: Any + Send>(
        mut self,
        parent: &ControllerDescriptor,
        project: fn(&mut C) -> &mut P,
    ) -> Self {
        for method in parent.methods() {
            let parent_handler = method.handler().clone();
            let handler: Handler = Arc::new(
                move |controller: &mut (dyn Any + Send), arguments: Arguments| {
                    let controller = downcast::<C>(controller)?;
                    let parent: &mut (dyn Any + Send) = project(controller);
                    parent_handler(parent, arguments)
                },
            );
            self.inherited.push(method.with_handler(handler));
        }
        self
    }

    /// Register an action handled by `handler`.
    pub fn action<R, H>(mut self, action: Action, handler: H) -> Self
    where
        R: Any + Send,
        H: Fn(&mut C, Arguments) -> Result<R, ActionError> + Send + Sync + 'static,
    {
        let handler: Handler = Arc::new(
            move |controller: &mut (dyn Any + Send), arguments: Arguments| {
                let controller = downcast::<C>(controller)?;
                handler(controller, arguments).map(|out| Box::new(out) as Instance)
            },
        );
        self.own
            .push(action.into_descriptor(&self.class_name, type_name::<R>(), handler));
        self
    }

    pub fn build(self) -> ControllerDescriptor {
        let own = self.own;
        let inherited = self
            .inherited
            .into_iter()
            .filter(|parent| !own.iter().any(|m| m.method_name() == parent.method_name()));

        let methods = own
            .iter()
            .cloned()
            .chain(inherited)
            .map(Arc::new)
            .collect();

        ControllerDescriptor {
            class_name: self.class_name,
            factory: self.factory,
            methods,
        }
    }
}

fn downcast<C: Any>(controller: &mut (dyn Any + Send)) -> Result<&mut C, ActionError> {
    controller
        .downcast_mut::<C>()
        .ok_or(ActionError::ControllerType {
            expected: type_name::<C>(),
        })
}

/// A controller class: its factory and its action table.
#[derive(Clone)]
pub struct ControllerDescriptor {
    class_name: String,
    factory: Factory,
    methods: Vec<Arc<ActionDescriptor>>,
}

impl fmt::Debug for ControllerDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ControllerDescriptor")
            .field("class_name", &self.class_name)
            .field("methods", &self.methods)
            .finish_non_exhaustive()
    }
}

impl ControllerDescriptor {
    pub fn class_name(&self) -> &str {
        &self.class_name
    }

    pub fn factory(&self) -> &Factory {
        &self.factory
    }

    /// Actions in scan order.
    pub fn methods(&self) -> &[Arc<ActionDescriptor>] {
        &self.methods
    }

    /// Whether `action` is declared on this class rather than inherited.
    pub fn declares(&self, action: &ActionDescriptor) -> bool {
        action.declared_in() == self.class_name
    }
}

/// All registered controllers, keyed by class name.
#[derive(Debug, Clone, Default)]
pub struct ControllerRegistry {
    controllers: HashMap<String, Arc<ControllerDescriptor>>,
}

impl ControllerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a controller, replacing any previous one of the same class.
    pub fn register(&mut self, descriptor: ControllerDescriptor) -> &mut Self {
        let class_name = descriptor.class_name.clone();
        if self
            .controllers
            .insert(class_name.clone(), Arc::new(descriptor))
            .is_some()
        {
            tracing::warn!(controller = %class_name, "Controller registered twice, keeping the latest");
        }
        self
    }

    pub fn get(&self, class_name: &str) -> Option<&Arc<ControllerDescriptor>> {
        self.controllers.get(class_name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<ControllerDescriptor>> {
        self.controllers.values()
    }

    pub fn len(&self) -> usize {
        self.controllers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.controllers.is_empty()
    }
}
