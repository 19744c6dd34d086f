//! Service container.
//!
//! # Responsibilities
//! - Resolve instances by type or by name (controllers are resolved by
//!   their qualified class name)
//! - Per-call bindings build a fresh instance on every `get`
//! - Singleton bindings build once and hand out clones
//!
//! # Design Decisions
//! - Bindings are configured before request handling begins
//! - A request scope is a child of the application container (see
//!   `scope.rs`): its own bindings shadow the parent's and stay private to it
//! - Per-call factories run against the container that was asked, singletons
//!   against the container that declared them, so a singleton never sees
//!   request-scoped bindings
//! - Failures are explicit `ContainerError`s, never silent defaults

pub mod scope;

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, OnceLock};

use thiserror::Error;

pub use scope::ContainerBuilder;

/// A type-erased resolved instance.
pub type Instance = Box<dyn Any + Send>;

/// A type-erased factory.
pub type Factory = Arc<dyn Fn(&ServiceContainer) -> Result<Instance, ContainerError> + Send + Sync>;

type SharedFactory =
    Arc<dyn Fn(&ServiceContainer) -> Result<Arc<dyn Any + Send + Sync>, ContainerError> + Send + Sync>;

/// Errors raised while resolving services.
#[derive(Debug, Error)]
pub enum ContainerError {
    /// Nothing is bound under the requested key.
    #[error("no binding for `{service}`")]
    Unresolvable { service: String },

    /// The binding produced an instance of another type.
    #[error("binding for `{service}` did not produce a `{expected}`")]
    TypeMismatch {
        service: String,
        expected: &'static str,
    },

    /// The factory itself failed.
    #[error("failed to build `{service}`: {message}")]
    Factory { service: String, message: String },
}

/// Key a binding is stored under.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ServiceKey {
    Type(TypeId),
    Named(String),
}

impl ServiceKey {
    pub fn of<T: Any>() -> Self {
        ServiceKey::Type(TypeId::of::<T>())
    }
}

#[derive(Clone)]
enum Binding {
    PerCall(Factory),
    Singleton {
        init: SharedFactory,
        cell: Arc<OnceLock<Arc<dyn Any + Send + Sync>>>,
        clone: fn(&(dyn Any + Send + Sync)) -> Option<Instance>,
    },
}

#[derive(Clone)]
struct Entry {
    label: String,
    binding: Binding,
}

fn clone_instance<T: Any + Clone + Send + Sync>(value: &(dyn Any + Send + Sync)) -> Option<Instance> {
    value
        .downcast_ref::<T>()
        .map(|v| Box::new(v.clone()) as Instance)
}

/// Resolves typed and named services.
#[derive(Clone, Default)]
pub struct ServiceContainer {
    entries: HashMap<ServiceKey, Entry>,
    parent: Option<Arc<ServiceContainer>>,
}

impl fmt::Debug for ServiceContainer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut labels: Vec<_> = self.entries.values().map(|e| e.label.as_str()).collect();
        labels.sort_unstable();
        f.debug_struct("ServiceContainer")
            .field("bindings", &labels)
            .field("parent", &self.parent)
            .finish()
    }
}

impl ServiceContainer {
    pub fn new() -> Self {
        Self::default()
    }

    /// An empty container that falls back to `parent`.
    pub fn child(parent: Arc<ServiceContainer>) -> Self {
        Self {
            entries: HashMap::new(),
            parent: Some(parent),
        }
    }

    /// Bind `T` to a factory invoked on every resolution.
    pub fn bind<T, F>(&mut self, factory: F) -> &mut Self
    where
        T: Any + Send,
        F: Fn(&ServiceContainer) -> Result<T, ContainerError> + Send + Sync + 'static,
    {
        let factory: Factory =
            Arc::new(move |c: &ServiceContainer| factory(c).map(|v| Box::new(v) as Instance));
        self.insert(ServiceKey::of::<T>(), std::any::type_name::<T>(), Binding::PerCall(factory))
    }

    /// Bind `T` to a factory invoked once; later resolutions get clones.
    pub fn singleton<T, F>(&mut self, factory: F) -> &mut Self
    where
        T: Any + Clone + Send + Sync,
        F: Fn(&ServiceContainer) -> Result<T, ContainerError> + Send + Sync + 'static,
    {
        let init: SharedFactory = Arc::new(move |c: &ServiceContainer| {
            factory(c).map(|v| Arc::new(v) as Arc<dyn Any + Send + Sync>)
        });
        let binding = Binding::Singleton {
            init,
            cell: Arc::new(OnceLock::new()),
            clone: clone_instance::<T>,
        };
        self.insert(ServiceKey::of::<T>(), std::any::type_name::<T>(), binding)
    }

    /// Bind a ready-made value as a singleton.
    pub fn instance<T>(&mut self, value: T) -> &mut Self
    where
        T: Any + Clone + Send + Sync,
    {
        let cell = OnceLock::new();
        let _ = cell.set(Arc::new(value) as Arc<dyn Any + Send + Sync>);
        let init: SharedFactory = Arc::new(|_: &ServiceContainer| {
            Err(ContainerError::Factory {
                service: std::any::type_name::<T>().to_string(),
                message: "instance binding has no factory".to_string(),
            })
        });
        let binding = Binding::Singleton {
            init,
            cell: Arc::new(cell),
            clone: clone_instance::<T>,
        };
        self.insert(ServiceKey::of::<T>(), std::any::type_name::<T>(), binding)
    }

    /// Bind a type-erased per-call factory under a name.
    pub fn bind_named(&mut self, name: impl Into<String>, factory: Factory) -> &mut Self {
        let name = name.into();
        self.insert(ServiceKey::Named(name.clone()), &name, Binding::PerCall(factory))
    }

    fn insert(&mut self, key: ServiceKey, label: &str, binding: Binding) -> &mut Self {
        let entry = Entry {
            label: label.to_string(),
            binding,
        };
        if self.entries.insert(key, entry).is_some() {
            tracing::trace!(service = label, "Binding replaced");
        }
        self
    }

    pub fn contains(&self, key: &ServiceKey) -> bool {
        self.lookup(key).is_some()
    }

    /// The entry for `key` and the container that declared it.
    fn lookup(&self, key: &ServiceKey) -> Option<(&Entry, &ServiceContainer)> {
        match self.entries.get(key) {
            Some(entry) => Some((entry, self)),
            None => self.parent.as_deref().and_then(|parent| parent.lookup(key)),
        }
    }

    /// Resolve `T`.
    pub fn get<T: Any + Send>(&self) -> Result<T, ContainerError> {
        let name = std::any::type_name::<T>();
        let instance = self.resolve(&ServiceKey::of::<T>(), name)?;
        instance
            .downcast::<T>()
            .map(|boxed| *boxed)
            .map_err(|_| ContainerError::TypeMismatch {
                service: name.to_string(),
                expected: name,
            })
    }

    /// Resolve a named binding.
    pub fn get_named(&self, name: &str) -> Result<Instance, ContainerError> {
        self.resolve(&ServiceKey::Named(name.to_string()), name)
    }

    /// Resolve any key; `label` names the service in errors.
    pub fn resolve(&self, key: &ServiceKey, label: &str) -> Result<Instance, ContainerError> {
        let (entry, owner) = self
            .lookup(key)
            .ok_or_else(|| ContainerError::Unresolvable {
                service: label.to_string(),
            })?;

        match &entry.binding {
            Binding::PerCall(factory) => factory(self),
            Binding::Singleton { init, cell, clone } => {
                let shared = match cell.get() {
                    Some(shared) => shared,
                    None => {
                        let built = init(owner)?;
                        // A concurrent resolution may have won; either value is valid.
                        let _ = cell.set(built);
                        cell.get().ok_or_else(|| ContainerError::Unresolvable {
                            service: entry.label.clone(),
                        })?
                    }
                };
                clone(&**shared).ok_or_else(|| ContainerError::TypeMismatch {
                    service: entry.label.clone(),
                    expected: "singleton type",
                })
            }
        }
    }

    /// Resolve a key, falling back to `construct` when nothing is bound.
    pub fn resolve_or(
        &self,
        key: &ServiceKey,
        label: &str,
        construct: Option<fn() -> Instance>,
    ) -> Result<Instance, ContainerError> {
        match (self.contains(key), construct) {
            (false, Some(construct)) => Ok(construct()),
            _ => self.resolve(key, label),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Debug, Clone, PartialEq)]
    struct Greeting(String);

    #[test]
    fn test_per_call_builds_fresh_instances() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let mut container = ServiceContainer::new();
        container.bind(move |_| {
            let n = counter.fetch_add(1, Ordering::SeqCst);
            Ok(Greeting(format!("hello {n}")))
        });

        assert_eq!(container.get::<Greeting>().unwrap().0, "hello 0");
        assert_eq!(container.get::<Greeting>().unwrap().0, "hello 1");
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_singleton_builds_once() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let mut container = ServiceContainer::new();
        container.singleton(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(Greeting("shared".into()))
        });

        let scope = container.clone();
        assert_eq!(container.get::<Greeting>().unwrap(), Greeting("shared".into()));
        assert_eq!(scope.get::<Greeting>().unwrap(), Greeting("shared".into()));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_factories_can_resolve_dependencies() {
        let mut container = ServiceContainer::new();
        container.instance(String::from("world"));
        container.bind(|c| Ok(Greeting(format!("hello {}", c.get::<String>()?))));
        assert_eq!(container.get::<Greeting>().unwrap().0, "hello world");
    }

    #[test]
    fn test_unbound_type_fails() {
        let container = ServiceContainer::new();
        let err = container.get::<Greeting>().unwrap_err();
        assert!(matches!(err, ContainerError::Unresolvable { ref service } if service.ends_with("Greeting")));
    }

    #[test]
    fn test_named_bindings() {
        let mut container = ServiceContainer::new();
        container.bind_named(
            "app\\controllers\\HomeController",
            Arc::new(|_: &ServiceContainer| Ok(Box::new(Greeting("home".into())) as Instance)),
        );
        let instance = container.get_named("app\\controllers\\HomeController").unwrap();
        assert_eq!(instance.downcast_ref::<Greeting>(), Some(&Greeting("home".into())));
        assert!(container.get_named("app\\controllers\\Missing").is_err());
    }

    #[test]
    fn test_child_shadows_parent() {
        let mut parent = ServiceContainer::new();
        parent.instance(String::from("parent"));
        parent.bind(|c| Ok(Greeting(format!("hello {}", c.get::<String>()?))));
        let parent = Arc::new(parent);

        let mut child = ServiceContainer::child(parent.clone());
        child.instance(String::from("child"));

        assert_eq!(child.get::<String>().unwrap(), "child");
        assert_eq!(child.get::<Greeting>().unwrap().0, "hello child");
        assert_eq!(parent.get::<Greeting>().unwrap().0, "hello parent");
    }

    #[test]
    fn test_singleton_is_built_against_its_declaring_container() {
        let mut parent = ServiceContainer::new();
        parent.instance(String::from("app"));
        parent.singleton(|c| Ok(Greeting(format!("hello {}", c.get::<String>()?))));
        let parent = Arc::new(parent);

        let mut child = ServiceContainer::child(parent.clone());
        child.instance(String::from("request"));
        assert_eq!(child.get::<Greeting>().unwrap().0, "hello app");
    }

    #[test]
    fn test_resolve_or_prefers_binding() {
        let mut container = ServiceContainer::new();
        let key = ServiceKey::of::<Greeting>();
        let fallback: fn() -> Instance = || Box::new(Greeting("fallback".into())) as Instance;

        let built = container.resolve_or(&key, "Greeting", Some(fallback)).unwrap();
        assert_eq!(built.downcast_ref::<Greeting>().unwrap().0, "fallback");

        container.instance(Greeting("bound".into()));
        let built = container.resolve_or(&key, "Greeting", Some(fallback)).unwrap();
        assert_eq!(built.downcast_ref::<Greeting>().unwrap().0, "bound");
    }
}
