//! Per-request container scopes.
//!
//! The application container is built once at startup. Each request gets a
//! child of it with the request itself bound on top; that scope is owned by
//! the request's pipeline and dropped with it. Application singletons are
//! built against the application container and cannot capture a request.

use std::sync::Arc;

use crate::container::ServiceContainer;
use crate::controller::ControllerSpec;
use crate::http::DispatchRequest;

/// Produces request scopes from the application container.
#[derive(Debug, Clone)]
pub struct ContainerBuilder {
    base: Arc<ServiceContainer>,
}

impl ContainerBuilder {
    pub fn new(base: ServiceContainer) -> Self {
        Self {
            base: Arc::new(base),
        }
    }

    /// The application-wide container.
    pub fn base(&self) -> &ServiceContainer {
        &self.base
    }

    /// A fresh scope with `request` bound as `Arc<DispatchRequest>`.
    pub fn scope(&self, request: &DispatchRequest) -> ServiceContainer {
        let mut scope = ServiceContainer::child(self.base.clone());
        scope.instance(Arc::new(request.clone()));
        scope
    }

    /// Bind the routed controller specification into a scope.
    pub fn bind_spec(scope: &mut ServiceContainer, spec: &ControllerSpec) {
        scope.instance(Arc::new(spec.clone()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Method;

    #[test]
    fn test_scopes_are_isolated() {
        let mut base = ServiceContainer::new();
        base.instance(String::from("shared"));
        let builder = ContainerBuilder::new(base);

        let first = builder.scope(&DispatchRequest::new(Method::GET, "/a".parse().unwrap()));
        let second = builder.scope(&DispatchRequest::new(Method::GET, "/b".parse().unwrap()));

        assert_eq!(first.get::<Arc<DispatchRequest>>().unwrap().path(), "/a");
        assert_eq!(second.get::<Arc<DispatchRequest>>().unwrap().path(), "/b");
        assert_eq!(first.get::<String>().unwrap(), "shared");
        assert!(builder.base().get::<Arc<DispatchRequest>>().is_err());
    }

    #[test]
    fn test_singletons_never_see_a_request() {
        let mut base = ServiceContainer::new();
        base.singleton(|c| Ok(c.get::<Arc<DispatchRequest>>()?.path().to_string()));
        base.bind(|c| Ok(c.get::<Arc<DispatchRequest>>()?.uri().clone()));
        let builder = ContainerBuilder::new(base);

        let first = builder.scope(&DispatchRequest::new(Method::GET, "/a".parse().unwrap()));
        let second = builder.scope(&DispatchRequest::new(Method::GET, "/b".parse().unwrap()));

        assert!(matches!(
            first.get::<String>(),
            Err(crate::container::ContainerError::Unresolvable { .. })
        ));
        assert!(second.get::<String>().is_err());

        // Per-call bindings resolve against the asking scope.
        assert_eq!(first.get::<axum::http::Uri>().unwrap().path(), "/a");
        assert_eq!(second.get::<axum::http::Uri>().unwrap().path(), "/b");
    }

    #[test]
    fn test_spec_binding() {
        let builder = ContainerBuilder::new(ServiceContainer::new());
        let mut scope = builder.scope(&DispatchRequest::new(Method::GET, "/".parse().unwrap()));
        let spec = ControllerSpec::locate("app", crate::routing::defaults([
            ("controller", "home"),
            ("action", "index"),
        ]));
        ContainerBuilder::bind_spec(&mut scope, &spec);
        assert_eq!(scope.get::<Arc<ControllerSpec>>().unwrap().controller_name(), "home");
    }
}
