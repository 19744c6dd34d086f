//! Application wiring.
//!
//! `MvcApp::builder(config)` gathers controllers, binders, services and
//! code-defined routes; `build()` freezes them into a `Dispatcher`. Nothing
//! is initialized as a side effect elsewhere and there is no global state.

use std::any::{Any, TypeId};
use std::path::PathBuf;
use std::sync::Arc;

use axum::response::Response;

use crate::binding::{BinderRegistry, ModelBinder, ViewBinder};
use crate::config::{MvcConfig, RouteConfig};
use crate::container::{ContainerBuilder, ServiceContainer, ServiceKey};
use crate::controller::{ActionResolver, ControllerDescriptor, ControllerRegistry};
use crate::http::DispatchRequest;
use crate::mvc::{DispatchError, Dispatcher};
use crate::routing::{Parameters, RouteError, Router};
use crate::view::{FileTemplates, TemplateEngine, View};

/// The application home directory, bound into the container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HomeDir(pub PathBuf);

/// A built application.
#[derive(Debug, Clone)]
pub struct MvcApp {
    config: Arc<MvcConfig>,
    dispatcher: Arc<Dispatcher>,
}

impl MvcApp {
    pub fn builder(config: MvcConfig) -> MvcAppBuilder {
        MvcAppBuilder::new(config)
    }

    pub fn config(&self) -> &MvcConfig {
        &self.config
    }

    pub fn dispatcher(&self) -> &Arc<Dispatcher> {
        &self.dispatcher
    }

    pub fn handle(
        &self,
        request: &DispatchRequest,
        response: Response,
    ) -> Result<Response, DispatchError> {
        self.dispatcher.handle(request, response)
    }
}

pub struct MvcAppBuilder {
    config: MvcConfig,
    appended: Vec<RouteConfig>,
    prepended: Vec<RouteConfig>,
    controllers: ControllerRegistry,
    binders: BinderRegistry,
    container: ServiceContainer,
    templates: Option<Arc<dyn TemplateEngine>>,
}

impl MvcAppBuilder {
    fn new(config: MvcConfig) -> Self {
        Self {
            config,
            appended: Vec::new(),
            prepended: Vec::new(),
            controllers: ControllerRegistry::new(),
            binders: BinderRegistry::default(),
            container: ServiceContainer::new(),
            templates: None,
        }
    }

    /// Append a route after the configured ones.
    pub fn route(mut self, name: &str, pattern: &str, defaults: Parameters) -> Self {
        self.appended.push(RouteConfig::new(name, pattern, defaults));
        self
    }

    /// Prepend a route before every other route. Later prepends go first.
    pub fn prepend_route(mut self, name: &str, pattern: &str, defaults: Parameters) -> Self {
        self.prepended.push(RouteConfig::new(name, pattern, defaults));
        self
    }

    pub fn controller(mut self, descriptor: ControllerDescriptor) -> Self {
        self.controllers.register(descriptor);
        self
    }

    /// Bind parameters of type `T` with `binder`.
    pub fn binder<T: Any>(mut self, binder: impl ModelBinder + 'static) -> Self {
        self.binders.register::<T>(Arc::new(binder));
        self
    }

    pub fn default_binder(mut self, binder: impl ModelBinder + 'static) -> Self {
        self.binders.set_default(Arc::new(binder));
        self
    }

    /// Configure application services.
    pub fn services(mut self, configure: impl FnOnce(&mut ServiceContainer)) -> Self {
        configure(&mut self.container);
        self
    }

    /// Replace the bundled file-system template engine.
    pub fn templates(mut self, engine: Arc<dyn TemplateEngine>) -> Self {
        self.templates = Some(engine);
        self
    }

    pub fn build(self) -> Result<MvcApp, RouteError> {
        let config = Arc::new(self.config);

        let mut router = Router::with_default_fill(config.dispatch.default_fill);
        router.set_routes(&config.routes)?;
        for route in &self.appended {
            router.append_route(&route.name, &route.pattern, route.parameters.default.clone())?;
        }
        for route in &self.prepended {
            router.prepend_route(&route.name, &route.pattern, route.parameters.default.clone())?;
        }

        let views_dir = config.home.join(&config.views.directory);
        let mut binders = self.binders;
        if !binders.contains(TypeId::of::<View>()) {
            binders.register::<View>(Arc::new(ViewBinder::new(
                views_dir,
                config.views.extension.clone(),
            )));
        }

        let mut container = self.container;
        let engine = self
            .templates
            .unwrap_or_else(|| Arc::new(FileTemplates::new()) as Arc<dyn TemplateEngine>);
        container
            .instance(engine)
            .instance(config.clone())
            .instance(HomeDir(config.home.clone()));
        if !container.contains(&ServiceKey::of::<View>()) {
            let shared: Vec<PathBuf> = config
                .views
                .shared
                .iter()
                .map(|path| config.home.join(path))
                .collect();
            container.bind(move |c| {
                let engine = c.get::<Arc<dyn TemplateEngine>>()?;
                Ok(View::new(engine).with_search_paths(shared.iter().cloned()))
            });
        }
        for descriptor in self.controllers.iter() {
            container.bind_named(descriptor.class_name(), descriptor.factory().clone());
        }

        tracing::info!(
            namespace = %config.namespace,
            routes = router.len(),
            controllers = self.controllers.len(),
            "MVC application built"
        );

        let resolver =
            ActionResolver::new().with_implicit_get_guard(config.dispatch.implicit_get_guard);
        let dispatcher = Dispatcher::new(
            config.namespace.clone(),
            router,
            self.controllers,
            binders,
            resolver,
            ContainerBuilder::new(container),
        );

        Ok(MvcApp {
            config,
            dispatcher: Arc::new(dispatcher),
        })
    }
}
