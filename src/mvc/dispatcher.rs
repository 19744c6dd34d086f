//! Dispatch orchestrator.
//!
//! # Data Flow
//! ```text
//! DispatchRequest
//!     → ROUTING           router: path + query → parameters
//!     → LOCATING          controller spec, request scope, controller instance
//!     → RESOLVING_ACTION  score the controller's actions
//!     → BINDING           one argument per formal parameter
//!     → INVOKING          call the action (status set to 200 first)
//!     → NORMALIZING       output → response
//!     → DONE
//! Any step can fail; the error is returned to the host unchanged.
//! ```
//!
//! # Design Decisions
//! - All shared state (routes, controllers, binders, base container) is
//!   frozen before the first request and read without locks
//! - Per-request state lives on the stack of `handle` and in a container
//!   scope no other request can see
//! - Synchronous: no stage awaits
//! - Failures are logged here, once per request; metric labels only ever
//!   carry registered controller names

use std::sync::Arc;
use std::time::Instant;

use axum::http::StatusCode;
use axum::response::Response;

use crate::binding::{bind_arguments, BindContext, BinderRegistry};
use crate::container::{ContainerBuilder, ContainerError};
use crate::controller::{ActionResolver, ControllerRegistry, ControllerSpec};
use crate::http::response::normalize;
use crate::http::DispatchRequest;
use crate::mvc::DispatchError;
use crate::observability::metrics;
use crate::routing::Router;

/// Handles requests against frozen routing, controller and binder tables.
#[derive(Debug)]
pub struct Dispatcher {
    namespace: String,
    router: Arc<Router>,
    controllers: Arc<ControllerRegistry>,
    binders: Arc<BinderRegistry>,
    resolver: ActionResolver,
    container: ContainerBuilder,
}

impl Dispatcher {
    pub fn new(
        namespace: impl Into<String>,
        router: Router,
        controllers: ControllerRegistry,
        binders: BinderRegistry,
        resolver: ActionResolver,
        container: ContainerBuilder,
    ) -> Self {
        Self {
            namespace: namespace.into(),
            router: Arc::new(router),
            controllers: Arc::new(controllers),
            binders: Arc::new(binders),
            resolver,
            container,
        }
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn router(&self) -> &Router {
        &self.router
    }

    pub fn controllers(&self) -> &ControllerRegistry {
        &self.controllers
    }

    /// Dispatch one request. `response` is the response to fill in.
    pub fn handle(
        &self,
        request: &DispatchRequest,
        response: Response,
    ) -> Result<Response, DispatchError> {
        let started = Instant::now();
        let span = tracing::debug_span!(
            "dispatch",
            method = %request.method(),
            path = request.path(),
            request_id = request.request_id().unwrap_or("-"),
        );
        let _entered = span.enter();

        let mut controller: Option<&str> = None;
        let result = self.run(request, response, &mut controller);

        let label = controller.unwrap_or("unknown");
        match &result {
            Ok(response) => {
                tracing::debug!(controller = label, status = %response.status(), "Dispatch complete");
                metrics::record_dispatch(label, "ok", started);
            }
            Err(e) => {
                if e.status().is_server_error() {
                    tracing::error!(controller = label, stage = %e.stage(), error = %e, "Dispatch failed");
                } else {
                    tracing::warn!(controller = label, stage = %e.stage(), error = %e, "Dispatch rejected");
                }
                metrics::record_dispatch(label, e.outcome(), started);
            }
        }
        result
    }

    /// `controller` receives the class name once it is known to be registered.
    fn run<'a>(
        &'a self,
        request: &DispatchRequest,
        mut response: Response,
        controller: &mut Option<&'a str>,
    ) -> Result<Response, DispatchError> {
        let parameters = self.router.route(request.path(), request.query_string())?;
        tracing::debug!(parameters = ?parameters, "Route matched");

        let spec = ControllerSpec::locate(&self.namespace, parameters);
        let class = spec.controller_class();

        let mut scope = self.container.scope(request);
        ContainerBuilder::bind_spec(&mut scope, &spec);
        let mut instance = scope
            .get_named(class)
            .map_err(|source| DispatchError::Controller {
                class: class.to_string(),
                source,
            })?;
        let descriptor = self
            .controllers
            .get(class)
            .ok_or_else(|| DispatchError::Controller {
                class: class.to_string(),
                source: ContainerError::Unresolvable {
                    service: class.to_string(),
                },
            })?;
        *controller = Some(descriptor.class_name());
        tracing::debug!(controller = class, action = spec.action(), "Controller located");

        let action = self
            .resolver
            .resolve(descriptor, &spec, request)
            .ok_or_else(|| DispatchError::ActionNotFound {
                controller: class.to_string(),
                action: spec.action().to_string(),
                path: request.path().to_string(),
            })?;
        tracing::debug!(method = action.method_name(), "Action resolved");

        let context = BindContext {
            spec: &spec,
            request,
            container: &scope,
        };
        let arguments = bind_arguments(action.parameters(), &context, &self.binders)?;

        *response.status_mut() = StatusCode::OK;
        let output = action
            .invoke(&mut *instance, arguments)
            .map_err(|source| DispatchError::Action {
                action: action.method_name().to_string(),
                source,
            })?;

        normalize(output, action.output_type(), response)
    }
}
