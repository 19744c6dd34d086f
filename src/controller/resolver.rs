//! Action resolution.
//!
//! # Responsibilities
//! - Pick the action of a controller that serves the routed action name
//! - Prefer the most specific match among several same-named actions
//!
//! # Scoring
//! ```text
//! name mismatch                → skipped
//! declared on resolved class   → +1
//! each passing match filter    → +1
//! any failing match filter     → disqualified
//! ```
//! The highest score wins. Ties go to the candidate scanned last (`>=`),
//! so with own-first scan order an equally scored inherited action beats
//! an own one. Tests pin this down.

use axum::http::Method;
use std::sync::Arc;

use crate::controller::action::ActionDescriptor;
use crate::controller::registry::ControllerDescriptor;
use crate::controller::spec::ControllerSpec;
use crate::http::DispatchRequest;

#[derive(Debug, Clone, Copy, Default)]
pub struct ActionResolver {
    implicit_get_guard: bool,
}

impl ActionResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Treat actions without an HTTP-method guard as GET-only.
    pub fn with_implicit_get_guard(mut self, enabled: bool) -> Self {
        self.implicit_get_guard = enabled;
        self
    }

    pub fn resolve<'a>(
        &self,
        controller: &'a ControllerDescriptor,
        spec: &ControllerSpec,
        request: &DispatchRequest,
    ) -> Option<&'a Arc<ActionDescriptor>> {
        let mut best: Option<(u32, &'a Arc<ActionDescriptor>)> = None;

        for candidate in controller.methods() {
            if candidate.action_name() != spec.action() {
                continue;
            }
            let Some(score) = self.score(controller, candidate, request) else {
                tracing::trace!(
                    controller = controller.class_name(),
                    method = candidate.method_name(),
                    "Action candidate disqualified by filter"
                );
                continue;
            };

            tracing::trace!(
                controller = controller.class_name(),
                method = candidate.method_name(),
                score,
                "Action candidate qualifies"
            );
            if best.map_or(true, |(top, _)| score >= top) {
                best = Some((score, candidate));
            }
        }

        best.map(|(_, action)| action)
    }

    fn score(
        &self,
        controller: &ControllerDescriptor,
        candidate: &ActionDescriptor,
        request: &DispatchRequest,
    ) -> Option<u32> {
        if self.implicit_get_guard
            && candidate.http_method().is_none()
            && request.method() != Method::GET
        {
            return None;
        }

        let mut score = u32::from(controller.declares(candidate));
        for filter in candidate.filters() {
            if !filter.evaluate(request) {
                return None;
            }
            score += 1;
        }
        Some(score)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::binding::Arguments;
    use crate::controller::{Action, ControllerBuilder, MatchFilter};
    use crate::routing::defaults;
    use axum::http::header::{HeaderName, HeaderValue};

    #[derive(Default)]
    struct Posts;

    fn request(method: Method) -> DispatchRequest {
        DispatchRequest::new(method, "/posts/show".parse().unwrap())
    }

    fn spec(action: &str) -> ControllerSpec {
        ControllerSpec::locate("app", defaults([("controller", "posts"), ("action", action)]))
    }

    fn label(text: &'static str) -> impl Fn(&mut Posts, Arguments) -> Result<&'static str, crate::controller::ActionError> {
        move |_, _| Ok(text)
    }

    fn posts() -> ControllerDescriptor {
        ControllerBuilder::new("app\\controllers\\PostsController", |_| Ok(Posts))
            .action(Action::new("show"), label("show"))
            .action(Action::new("show_post").at("show").method(Method::POST), label("show_post"))
            .action(Action::new("index"), label("index"))
            .build()
    }

    fn resolved(descriptor: &ControllerDescriptor, action: &str, request: &DispatchRequest) -> Option<String> {
        ActionResolver::new()
            .resolve(descriptor, &spec(action), request)
            .map(|a| a.method_name().to_string())
    }

    #[test]
    fn test_post_prefers_method_guarded_action() {
        let posts = posts();
        assert_eq!(resolved(&posts, "show", &request(Method::POST)).as_deref(), Some("show_post"));
        assert_eq!(resolved(&posts, "show", &request(Method::GET)).as_deref(), Some("show"));
    }

    #[test]
    fn test_unknown_action_is_none() {
        assert!(resolved(&posts(), "destroy", &request(Method::GET)).is_none());
    }

    #[test]
    fn test_declared_path_replaces_method_name() {
        // `show_post` is only reachable as `show`.
        assert!(resolved(&posts(), "show_post", &request(Method::POST)).is_none());
    }

    #[test]
    fn test_tie_goes_to_later_candidate() {
        let descriptor = ControllerBuilder::new("app\\controllers\\PostsController", |_| Ok(Posts))
            .action(Action::new("first").at("list"), label("first"))
            .action(Action::new("second").at("list"), label("second"))
            .build();
        assert_eq!(resolved(&descriptor, "list", &request(Method::GET)).as_deref(), Some("second"));
    }

    #[test]
    fn test_header_filters_rank_candidates() {
        let xhr = HeaderName::from_static("x-requested-with");
        let descriptor = ControllerBuilder::new("app\\controllers\\PostsController", |_| Ok(Posts))
            .action(
                Action::new("partial")
                    .at("list")
                    .filter(MatchFilter::HeaderPresent(xhr.clone())),
                label("partial"),
            )
            .action(Action::new("list"), label("list"))
            .build();

        let ajax = request(Method::GET).with_header(xhr, HeaderValue::from_static("XMLHttpRequest"));
        assert_eq!(resolved(&descriptor, "list", &ajax).as_deref(), Some("partial"));
        assert_eq!(resolved(&descriptor, "list", &request(Method::GET)).as_deref(), Some("list"));
    }

    #[test]
    fn test_implicit_get_guard() {
        let posts = posts();
        let strict = ActionResolver::new().with_implicit_get_guard(true);
        assert!(strict.resolve(&posts, &spec("index"), &request(Method::POST)).is_none());
        assert!(strict.resolve(&posts, &spec("index"), &request(Method::GET)).is_some());
        assert!(ActionResolver::new()
            .resolve(&posts, &spec("index"), &request(Method::POST))
            .is_some());
    }
}
