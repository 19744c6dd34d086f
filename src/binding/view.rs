//! View binder.
//!
//! Prepares a `View` argument for the routed action: the controller's own
//! view folder is searched first and the template is named after the
//! controller and action.

use std::path::PathBuf;

use crate::binding::registry::{BindContext, BindError, BindTarget, ModelBinder};
use crate::container::Instance;
use crate::view::View;

#[derive(Debug, Clone)]
pub struct ViewBinder {
    views_dir: PathBuf,
    extension: String,
}

impl ViewBinder {
    /// `views_dir` is the directory holding one folder per controller.
    pub fn new(views_dir: impl Into<PathBuf>, extension: impl Into<String>) -> Self {
        Self {
            views_dir: views_dir.into(),
            extension: extension.into(),
        }
    }
}

impl ModelBinder for ViewBinder {
    fn bind(
        &self,
        target: BindTarget<'_>,
        parameter: &str,
        context: &BindContext<'_>,
    ) -> Result<Instance, BindError> {
        let mut view = target
            .instance
            .downcast::<View>()
            .map_err(|_| BindError::NotBindable {
                type_name: target.ty.name(),
            })?;

        let controller = context.spec.controller_name();
        let action = context.spec.action();
        view.prepend_path(self.views_dir.join(controller));
        view.set_template(format!("{controller}_{action}.{}", self.extension));

        tracing::trace!(
            parameter,
            template = view.template().unwrap_or_default(),
            "View bound"
        );
        Ok(view as Instance)
    }
}
