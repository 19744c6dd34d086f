//! Views and the template contract.
//!
//! # Data Flow
//! ```text
//! container → View (engine + shared search paths)
//!     → ViewBinder (prepends controller folder, sets {controller}_{action} template)
//!     → action fills data, returns the View
//!     → output normalization calls render() → response body
//! ```

pub mod templates;

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use serde::Serialize;
use serde_json::{Map, Value};
use thiserror::Error;

pub use templates::FileTemplates;

/// Errors raised while rendering a view.
#[derive(Debug, Error)]
pub enum TemplateError {
    #[error("template '{template}' not found in [{}]", searched.join(", "))]
    NotFound {
        template: String,
        searched: Vec<String>,
    },

    #[error("view has no template assigned")]
    NoTemplate,

    #[error("view data could not be serialized: {0}")]
    Data(#[from] serde_json::Error),

    #[error("template IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Renders a template found on a search path.
pub trait TemplateEngine: Send + Sync {
    fn render(
        &self,
        template: &str,
        search_paths: &[PathBuf],
        data: &Map<String, Value>,
    ) -> Result<String, TemplateError>;
}

/// A renderable action result.
#[derive(Clone)]
pub struct View {
    engine: Arc<dyn TemplateEngine>,
    template: Option<String>,
    search_paths: Vec<PathBuf>,
    data: Map<String, Value>,
}

impl fmt::Debug for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("View")
            .field("template", &self.template)
            .field("search_paths", &self.search_paths)
            .field("data", &self.data)
            .finish_non_exhaustive()
    }
}

impl View {
    pub fn new(engine: Arc<dyn TemplateEngine>) -> Self {
        Self {
            engine,
            template: None,
            search_paths: Vec::new(),
            data: Map::new(),
        }
    }

    pub fn with_search_paths(mut self, paths: impl IntoIterator<Item = PathBuf>) -> Self {
        self.search_paths.extend(paths);
        self
    }

    pub fn template(&self) -> Option<&str> {
        self.template.as_deref()
    }

    pub fn set_template(&mut self, template: impl Into<String>) {
        self.template = Some(template.into());
    }

    pub fn search_paths(&self) -> &[PathBuf] {
        &self.search_paths
    }

    /// Search `path` before every path already configured.
    pub fn prepend_path(&mut self, path: impl Into<PathBuf>) {
        self.search_paths.insert(0, path.into());
    }

    /// Set a template variable.
    pub fn set<T: Serialize>(&mut self, key: impl Into<String>, value: T) -> Result<(), TemplateError> {
        self.data.insert(key.into(), serde_json::to_value(value)?);
        Ok(())
    }

    pub fn data(&self) -> &Map<String, Value> {
        &self.data
    }

    pub fn render(&self) -> Result<String, TemplateError> {
        let template = self.template.as_deref().ok_or(TemplateError::NoTemplate)?;
        self.engine.render(template, &self.search_paths, &self.data)
    }
}
