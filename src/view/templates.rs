//! File-system template engine.
//!
//! Finds the first search path containing the template file and replaces
//! `{{ key }}` markers with view data. Strings are inserted as-is, other
//! values in their JSON form, unknown keys as nothing.

use std::fs;
use std::path::PathBuf;

use serde_json::{Map, Value};

use crate::view::{TemplateEngine, TemplateError};

#[derive(Debug, Clone, Default)]
pub struct FileTemplates;

impl FileTemplates {
    pub fn new() -> Self {
        Self
    }
}

impl TemplateEngine for FileTemplates {
    fn render(
        &self,
        template: &str,
        search_paths: &[PathBuf],
        data: &Map<String, Value>,
    ) -> Result<String, TemplateError> {
        let file = search_paths
            .iter()
            .map(|dir| dir.join(template))
            .find(|candidate| candidate.is_file())
            .ok_or_else(|| TemplateError::NotFound {
                template: template.to_string(),
                searched: search_paths
                    .iter()
                    .map(|p| p.display().to_string())
                    .collect(),
            })?;

        tracing::trace!(file = %file.display(), "Rendering template");
        let source = fs::read_to_string(&file)?;
        Ok(substitute(&source, data))
    }
}

fn substitute(source: &str, data: &Map<String, Value>) -> String {
    let mut out = String::with_capacity(source.len());
    let mut rest = source;

    while let Some(open) = rest.find("{{") {
        out.push_str(&rest[..open]);
        let after = &rest[open + 2..];
        let Some(close) = after.find("}}") else {
            out.push_str(&rest[open..]);
            return out;
        };
        match data.get(after[..close].trim()) {
            Some(Value::String(s)) => out.push_str(s),
            Some(Value::Null) | None => {}
            Some(other) => out.push_str(&other.to_string()),
        }
        rest = &after[close + 2..];
    }
    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn data(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => Map::new(),
        }
    }

    #[test]
    fn test_substitution() {
        let out = substitute(
            "<h1>{{ title }}</h1><p>{{count}}</p>{{ missing }}",
            &data(json!({"title": "Hello", "count": 3})),
        );
        assert_eq!(out, "<h1>Hello</h1><p>3</p>");
    }

    #[test]
    fn test_unterminated_marker_is_kept() {
        assert_eq!(substitute("a {{ b", &Map::new()), "a {{ b");
    }

    #[test]
    fn test_first_search_path_wins() {
        let first = tempfile::tempdir().unwrap();
        let second = tempfile::tempdir().unwrap();
        fs::write(first.path().join("page.tpl.html"), "first {{ name }}").unwrap();
        fs::write(second.path().join("page.tpl.html"), "second").unwrap();

        let engine = FileTemplates::new();
        let paths = vec![first.path().to_path_buf(), second.path().to_path_buf()];
        let out = engine
            .render("page.tpl.html", &paths, &data(json!({"name": "x"})))
            .unwrap();
        assert_eq!(out, "first x");

        let err = engine.render("other.tpl.html", &paths, &Map::new()).unwrap_err();
        assert!(matches!(err, TemplateError::NotFound { ref searched, .. } if searched.len() == 2));
    }
}
