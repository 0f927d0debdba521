//! View rendering collaborator
//!
//! A view renderer turns a view name plus data into LaTeX source. Real
//! template engines live outside this crate; [`MemoryViews`] is a minimal
//! implementation with `{{ key }}` placeholders.

use std::collections::HashMap;
use std::sync::OnceLock;

use regex::{Captures, Regex};

use crate::error::{PdfError, Result};

/// Data handed to a view
pub type ViewData = serde_json::Map<String, serde_json::Value>;

/// Renders named views to LaTeX source
pub trait ViewRenderer: Send + Sync {
    /// Check whether `view` resolves
    fn exists(&self, view: &str) -> bool;

    /// Render `view` with `data`
    fn render(&self, view: &str, data: &ViewData) -> Result<String>;
}

/// In-memory views with `{{ key }}` substitution
#[derive(Debug, Clone, Default)]
pub struct MemoryViews {
    views: HashMap<String, String>,
}

impl MemoryViews {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a view
    pub fn with_view(mut self, name: impl Into<String>, template: impl Into<String>) -> Self {
        self.views.insert(name.into(), template.into());
        self
    }
}

fn placeholder_regex() -> &'static Regex {
    static PLACEHOLDER_RE: OnceLock<Regex> = OnceLock::new();
    PLACEHOLDER_RE.get_or_init(|| Regex::new(r"\{\{\s*([A-Za-z0-9_.-]+)\s*\}\}").unwrap())
}

impl ViewRenderer for MemoryViews {
    fn exists(&self, view: &str) -> bool {
        self.views.contains_key(view)
    }

    fn render(&self, view: &str, data: &ViewData) -> Result<String> {
        let template = self
            .views
            .get(view)
            .ok_or_else(|| PdfError::ViewNotFound(view.to_string()))?;

        let rendered = placeholder_regex().replace_all(template, |caps: &Captures| {
            match data.get(&caps[1]) {
                Some(serde_json::Value::String(s)) => s.clone(),
                Some(serde_json::Value::Null) | None => String::new(),
                Some(other) => other.to_string(),
            }
        });
        Ok(rendered.into_owned())
    }
}
