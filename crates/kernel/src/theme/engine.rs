//! Theme engine with Tera templates and first-match template resolution.

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use dashmap::DashMap;
use tera::Tera;
use tracing::debug;

/// Theme engine for rendering templates.
pub struct ThemeEngine {
    /// Tera template engine instance.
    tera: Tera,
    /// Cache mapping candidate lists to resolved template names.
    resolve_cache: DashMap<String, String>,
    /// Device prefix used when a request matches no device.
    device_default: Option<String>,
}

impl ThemeEngine {
    /// Create a new theme engine loading templates from the given directory.
    pub fn new(template_dir: &Path, device_default: Option<String>) -> Result<Self> {
        let pattern = template_dir.join("**/*.html");
        let pattern_str = pattern
            .to_str()
            .context("invalid template directory path")?;

        let mut tera = Tera::new(pattern_str).context("failed to initialize Tera templates")?;
        Self::register_filters(&mut tera);

        let template_names: Vec<_> = tera.get_template_names().collect();
        debug!(count = template_names.len(), "loaded templates");

        Ok(Self {
            tera,
            resolve_cache: DashMap::new(),
            device_default,
        })
    }

    /// Create a theme engine from in-memory templates.
    pub fn from_templates(templates: &[(&str, &str)]) -> Result<Self> {
        let mut tera = Tera::default();
        Self::register_filters(&mut tera);
        tera.add_raw_templates(templates.iter().copied())
            .context("failed to add templates")?;
        Ok(Self {
            tera,
            resolve_cache: DashMap::new(),
            device_default: None,
        })
    }

    /// Create a theme engine with no templates (for testing).
    pub fn empty() -> Self {
        Self {
            tera: Tera::default(),
            resolve_cache: DashMap::new(),
            device_default: None,
        }
    }

    pub fn device_default(&self) -> Option<&str> {
        self.device_default.as_deref()
    }

    /// Register custom Tera filters.
    fn register_filters(tera: &mut Tera) {
        // Filter for formatting Unix timestamps as human-readable dates
        tera.register_filter(
            "format_date",
            |value: &tera::Value, _args: &std::collections::HashMap<String, tera::Value>| {
                let timestamp = match value {
                    tera::Value::Number(n) => n.as_i64().unwrap_or(0),
                    _ => return Ok(tera::Value::String(String::new())),
                };

                let formatted = chrono::DateTime::from_timestamp(timestamp, 0)
                    .map(|dt| dt.format("%B %-d, %Y").to_string())
                    .unwrap_or_else(|| "Unknown date".to_string());

                Ok(tera::Value::String(formatted))
            },
        );
    }

    /// Get the underlying Tera instance for custom operations.
    pub fn tera(&self) -> &Tera {
        &self.tera
    }

    /// Resolve the first existing template from a list of candidates.
    ///
    /// Positive results are cached; misses are not, so templates added
    /// later are still found.
    pub fn resolve_template<S: AsRef<str>>(&self, candidates: &[S]) -> Option<String> {
        if candidates.is_empty() {
            return None;
        }

        let cache_key = candidates
            .iter()
            .map(AsRef::as_ref)
            .collect::<Vec<_>>()
            .join("|");

        if let Some(cached) = self.resolve_cache.get(&cache_key) {
            return Some(cached.clone());
        }

        let found = candidates
            .iter()
            .map(AsRef::as_ref)
            .find(|name| self.tera.get_template(name).is_ok())?
            .to_string();

        self.resolve_cache.insert(cache_key, found.clone());
        Some(found)
    }

    /// Render a template by name.
    pub fn render(&self, template: &str, context: &tera::Context) -> tera::Result<String> {
        self.tera.render(template, context)
    }
}

impl std::fmt::Debug for ThemeEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ThemeEngine")
            .field("template_count", &self.tera.get_template_names().count())
            .field("cache_size", &self.resolve_cache.len())
            .field("device_default", &self.device_default)
            .finish()
    }
}

/// Wrap ThemeEngine in Arc for sharing across handlers.
pub type SharedThemeEngine = Arc<ThemeEngine>;

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn empty_engine_resolves_nothing() {
        let engine = ThemeEngine::empty();
        assert!(engine.resolve_template(&["missing.html"]).is_none());
        let none: [&str; 0] = [];
        assert!(engine.resolve_template(&none).is_none());
    }

    #[test]
    fn resolves_first_existing_candidate() {
        let engine = ThemeEngine::from_templates(&[
            ("items/list.html", "desktop"),
            ("mobile/items/list.html", "mobile"),
        ])
        .unwrap();

        assert_eq!(
            engine
                .resolve_template(&["mobile/items/list.html", "items/list.html"])
                .as_deref(),
            Some("mobile/items/list.html")
        );
        assert_eq!(
            engine
                .resolve_template(&["tablet/items/list.html", "items/list.html"])
                .as_deref(),
            Some("items/list.html")
        );
    }

    #[test]
    fn format_date_filter() {
        let engine =
            ThemeEngine::from_templates(&[("d.html", "{{ ts | format_date }}")]).unwrap();
        let mut context = tera::Context::new();
        context.insert("ts", &0);
        assert_eq!(engine.render("d.html", &context).unwrap(), "January 1, 1970");
    }
}
