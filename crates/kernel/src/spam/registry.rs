//! Resolves configured filter paths to request filters.
//!
//! A path is `module.Attr`: everything before the last dot names a module,
//! the rest names a filter within it. Modules are registered up front; the
//! built-in filters live in [`BUILTIN_MODULE`].

use std::collections::HashMap;

use thiserror::Error;
use tracing::debug;

use super::RequestFilter;
use super::filters::{AkismetFilter, HoneypotFilter, LinkLimitFilter};
use crate::config::Config;

/// Module holding the built-in filters.
pub const BUILTIN_MODULE: &str = "portico.spam";

/// Constructs a filter from the application configuration.
pub type FilterFactory = fn(&Config) -> Box<dyn RequestFilter>;

/// Request filter configuration errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FilterConfigError {
    #[error("error importing content filters, is REQUEST_FILTERS a correctly defined list? ({0:?})")]
    InvalidPath(String),

    #[error("error importing content filter {path}: no module named \"{module}\"")]
    UnknownModule { path: String, module: String },

    #[error("module \"{module}\" does not define a \"{attr}\" content filter")]
    MissingFilter { module: String, attr: String },
}

/// Registry of filter modules.
#[derive(Debug, Clone, Default)]
pub struct FilterRegistry {
    modules: HashMap<String, HashMap<String, FilterFactory>>,
}

impl FilterRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry holding the built-in filters.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register(BUILTIN_MODULE, "Honeypot", |config| {
            Box::new(HoneypotFilter::new(&config.honeypot_field))
        });
        registry.register(BUILTIN_MODULE, "LinkLimit", |config| {
            Box::new(LinkLimitFilter::new(config.spam_max_links))
        });
        registry.register(BUILTIN_MODULE, "Akismet", |config| {
            Box::new(AkismetFilter::new(
                config.akismet_api_key.clone(),
                &config.site_url,
                config.akismet_url.clone(),
            ))
        });
        registry
    }

    /// Register a filter under `module.attr`.
    pub fn register(&mut self, module: &str, attr: &str, factory: FilterFactory) {
        self.modules
            .entry(module.to_string())
            .or_default()
            .insert(attr.to_string(), factory);
    }

    /// Load the filter named by a dotted path.
    pub fn load_request_filter(
        &self,
        path: &str,
        config: &Config,
    ) -> Result<Box<dyn RequestFilter>, FilterConfigError> {
        let (module, attr) = path
            .rsplit_once('.')
            .filter(|(module, attr)| !module.is_empty() && !attr.is_empty())
            .ok_or_else(|| FilterConfigError::InvalidPath(path.to_string()))?;

        let filters = self
            .modules
            .get(module)
            .ok_or_else(|| FilterConfigError::UnknownModule {
                path: path.to_string(),
                module: module.to_string(),
            })?;

        let factory = filters
            .get(attr)
            .ok_or_else(|| FilterConfigError::MissingFilter {
                module: module.to_string(),
                attr: attr.to_string(),
            })?;

        debug!(path, "loaded request filter");
        Ok(factory(config))
    }

    /// Load every filter in `config.request_filters`, in order.
    pub fn get_request_filters(
        &self,
        config: &Config,
    ) -> Result<Vec<Box<dyn RequestFilter>>, FilterConfigError> {
        config
            .request_filters
            .iter()
            .map(|path| self.load_request_filter(path, config))
            .collect()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::request::RequestInfo;
    use crate::spam::SubmittedForm;
    use async_trait::async_trait;

    #[derive(Debug)]
    struct AlwaysSpam;

    #[async_trait]
    impl RequestFilter for AlwaysSpam {
        fn name(&self) -> &str {
            "always"
        }

        async fn is_spam(&self, _: &RequestInfo, _: &SubmittedForm, _: &str) -> bool {
            true
        }
    }

    fn config_with(paths: &[&str]) -> Config {
        Config {
            request_filters: paths.iter().map(|s| (*s).to_string()).collect(),
            ..Config::default()
        }
    }

    #[test]
    fn loads_builtin_filters_in_order() {
        let registry = FilterRegistry::with_builtins();
        let config = config_with(&["portico.spam.LinkLimit", "portico.spam.Honeypot"]);
        let filters = registry.get_request_filters(&config).unwrap();
        let names: Vec<_> = filters.iter().map(|f| f.name().to_string()).collect();
        assert_eq!(names, vec!["link_limit", "honeypot"]);
    }

    #[test]
    fn path_without_module_is_invalid() {
        let registry = FilterRegistry::with_builtins();
        for path in ["Honeypot", ".Honeypot", "portico.spam.", ""] {
            assert_eq!(
                registry
                    .load_request_filter(path, &Config::default())
                    .unwrap_err(),
                FilterConfigError::InvalidPath(path.to_string())
            );
        }
    }

    #[test]
    fn unknown_module_is_reported() {
        let registry = FilterRegistry::with_builtins();
        let err = registry
            .load_request_filter("acme.filters.Captcha", &Config::default())
            .unwrap_err();
        assert_eq!(
            err,
            FilterConfigError::UnknownModule {
                path: "acme.filters.Captcha".to_string(),
                module: "acme.filters".to_string(),
            }
        );
        assert!(err.to_string().contains("acme.filters.Captcha"));
    }

    #[test]
    fn missing_filter_is_reported() {
        let registry = FilterRegistry::with_builtins();
        let err = registry
            .load_request_filter("portico.spam.Captcha", &Config::default())
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "module \"portico.spam\" does not define a \"Captcha\" content filter"
        );
    }

    #[test]
    fn one_bad_path_fails_the_whole_list() {
        let registry = FilterRegistry::with_builtins();
        let config = config_with(&["portico.spam.Honeypot", "nope"]);
        assert!(registry.get_request_filters(&config).is_err());
    }

    #[test]
    fn custom_modules_can_be_registered() {
        let mut registry = FilterRegistry::new();
        registry.register("acme.filters", "AlwaysSpam", |_| Box::new(AlwaysSpam));
        assert!(matches!(
            registry.load_request_filter("portico.spam.Honeypot", &Config::default()),
            Err(FilterConfigError::UnknownModule { .. })
        ));

        let filter = registry
            .load_request_filter("acme.filters.AlwaysSpam", &Config::default())
            .unwrap();
        assert_eq!(filter.name(), "always");
    }

    #[test]
    fn empty_list_loads_nothing() {
        let registry = FilterRegistry::with_builtins();
        assert!(registry
            .get_request_filters(&config_with(&[]))
            .unwrap()
            .is_empty());
    }
}
