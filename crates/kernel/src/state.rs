//! Application state shared across all handlers.

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::info;

use crate::config::Config;
use crate::models::{Item, ItemStore, UserStore};
use crate::permissions::SitePermissions;
use crate::spam::{FilterRegistry, RequestFilter};
use crate::theme::ThemeEngine;

/// Application state shared across all request handlers.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: Config,

    /// Tera templates.
    theme: Arc<ThemeEngine>,

    /// Request filters run on every form submission, in configured order.
    request_filters: Vec<Box<dyn RequestFilter>>,

    users: UserStore,

    /// Site ids each staff user may administer.
    site_permissions: SitePermissions,

    items: ItemStore,
}

impl AppState {
    /// Create application state, loading templates and request filters.
    pub fn new(config: &Config, items: Vec<Item>) -> Result<Self> {
        let theme = ThemeEngine::new(&config.template_dir, config.device_default.clone())
            .context("failed to load templates")?;
        Self::with_theme(config, theme, &FilterRegistry::with_builtins(), items)
    }

    /// Create application state with an already-built theme and filter registry.
    pub fn with_theme(
        config: &Config,
        theme: ThemeEngine,
        registry: &FilterRegistry,
        items: Vec<Item>,
    ) -> Result<Self> {
        let request_filters = registry
            .get_request_filters(config)
            .context("failed to load request filters")?;

        info!(
            filters = ?request_filters.iter().map(|f| f.name()).collect::<Vec<_>>(),
            "request filters loaded"
        );

        Ok(Self {
            inner: Arc::new(AppStateInner {
                config: config.clone(),
                theme: Arc::new(theme),
                request_filters,
                users: UserStore::new(),
                site_permissions: SitePermissions::new(),
                items: ItemStore::new(items),
            }),
        })
    }

    pub fn config(&self) -> &Config {
        &self.inner.config
    }

    pub fn theme(&self) -> &Arc<ThemeEngine> {
        &self.inner.theme
    }

    pub fn request_filters(&self) -> &[Box<dyn RequestFilter>] {
        &self.inner.request_filters
    }

    pub fn users(&self) -> &UserStore {
        &self.inner.users
    }

    pub fn site_permissions(&self) -> &SitePermissions {
        &self.inner.site_permissions
    }

    pub fn items(&self) -> &ItemStore {
        &self.inner.items
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("theme", &self.inner.theme)
            .field("request_filters", &self.inner.request_filters.len())
            .field("items", &self.inner.items.items().len())
            .finish()
    }
}
