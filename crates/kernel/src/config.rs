//! Configuration loaded from environment variables.

use std::env;
use std::path::PathBuf;

use anyhow::{Context, Result};

/// Filter paths used when `REQUEST_FILTERS` is not set.
pub const DEFAULT_REQUEST_FILTERS: &[&str] = &["portico.spam.Honeypot"];

/// Application configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server port (default: 3000).
    pub port: u16,

    /// Public site URL, sent to Akismet as the `blog` parameter.
    pub site_url: String,

    /// Current site id for site-permission checks (default: 1).
    pub site_id: u32,

    /// Path to the Tera templates directory (default: ./templates).
    pub template_dir: PathBuf,

    /// Redis connection URL. When None, sessions are kept in memory.
    pub redis_url: Option<String>,

    /// Cookie SameSite policy: "strict", "lax", or "none" (default: "lax").
    pub cookie_same_site: String,

    /// Whether cookies are flagged `Secure` (default: false).
    pub cookie_secure: bool,

    /// Dotted paths of the request filters run on form submissions.
    pub request_filters: Vec<String>,

    /// Hidden form field checked by the honeypot filter (default: homepage).
    pub honeypot_field: String,

    /// Link count above which the link-limit filter flags a submission (default: 3).
    pub spam_max_links: usize,

    /// Akismet API key. When None, the Akismet filter never flags anything.
    pub akismet_api_key: Option<String>,

    /// Akismet API base URL (default: `https://{key}.rest.akismet.com`).
    pub akismet_url: Option<String>,

    /// Items shown per listing page (default: 10).
    pub items_per_page: usize,

    /// Maximum number of page links shown by the pager (default: 10).
    pub max_paging_links: usize,

    /// Device template prefix used when no user agent pattern matches.
    pub device_default: Option<String>,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        let port = env::var("PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse()
            .context("PORT must be a valid u16")?;

        let site_url = env::var("SITE_URL").unwrap_or_else(|_| format!("http://localhost:{port}"));

        let site_id = env::var("SITE_ID")
            .unwrap_or_else(|_| "1".to_string())
            .parse()
            .context("SITE_ID must be a valid u32")?;

        let template_dir = env::var("TEMPLATE_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("./templates"));

        let redis_url = env::var("REDIS_URL").ok().filter(|s| !s.is_empty());

        let cookie_same_site = env::var("COOKIE_SAME_SITE")
            .unwrap_or_else(|_| "lax".to_string())
            .to_lowercase();

        let cookie_secure = env::var("COOKIE_SECURE")
            .unwrap_or_else(|_| "false".to_string())
            .parse()
            .context("COOKIE_SECURE must be true or false")?;

        let request_filters = env::var("REQUEST_FILTERS")
            .map(|v| split_list(&v))
            .unwrap_or_else(|_| {
                DEFAULT_REQUEST_FILTERS
                    .iter()
                    .map(|s| (*s).to_string())
                    .collect()
            });

        let honeypot_field = env::var("HONEYPOT_FIELD").unwrap_or_else(|_| "homepage".to_string());

        let spam_max_links = env::var("SPAM_MAX_LINKS")
            .unwrap_or_else(|_| "3".to_string())
            .parse()
            .context("SPAM_MAX_LINKS must be a valid usize")?;

        let akismet_api_key = env::var("AKISMET_API_KEY").ok().filter(|s| !s.is_empty());

        let akismet_url = env::var("AKISMET_URL").ok().filter(|s| !s.is_empty());

        let items_per_page = env::var("ITEMS_PER_PAGE")
            .unwrap_or_else(|_| "10".to_string())
            .parse()
            .context("ITEMS_PER_PAGE must be a valid usize")?;

        let max_paging_links = env::var("MAX_PAGING_LINKS")
            .unwrap_or_else(|_| "10".to_string())
            .parse()
            .context("MAX_PAGING_LINKS must be a valid usize")?;

        let device_default = env::var("DEVICE_DEFAULT").ok().filter(|s| !s.is_empty());

        Ok(Self {
            port,
            site_url,
            site_id,
            template_dir,
            redis_url,
            cookie_same_site,
            cookie_secure,
            request_filters,
            honeypot_field,
            spam_max_links,
            akismet_api_key,
            akismet_url,
            items_per_page,
            max_paging_links,
            device_default,
        })
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 3000,
            site_url: "http://localhost:3000".to_string(),
            site_id: 1,
            template_dir: PathBuf::from("./templates"),
            redis_url: None,
            cookie_same_site: "lax".to_string(),
            cookie_secure: false,
            request_filters: DEFAULT_REQUEST_FILTERS
                .iter()
                .map(|s| (*s).to_string())
                .collect(),
            honeypot_field: "homepage".to_string(),
            spam_max_links: 3,
            akismet_api_key: None,
            akismet_url: None,
            items_per_page: 10,
            max_paging_links: 10,
            device_default: None,
        }
    }
}

/// Split a comma-separated list, dropping blank entries.
fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}
