//! Built-in request filters.

use std::sync::LazyLock;
use std::time::Duration;

use async_trait::async_trait;
use regex::Regex;
use tracing::{debug, warn};

use super::{RequestFilter, SubmittedForm};
use crate::request::RequestInfo;

/// Akismet API host; the API key is its subdomain.
pub const AKISMET_HOST: &str = "rest.akismet.com";

#[allow(clippy::expect_used)]
static LINK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bhttps?://").expect("valid regex literal"));

/// Flags submissions that fill in a field real visitors never see.
#[derive(Debug, Clone)]
pub struct HoneypotFilter {
    field: String,
}

impl HoneypotFilter {
    pub fn new(field: &str) -> Self {
        Self {
            field: field.to_string(),
        }
    }
}

#[async_trait]
impl RequestFilter for HoneypotFilter {
    fn name(&self) -> &str {
        "honeypot"
    }

    async fn is_spam(&self, _request: &RequestInfo, form: &SubmittedForm, _url: &str) -> bool {
        form.get(&self.field)
            .is_some_and(|value| !value.trim().is_empty())
    }
}

/// Flags submissions carrying more than `max_links` links.
#[derive(Debug, Clone)]
pub struct LinkLimitFilter {
    max_links: usize,
}

impl LinkLimitFilter {
    pub fn new(max_links: usize) -> Self {
        Self { max_links }
    }

    /// Count `http://` and `https://` links across all submitted values.
    pub fn count_links(form: &SubmittedForm) -> usize {
        form.values().map(|v| LINK_RE.find_iter(v).count()).sum()
    }
}

#[async_trait]
impl RequestFilter for LinkLimitFilter {
    fn name(&self) -> &str {
        "link_limit"
    }

    async fn is_spam(&self, _request: &RequestInfo, form: &SubmittedForm, _url: &str) -> bool {
        Self::count_links(form) > self.max_links
    }
}

/// Checks submissions against the Akismet comment-check API.
///
/// Without an API key nothing is flagged. Transport failures are logged and
/// treated as clean.
#[derive(Debug, Clone)]
pub struct AkismetFilter {
    api_key: Option<String>,
    blog: String,
    /// Overrides `https://{key}.rest.akismet.com`.
    base_url: Option<String>,
    client: reqwest::Client,
}

impl AkismetFilter {
    pub fn new(api_key: Option<String>, blog: &str, base_url: Option<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(5))
            .build()
            .unwrap_or_default();

        Self {
            api_key,
            blog: blog.to_string(),
            base_url,
            client,
        }
    }

    /// Comment-check URL for `api_key`.
    pub fn endpoint(&self, api_key: &str) -> String {
        let base = match &self.base_url {
            Some(base) => base.trim_end_matches('/').to_string(),
            None => format!("https://{api_key}.{AKISMET_HOST}"),
        };
        format!("{base}/1.1/comment-check")
    }

    /// Build the comment-check parameters for a submission.
    ///
    /// `name`/`author`, `email` and `url`/`website` fields describe the
    /// author; every other non-blank field is joined into the comment body.
    pub fn comment_params(
        &self,
        request: &RequestInfo,
        form: &SubmittedForm,
        url: &str,
    ) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("blog", self.blog.clone()),
            ("user_ip", request.ip.clone()),
            ("user_agent", request.user_agent.clone()),
            ("referrer", request.referrer.clone()),
            ("permalink", url.to_string()),
            ("comment_type", "comment".to_string()),
        ];

        let mut content = Vec::new();
        for (name, value) in form.fields() {
            match name {
                "name" | "author" => params.push(("comment_author", value.to_string())),
                "email" => params.push(("comment_author_email", value.to_string())),
                "url" | "website" => params.push(("comment_author_url", value.to_string())),
                _ if !value.trim().is_empty() => content.push(value),
                _ => {}
            }
        }
        params.push(("comment_content", content.join("\n")));
        params
    }
}

#[async_trait]
impl RequestFilter for AkismetFilter {
    fn name(&self) -> &str {
        "akismet"
    }

    async fn is_spam(&self, request: &RequestInfo, form: &SubmittedForm, url: &str) -> bool {
        let Some(api_key) = &self.api_key else {
            debug!("no Akismet API key configured, skipping check");
            return false;
        };

        let endpoint = self.endpoint(api_key);
        let params = self.comment_params(request, form, url);

        let response = match self.client.post(&endpoint).form(&params).send().await {
            Ok(response) => response,
            Err(e) => {
                warn!(error = %e, "Akismet request failed, treating submission as clean");
                return false;
            }
        };

        match response.text().await {
            Ok(body) => {
                let flagged = body.trim() == "true";
                if !flagged && body.trim() != "false" {
                    warn!(body = %body.trim(), "unexpected Akismet response, treating submission as clean");
                }
                flagged
            }
            Err(e) => {
                warn!(error = %e, "failed to read Akismet response");
                false
            }
        }
    }
}
