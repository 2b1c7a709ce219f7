//! Spam filtering for form submissions.
//!
//! Request filters are configured by dotted path (`REQUEST_FILTERS`), resolved
//! once at startup through a [`FilterRegistry`], and run in order against
//! each submission by [`is_spam`].

mod filters;
mod registry;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::info;

pub use filters::{AkismetFilter, HoneypotFilter, LinkLimitFilter};
pub use registry::{BUILTIN_MODULE, FilterConfigError, FilterFactory, FilterRegistry};

use crate::request::RequestInfo;

/// Submitted form fields in the order they were sent.
///
/// Repeated names are all kept; [`SubmittedForm::get`] returns the last one.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SubmittedForm(Vec<(String, String)>);

impl SubmittedForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.0.push((name.into(), value.into()));
        self
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .rev()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn fields(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn values(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|(_, v)| v.as_str())
    }
}

impl FromIterator<(String, String)> for SubmittedForm {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// A pluggable check that flags likely spam.
#[async_trait]
pub trait RequestFilter: Send + Sync + std::fmt::Debug {
    /// Name used in logs.
    fn name(&self) -> &str;

    /// Return true if the submission of `form`, posted for the page at
    /// `url`, looks like spam.
    async fn is_spam(&self, request: &RequestInfo, form: &SubmittedForm, url: &str) -> bool;
}

/// Run `filters` in order; true as soon as one flags the submission.
pub async fn is_spam(
    filters: &[Box<dyn RequestFilter>],
    request: &RequestInfo,
    form: &SubmittedForm,
    url: &str,
) -> bool {
    for filter in filters {
        if filter.is_spam(request, form, url).await {
            info!(filter = filter.name(), ip = %request.ip, url, "submission flagged as spam");
            return true;
        }
    }
    false
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Debug)]
    struct Fixed {
        verdict: bool,
        calls: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl RequestFilter for Fixed {
        fn name(&self) -> &str {
            "fixed"
        }

        async fn is_spam(&self, _: &RequestInfo, _: &SubmittedForm, _: &str) -> bool {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.verdict
        }
    }

    fn fixed(verdict: bool, calls: &Arc<AtomicUsize>) -> Box<dyn RequestFilter> {
        Box::new(Fixed {
            verdict,
            calls: Arc::clone(calls),
        })
    }

    #[tokio::test]
    async fn no_filters_means_not_spam() {
        let form = SubmittedForm::new().with_field("body", "hello");
        assert!(!is_spam(&[], &RequestInfo::default(), &form, "/").await);
    }

    #[tokio::test]
    async fn stops_at_first_positive_filter() {
        let calls = Arc::new(AtomicUsize::new(0));
        let filters = vec![fixed(false, &calls), fixed(true, &calls), fixed(true, &calls)];
        let form = SubmittedForm::new();

        assert!(is_spam(&filters, &RequestInfo::default(), &form, "/").await);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn runs_every_filter_when_clean() {
        let calls = Arc::new(AtomicUsize::new(0));
        let filters = vec![fixed(false, &calls), fixed(false, &calls)];
        let form = SubmittedForm::new();

        assert!(!is_spam(&filters, &RequestInfo::default(), &form, "/").await);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn form_keeps_submission_order() {
        let form: SubmittedForm = [("b", "2"), ("a", "1")]
            .into_iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        assert_eq!(form.get("a"), Some("1"));
        assert_eq!(form.values().collect::<Vec<_>>(), vec!["2", "1"]);
    }

    #[test]
    fn repeated_fields_are_kept() {
        let form = SubmittedForm::new()
            .with_field("tag", "first")
            .with_field("body", "hi")
            .with_field("tag", "second");
        assert_eq!(form.get("tag"), Some("second"));
        assert_eq!(form.fields().count(), 3);
        assert_eq!(form.values().collect::<Vec<_>>(), vec!["first", "hi", "second"]);
    }
}
