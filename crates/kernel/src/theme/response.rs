//! Lazily rendered template responses.
//!
//! Views build a [`TemplateResponse`] with [`render`]; the template is only
//! picked and rendered when the response is turned into HTTP, which is where
//! device-specific templates are preferred over the generic ones.

use axum::http::{HeaderMap, StatusCode};
use axum::response::{Html, IntoResponse, Response};

use super::ThemeEngine;
use crate::error::{AppError, AppResult};
use crate::request::RequestInfo;

/// A response whose template has not been rendered yet.
#[derive(Debug, Clone)]
pub struct TemplateResponse {
    templates: Vec<String>,
    context: tera::Context,
    device: Option<String>,
    status: StatusCode,
    headers: HeaderMap,
}

impl TemplateResponse {
    pub fn new(templates: &[&str], context: tera::Context, device: Option<String>) -> Self {
        Self {
            templates: templates.iter().map(|t| (*t).to_string()).collect(),
            context,
            device,
            status: StatusCode::OK,
            headers: HeaderMap::new(),
        }
    }

    /// Set the response status.
    pub fn with_status(mut self, status: StatusCode) -> Self {
        self.status = status;
        self
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn context(&self) -> &tera::Context {
        &self.context
    }

    /// Headers sent with the rendered response (e.g. `Set-Cookie`).
    pub fn headers_mut(&mut self) -> &mut HeaderMap {
        &mut self.headers
    }

    /// Candidate template names, device-specific ones first.
    pub fn resolve_names(&self, device: Option<&str>) -> Vec<String> {
        match device {
            Some(device) => self
                .templates
                .iter()
                .flat_map(|t| [format!("{device}/{t}"), t.clone()])
                .collect(),
            None => self.templates.clone(),
        }
    }

    /// Pick a template and render the response.
    pub fn render(self, engine: &ThemeEngine) -> AppResult<Response> {
        let device = self.device.as_deref().or(engine.device_default());
        let candidates = self.resolve_names(device);
        let template = engine
            .resolve_template(&candidates)
            .ok_or(AppError::TemplateNotFound(candidates))?;

        let html = engine.render(&template, &self.context)?;
        Ok((self.status, self.headers, Html(html)).into_response())
    }
}

/// Build the context every template sees: the request and its site and
/// device, then `dictionary`.
pub fn request_context(request: &RequestInfo, dictionary: tera::Context) -> tera::Context {
    let mut context = tera::Context::new();
    context.insert("request", request);
    context.insert("site_id", &request.site.id);
    context.insert("site_url", &request.site.url);
    context.insert("device", &request.device);
    context.extend(dictionary);
    context
}

/// Build a template response for `request`.
///
/// When `context_instance` is given it is updated with `dictionary`;
/// otherwise a fresh [`request_context`] is built.
pub fn render(
    request: &RequestInfo,
    templates: &[&str],
    dictionary: Option<tera::Context>,
    context_instance: Option<tera::Context>,
) -> TemplateResponse {
    let dictionary = dictionary.unwrap_or_default();
    let context = match context_instance {
        Some(mut context) => {
            context.extend(dictionary);
            context
        }
        None => request_context(request, dictionary),
    };
    TemplateResponse::new(templates, context, request.device.clone())
}
