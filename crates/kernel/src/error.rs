//! Application error types.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

use crate::cookie::CookieError;
use crate::pager::PageError;

/// Application errors.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("not found")]
    NotFound,

    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("none of the templates exist: {}", .0.join(", "))]
    TemplateNotFound(Vec<String>),

    #[error("template error")]
    Template(#[from] tera::Error),

    #[error("cookie error")]
    Cookie(#[from] CookieError),
}

impl From<PageError> for AppError {
    fn from(e: PageError) -> Self {
        AppError::BadRequest(e.to_string())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::NotFound => StatusCode::NOT_FOUND,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::TemplateNotFound(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Template(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Cookie(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        // Internal details go to the log, never to the client
        let body = match &self {
            AppError::TemplateNotFound(names) => {
                tracing::error!(templates = ?names, "no template found");
                "internal server error".to_string()
            }
            AppError::Template(e) => {
                tracing::error!(error = %e, "template rendering failed");
                "internal server error".to_string()
            }
            AppError::Cookie(e) => {
                tracing::error!(error = %e, "failed to set cookie");
                "internal server error".to_string()
            }
            _ => self.to_string(),
        };

        (status, body).into_response()
    }
}

/// Result type alias using AppError.
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn page_errors_become_bad_requests() {
        let err: AppError = PageError::ZeroPerPage.into();
        assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn missing_template_is_a_server_error() {
        let err = AppError::TemplateNotFound(vec!["items/list.html".to_string()]);
        assert_eq!(err.to_string(), "none of the templates exist: items/list.html");
        assert_eq!(
            err.into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
