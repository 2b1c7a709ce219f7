//! HTTP route handlers.

pub mod health;
pub mod item;

use axum::Router;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Build the application router. Callers add the session layer.
pub fn router(state: AppState) -> Router {
    Router::new()
        .merge(health::router())
        .merge(item::router())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
