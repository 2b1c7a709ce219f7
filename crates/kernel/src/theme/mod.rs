//! Theme engine and template responses.
//!
//! Provides Tera-based template rendering with first-match template
//! resolution and the [`render`] shim views use to build responses.

mod engine;
mod response;

pub use engine::{SharedThemeEngine, ThemeEngine};
pub use response::{TemplateResponse, render, request_context};
