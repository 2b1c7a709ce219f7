//! Cookie helpers taking expiry as a number of seconds.

use axum::http::header::{COOKIE, SET_COOKIE};
use axum::http::{HeaderMap, HeaderValue};
use chrono::{DateTime, TimeDelta, Utc};
use cookie::Cookie;
use thiserror::Error;

/// Expiry used when none is given: one year.
pub const DEFAULT_EXPIRY_SECONDS: i64 = 365 * 24 * 60 * 60;

/// `expires` attribute format.
const EXPIRES_FORMAT: &str = "%a, %d-%b-%Y %H:%M:%S GMT";

/// Cookie errors.
#[derive(Debug, Error)]
pub enum CookieError {
    #[error("invalid cookie name: {0:?}")]
    InvalidName(String),

    #[error("cookie expiry out of range: {0} seconds")]
    ExpiryOutOfRange(i64),

    #[error("invalid cookie header value")]
    InvalidHeader(#[from] axum::http::header::InvalidHeaderValue),
}

/// Append a `Set-Cookie` header.
///
/// The value is percent-encoded as UTF-8. `expiry_seconds` defaults to
/// [`DEFAULT_EXPIRY_SECONDS`]; a negative expiry expires the cookie.
pub fn set_cookie(
    headers: &mut HeaderMap,
    name: &str,
    value: &str,
    expiry_seconds: Option<i64>,
    secure: bool,
) -> Result<(), CookieError> {
    let header = set_cookie_header(name, value, expiry_seconds, secure, Utc::now())?;
    headers.append(SET_COOKIE, HeaderValue::from_str(&header)?);
    Ok(())
}

/// Build a `Set-Cookie` header value relative to `now`.
///
/// Names the encoder would have to escape are rejected.
pub fn set_cookie_header(
    name: &str,
    value: &str,
    expiry_seconds: Option<i64>,
    secure: bool,
    now: DateTime<Utc>,
) -> Result<String, CookieError> {
    let cookie = Cookie::build((name, value)).path("/").secure(secure).build();
    let encoded = cookie.encoded().to_string();
    if name.is_empty() || !encoded.starts_with(&format!("{name}=")) {
        return Err(CookieError::InvalidName(name.to_string()));
    }

    let seconds = expiry_seconds.unwrap_or(DEFAULT_EXPIRY_SECONDS);
    let expires = TimeDelta::try_seconds(seconds)
        .and_then(|delta| now.checked_add_signed(delta))
        .ok_or(CookieError::ExpiryOutOfRange(seconds))?;

    // The cookie crate writes RFC 1123 dates; this format uses dashes.
    Ok(format!("{encoded}; expires={}", expires.format(EXPIRES_FORMAT)))
}

/// Read a cookie from a request's `Cookie` headers, percent-decoded.
pub fn cookie_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| Cookie::split_parse_encoded(v))
        .filter_map(Result::ok)
        .find(|cookie| cookie.name() == name)
        .map(|cookie| cookie.value().to_string())
}
