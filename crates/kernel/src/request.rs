//! Request details shared by spam filters and template rendering.

use std::convert::Infallible;
use std::net::SocketAddr;

use axum::extract::{ConnectInfo, FromRequestParts};
use axum::http::HeaderMap;
use axum::http::header::{REFERER, USER_AGENT};
use axum::http::request::Parts;
use serde::Serialize;

use crate::state::AppState;

/// User agent substrings identifying each device, checked in order.
pub const DEVICE_USER_AGENTS: &[(&str, &[&str])] = &[(
    "mobile",
    &[
        "2.0 MMP",
        "240x320",
        "AvantGo",
        "BlackBerry",
        "Blazer",
        "Cellphone",
        "Danger",
        "DoCoMo",
        "EudoraWeb",
        "Googlebot-Mobile",
        "hiptop",
        "IEMobile",
        "MIDP-2.",
        "NetFront",
        "Nokia",
        "Opera Mini",
        "Palm",
        "PlayStation Portable",
        "SonyEricsson",
        "Symbian",
        "UP.Browser",
        "webOS",
        "Windows CE",
        "iPhone",
        "iPod",
        "Android",
    ],
)];

/// The site a request is served for.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SiteInfo {
    pub id: u32,
    /// Absolute base URL.
    pub url: String,
}

/// What the application keeps from an incoming request.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RequestInfo {
    pub method: String,
    pub path: String,
    /// Client address, see [`ip_for_request`].
    pub ip: String,
    pub user_agent: String,
    pub referrer: String,
    /// Device matched from the user agent, if any.
    pub device: Option<String>,
    pub site: SiteInfo,
}

impl RequestInfo {
    /// Build from request parts.
    pub fn from_parts(parts: &Parts, site: SiteInfo) -> Self {
        let addr = parts
            .extensions
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| *addr);
        let user_agent = header_str(&parts.headers, USER_AGENT.as_str());

        Self {
            method: parts.method.to_string(),
            path: parts.uri.path().to_string(),
            ip: ip_for_request(&parts.headers, addr),
            device: device_from_user_agent(&user_agent, None),
            user_agent,
            referrer: header_str(&parts.headers, REFERER.as_str()),
            site,
        }
    }
}

impl FromRequestParts<AppState> for RequestInfo {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let config = state.config();
        let site = SiteInfo {
            id: config.site_id,
            url: config.site_url.clone(),
        };
        Ok(Self::from_parts(parts, site))
    }
}

/// Client IP for a request.
///
/// Uses the first address in `X-Forwarded-For` when present, otherwise the
/// connection address.
pub fn ip_for_request(headers: &HeaderMap, addr: Option<SocketAddr>) -> String {
    if let Some(forwarded) = headers.get("x-forwarded-for")
        && let Ok(value) = forwarded.to_str()
        && let Some(ip) = value.split(',').next()
        && !ip.trim().is_empty()
    {
        return ip.trim().to_string();
    }

    addr.map(|a| a.ip().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

/// Device name for a user agent, or `default` when nothing matches.
pub fn device_from_user_agent(user_agent: &str, default: Option<&str>) -> Option<String> {
    DEVICE_USER_AGENTS
        .iter()
        .find(|(_, patterns)| patterns.iter().any(|p| user_agent.contains(p)))
        .map(|(device, _)| (*device).to_string())
        .or_else(|| default.map(str::to_string))
}

fn header_str(headers: &HeaderMap, name: &str) -> String {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string()
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use axum::http::{HeaderValue, Request};

    #[test]
    fn forwarded_for_takes_first_hop() {
        let mut headers = HeaderMap::new();
        headers.insert(
            "x-forwarded-for",
            HeaderValue::from_static("203.0.113.7, 10.0.0.1"),
        );
        let addr: SocketAddr = "127.0.0.1:4000".parse().unwrap();
        assert_eq!(ip_for_request(&headers, Some(addr)), "203.0.113.7");
    }

    #[test]
    fn falls_back_to_connection_address() {
        let addr: SocketAddr = "192.0.2.1:4000".parse().unwrap();
        assert_eq!(ip_for_request(&HeaderMap::new(), Some(addr)), "192.0.2.1");
        assert_eq!(ip_for_request(&HeaderMap::new(), None), "unknown");
    }

    #[test]
    fn detects_mobile_devices() {
        let ua = "Mozilla/5.0 (iPhone; CPU iPhone OS 17_0 like Mac OS X)";
        assert_eq!(device_from_user_agent(ua, None).as_deref(), Some("mobile"));
    }

    #[test]
    fn unmatched_agents_use_default_device() {
        let ua = "Mozilla/5.0 (X11; Linux x86_64) Firefox/130.0";
        assert_eq!(device_from_user_agent(ua, None), None);
        assert_eq!(
            device_from_user_agent(ua, Some("desktop")).as_deref(),
            Some("desktop")
        );
    }

    #[test]
    fn request_info_from_parts() {
        let request = Request::builder()
            .method("POST")
            .uri("/items/1/comments?x=1")
            .header("user-agent", "Android 14")
            .header("referer", "http://localhost/items")
            .header("x-forwarded-for", "198.51.100.2")
            .body(())
            .unwrap();
        let (parts, ()) = request.into_parts();
        let site = SiteInfo {
            id: 2,
            url: "http://example.com".to_string(),
        };
        let info = RequestInfo::from_parts(&parts, site.clone());

        assert_eq!(info.method, "POST");
        assert_eq!(info.path, "/items/1/comments");
        assert_eq!(info.ip, "198.51.100.2");
        assert_eq!(info.referrer, "http://localhost/items");
        assert_eq!(info.device.as_deref(), Some("mobile"));
        assert_eq!(info.site, site);
    }
}
