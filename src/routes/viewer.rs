//! Viewer context extraction from request headers.
//!
//! `x-viewer-role` and `x-viewer-region` carry the role and region resolved
//! by whatever sits in front of this service (auth proxy, CDN geo headers).
//! `x-viewer-device` wins over a `User-Agent` sniff.

use std::convert::Infallible;

use axum::http::HeaderMap;
use axum::http::header::USER_AGENT;
use time::OffsetDateTime;

use crate::services::condition::{DeviceClass, ViewerContext, ViewerContextResolver};

pub const ROLE_HEADER: &str = "x-viewer-role";
pub const DEVICE_HEADER: &str = "x-viewer-device";
pub const REGION_HEADER: &str = "x-viewer-region";

/// Resolves viewer facts from a request's headers.
pub struct HeaderResolver<'a> {
    headers: &'a HeaderMap,
}

impl<'a> HeaderResolver<'a> {
    #[must_use]
    pub fn new(headers: &'a HeaderMap) -> Self {
        Self { headers }
    }

    fn text(&self, name: &str) -> Option<String> {
        self.headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(str::to_owned)
    }
}

impl ViewerContextResolver for HeaderResolver<'_> {
    fn role(&self) -> Option<String> {
        self.text(ROLE_HEADER)
    }

    fn device(&self) -> DeviceClass {
        if let Some(device) = self.text(DEVICE_HEADER).and_then(|d| DeviceClass::from_str(&d.to_ascii_lowercase())) {
            return device;
        }
        self.headers
            .get(USER_AGENT)
            .and_then(|v| v.to_str().ok())
            .map_or(DeviceClass::Desktop, sniff_device)
    }

    fn region(&self) -> Option<String> {
        self.text(REGION_HEADER)
    }
}

/// Coarse device class from a `User-Agent` string.
#[must_use]
pub fn sniff_device(user_agent: &str) -> DeviceClass {
    if user_agent.contains("iPad") || user_agent.contains("Tablet") {
        DeviceClass::Tablet
    } else if user_agent.contains("Mobi") || user_agent.contains("iPhone") || user_agent.contains("Android") {
        DeviceClass::Mobile
    } else {
        DeviceClass::Desktop
    }
}

// =============================================================================
// EXTRACTOR
// =============================================================================

/// Viewer context for the current request. Never rejects: missing headers
/// mean an anonymous desktop viewer.
pub struct Viewer(pub ViewerContext);

impl<S> axum::extract::FromRequestParts<S> for Viewer
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut axum::http::request::Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let resolver = HeaderResolver::new(&parts.headers);
        Ok(Self(ViewerContext::resolve(&resolver, OffsetDateTime::now_utc())))
    }
}

#[cfg(test)]
#[path = "viewer_test.rs"]
mod tests;
