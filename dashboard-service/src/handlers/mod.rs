pub mod app;
pub mod auth;
pub mod catalog;
pub mod documents;
pub mod orders;
pub mod pages;
pub mod upload;

use crate::middleware::TOKEN_COOKIE;
use axum::http::{header, HeaderMap};
use axum::Extension;
use axum_extra::extract::CookieJar;
use service_core::middleware::RequestId;

pub(crate) fn request_id(ext: &Option<Extension<RequestId>>) -> Option<&str> {
    ext.as_ref().map(|Extension(id)| id.0.as_str())
}

/// Caller's token: an `Authorization: Bearer` header wins over the `token` cookie.
pub(crate) fn bearer_token(jar: &CookieJar, headers: Option<&HeaderMap>) -> Option<String> {
    let from_header = headers
        .and_then(|h| h.get(header::AUTHORIZATION))
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string);

    from_header.or_else(|| {
        jar.get(TOKEN_COOKIE)
            .map(|c| c.value().to_string())
            .filter(|t| !t.is_empty())
    })
}
