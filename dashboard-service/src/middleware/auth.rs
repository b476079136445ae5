use crate::config::AuthSettings;
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::CookieJar;
use std::sync::Arc;

pub const TOKEN_COOKIE: &str = "token";

pub fn is_protected(settings: &AuthSettings, path: &str) -> bool {
    settings
        .protected_prefixes
        .iter()
        .any(|prefix| path.starts_with(prefix.as_str()))
}

/// Redirect to the login page when a protected path is requested without a
/// `token` cookie. Only presence is checked; the backend validates the token.
pub async fn require_token(
    State(settings): State<Arc<AuthSettings>>,
    jar: CookieJar,
    request: Request,
    next: Next,
) -> Response {
    let path = request.uri().path();

    if is_protected(&settings, path) {
        let has_token = jar
            .get(TOKEN_COOKIE)
            .is_some_and(|cookie| !cookie.value().is_empty());

        if !has_token {
            tracing::debug!(path = %path, "No token cookie, redirecting to login");
            return Redirect::to(&settings.login_path).into_response();
        }
    }

    next.run(request).await
}
