use crate::handlers::{bearer_token, request_id};
use crate::middleware::TOKEN_COOKIE;
use crate::AppState;
use askama::Template;
use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Redirect, Response},
    Extension, Form, Json,
};
use axum_extra::extract::cookie::{Cookie, SameSite};
use axum_extra::extract::CookieJar;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use service_core::error::AppError;
use service_core::middleware::RequestId;
use validator::Validate;

pub const USER_COOKIE: &str = "user";
pub const NAME_COOKIE: &str = "name";

#[derive(Template)]
#[template(path = "login.html")]
pub struct LoginTemplate {
    pub error: Option<String>,
    pub email: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email(message = "Enter a valid email address"))]
    pub email: String,
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// Session fields handed back to the client and mirrored into cookies.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: String,
    pub name: String,
}

impl LoginResponse {
    /// Read the backend reply. The token may come as `token` or
    /// `access_token`; `user` may be an email string or an object carrying
    /// `email` and `name`. Missing user fields fall back to the login email.
    fn from_backend(body: &Value, login_email: &str) -> Result<Self, AppError> {
        let token = body
            .get("token")
            .or_else(|| body.get("access_token"))
            .and_then(Value::as_str)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| {
                tracing::error!("Login response from backend carried no token");
                AppError::BadGateway("Login response did not include a token".to_string())
            })?;

        let user = &body["user"];
        let email = user
            .as_str()
            .or_else(|| user.get("email").and_then(Value::as_str))
            .unwrap_or(login_email);
        let name = body
            .get("name")
            .and_then(Value::as_str)
            .or_else(|| user.get("name").and_then(Value::as_str))
            .unwrap_or_default();

        Ok(Self {
            token: token.to_string(),
            user: email.to_string(),
            name: name.to_string(),
        })
    }
}

fn session_cookie(name: &'static str, value: String, http_only: bool, secure: bool) -> Cookie<'static> {
    Cookie::build((name, value))
        .path("/")
        .http_only(http_only)
        .secure(secure)
        .same_site(SameSite::Lax)
        .build()
}

fn with_session(jar: CookieJar, session: &LoginResponse, secure: bool) -> CookieJar {
    jar.add(session_cookie(TOKEN_COOKIE, session.token.clone(), true, secure))
        .add(session_cookie(USER_COOKIE, session.user.clone(), false, secure))
        .add(session_cookie(NAME_COOKIE, session.name.clone(), false, secure))
}

fn without_session(jar: CookieJar) -> CookieJar {
    jar.remove(Cookie::build(TOKEN_COOKIE).path("/"))
        .remove(Cookie::build(USER_COOKIE).path("/"))
        .remove(Cookie::build(NAME_COOKIE).path("/"))
}

async fn authenticate(
    state: &AppState,
    payload: &LoginRequest,
    request_id: Option<&str>,
) -> Result<LoginResponse, AppError> {
    payload.validate()?;

    let body: Value = state
        .backend
        .post(
            "/api/auth/login",
            &json!({ "email": payload.email, "password": payload.password }),
            None,
            request_id,
        )
        .await?;

    let session = LoginResponse::from_backend(&body, &payload.email)?;
    tracing::info!(user = %session.user, "User logged in");
    Ok(session)
}

pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    request_id_ext: Option<Extension<RequestId>>,
    Json(payload): Json<LoginRequest>,
) -> Result<(CookieJar, Json<LoginResponse>), AppError> {
    let session = authenticate(&state, &payload, request_id(&request_id_ext)).await?;
    let jar = with_session(jar, &session, state.settings.server.cookie_secure);
    Ok((jar, Json(session)))
}

pub async fn login_page() -> impl IntoResponse {
    LoginTemplate {
        error: None,
        email: String::new(),
    }
}

/// Form login from the server-rendered page.
pub async fn login_form(
    State(state): State<AppState>,
    jar: CookieJar,
    request_id_ext: Option<Extension<RequestId>>,
    Form(payload): Form<LoginRequest>,
) -> Response {
    match authenticate(&state, &payload, request_id(&request_id_ext)).await {
        Ok(session) => {
            let jar = with_session(jar, &session, state.settings.server.cookie_secure);
            (jar, Redirect::to("/pages/dashboard")).into_response()
        }
        Err(e) => {
            tracing::warn!(error = %e, "Login failed");
            let message = match e.status() {
                status if status.is_client_error() => "Invalid email or password",
                _ => "Login is unavailable right now. Please try again.",
            };
            (
                StatusCode::UNPROCESSABLE_ENTITY,
                LoginTemplate {
                    error: Some(message.to_string()),
                    email: payload.email,
                },
            )
                .into_response()
        }
    }
}

/// Revoke with the backend if possible; cookies are cleared regardless.
async fn end_session(state: &AppState, jar: &CookieJar, headers: &HeaderMap, request_id: Option<&str>) {
    let Some(token) = bearer_token(jar, Some(headers)) else {
        return;
    };

    if let Err(e) = state
        .backend
        .post::<_, Value>("/api/auth/logout", &json!({}), Some(&token), request_id)
        .await
    {
        tracing::warn!(error = %e, "Backend logout failed; clearing cookies anyway");
    }
}

pub async fn logout(
    State(state): State<AppState>,
    jar: CookieJar,
    headers: HeaderMap,
    request_id_ext: Option<Extension<RequestId>>,
) -> (CookieJar, Json<Value>) {
    end_session(&state, &jar, &headers, request_id(&request_id_ext)).await;
    (
        without_session(jar),
        Json(json!({ "message": "Logged out successfully" })),
    )
}

pub async fn logout_page(
    State(state): State<AppState>,
    jar: CookieJar,
    headers: HeaderMap,
    request_id_ext: Option<Extension<RequestId>>,
) -> (CookieJar, Redirect) {
    end_session(&state, &jar, &headers, request_id(&request_id_ext)).await;
    (without_session(jar), Redirect::to("/"))
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePasswordRequest {
    pub current_password: String,
    #[validate(length(min = 6, message = "New password must be at least 6 characters long"))]
    pub new_password: String,
    pub confirm_password: Option<String>,
}

pub async fn update_password(
    State(state): State<AppState>,
    jar: CookieJar,
    headers: HeaderMap,
    request_id_ext: Option<Extension<RequestId>>,
    Json(payload): Json<UpdatePasswordRequest>,
) -> Result<Json<Value>, AppError> {
    if payload
        .confirm_password
        .as_ref()
        .is_some_and(|confirm| *confirm != payload.new_password)
    {
        return Err(AppError::BadRequest("New passwords do not match".to_string()));
    }
    payload.validate()?;

    let token = bearer_token(&jar, Some(&headers)).ok_or_else(|| {
        AppError::Unauthorized("Authentication token not found. Please login again.".to_string())
    })?;

    let result = state
        .backend
        .put(
            "/api/auth/update-password",
            &json!({
                "currentPassword": payload.current_password,
                "newPassword": payload.new_password,
            }),
            Some(&token),
            request_id(&request_id_ext),
        )
        .await?;

    tracing::info!("Password updated");
    Ok(Json(result))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn login_reply_with_user_object() {
        let body = json!({
            "token": "eyJhbGciOi",
            "user": { "email": "gil@classicwines.com", "name": "Gilberto" }
        });
        let session = LoginResponse::from_backend(&body, "typed@classicwines.com").unwrap();
        assert_eq!(session.token, "eyJhbGciOi");
        assert_eq!(session.user, "gil@classicwines.com");
        assert_eq!(session.name, "Gilberto");
    }

    #[test]
    fn login_reply_falls_back_to_typed_email() {
        let body = json!({ "access_token": "abc", "name": "Ana" });
        let session = LoginResponse::from_backend(&body, "ana@classicwines.com").unwrap();
        assert_eq!(session.user, "ana@classicwines.com");
        assert_eq!(session.name, "Ana");
    }

    #[test]
    fn login_reply_without_token_is_upstream_failure() {
        let err = LoginResponse::from_backend(&json!({ "user": "x" }), "x").unwrap_err();
        assert_eq!(err.status(), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn short_new_password_fails_validation() {
        let request = UpdatePasswordRequest {
            current_password: "old-secret".into(),
            new_password: "12345".into(),
            confirm_password: None,
        };
        assert!(request.validate().is_err());
    }
}
