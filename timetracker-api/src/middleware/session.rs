/// Cookie-based session authentication
///
/// The session token travels in an HTTP-only cookie named `session_token`.
/// [`require_session`] resolves it to a user and stores a [`CurrentUser`]
/// in the request extensions; handlers take `CurrentUser` as an extractor.

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};
use axum::{
    async_trait,
    extract::{FromRequestParts, Request, State},
    http::{header, request::Parts, HeaderMap, HeaderValue},
    middleware::Next,
    response::Response,
};
use chrono::Duration;
use timetracker_shared::{
    auth::acl::Principal,
    error::ErrorKind,
    models::user::User,
};
use tracing::debug;

pub const SESSION_COOKIE: &str = "session_token";

/// The authenticated user of the current request
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub user: User,
    pub principal: Principal,
    /// Session token the request was authenticated with
    pub token: String,
}

#[async_trait]
impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts.extensions.get::<CurrentUser>().cloned().ok_or_else(|| {
            ApiError::InternalError("authenticated user missing from request context".to_string())
        })
    }
}

/// Reads the session token from the `Cookie` headers
pub fn session_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, value)| *name == SESSION_COOKIE && !value.is_empty())
        .map(|(_, value)| value.to_string())
}

/// `Set-Cookie` value carrying a fresh session token
pub fn session_cookie(token: &str, max_age: Duration, secure: bool) -> ApiResult<HeaderValue> {
    cookie_header(token, max_age.num_seconds(), secure)
}

/// `Set-Cookie` value that makes the client drop its session cookie
pub fn expired_session_cookie(secure: bool) -> ApiResult<HeaderValue> {
    cookie_header("", 0, secure)
}

fn cookie_header(token: &str, max_age_secs: i64, secure: bool) -> ApiResult<HeaderValue> {
    let mut cookie = format!(
        "{}={}; HttpOnly; Path=/; Max-Age={}; SameSite=Lax",
        SESSION_COOKIE, token, max_age_secs
    );
    if secure {
        cookie.push_str("; Secure");
    }

    HeaderValue::from_str(&cookie)
        .map_err(|e| ApiError::InternalError(format!("invalid session cookie: {}", e)))
}

/// Resolves a token, reporting unknown or expired sessions as 401
pub async fn resolve_session(state: &AppState, token: &str) -> ApiResult<User> {
    state.usecases.auth.auth(token).await.map_err(|e| {
        if e.kind() == ErrorKind::NotFound {
            debug!(error = %e.chain(), "Rejected session token");
            ApiError::Unauthorized("Invalid or expired session".to_string())
        } else {
            ApiError::from(e)
        }
    })
}

/// Middleware: requires a valid session cookie
pub async fn require_session(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = session_token(req.headers())
        .ok_or_else(|| ApiError::Unauthorized("Missing session cookie".to_string()))?;

    let user = resolve_session(&state, &token).await?;

    req.extensions_mut().insert(CurrentUser {
        principal: Principal::from(&user),
        user,
        token,
    });

    Ok(next.run(req).await)
}
