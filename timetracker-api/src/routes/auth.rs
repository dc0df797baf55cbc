/// Session lifecycle endpoints
///
/// - `POST /signup` - register and open a session (201)
/// - `POST /signin` - open a session (200)
/// - `GET /auth` - resolve the session cookie to its user
/// - `POST /logout` - close the session (204)
///
/// Sign-up and sign-in answer with `Set-Cookie: session_token=...`.

use crate::{
    app::AppState,
    error::{validate_request, ApiError, ApiResult},
    middleware::session::{
        expired_session_cookie, resolve_session, session_cookie, session_token, CurrentUser,
    },
    routes::envelope,
};
use axum::{
    extract::State,
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use timetracker_shared::models::{
    session::Session,
    user::{Role, User},
};
use timetracker_shared::usecase::auth::SignUp;
use validator::Validate;

#[derive(Debug, Deserialize, Validate)]
pub struct SignUpRequest {
    #[validate(length(min = 1, max = 255, message = "Name must be 1-255 characters"))]
    pub name: String,

    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[serde(default)]
    #[validate(length(max = 2000, message = "About must be at most 2000 characters"))]
    pub about: String,

    /// Defaults to `auth.default_role`
    pub role: Option<Role>,

    #[validate(length(min = 6, max = 128, message = "Password must be 6-128 characters"))]
    pub password: String,

    /// Required when `role` is `admin`
    pub admin_token: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct SignInRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

fn with_session(
    state: &AppState,
    status: StatusCode,
    user: User,
    session: Session,
) -> ApiResult<Response> {
    let cookie = session_cookie(&session.token, session.max_age, state.config.api.production)?;
    Ok((status, [(header::SET_COOKIE, cookie)], envelope(user)).into_response())
}

/// Register a new user
///
/// # Errors
///
/// - `400 Bad Request`: admin role requested with a wrong `admin_token`
/// - `409 Conflict`: email already registered
/// - `422 Unprocessable Entity`: validation failed
pub async fn sign_up(
    State(state): State<AppState>,
    Json(req): Json<SignUpRequest>,
) -> ApiResult<Response> {
    validate_request(&req)?;

    let (user, session) = state
        .usecases
        .auth
        .sign_up(SignUp {
            name: req.name,
            email: req.email,
            about: req.about,
            role: req.role.unwrap_or(state.config.auth.default_role),
            password: req.password,
            admin_token: req.admin_token,
        })
        .await?;

    with_session(&state, StatusCode::CREATED, user, session)
}

/// Sign in with email and password
///
/// # Errors
///
/// - `401 Unauthorized`: wrong password
/// - `404 Not Found`: no user with this email
pub async fn sign_in(
    State(state): State<AppState>,
    Json(req): Json<SignInRequest>,
) -> ApiResult<Response> {
    validate_request(&req)?;

    let (user, session) = state.usecases.auth.sign_in(&req.email, &req.password).await?;

    with_session(&state, StatusCode::OK, user, session)
}

/// Current user for the session cookie, 401 without one
pub async fn auth(State(state): State<AppState>, headers: HeaderMap) -> ApiResult<impl IntoResponse> {
    let token = session_token(&headers)
        .ok_or_else(|| ApiError::Unauthorized("Missing session cookie".to_string()))?;

    let user = resolve_session(&state, &token).await?;
    Ok(envelope(user))
}

pub async fn logout(State(state): State<AppState>, user: CurrentUser) -> ApiResult<Response> {
    state.usecases.auth.logout(&user.token).await?;

    let cookie = expired_session_cookie(state.config.api.production)?;
    Ok((StatusCode::NO_CONTENT, [(header::SET_COOKIE, cookie)]).into_response())
}
