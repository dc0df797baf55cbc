/// User directory
///
/// - `GET /users` - every user (admin only)
/// - `GET /users/:user_id` - one user
/// - `GET /me` - the caller
/// - `PUT /me/edit` - partial profile update (204)

use crate::{
    app::AppState,
    error::{validate_request, ApiResult},
    middleware::session::CurrentUser,
    routes::envelope,
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use timetracker_shared::usecase::user::ProfileUpdate;
use tracing::info;
use validator::Validate;

/// Fields left out keep their stored value; the role cannot be changed here
#[derive(Debug, Default, Deserialize, Validate)]
pub struct EditMeRequest {
    #[validate(length(min = 1, max = 255, message = "Name must be 1-255 characters"))]
    pub name: Option<String>,

    #[validate(email(message = "Invalid email format"))]
    pub email: Option<String>,

    #[validate(length(max = 2000, message = "About must be at most 2000 characters"))]
    pub about: Option<String>,

    #[validate(length(min = 6, max = 128, message = "Password must be 6-128 characters"))]
    pub password: Option<String>,
}

pub async fn list_users(State(state): State<AppState>) -> ApiResult<impl IntoResponse> {
    let users = state.usecases.users.get_all_users().await?;
    Ok(envelope(users))
}

pub async fn get_user(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
) -> ApiResult<impl IntoResponse> {
    let user = state.usecases.users.get_user(user_id).await?;
    Ok(envelope(user))
}

pub async fn me(State(state): State<AppState>, user: CurrentUser) -> ApiResult<impl IntoResponse> {
    let user = state.usecases.users.get_user(user.principal.id).await?;
    Ok(envelope(user))
}

pub async fn edit_me(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(req): Json<EditMeRequest>,
) -> ApiResult<StatusCode> {
    validate_request(&req)?;

    state
        .usecases
        .users
        .update_user(
            user.principal.id,
            ProfileUpdate {
                name: req.name,
                email: req.email,
                about: req.about,
                password: req.password,
            },
        )
        .await?;

    info!(user_id = user.principal.id, "Profile edited");
    Ok(StatusCode::NO_CONTENT)
}
