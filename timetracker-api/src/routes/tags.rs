/// Tag endpoints
///
/// - `POST /tag/create` (201), `POST /tag/edit`
/// - `GET /tag/:id`, `DELETE /tag/:id` (204)
/// - `GET /me/tags`, `GET /user/:user_id/tags` (friends or admin)

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
use timetracker_shared::models::tag::TagInput;
use validator::Validate;

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct TagRequest {
    #[validate(length(min = 1, max = 255, message = "Name must be 1-255 characters"))]
    pub name: String,

    #[serde(default)]
    #[validate(length(max = 2000, message = "About must be at most 2000 characters"))]
    pub about: String,

    #[serde(default)]
    #[validate(length(max = 32, message = "Color must be at most 32 characters"))]
    pub color: String,
}

impl TagRequest {
    fn into_input(self) -> ApiResult<TagInput> {
        validate_request(&self)?;

        Ok(TagInput {
            name: self.name,
            about: self.about,
            color: self.color,
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct EditTagRequest {
    pub id: i64,

    #[serde(flatten)]
    pub tag: TagRequest,
}

pub async fn create_tag(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(req): Json<TagRequest>,
) -> ApiResult<impl IntoResponse> {
    let tag = state
        .usecases
        .tags
        .create_tag(&user.principal, req.into_input()?)
        .await?;
    Ok((StatusCode::CREATED, envelope(tag)))
}

pub async fn edit_tag(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(req): Json<EditTagRequest>,
) -> ApiResult<impl IntoResponse> {
    let tag = state
        .usecases
        .tags
        .update_tag(&user.principal, req.id, req.tag.into_input()?)
        .await?;
    Ok(envelope(tag))
}

pub async fn get_tag(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i64>,
) -> ApiResult<impl IntoResponse> {
    let tag = state.usecases.tags.get_tag(&user.principal, id).await?;
    Ok(envelope(tag))
}

pub async fn delete_tag(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i64>,
) -> ApiResult<StatusCode> {
    state.usecases.tags.delete_tag(&user.principal, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn my_tags(State(state): State<AppState>, user: CurrentUser) -> ApiResult<impl IntoResponse> {
    let tags = state.usecases.tags.get_user_tags(user.principal.id).await?;
    Ok(envelope(tags))
}

pub async fn user_tags(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
) -> ApiResult<impl IntoResponse> {
    let tags = state.usecases.tags.get_user_tags(user_id).await?;
    Ok(envelope(tags))
}
