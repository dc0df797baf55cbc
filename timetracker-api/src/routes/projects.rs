/// Project endpoints
///
/// - `POST /project/create` (201), `POST /project/edit`
/// - `GET /project/:id`, `DELETE /project/:id` (204)
/// - `GET /me/projects`, `GET /user/:user_id/projects` (friends or admin)
///
/// Listings go through the per-owner project cache.

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
use timetracker_shared::models::project::ProjectInput;
use validator::Validate;

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ProjectRequest {
    #[validate(length(min = 1, max = 255, message = "Name must be 1-255 characters"))]
    pub name: String,

    #[serde(default)]
    #[validate(length(max = 2000, message = "About must be at most 2000 characters"))]
    pub about: String,

    #[serde(default)]
    #[validate(length(max = 32, message = "Color must be at most 32 characters"))]
    pub color: String,

    #[serde(default)]
    pub is_private: bool,

    #[serde(default)]
    #[validate(range(min = 0.0, message = "Hours must not be negative"))]
    pub total_count_hours: f64,
}

impl ProjectRequest {
    fn into_input(self) -> ApiResult<ProjectInput> {
        validate_request(&self)?;

        Ok(ProjectInput {
            name: self.name,
            about: self.about,
            color: self.color,
            is_private: self.is_private,
            total_count_hours: self.total_count_hours,
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct EditProjectRequest {
    pub id: i64,

    #[serde(flatten)]
    pub project: ProjectRequest,
}

pub async fn create_project(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(req): Json<ProjectRequest>,
) -> ApiResult<impl IntoResponse> {
    let project = state
        .usecases
        .projects
        .create_project(&user.principal, req.into_input()?)
        .await?;
    Ok((StatusCode::CREATED, envelope(project)))
}

pub async fn edit_project(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(req): Json<EditProjectRequest>,
) -> ApiResult<impl IntoResponse> {
    let project = state
        .usecases
        .projects
        .update_project(&user.principal, req.id, req.project.into_input()?)
        .await?;
    Ok(envelope(project))
}

pub async fn get_project(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i64>,
) -> ApiResult<impl IntoResponse> {
    let project = state.usecases.projects.get_project(&user.principal, id).await?;
    Ok(envelope(project))
}

pub async fn delete_project(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i64>,
) -> ApiResult<StatusCode> {
    state.usecases.projects.delete_project(&user.principal, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn my_projects(
    State(state): State<AppState>,
    user: CurrentUser,
) -> ApiResult<impl IntoResponse> {
    let projects = state
        .usecases
        .projects
        .get_user_projects_with_cache(user.principal.id)
        .await?;
    Ok(envelope(projects))
}

pub async fn user_projects(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
) -> ApiResult<impl IntoResponse> {
    let projects = state
        .usecases
        .projects
        .get_user_projects_with_cache(user_id)
        .await?;
    Ok(envelope(projects))
}
