/// Goal endpoints
///
/// - `POST /goal/create` (201), `POST /goal/edit`
/// - `GET /goal/:id`, `DELETE /goal/:id` (204)
/// - `GET /me/goals`, `GET /user/:user_id/goals` (friends or admin)

use crate::{
    app::AppState,
    error::{validate_request, ApiResult},
    middleware::session::CurrentUser,
    routes::{ensure_interval, envelope},
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use timetracker_shared::models::goal::GoalInput;
use validator::Validate;

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct GoalRequest {
    #[validate(length(min = 1, max = 255, message = "Name must be 1-255 characters"))]
    pub name: String,

    pub project_id: Option<i64>,

    #[validate(range(min = 0.0, message = "Hours must not be negative"))]
    pub hours_count: f64,

    #[serde(default)]
    #[validate(length(max = 2000, message = "Description must be at most 2000 characters"))]
    pub description: String,

    pub time_start: DateTime<Utc>,
    pub time_end: DateTime<Utc>,
}

impl GoalRequest {
    fn into_input(self) -> ApiResult<GoalInput> {
        validate_request(&self)?;
        ensure_interval(self.time_start, self.time_end)?;

        Ok(GoalInput {
            name: self.name,
            project_id: self.project_id,
            hours_count: self.hours_count,
            description: self.description,
            time_start: self.time_start,
            time_end: self.time_end,
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct EditGoalRequest {
    pub id: i64,

    #[serde(flatten)]
    pub goal: GoalRequest,
}

pub async fn create_goal(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(req): Json<GoalRequest>,
) -> ApiResult<impl IntoResponse> {
    let goal = state
        .usecases
        .goals
        .create_goal(&user.principal, req.into_input()?)
        .await?;
    Ok((StatusCode::CREATED, envelope(goal)))
}

pub async fn edit_goal(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(req): Json<EditGoalRequest>,
) -> ApiResult<impl IntoResponse> {
    let goal = state
        .usecases
        .goals
        .update_goal(&user.principal, req.id, req.goal.into_input()?)
        .await?;
    Ok(envelope(goal))
}

pub async fn get_goal(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i64>,
) -> ApiResult<impl IntoResponse> {
    let goal = state.usecases.goals.get_goal(&user.principal, id).await?;
    Ok(envelope(goal))
}

pub async fn delete_goal(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i64>,
) -> ApiResult<StatusCode> {
    state.usecases.goals.delete_goal(&user.principal, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn my_goals(State(state): State<AppState>, user: CurrentUser) -> ApiResult<impl IntoResponse> {
    let goals = state.usecases.goals.get_user_goals(user.principal.id).await?;
    Ok(envelope(goals))
}

pub async fn user_goals(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
) -> ApiResult<impl IntoResponse> {
    let goals = state.usecases.goals.get_user_goals(user_id).await?;
    Ok(envelope(goals))
}
