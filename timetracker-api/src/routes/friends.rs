/// Friend graph endpoints
///
/// - `POST /friends/subscribe/:user_id` (201)
/// - `DELETE /friends/unsubscribe/:user_id` (204)
/// - `GET /me/friends`, `GET /me/subs`
/// - `GET /user/:user_id/friends` (friends or admin)
/// - `GET /user/:user_id/subs` (admin only)

use crate::{app::AppState, error::ApiResult, middleware::session::CurrentUser, routes::envelope};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use timetracker_shared::models::friend::FriendRelation;

pub async fn subscribe(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(user_id): Path<i64>,
) -> ApiResult<impl IntoResponse> {
    let rel = FriendRelation::new(user.principal.id, user_id);
    state.usecases.friends.create_friend_relation(rel).await?;
    Ok((StatusCode::CREATED, envelope(rel)))
}

pub async fn unsubscribe(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(user_id): Path<i64>,
) -> ApiResult<StatusCode> {
    let rel = FriendRelation::new(user.principal.id, user_id);
    state.usecases.friends.delete_friend_relation(rel).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn my_friends(
    State(state): State<AppState>,
    user: CurrentUser,
) -> ApiResult<impl IntoResponse> {
    let friends = state.usecases.friends.get_user_friends(user.principal.id).await?;
    Ok(envelope(friends))
}

pub async fn my_subs(State(state): State<AppState>, user: CurrentUser) -> ApiResult<impl IntoResponse> {
    let subs = state.usecases.friends.get_user_subs(user.principal.id).await?;
    Ok(envelope(subs))
}

pub async fn user_friends(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
) -> ApiResult<impl IntoResponse> {
    let friends = state.usecases.friends.get_user_friends(user_id).await?;
    Ok(envelope(friends))
}

pub async fn user_subs(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
) -> ApiResult<impl IntoResponse> {
    let subs = state.usecases.friends.get_user_subs(user_id).await?;
    Ok(envelope(subs))
}
