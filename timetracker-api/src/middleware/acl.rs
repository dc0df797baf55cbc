/// Route-level access rules
///
/// Both layers run after [`require_session`](super::session::require_session)
/// and are attached with `route_layer` so the `:user_id` path parameter is
/// available.

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    middleware::session::CurrentUser,
};
use axum::{
    extract::{Path, Request, State},
    middleware::Next,
    response::Response,
};
use std::collections::HashMap;
use timetracker_shared::auth::acl::{require_admin, require_friends_or_admin};

/// Middleware: 403 unless the caller is an admin
pub async fn admin_only(user: CurrentUser, req: Request, next: Next) -> ApiResult<Response> {
    require_admin(&user.principal)?;
    Ok(next.run(req).await)
}

/// Middleware: admins, or mutual friends of the `:user_id` in the path
///
/// An unparseable id or a failed friendship check is a 400, a completed
/// check that finds no mutual friendship a 403.
pub async fn friends_or_admin(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(params): Path<HashMap<String, String>>,
    req: Request,
    next: Next,
) -> ApiResult<Response> {
    let target_id = params
        .get("user_id")
        .and_then(|raw| raw.parse::<i64>().ok())
        .ok_or_else(|| ApiError::BadRequest("invalid user_id".to_string()))?;

    require_friends_or_admin(&user.principal, target_id, &state.usecases.friends).await?;

    Ok(next.run(req).await)
}
