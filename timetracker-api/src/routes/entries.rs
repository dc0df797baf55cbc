/// Time entry endpoints
///
/// - `POST /entry/create` (201)
/// - `POST /entry/edit` - body carries the entry `id`
/// - `GET /entry/:id`, `DELETE /entry/:id` (204)
/// - `GET /me/entries?day=YYYY-MM-DD`
/// - `GET /user/:user_id/entries?day=YYYY-MM-DD` (friends or admin)
///
/// Entries are returned with their resolved `tag_list` and a `duration`
/// such as `"2h0m0s"`.

use crate::{
    app::AppState,
    error::{validate_request, ApiResult},
    middleware::session::CurrentUser,
    routes::{ensure_interval, envelope},
};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use timetracker_shared::models::entry::{Entry, EntryInput};
use validator::Validate;

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct EntryRequest {
    pub project_id: Option<i64>,

    #[serde(default)]
    #[validate(length(max = 1000, message = "Description must be at most 1000 characters"))]
    pub description: String,

    /// Tags to link; on edit an empty list keeps the current links
    #[serde(default)]
    pub tag_ids: Vec<i64>,

    pub time_start: DateTime<Utc>,
    pub time_end: DateTime<Utc>,
}

impl EntryRequest {
    fn into_input(self) -> ApiResult<EntryInput> {
        validate_request(&self)?;
        ensure_interval(self.time_start, self.time_end)?;

        Ok(EntryInput {
            project_id: self.project_id,
            description: self.description,
            tag_ids: self.tag_ids,
            time_start: self.time_start,
            time_end: self.time_end,
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct EditEntryRequest {
    pub id: i64,

    #[serde(flatten)]
    pub entry: EntryRequest,
}

#[derive(Debug, Default, Deserialize)]
pub struct DayQuery {
    pub day: Option<NaiveDate>,
}

/// Entry as sent to clients
#[derive(Debug, Serialize)]
pub struct EntryView {
    #[serde(flatten)]
    pub entry: Entry,
    pub duration: String,
}

impl From<Entry> for EntryView {
    fn from(entry: Entry) -> Self {
        Self {
            duration: entry.duration(),
            entry,
        }
    }
}

fn views(entries: Vec<Entry>) -> Vec<EntryView> {
    entries.into_iter().map(EntryView::from).collect()
}

pub async fn create_entry(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(req): Json<EntryRequest>,
) -> ApiResult<impl IntoResponse> {
    let input = req.into_input()?;
    let entry = state.usecases.entries.create_entry(&user.principal, input).await?;
    Ok((StatusCode::CREATED, envelope(EntryView::from(entry))))
}

pub async fn edit_entry(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(req): Json<EditEntryRequest>,
) -> ApiResult<impl IntoResponse> {
    let input = req.entry.into_input()?;
    let entry = state
        .usecases
        .entries
        .update_entry(&user.principal, req.id, input)
        .await?;
    Ok(envelope(EntryView::from(entry)))
}

pub async fn get_entry(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i64>,
) -> ApiResult<impl IntoResponse> {
    let entry = state.usecases.entries.get_entry(&user.principal, id).await?;
    Ok(envelope(EntryView::from(entry)))
}

pub async fn delete_entry(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i64>,
) -> ApiResult<StatusCode> {
    state.usecases.entries.delete_entry(&user.principal, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn my_entries(
    State(state): State<AppState>,
    user: CurrentUser,
    Query(query): Query<DayQuery>,
) -> ApiResult<impl IntoResponse> {
    let entries = state
        .usecases
        .entries
        .get_user_entries(user.principal.id, query.day)
        .await?;
    Ok(envelope(views(entries)))
}

pub async fn user_entries(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
    Query(query): Query<DayQuery>,
) -> ApiResult<impl IntoResponse> {
    let entries = state
        .usecases
        .entries
        .get_user_entries(user_id, query.day)
        .await?;
    Ok(envelope(views(entries)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_view_carries_duration() {
        let start = Utc::now();
        let view = EntryView::from(Entry {
            id: 1,
            user_id: 2,
            project_id: None,
            description: "entry".to_string(),
            time_start: start,
            time_end: start + Duration::minutes(90),
            tag_list: Vec::new(),
        });

        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["duration"], "1h30m0s");
        assert_eq!(json["description"], "entry");
        assert_eq!(json["tag_list"], serde_json::json!([]));
    }

    #[test]
    fn test_edit_request_flattens_entry_fields() {
        let req: EditEntryRequest = serde_json::from_value(serde_json::json!({
            "id": 7,
            "description": "fix",
            "time_start": "2021-08-15T14:30:45-07:00",
            "time_end": "2021-08-15T16:30:45-07:00"
        }))
        .unwrap();

        assert_eq!(req.id, 7);
        assert!(req.entry.tag_ids.is_empty());

        let input = req.entry.into_input().unwrap();
        assert_eq!(input.time_end - input.time_start, Duration::hours(2));
    }
}
