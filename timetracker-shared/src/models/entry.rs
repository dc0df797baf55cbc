/// Time entries
///
/// An entry is a logged span of work owned by one user. Its tags live in
/// `tag_entry` and are resolved separately; the duration is derived from
/// the two timestamps and never stored.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE entry (
///     id BIGSERIAL PRIMARY KEY,
///     user_id BIGINT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     project_id BIGINT,
///     description TEXT NOT NULL DEFAULT '',
///     time_start TIMESTAMPTZ NOT NULL,
///     time_end TIMESTAMPTZ NOT NULL
/// );
/// ```

use super::tag::Tag;
use crate::timespan::pretty_duration;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Entry {
    pub id: i64,
    pub user_id: i64,
    pub project_id: Option<i64>,
    pub description: String,
    pub time_start: DateTime<Utc>,
    pub time_end: DateTime<Utc>,

    /// Filled in by the entry usecase
    #[sqlx(skip)]
    #[serde(default)]
    pub tag_list: Vec<Tag>,
}

impl Entry {
    /// Human-readable span, e.g. `2h0m0s`
    pub fn duration(&self) -> String {
        pretty_duration(self.time_start, self.time_end)
    }
}

/// Entry fields supplied by a client
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntryInput {
    pub project_id: Option<i64>,
    pub description: String,
    /// Ids of tags to link; empty means "leave links alone" on update
    pub tag_ids: Vec<i64>,
    pub time_start: DateTime<Utc>,
    pub time_end: DateTime<Utc>,
}

const ENTRY_COLUMNS: &str = "id, user_id, project_id, description, time_start, time_end";

impl Entry {
    pub async fn create(pool: &PgPool, user_id: i64, data: &EntryInput) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Entry>(&format!(
            r#"
            INSERT INTO entry (user_id, project_id, description, time_start, time_end)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {}
            "#,
            ENTRY_COLUMNS
        ))
        .bind(user_id)
        .bind(data.project_id)
        .bind(&data.description)
        .bind(data.time_start)
        .bind(data.time_end)
        .fetch_one(pool)
        .await
    }

    pub async fn find_by_id(pool: &PgPool, id: i64) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Entry>(&format!("SELECT {} FROM entry WHERE id = $1", ENTRY_COLUMNS))
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn update(pool: &PgPool, id: i64, data: &EntryInput) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Entry>(&format!(
            r#"
            UPDATE entry
            SET project_id = $2, description = $3, time_start = $4, time_end = $5
            WHERE id = $1
            RETURNING {}
            "#,
            ENTRY_COLUMNS
        ))
        .bind(id)
        .bind(data.project_id)
        .bind(&data.description)
        .bind(data.time_start)
        .bind(data.time_end)
        .fetch_optional(pool)
        .await
    }

    pub async fn delete(pool: &PgPool, id: i64) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM entry WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn list_by_user(pool: &PgPool, user_id: i64) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Entry>(&format!(
            "SELECT {} FROM entry WHERE user_id = $1 ORDER BY time_start",
            ENTRY_COLUMNS
        ))
        .bind(user_id)
        .fetch_all(pool)
        .await
    }

    /// Entries whose start falls inside `[from, to]`
    pub async fn list_by_user_between(
        pool: &PgPool,
        user_id: i64,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Entry>(&format!(
            r#"
            SELECT {} FROM entry
            WHERE user_id = $1 AND time_start BETWEEN $2 AND $3
            ORDER BY time_start
            "#,
            ENTRY_COLUMNS
        ))
        .bind(user_id)
        .bind(from)
        .bind(to)
        .fetch_all(pool)
        .await
    }
}
