/// Goals: a target number of hours over a time window
///
/// # Schema
///
/// ```sql
/// CREATE TABLE goal (
///     id BIGSERIAL PRIMARY KEY,
///     user_id BIGINT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     name VARCHAR(255) NOT NULL,
///     project_id BIGINT,
///     hours_count DOUBLE PRECISION NOT NULL,
///     description TEXT NOT NULL DEFAULT '',
///     time_start TIMESTAMPTZ NOT NULL,
///     time_end TIMESTAMPTZ NOT NULL
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Goal {
    pub id: i64,
    pub user_id: i64,
    pub name: String,
    pub project_id: Option<i64>,
    pub hours_count: f64,
    pub description: String,
    pub time_start: DateTime<Utc>,
    pub time_end: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GoalInput {
    pub name: String,
    pub project_id: Option<i64>,
    pub hours_count: f64,
    pub description: String,
    pub time_start: DateTime<Utc>,
    pub time_end: DateTime<Utc>,
}

const GOAL_COLUMNS: &str = "id, user_id, name, project_id, hours_count, description, time_start, time_end";

impl Goal {
    pub async fn create(pool: &PgPool, user_id: i64, data: GoalInput) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Goal>(&format!(
            r#"
            INSERT INTO goal (user_id, name, project_id, hours_count, description, time_start, time_end)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {}
            "#,
            GOAL_COLUMNS
        ))
        .bind(user_id)
        .bind(data.name)
        .bind(data.project_id)
        .bind(data.hours_count)
        .bind(data.description)
        .bind(data.time_start)
        .bind(data.time_end)
        .fetch_one(pool)
        .await
    }

    pub async fn find_by_id(pool: &PgPool, id: i64) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Goal>(&format!("SELECT {} FROM goal WHERE id = $1", GOAL_COLUMNS))
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn update(pool: &PgPool, id: i64, data: GoalInput) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Goal>(&format!(
            r#"
            UPDATE goal
            SET name = $2, project_id = $3, hours_count = $4, description = $5,
                time_start = $6, time_end = $7
            WHERE id = $1
            RETURNING {}
            "#,
            GOAL_COLUMNS
        ))
        .bind(id)
        .bind(data.name)
        .bind(data.project_id)
        .bind(data.hours_count)
        .bind(data.description)
        .bind(data.time_start)
        .bind(data.time_end)
        .fetch_optional(pool)
        .await
    }

    pub async fn delete(pool: &PgPool, id: i64) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM goal WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn list_by_user(pool: &PgPool, user_id: i64) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Goal>(&format!(
            "SELECT {} FROM goal WHERE user_id = $1 ORDER BY id",
            GOAL_COLUMNS
        ))
        .bind(user_id)
        .fetch_all(pool)
        .await
    }
}
