/// Projects
///
/// `total_count_hours` is maintained outside this service and is only
/// read and written back as supplied.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE project (
///     id BIGSERIAL PRIMARY KEY,
///     user_id BIGINT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     name VARCHAR(255) NOT NULL,
///     about TEXT NOT NULL DEFAULT '',
///     color VARCHAR(32) NOT NULL DEFAULT '',
///     is_private BOOLEAN NOT NULL DEFAULT FALSE,
///     total_count_hours DOUBLE PRECISION NOT NULL DEFAULT 0
/// );
/// ```

use serde::{Deserialize, Serialize};
use sqlx::PgPool;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Project {
    pub id: i64,
    pub user_id: i64,
    pub name: String,
    pub about: String,
    pub color: String,
    pub is_private: bool,
    pub total_count_hours: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProjectInput {
    pub name: String,
    pub about: String,
    pub color: String,
    pub is_private: bool,
    pub total_count_hours: f64,
}

const PROJECT_COLUMNS: &str = "id, user_id, name, about, color, is_private, total_count_hours";

impl Project {
    pub async fn create(pool: &PgPool, user_id: i64, data: ProjectInput) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Project>(&format!(
            r#"
            INSERT INTO project (user_id, name, about, color, is_private, total_count_hours)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {}
            "#,
            PROJECT_COLUMNS
        ))
        .bind(user_id)
        .bind(data.name)
        .bind(data.about)
        .bind(data.color)
        .bind(data.is_private)
        .bind(data.total_count_hours)
        .fetch_one(pool)
        .await
    }

    pub async fn find_by_id(pool: &PgPool, id: i64) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Project>(&format!("SELECT {} FROM project WHERE id = $1", PROJECT_COLUMNS))
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn update(pool: &PgPool, id: i64, data: ProjectInput) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Project>(&format!(
            r#"
            UPDATE project
            SET name = $2, about = $3, color = $4, is_private = $5, total_count_hours = $6
            WHERE id = $1
            RETURNING {}
            "#,
            PROJECT_COLUMNS
        ))
        .bind(id)
        .bind(data.name)
        .bind(data.about)
        .bind(data.color)
        .bind(data.is_private)
        .bind(data.total_count_hours)
        .fetch_optional(pool)
        .await
    }

    pub async fn delete(pool: &PgPool, id: i64) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM project WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn list_by_user(pool: &PgPool, user_id: i64) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Project>(&format!(
            "SELECT {} FROM project WHERE user_id = $1 ORDER BY id",
            PROJECT_COLUMNS
        ))
        .bind(user_id)
        .fetch_all(pool)
        .await
    }
}
