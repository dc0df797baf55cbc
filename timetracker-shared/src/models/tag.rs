/// Tags and their many-to-many link to entries
///
/// # Schema
///
/// ```sql
/// CREATE TABLE tag (
///     id BIGSERIAL PRIMARY KEY,
///     user_id BIGINT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     name VARCHAR(255) NOT NULL,
///     about TEXT NOT NULL DEFAULT '',
///     color VARCHAR(32) NOT NULL DEFAULT ''
/// );
///
/// CREATE TABLE tag_entry (
///     tag_id BIGINT NOT NULL,
///     entry_id BIGINT NOT NULL,
///     PRIMARY KEY (tag_id, entry_id)
/// );
/// ```

use serde::{Deserialize, Serialize};
use sqlx::PgPool;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Tag {
    pub id: i64,
    pub user_id: i64,
    pub name: String,
    pub about: String,
    pub color: String,
}

/// Tag fields supplied by a client
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagInput {
    pub name: String,
    pub about: String,
    pub color: String,
}

impl Tag {
    pub async fn create(pool: &PgPool, user_id: i64, data: TagInput) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Tag>(
            r#"
            INSERT INTO tag (user_id, name, about, color)
            VALUES ($1, $2, $3, $4)
            RETURNING id, user_id, name, about, color
            "#,
        )
        .bind(user_id)
        .bind(data.name)
        .bind(data.about)
        .bind(data.color)
        .fetch_one(pool)
        .await
    }

    pub async fn find_by_id(pool: &PgPool, id: i64) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Tag>("SELECT id, user_id, name, about, color FROM tag WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Overwrites the editable fields; the owner is left untouched
    pub async fn update(pool: &PgPool, id: i64, data: TagInput) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Tag>(
            r#"
            UPDATE tag SET name = $2, about = $3, color = $4
            WHERE id = $1
            RETURNING id, user_id, name, about, color
            "#,
        )
        .bind(id)
        .bind(data.name)
        .bind(data.about)
        .bind(data.color)
        .fetch_optional(pool)
        .await
    }

    pub async fn delete(pool: &PgPool, id: i64) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM tag WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn list_by_user(pool: &PgPool, user_id: i64) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Tag>(
            "SELECT id, user_id, name, about, color FROM tag WHERE user_id = $1 ORDER BY id",
        )
        .bind(user_id)
        .fetch_all(pool)
        .await
    }

    /// Tag ids linked to an entry, as stored in `tag_entry`
    pub async fn ids_for_entry(pool: &PgPool, entry_id: i64) -> Result<Vec<i64>, sqlx::Error> {
        sqlx::query_scalar("SELECT tag_id FROM tag_entry WHERE entry_id = $1 ORDER BY tag_id")
            .bind(entry_id)
            .fetch_all(pool)
            .await
    }

    pub async fn link_to_entry(pool: &PgPool, entry_id: i64, tag_ids: &[i64]) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            INSERT INTO tag_entry (tag_id, entry_id)
            SELECT tag_id, $1 FROM UNNEST($2::BIGINT[]) AS t(tag_id)
            ON CONFLICT DO NOTHING
            "#,
        )
        .bind(entry_id)
        .bind(tag_ids)
        .execute(pool)
        .await?;

        Ok(())
    }

    pub async fn unlink_from_entry(pool: &PgPool, entry_id: i64) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM tag_entry WHERE entry_id = $1")
            .bind(entry_id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected())
    }

    pub async fn unlink_everywhere(pool: &PgPool, tag_id: i64) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM tag_entry WHERE tag_id = $1")
            .bind(tag_id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected())
    }
}
