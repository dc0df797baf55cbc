/// Directed "subscribe" edges between users
///
/// An edge `(subscriber_id, user_id)` means *subscriber follows user*.
/// Friendship is never stored: two users are friends when both directed
/// edges exist.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE friend_relation (
///     subscriber_id BIGINT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     user_id BIGINT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     PRIMARY KEY (subscriber_id, user_id),
///     CHECK (subscriber_id <> user_id)
/// );
/// ```

use serde::{Deserialize, Serialize};
use sqlx::PgPool;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::FromRow)]
pub struct FriendRelation {
    pub subscriber_id: i64,
    pub user_id: i64,
}

impl FriendRelation {
    pub fn new(subscriber_id: i64, user_id: i64) -> Self {
        Self {
            subscriber_id,
            user_id,
        }
    }

    /// The same pair pointing the other way
    pub fn reversed(&self) -> Self {
        Self::new(self.user_id, self.subscriber_id)
    }

    pub fn is_self_loop(&self) -> bool {
        self.subscriber_id == self.user_id
    }

    pub async fn exists(pool: &PgPool, rel: FriendRelation) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM friend_relation
                WHERE subscriber_id = $1 AND user_id = $2
            )
            "#,
        )
        .bind(rel.subscriber_id)
        .bind(rel.user_id)
        .fetch_one(pool)
        .await
    }

    pub async fn create(pool: &PgPool, rel: FriendRelation) -> Result<(), sqlx::Error> {
        sqlx::query("INSERT INTO friend_relation (subscriber_id, user_id) VALUES ($1, $2)")
            .bind(rel.subscriber_id)
            .bind(rel.user_id)
            .execute(pool)
            .await?;

        Ok(())
    }

    /// Returns true if an edge was removed
    pub async fn delete(pool: &PgPool, rel: FriendRelation) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM friend_relation WHERE subscriber_id = $1 AND user_id = $2")
            .bind(rel.subscriber_id)
            .bind(rel.user_id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Users following `user_id` without being followed back
    pub async fn subscriber_ids(pool: &PgPool, user_id: i64) -> Result<Vec<i64>, sqlx::Error> {
        sqlx::query_scalar(
            r#"
            SELECT f1.subscriber_id
            FROM friend_relation f1
            LEFT JOIN friend_relation f2
                ON f2.user_id = f1.subscriber_id AND f2.subscriber_id = f1.user_id
            WHERE f1.user_id = $1 AND f2.user_id IS NULL
            ORDER BY f1.subscriber_id
            "#,
        )
        .bind(user_id)
        .fetch_all(pool)
        .await
    }

    /// Users with edges in both directions with `user_id`
    pub async fn friend_ids(pool: &PgPool, user_id: i64) -> Result<Vec<i64>, sqlx::Error> {
        sqlx::query_scalar(
            r#"
            SELECT f1.subscriber_id
            FROM friend_relation f1
            JOIN friend_relation f2
                ON f2.user_id = f1.subscriber_id AND f2.subscriber_id = f1.user_id
            WHERE f1.user_id = $1
            ORDER BY f1.subscriber_id
            "#,
        )
        .bind(user_id)
        .fetch_all(pool)
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reversed() {
        let rel = FriendRelation::new(1, 2);
        assert_eq!(rel.reversed(), FriendRelation::new(2, 1));
        assert_eq!(rel.reversed().reversed(), rel);
    }

    #[test]
    fn test_self_loop() {
        assert!(FriendRelation::new(3, 3).is_self_loop());
        assert!(!FriendRelation::new(3, 4).is_self_loop());
    }
}
