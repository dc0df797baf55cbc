/// Session tokens
///
/// A session maps an opaque token to a user id until it expires. The Redis
/// store relies on key TTLs; the relational store keeps `expire_time` and
/// checks it on every read.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE cookie (
///     session_token VARCHAR(64) PRIMARY KEY,
///     user_id BIGINT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     expire_time TIMESTAMPTZ NOT NULL
/// );
/// ```

use chrono::{DateTime, Duration, Utc};
use sqlx::PgPool;
use uuid::Uuid;

/// Default lifetime of a session: one year
pub const SESSION_MAX_AGE_SECS: i64 = 365 * 24 * 60 * 60;

/// A freshly minted session, as handed to a session store
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub token: String,
    pub user_id: i64,
    pub max_age: Duration,
}

impl Session {
    /// Mints a random token for `user_id`
    pub fn new(user_id: i64, max_age: Duration) -> Self {
        Self {
            token: Uuid::new_v4().to_string(),
            user_id,
            max_age,
        }
    }
}

/// Row of the `cookie` table
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct SessionRow {
    pub session_token: String,
    pub user_id: i64,
    pub expire_time: DateTime<Utc>,
}

impl SessionRow {
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expire_time < now
    }

    pub async fn create(pool: &PgPool, session: &Session) -> Result<(), sqlx::Error> {
        sqlx::query("INSERT INTO cookie (session_token, user_id, expire_time) VALUES ($1, $2, $3)")
            .bind(&session.token)
            .bind(session.user_id)
            .bind(Utc::now() + session.max_age)
            .execute(pool)
            .await?;

        Ok(())
    }

    pub async fn find(pool: &PgPool, token: &str) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, SessionRow>(
            "SELECT session_token, user_id, expire_time FROM cookie WHERE session_token = $1",
        )
        .bind(token)
        .fetch_optional(pool)
        .await
    }

    pub async fn delete(pool: &PgPool, token: &str) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM cookie WHERE session_token = $1")
            .bind(token)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokens_are_unique() {
        let a = Session::new(1, Duration::seconds(SESSION_MAX_AGE_SECS));
        let b = Session::new(1, Duration::seconds(SESSION_MAX_AGE_SECS));

        assert_ne!(a.token, b.token);
        assert_eq!(a.token.len(), 36);
    }

    #[test]
    fn test_expiry() {
        let now = Utc::now();
        let row = SessionRow {
            session_token: "t".to_string(),
            user_id: 1,
            expire_time: now - Duration::seconds(1),
        };

        assert!(row.is_expired_at(now));
        assert!(!row.is_expired_at(now - Duration::seconds(2)));
    }
}
