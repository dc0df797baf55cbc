/// Redis-backed session store and cache

use super::{CacheStorage, SessionRepository};
use crate::error::{AppError, AppResult, ResultExt};
use crate::models::session::Session;
use crate::redis::client::RedisClient;
use async_trait::async_trait;
use tracing::debug;

/// Session tokens as plain keys; expiry is left to Redis TTLs
#[derive(Clone)]
pub struct RedisSessionRepository {
    client: RedisClient,
}

impl RedisSessionRepository {
    pub fn new(client: RedisClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl SessionRepository for RedisSessionRepository {
    async fn create_session(&self, session: &Session) -> AppResult<()> {
        let ttl = session.max_age.num_seconds().max(1) as u64;

        self.client
            .set_ex(&session.token, session.user_id.to_string().as_bytes(), ttl)
            .await
            .context("redis error (sessions)")
    }

    async fn get_user_id(&self, token: &str) -> AppResult<i64> {
        let raw = self
            .client
            .get(token)
            .await
            .context("redis error (sessions)")?
            .ok_or(AppError::NotFound)?;

        String::from_utf8_lossy(&raw)
            .parse::<i64>()
            .map_err(|e| AppError::Internal(format!("malformed session value: {}", e)))
    }

    async fn delete_session(&self, token: &str) -> AppResult<()> {
        let removed = self
            .client
            .del(token)
            .await
            .context("redis error (sessions)")?;

        if removed == 0 {
            return Err(AppError::NotFound);
        }
        Ok(())
    }
}

/// Cache with one fixed TTL for every key
#[derive(Clone)]
pub struct RedisCache {
    client: RedisClient,
    ttl_secs: u64,
}

impl RedisCache {
    pub fn new(client: RedisClient, ttl_secs: u64) -> Self {
        Self { client, ttl_secs }
    }
}

#[async_trait]
impl CacheStorage for RedisCache {
    async fn get(&self, key: &str) -> AppResult<Option<Vec<u8>>> {
        let value = self.client.get(key).await.context("redis error (cache)")?;
        debug!(key, hit = value.is_some(), "Cache lookup");
        Ok(value)
    }

    async fn set(&self, key: &str, value: &[u8]) -> AppResult<()> {
        self.client
            .set_ex(key, value, self.ttl_secs)
            .await
            .context("redis error (cache)")
    }

    async fn delete(&self, key: &str) -> AppResult<()> {
        self.client.del(key).await.context("redis error (cache)")?;
        Ok(())
    }
}
