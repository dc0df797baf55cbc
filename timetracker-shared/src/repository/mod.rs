/// Storage seams used by the usecases
///
/// Every collaborator a usecase talks to sits behind one of these traits so
/// business rules can run against PostgreSQL and Redis in production and
/// against in-memory fakes in tests.
///
/// Implementations:
///
/// - [`postgres::PgRepository`]: users, friend edges, entries, tags, goals,
///   projects and the relational session store
/// - [`self::redis::RedisSessionRepository`]: session tokens with key TTLs
/// - [`self::redis::RedisCache`]: response cache with a fixed TTL
/// - [`memory::MemoryRepository`]: everything above, in process
///
/// Lookups of a single record return [`AppError::NotFound`] when the row
/// is missing; listings return an empty vector.
///
/// [`AppError::NotFound`]: crate::error::AppError::NotFound

pub mod memory;
pub mod postgres;
pub mod redis;

use crate::error::AppResult;
use crate::models::{
    entry::{Entry, EntryInput},
    friend::FriendRelation,
    goal::{Goal, GoalInput},
    project::{Project, ProjectInput},
    session::Session,
    tag::{Tag, TagInput},
    user::{CreateUser, UpdateUser, User},
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn create_user(&self, data: CreateUser) -> AppResult<User>;
    async fn get_user(&self, id: i64) -> AppResult<User>;
    async fn get_user_by_email(&self, email: &str) -> AppResult<User>;
    async fn get_users_by_ids(&self, ids: &[i64]) -> AppResult<Vec<User>>;
    async fn get_all_users(&self) -> AppResult<Vec<User>>;
    async fn update_user(&self, id: i64, data: UpdateUser) -> AppResult<User>;
}

#[async_trait]
pub trait FriendRepository: Send + Sync {
    /// True if the directed edge exists
    async fn check_friends(&self, rel: FriendRelation) -> AppResult<bool>;
    async fn create_friend_relation(&self, rel: FriendRelation) -> AppResult<()>;
    async fn delete_friend_relation(&self, rel: FriendRelation) -> AppResult<()>;
    async fn get_user_friends(&self, user_id: i64) -> AppResult<Vec<i64>>;
    async fn get_user_subs(&self, user_id: i64) -> AppResult<Vec<i64>>;
}

#[async_trait]
pub trait EntryRepository: Send + Sync {
    async fn create_entry(&self, user_id: i64, data: &EntryInput) -> AppResult<Entry>;
    async fn get_entry(&self, id: i64) -> AppResult<Entry>;
    async fn update_entry(&self, id: i64, data: &EntryInput) -> AppResult<Entry>;
    async fn delete_entry(&self, id: i64) -> AppResult<()>;
    async fn get_user_entries(&self, user_id: i64) -> AppResult<Vec<Entry>>;
    async fn get_user_entries_between(
        &self,
        user_id: i64,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> AppResult<Vec<Entry>>;
}

#[async_trait]
pub trait TagRepository: Send + Sync {
    async fn create_tag(&self, user_id: i64, data: TagInput) -> AppResult<Tag>;
    async fn get_tag(&self, id: i64) -> AppResult<Tag>;
    async fn update_tag(&self, id: i64, data: TagInput) -> AppResult<Tag>;
    async fn delete_tag(&self, id: i64) -> AppResult<()>;
    async fn get_user_tags(&self, user_id: i64) -> AppResult<Vec<Tag>>;

    async fn get_entry_tag_ids(&self, entry_id: i64) -> AppResult<Vec<i64>>;
    async fn create_entry_tags(&self, entry_id: i64, tag_ids: &[i64]) -> AppResult<()>;
    async fn delete_entry_tags(&self, entry_id: i64) -> AppResult<()>;
    /// Drops every link to a tag, whichever entries hold it
    async fn delete_tag_links(&self, tag_id: i64) -> AppResult<()>;
}

#[async_trait]
pub trait GoalRepository: Send + Sync {
    async fn create_goal(&self, user_id: i64, data: GoalInput) -> AppResult<Goal>;
    async fn get_goal(&self, id: i64) -> AppResult<Goal>;
    async fn update_goal(&self, id: i64, data: GoalInput) -> AppResult<Goal>;
    async fn delete_goal(&self, id: i64) -> AppResult<()>;
    async fn get_user_goals(&self, user_id: i64) -> AppResult<Vec<Goal>>;
}

#[async_trait]
pub trait ProjectRepository: Send + Sync {
    async fn create_project(&self, user_id: i64, data: ProjectInput) -> AppResult<Project>;
    async fn get_project(&self, id: i64) -> AppResult<Project>;
    async fn update_project(&self, id: i64, data: ProjectInput) -> AppResult<Project>;
    async fn delete_project(&self, id: i64) -> AppResult<()>;
    async fn get_user_projects(&self, user_id: i64) -> AppResult<Vec<Project>>;
}

/// Token to user-id mapping with expiry
#[async_trait]
pub trait SessionRepository: Send + Sync {
    async fn create_session(&self, session: &Session) -> AppResult<()>;

    /// Returns NotFound for unknown or expired tokens
    async fn get_user_id(&self, token: &str) -> AppResult<i64>;

    async fn delete_session(&self, token: &str) -> AppResult<()>;
}

/// Byte cache keyed by string
#[async_trait]
pub trait CacheStorage: Send + Sync {
    async fn get(&self, key: &str) -> AppResult<Option<Vec<u8>>>;
    async fn set(&self, key: &str, value: &[u8]) -> AppResult<()>;
    async fn delete(&self, key: &str) -> AppResult<()>;
}

/// Cache that never stores anything; used when caching is switched off
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopCache;

#[async_trait]
impl CacheStorage for NoopCache {
    async fn get(&self, _key: &str) -> AppResult<Option<Vec<u8>>> {
        Ok(None)
    }

    async fn set(&self, _key: &str, _value: &[u8]) -> AppResult<()> {
        Ok(())
    }

    async fn delete(&self, _key: &str) -> AppResult<()> {
        Ok(())
    }
}
