/// PostgreSQL implementations of the repository traits
///
/// `PgRepository` is a thin adapter over the model functions: it turns
/// `Option` rows into [`AppError::NotFound`], maps the unique violations the
/// usecases care about into conflicts, and wraps every other driver failure
/// with `database error (table X)`.

use super::{
    EntryRepository, FriendRepository, GoalRepository, ProjectRepository, SessionRepository,
    TagRepository, UserRepository,
};
use crate::error::{AppError, AppResult};
use crate::models::{
    entry::{Entry, EntryInput},
    friend::FriendRelation,
    goal::{Goal, GoalInput},
    project::{Project, ProjectInput},
    session::{Session, SessionRow},
    tag::{Tag, TagInput},
    user::{CreateUser, UpdateUser, User},
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::debug;

#[derive(Clone)]
pub struct PgRepository {
    pool: PgPool,
}

impl PgRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

fn db_error(table: &'static str) -> impl FnOnce(sqlx::Error) -> AppError {
    move |e| AppError::from(e).wrap(format!("database error (table {})", table))
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db) if db.is_unique_violation())
}

fn found<T>(row: Option<T>) -> AppResult<T> {
    row.ok_or(AppError::NotFound)
}

fn deleted(removed: bool) -> AppResult<()> {
    if removed {
        Ok(())
    } else {
        Err(AppError::NotFound)
    }
}

#[async_trait]
impl UserRepository for PgRepository {
    async fn create_user(&self, data: CreateUser) -> AppResult<User> {
        User::create(&self.pool, data).await.map_err(|e| {
            if is_unique_violation(&e) {
                AppError::ConflictEmail
            } else {
                db_error("users")(e)
            }
        })
    }

    async fn get_user(&self, id: i64) -> AppResult<User> {
        found(User::find_by_id(&self.pool, id).await.map_err(db_error("users"))?)
    }

    async fn get_user_by_email(&self, email: &str) -> AppResult<User> {
        found(User::find_by_email(&self.pool, email).await.map_err(db_error("users"))?)
    }

    async fn get_users_by_ids(&self, ids: &[i64]) -> AppResult<Vec<User>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        User::find_by_ids(&self.pool, ids).await.map_err(db_error("users"))
    }

    async fn get_all_users(&self) -> AppResult<Vec<User>> {
        User::list(&self.pool).await.map_err(db_error("users"))
    }

    async fn update_user(&self, id: i64, data: UpdateUser) -> AppResult<User> {
        let updated = User::update(&self.pool, id, data).await.map_err(|e| {
            if is_unique_violation(&e) {
                AppError::ConflictEmail
            } else {
                db_error("users")(e)
            }
        })?;
        found(updated)
    }
}

#[async_trait]
impl FriendRepository for PgRepository {
    async fn check_friends(&self, rel: FriendRelation) -> AppResult<bool> {
        FriendRelation::exists(&self.pool, rel)
            .await
            .map_err(db_error("friend_relation"))
    }

    async fn create_friend_relation(&self, rel: FriendRelation) -> AppResult<()> {
        FriendRelation::create(&self.pool, rel).await.map_err(|e| {
            if is_unique_violation(&e) {
                AppError::ConflictFriend
            } else {
                db_error("friend_relation")(e)
            }
        })
    }

    async fn delete_friend_relation(&self, rel: FriendRelation) -> AppResult<()> {
        deleted(
            FriendRelation::delete(&self.pool, rel)
                .await
                .map_err(db_error("friend_relation"))?,
        )
    }

    async fn get_user_friends(&self, user_id: i64) -> AppResult<Vec<i64>> {
        FriendRelation::friend_ids(&self.pool, user_id)
            .await
            .map_err(db_error("friend_relation"))
    }

    async fn get_user_subs(&self, user_id: i64) -> AppResult<Vec<i64>> {
        FriendRelation::subscriber_ids(&self.pool, user_id)
            .await
            .map_err(db_error("friend_relation"))
    }
}

#[async_trait]
impl EntryRepository for PgRepository {
    async fn create_entry(&self, user_id: i64, data: &EntryInput) -> AppResult<Entry> {
        Entry::create(&self.pool, user_id, data).await.map_err(db_error("entry"))
    }

    async fn get_entry(&self, id: i64) -> AppResult<Entry> {
        found(Entry::find_by_id(&self.pool, id).await.map_err(db_error("entry"))?)
    }

    async fn update_entry(&self, id: i64, data: &EntryInput) -> AppResult<Entry> {
        found(Entry::update(&self.pool, id, data).await.map_err(db_error("entry"))?)
    }

    async fn delete_entry(&self, id: i64) -> AppResult<()> {
        deleted(Entry::delete(&self.pool, id).await.map_err(db_error("entry"))?)
    }

    async fn get_user_entries(&self, user_id: i64) -> AppResult<Vec<Entry>> {
        Entry::list_by_user(&self.pool, user_id).await.map_err(db_error("entry"))
    }

    async fn get_user_entries_between(
        &self,
        user_id: i64,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> AppResult<Vec<Entry>> {
        Entry::list_by_user_between(&self.pool, user_id, from, to)
            .await
            .map_err(db_error("entry"))
    }
}

#[async_trait]
impl TagRepository for PgRepository {
    async fn create_tag(&self, user_id: i64, data: TagInput) -> AppResult<Tag> {
        Tag::create(&self.pool, user_id, data).await.map_err(db_error("tag"))
    }

    async fn get_tag(&self, id: i64) -> AppResult<Tag> {
        found(Tag::find_by_id(&self.pool, id).await.map_err(db_error("tag"))?)
    }

    async fn update_tag(&self, id: i64, data: TagInput) -> AppResult<Tag> {
        found(Tag::update(&self.pool, id, data).await.map_err(db_error("tag"))?)
    }

    async fn delete_tag(&self, id: i64) -> AppResult<()> {
        deleted(Tag::delete(&self.pool, id).await.map_err(db_error("tag"))?)
    }

    async fn get_user_tags(&self, user_id: i64) -> AppResult<Vec<Tag>> {
        Tag::list_by_user(&self.pool, user_id).await.map_err(db_error("tag"))
    }

    async fn get_entry_tag_ids(&self, entry_id: i64) -> AppResult<Vec<i64>> {
        Tag::ids_for_entry(&self.pool, entry_id)
            .await
            .map_err(db_error("tag_entry"))
    }

    async fn create_entry_tags(&self, entry_id: i64, tag_ids: &[i64]) -> AppResult<()> {
        Tag::link_to_entry(&self.pool, entry_id, tag_ids)
            .await
            .map_err(db_error("tag_entry"))
    }

    async fn delete_entry_tags(&self, entry_id: i64) -> AppResult<()> {
        let removed = Tag::unlink_from_entry(&self.pool, entry_id)
            .await
            .map_err(db_error("tag_entry"))?;
        debug!(entry_id, removed, "Removed entry tag links");
        Ok(())
    }

    async fn delete_tag_links(&self, tag_id: i64) -> AppResult<()> {
        let removed = Tag::unlink_everywhere(&self.pool, tag_id)
            .await
            .map_err(db_error("tag_entry"))?;
        debug!(tag_id, removed, "Removed links to deleted tag");
        Ok(())
    }
}

#[async_trait]
impl GoalRepository for PgRepository {
    async fn create_goal(&self, user_id: i64, data: GoalInput) -> AppResult<Goal> {
        Goal::create(&self.pool, user_id, data).await.map_err(db_error("goal"))
    }

    async fn get_goal(&self, id: i64) -> AppResult<Goal> {
        found(Goal::find_by_id(&self.pool, id).await.map_err(db_error("goal"))?)
    }

    async fn update_goal(&self, id: i64, data: GoalInput) -> AppResult<Goal> {
        found(Goal::update(&self.pool, id, data).await.map_err(db_error("goal"))?)
    }

    async fn delete_goal(&self, id: i64) -> AppResult<()> {
        deleted(Goal::delete(&self.pool, id).await.map_err(db_error("goal"))?)
    }

    async fn get_user_goals(&self, user_id: i64) -> AppResult<Vec<Goal>> {
        Goal::list_by_user(&self.pool, user_id).await.map_err(db_error("goal"))
    }
}

#[async_trait]
impl ProjectRepository for PgRepository {
    async fn create_project(&self, user_id: i64, data: ProjectInput) -> AppResult<Project> {
        Project::create(&self.pool, user_id, data)
            .await
            .map_err(db_error("project"))
    }

    async fn get_project(&self, id: i64) -> AppResult<Project> {
        found(Project::find_by_id(&self.pool, id).await.map_err(db_error("project"))?)
    }

    async fn update_project(&self, id: i64, data: ProjectInput) -> AppResult<Project> {
        found(Project::update(&self.pool, id, data).await.map_err(db_error("project"))?)
    }

    async fn delete_project(&self, id: i64) -> AppResult<()> {
        deleted(Project::delete(&self.pool, id).await.map_err(db_error("project"))?)
    }

    async fn get_user_projects(&self, user_id: i64) -> AppResult<Vec<Project>> {
        Project::list_by_user(&self.pool, user_id)
            .await
            .map_err(db_error("project"))
    }
}

/// Relational session store backed by the `cookie` table
#[async_trait]
impl SessionRepository for PgRepository {
    async fn create_session(&self, session: &Session) -> AppResult<()> {
        SessionRow::create(&self.pool, session)
            .await
            .map_err(db_error("cookie"))
    }

    async fn get_user_id(&self, token: &str) -> AppResult<i64> {
        let row = found(SessionRow::find(&self.pool, token).await.map_err(db_error("cookie"))?)?;

        if row.is_expired_at(Utc::now()) {
            debug!(user_id = row.user_id, "Session expired, removing");
            SessionRow::delete(&self.pool, token)
                .await
                .map_err(db_error("cookie"))?;
            return Err(AppError::NotFound);
        }

        Ok(row.user_id)
    }

    async fn delete_session(&self, token: &str) -> AppResult<()> {
        deleted(SessionRow::delete(&self.pool, token).await.map_err(db_error("cookie"))?)
    }
}
