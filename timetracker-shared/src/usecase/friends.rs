/// Friend graph: subscribe, unsubscribe, friendship checks and listings
///
/// Edges are directed. "Subscribers of A" follow A without being followed
/// back; "friends of A" have edges in both directions with A.

use crate::error::{AppError, AppResult, ResultExt};
use crate::models::{friend::FriendRelation, user::User};
use crate::repository::{FriendRepository, UserRepository};
use std::sync::Arc;
use tracing::info;

#[derive(Clone)]
pub struct FriendsUsecase {
    friends: Arc<dyn FriendRepository>,
    users: Arc<dyn UserRepository>,
}

impl FriendsUsecase {
    pub fn new(friends: Arc<dyn FriendRepository>, users: Arc<dyn UserRepository>) -> Self {
        Self { friends, users }
    }

    /// Adds the edge `subscriber -> user`
    ///
    /// # Errors
    ///
    /// - `BadRequest` when both ends are the same user
    /// - `NotFound` when the followed user does not exist
    /// - `ConflictFriend` when the edge already exists
    pub async fn create_friend_relation(&self, rel: FriendRelation) -> AppResult<()> {
        if rel.is_self_loop() {
            return Err(AppError::bad_request("cannot subscribe to yourself"));
        }

        self.users
            .get_user(rel.user_id)
            .await
            .context("friends.usecase.create_friend_relation")?;

        let exists = self
            .friends
            .check_friends(rel)
            .await
            .context("friends.usecase.create_friend_relation")?;

        if exists {
            return Err(AppError::ConflictFriend);
        }

        self.friends
            .create_friend_relation(rel)
            .await
            .context("friends.usecase.create_friend_relation")?;

        info!(subscriber_id = rel.subscriber_id, user_id = rel.user_id, "Subscribed");
        Ok(())
    }

    /// Removes the edge `subscriber -> user`
    ///
    /// # Errors
    ///
    /// - `BadRequest` when both ends are the same user
    /// - `NotFound` when the edge does not exist
    pub async fn delete_friend_relation(&self, rel: FriendRelation) -> AppResult<()> {
        if rel.is_self_loop() {
            return Err(AppError::bad_request("cannot unsubscribe from yourself"));
        }

        let exists = self
            .friends
            .check_friends(rel)
            .await
            .context("friends.usecase.delete_friend_relation")?;

        if !exists {
            return Err(AppError::NotFound);
        }

        self.friends
            .delete_friend_relation(rel)
            .await
            .context("friends.usecase.delete_friend_relation")?;

        info!(subscriber_id = rel.subscriber_id, user_id = rel.user_id, "Unsubscribed");
        Ok(())
    }

    /// True when both `a -> b` and `b -> a` exist
    ///
    /// Both edges are always looked up, whatever the first answer is.
    pub async fn check_is_friends(&self, a: i64, b: i64) -> AppResult<bool> {
        if a == b {
            return Err(AppError::bad_request("friendship with yourself is undefined"));
        }

        let forward = FriendRelation::new(a, b);
        let (a_follows_b, b_follows_a) = tokio::join!(
            self.friends.check_friends(forward),
            self.friends.check_friends(forward.reversed()),
        );

        let a_follows_b = a_follows_b.context("friends.usecase.check_is_friends")?;
        let b_follows_a = b_follows_a.context("friends.usecase.check_is_friends")?;

        Ok(a_follows_b && b_follows_a)
    }

    pub async fn get_user_friends(&self, user_id: i64) -> AppResult<Vec<User>> {
        let ids = self
            .friends
            .get_user_friends(user_id)
            .await
            .context("friends.usecase.get_user_friends")?;

        self.resolve_users(&ids)
            .await
            .context("friends.usecase.get_user_friends")
    }

    pub async fn get_user_subs(&self, user_id: i64) -> AppResult<Vec<User>> {
        let ids = self
            .friends
            .get_user_subs(user_id)
            .await
            .context("friends.usecase.get_user_subs")?;

        self.resolve_users(&ids)
            .await
            .context("friends.usecase.get_user_subs")
    }

    async fn resolve_users(&self, ids: &[i64]) -> AppResult<Vec<User>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let users = self.users.get_users_by_ids(ids).await?;
        Ok(users.into_iter().map(User::without_password).collect())
    }
}
