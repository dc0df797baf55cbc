use crate::auth::password::hash_password;
use crate::error::{AppError, AppResult, ResultExt};
use crate::models::user::{UpdateUser, User};
use crate::repository::UserRepository;
use std::sync::Arc;
use tracing::info;

/// Profile edit as submitted by the user; the password is plaintext
#[derive(Debug, Clone, Default)]
pub struct ProfileUpdate {
    pub name: Option<String>,
    pub email: Option<String>,
    pub about: Option<String>,
    pub password: Option<String>,
}

/// Read and edit user profiles; every returned user has its password cleared
#[derive(Clone)]
pub struct UserUsecase {
    users: Arc<dyn UserRepository>,
}

impl UserUsecase {
    pub fn new(users: Arc<dyn UserRepository>) -> Self {
        Self { users }
    }

    pub async fn get_user(&self, id: i64) -> AppResult<User> {
        let user = self.users.get_user(id).await.context("user.usecase.get_user")?;
        Ok(user.without_password())
    }

    pub async fn get_users_by_ids(&self, ids: &[i64]) -> AppResult<Vec<User>> {
        let users = self
            .users
            .get_users_by_ids(ids)
            .await
            .context("user.usecase.get_users_by_ids")?;
        Ok(users.into_iter().map(User::without_password).collect())
    }

    pub async fn get_all_users(&self) -> AppResult<Vec<User>> {
        let users = self
            .users
            .get_all_users()
            .await
            .context("user.usecase.get_all_users")?;
        Ok(users.into_iter().map(User::without_password).collect())
    }

    /// Applies a partial profile update
    ///
    /// Empty strings count as "not supplied". The role is not editable here.
    ///
    /// # Errors
    ///
    /// - `NotFound` when the user does not exist
    /// - `BadRequest` when nothing would change
    /// - `ConflictEmail` when the new email belongs to someone else
    pub async fn update_user(&self, id: i64, update: ProfileUpdate) -> AppResult<User> {
        self.users
            .get_user(id)
            .await
            .context("user.usecase.update_user")?;

        let password = match non_empty(update.password) {
            Some(plain) => Some(hash_password(&plain).context("user.usecase.update_user")?),
            None => None,
        };

        let data = UpdateUser {
            name: non_empty(update.name),
            email: non_empty(update.email),
            about: update.about,
            password,
        };

        if data.is_empty() {
            return Err(AppError::bad_request("no fields to update"));
        }

        let user = self
            .users
            .update_user(id, data)
            .await
            .context("user.usecase.update_user")?;

        info!(user_id = id, "Profile updated");
        Ok(user.without_password())
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
