/// Sign-up, sign-in, token resolution and logout
///
/// A successful sign-up or sign-in mints a fresh [`Session`]: a random v4
/// UUID token mapped to the user id, valid for the configured max age (one
/// year unless configured otherwise).

use crate::auth::password::{hash_password, verify_password};
use crate::error::{AppError, AppResult, ErrorKind, ResultExt};
use crate::models::{
    session::{Session, SESSION_MAX_AGE_SECS},
    user::{CreateUser, Role, User},
};
use crate::repository::{SessionRepository, UserRepository};
use chrono::Duration;
use std::sync::Arc;
use tracing::{info, warn};

/// Settings the auth rules depend on
#[derive(Debug, Clone)]
pub struct AuthSettings {
    /// Shared secret required to sign up with the admin role
    pub admin_token: String,
    pub session_max_age: Duration,
}

impl Default for AuthSettings {
    fn default() -> Self {
        Self {
            admin_token: "secret_token".to_string(),
            session_max_age: Duration::seconds(SESSION_MAX_AGE_SECS),
        }
    }
}

#[derive(Debug, Clone)]
pub struct SignUp {
    pub name: String,
    pub email: String,
    pub about: String,
    pub role: Role,
    pub password: String,
    pub admin_token: Option<String>,
}

#[derive(Clone)]
pub struct AuthUsecase {
    users: Arc<dyn UserRepository>,
    sessions: Arc<dyn SessionRepository>,
    settings: AuthSettings,
}

impl AuthUsecase {
    pub fn new(
        users: Arc<dyn UserRepository>,
        sessions: Arc<dyn SessionRepository>,
        settings: AuthSettings,
    ) -> Self {
        Self {
            users,
            sessions,
            settings,
        }
    }

    pub fn session_max_age(&self) -> Duration {
        self.settings.session_max_age
    }

    /// Registers a user and opens a session for them
    ///
    /// # Errors
    ///
    /// - `BadRequest` when asking for the admin role without the admin token
    /// - `ConflictEmail` when the email is taken
    pub async fn sign_up(&self, input: SignUp) -> AppResult<(User, Session)> {
        if input.role == Role::Admin
            && input.admin_token.as_deref() != Some(self.settings.admin_token.as_str())
        {
            warn!(email = %input.email, "Admin sign-up with invalid secret token");
            return Err(AppError::bad_request("invalid secret_token"));
        }

        match self.users.get_user_by_email(&input.email).await {
            Ok(_) => return Err(AppError::ConflictEmail),
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => return Err(e.wrap("auth.usecase.sign_up")),
        }

        let password = hash_password(&input.password).context("auth.usecase.sign_up")?;

        let user = self
            .users
            .create_user(CreateUser {
                name: input.name,
                email: input.email,
                about: input.about,
                role: input.role,
                password,
            })
            .await
            .context("auth.usecase.sign_up")?;

        let session = self.open_session(user.id).await.context("auth.usecase.sign_up")?;

        info!(user_id = user.id, role = %user.role, "User signed up");
        Ok((user.without_password(), session))
    }

    /// # Errors
    ///
    /// - `NotFound` when no user has this email
    /// - `InvalidPassword` when the password does not match
    pub async fn sign_in(&self, email: &str, password: &str) -> AppResult<(User, Session)> {
        let user = self
            .users
            .get_user_by_email(email)
            .await
            .context("auth.usecase.sign_in")?;

        if !verify_password(password, &user.password).context("auth.usecase.sign_in")? {
            warn!(user_id = user.id, "Sign-in with wrong password");
            return Err(AppError::InvalidPassword);
        }

        let session = self.open_session(user.id).await.context("auth.usecase.sign_in")?;

        info!(user_id = user.id, "User signed in");
        Ok((user.without_password(), session))
    }

    /// Resolves a session token to its user
    pub async fn auth(&self, token: &str) -> AppResult<User> {
        let user_id = self
            .sessions
            .get_user_id(token)
            .await
            .context("auth.usecase.auth")?;

        let user = self.users.get_user(user_id).await.context("auth.usecase.auth")?;
        Ok(user.without_password())
    }

    pub async fn logout(&self, token: &str) -> AppResult<()> {
        let user_id = self
            .sessions
            .get_user_id(token)
            .await
            .context("auth.usecase.logout")?;

        self.sessions
            .delete_session(token)
            .await
            .context("auth.usecase.logout")?;

        info!(user_id, "User logged out");
        Ok(())
    }

    async fn open_session(&self, user_id: i64) -> AppResult<Session> {
        let session = Session::new(user_id, self.settings.session_max_age);
        self.sessions.create_session(&session).await?;
        Ok(session)
    }
}
