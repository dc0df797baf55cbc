/// Domain error type shared by repositories and usecases
///
/// Repositories wrap driver failures with a short context message and
/// usecases either pass them through or replace them with one of the
/// business-rule variants. The HTTP layer only ever looks at
/// [`AppError::kind`], which unwraps every context layer and reports the
/// root cause.
///
/// # Example
///
/// ```
/// use timetracker_shared::error::{AppError, ErrorKind, ResultExt};
///
/// let res: Result<(), AppError> = Err(AppError::NotFound);
/// let err = res.context("entry.usecase.get_entry").unwrap_err();
///
/// assert_eq!(err.kind(), ErrorKind::NotFound);
/// assert_eq!(err.chain(), "entry.usecase.get_entry: not found");
/// ```

use crate::auth::password::PasswordError;
use crate::redis::client::RedisClientError;
use thiserror::Error;

/// Result alias used across the shared crate
pub type AppResult<T> = Result<T, AppError>;

/// Root classification of an [`AppError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    BadRequest,
    PermissionDenied,
    Conflict,
    InvalidPassword,
    Internal,
}

#[derive(Debug, Error)]
pub enum AppError {
    /// Referenced record or session does not exist
    #[error("not found")]
    NotFound,

    /// Malformed or self-referential request
    #[error("bad request: {0}")]
    BadRequest(String),

    /// Ownership, role or friendship check failed
    #[error("permission denied")]
    PermissionDenied,

    /// Sign-up with an email that is already registered
    #[error("user with this email already exists")]
    ConflictEmail,

    /// Subscribe to a user that is already followed
    #[error("friend relation already exists")]
    ConflictFriend,

    /// Credential mismatch at sign-in
    #[error("invalid password")]
    InvalidPassword,

    /// Anything else that must not leak to clients
    #[error("internal error: {0}")]
    Internal(String),

    #[error(transparent)]
    Database(#[from] sqlx::Error),

    #[error(transparent)]
    Redis(#[from] RedisClientError),

    #[error(transparent)]
    Password(#[from] PasswordError),

    #[error(transparent)]
    Serialization(#[from] serde_json::Error),

    /// Another error wrapped with a message describing where it happened
    #[error("{context}")]
    Context {
        context: String,
        #[source]
        source: Box<AppError>,
    },
}

impl AppError {
    /// Shorthand for [`AppError::BadRequest`]
    pub fn bad_request(msg: impl Into<String>) -> Self {
        AppError::BadRequest(msg.into())
    }

    /// Wraps `self` with a context message
    pub fn wrap(self, context: impl Into<String>) -> Self {
        AppError::Context {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// Returns the innermost error, skipping every context layer
    pub fn root(&self) -> &AppError {
        match self {
            AppError::Context { source, .. } => source.root(),
            other => other,
        }
    }

    /// Classifies the root cause
    pub fn kind(&self) -> ErrorKind {
        match self.root() {
            AppError::NotFound | AppError::Database(sqlx::Error::RowNotFound) => ErrorKind::NotFound,
            AppError::BadRequest(_) => ErrorKind::BadRequest,
            AppError::PermissionDenied => ErrorKind::PermissionDenied,
            AppError::ConflictEmail | AppError::ConflictFriend => ErrorKind::Conflict,
            AppError::InvalidPassword => ErrorKind::InvalidPassword,
            _ => ErrorKind::Internal,
        }
    }

    /// Renders the whole wrapped chain as `outer: inner: root`
    pub fn chain(&self) -> String {
        let mut out = self.to_string();
        let mut current: Option<&(dyn std::error::Error + 'static)> =
            std::error::Error::source(self);

        while let Some(err) = current {
            out.push_str(": ");
            out.push_str(&err.to_string());
            current = err.source();
        }

        out
    }
}

/// Adds context to any result whose error converts into [`AppError`]
pub trait ResultExt<T> {
    fn context(self, context: impl Into<String>) -> AppResult<T>;
}

impl<T, E> ResultExt<T> for Result<T, E>
where
    E: Into<AppError>,
{
    fn context(self, context: impl Into<String>) -> AppResult<T> {
        self.map_err(|e| e.into().wrap(context))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_unwraps_context() {
        let err = AppError::PermissionDenied
            .wrap("usecase")
            .wrap("handler");

        assert_eq!(err.kind(), ErrorKind::PermissionDenied);
        assert!(matches!(err.root(), AppError::PermissionDenied));
    }

    #[test]
    fn test_row_not_found_is_not_found() {
        let err = AppError::from(sqlx::Error::RowNotFound).wrap("database error (table entry)");
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[test]
    fn test_conflicts_share_a_kind() {
        assert_eq!(AppError::ConflictEmail.kind(), ErrorKind::Conflict);
        assert_eq!(AppError::ConflictFriend.kind(), ErrorKind::Conflict);
    }

    #[test]
    fn test_other_database_errors_are_internal() {
        let err = AppError::from(sqlx::Error::PoolTimedOut);
        assert_eq!(err.kind(), ErrorKind::Internal);
    }

    #[test]
    fn test_chain_lists_every_layer() {
        let res: Result<(), AppError> = Err(AppError::InvalidPassword);
        let err = res.context("auth.usecase.sign_in").unwrap_err();

        assert_eq!(err.chain(), "auth.usecase.sign_in: invalid password");
        assert_eq!(err.kind(), ErrorKind::InvalidPassword);
    }
}
