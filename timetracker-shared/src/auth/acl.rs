/// Access-control rules
///
/// Three rules gate every operation on somebody else's data:
///
/// 1. **Owner or admin**: entry, goal, project and tag reads and writes.
/// 2. **Admin only**: listing every user, listing another user's subscribers.
/// 3. **Friends or admin**: viewing another user's entries, goals,
///    projects, tags or friends. Friendship means subscribe edges in both
///    directions, see [`FriendsUsecase::check_is_friends`].
///
/// # Example
///
/// ```
/// use timetracker_shared::auth::acl::{require_owner_or_admin, Principal};
/// use timetracker_shared::models::user::Role;
///
/// let owner = Principal::new(1, Role::User);
/// let stranger = Principal::new(2, Role::User);
/// let admin = Principal::new(3, Role::Admin);
///
/// assert!(require_owner_or_admin(&owner, 1).is_ok());
/// assert!(require_owner_or_admin(&admin, 1).is_ok());
/// assert!(require_owner_or_admin(&stranger, 1).is_err());
/// ```

use crate::error::{AppError, AppResult};
use crate::models::user::{Role, User};
use crate::usecase::friends::FriendsUsecase;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// The authenticated user acting on a request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    pub id: i64,
    pub role: Role,
}

impl Principal {
    pub fn new(id: i64, role: Role) -> Self {
        Self { id, role }
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

impl From<&User> for Principal {
    fn from(user: &User) -> Self {
        Self::new(user.id, user.role)
    }
}

pub fn require_admin(principal: &Principal) -> AppResult<()> {
    if principal.is_admin() {
        return Ok(());
    }

    warn!(user_id = principal.id, "Admin-only access denied");
    Err(AppError::PermissionDenied)
}

pub fn require_owner_or_admin(principal: &Principal, owner_id: i64) -> AppResult<()> {
    if principal.is_admin() || principal.id == owner_id {
        return Ok(());
    }

    warn!(user_id = principal.id, owner_id, "Owner-or-admin access denied");
    Err(AppError::PermissionDenied)
}

/// Admins pass without a lookup; everyone else must be a mutual friend
///
/// A failing friendship check (including asking about oneself) is reported
/// as a bad request, a completed check that finds no mutual friendship as
/// permission denied.
pub async fn require_friends_or_admin(
    principal: &Principal,
    target_id: i64,
    friends: &FriendsUsecase,
) -> AppResult<()> {
    if principal.is_admin() {
        return Ok(());
    }

    let is_friends = friends
        .check_is_friends(principal.id, target_id)
        .await
        .map_err(|e| AppError::bad_request(format!("friendship check failed: {}", e.chain())))?;

    if !is_friends {
        warn!(user_id = principal.id, target_id, "Friends-or-admin access denied");
        return Err(AppError::PermissionDenied);
    }

    Ok(())
}
