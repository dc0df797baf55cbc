/// Business rules
///
/// Each usecase holds the repositories it needs as trait objects. Handlers
/// pass in the acting [`Principal`](crate::auth::acl::Principal) where an
/// owner-or-admin rule applies; friends-or-admin and admin-only rules on
/// listings are applied before the usecase is called.

pub mod auth;
pub mod entry;
pub mod friends;
pub mod goal;
pub mod project;
pub mod tag;
pub mod user;

use crate::repository::{
    memory::MemoryRepository, postgres::PgRepository, CacheStorage, EntryRepository,
    FriendRepository, GoalRepository, ProjectRepository, SessionRepository, TagRepository,
    UserRepository,
};
use sqlx::PgPool;
use std::sync::Arc;

pub use self::auth::{AuthSettings, AuthUsecase};
pub use self::entry::EntryUsecase;
pub use self::friends::FriendsUsecase;
pub use self::goal::GoalUsecase;
pub use self::project::ProjectUsecase;
pub use self::tag::TagUsecase;
pub use self::user::UserUsecase;

/// Every storage collaborator, as trait objects
#[derive(Clone)]
pub struct Repositories {
    pub users: Arc<dyn UserRepository>,
    pub friends: Arc<dyn FriendRepository>,
    pub entries: Arc<dyn EntryRepository>,
    pub tags: Arc<dyn TagRepository>,
    pub goals: Arc<dyn GoalRepository>,
    pub projects: Arc<dyn ProjectRepository>,
    pub sessions: Arc<dyn SessionRepository>,
    pub cache: Arc<dyn CacheStorage>,
}

impl Repositories {
    /// Relational storage for everything except sessions and the cache
    pub fn postgres(
        pool: PgPool,
        sessions: Arc<dyn SessionRepository>,
        cache: Arc<dyn CacheStorage>,
    ) -> Self {
        let pg = Arc::new(PgRepository::new(pool));

        Self {
            users: pg.clone(),
            friends: pg.clone(),
            entries: pg.clone(),
            tags: pg.clone(),
            goals: pg.clone(),
            projects: pg,
            sessions,
            cache,
        }
    }

    /// Every collaborator served by one in-process store
    pub fn memory(repo: Arc<MemoryRepository>) -> Self {
        Self {
            users: repo.clone(),
            friends: repo.clone(),
            entries: repo.clone(),
            tags: repo.clone(),
            goals: repo.clone(),
            projects: repo.clone(),
            sessions: repo.clone(),
            cache: repo,
        }
    }
}

/// All usecases, wired to one set of repositories
#[derive(Clone)]
pub struct Usecases {
    pub auth: AuthUsecase,
    pub users: UserUsecase,
    pub friends: FriendsUsecase,
    pub entries: EntryUsecase,
    pub tags: TagUsecase,
    pub goals: GoalUsecase,
    pub projects: ProjectUsecase,
}

impl Usecases {
    pub fn new(repos: Repositories, settings: AuthSettings) -> Self {
        Self {
            auth: AuthUsecase::new(repos.users.clone(), repos.sessions, settings),
            users: UserUsecase::new(repos.users.clone()),
            friends: FriendsUsecase::new(repos.friends, repos.users),
            entries: EntryUsecase::new(repos.entries, repos.tags.clone()),
            tags: TagUsecase::new(repos.tags),
            goals: GoalUsecase::new(repos.goals),
            projects: ProjectUsecase::new(repos.projects, repos.cache),
        }
    }
}
