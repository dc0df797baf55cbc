/// In-process implementation of every storage trait
///
/// Mirrors the constraints the PostgreSQL schema enforces (unique emails,
/// unique friend edges, unique tag links) and the ordering of its listings,
/// so usecases behave the same against it. Used by the test suites and for
/// running the API without external services.

use super::{
    CacheStorage, EntryRepository, FriendRepository, GoalRepository, ProjectRepository,
    SessionRepository, TagRepository, UserRepository,
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
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

#[derive(Default)]
struct State {
    last_id: i64,
    users: BTreeMap<i64, User>,
    /// (subscriber_id, user_id)
    friends: BTreeSet<(i64, i64)>,
    entries: BTreeMap<i64, Entry>,
    tags: BTreeMap<i64, Tag>,
    /// (entry_id, tag_id)
    tag_links: BTreeSet<(i64, i64)>,
    goals: BTreeMap<i64, Goal>,
    projects: BTreeMap<i64, Project>,
    sessions: HashMap<String, SessionRow>,
    cache: HashMap<String, Vec<u8>>,
}

impl State {
    fn next_id(&mut self) -> i64 {
        self.last_id += 1;
        self.last_id
    }
}

#[derive(Default)]
pub struct MemoryRepository {
    state: RwLock<State>,
    friend_checks: AtomicUsize,
    writes: AtomicUsize,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of directed edge lookups served so far
    pub fn friend_checks(&self) -> usize {
        self.friend_checks.load(Ordering::SeqCst)
    }

    /// Number of successful mutations so far, cache writes excluded
    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    pub fn has_session(&self, token: &str) -> bool {
        self.read().map(|s| s.sessions.contains_key(token)).unwrap_or(false)
    }

    pub fn cached(&self, key: &str) -> Option<Vec<u8>> {
        self.read().ok()?.cache.get(key).cloned()
    }

    fn read(&self) -> AppResult<RwLockReadGuard<'_, State>> {
        self.state
            .read()
            .map_err(|_| AppError::Internal("memory store lock poisoned".to_string()))
    }

    fn write(&self) -> AppResult<RwLockWriteGuard<'_, State>> {
        self.state
            .write()
            .map_err(|_| AppError::Internal("memory store lock poisoned".to_string()))
    }

    fn wrote(&self) {
        self.writes.fetch_add(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl UserRepository for MemoryRepository {
    async fn create_user(&self, data: CreateUser) -> AppResult<User> {
        let mut state = self.write()?;
        if state.users.values().any(|u| u.email == data.email) {
            return Err(AppError::ConflictEmail);
        }

        let user = User {
            id: state.next_id(),
            name: data.name,
            email: data.email,
            about: data.about,
            role: data.role,
            password: data.password,
        };
        state.users.insert(user.id, user.clone());
        self.wrote();
        Ok(user)
    }

    async fn get_user(&self, id: i64) -> AppResult<User> {
        self.read()?.users.get(&id).cloned().ok_or(AppError::NotFound)
    }

    async fn get_user_by_email(&self, email: &str) -> AppResult<User> {
        self.read()?
            .users
            .values()
            .find(|u| u.email == email)
            .cloned()
            .ok_or(AppError::NotFound)
    }

    async fn get_users_by_ids(&self, ids: &[i64]) -> AppResult<Vec<User>> {
        let state = self.read()?;
        Ok(state
            .users
            .values()
            .filter(|u| ids.contains(&u.id))
            .cloned()
            .collect())
    }

    async fn get_all_users(&self) -> AppResult<Vec<User>> {
        Ok(self.read()?.users.values().cloned().collect())
    }

    async fn update_user(&self, id: i64, data: UpdateUser) -> AppResult<User> {
        let mut state = self.write()?;
        if let Some(email) = &data.email {
            if state.users.values().any(|u| u.id != id && &u.email == email) {
                return Err(AppError::ConflictEmail);
            }
        }

        let user = state.users.get_mut(&id).ok_or(AppError::NotFound)?;
        if let Some(name) = data.name {
            user.name = name;
        }
        if let Some(email) = data.email {
            user.email = email;
        }
        if let Some(about) = data.about {
            user.about = about;
        }
        if let Some(password) = data.password {
            user.password = password;
        }
        let user = user.clone();
        self.wrote();
        Ok(user)
    }
}

#[async_trait]
impl FriendRepository for MemoryRepository {
    async fn check_friends(&self, rel: FriendRelation) -> AppResult<bool> {
        self.friend_checks.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .read()?
            .friends
            .contains(&(rel.subscriber_id, rel.user_id)))
    }

    async fn create_friend_relation(&self, rel: FriendRelation) -> AppResult<()> {
        if !self.write()?.friends.insert((rel.subscriber_id, rel.user_id)) {
            return Err(AppError::ConflictFriend);
        }
        self.wrote();
        Ok(())
    }

    async fn delete_friend_relation(&self, rel: FriendRelation) -> AppResult<()> {
        if !self.write()?.friends.remove(&(rel.subscriber_id, rel.user_id)) {
            return Err(AppError::NotFound);
        }
        self.wrote();
        Ok(())
    }

    async fn get_user_friends(&self, user_id: i64) -> AppResult<Vec<i64>> {
        let state = self.read()?;
        Ok(state
            .friends
            .iter()
            .filter(|(sub, user)| *user == user_id && state.friends.contains(&(user_id, *sub)))
            .map(|(sub, _)| *sub)
            .collect())
    }

    async fn get_user_subs(&self, user_id: i64) -> AppResult<Vec<i64>> {
        let state = self.read()?;
        Ok(state
            .friends
            .iter()
            .filter(|(sub, user)| *user == user_id && !state.friends.contains(&(user_id, *sub)))
            .map(|(sub, _)| *sub)
            .collect())
    }
}

fn sorted_by_start(mut entries: Vec<Entry>) -> Vec<Entry> {
    entries.sort_by_key(|e| e.time_start);
    entries
}

#[async_trait]
impl EntryRepository for MemoryRepository {
    async fn create_entry(&self, user_id: i64, data: &EntryInput) -> AppResult<Entry> {
        let mut state = self.write()?;
        let entry = Entry {
            id: state.next_id(),
            user_id,
            project_id: data.project_id,
            description: data.description.clone(),
            time_start: data.time_start,
            time_end: data.time_end,
            tag_list: Vec::new(),
        };
        state.entries.insert(entry.id, entry.clone());
        self.wrote();
        Ok(entry)
    }

    async fn get_entry(&self, id: i64) -> AppResult<Entry> {
        self.read()?.entries.get(&id).cloned().ok_or(AppError::NotFound)
    }

    async fn update_entry(&self, id: i64, data: &EntryInput) -> AppResult<Entry> {
        let mut state = self.write()?;
        let entry = state.entries.get_mut(&id).ok_or(AppError::NotFound)?;
        entry.project_id = data.project_id;
        entry.description = data.description.clone();
        entry.time_start = data.time_start;
        entry.time_end = data.time_end;
        let entry = entry.clone();
        self.wrote();
        Ok(entry)
    }

    async fn delete_entry(&self, id: i64) -> AppResult<()> {
        self.write()?.entries.remove(&id).ok_or(AppError::NotFound)?;
        self.wrote();
        Ok(())
    }

    async fn get_user_entries(&self, user_id: i64) -> AppResult<Vec<Entry>> {
        let state = self.read()?;
        Ok(sorted_by_start(
            state
                .entries
                .values()
                .filter(|e| e.user_id == user_id)
                .cloned()
                .collect(),
        ))
    }

    async fn get_user_entries_between(
        &self,
        user_id: i64,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> AppResult<Vec<Entry>> {
        let state = self.read()?;
        Ok(sorted_by_start(
            state
                .entries
                .values()
                .filter(|e| e.user_id == user_id && e.time_start >= from && e.time_start <= to)
                .cloned()
                .collect(),
        ))
    }
}

#[async_trait]
impl TagRepository for MemoryRepository {
    async fn create_tag(&self, user_id: i64, data: TagInput) -> AppResult<Tag> {
        let mut state = self.write()?;
        let tag = Tag {
            id: state.next_id(),
            user_id,
            name: data.name,
            about: data.about,
            color: data.color,
        };
        state.tags.insert(tag.id, tag.clone());
        self.wrote();
        Ok(tag)
    }

    async fn get_tag(&self, id: i64) -> AppResult<Tag> {
        self.read()?.tags.get(&id).cloned().ok_or(AppError::NotFound)
    }

    async fn update_tag(&self, id: i64, data: TagInput) -> AppResult<Tag> {
        let mut state = self.write()?;
        let tag = state.tags.get_mut(&id).ok_or(AppError::NotFound)?;
        tag.name = data.name;
        tag.about = data.about;
        tag.color = data.color;
        let tag = tag.clone();
        self.wrote();
        Ok(tag)
    }

    async fn delete_tag(&self, id: i64) -> AppResult<()> {
        self.write()?.tags.remove(&id).ok_or(AppError::NotFound)?;
        self.wrote();
        Ok(())
    }

    async fn get_user_tags(&self, user_id: i64) -> AppResult<Vec<Tag>> {
        let state = self.read()?;
        Ok(state
            .tags
            .values()
            .filter(|t| t.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn get_entry_tag_ids(&self, entry_id: i64) -> AppResult<Vec<i64>> {
        let state = self.read()?;
        Ok(state
            .tag_links
            .iter()
            .filter(|(entry, _)| *entry == entry_id)
            .map(|(_, tag)| *tag)
            .collect())
    }

    async fn create_entry_tags(&self, entry_id: i64, tag_ids: &[i64]) -> AppResult<()> {
        let mut state = self.write()?;
        for tag_id in tag_ids {
            state.tag_links.insert((entry_id, *tag_id));
        }
        self.wrote();
        Ok(())
    }

    async fn delete_entry_tags(&self, entry_id: i64) -> AppResult<()> {
        self.write()?.tag_links.retain(|(entry, _)| *entry != entry_id);
        self.wrote();
        Ok(())
    }

    async fn delete_tag_links(&self, tag_id: i64) -> AppResult<()> {
        self.write()?.tag_links.retain(|(_, tag)| *tag != tag_id);
        self.wrote();
        Ok(())
    }
}

#[async_trait]
impl GoalRepository for MemoryRepository {
    async fn create_goal(&self, user_id: i64, data: GoalInput) -> AppResult<Goal> {
        let mut state = self.write()?;
        let goal = Goal {
            id: state.next_id(),
            user_id,
            name: data.name,
            project_id: data.project_id,
            hours_count: data.hours_count,
            description: data.description,
            time_start: data.time_start,
            time_end: data.time_end,
        };
        state.goals.insert(goal.id, goal.clone());
        self.wrote();
        Ok(goal)
    }

    async fn get_goal(&self, id: i64) -> AppResult<Goal> {
        self.read()?.goals.get(&id).cloned().ok_or(AppError::NotFound)
    }

    async fn update_goal(&self, id: i64, data: GoalInput) -> AppResult<Goal> {
        let mut state = self.write()?;
        let goal = state.goals.get_mut(&id).ok_or(AppError::NotFound)?;
        goal.name = data.name;
        goal.project_id = data.project_id;
        goal.hours_count = data.hours_count;
        goal.description = data.description;
        goal.time_start = data.time_start;
        goal.time_end = data.time_end;
        let goal = goal.clone();
        self.wrote();
        Ok(goal)
    }

    async fn delete_goal(&self, id: i64) -> AppResult<()> {
        self.write()?.goals.remove(&id).ok_or(AppError::NotFound)?;
        self.wrote();
        Ok(())
    }

    async fn get_user_goals(&self, user_id: i64) -> AppResult<Vec<Goal>> {
        let state = self.read()?;
        Ok(state
            .goals
            .values()
            .filter(|g| g.user_id == user_id)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl ProjectRepository for MemoryRepository {
    async fn create_project(&self, user_id: i64, data: ProjectInput) -> AppResult<Project> {
        let mut state = self.write()?;
        let project = Project {
            id: state.next_id(),
            user_id,
            name: data.name,
            about: data.about,
            color: data.color,
            is_private: data.is_private,
            total_count_hours: data.total_count_hours,
        };
        state.projects.insert(project.id, project.clone());
        self.wrote();
        Ok(project)
    }

    async fn get_project(&self, id: i64) -> AppResult<Project> {
        self.read()?.projects.get(&id).cloned().ok_or(AppError::NotFound)
    }

    async fn update_project(&self, id: i64, data: ProjectInput) -> AppResult<Project> {
        let mut state = self.write()?;
        let project = state.projects.get_mut(&id).ok_or(AppError::NotFound)?;
        project.name = data.name;
        project.about = data.about;
        project.color = data.color;
        project.is_private = data.is_private;
        project.total_count_hours = data.total_count_hours;
        let project = project.clone();
        self.wrote();
        Ok(project)
    }

    async fn delete_project(&self, id: i64) -> AppResult<()> {
        self.write()?.projects.remove(&id).ok_or(AppError::NotFound)?;
        self.wrote();
        Ok(())
    }

    async fn get_user_projects(&self, user_id: i64) -> AppResult<Vec<Project>> {
        let state = self.read()?;
        Ok(state
            .projects
            .values()
            .filter(|p| p.user_id == user_id)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl SessionRepository for MemoryRepository {
    async fn create_session(&self, session: &Session) -> AppResult<()> {
        let row = SessionRow {
            session_token: session.token.clone(),
            user_id: session.user_id,
            expire_time: Utc::now() + session.max_age,
        };
        self.write()?.sessions.insert(session.token.clone(), row);
        self.wrote();
        Ok(())
    }

    async fn get_user_id(&self, token: &str) -> AppResult<i64> {
        let mut state = self.write()?;
        let row = state.sessions.get(token).ok_or(AppError::NotFound)?;

        if row.is_expired_at(Utc::now()) {
            state.sessions.remove(token);
            return Err(AppError::NotFound);
        }
        Ok(row.user_id)
    }

    async fn delete_session(&self, token: &str) -> AppResult<()> {
        self.write()?.sessions.remove(token).ok_or(AppError::NotFound)?;
        self.wrote();
        Ok(())
    }
}

#[async_trait]
impl CacheStorage for MemoryRepository {
    async fn get(&self, key: &str) -> AppResult<Option<Vec<u8>>> {
        Ok(self.read()?.cache.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &[u8]) -> AppResult<()> {
        self.write()?.cache.insert(key.to_string(), value.to_vec());
        Ok(())
    }

    async fn delete(&self, key: &str) -> AppResult<()> {
        self.write()?.cache.remove(key);
        Ok(())
    }
}
