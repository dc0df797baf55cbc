/// Projects, with a per-owner cache of the project listing
///
/// The cache key is the owner's id as a decimal string and the value is the
/// JSON-encoded `Vec<Project>`. Every write evicts the owner's key. The cache
/// is advisory: read, write and eviction failures are logged and the request
/// falls through to the database.

use crate::auth::acl::{require_owner_or_admin, Principal};
use crate::error::{AppResult, ResultExt};
use crate::models::project::{Project, ProjectInput};
use crate::repository::{CacheStorage, ProjectRepository};
use std::sync::Arc;
use tracing::{debug, info, warn};

#[derive(Clone)]
pub struct ProjectUsecase {
    projects: Arc<dyn ProjectRepository>,
    cache: Arc<dyn CacheStorage>,
}

fn cache_key(user_id: i64) -> String {
    user_id.to_string()
}

impl ProjectUsecase {
    pub fn new(projects: Arc<dyn ProjectRepository>, cache: Arc<dyn CacheStorage>) -> Self {
        Self { projects, cache }
    }

    pub async fn create_project(
        &self,
        principal: &Principal,
        input: ProjectInput,
    ) -> AppResult<Project> {
        let project = self
            .projects
            .create_project(principal.id, input)
            .await
            .context("project.usecase.create_project")?;

        self.evict(project.user_id).await;

        info!(project_id = project.id, user_id = project.user_id, "Project created");
        Ok(project)
    }

    pub async fn get_project(&self, principal: &Principal, id: i64) -> AppResult<Project> {
        let project = self
            .projects
            .get_project(id)
            .await
            .context("project.usecase.get_project")?;

        require_owner_or_admin(principal, project.user_id)?;
        Ok(project)
    }

    pub async fn update_project(
        &self,
        principal: &Principal,
        id: i64,
        input: ProjectInput,
    ) -> AppResult<Project> {
        let existing = self.get_project(principal, id).await?;

        let project = self
            .projects
            .update_project(id, input)
            .await
            .context("project.usecase.update_project")?;

        self.evict(existing.user_id).await;
        Ok(project)
    }

    pub async fn delete_project(&self, principal: &Principal, id: i64) -> AppResult<()> {
        let existing = self.get_project(principal, id).await?;

        self.projects
            .delete_project(id)
            .await
            .context("project.usecase.delete_project")?;

        self.evict(existing.user_id).await;

        info!(project_id = id, user_id = principal.id, "Project deleted");
        Ok(())
    }

    /// Uncached listing
    pub async fn get_user_projects(&self, user_id: i64) -> AppResult<Vec<Project>> {
        self.projects
            .get_user_projects(user_id)
            .await
            .context("project.usecase.get_user_projects")
    }

    /// Listing served from the cache when present, filled on a miss
    pub async fn get_user_projects_with_cache(&self, user_id: i64) -> AppResult<Vec<Project>> {
        let key = cache_key(user_id);

        match self.cache.get(&key).await {
            Ok(Some(raw)) => match serde_json::from_slice::<Vec<Project>>(&raw) {
                Ok(projects) => {
                    debug!(user_id, "Project listing served from cache");
                    return Ok(projects);
                }
                Err(e) => warn!(user_id, error = %e, "Discarding undecodable cached projects"),
            },
            Ok(None) => {}
            Err(e) => warn!(user_id, error = %e.chain(), "Project cache read failed"),
        }

        let projects = self
            .get_user_projects(user_id)
            .await
            .context("project.usecase.get_user_projects_with_cache")?;

        let payload = serde_json::to_vec(&projects)
            .context("project.usecase.get_user_projects_with_cache")?;

        if let Err(e) = self.cache.set(&key, &payload).await {
            warn!(user_id, error = %e.chain(), "Project cache write failed");
        }

        Ok(projects)
    }

    async fn evict(&self, user_id: i64) {
        if let Err(e) = self.cache.delete(&cache_key(user_id)).await {
            warn!(user_id, error = %e.chain(), "Project cache eviction failed");
        }
    }
}
