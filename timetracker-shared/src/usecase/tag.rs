use crate::auth::acl::{require_owner_or_admin, Principal};
use crate::error::{AppResult, ResultExt};
use crate::models::tag::{Tag, TagInput};
use crate::repository::TagRepository;
use std::sync::Arc;
use tracing::info;

/// Tag CRUD with owner-or-admin checks
#[derive(Clone)]
pub struct TagUsecase {
    tags: Arc<dyn TagRepository>,
}

impl TagUsecase {
    pub fn new(tags: Arc<dyn TagRepository>) -> Self {
        Self { tags }
    }

    pub async fn create_tag(&self, principal: &Principal, input: TagInput) -> AppResult<Tag> {
        let tag = self
            .tags
            .create_tag(principal.id, input)
            .await
            .context("tag.usecase.create_tag")?;

        info!(tag_id = tag.id, user_id = tag.user_id, "Tag created");
        Ok(tag)
    }

    pub async fn get_tag(&self, principal: &Principal, id: i64) -> AppResult<Tag> {
        let tag = self.tags.get_tag(id).await.context("tag.usecase.get_tag")?;
        require_owner_or_admin(principal, tag.user_id)?;
        Ok(tag)
    }

    pub async fn update_tag(&self, principal: &Principal, id: i64, input: TagInput) -> AppResult<Tag> {
        self.get_tag(principal, id).await?;

        self.tags
            .update_tag(id, input)
            .await
            .context("tag.usecase.update_tag")
    }

    pub async fn delete_tag(&self, principal: &Principal, id: i64) -> AppResult<()> {
        self.get_tag(principal, id).await?;

        self.tags.delete_tag(id).await.context("tag.usecase.delete_tag")?;
        // entry reads fail on a dangling link
        self.tags
            .delete_tag_links(id)
            .await
            .context("tag.usecase.delete_tag_links")?;

        info!(tag_id = id, user_id = principal.id, "Tag deleted");
        Ok(())
    }

    pub async fn get_user_tags(&self, user_id: i64) -> AppResult<Vec<Tag>> {
        self.tags
            .get_user_tags(user_id)
            .await
            .context("tag.usecase.get_user_tags")
    }
}
