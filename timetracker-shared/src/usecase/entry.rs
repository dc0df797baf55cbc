/// Time entries and their tag links
///
/// An entry is returned with its tags resolved. Resolution issues one lookup
/// per linked tag id, and a dangling link fails the whole read with NotFound.

use crate::auth::acl::{require_owner_or_admin, Principal};
use crate::error::{AppResult, ResultExt};
use crate::models::{
    entry::{Entry, EntryInput},
    tag::Tag,
};
use crate::repository::{EntryRepository, TagRepository};
use crate::timespan::day_interval;
use chrono::NaiveDate;
use std::sync::Arc;
use tracing::info;

#[derive(Clone)]
pub struct EntryUsecase {
    entries: Arc<dyn EntryRepository>,
    tags: Arc<dyn TagRepository>,
}

impl EntryUsecase {
    pub fn new(entries: Arc<dyn EntryRepository>, tags: Arc<dyn TagRepository>) -> Self {
        Self { entries, tags }
    }

    /// Persists the entry for the principal, then links the requested tags
    pub async fn create_entry(&self, principal: &Principal, input: EntryInput) -> AppResult<Entry> {
        let mut entry = self
            .entries
            .create_entry(principal.id, &input)
            .await
            .context("entry.usecase.create_entry")?;

        if !input.tag_ids.is_empty() {
            self.tags
                .create_entry_tags(entry.id, &input.tag_ids)
                .await
                .context("entry.usecase.create_entry")?;
        }

        entry.tag_list = self
            .resolve_tags(entry.id)
            .await
            .context("entry.usecase.create_entry")?;

        info!(entry_id = entry.id, user_id = entry.user_id, "Entry created");
        Ok(entry)
    }

    pub async fn get_entry(&self, principal: &Principal, id: i64) -> AppResult<Entry> {
        let mut entry = self
            .entries
            .get_entry(id)
            .await
            .context("entry.usecase.get_entry")?;

        require_owner_or_admin(principal, entry.user_id)?;

        entry.tag_list = self
            .resolve_tags(entry.id)
            .await
            .context("entry.usecase.get_entry")?;

        Ok(entry)
    }

    /// Overwrites the entry's fields; the stored owner never changes
    ///
    /// A non-empty tag list replaces the existing links (delete, then
    /// insert). An empty list leaves the links untouched.
    pub async fn update_entry(
        &self,
        principal: &Principal,
        id: i64,
        input: EntryInput,
    ) -> AppResult<Entry> {
        let existing = self
            .entries
            .get_entry(id)
            .await
            .context("entry.usecase.update_entry")?;

        require_owner_or_admin(principal, existing.user_id)?;

        let mut entry = self
            .entries
            .update_entry(id, &input)
            .await
            .context("entry.usecase.update_entry")?;

        if !input.tag_ids.is_empty() {
            self.tags
                .delete_entry_tags(id)
                .await
                .context("entry.usecase.update_entry")?;
            self.tags
                .create_entry_tags(id, &input.tag_ids)
                .await
                .context("entry.usecase.update_entry")?;
        }

        entry.tag_list = self
            .resolve_tags(id)
            .await
            .context("entry.usecase.update_entry")?;

        info!(entry_id = id, user_id = principal.id, "Entry updated");
        Ok(entry)
    }

    pub async fn delete_entry(&self, principal: &Principal, id: i64) -> AppResult<()> {
        let existing = self
            .entries
            .get_entry(id)
            .await
            .context("entry.usecase.delete_entry")?;

        require_owner_or_admin(principal, existing.user_id)?;

        self.entries
            .delete_entry(id)
            .await
            .context("entry.usecase.delete_entry")?;

        self.tags
            .delete_entry_tags(id)
            .await
            .context("entry.usecase.delete_entry")?;

        info!(entry_id = id, user_id = principal.id, "Entry deleted");
        Ok(())
    }

    /// Lists a user's entries, optionally restricted to one calendar day
    ///
    /// The day filter keeps entries starting inside
    /// `[day 00:00:00, day 23:59:59]` UTC.
    pub async fn get_user_entries(
        &self,
        user_id: i64,
        day: Option<NaiveDate>,
    ) -> AppResult<Vec<Entry>> {
        let mut entries = match day {
            Some(day) => {
                let (from, to) = day_interval(day);
                self.entries.get_user_entries_between(user_id, from, to).await
            }
            None => self.entries.get_user_entries(user_id).await,
        }
        .context("entry.usecase.get_user_entries")?;

        for entry in &mut entries {
            entry.tag_list = self
                .resolve_tags(entry.id)
                .await
                .context("entry.usecase.get_user_entries")?;
        }

        Ok(entries)
    }

    async fn resolve_tags(&self, entry_id: i64) -> AppResult<Vec<Tag>> {
        let ids = self.tags.get_entry_tag_ids(entry_id).await?;

        let mut tags = Vec::with_capacity(ids.len());
        for id in ids {
            tags.push(self.tags.get_tag(id).await?);
        }
        Ok(tags)
    }
}
