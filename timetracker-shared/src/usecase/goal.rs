use crate::auth::acl::{require_owner_or_admin, Principal};
use crate::error::{AppResult, ResultExt};
use crate::models::goal::{Goal, GoalInput};
use crate::repository::GoalRepository;
use std::sync::Arc;
use tracing::info;

/// Goal CRUD with owner-or-admin checks
#[derive(Clone)]
pub struct GoalUsecase {
    goals: Arc<dyn GoalRepository>,
}

impl GoalUsecase {
    pub fn new(goals: Arc<dyn GoalRepository>) -> Self {
        Self { goals }
    }

    pub async fn create_goal(&self, principal: &Principal, input: GoalInput) -> AppResult<Goal> {
        let goal = self
            .goals
            .create_goal(principal.id, input)
            .await
            .context("goal.usecase.create_goal")?;

        info!(goal_id = goal.id, user_id = goal.user_id, "Goal created");
        Ok(goal)
    }

    pub async fn get_goal(&self, principal: &Principal, id: i64) -> AppResult<Goal> {
        let goal = self.goals.get_goal(id).await.context("goal.usecase.get_goal")?;
        require_owner_or_admin(principal, goal.user_id)?;
        Ok(goal)
    }

    pub async fn update_goal(
        &self,
        principal: &Principal,
        id: i64,
        input: GoalInput,
    ) -> AppResult<Goal> {
        self.get_goal(principal, id).await?;

        self.goals
            .update_goal(id, input)
            .await
            .context("goal.usecase.update_goal")
    }

    pub async fn delete_goal(&self, principal: &Principal, id: i64) -> AppResult<()> {
        self.get_goal(principal, id).await?;

        self.goals
            .delete_goal(id)
            .await
            .context("goal.usecase.delete_goal")?;

        info!(goal_id = id, user_id = principal.id, "Goal deleted");
        Ok(())
    }

    pub async fn get_user_goals(&self, user_id: i64) -> AppResult<Vec<Goal>> {
        self.goals
            .get_user_goals(user_id)
            .await
            .context("goal.usecase.get_user_goals")
    }
}
