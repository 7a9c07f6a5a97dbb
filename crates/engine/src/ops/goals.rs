//! Budget goals operations (one document per user, upsert semantics).

use sea_orm::{ActiveValue, QueryFilter, prelude::*};

use crate::util::require_json_keys;
use crate::{BudgetGoals, EngineError, ResultEngine, budget_goals};

use super::Engine;

const REQUIRED_GOAL_KEYS: &[&str] = &[
    "summary",
    "averageMonthlyIncome",
    "categoryGoals",
    "idealBudgetBreakdown",
];

impl Engine {
    pub async fn budget_goals(&self, user_id: &str) -> ResultEngine<BudgetGoals> {
        let model = budget_goals::Entity::find()
            .filter(budget_goals::Column::UserId.eq(user_id))
            .one(&self.database)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("budget goals not exists".to_string()))?;

        BudgetGoals::try_from(model)
    }

    /// Create or replace the user's goals. Returns the stored document and
    /// whether it was newly created.
    pub async fn upsert_budget_goals(
        &self,
        user_id: &str,
        goals: serde_json::Value,
    ) -> ResultEngine<(BudgetGoals, bool)> {
        require_json_keys(&goals, REQUIRED_GOAL_KEYS, "goals")?;

        let existing = budget_goals::Entity::find()
            .filter(budget_goals::Column::UserId.eq(user_id))
            .one(&self.database)
            .await?;

        match existing {
            Some(model) => {
                let updated = BudgetGoals {
                    id: model.id.clone(),
                    user_id: model.user_id,
                    goals,
                };
                let payload = serde_json::to_string(&updated.goals)
                    .map_err(|_| EngineError::InvalidField("goals payload".to_string()))?;
                budget_goals::ActiveModel {
                    id: ActiveValue::Set(model.id),
                    goals: ActiveValue::Set(payload),
                    ..Default::default()
                }
                .update(&self.database)
                .await?;
                Ok((updated, false))
            }
            None => {
                let created = BudgetGoals::new(user_id.to_string(), goals);
                budget_goals::ActiveModel::try_from(&created)?
                    .insert(&self.database)
                    .await?;
                Ok((created, true))
            }
        }
    }

    pub async fn delete_budget_goals(&self, user_id: &str) -> ResultEngine<()> {
        let model = budget_goals::Entity::find()
            .filter(budget_goals::Column::UserId.eq(user_id))
            .one(&self.database)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("budget goals not exists".to_string()))?;

        budget_goals::Entity::delete_by_id(model.id)
            .exec(&self.database)
            .await?;
        Ok(())
    }
}
