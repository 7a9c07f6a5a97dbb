//! Budget goals, one document per user.
//!
//! The goals payload is produced by the analysis frontend and stored
//! opaquely as JSON text; the engine only checks its required keys.

use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::EngineError;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BudgetGoals {
    pub id: String,
    pub user_id: String,
    pub goals: serde_json::Value,
}

impl BudgetGoals {
    pub fn new(user_id: String, goals: serde_json::Value) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            user_id,
            goals,
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "budget_goals")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub user_id: String,
    pub goals: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl TryFrom<&BudgetGoals> for ActiveModel {
    type Error = EngineError;

    fn try_from(goals: &BudgetGoals) -> Result<Self, Self::Error> {
        let payload = serde_json::to_string(&goals.goals)
            .map_err(|_| EngineError::InvalidField("goals payload".to_string()))?;

        Ok(Self {
            id: ActiveValue::Set(goals.id.clone()),
            user_id: ActiveValue::Set(goals.user_id.clone()),
            goals: ActiveValue::Set(payload),
        })
    }
}

impl TryFrom<Model> for BudgetGoals {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        let goals = serde_json::from_str(&model.goals)
            .map_err(|_| EngineError::InvalidField("goals payload".to_string()))?;

        Ok(Self {
            id: model.id,
            user_id: model.user_id,
            goals,
        })
    }
}
