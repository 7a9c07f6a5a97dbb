//! AI-generated budget analyses, one per user and period.

use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, Period};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AiAnalysis {
    pub id: String,
    pub user_id: String,
    pub period: Period,
    pub analysis: serde_json::Value,
}

impl AiAnalysis {
    pub fn new(user_id: String, period: Period, analysis: serde_json::Value) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            user_id,
            period,
            analysis,
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "ai_analyses")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub user_id: String,
    pub period: String,
    pub analysis: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl TryFrom<&AiAnalysis> for ActiveModel {
    type Error = EngineError;

    fn try_from(analysis: &AiAnalysis) -> Result<Self, Self::Error> {
        let payload = serde_json::to_string(&analysis.analysis)
            .map_err(|_| EngineError::InvalidField("analysis payload".to_string()))?;

        Ok(Self {
            id: ActiveValue::Set(analysis.id.clone()),
            user_id: ActiveValue::Set(analysis.user_id.clone()),
            period: ActiveValue::Set(analysis.period.label()),
            analysis: ActiveValue::Set(payload),
        })
    }
}

impl TryFrom<Model> for AiAnalysis {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        let analysis = serde_json::from_str(&model.analysis)
            .map_err(|_| EngineError::InvalidField("analysis payload".to_string()))?;

        Ok(Self {
            id: model.id,
            user_id: model.user_id,
            period: Period::parse(&model.period)?,
            analysis,
        })
    }
}
