//! AI analysis operations, keyed by user and period.

use sea_orm::{ActiveValue, PaginatorTrait, QueryFilter, QueryOrder, prelude::*};

use crate::util::require_json_keys;
use crate::{AiAnalysis, EngineError, Period, ResultEngine, ai_analyses};

use super::Engine;

const REQUIRED_ANALYSIS_KEYS: &[&str] =
    &["summary", "insights", "suggestions", "riskLevel", "score"];

/// One page of analyses plus the overall count.
#[derive(Clone, Debug)]
pub struct AnalysisPage {
    pub analyses: Vec<AiAnalysis>,
    pub page: u64,
    pub limit: u64,
    pub total: u64,
}

impl Engine {
    /// Newest periods first.
    pub async fn list_analyses(
        &self,
        user_id: &str,
        page: u64,
        limit: u64,
    ) -> ResultEngine<AnalysisPage> {
        let page = page.max(1);
        let limit = limit.clamp(1, 100);

        let paginator = ai_analyses::Entity::find()
            .filter(ai_analyses::Column::UserId.eq(user_id))
            .order_by_desc(ai_analyses::Column::Period)
            .paginate(&self.database, limit);
        let total = paginator.num_items().await?;
        let models = paginator.fetch_page(page - 1).await?;
        let analyses = models
            .into_iter()
            .map(AiAnalysis::try_from)
            .collect::<ResultEngine<Vec<_>>>()?;

        Ok(AnalysisPage {
            analyses,
            page,
            limit,
            total,
        })
    }

    pub async fn analysis(&self, user_id: &str, period: &str) -> ResultEngine<AiAnalysis> {
        let period = Period::parse(period)?;
        let model = self.find_analysis(user_id, period).await?.ok_or_else(|| {
            EngineError::KeyNotFound("analysis not exists for this period".to_string())
        })?;

        AiAnalysis::try_from(model)
    }

    /// Create or replace the analysis of one period. Returns the stored
    /// document and whether it was newly created.
    pub async fn upsert_analysis(
        &self,
        user_id: &str,
        period: &str,
        analysis: serde_json::Value,
    ) -> ResultEngine<(AiAnalysis, bool)> {
        let period = Period::parse(period)?;
        require_json_keys(&analysis, REQUIRED_ANALYSIS_KEYS, "analysis")?;

        match self.find_analysis(user_id, period).await? {
            Some(model) => {
                let updated = AiAnalysis {
                    id: model.id.clone(),
                    user_id: model.user_id,
                    period,
                    analysis,
                };
                let payload = serde_json::to_string(&updated.analysis)
                    .map_err(|_| EngineError::InvalidField("analysis payload".to_string()))?;
                ai_analyses::ActiveModel {
                    id: ActiveValue::Set(model.id),
                    analysis: ActiveValue::Set(payload),
                    ..Default::default()
                }
                .update(&self.database)
                .await?;
                Ok((updated, false))
            }
            None => {
                let created = AiAnalysis::new(user_id.to_string(), period, analysis);
                ai_analyses::ActiveModel::try_from(&created)?
                    .insert(&self.database)
                    .await?;
                Ok((created, true))
            }
        }
    }

    pub async fn delete_analysis(&self, user_id: &str, period: &str) -> ResultEngine<()> {
        let period = Period::parse(period)?;
        let model = self.find_analysis(user_id, period).await?.ok_or_else(|| {
            EngineError::KeyNotFound("analysis not exists for this period".to_string())
        })?;

        ai_analyses::Entity::delete_by_id(model.id)
            .exec(&self.database)
            .await?;
        Ok(())
    }

    async fn find_analysis(
        &self,
        user_id: &str,
        period: Period,
    ) -> ResultEngine<Option<ai_analyses::Model>> {
        let model = ai_analyses::Entity::find()
            .filter(ai_analyses::Column::UserId.eq(user_id))
            .filter(ai_analyses::Column::Period.eq(period.label()))
            .one(&self.database)
            .await?;
        Ok(model)
    }
}
