//! Category operations.

use sea_orm::{QueryFilter, QueryOrder, prelude::*};

use crate::util::{normalize_name, validate_color};
use crate::{Category, EngineError, ResultEngine, TransactionKind, categories};

use super::Engine;

impl Engine {
    pub async fn list_categories(&self, user_id: &str) -> ResultEngine<Vec<Category>> {
        let models = categories::Entity::find()
            .filter(categories::Column::UserId.eq(user_id))
            .order_by_asc(categories::Column::Name)
            .all(&self.database)
            .await?;

        models.into_iter().map(Category::try_from).collect()
    }

    pub async fn categories_by_kind(
        &self,
        user_id: &str,
        kind: TransactionKind,
    ) -> ResultEngine<Vec<Category>> {
        let models = categories::Entity::find()
            .filter(categories::Column::UserId.eq(user_id))
            .filter(categories::Column::Kind.eq(kind.as_str()))
            .order_by_asc(categories::Column::Name)
            .all(&self.database)
            .await?;

        models.into_iter().map(Category::try_from).collect()
    }

    pub async fn create_category(
        &self,
        user_id: &str,
        name: &str,
        kind: TransactionKind,
        color: &str,
    ) -> ResultEngine<Category> {
        let name = normalize_name(name, "category name", 2, 30)?;
        validate_color(color)?;
        self.ensure_category_name_free(user_id, &name, None).await?;

        let category = Category::new(user_id.to_string(), name, kind, color.to_string());
        categories::ActiveModel::from(&category)
            .insert(&self.database)
            .await?;
        Ok(category)
    }

    pub async fn update_category(
        &self,
        user_id: &str,
        category_id: &str,
        name: &str,
        kind: TransactionKind,
        color: &str,
    ) -> ResultEngine<Category> {
        let model = self.require_category(user_id, category_id).await?;

        let name = normalize_name(name, "category name", 2, 30)?;
        validate_color(color)?;
        self.ensure_category_name_free(user_id, &name, Some(&model.id))
            .await?;

        let updated = Category {
            id: model.id,
            user_id: model.user_id,
            name,
            kind,
            color: color.to_string(),
        };
        categories::ActiveModel::from(&updated)
            .update(&self.database)
            .await?;
        Ok(updated)
    }

    pub async fn delete_category(&self, user_id: &str, category_id: &str) -> ResultEngine<()> {
        let model = self.require_category(user_id, category_id).await?;
        categories::Entity::delete_by_id(model.id)
            .exec(&self.database)
            .await?;
        Ok(())
    }

    /// Category lookup scoped to the owning user.
    pub(super) async fn require_category(
        &self,
        user_id: &str,
        category_id: &str,
    ) -> ResultEngine<categories::Model> {
        categories::Entity::find_by_id(category_id)
            .filter(categories::Column::UserId.eq(user_id))
            .one(&self.database)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("category not exists".to_string()))
    }

    /// Name uniqueness is case-insensitive per user.
    async fn ensure_category_name_free(
        &self,
        user_id: &str,
        name: &str,
        exclude_id: Option<&str>,
    ) -> ResultEngine<()> {
        let models = categories::Entity::find()
            .filter(categories::Column::UserId.eq(user_id))
            .all(&self.database)
            .await?;

        let clash = models.iter().any(|model| {
            exclude_id != Some(model.id.as_str()) && model.name.eq_ignore_ascii_case(name)
        });
        if clash {
            return Err(EngineError::ExistingKey(name.to_string()));
        }
        Ok(())
    }
}
