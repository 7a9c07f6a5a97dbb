//! Credit card operations.

use sea_orm::{QueryFilter, QueryOrder, prelude::*};

use crate::util::{normalize_name, validate_color};
use crate::{
    CardBrand, CreditCard, CreditCardBill, EngineError, ResultEngine, credit_card_bills,
    credit_cards,
};

use super::Engine;

/// Payload for creating or replacing a card.
#[derive(Clone, Debug)]
pub struct CardDraft {
    pub name: String,
    pub last_four_digits: String,
    pub brand: CardBrand,
    pub limit_minor: i64,
    pub closing_day: u32,
    pub due_day: u32,
    pub color: String,
}

impl Engine {
    pub async fn list_cards(
        &self,
        user_id: &str,
        active: Option<bool>,
    ) -> ResultEngine<Vec<CreditCard>> {
        let mut query = credit_cards::Entity::find()
            .filter(credit_cards::Column::UserId.eq(user_id))
            .order_by_asc(credit_cards::Column::Name);
        if let Some(active) = active {
            query = query.filter(credit_cards::Column::IsActive.eq(active));
        }

        let models = query.all(&self.database).await?;
        models.into_iter().map(CreditCard::try_from).collect()
    }

    pub async fn card(&self, user_id: &str, card_id: &str) -> ResultEngine<CreditCard> {
        let model = self.require_card(user_id, card_id).await?;
        CreditCard::try_from(model)
    }

    pub async fn create_card(&self, user_id: &str, draft: CardDraft) -> ResultEngine<CreditCard> {
        let name = normalize_name(&draft.name, "card name", 2, 30)?;
        validate_color(&draft.color)?;

        let card = CreditCard::new(
            user_id.to_string(),
            name,
            draft.last_four_digits,
            draft.brand,
            draft.limit_minor,
            draft.closing_day,
            draft.due_day,
            draft.color,
        )?;
        credit_cards::ActiveModel::from(&card)
            .insert(&self.database)
            .await?;
        Ok(card)
    }

    pub async fn update_card(
        &self,
        user_id: &str,
        card_id: &str,
        draft: CardDraft,
    ) -> ResultEngine<CreditCard> {
        let model = self.require_card(user_id, card_id).await?;

        let name = normalize_name(&draft.name, "card name", 2, 30)?;
        validate_color(&draft.color)?;

        let updated = CreditCard {
            id: model.id,
            user_id: model.user_id,
            name,
            last_four_digits: draft.last_four_digits,
            brand: draft.brand,
            limit_minor: draft.limit_minor,
            closing_day: draft.closing_day,
            due_day: draft.due_day,
            color: draft.color,
            is_active: model.is_active,
        };
        updated.validate()?;

        credit_cards::ActiveModel::from(&updated)
            .update(&self.database)
            .await?;
        Ok(updated)
    }

    pub async fn delete_card(&self, user_id: &str, card_id: &str) -> ResultEngine<()> {
        let model = self.require_card(user_id, card_id).await?;
        credit_cards::Entity::delete_by_id(model.id)
            .exec(&self.database)
            .await?;
        Ok(())
    }

    /// Flip the active flag and return the new state.
    pub async fn toggle_card(&self, user_id: &str, card_id: &str) -> ResultEngine<CreditCard> {
        let model = self.require_card(user_id, card_id).await?;

        let mut card = CreditCard::try_from(model)?;
        card.is_active = !card.is_active;
        credit_cards::ActiveModel::from(&card)
            .update(&self.database)
            .await?;
        Ok(card)
    }

    pub async fn bills_for_card(
        &self,
        user_id: &str,
        card_id: &str,
    ) -> ResultEngine<Vec<CreditCardBill>> {
        self.require_card(user_id, card_id).await?;

        let models = credit_card_bills::Entity::find()
            .filter(credit_card_bills::Column::UserId.eq(user_id))
            .filter(credit_card_bills::Column::CardId.eq(card_id))
            .order_by_desc(credit_card_bills::Column::Period)
            .all(&self.database)
            .await?;

        models.into_iter().map(CreditCardBill::try_from).collect()
    }

    pub(super) async fn require_card(
        &self,
        user_id: &str,
        card_id: &str,
    ) -> ResultEngine<credit_cards::Model> {
        credit_cards::Entity::find_by_id(card_id)
            .filter(credit_cards::Column::UserId.eq(user_id))
            .one(&self.database)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("credit card not exists".to_string()))
    }
}
