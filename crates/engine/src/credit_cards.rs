//! Credit card metadata.
//!
//! Closing and due days are nominal days-of-month (1-31); projecting them
//! onto a concrete period clamps to that month's length.

use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, ResultEngine};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CardBrand {
    Visa,
    Mastercard,
    Amex,
    Elo,
    Other,
}

impl CardBrand {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Visa => "visa",
            Self::Mastercard => "mastercard",
            Self::Amex => "amex",
            Self::Elo => "elo",
            Self::Other => "other",
        }
    }
}

impl TryFrom<&str> for CardBrand {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "visa" => Ok(Self::Visa),
            "mastercard" => Ok(Self::Mastercard),
            "amex" => Ok(Self::Amex),
            "elo" => Ok(Self::Elo),
            "other" => Ok(Self::Other),
            other => Err(EngineError::InvalidField(format!("card brand: {other}"))),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreditCard {
    pub id: String,
    pub user_id: String,
    pub name: String,
    pub last_four_digits: String,
    pub brand: CardBrand,
    pub limit_minor: i64,
    pub closing_day: u32,
    pub due_day: u32,
    pub color: String,
    pub is_active: bool,
}

impl CreditCard {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        user_id: String,
        name: String,
        last_four_digits: String,
        brand: CardBrand,
        limit_minor: i64,
        closing_day: u32,
        due_day: u32,
        color: String,
    ) -> ResultEngine<Self> {
        let card = Self {
            id: Uuid::new_v4().to_string(),
            user_id,
            name,
            last_four_digits,
            brand,
            limit_minor,
            closing_day,
            due_day,
            color,
            is_active: true,
        };
        card.validate()?;
        Ok(card)
    }

    pub fn validate(&self) -> ResultEngine<()> {
        if self.last_four_digits.len() != 4
            || !self.last_four_digits.bytes().all(|b| b.is_ascii_digit())
        {
            return Err(EngineError::InvalidField(
                "last_four_digits: must be exactly 4 digits".to_string(),
            ));
        }
        if self.limit_minor < 0 {
            return Err(EngineError::InvalidField(
                "limit: must be >= 0".to_string(),
            ));
        }
        if !(1..=31).contains(&self.closing_day) {
            return Err(EngineError::InvalidField(
                "closing_day: must be between 1 and 31".to_string(),
            ));
        }
        if !(1..=31).contains(&self.due_day) {
            return Err(EngineError::InvalidField(
                "due_day: must be between 1 and 31".to_string(),
            ));
        }
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "credit_cards")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub user_id: String,
    pub name: String,
    pub last_four_digits: String,
    pub brand: String,
    pub limit_minor: i64,
    pub closing_day: i32,
    pub due_day: i32,
    pub color: String,
    pub is_active: bool,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<&CreditCard> for ActiveModel {
    fn from(card: &CreditCard) -> Self {
        Self {
            id: ActiveValue::Set(card.id.clone()),
            user_id: ActiveValue::Set(card.user_id.clone()),
            name: ActiveValue::Set(card.name.clone()),
            last_four_digits: ActiveValue::Set(card.last_four_digits.clone()),
            brand: ActiveValue::Set(card.brand.as_str().to_string()),
            limit_minor: ActiveValue::Set(card.limit_minor),
            closing_day: ActiveValue::Set(card.closing_day as i32),
            due_day: ActiveValue::Set(card.due_day as i32),
            color: ActiveValue::Set(card.color.clone()),
            is_active: ActiveValue::Set(card.is_active),
        }
    }
}

impl TryFrom<Model> for CreditCard {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: model.id,
            user_id: model.user_id,
            name: model.name,
            last_four_digits: model.last_four_digits,
            brand: CardBrand::try_from(model.brand.as_str())?,
            limit_minor: model.limit_minor,
            closing_day: model.closing_day as u32,
            due_day: model.due_day as u32,
            color: model.color,
            is_active: model.is_active,
        })
    }
}
