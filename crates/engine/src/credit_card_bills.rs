//! Monthly credit card bills.
//!
//! At most one bill exists per (user, card, period); the store enforces it
//! with a unique index. The `transaction_refs` column stores the linked
//! transaction ids as JSON text.

use chrono::NaiveDate;
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, Period};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BillStatus {
    Pending,
    Paid,
    Overdue,
}

impl BillStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Paid => "paid",
            Self::Overdue => "overdue",
        }
    }
}

impl TryFrom<&str> for BillStatus {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "pending" => Ok(Self::Pending),
            "paid" => Ok(Self::Paid),
            "overdue" => Ok(Self::Overdue),
            other => Err(EngineError::InvalidField(format!("bill status: {other}"))),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreditCardBill {
    pub id: String,
    pub user_id: String,
    pub card_id: String,
    pub period: Period,
    pub total_amount_minor: i64,
    pub paid_amount_minor: i64,
    pub due_date: NaiveDate,
    pub status: BillStatus,
    pub transactions: Vec<String>,
}

impl CreditCardBill {
    /// A fresh, unpaid bill.
    pub fn new(
        user_id: String,
        card_id: String,
        period: Period,
        total_amount_minor: i64,
        due_date: NaiveDate,
        transactions: Vec<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            user_id,
            card_id,
            period,
            total_amount_minor,
            paid_amount_minor: 0,
            due_date,
            status: BillStatus::Pending,
            transactions,
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "credit_card_bills")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub user_id: String,
    pub card_id: String,
    pub period: String,
    pub total_amount_minor: i64,
    pub paid_amount_minor: i64,
    pub due_date: Date,
    pub status: String,
    pub transaction_refs: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl TryFrom<&CreditCardBill> for ActiveModel {
    type Error = EngineError;

    fn try_from(bill: &CreditCardBill) -> Result<Self, Self::Error> {
        let transaction_refs = serde_json::to_string(&bill.transactions)
            .map_err(|_| EngineError::InvalidField("bill transaction refs".to_string()))?;

        Ok(Self {
            id: ActiveValue::Set(bill.id.clone()),
            user_id: ActiveValue::Set(bill.user_id.clone()),
            card_id: ActiveValue::Set(bill.card_id.clone()),
            period: ActiveValue::Set(bill.period.label()),
            total_amount_minor: ActiveValue::Set(bill.total_amount_minor),
            paid_amount_minor: ActiveValue::Set(bill.paid_amount_minor),
            due_date: ActiveValue::Set(bill.due_date),
            status: ActiveValue::Set(bill.status.as_str().to_string()),
            transaction_refs: ActiveValue::Set(transaction_refs),
        })
    }
}

impl TryFrom<Model> for CreditCardBill {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        let transactions = serde_json::from_str(&model.transaction_refs)
            .map_err(|_| EngineError::InvalidField("bill transaction refs".to_string()))?;

        Ok(Self {
            id: model.id,
            user_id: model.user_id,
            card_id: model.card_id,
            period: Period::parse(&model.period)?,
            total_amount_minor: model.total_amount_minor,
            paid_amount_minor: model.paid_amount_minor,
            due_date: model.due_date,
            status: BillStatus::try_from(model.status.as_str())?,
            transactions,
        })
    }
}
