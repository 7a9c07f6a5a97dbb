//! Transaction primitives.
//!
//! A `Transaction` is a single dated money movement owned by one user. Its
//! `period` label is always derived from the calendar date, never supplied
//! by callers.

use chrono::NaiveDate;
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, Period, ResultEngine};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionKind {
    Income,
    Expense,
    Investment,
}

impl TransactionKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Income => "income",
            Self::Expense => "expense",
            Self::Investment => "investment",
        }
    }
}

impl TryFrom<&str> for TransactionKind {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "income" => Ok(Self::Income),
            "expense" => Ok(Self::Expense),
            "investment" => Ok(Self::Investment),
            other => Err(EngineError::InvalidField(format!(
                "transaction kind: {other}"
            ))),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecurringFrequency {
    Daily,
    Weekly,
    Monthly,
    Yearly,
}

/// Recurrence rule for `is_recurring` transactions.
///
/// Stored as JSON text in the transactions table.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecurringRule {
    pub frequency: RecurringFrequency,
    pub interval: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub day_of_month: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub day_of_week: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_occurrences: Option<u32>,
}

impl RecurringRule {
    pub fn validate(&self) -> ResultEngine<()> {
        if self.interval < 1 {
            return Err(EngineError::InvalidField(
                "recurring rule: interval must be >= 1".to_string(),
            ));
        }
        if let Some(day) = self.day_of_month
            && !(1..=31).contains(&day)
        {
            return Err(EngineError::InvalidField(
                "recurring rule: day_of_month must be between 1 and 31".to_string(),
            ));
        }
        if let Some(day) = self.day_of_week
            && day > 6
        {
            return Err(EngineError::InvalidField(
                "recurring rule: day_of_week must be between 0 and 6".to_string(),
            ));
        }
        if let Some(max) = self.max_occurrences
            && max < 1
        {
            return Err(EngineError::InvalidField(
                "recurring rule: max_occurrences must be >= 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Installment metadata for card purchases paid over several bills.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstallmentInfo {
    pub total_installments: u32,
    pub current_installment: u32,
    pub installment_amount_minor: i64,
}

impl InstallmentInfo {
    pub fn validate(&self) -> ResultEngine<()> {
        if !(1..=24).contains(&self.total_installments) {
            return Err(EngineError::InvalidField(
                "installments: total must be between 1 and 24".to_string(),
            ));
        }
        if self.current_installment < 1 {
            return Err(EngineError::InvalidField(
                "installments: current must be >= 1".to_string(),
            ));
        }
        if self.installment_amount_minor < 0 {
            return Err(EngineError::InvalidField(
                "installments: amount must be >= 0".to_string(),
            ));
        }
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: String,
    pub user_id: String,
    pub category_id: String,
    pub description: String,
    pub amount_minor: i64,
    pub date: NaiveDate,
    pub kind: TransactionKind,
    pub is_paid: bool,
    pub is_fixed: bool,
    pub is_recurring: bool,
    pub recurring_rule: Option<RecurringRule>,
    pub day_of_month: Option<u32>,
    pub credit_card_id: Option<String>,
    pub installment_info: Option<InstallmentInfo>,
    pub period: Period,
}

impl Transaction {
    /// Build a transaction, deriving `period` from `date`.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        user_id: String,
        category_id: String,
        description: String,
        amount_minor: i64,
        date: NaiveDate,
        kind: TransactionKind,
        is_paid: bool,
        is_fixed: bool,
        is_recurring: bool,
        recurring_rule: Option<RecurringRule>,
        day_of_month: Option<u32>,
        credit_card_id: Option<String>,
        installment_info: Option<InstallmentInfo>,
    ) -> ResultEngine<Self> {
        let tx = Self {
            id: Uuid::new_v4().to_string(),
            user_id,
            category_id,
            description,
            amount_minor,
            date,
            kind,
            is_paid,
            is_fixed,
            is_recurring,
            recurring_rule,
            day_of_month,
            credit_card_id,
            installment_info,
            period: Period::of(date),
        };
        tx.validate()?;
        Ok(tx)
    }

    pub fn validate(&self) -> ResultEngine<()> {
        if self.amount_minor <= 0 {
            return Err(EngineError::InvalidField("amount: must be > 0".to_string()));
        }
        let description_len = self.description.trim().chars().count();
        if !(2..=100).contains(&description_len) {
            return Err(EngineError::InvalidField(
                "description: must be between 2 and 100 characters".to_string(),
            ));
        }
        if let Some(day) = self.day_of_month
            && !(1..=31).contains(&day)
        {
            return Err(EngineError::InvalidField(
                "day_of_month: must be between 1 and 31".to_string(),
            ));
        }
        if self.is_recurring && self.recurring_rule.is_none() {
            return Err(EngineError::InvalidField(
                "recurring rule: required for recurring transactions".to_string(),
            ));
        }
        if let Some(rule) = &self.recurring_rule {
            rule.validate()?;
        }
        if let Some(installments) = &self.installment_info {
            installments.validate()?;
        }
        if !self.period.contains(self.date) {
            return Err(EngineError::InvalidField(
                "period: must match the transaction date".to_string(),
            ));
        }
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "transactions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub user_id: String,
    pub category_id: String,
    pub description: String,
    pub amount_minor: i64,
    pub date: Date,
    pub kind: String,
    pub is_paid: bool,
    pub is_fixed: bool,
    pub is_recurring: bool,
    pub recurring_rule: Option<String>,
    pub day_of_month: Option<i32>,
    pub credit_card_id: Option<String>,
    pub installment_total: Option<i32>,
    pub installment_current: Option<i32>,
    pub installment_amount_minor: Option<i64>,
    pub period: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl TryFrom<&Transaction> for ActiveModel {
    type Error = EngineError;

    fn try_from(tx: &Transaction) -> Result<Self, Self::Error> {
        let recurring_rule = tx
            .recurring_rule
            .as_ref()
            .map(serde_json::to_string)
            .transpose()
            .map_err(|_| EngineError::InvalidField("recurring rule".to_string()))?;

        Ok(Self {
            id: ActiveValue::Set(tx.id.clone()),
            user_id: ActiveValue::Set(tx.user_id.clone()),
            category_id: ActiveValue::Set(tx.category_id.clone()),
            description: ActiveValue::Set(tx.description.clone()),
            amount_minor: ActiveValue::Set(tx.amount_minor),
            date: ActiveValue::Set(tx.date),
            kind: ActiveValue::Set(tx.kind.as_str().to_string()),
            is_paid: ActiveValue::Set(tx.is_paid),
            is_fixed: ActiveValue::Set(tx.is_fixed),
            is_recurring: ActiveValue::Set(tx.is_recurring),
            recurring_rule: ActiveValue::Set(recurring_rule),
            day_of_month: ActiveValue::Set(tx.day_of_month.map(|d| d as i32)),
            credit_card_id: ActiveValue::Set(tx.credit_card_id.clone()),
            installment_total: ActiveValue::Set(
                tx.installment_info.map(|i| i.total_installments as i32),
            ),
            installment_current: ActiveValue::Set(
                tx.installment_info.map(|i| i.current_installment as i32),
            ),
            installment_amount_minor: ActiveValue::Set(
                tx.installment_info.map(|i| i.installment_amount_minor),
            ),
            period: ActiveValue::Set(tx.period.label()),
        })
    }
}

impl TryFrom<Model> for Transaction {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        let recurring_rule = model
            .recurring_rule
            .as_deref()
            .map(serde_json::from_str)
            .transpose()
            .map_err(|_| EngineError::InvalidField("recurring rule".to_string()))?;

        let installment_info = match (
            model.installment_total,
            model.installment_current,
            model.installment_amount_minor,
        ) {
            (Some(total), Some(current), Some(amount_minor)) => Some(InstallmentInfo {
                total_installments: total as u32,
                current_installment: current as u32,
                installment_amount_minor: amount_minor,
            }),
            _ => None,
        };

        Ok(Self {
            id: model.id,
            user_id: model.user_id,
            category_id: model.category_id,
            description: model.description,
            amount_minor: model.amount_minor,
            date: model.date,
            kind: TransactionKind::try_from(model.kind.as_str())?,
            is_paid: model.is_paid,
            is_fixed: model.is_fixed,
            is_recurring: model.is_recurring,
            recurring_rule,
            day_of_month: model.day_of_month.map(|d| d as u32),
            credit_card_id: model.credit_card_id,
            installment_info,
            period: Period::parse(&model.period)?,
        })
    }
}
