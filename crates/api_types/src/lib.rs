//! Shared request/response types for the HTTP API.
//!
//! Field names serialize in camelCase: the API is consumed by JavaScript
//! clients and the duplication endpoints' response shape is part of the
//! public contract.

use serde::{Deserialize, Serialize};

/// Envelope for every API response.
///
/// Failures carry `success = false` and a message, never partial data.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiResponse<T> {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T> ApiResponse<T> {
    pub fn ok(message: impl Into<String>, data: T) -> Self {
        Self {
            success: true,
            message: message.into(),
            data: Some(data),
        }
    }
}

impl ApiResponse<()> {
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
            data: None,
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            data: None,
        }
    }
}

/// Pagination block returned by list endpoints.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub page: u64,
    pub limit: u64,
    pub total: u64,
    pub pages: u64,
}

pub mod user {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct RegisterUser {
        pub name: String,
        pub email: String,
        pub password: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct UserView {
        pub id: String,
        pub name: String,
        pub email: String,
    }
}

pub mod category {
    use super::*;

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum CategoryKind {
        Income,
        Expense,
        Investment,
    }

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct CategoryNew {
        pub name: String,
        #[serde(rename = "type")]
        pub kind: CategoryKind,
        pub color: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct CategoryView {
        pub id: String,
        pub name: String,
        #[serde(rename = "type")]
        pub kind: CategoryKind,
        pub color: String,
    }
}

pub mod transaction {
    use super::*;
    use chrono::NaiveDate;

    pub use super::category::CategoryKind as TransactionKind;

    #[derive(Clone, Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct RecurringRule {
        #[serde(rename = "type")]
        pub frequency: String,
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

    #[derive(Clone, Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct InstallmentInfo {
        pub total_installments: u32,
        pub current_installment: u32,
        pub installment_amount_minor: i64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct TransactionNew {
        pub category_id: String,
        pub description: String,
        pub amount_minor: i64,
        /// Calendar date, `YYYY-MM-DD`. The period label is derived from it.
        pub date: NaiveDate,
        #[serde(rename = "type")]
        pub kind: TransactionKind,
        #[serde(default)]
        pub is_paid: bool,
        #[serde(default)]
        pub is_fixed: bool,
        #[serde(default)]
        pub is_recurring: bool,
        pub recurring_rule: Option<RecurringRule>,
        pub day_of_month: Option<u32>,
        pub credit_card_id: Option<String>,
        pub installment_info: Option<InstallmentInfo>,
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct TransactionUpdate {
        pub category_id: Option<String>,
        pub description: Option<String>,
        pub amount_minor: Option<i64>,
        pub date: Option<NaiveDate>,
        #[serde(rename = "type")]
        pub kind: Option<TransactionKind>,
        pub is_paid: Option<bool>,
        pub is_fixed: Option<bool>,
        pub day_of_month: Option<u32>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct TransactionView {
        pub id: String,
        pub category_id: String,
        pub description: String,
        pub amount_minor: i64,
        pub date: NaiveDate,
        #[serde(rename = "type")]
        pub kind: TransactionKind,
        pub is_paid: bool,
        pub is_fixed: bool,
        pub is_recurring: bool,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub recurring_rule: Option<RecurringRule>,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub day_of_month: Option<u32>,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub credit_card_id: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub installment_info: Option<InstallmentInfo>,
        pub month: String,
    }

    /// Query string accepted by `GET /transactions`.
    #[derive(Debug, Default, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct TransactionListQuery {
        pub month: Option<String>,
        #[serde(rename = "type")]
        pub kind: Option<TransactionKind>,
        pub category_id: Option<String>,
        pub page: Option<u64>,
        pub limit: Option<u64>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct TransactionListResponse {
        pub transactions: Vec<TransactionView>,
        pub pagination: super::Pagination,
    }
}

pub mod card {
    use super::*;

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum CardBrand {
        Visa,
        Mastercard,
        Amex,
        Elo,
        Other,
    }

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct CreditCardNew {
        pub name: String,
        pub last_four_digits: String,
        pub brand: CardBrand,
        pub limit_minor: i64,
        pub closing_day: u32,
        pub due_day: u32,
        pub color: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct CreditCardView {
        pub id: String,
        pub name: String,
        pub last_four_digits: String,
        pub brand: CardBrand,
        pub limit_minor: i64,
        pub closing_day: u32,
        pub due_day: u32,
        pub color: String,
        pub is_active: bool,
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct CardListQuery {
        pub active: Option<bool>,
    }
}

pub mod bill {
    use super::*;
    use chrono::NaiveDate;

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum BillStatus {
        Pending,
        Paid,
        Overdue,
    }

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct BillView {
        pub id: String,
        pub card_id: String,
        pub month: String,
        pub total_amount_minor: i64,
        pub paid_amount_minor: i64,
        pub due_date: NaiveDate,
        pub status: BillStatus,
        pub transactions: Vec<String>,
    }
}

pub mod duplication {
    use super::*;

    /// Response of `POST /periods/{source}/duplicate-transactions/{target}`.
    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct DuplicateTransactions {
        pub source_month: String,
        pub target_month: String,
        pub duplicated_count: u64,
        pub already_exists_count: u64,
    }

    /// Response of the card and whole-month duplication endpoints.
    ///
    /// `duplicated_count` covers transactions and bills together.
    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct DuplicatePeriod {
        pub source_month: String,
        pub target_month: String,
        pub duplicated_count: u64,
        pub already_exists_transactions_count: u64,
        pub already_exists_bills_count: u64,
    }
}

pub mod stats {
    use super::*;

    /// Aggregates for one period, everything in minor units.
    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct DashboardStats {
        pub total_income_minor: i64,
        pub total_expenses_minor: i64,
        pub total_investments_minor: i64,
        pub balance_minor: i64,
        pub fixed_income_minor: i64,
        pub variable_income_minor: i64,
        pub fixed_expenses_minor: i64,
        pub variable_expenses_minor: i64,
        pub credit_card_debt_minor: i64,
        pub available_credit_minor: i64,
    }
}

pub mod goals {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct BudgetGoalsUpsert {
        pub goals: serde_json::Value,
    }

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct BudgetGoalsView {
        pub id: String,
        pub goals: serde_json::Value,
    }
}

pub mod analysis {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct AnalysisUpsert {
        pub month: String,
        pub analysis: serde_json::Value,
    }

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct AnalysisView {
        pub id: String,
        pub month: String,
        pub analysis: serde_json::Value,
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct AnalysisListQuery {
        pub page: Option<u64>,
        pub limit: Option<u64>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct AnalysisListResponse {
        pub analyses: Vec<AnalysisView>,
        pub pagination: super::Pagination,
    }
}

pub mod health {
    use super::*;
    use chrono::{DateTime, Utc};

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct Health {
        pub timestamp: DateTime<Utc>,
    }
}
