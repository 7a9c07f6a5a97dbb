//! Transaction CRUD, filtered listing and monthly statistics.

use chrono::NaiveDate;
use sea_orm::{PaginatorTrait, QueryFilter, QueryOrder, prelude::*};

use crate::{
    EngineError, InstallmentInfo, Period, RecurringRule, ResultEngine, Transaction,
    TransactionKind, credit_cards, transactions,
};

use super::Engine;

/// Payload for creating a transaction. `period` is derived from `date`.
#[derive(Clone, Debug)]
pub struct TransactionDraft {
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
}

/// Partial update; `None` fields are left unchanged.
#[derive(Clone, Debug, Default)]
pub struct TransactionPatch {
    pub category_id: Option<String>,
    pub description: Option<String>,
    pub amount_minor: Option<i64>,
    pub date: Option<NaiveDate>,
    pub kind: Option<TransactionKind>,
    pub is_paid: Option<bool>,
    pub is_fixed: Option<bool>,
    pub day_of_month: Option<u32>,
}

#[derive(Clone, Debug, Default)]
pub struct TransactionListFilter {
    pub period: Option<Period>,
    pub kind: Option<TransactionKind>,
    pub category_id: Option<String>,
}

/// One page of transactions plus the overall match count.
#[derive(Clone, Debug)]
pub struct TransactionPage {
    pub transactions: Vec<Transaction>,
    pub page: u64,
    pub limit: u64,
    pub total: u64,
}

/// Aggregates for one period, used by the dashboard.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PeriodStats {
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

impl Engine {
    pub async fn list_transactions(
        &self,
        user_id: &str,
        filter: &TransactionListFilter,
        page: u64,
        limit: u64,
    ) -> ResultEngine<TransactionPage> {
        let page = page.max(1);
        let limit = limit.clamp(1, 200);

        let mut query = transactions::Entity::find()
            .filter(transactions::Column::UserId.eq(user_id))
            .order_by_desc(transactions::Column::Date);
        if let Some(period) = filter.period {
            query = query.filter(transactions::Column::Period.eq(period.label()));
        }
        if let Some(kind) = filter.kind {
            query = query.filter(transactions::Column::Kind.eq(kind.as_str()));
        }
        if let Some(category_id) = &filter.category_id {
            query = query.filter(transactions::Column::CategoryId.eq(category_id.as_str()));
        }

        let paginator = query.paginate(&self.database, limit);
        let total = paginator.num_items().await?;
        let models = paginator.fetch_page(page - 1).await?;
        let transactions = models
            .into_iter()
            .map(Transaction::try_from)
            .collect::<ResultEngine<Vec<_>>>()?;

        Ok(TransactionPage {
            transactions,
            page,
            limit,
            total,
        })
    }

    pub async fn transactions_for_period(
        &self,
        user_id: &str,
        period: Period,
    ) -> ResultEngine<Vec<Transaction>> {
        let models = transactions::Entity::find()
            .filter(transactions::Column::UserId.eq(user_id))
            .filter(transactions::Column::Period.eq(period.label()))
            .order_by_desc(transactions::Column::Date)
            .all(&self.database)
            .await?;

        models.into_iter().map(Transaction::try_from).collect()
    }

    pub async fn create_transaction(
        &self,
        user_id: &str,
        draft: TransactionDraft,
    ) -> ResultEngine<Transaction> {
        self.require_category(user_id, &draft.category_id).await?;

        let tx = Transaction::new(
            user_id.to_string(),
            draft.category_id,
            draft.description,
            draft.amount_minor,
            draft.date,
            draft.kind,
            draft.is_paid,
            draft.is_fixed,
            draft.is_recurring,
            draft.recurring_rule,
            draft.day_of_month,
            draft.credit_card_id,
            draft.installment_info,
        )?;
        match transactions::ActiveModel::try_from(&tx)?
            .insert(&self.database)
            .await
        {
            Ok(_) => Ok(tx),
            // The fixed-equivalence unique index fails closed on identical
            // fixed transactions in one period.
            Err(err) if super::is_unique_violation(&err) => {
                Err(EngineError::ExistingKey(tx.description))
            }
            Err(err) => Err(err.into()),
        }
    }

    pub async fn update_transaction(
        &self,
        user_id: &str,
        transaction_id: &str,
        patch: TransactionPatch,
    ) -> ResultEngine<Transaction> {
        let model = transactions::Entity::find_by_id(transaction_id)
            .filter(transactions::Column::UserId.eq(user_id))
            .one(&self.database)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("transaction not exists".to_string()))?;

        let mut tx = Transaction::try_from(model)?;
        if let Some(category_id) = patch.category_id {
            self.require_category(user_id, &category_id).await?;
            tx.category_id = category_id;
        }
        if let Some(description) = patch.description {
            tx.description = description;
        }
        if let Some(amount_minor) = patch.amount_minor {
            tx.amount_minor = amount_minor;
        }
        if let Some(date) = patch.date {
            tx.date = date;
            tx.period = Period::of(date);
        }
        if let Some(kind) = patch.kind {
            tx.kind = kind;
        }
        if let Some(is_paid) = patch.is_paid {
            tx.is_paid = is_paid;
        }
        if let Some(is_fixed) = patch.is_fixed {
            tx.is_fixed = is_fixed;
        }
        if let Some(day_of_month) = patch.day_of_month {
            tx.day_of_month = Some(day_of_month);
        }
        tx.validate()?;

        match transactions::ActiveModel::try_from(&tx)?
            .update(&self.database)
            .await
        {
            Ok(_) => Ok(tx),
            Err(err) if super::is_unique_violation(&err) => {
                Err(EngineError::ExistingKey(tx.description))
            }
            Err(err) => Err(err.into()),
        }
    }

    pub async fn delete_transaction(
        &self,
        user_id: &str,
        transaction_id: &str,
    ) -> ResultEngine<()> {
        let model = transactions::Entity::find_by_id(transaction_id)
            .filter(transactions::Column::UserId.eq(user_id))
            .one(&self.database)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("transaction not exists".to_string()))?;

        transactions::Entity::delete_by_id(model.id)
            .exec(&self.database)
            .await?;
        Ok(())
    }

    /// Dashboard aggregates for one period.
    ///
    /// Card debt is the card-linked expense total of the period; available
    /// credit is the combined limit of active cards minus that debt.
    pub async fn period_stats(&self, user_id: &str, period: Period) -> ResultEngine<PeriodStats> {
        let transactions = self.transactions_for_period(user_id, period).await?;

        let mut stats = PeriodStats::default();
        for tx in &transactions {
            match tx.kind {
                TransactionKind::Income => {
                    stats.total_income_minor += tx.amount_minor;
                    if tx.is_fixed {
                        stats.fixed_income_minor += tx.amount_minor;
                    } else {
                        stats.variable_income_minor += tx.amount_minor;
                    }
                }
                TransactionKind::Expense => {
                    stats.total_expenses_minor += tx.amount_minor;
                    if tx.is_fixed {
                        stats.fixed_expenses_minor += tx.amount_minor;
                    } else {
                        stats.variable_expenses_minor += tx.amount_minor;
                    }
                    if tx.credit_card_id.is_some() {
                        stats.credit_card_debt_minor += tx.amount_minor;
                    }
                }
                TransactionKind::Investment => {
                    stats.total_investments_minor += tx.amount_minor;
                }
            }
        }
        stats.balance_minor = stats.total_income_minor - stats.total_expenses_minor;

        let active_limit_minor: i64 = credit_cards::Entity::find()
            .filter(credit_cards::Column::UserId.eq(user_id))
            .filter(credit_cards::Column::IsActive.eq(true))
            .all(&self.database)
            .await?
            .iter()
            .map(|card| card.limit_minor)
            .sum();
        stats.available_credit_minor = active_limit_minor - stats.credit_card_debt_minor;

        Ok(stats)
    }
}
