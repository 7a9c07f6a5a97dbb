//! Period duplication engine.
//!
//! Copies recurring fixed transactions and open credit card bills from a
//! source period into a target period, skipping anything the target already
//! holds. Re-running the same duplication is safe: equivalence checks plus
//! the store's unique indexes keep the result set stable.
//!
//! The three HTTP endpoints are presets over the single
//! [`duplicate_period`](Engine::duplicate_period) operation.

use chrono::{Datelike, NaiveDate};
use sea_orm::{QueryFilter, prelude::*};

use crate::{
    CreditCardBill, Period, ResultEngine, Transaction, credit_card_bills, credit_cards,
    transactions,
};

use super::{Engine, is_unique_violation};

/// Which fixed transactions a duplication run considers.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CardScope {
    /// Only transactions without a credit card reference.
    Exclude,
    /// Only transactions carrying a credit card reference.
    Only,
    /// Every fixed transaction, card-linked or not.
    All,
}

#[derive(Clone, Copy, Debug)]
pub struct DuplicationOptions {
    pub card_scope: CardScope,
    pub duplicate_bills: bool,
    pub copy_bill_transaction_refs: bool,
    pub recompute_bill_total: bool,
}

impl DuplicationOptions {
    /// Fixed transactions only, card entries untouched
    /// (`duplicate-transactions`).
    pub fn fixed_only() -> Self {
        Self {
            card_scope: CardScope::Exclude,
            duplicate_bills: false,
            copy_bill_transaction_refs: false,
            recompute_bill_total: false,
        }
    }

    /// Fixed card transactions plus bills whose totals are recomputed from
    /// the target period (`duplicate-cards`).
    pub fn card_cycle() -> Self {
        Self {
            card_scope: CardScope::Only,
            duplicate_bills: true,
            copy_bill_transaction_refs: true,
            recompute_bill_total: true,
        }
    }

    /// Every fixed transaction plus empty placeholder bills
    /// (`duplicate-month`).
    pub fn whole_month() -> Self {
        Self {
            card_scope: CardScope::All,
            duplicate_bills: true,
            copy_bill_transaction_refs: false,
            recompute_bill_total: false,
        }
    }
}

/// Outcome counts of one duplication run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DuplicationReport {
    pub created_transactions: u64,
    pub created_bills: u64,
    pub already_exists_transactions: u64,
    pub already_exists_bills: u64,
}

impl Engine {
    /// Mirror the recurring obligations of `source` into `target` for one
    /// user.
    ///
    /// Never mutates or deletes existing records and never touches the
    /// source period. Not transactional across entities: a failure partway
    /// leaves already-created records in place, and re-invoking is safe.
    pub async fn duplicate_period(
        &self,
        user_id: &str,
        source: &str,
        target: &str,
        options: DuplicationOptions,
    ) -> ResultEngine<DuplicationReport> {
        let source = Period::parse(source)?;
        let target = Period::parse(target)?;

        let mut report = DuplicationReport::default();
        self.duplicate_fixed_transactions(user_id, source, target, options, &mut report)
            .await?;
        if options.duplicate_bills {
            self.duplicate_bills(user_id, source, target, options, &mut report)
                .await?;
        }

        tracing::info!(
            user_id,
            source = %source,
            target = %target,
            created_transactions = report.created_transactions,
            created_bills = report.created_bills,
            "period duplication finished"
        );
        Ok(report)
    }

    async fn duplicate_fixed_transactions(
        &self,
        user_id: &str,
        source: Period,
        target: Period,
        options: DuplicationOptions,
        report: &mut DuplicationReport,
    ) -> ResultEngine<()> {
        let mut query = transactions::Entity::find()
            .filter(transactions::Column::UserId.eq(user_id))
            .filter(transactions::Column::Period.eq(source.label()))
            .filter(transactions::Column::IsFixed.eq(true));
        query = match options.card_scope {
            CardScope::Exclude => query.filter(transactions::Column::CreditCardId.is_null()),
            CardScope::Only => query.filter(transactions::Column::CreditCardId.is_not_null()),
            CardScope::All => query,
        };
        let candidates = query.all(&self.database).await?;

        // One at a time: the bill pass below must observe the transactions
        // created here.
        for model in candidates {
            let source_tx = Transaction::try_from(model)?;
            if self
                .equivalent_exists(user_id, target, &source_tx, options.card_scope)
                .await?
            {
                report.already_exists_transactions += 1;
                continue;
            }

            let (credit_card_id, installment_info) = match options.card_scope {
                CardScope::Exclude => (None, None),
                CardScope::Only | CardScope::All => (
                    source_tx.credit_card_id.clone(),
                    source_tx.installment_info,
                ),
            };

            let duplicate = Transaction::new(
                user_id.to_string(),
                source_tx.category_id.clone(),
                source_tx.description.clone(),
                source_tx.amount_minor,
                project_into_period(&source_tx, target),
                source_tx.kind,
                // duplicates always start unpaid
                false,
                source_tx.is_fixed,
                source_tx.is_recurring,
                source_tx.recurring_rule.clone(),
                source_tx.day_of_month,
                credit_card_id,
                installment_info,
            )?;

            match transactions::ActiveModel::try_from(&duplicate)?
                .insert(&self.database)
                .await
            {
                Ok(_) => report.created_transactions += 1,
                Err(err) if is_unique_violation(&err) => report.already_exists_transactions += 1,
                Err(err) => return Err(err.into()),
            }
        }

        Ok(())
    }

    /// An equivalent transaction shares user, period, description, amount,
    /// category, kind and fixed flag. Card references compare by identity;
    /// under [`CardScope::Exclude`] both sides must lack one.
    async fn equivalent_exists(
        &self,
        user_id: &str,
        target: Period,
        tx: &Transaction,
        scope: CardScope,
    ) -> ResultEngine<bool> {
        let mut query = transactions::Entity::find()
            .filter(transactions::Column::UserId.eq(user_id))
            .filter(transactions::Column::Period.eq(target.label()))
            .filter(transactions::Column::Description.eq(tx.description.as_str()))
            .filter(transactions::Column::AmountMinor.eq(tx.amount_minor))
            .filter(transactions::Column::CategoryId.eq(tx.category_id.as_str()))
            .filter(transactions::Column::Kind.eq(tx.kind.as_str()))
            .filter(transactions::Column::IsFixed.eq(true));
        query = match (scope, &tx.credit_card_id) {
            (CardScope::Exclude, _) | (_, None) => {
                query.filter(transactions::Column::CreditCardId.is_null())
            }
            (_, Some(card_id)) => {
                query.filter(transactions::Column::CreditCardId.eq(card_id.as_str()))
            }
        };

        Ok(query.one(&self.database).await?.is_some())
    }

    async fn duplicate_bills(
        &self,
        user_id: &str,
        source: Period,
        target: Period,
        options: DuplicationOptions,
        report: &mut DuplicationReport,
    ) -> ResultEngine<()> {
        let source_bills = credit_card_bills::Entity::find()
            .filter(credit_card_bills::Column::UserId.eq(user_id))
            .filter(credit_card_bills::Column::Period.eq(source.label()))
            .all(&self.database)
            .await?;

        for bill_model in source_bills {
            let existing = credit_card_bills::Entity::find()
                .filter(credit_card_bills::Column::UserId.eq(user_id))
                .filter(credit_card_bills::Column::CardId.eq(bill_model.card_id.as_str()))
                .filter(credit_card_bills::Column::Period.eq(target.label()))
                .one(&self.database)
                .await?;
            if existing.is_some() {
                report.already_exists_bills += 1;
                continue;
            }

            // A card deleted since the source period suppresses only its own
            // bill.
            let Some(card_model) = credit_cards::Entity::find_by_id(bill_model.card_id.as_str())
                .filter(credit_cards::Column::UserId.eq(user_id))
                .one(&self.database)
                .await?
            else {
                tracing::debug!(
                    card_id = %bill_model.card_id,
                    "card no longer exists, skipping bill duplication"
                );
                continue;
            };

            let due_date = target.date_with_day(card_model.due_day as u32);

            // Totals come from the transactions now present in the target
            // period, not from the source bill, so the bill agrees with the
            // duplicates even when some candidates were skipped.
            let (total_amount_minor, transaction_refs) =
                if options.recompute_bill_total || options.copy_bill_transaction_refs {
                    let card_transactions = transactions::Entity::find()
                        .filter(transactions::Column::UserId.eq(user_id))
                        .filter(transactions::Column::CreditCardId.eq(bill_model.card_id.as_str()))
                        .filter(transactions::Column::Period.eq(target.label()))
                        .all(&self.database)
                        .await?;

                    let total = if options.recompute_bill_total {
                        card_transactions.iter().map(|tx| tx.amount_minor).sum()
                    } else {
                        0
                    };
                    let refs = if options.copy_bill_transaction_refs {
                        card_transactions.into_iter().map(|tx| tx.id).collect()
                    } else {
                        Vec::new()
                    };
                    (total, refs)
                } else {
                    (0, Vec::new())
                };

            let bill = CreditCardBill::new(
                user_id.to_string(),
                bill_model.card_id.clone(),
                target,
                total_amount_minor,
                due_date,
                transaction_refs,
            );

            match credit_card_bills::ActiveModel::try_from(&bill)?
                .insert(&self.database)
                .await
            {
                Ok(_) => report.created_bills += 1,
                Err(err) if is_unique_violation(&err) => report.already_exists_bills += 1,
                Err(err) => return Err(err.into()),
            }
        }

        Ok(())
    }
}

/// Re-project a source transaction's date onto the target period.
///
/// The anchor day wins when set; otherwise the source date's own day is
/// reused. Either way the day clamps to the target month's real length.
fn project_into_period(tx: &Transaction, target: Period) -> NaiveDate {
    let anchor = tx.day_of_month.unwrap_or_else(|| tx.date.day());
    let date = target.date_with_day(anchor);
    if target.contains(date) {
        date
    } else {
        // Clamping already keeps the date inside the target month; re-check
        // so a surprising date can never escape the period.
        target.date_with_day(date.day())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::TransactionKind;

    fn fixed_tx(date: NaiveDate, day_of_month: Option<u32>) -> Transaction {
        Transaction::new(
            "user".to_string(),
            "category".to_string(),
            "Rent".to_string(),
            150_000,
            date,
            TransactionKind::Expense,
            true,
            true,
            false,
            None,
            day_of_month,
            None,
            None,
        )
        .unwrap()
    }

    #[test]
    fn anchor_day_wins_over_source_day() {
        let tx = fixed_tx(NaiveDate::from_ymd_opt(2024, 1, 17).unwrap(), Some(5));
        let target = Period::parse("2024-02").unwrap();
        assert_eq!(
            project_into_period(&tx, target),
            NaiveDate::from_ymd_opt(2024, 2, 5).unwrap()
        );
    }

    #[test]
    fn source_day_clamps_into_short_months() {
        let tx = fixed_tx(NaiveDate::from_ymd_opt(2024, 1, 31).unwrap(), None);
        assert_eq!(
            project_into_period(&tx, Period::parse("2024-04").unwrap()),
            NaiveDate::from_ymd_opt(2024, 4, 30).unwrap()
        );
        assert_eq!(
            project_into_period(&tx, Period::parse("2024-02").unwrap()),
            NaiveDate::from_ymd_opt(2024, 2, 29).unwrap()
        );
        assert_eq!(
            project_into_period(&tx, Period::parse("2023-02").unwrap()),
            NaiveDate::from_ymd_opt(2023, 2, 28).unwrap()
        );
    }
}
