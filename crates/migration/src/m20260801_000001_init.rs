//! Initial schema migration - creates all tables from scratch.
//!
//! - `users`: authentication
//! - `categories`: per-user transaction classification
//! - `transactions`: dated money movements with recurrence metadata
//! - `credit_cards`: card metadata (closing/due days, limit)
//! - `credit_card_bills`: one statement per user+card+period
//! - `budget_goals`: one goals document per user
//! - `ai_analyses`: one analysis document per user+period
//!
//! Category and card references on transactions are deliberately not
//! foreign keys: deleting a card must leave historical transactions and
//! bills in place, and the duplication engine treats dangling card ids as
//! stale references to skip.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

// ─────────────────────────────────────────────────────────────────────────────
// Table identifiers
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Iden)]
enum Users {
    Table,
    Id,
    Name,
    Email,
    Password,
}

#[derive(Iden)]
enum Categories {
    Table,
    Id,
    UserId,
    Name,
    Kind,
    Color,
}

#[derive(Iden)]
enum Transactions {
    Table,
    Id,
    UserId,
    CategoryId,
    Description,
    AmountMinor,
    Date,
    Kind,
    IsPaid,
    IsFixed,
    IsRecurring,
    RecurringRule,
    DayOfMonth,
    CreditCardId,
    InstallmentTotal,
    InstallmentCurrent,
    InstallmentAmountMinor,
    Period,
}

#[derive(Iden)]
enum CreditCards {
    Table,
    Id,
    UserId,
    Name,
    LastFourDigits,
    Brand,
    LimitMinor,
    ClosingDay,
    DueDay,
    Color,
    IsActive,
}

#[derive(Iden)]
enum CreditCardBills {
    Table,
    Id,
    UserId,
    CardId,
    Period,
    TotalAmountMinor,
    PaidAmountMinor,
    DueDate,
    Status,
    TransactionRefs,
}

#[derive(Iden)]
enum BudgetGoals {
    Table,
    Id,
    UserId,
    Goals,
}

#[derive(Iden)]
enum AiAnalyses {
    Table,
    Id,
    UserId,
    Period,
    Analysis,
}

// ─────────────────────────────────────────────────────────────────────────────
// Migration implementation
// ─────────────────────────────────────────────────────────────────────────────

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // ───────────────────────────────────────────────────────────────────
        // 1. Users
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Users::Id).string().not_null().primary_key())
                    .col(ColumnDef::new(Users::Name).string().not_null())
                    .col(ColumnDef::new(Users::Email).string().not_null())
                    .col(ColumnDef::new(Users::Password).string().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-users-email-unique")
                    .table(Users::Table)
                    .col(Users::Email)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 2. Categories
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Categories::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Categories::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Categories::UserId).string().not_null())
                    .col(ColumnDef::new(Categories::Name).string().not_null())
                    .col(ColumnDef::new(Categories::Kind).string().not_null())
                    .col(ColumnDef::new(Categories::Color).string().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-categories-user_id")
                            .from(Categories::Table, Categories::UserId)
                            .to(Users::Table, Users::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-categories-user_id-name-unique")
                    .table(Categories::Table)
                    .col(Categories::UserId)
                    .col(Categories::Name)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 3. Transactions
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Transactions::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Transactions::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Transactions::UserId).string().not_null())
                    .col(ColumnDef::new(Transactions::CategoryId).string().not_null())
                    .col(ColumnDef::new(Transactions::Description).string().not_null())
                    .col(
                        ColumnDef::new(Transactions::AmountMinor)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Transactions::Date).date().not_null())
                    .col(ColumnDef::new(Transactions::Kind).string().not_null())
                    .col(ColumnDef::new(Transactions::IsPaid).boolean().not_null())
                    .col(ColumnDef::new(Transactions::IsFixed).boolean().not_null())
                    .col(
                        ColumnDef::new(Transactions::IsRecurring)
                            .boolean()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Transactions::RecurringRule).string())
                    .col(ColumnDef::new(Transactions::DayOfMonth).integer())
                    .col(ColumnDef::new(Transactions::CreditCardId).string())
                    .col(ColumnDef::new(Transactions::InstallmentTotal).integer())
                    .col(ColumnDef::new(Transactions::InstallmentCurrent).integer())
                    .col(ColumnDef::new(Transactions::InstallmentAmountMinor).big_integer())
                    .col(ColumnDef::new(Transactions::Period).string().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-transactions-user_id")
                            .from(Transactions::Table, Transactions::UserId)
                            .to(Users::Table, Users::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-transactions-user_id-period")
                    .table(Transactions::Table)
                    .col(Transactions::UserId)
                    .col(Transactions::Period)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-transactions-user_id-credit_card_id")
                    .table(Transactions::Table)
                    .col(Transactions::UserId)
                    .col(Transactions::CreditCardId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-transactions-user_id-date")
                    .table(Transactions::Table)
                    .col(Transactions::UserId)
                    .col(Transactions::Date)
                    .to_owned(),
            )
            .await?;

        // Store-level backstop for the duplication equivalence check: two
        // concurrent runs cannot both insert the same logical duplicate. The
        // COALESCE folds the missing-card case into one key value, which the
        // index DSL cannot express.
        manager
            .get_connection()
            .execute_unprepared(
                "CREATE UNIQUE INDEX IF NOT EXISTS \
                 \"idx-transactions-fixed-equivalence-unique\" \
                 ON \"transactions\" (\"user_id\", \"period\", \"description\", \
                 \"amount_minor\", \"category_id\", \"kind\", \"is_fixed\", \
                 COALESCE(\"credit_card_id\", '')) \
                 WHERE \"is_fixed\" = TRUE",
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 4. Credit cards
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(CreditCards::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(CreditCards::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(CreditCards::UserId).string().not_null())
                    .col(ColumnDef::new(CreditCards::Name).string().not_null())
                    .col(
                        ColumnDef::new(CreditCards::LastFourDigits)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(CreditCards::Brand).string().not_null())
                    .col(
                        ColumnDef::new(CreditCards::LimitMinor)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(CreditCards::ClosingDay).integer().not_null())
                    .col(ColumnDef::new(CreditCards::DueDay).integer().not_null())
                    .col(ColumnDef::new(CreditCards::Color).string().not_null())
                    .col(
                        ColumnDef::new(CreditCards::IsActive)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-credit_cards-user_id")
                            .from(CreditCards::Table, CreditCards::UserId)
                            .to(Users::Table, Users::Id),
                    )
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 5. Credit card bills
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(CreditCardBills::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(CreditCardBills::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(CreditCardBills::UserId).string().not_null())
                    .col(ColumnDef::new(CreditCardBills::CardId).string().not_null())
                    .col(ColumnDef::new(CreditCardBills::Period).string().not_null())
                    .col(
                        ColumnDef::new(CreditCardBills::TotalAmountMinor)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(CreditCardBills::PaidAmountMinor)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(CreditCardBills::DueDate).date().not_null())
                    .col(ColumnDef::new(CreditCardBills::Status).string().not_null())
                    .col(
                        ColumnDef::new(CreditCardBills::TransactionRefs)
                            .string()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-credit_card_bills-user_id")
                            .from(CreditCardBills::Table, CreditCardBills::UserId)
                            .to(Users::Table, Users::Id),
                    )
                    .to_owned(),
            )
            .await?;

        // One bill per user+card+period; a concurrent second insert fails
        // instead of duplicating.
        manager
            .create_index(
                Index::create()
                    .name("idx-credit_card_bills-user_id-card_id-period-unique")
                    .table(CreditCardBills::Table)
                    .col(CreditCardBills::UserId)
                    .col(CreditCardBills::CardId)
                    .col(CreditCardBills::Period)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-credit_card_bills-user_id-period")
                    .table(CreditCardBills::Table)
                    .col(CreditCardBills::UserId)
                    .col(CreditCardBills::Period)
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 6. Budget goals
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(BudgetGoals::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(BudgetGoals::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(BudgetGoals::UserId).string().not_null())
                    .col(ColumnDef::new(BudgetGoals::Goals).string().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-budget_goals-user_id")
                            .from(BudgetGoals::Table, BudgetGoals::UserId)
                            .to(Users::Table, Users::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-budget_goals-user_id-unique")
                    .table(BudgetGoals::Table)
                    .col(BudgetGoals::UserId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 7. AI analyses
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(AiAnalyses::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(AiAnalyses::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(AiAnalyses::UserId).string().not_null())
                    .col(ColumnDef::new(AiAnalyses::Period).string().not_null())
                    .col(ColumnDef::new(AiAnalyses::Analysis).string().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-ai_analyses-user_id")
                            .from(AiAnalyses::Table, AiAnalyses::UserId)
                            .to(Users::Table, Users::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-ai_analyses-user_id-period-unique")
                    .table(AiAnalyses::Table)
                    .col(AiAnalyses::UserId)
                    .col(AiAnalyses::Period)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(AiAnalyses::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(BudgetGoals::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(CreditCardBills::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(CreditCards::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Transactions::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Categories::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Users::Table).to_owned())
            .await?;
        Ok(())
    }
}
