use sea_orm::DatabaseConnection;

use crate::ResultEngine;

mod analyses;
mod cards;
mod categories;
mod duplication;
mod goals;
mod transactions;

pub use analyses::AnalysisPage;
pub use cards::CardDraft;
pub use duplication::{CardScope, DuplicationOptions, DuplicationReport};
pub use transactions::{
    PeriodStats, TransactionDraft, TransactionListFilter, TransactionPage, TransactionPatch,
};

#[derive(Debug)]
pub struct Engine {
    database: DatabaseConnection,
}

impl Engine {
    /// Return a builder for `Engine`. Help to build the struct.
    pub fn builder() -> EngineBuilder {
        EngineBuilder::default()
    }
}

/// True when an insert failed only because a unique index already holds an
/// equivalent row. The duplication engine reports these as "already exists"
/// instead of failing the whole call.
fn is_unique_violation(err: &sea_orm::DbErr) -> bool {
    matches!(
        err.sql_err(),
        Some(sea_orm::SqlErr::UniqueConstraintViolation(_))
    )
}

/// The builder for `Engine`
#[derive(Default)]
pub struct EngineBuilder {
    database: DatabaseConnection,
}

impl EngineBuilder {
    /// Pass the required database
    pub fn database(mut self, db: DatabaseConnection) -> EngineBuilder {
        self.database = db;
        self
    }

    /// Construct `Engine`
    pub fn build(self) -> ResultEngine<Engine> {
        Ok(Engine {
            database: self.database,
        })
    }
}
