pub use ai_analyses::AiAnalysis;
pub use budget_goals::BudgetGoals;
pub use categories::Category;
pub use credit_card_bills::{BillStatus, CreditCardBill};
pub use credit_cards::{CardBrand, CreditCard};
pub use error::EngineError;
pub use ops::{
    AnalysisPage, CardDraft, CardScope, DuplicationOptions, DuplicationReport, Engine,
    EngineBuilder, PeriodStats, TransactionDraft, TransactionListFilter, TransactionPage,
    TransactionPatch,
};
pub use period::Period;
pub use transactions::{
    InstallmentInfo, RecurringFrequency, RecurringRule, Transaction, TransactionKind,
};

mod ai_analyses;
mod budget_goals;
mod categories;
mod credit_card_bills;
mod credit_cards;
mod error;
mod ops;
mod period;
mod transactions;
mod util;

type ResultEngine<T> = Result<T, EngineError>;
