use chrono::NaiveDate;
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, Statement};

use engine::{
    CardBrand, CardDraft, Engine, EngineError, Period, TransactionDraft, TransactionKind,
    TransactionListFilter, TransactionPatch,
};
use migration::MigratorTrait;

async fn engine_with_db() -> (Engine, DatabaseConnection) {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let backend = db.get_database_backend();
    db.execute(Statement::from_sql_and_values(
        backend,
        "INSERT INTO users (id, name, email, password) VALUES (?, ?, ?, ?)",
        vec![
            "alice".into(),
            "Alice".into(),
            "alice@example.com".into(),
            "password".into(),
        ],
    ))
    .await
    .unwrap();
    let engine = Engine::builder().database(db.clone()).build().unwrap();
    (engine, db)
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn draft(category_id: &str, description: &str, amount_minor: i64) -> TransactionDraft {
    TransactionDraft {
        category_id: category_id.to_string(),
        description: description.to_string(),
        amount_minor,
        date: date(2024, 1, 15),
        kind: TransactionKind::Expense,
        is_paid: false,
        is_fixed: false,
        is_recurring: false,
        recurring_rule: None,
        day_of_month: None,
        credit_card_id: None,
        installment_info: None,
    }
}

async fn category(engine: &Engine, name: &str, kind: TransactionKind) -> String {
    engine
        .create_category("alice", name, kind, "#123ABC")
        .await
        .unwrap()
        .id
}

#[tokio::test]
async fn category_names_are_unique_per_user_case_insensitive() {
    let (engine, db) = engine_with_db().await;
    category(&engine, "Housing", TransactionKind::Expense).await;

    let err = engine
        .create_category("alice", "housing", TransactionKind::Expense, "#123ABC")
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::ExistingKey(_)));

    // another user may reuse the name
    let backend = db.get_database_backend();
    db.execute(Statement::from_sql_and_values(
        backend,
        "INSERT INTO users (id, name, email, password) VALUES (?, ?, ?, ?)",
        vec![
            "bob".into(),
            "Bob".into(),
            "bob@example.com".into(),
            "password".into(),
        ],
    ))
    .await
    .unwrap();
    engine
        .create_category("bob", "Housing", TransactionKind::Expense, "#123ABC")
        .await
        .unwrap();
}

#[tokio::test]
async fn category_update_checks_name_collision_excluding_itself() {
    let (engine, _db) = engine_with_db().await;
    let food = category(&engine, "Food", TransactionKind::Expense).await;
    category(&engine, "Transport", TransactionKind::Expense).await;

    // renaming to itself is fine
    engine
        .update_category("alice", &food, "Food", TransactionKind::Expense, "#00FF00")
        .await
        .unwrap();

    let err = engine
        .update_category("alice", &food, "transport", TransactionKind::Expense, "#00FF00")
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::ExistingKey(_)));
}

#[tokio::test]
async fn categories_filter_by_kind() {
    let (engine, _db) = engine_with_db().await;
    category(&engine, "Salary", TransactionKind::Income).await;
    category(&engine, "Food", TransactionKind::Expense).await;

    let incomes = engine
        .categories_by_kind("alice", TransactionKind::Income)
        .await
        .unwrap();
    assert_eq!(incomes.len(), 1);
    assert_eq!(incomes[0].name, "Salary");
}

#[tokio::test]
async fn create_transaction_requires_owned_category() {
    let (engine, _db) = engine_with_db().await;

    let err = engine
        .create_transaction("alice", draft("missing-category", "Dinner", 5_000))
        .await
        .unwrap_err();
    assert_eq!(
        err,
        EngineError::KeyNotFound("category not exists".to_string())
    );
}

#[tokio::test]
async fn create_transaction_derives_period_and_validates_fields() {
    let (engine, _db) = engine_with_db().await;
    let category_id = category(&engine, "Food", TransactionKind::Expense).await;

    let tx = engine
        .create_transaction("alice", draft(&category_id, "Groceries", 12_345))
        .await
        .unwrap();
    assert_eq!(tx.period.label(), "2024-01");

    let mut short = draft(&category_id, "G", 5_000);
    short.description = "G".to_string();
    assert!(matches!(
        engine.create_transaction("alice", short).await,
        Err(EngineError::InvalidField(_))
    ));

    let negative = draft(&category_id, "Refund gone wrong", -5);
    assert!(matches!(
        engine.create_transaction("alice", negative).await,
        Err(EngineError::InvalidField(_))
    ));

    let mut recurring = draft(&category_id, "Subscription", 1_000);
    recurring.is_recurring = true;
    assert!(matches!(
        engine.create_transaction("alice", recurring).await,
        Err(EngineError::InvalidField(_))
    ));
}

#[tokio::test]
async fn identical_fixed_transactions_fail_closed() {
    let (engine, _db) = engine_with_db().await;
    let category_id = category(&engine, "Housing", TransactionKind::Expense).await;

    let mut fixed = draft(&category_id, "Rent", 150_000);
    fixed.is_fixed = true;
    engine
        .create_transaction("alice", fixed.clone())
        .await
        .unwrap();

    let err = engine.create_transaction("alice", fixed).await.unwrap_err();
    assert!(matches!(err, EngineError::ExistingKey(_)));

    // variable transactions may repeat freely
    let coffee = draft(&category_id, "Coffee", 700);
    engine
        .create_transaction("alice", coffee.clone())
        .await
        .unwrap();
    engine.create_transaction("alice", coffee).await.unwrap();
}

#[tokio::test]
async fn list_transactions_filters_and_paginates() {
    let (engine, _db) = engine_with_db().await;
    let food = category(&engine, "Food", TransactionKind::Expense).await;
    let salary = category(&engine, "Salary", TransactionKind::Income).await;

    for day in 1..=5 {
        let mut tx = draft(&food, &format!("Meal {day}"), 1_000 + day as i64);
        tx.date = date(2024, 1, day);
        engine.create_transaction("alice", tx).await.unwrap();
    }
    let mut income = draft(&salary, "January salary", 500_000);
    income.kind = TransactionKind::Income;
    income.date = date(2024, 1, 31);
    engine.create_transaction("alice", income).await.unwrap();
    let mut other_month = draft(&food, "February meal", 2_000);
    other_month.date = date(2024, 2, 1);
    engine.create_transaction("alice", other_month).await.unwrap();

    let filter = TransactionListFilter {
        period: Some(Period::parse("2024-01").unwrap()),
        kind: Some(TransactionKind::Expense),
        category_id: None,
    };
    let page = engine
        .list_transactions("alice", &filter, 1, 3)
        .await
        .unwrap();
    assert_eq!(page.total, 5);
    assert_eq!(page.transactions.len(), 3);
    // newest first
    assert_eq!(page.transactions[0].date, date(2024, 1, 5));

    let second_page = engine
        .list_transactions("alice", &filter, 2, 3)
        .await
        .unwrap();
    assert_eq!(second_page.transactions.len(), 2);

    let by_category = engine
        .list_transactions(
            "alice",
            &TransactionListFilter {
                period: None,
                kind: None,
                category_id: Some(salary.clone()),
            },
            1,
            50,
        )
        .await
        .unwrap();
    assert_eq!(by_category.total, 1);
    assert_eq!(by_category.transactions[0].description, "January salary");
}

#[tokio::test]
async fn update_transaction_rederives_period_on_date_change() {
    let (engine, _db) = engine_with_db().await;
    let category_id = category(&engine, "Food", TransactionKind::Expense).await;

    let tx = engine
        .create_transaction("alice", draft(&category_id, "Groceries", 12_000))
        .await
        .unwrap();

    let updated = engine
        .update_transaction(
            "alice",
            &tx.id,
            TransactionPatch {
                date: Some(date(2024, 3, 2)),
                amount_minor: Some(13_000),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.period.label(), "2024-03");
    assert_eq!(updated.amount_minor, 13_000);

    let march = engine
        .transactions_for_period("alice", Period::parse("2024-03").unwrap())
        .await
        .unwrap();
    assert_eq!(march.len(), 1);

    let err = engine
        .update_transaction("alice", "nope", TransactionPatch::default())
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::KeyNotFound(_)));
}

#[tokio::test]
async fn delete_transaction_is_scoped_to_owner() {
    let (engine, db) = engine_with_db().await;
    let backend = db.get_database_backend();
    db.execute(Statement::from_sql_and_values(
        backend,
        "INSERT INTO users (id, name, email, password) VALUES (?, ?, ?, ?)",
        vec![
            "bob".into(),
            "Bob".into(),
            "bob@example.com".into(),
            "password".into(),
        ],
    ))
    .await
    .unwrap();

    let category_id = category(&engine, "Food", TransactionKind::Expense).await;
    let tx = engine
        .create_transaction("alice", draft(&category_id, "Groceries", 12_000))
        .await
        .unwrap();

    let err = engine.delete_transaction("bob", &tx.id).await.unwrap_err();
    assert!(matches!(err, EngineError::KeyNotFound(_)));

    engine.delete_transaction("alice", &tx.id).await.unwrap();
    assert!(
        engine
            .transactions_for_period("alice", Period::parse("2024-01").unwrap())
            .await
            .unwrap()
            .is_empty()
    );
}

#[tokio::test]
async fn period_stats_aggregate_by_kind_and_fixedness() {
    let (engine, _db) = engine_with_db().await;
    let salary = category(&engine, "Salary", TransactionKind::Income).await;
    let food = category(&engine, "Food", TransactionKind::Expense).await;
    let funds = category(&engine, "Funds", TransactionKind::Investment).await;

    let card_id = engine
        .create_card(
            "alice",
            CardDraft {
                name: "Main card".to_string(),
                last_four_digits: "1234".to_string(),
                brand: CardBrand::Mastercard,
                limit_minor: 500_000,
                closing_day: 25,
                due_day: 5,
                color: "#00AA00".to_string(),
            },
        )
        .await
        .unwrap()
        .id;

    let mut fixed_income = draft(&salary, "Salary", 300_000);
    fixed_income.kind = TransactionKind::Income;
    fixed_income.is_fixed = true;
    engine.create_transaction("alice", fixed_income).await.unwrap();

    let mut variable_income = draft(&salary, "Freelance", 50_000);
    variable_income.kind = TransactionKind::Income;
    engine
        .create_transaction("alice", variable_income)
        .await
        .unwrap();

    let mut fixed_expense = draft(&food, "Meal plan", 100_000);
    fixed_expense.is_fixed = true;
    engine.create_transaction("alice", fixed_expense).await.unwrap();

    let mut card_expense = draft(&food, "Restaurant", 20_000);
    card_expense.credit_card_id = Some(card_id);
    engine.create_transaction("alice", card_expense).await.unwrap();

    let mut investment = draft(&funds, "Index fund", 30_000);
    investment.kind = TransactionKind::Investment;
    engine.create_transaction("alice", investment).await.unwrap();

    let stats = engine
        .period_stats("alice", Period::parse("2024-01").unwrap())
        .await
        .unwrap();
    assert_eq!(stats.total_income_minor, 350_000);
    assert_eq!(stats.fixed_income_minor, 300_000);
    assert_eq!(stats.variable_income_minor, 50_000);
    assert_eq!(stats.total_expenses_minor, 120_000);
    assert_eq!(stats.fixed_expenses_minor, 100_000);
    assert_eq!(stats.variable_expenses_minor, 20_000);
    assert_eq!(stats.total_investments_minor, 30_000);
    assert_eq!(stats.balance_minor, 230_000);
    assert_eq!(stats.credit_card_debt_minor, 20_000);
    assert_eq!(stats.available_credit_minor, 480_000);
}

#[tokio::test]
async fn card_validation_and_toggle() {
    let (engine, _db) = engine_with_db().await;

    let bad_digits = CardDraft {
        name: "Main card".to_string(),
        last_four_digits: "12a4".to_string(),
        brand: CardBrand::Visa,
        limit_minor: 100_000,
        closing_day: 25,
        due_day: 5,
        color: "#00AA00".to_string(),
    };
    assert!(matches!(
        engine.create_card("alice", bad_digits).await,
        Err(EngineError::InvalidField(_))
    ));

    let bad_day = CardDraft {
        name: "Main card".to_string(),
        last_four_digits: "1234".to_string(),
        brand: CardBrand::Visa,
        limit_minor: 100_000,
        closing_day: 25,
        due_day: 32,
        color: "#00AA00".to_string(),
    };
    assert!(matches!(
        engine.create_card("alice", bad_day).await,
        Err(EngineError::InvalidField(_))
    ));

    let card = engine
        .create_card(
            "alice",
            CardDraft {
                name: "Main card".to_string(),
                last_four_digits: "1234".to_string(),
                brand: CardBrand::Visa,
                limit_minor: 100_000,
                closing_day: 25,
                due_day: 5,
                color: "#00AA00".to_string(),
            },
        )
        .await
        .unwrap();
    assert!(card.is_active);

    let toggled = engine.toggle_card("alice", &card.id).await.unwrap();
    assert!(!toggled.is_active);

    let inactive = engine.list_cards("alice", Some(false)).await.unwrap();
    assert_eq!(inactive.len(), 1);
    assert!(engine.list_cards("alice", Some(true)).await.unwrap().is_empty());
}

#[tokio::test]
async fn budget_goals_upsert_roundtrip() {
    let (engine, _db) = engine_with_db().await;

    let err = engine.budget_goals("alice").await.unwrap_err();
    assert!(matches!(err, EngineError::KeyNotFound(_)));

    let incomplete = serde_json::json!({"summary": "halfway there"});
    assert!(matches!(
        engine.upsert_budget_goals("alice", incomplete).await,
        Err(EngineError::InvalidField(_))
    ));

    let goals = serde_json::json!({
        "summary": "save more",
        "averageMonthlyIncome": 350000,
        "categoryGoals": {"Food": 80000},
        "idealBudgetBreakdown": {"needs": 50, "wants": 30, "savings": 20},
    });
    let (stored, created) = engine
        .upsert_budget_goals("alice", goals.clone())
        .await
        .unwrap();
    assert!(created);
    assert_eq!(stored.goals, goals);

    let mut replacement = goals.clone();
    replacement["summary"] = serde_json::json!("save even more");
    let (updated, created) = engine
        .upsert_budget_goals("alice", replacement.clone())
        .await
        .unwrap();
    assert!(!created);
    assert_eq!(updated.id, stored.id);
    assert_eq!(updated.goals, replacement);

    engine.delete_budget_goals("alice").await.unwrap();
    assert!(engine.budget_goals("alice").await.is_err());
}

#[tokio::test]
async fn analyses_are_unique_per_period_and_listed_newest_first() {
    let (engine, _db) = engine_with_db().await;

    let analysis = serde_json::json!({
        "summary": "steady month",
        "insights": ["income stable"],
        "suggestions": [],
        "riskLevel": "low",
        "score": 82,
    });

    assert!(matches!(
        engine
            .upsert_analysis("alice", "2024-1", analysis.clone())
            .await,
        Err(EngineError::InvalidPeriod(_))
    ));
    assert!(matches!(
        engine
            .upsert_analysis("alice", "2024-01", serde_json::json!({"summary": "no score"}))
            .await,
        Err(EngineError::InvalidField(_))
    ));

    let (first, created) = engine
        .upsert_analysis("alice", "2024-01", analysis.clone())
        .await
        .unwrap();
    assert!(created);
    engine
        .upsert_analysis("alice", "2024-02", analysis.clone())
        .await
        .unwrap();

    let (replaced, created) = engine
        .upsert_analysis("alice", "2024-01", analysis.clone())
        .await
        .unwrap();
    assert!(!created);
    assert_eq!(replaced.id, first.id);

    let page = engine.list_analyses("alice", 1, 10).await.unwrap();
    assert_eq!(page.total, 2);
    assert_eq!(page.analyses[0].period.label(), "2024-02");
    assert_eq!(page.analyses[1].period.label(), "2024-01");

    let fetched = engine.analysis("alice", "2024-02").await.unwrap();
    assert_eq!(fetched.period.label(), "2024-02");

    engine.delete_analysis("alice", "2024-02").await.unwrap();
    assert!(engine.analysis("alice", "2024-02").await.is_err());
}
