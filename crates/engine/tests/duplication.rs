use chrono::NaiveDate;
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, Statement};

use engine::{
    CardBrand, CardDraft, DuplicationOptions, Engine, EngineError, Period, TransactionDraft,
    TransactionKind,
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

fn fixed_draft(category_id: &str, description: &str, amount_minor: i64) -> TransactionDraft {
    TransactionDraft {
        category_id: category_id.to_string(),
        description: description.to_string(),
        amount_minor,
        date: date(2024, 1, 5),
        kind: TransactionKind::Expense,
        is_paid: false,
        is_fixed: true,
        is_recurring: false,
        recurring_rule: None,
        day_of_month: None,
        credit_card_id: None,
        installment_info: None,
    }
}

async fn expense_category(engine: &Engine) -> String {
    engine
        .create_category("alice", "Housing", TransactionKind::Expense, "#AA0000")
        .await
        .unwrap()
        .id
}

async fn card(engine: &Engine, due_day: u32) -> String {
    engine
        .create_card(
            "alice",
            CardDraft {
                name: "Main card".to_string(),
                last_four_digits: "4242".to_string(),
                brand: CardBrand::Visa,
                limit_minor: 1_000_000,
                closing_day: 25,
                due_day,
                color: "#0000AA".to_string(),
            },
        )
        .await
        .unwrap()
        .id
}

async fn seed_bill(db: &DatabaseConnection, card_id: &str, period: &str, total_minor: i64) {
    let backend = db.get_database_backend();
    db.execute(Statement::from_sql_and_values(
        backend,
        "INSERT INTO credit_card_bills \
         (id, user_id, card_id, period, total_amount_minor, paid_amount_minor, \
          due_date, status, transaction_refs) \
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
        vec![
            format!("bill-{period}-{card_id}").into(),
            "alice".into(),
            card_id.into(),
            period.into(),
            total_minor.into(),
            0i64.into(),
            format!("{period}-10").into(),
            "pending".into(),
            "[]".into(),
        ],
    ))
    .await
    .unwrap();
}

#[tokio::test]
async fn duplicates_fixed_transaction_and_is_idempotent() {
    let (engine, _db) = engine_with_db().await;
    let category_id = expense_category(&engine).await;

    let mut draft = fixed_draft(&category_id, "Rent", 150_000);
    draft.day_of_month = Some(5);
    draft.is_paid = true;
    engine.create_transaction("alice", draft).await.unwrap();

    let report = engine
        .duplicate_period("alice", "2024-01", "2024-02", DuplicationOptions::fixed_only())
        .await
        .unwrap();
    assert_eq!(report.created_transactions, 1);
    assert_eq!(report.already_exists_transactions, 0);
    assert_eq!(report.created_bills, 0);

    let duplicated = engine
        .transactions_for_period("alice", Period::parse("2024-02").unwrap())
        .await
        .unwrap();
    assert_eq!(duplicated.len(), 1);
    assert_eq!(duplicated[0].date, date(2024, 2, 5));
    assert_eq!(duplicated[0].amount_minor, 150_000);
    assert_eq!(duplicated[0].period.label(), "2024-02");
    // duplicates always start unpaid, whatever the source says
    assert!(!duplicated[0].is_paid);
    assert!(duplicated[0].is_fixed);

    // second run creates nothing and reports the existing duplicate
    let rerun = engine
        .duplicate_period("alice", "2024-01", "2024-02", DuplicationOptions::fixed_only())
        .await
        .unwrap();
    assert_eq!(rerun.created_transactions, 0);
    assert_eq!(rerun.already_exists_transactions, 1);

    let after_rerun = engine
        .transactions_for_period("alice", Period::parse("2024-02").unwrap())
        .await
        .unwrap();
    assert_eq!(after_rerun.len(), 1);
}

#[tokio::test]
async fn day_clamps_to_target_month_length() {
    let (engine, _db) = engine_with_db().await;
    let category_id = expense_category(&engine).await;

    let mut draft = fixed_draft(&category_id, "Subscription", 20_000);
    draft.date = date(2024, 1, 31);
    engine.create_transaction("alice", draft).await.unwrap();

    for (target, expected) in [
        ("2024-04", date(2024, 4, 30)),
        ("2024-02", date(2024, 2, 29)),
        ("2023-02", date(2023, 2, 28)),
    ] {
        engine
            .duplicate_period("alice", "2024-01", target, DuplicationOptions::fixed_only())
            .await
            .unwrap();
        let duplicated = engine
            .transactions_for_period("alice", Period::parse(target).unwrap())
            .await
            .unwrap();
        assert_eq!(duplicated.len(), 1, "target {target}");
        assert_eq!(duplicated[0].date, expected, "target {target}");
    }
}

#[tokio::test]
async fn anchor_day_beats_source_date() {
    let (engine, _db) = engine_with_db().await;
    let category_id = expense_category(&engine).await;

    let mut draft = fixed_draft(&category_id, "Gym", 9_900);
    draft.date = date(2024, 1, 17);
    draft.day_of_month = Some(31);
    engine.create_transaction("alice", draft).await.unwrap();

    engine
        .duplicate_period("alice", "2024-01", "2024-06", DuplicationOptions::fixed_only())
        .await
        .unwrap();

    let duplicated = engine
        .transactions_for_period("alice", Period::parse("2024-06").unwrap())
        .await
        .unwrap();
    assert_eq!(duplicated[0].date, date(2024, 6, 30));
    assert_eq!(duplicated[0].day_of_month, Some(31));
}

#[tokio::test]
async fn card_scope_filters_both_directions() {
    let (engine, _db) = engine_with_db().await;
    let category_id = expense_category(&engine).await;
    let card_id = card(&engine, 15).await;

    engine
        .create_transaction("alice", fixed_draft(&category_id, "Rent", 150_000))
        .await
        .unwrap();
    let mut card_tx = fixed_draft(&category_id, "Streaming", 4_500);
    card_tx.credit_card_id = Some(card_id.clone());
    engine.create_transaction("alice", card_tx).await.unwrap();

    // card-excluding variant never produces the card transaction
    let report = engine
        .duplicate_period("alice", "2024-01", "2024-02", DuplicationOptions::fixed_only())
        .await
        .unwrap();
    assert_eq!(report.created_transactions, 1);
    let february = engine
        .transactions_for_period("alice", Period::parse("2024-02").unwrap())
        .await
        .unwrap();
    assert_eq!(february.len(), 1);
    assert_eq!(february[0].description, "Rent");
    assert!(february[0].credit_card_id.is_none());

    // card-only variant never produces the plain transaction
    let report = engine
        .duplicate_period("alice", "2024-01", "2024-03", DuplicationOptions::card_cycle())
        .await
        .unwrap();
    assert_eq!(report.created_transactions, 1);
    let march = engine
        .transactions_for_period("alice", Period::parse("2024-03").unwrap())
        .await
        .unwrap();
    assert_eq!(march.len(), 1);
    assert_eq!(march[0].description, "Streaming");
    assert_eq!(march[0].credit_card_id.as_deref(), Some(card_id.as_str()));
}

#[tokio::test]
async fn non_fixed_transactions_are_never_duplicated() {
    let (engine, _db) = engine_with_db().await;
    let category_id = expense_category(&engine).await;

    let mut draft = fixed_draft(&category_id, "One-off dinner", 8_000);
    draft.is_fixed = false;
    engine.create_transaction("alice", draft).await.unwrap();

    let report = engine
        .duplicate_period("alice", "2024-01", "2024-02", DuplicationOptions::whole_month())
        .await
        .unwrap();
    assert_eq!(report.created_transactions, 0);
    assert!(
        engine
            .transactions_for_period("alice", Period::parse("2024-02").unwrap())
            .await
            .unwrap()
            .is_empty()
    );
}

#[tokio::test]
async fn bill_total_comes_from_target_period_not_source_bill() {
    let (engine, db) = engine_with_db().await;
    let category_id = expense_category(&engine).await;
    let card_id = card(&engine, 31).await;

    let mut first = fixed_draft(&category_id, "Streaming", 20_000);
    first.date = date(2024, 1, 31);
    first.credit_card_id = Some(card_id.clone());
    engine.create_transaction("alice", first).await.unwrap();

    let mut second = fixed_draft(&category_id, "Cloud storage", 10_000);
    second.credit_card_id = Some(card_id.clone());
    engine.create_transaction("alice", second).await.unwrap();

    // source bill total is stale on purpose; the duplicated bill must not
    // copy it
    seed_bill(&db, &card_id, "2024-01", 99_999).await;

    let report = engine
        .duplicate_period("alice", "2024-01", "2024-04", DuplicationOptions::card_cycle())
        .await
        .unwrap();
    assert_eq!(report.created_transactions, 2);
    assert_eq!(report.created_bills, 1);

    let bills = engine.bills_for_card("alice", &card_id).await.unwrap();
    let april_bill = bills
        .iter()
        .find(|bill| bill.period.label() == "2024-04")
        .unwrap();
    assert_eq!(april_bill.total_amount_minor, 30_000);
    assert_eq!(april_bill.paid_amount_minor, 0);
    assert_eq!(april_bill.status, engine::BillStatus::Pending);
    // due day 31 clamps to April's last day
    assert_eq!(april_bill.due_date, date(2024, 4, 30));
    assert_eq!(april_bill.transactions.len(), 2);

    let april = engine
        .transactions_for_period("alice", Period::parse("2024-04").unwrap())
        .await
        .unwrap();
    let total: i64 = april.iter().map(|tx| tx.amount_minor).sum();
    assert_eq!(total, april_bill.total_amount_minor);
    for tx in &april {
        assert!(april_bill.transactions.contains(&tx.id));
    }
}

#[tokio::test]
async fn bill_counts_target_transactions_skipped_as_existing() {
    let (engine, db) = engine_with_db().await;
    let category_id = expense_category(&engine).await;
    let card_id = card(&engine, 10).await;

    let mut source_tx = fixed_draft(&category_id, "Streaming", 20_000);
    source_tx.credit_card_id = Some(card_id.clone());
    engine.create_transaction("alice", source_tx).await.unwrap();
    seed_bill(&db, &card_id, "2024-01", 20_000).await;

    // an equivalent transaction already lives in the target period
    let mut existing = fixed_draft(&category_id, "Streaming", 20_000);
    existing.date = date(2024, 2, 5);
    existing.credit_card_id = Some(card_id.clone());
    engine.create_transaction("alice", existing).await.unwrap();

    let report = engine
        .duplicate_period("alice", "2024-01", "2024-02", DuplicationOptions::card_cycle())
        .await
        .unwrap();
    assert_eq!(report.created_transactions, 0);
    assert_eq!(report.already_exists_transactions, 1);
    assert_eq!(report.created_bills, 1);

    // the bill still reflects what the target period actually holds
    let bills = engine.bills_for_card("alice", &card_id).await.unwrap();
    let bill = bills
        .iter()
        .find(|bill| bill.period.label() == "2024-02")
        .unwrap();
    assert_eq!(bill.total_amount_minor, 20_000);
    assert_eq!(bill.transactions.len(), 1);
}

#[tokio::test]
async fn deleted_card_suppresses_only_its_bill() {
    let (engine, db) = engine_with_db().await;
    let card_id = card(&engine, 12).await;
    seed_bill(&db, &card_id, "2024-01", 50_000).await;
    engine.delete_card("alice", &card_id).await.unwrap();

    let report = engine
        .duplicate_period("alice", "2024-01", "2024-02", DuplicationOptions::card_cycle())
        .await
        .unwrap();
    assert_eq!(report.created_bills, 0);
    assert_eq!(report.already_exists_bills, 0);
}

#[tokio::test]
async fn whole_month_creates_empty_bills_and_copies_everything_fixed() {
    let (engine, db) = engine_with_db().await;
    let category_id = expense_category(&engine).await;
    let card_id = card(&engine, 20).await;

    engine
        .create_transaction("alice", fixed_draft(&category_id, "Rent", 150_000))
        .await
        .unwrap();
    let mut card_tx = fixed_draft(&category_id, "Streaming", 4_500);
    card_tx.credit_card_id = Some(card_id.clone());
    engine.create_transaction("alice", card_tx).await.unwrap();
    seed_bill(&db, &card_id, "2024-01", 4_500).await;

    let report = engine
        .duplicate_period("alice", "2024-01", "2024-02", DuplicationOptions::whole_month())
        .await
        .unwrap();
    assert_eq!(report.created_transactions, 2);
    assert_eq!(report.created_bills, 1);

    let bills = engine.bills_for_card("alice", &card_id).await.unwrap();
    let bill = bills
        .iter()
        .find(|bill| bill.period.label() == "2024-02")
        .unwrap();
    assert_eq!(bill.total_amount_minor, 0);
    assert!(bill.transactions.is_empty());
    assert_eq!(bill.due_date, date(2024, 2, 20));

    let rerun = engine
        .duplicate_period("alice", "2024-01", "2024-02", DuplicationOptions::whole_month())
        .await
        .unwrap();
    assert_eq!(rerun.created_transactions, 0);
    assert_eq!(rerun.created_bills, 0);
    assert_eq!(rerun.already_exists_transactions, 2);
    assert_eq!(rerun.already_exists_bills, 1);
}

#[tokio::test]
async fn existing_target_bill_is_reported_not_replaced() {
    let (engine, db) = engine_with_db().await;
    let card_id = card(&engine, 8).await;
    seed_bill(&db, &card_id, "2024-01", 10_000).await;
    seed_bill(&db, &card_id, "2024-02", 77_000).await;

    let report = engine
        .duplicate_period("alice", "2024-01", "2024-02", DuplicationOptions::card_cycle())
        .await
        .unwrap();
    assert_eq!(report.created_bills, 0);
    assert_eq!(report.already_exists_bills, 1);

    // untouched target bill
    let bills = engine.bills_for_card("alice", &card_id).await.unwrap();
    let bill = bills
        .iter()
        .find(|bill| bill.period.label() == "2024-02")
        .unwrap();
    assert_eq!(bill.total_amount_minor, 77_000);
}

#[tokio::test]
async fn malformed_periods_are_rejected_before_any_work() {
    let (engine, _db) = engine_with_db().await;

    for (source, target) in [("2024-1", "2024-02"), ("2024-01", "2024-13"), ("x", "y")] {
        let err = engine
            .duplicate_period("alice", source, target, DuplicationOptions::fixed_only())
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::InvalidPeriod(_)), "{source}->{target}");
    }
}

#[tokio::test]
async fn duplication_is_scoped_to_the_requesting_user() {
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

    let category_id = expense_category(&engine).await;
    engine
        .create_transaction("alice", fixed_draft(&category_id, "Rent", 150_000))
        .await
        .unwrap();

    let report = engine
        .duplicate_period("bob", "2024-01", "2024-02", DuplicationOptions::fixed_only())
        .await
        .unwrap();
    assert_eq!(report.created_transactions, 0);
    assert!(
        engine
            .transactions_for_period("bob", Period::parse("2024-02").unwrap())
            .await
            .unwrap()
            .is_empty()
    );
}
