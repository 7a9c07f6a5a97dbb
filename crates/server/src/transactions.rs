//! Transactions API endpoints.

use api_types::transaction::{
    InstallmentInfo, RecurringRule, TransactionListQuery, TransactionListResponse, TransactionNew,
    TransactionUpdate, TransactionView,
};
use api_types::{ApiResponse, Pagination, stats::DashboardStats};
use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
};

use crate::categories::{api_kind, engine_kind};
use crate::{ServerError, auth, server::ServerState};

const DEFAULT_PAGE_SIZE: u64 = 50;

fn engine_rule(rule: RecurringRule) -> Result<engine::RecurringRule, ServerError> {
    let frequency = match rule.frequency.as_str() {
        "daily" => engine::RecurringFrequency::Daily,
        "weekly" => engine::RecurringFrequency::Weekly,
        "monthly" => engine::RecurringFrequency::Monthly,
        "yearly" => engine::RecurringFrequency::Yearly,
        other => {
            return Err(ServerError::Generic(format!(
                "invalid recurring rule type: {other}"
            )));
        }
    };
    Ok(engine::RecurringRule {
        frequency,
        interval: rule.interval,
        day_of_month: rule.day_of_month,
        day_of_week: rule.day_of_week,
        end_date: rule.end_date,
        max_occurrences: rule.max_occurrences,
    })
}

fn api_rule(rule: engine::RecurringRule) -> RecurringRule {
    let frequency = match rule.frequency {
        engine::RecurringFrequency::Daily => "daily",
        engine::RecurringFrequency::Weekly => "weekly",
        engine::RecurringFrequency::Monthly => "monthly",
        engine::RecurringFrequency::Yearly => "yearly",
    };
    RecurringRule {
        frequency: frequency.to_string(),
        interval: rule.interval,
        day_of_month: rule.day_of_month,
        day_of_week: rule.day_of_week,
        end_date: rule.end_date,
        max_occurrences: rule.max_occurrences,
    }
}

fn map_transaction(tx: engine::Transaction) -> TransactionView {
    TransactionView {
        id: tx.id,
        category_id: tx.category_id,
        description: tx.description,
        amount_minor: tx.amount_minor,
        date: tx.date,
        kind: api_kind(tx.kind),
        is_paid: tx.is_paid,
        is_fixed: tx.is_fixed,
        is_recurring: tx.is_recurring,
        recurring_rule: tx.recurring_rule.map(api_rule),
        day_of_month: tx.day_of_month,
        credit_card_id: tx.credit_card_id,
        installment_info: tx.installment_info.map(|info| InstallmentInfo {
            total_installments: info.total_installments,
            current_installment: info.current_installment,
            installment_amount_minor: info.installment_amount_minor,
        }),
        month: tx.period.label(),
    }
}

fn pagination(page: u64, limit: u64, total: u64) -> Pagination {
    Pagination {
        page,
        limit,
        total,
        pages: total.div_ceil(limit.max(1)),
    }
}

pub async fn list(
    Extension(user): Extension<auth::Model>,
    State(state): State<ServerState>,
    Query(query): Query<TransactionListQuery>,
) -> Result<Json<ApiResponse<TransactionListResponse>>, ServerError> {
    let period = query
        .month
        .as_deref()
        .map(engine::Period::parse)
        .transpose()?;
    let filter = engine::TransactionListFilter {
        period,
        kind: query.kind.map(engine_kind),
        category_id: query.category_id,
    };

    let page = state
        .engine
        .list_transactions(
            &user.id,
            &filter,
            query.page.unwrap_or(1),
            query.limit.unwrap_or(DEFAULT_PAGE_SIZE),
        )
        .await?;

    let response = TransactionListResponse {
        transactions: page.transactions.into_iter().map(map_transaction).collect(),
        pagination: pagination(page.page, page.limit, page.total),
    };
    Ok(Json(ApiResponse::ok("transactions found", response)))
}

pub async fn list_for_month(
    Extension(user): Extension<auth::Model>,
    State(state): State<ServerState>,
    Path(period): Path<String>,
) -> Result<Json<ApiResponse<Vec<TransactionView>>>, ServerError> {
    let period = engine::Period::parse(&period)?;

    let transactions = state
        .engine
        .transactions_for_period(&user.id, period)
        .await?
        .into_iter()
        .map(map_transaction)
        .collect();

    Ok(Json(ApiResponse::ok(
        "transactions of the month found",
        transactions,
    )))
}

pub async fn create(
    Extension(user): Extension<auth::Model>,
    State(state): State<ServerState>,
    Json(payload): Json<TransactionNew>,
) -> Result<(StatusCode, Json<ApiResponse<TransactionView>>), ServerError> {
    let draft = engine::TransactionDraft {
        category_id: payload.category_id,
        description: payload.description,
        amount_minor: payload.amount_minor,
        date: payload.date,
        kind: engine_kind(payload.kind),
        is_paid: payload.is_paid,
        is_fixed: payload.is_fixed,
        is_recurring: payload.is_recurring,
        recurring_rule: payload.recurring_rule.map(engine_rule).transpose()?,
        day_of_month: payload.day_of_month,
        credit_card_id: payload.credit_card_id,
        installment_info: payload.installment_info.map(|info| engine::InstallmentInfo {
            total_installments: info.total_installments,
            current_installment: info.current_installment,
            installment_amount_minor: info.installment_amount_minor,
        }),
    };

    let tx = state.engine.create_transaction(&user.id, draft).await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok(
            "transaction created successfully",
            map_transaction(tx),
        )),
    ))
}

pub async fn update(
    Extension(user): Extension<auth::Model>,
    State(state): State<ServerState>,
    Path(transaction_id): Path<String>,
    Json(payload): Json<TransactionUpdate>,
) -> Result<Json<ApiResponse<TransactionView>>, ServerError> {
    let patch = engine::TransactionPatch {
        category_id: payload.category_id,
        description: payload.description,
        amount_minor: payload.amount_minor,
        date: payload.date,
        kind: payload.kind.map(engine_kind),
        is_paid: payload.is_paid,
        is_fixed: payload.is_fixed,
        day_of_month: payload.day_of_month,
    };

    let tx = state
        .engine
        .update_transaction(&user.id, &transaction_id, patch)
        .await?;

    Ok(Json(ApiResponse::ok(
        "transaction updated successfully",
        map_transaction(tx),
    )))
}

pub async fn remove(
    Extension(user): Extension<auth::Model>,
    State(state): State<ServerState>,
    Path(transaction_id): Path<String>,
) -> Result<Json<ApiResponse<()>>, ServerError> {
    state
        .engine
        .delete_transaction(&user.id, &transaction_id)
        .await?;

    Ok(Json(ApiResponse::message("transaction deleted successfully")))
}

pub async fn stats(
    Extension(user): Extension<auth::Model>,
    State(state): State<ServerState>,
    Path(period): Path<String>,
) -> Result<Json<ApiResponse<DashboardStats>>, ServerError> {
    let period = engine::Period::parse(&period)?;
    let stats = state.engine.period_stats(&user.id, period).await?;

    let data = DashboardStats {
        total_income_minor: stats.total_income_minor,
        total_expenses_minor: stats.total_expenses_minor,
        total_investments_minor: stats.total_investments_minor,
        balance_minor: stats.balance_minor,
        fixed_income_minor: stats.fixed_income_minor,
        variable_income_minor: stats.variable_income_minor,
        fixed_expenses_minor: stats.fixed_expenses_minor,
        variable_expenses_minor: stats.variable_expenses_minor,
        credit_card_debt_minor: stats.credit_card_debt_minor,
        available_credit_minor: stats.available_credit_minor,
    };
    Ok(Json(ApiResponse::ok("statistics calculated", data)))
}
