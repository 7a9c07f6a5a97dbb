//! Period duplication endpoints.
//!
//! Three presets over the engine's single duplicate operation; the response
//! shapes are part of the public contract.

use api_types::ApiResponse;
use api_types::duplication::{DuplicatePeriod, DuplicateTransactions};
use axum::{
    Extension, Json,
    extract::{Path, State},
};
use engine::DuplicationOptions;

use crate::{ServerError, auth, server::ServerState};

pub async fn duplicate_transactions(
    Extension(user): Extension<auth::Model>,
    State(state): State<ServerState>,
    Path((source, target)): Path<(String, String)>,
) -> Result<Json<ApiResponse<DuplicateTransactions>>, ServerError> {
    let report = state
        .engine
        .duplicate_period(&user.id, &source, &target, DuplicationOptions::fixed_only())
        .await?;

    let message = format!(
        "fixed transactions duplicated from {source} to {target}: {} created, {} already existed",
        report.created_transactions, report.already_exists_transactions
    );
    let data = DuplicateTransactions {
        source_month: source,
        target_month: target,
        duplicated_count: report.created_transactions,
        already_exists_count: report.already_exists_transactions,
    };
    Ok(Json(ApiResponse::ok(message, data)))
}

pub async fn duplicate_cards(
    Extension(user): Extension<auth::Model>,
    State(state): State<ServerState>,
    Path((source, target)): Path<(String, String)>,
) -> Result<Json<ApiResponse<DuplicatePeriod>>, ServerError> {
    let report = state
        .engine
        .duplicate_period(&user.id, &source, &target, DuplicationOptions::card_cycle())
        .await?;

    let message = format!(
        "card transactions and bills duplicated from {source} to {target}: \
         {} created, {} transactions and {} bills already existed",
        report.created_transactions + report.created_bills,
        report.already_exists_transactions,
        report.already_exists_bills
    );
    let data = DuplicatePeriod {
        source_month: source,
        target_month: target,
        duplicated_count: report.created_transactions + report.created_bills,
        already_exists_transactions_count: report.already_exists_transactions,
        already_exists_bills_count: report.already_exists_bills,
    };
    Ok(Json(ApiResponse::ok(message, data)))
}

pub async fn duplicate_month(
    Extension(user): Extension<auth::Model>,
    State(state): State<ServerState>,
    Path((source, target)): Path<(String, String)>,
) -> Result<Json<ApiResponse<DuplicatePeriod>>, ServerError> {
    let report = state
        .engine
        .duplicate_period(&user.id, &source, &target, DuplicationOptions::whole_month())
        .await?;

    let message = format!(
        "month duplicated from {source} to {target}: {} created, \
         {} transactions and {} bills already existed",
        report.created_transactions + report.created_bills,
        report.already_exists_transactions,
        report.already_exists_bills
    );
    let data = DuplicatePeriod {
        source_month: source,
        target_month: target,
        duplicated_count: report.created_transactions + report.created_bills,
        already_exists_transactions_count: report.already_exists_transactions,
        already_exists_bills_count: report.already_exists_bills,
    };
    Ok(Json(ApiResponse::ok(message, data)))
}
