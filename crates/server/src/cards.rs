//! Credit cards API endpoints.

use api_types::ApiResponse;
use api_types::bill::{BillStatus, BillView};
use api_types::card::{CardBrand, CardListQuery, CreditCardNew, CreditCardView};
use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
};

use crate::{ServerError, auth, server::ServerState};

fn engine_brand(brand: CardBrand) -> engine::CardBrand {
    match brand {
        CardBrand::Visa => engine::CardBrand::Visa,
        CardBrand::Mastercard => engine::CardBrand::Mastercard,
        CardBrand::Amex => engine::CardBrand::Amex,
        CardBrand::Elo => engine::CardBrand::Elo,
        CardBrand::Other => engine::CardBrand::Other,
    }
}

fn api_brand(brand: engine::CardBrand) -> CardBrand {
    match brand {
        engine::CardBrand::Visa => CardBrand::Visa,
        engine::CardBrand::Mastercard => CardBrand::Mastercard,
        engine::CardBrand::Amex => CardBrand::Amex,
        engine::CardBrand::Elo => CardBrand::Elo,
        engine::CardBrand::Other => CardBrand::Other,
    }
}

fn map_card(card: engine::CreditCard) -> CreditCardView {
    CreditCardView {
        id: card.id,
        name: card.name,
        last_four_digits: card.last_four_digits,
        brand: api_brand(card.brand),
        limit_minor: card.limit_minor,
        closing_day: card.closing_day,
        due_day: card.due_day,
        color: card.color,
        is_active: card.is_active,
    }
}

fn map_bill(bill: engine::CreditCardBill) -> BillView {
    BillView {
        id: bill.id,
        card_id: bill.card_id,
        month: bill.period.label(),
        total_amount_minor: bill.total_amount_minor,
        paid_amount_minor: bill.paid_amount_minor,
        due_date: bill.due_date,
        status: match bill.status {
            engine::BillStatus::Pending => BillStatus::Pending,
            engine::BillStatus::Paid => BillStatus::Paid,
            engine::BillStatus::Overdue => BillStatus::Overdue,
        },
        transactions: bill.transactions,
    }
}

fn draft(payload: CreditCardNew) -> engine::CardDraft {
    engine::CardDraft {
        name: payload.name,
        last_four_digits: payload.last_four_digits,
        brand: engine_brand(payload.brand),
        limit_minor: payload.limit_minor,
        closing_day: payload.closing_day,
        due_day: payload.due_day,
        color: payload.color,
    }
}

pub async fn list(
    Extension(user): Extension<auth::Model>,
    State(state): State<ServerState>,
    Query(query): Query<CardListQuery>,
) -> Result<Json<ApiResponse<Vec<CreditCardView>>>, ServerError> {
    let cards = state
        .engine
        .list_cards(&user.id, query.active)
        .await?
        .into_iter()
        .map(map_card)
        .collect();

    Ok(Json(ApiResponse::ok("cards found", cards)))
}

pub async fn get_card(
    Extension(user): Extension<auth::Model>,
    State(state): State<ServerState>,
    Path(card_id): Path<String>,
) -> Result<Json<ApiResponse<CreditCardView>>, ServerError> {
    let card = state.engine.card(&user.id, &card_id).await?;

    Ok(Json(ApiResponse::ok("card found", map_card(card))))
}

pub async fn create(
    Extension(user): Extension<auth::Model>,
    State(state): State<ServerState>,
    Json(payload): Json<CreditCardNew>,
) -> Result<(StatusCode, Json<ApiResponse<CreditCardView>>), ServerError> {
    let card = state.engine.create_card(&user.id, draft(payload)).await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok("card created successfully", map_card(card))),
    ))
}

pub async fn update(
    Extension(user): Extension<auth::Model>,
    State(state): State<ServerState>,
    Path(card_id): Path<String>,
    Json(payload): Json<CreditCardNew>,
) -> Result<Json<ApiResponse<CreditCardView>>, ServerError> {
    let card = state
        .engine
        .update_card(&user.id, &card_id, draft(payload))
        .await?;

    Ok(Json(ApiResponse::ok(
        "card updated successfully",
        map_card(card),
    )))
}

pub async fn remove(
    Extension(user): Extension<auth::Model>,
    State(state): State<ServerState>,
    Path(card_id): Path<String>,
) -> Result<Json<ApiResponse<()>>, ServerError> {
    state.engine.delete_card(&user.id, &card_id).await?;

    Ok(Json(ApiResponse::message("card deleted successfully")))
}

pub async fn toggle(
    Extension(user): Extension<auth::Model>,
    State(state): State<ServerState>,
    Path(card_id): Path<String>,
) -> Result<Json<ApiResponse<CreditCardView>>, ServerError> {
    let card = state.engine.toggle_card(&user.id, &card_id).await?;

    let message = if card.is_active {
        "card activated successfully"
    } else {
        "card deactivated successfully"
    };
    Ok(Json(ApiResponse::ok(message, map_card(card))))
}

pub async fn bills(
    Extension(user): Extension<auth::Model>,
    State(state): State<ServerState>,
    Path(card_id): Path<String>,
) -> Result<Json<ApiResponse<Vec<BillView>>>, ServerError> {
    let bills = state
        .engine
        .bills_for_card(&user.id, &card_id)
        .await?
        .into_iter()
        .map(map_bill)
        .collect();

    Ok(Json(ApiResponse::ok("bills found", bills)))
}
