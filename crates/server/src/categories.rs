//! Categories API endpoints.

use api_types::ApiResponse;
use api_types::category::{CategoryKind, CategoryNew, CategoryView};
use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};

use crate::{ServerError, auth, server::ServerState};

pub(crate) fn engine_kind(kind: CategoryKind) -> engine::TransactionKind {
    match kind {
        CategoryKind::Income => engine::TransactionKind::Income,
        CategoryKind::Expense => engine::TransactionKind::Expense,
        CategoryKind::Investment => engine::TransactionKind::Investment,
    }
}

pub(crate) fn api_kind(kind: engine::TransactionKind) -> CategoryKind {
    match kind {
        engine::TransactionKind::Income => CategoryKind::Income,
        engine::TransactionKind::Expense => CategoryKind::Expense,
        engine::TransactionKind::Investment => CategoryKind::Investment,
    }
}

fn map_category(category: engine::Category) -> CategoryView {
    CategoryView {
        id: category.id,
        name: category.name,
        kind: api_kind(category.kind),
        color: category.color,
    }
}

pub async fn list(
    Extension(user): Extension<auth::Model>,
    State(state): State<ServerState>,
) -> Result<Json<ApiResponse<Vec<CategoryView>>>, ServerError> {
    let categories = state
        .engine
        .list_categories(&user.id)
        .await?
        .into_iter()
        .map(map_category)
        .collect();

    Ok(Json(ApiResponse::ok("categories found", categories)))
}

pub async fn list_by_kind(
    Extension(user): Extension<auth::Model>,
    State(state): State<ServerState>,
    Path(kind): Path<String>,
) -> Result<Json<ApiResponse<Vec<CategoryView>>>, ServerError> {
    let kind = engine::TransactionKind::try_from(kind.as_str())
        .map_err(|_| ServerError::Generic("invalid type".to_string()))?;

    let categories = state
        .engine
        .categories_by_kind(&user.id, kind)
        .await?
        .into_iter()
        .map(map_category)
        .collect();

    Ok(Json(ApiResponse::ok("categories found", categories)))
}

pub async fn create(
    Extension(user): Extension<auth::Model>,
    State(state): State<ServerState>,
    Json(payload): Json<CategoryNew>,
) -> Result<(StatusCode, Json<ApiResponse<CategoryView>>), ServerError> {
    let category = state
        .engine
        .create_category(
            &user.id,
            &payload.name,
            engine_kind(payload.kind),
            &payload.color,
        )
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok(
            "category created successfully",
            map_category(category),
        )),
    ))
}

pub async fn update(
    Extension(user): Extension<auth::Model>,
    State(state): State<ServerState>,
    Path(category_id): Path<String>,
    Json(payload): Json<CategoryNew>,
) -> Result<Json<ApiResponse<CategoryView>>, ServerError> {
    let category = state
        .engine
        .update_category(
            &user.id,
            &category_id,
            &payload.name,
            engine_kind(payload.kind),
            &payload.color,
        )
        .await?;

    Ok(Json(ApiResponse::ok(
        "category updated successfully",
        map_category(category),
    )))
}

pub async fn remove(
    Extension(user): Extension<auth::Model>,
    State(state): State<ServerState>,
    Path(category_id): Path<String>,
) -> Result<Json<ApiResponse<()>>, ServerError> {
    state.engine.delete_category(&user.id, &category_id).await?;

    Ok(Json(ApiResponse::message("category deleted successfully")))
}
