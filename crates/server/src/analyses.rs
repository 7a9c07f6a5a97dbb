//! AI analysis API endpoints.

use api_types::analysis::{AnalysisListQuery, AnalysisListResponse, AnalysisUpsert, AnalysisView};
use api_types::{ApiResponse, Pagination};
use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
};

use crate::{ServerError, auth, server::ServerState};

const DEFAULT_PAGE_SIZE: u64 = 10;

fn map_analysis(analysis: engine::AiAnalysis) -> AnalysisView {
    AnalysisView {
        id: analysis.id,
        month: analysis.period.label(),
        analysis: analysis.analysis,
    }
}

pub async fn list(
    Extension(user): Extension<auth::Model>,
    State(state): State<ServerState>,
    Query(query): Query<AnalysisListQuery>,
) -> Result<Json<ApiResponse<AnalysisListResponse>>, ServerError> {
    let page = state
        .engine
        .list_analyses(
            &user.id,
            query.page.unwrap_or(1),
            query.limit.unwrap_or(DEFAULT_PAGE_SIZE),
        )
        .await?;

    let response = AnalysisListResponse {
        analyses: page.analyses.into_iter().map(map_analysis).collect(),
        pagination: Pagination {
            page: page.page,
            limit: page.limit,
            total: page.total,
            pages: page.total.div_ceil(page.limit.max(1)),
        },
    };
    Ok(Json(ApiResponse::ok("analyses found", response)))
}

pub async fn get_analysis(
    Extension(user): Extension<auth::Model>,
    State(state): State<ServerState>,
    Path(period): Path<String>,
) -> Result<Json<ApiResponse<AnalysisView>>, ServerError> {
    let analysis = state.engine.analysis(&user.id, &period).await?;

    Ok(Json(ApiResponse::ok(
        "analysis found",
        map_analysis(analysis),
    )))
}

pub async fn upsert(
    Extension(user): Extension<auth::Model>,
    State(state): State<ServerState>,
    Json(payload): Json<AnalysisUpsert>,
) -> Result<(StatusCode, Json<ApiResponse<AnalysisView>>), ServerError> {
    let (analysis, created) = state
        .engine
        .upsert_analysis(&user.id, &payload.month, payload.analysis)
        .await?;

    let message = if created {
        "analysis created successfully"
    } else {
        "analysis updated successfully"
    };
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok(message, map_analysis(analysis))),
    ))
}

pub async fn remove(
    Extension(user): Extension<auth::Model>,
    State(state): State<ServerState>,
    Path(period): Path<String>,
) -> Result<Json<ApiResponse<()>>, ServerError> {
    state.engine.delete_analysis(&user.id, &period).await?;

    Ok(Json(ApiResponse::message("analysis deleted successfully")))
}
