//! Budget goals API endpoints.

use api_types::ApiResponse;
use api_types::goals::{BudgetGoalsUpsert, BudgetGoalsView};
use axum::{Extension, Json, extract::State, http::StatusCode};

use crate::{ServerError, auth, server::ServerState};

fn map_goals(goals: engine::BudgetGoals) -> BudgetGoalsView {
    BudgetGoalsView {
        id: goals.id,
        goals: goals.goals,
    }
}

pub async fn get_goals(
    Extension(user): Extension<auth::Model>,
    State(state): State<ServerState>,
) -> Result<Json<ApiResponse<BudgetGoalsView>>, ServerError> {
    let goals = state.engine.budget_goals(&user.id).await?;

    Ok(Json(ApiResponse::ok("goals found", map_goals(goals))))
}

pub async fn upsert(
    Extension(user): Extension<auth::Model>,
    State(state): State<ServerState>,
    Json(payload): Json<BudgetGoalsUpsert>,
) -> Result<(StatusCode, Json<ApiResponse<BudgetGoalsView>>), ServerError> {
    let (goals, created) = state
        .engine
        .upsert_budget_goals(&user.id, payload.goals)
        .await?;

    let message = if created {
        "goals created successfully"
    } else {
        "goals updated successfully"
    };
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok(message, map_goals(goals))),
    ))
}

pub async fn remove(
    Extension(user): Extension<auth::Model>,
    State(state): State<ServerState>,
) -> Result<Json<ApiResponse<()>>, ServerError> {
    state.engine.delete_budget_goals(&user.id).await?;

    Ok(Json(ApiResponse::message("goals deleted successfully")))
}
