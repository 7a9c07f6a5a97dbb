use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Request, State},
    http::StatusCode,
    middleware::{self, Next},
    response::Response,
    routing::{get, patch, post, put},
};
use axum_extra::{
    TypedHeader,
    headers::{Authorization, authorization::Basic},
};
use chrono::Utc;
use sea_orm::DatabaseConnection;

use api_types::{ApiResponse, health::Health};
use engine::Engine;

use crate::{analyses, auth, cards, categories, goals, periods, transactions};

#[derive(Clone)]
pub struct ServerState {
    pub engine: Arc<Engine>,
    pub db: DatabaseConnection,
}

/// Resolves the caller from Basic credentials and injects the user row into
/// the request extensions. Missing or unknown credentials never reach a
/// handler.
async fn require_auth(
    credentials: Option<TypedHeader<Authorization<Basic>>>,
    State(state): State<ServerState>,
    mut request: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    let Some(TypedHeader(credentials)) = credentials else {
        return Err(StatusCode::UNAUTHORIZED);
    };
    if credentials.username().is_empty() || credentials.password().is_empty() {
        return Err(StatusCode::UNAUTHORIZED);
    }

    let user =
        auth::find_by_credentials(&state.db, credentials.username(), credentials.password())
            .await
            .map_err(|_| StatusCode::UNAUTHORIZED)?
            .ok_or(StatusCode::UNAUTHORIZED)?;

    request.extensions_mut().insert(user);
    Ok(next.run(request).await)
}

async fn health() -> Json<ApiResponse<Health>> {
    Json(ApiResponse::ok(
        "API running",
        Health {
            timestamp: Utc::now(),
        },
    ))
}

fn router(state: ServerState) -> Router {
    let protected = Router::new()
        .route("/auth/me", get(auth::me))
        .route(
            "/categories",
            get(categories::list).post(categories::create),
        )
        .route("/categories/type/{kind}", get(categories::list_by_kind))
        .route(
            "/categories/{id}",
            put(categories::update).delete(categories::remove),
        )
        .route(
            "/transactions",
            get(transactions::list).post(transactions::create),
        )
        .route(
            "/transactions/month/{period}",
            get(transactions::list_for_month),
        )
        .route("/transactions/stats/{period}", get(transactions::stats))
        .route(
            "/transactions/{id}",
            put(transactions::update).delete(transactions::remove),
        )
        .route("/credit-cards", get(cards::list).post(cards::create))
        .route(
            "/credit-cards/{id}",
            get(cards::get_card).put(cards::update).delete(cards::remove),
        )
        .route("/credit-cards/{id}/toggle", patch(cards::toggle))
        .route("/credit-cards/{id}/bills", get(cards::bills))
        .route(
            "/periods/{source}/duplicate-transactions/{target}",
            post(periods::duplicate_transactions),
        )
        .route(
            "/periods/{source}/duplicate-cards/{target}",
            post(periods::duplicate_cards),
        )
        .route(
            "/periods/{source}/duplicate-month/{target}",
            post(periods::duplicate_month),
        )
        .route(
            "/budget-goals",
            get(goals::get_goals)
                .post(goals::upsert)
                .delete(goals::remove),
        )
        .route("/ai-analysis", get(analyses::list).post(analyses::upsert))
        .route(
            "/ai-analysis/{period}",
            get(analyses::get_analysis).delete(analyses::remove),
        )
        .route_layer(middleware::from_fn_with_state(state.clone(), require_auth));

    Router::new()
        .route("/health", get(health))
        .route("/auth/register", post(auth::register))
        .merge(protected)
        .with_state(state)
}

pub async fn run(engine: Engine, db: DatabaseConnection) {
    let listener = match tokio::net::TcpListener::bind("127.0.0.1:3000").await {
        Ok(listener) => listener,
        Err(err) => {
            tracing::error!("failed to bind server listener: {err}");
            return;
        }
    };
    if let Err(err) = run_with_listener(engine, db, listener).await {
        tracing::error!("server failed: {err}");
    }
}

pub async fn run_with_listener(
    engine: Engine,
    db: DatabaseConnection,
    listener: tokio::net::TcpListener,
) -> Result<(), std::io::Error> {
    let addr = listener.local_addr()?;
    tracing::info!("Server listening on {}", addr);

    let state = ServerState {
        engine: Arc::new(engine),
        db,
    };

    axum::serve(listener, router(state)).await
}

pub fn spawn_with_listener(
    engine: Engine,
    db: DatabaseConnection,
    listener: tokio::net::TcpListener,
) -> Result<std::net::SocketAddr, std::io::Error> {
    let addr = listener.local_addr()?;

    tokio::spawn(async move {
        if let Err(err) = run_with_listener(engine, db, listener).await {
            tracing::error!("server failed: {err}");
        }
    });

    Ok(addr)
}
