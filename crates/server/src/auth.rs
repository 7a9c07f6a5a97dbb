//! User registration and identity endpoints.
//!
//! Every other route resolves the caller through the Basic-auth middleware
//! in [`crate::server`]; the engine itself only ever sees the opaque user
//! id.

use api_types::ApiResponse;
use api_types::user::{RegisterUser, UserView};
use axum::{Extension, Json, extract::State, http::StatusCode};
use engine::EngineError;
use sea_orm::{ActiveValue, DatabaseConnection, entity::prelude::*};
use uuid::Uuid;

use crate::{ServerError, server::ServerState};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub name: String,
    pub email: String,
    pub password: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

/// Credential lookup used by the auth middleware.
pub(crate) async fn find_by_credentials(
    db: &DatabaseConnection,
    email: &str,
    password: &str,
) -> Result<Option<Model>, DbErr> {
    Entity::find()
        .filter(Column::Email.eq(email))
        .filter(Column::Password.eq(password))
        .one(db)
        .await
}

fn validate_registration(payload: &RegisterUser) -> Result<(), ServerError> {
    let name_len = payload.name.trim().chars().count();
    if !(2..=50).contains(&name_len) {
        return Err(ServerError::Generic(
            "name must be between 2 and 50 characters".to_string(),
        ));
    }
    let email = payload.email.trim();
    let valid_email = match email.split_once('@') {
        Some((local, domain)) => !local.is_empty() && domain.contains('.'),
        None => false,
    };
    if !valid_email {
        return Err(ServerError::Generic("invalid email".to_string()));
    }
    if payload.password.chars().count() < 6 {
        return Err(ServerError::Generic(
            "password must be at least 6 characters".to_string(),
        ));
    }
    Ok(())
}

pub async fn register(
    State(state): State<ServerState>,
    Json(payload): Json<RegisterUser>,
) -> Result<(StatusCode, Json<ApiResponse<UserView>>), ServerError> {
    validate_registration(&payload)?;

    let email = payload.email.trim().to_lowercase();
    let existing = Entity::find()
        .filter(Column::Email.eq(&email))
        .one(&state.db)
        .await
        .map_err(EngineError::from)?;
    if existing.is_some() {
        return Err(ServerError::Engine(EngineError::ExistingKey(email)));
    }

    let user = Model {
        id: Uuid::new_v4().to_string(),
        name: payload.name.trim().to_string(),
        email,
        password: payload.password,
    };
    ActiveModel {
        id: ActiveValue::Set(user.id.clone()),
        name: ActiveValue::Set(user.name.clone()),
        email: ActiveValue::Set(user.email.clone()),
        password: ActiveValue::Set(user.password.clone()),
    }
    .insert(&state.db)
    .await
    .map_err(EngineError::from)?;

    let view = UserView {
        id: user.id,
        name: user.name,
        email: user.email,
    };
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok("user created successfully", view)),
    ))
}

/// Profile of the authenticated caller.
pub async fn me(Extension(user): Extension<Model>) -> Json<ApiResponse<UserView>> {
    Json(ApiResponse::ok(
        "user found",
        UserView {
            id: user.id,
            name: user.name,
            email: user.email,
        },
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload(name: &str, email: &str, password: &str) -> RegisterUser {
        RegisterUser {
            name: name.to_string(),
            email: email.to_string(),
            password: password.to_string(),
        }
    }

    #[test]
    fn registration_validation() {
        assert!(validate_registration(&payload("Ana", "ana@example.com", "secret1")).is_ok());
        assert!(validate_registration(&payload("A", "ana@example.com", "secret1")).is_err());
        assert!(validate_registration(&payload("Ana", "not-an-email", "secret1")).is_err());
        assert!(validate_registration(&payload("Ana", "ana@nodot", "secret1")).is_err());
        assert!(validate_registration(&payload("Ana", "ana@example.com", "short")).is_err());
    }
}
