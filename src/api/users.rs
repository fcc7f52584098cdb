//! Create, list and fetch endpoints for user records.
use axum::{
    Extension, Json,
    extract::{Path, rejection::JsonRejection},
    http::StatusCode,
};
use serde::Serialize;

use crate::SharedState;
use crate::db::StoreError;
use crate::db::user_repo::User;
use crate::error::AppError;
use crate::validation::{CreateUserRequest, ValidationError, validate_new_user};

/// Echo of a freshly inserted row.
#[derive(Debug, Serialize)]
pub struct CreatedUser {
    pub id: i64,
    pub name: String,
    pub email: String,
}

// GET /api/users
pub async fn list_users(
    Extension(state): Extension<SharedState>,
) -> Result<Json<Vec<User>>, AppError> {
    let users = state
        .store
        .list()
        .await
        .map_err(|e| AppError::internal("Failed to fetch users", e))?;
    Ok(Json(users))
}

// POST /api/users
pub async fn create_user(
    Extension(state): Extension<SharedState>,
    payload: Result<Json<CreateUserRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<CreatedUser>), AppError> {
    // unparseable bodies and wrongly typed fields count as missing
    let Json(req) = payload.map_err(|_| ValidationError::MissingField)?;
    let new_user = validate_new_user(req)?;

    match state.store.insert(&new_user.name, &new_user.email).await {
        Ok(id) => Ok((
            StatusCode::CREATED,
            Json(CreatedUser {
                id,
                name: new_user.name,
                email: new_user.email,
            }),
        )),
        Err(StoreError::DuplicateKey) => Err(AppError::conflict("Email already exists")),
        Err(e) => Err(AppError::internal("Failed to create user", e)),
    }
}

// GET /api/users/{id}
pub async fn get_user(
    Extension(state): Extension<SharedState>,
    Path(id): Path<String>,
) -> Result<Json<User>, AppError> {
    // a non-numeric id cannot match any row
    let Ok(id) = id.parse::<i64>() else {
        return Err(AppError::not_found("User not found"));
    };

    state
        .store
        .find_by_id(id)
        .await
        .map_err(|e| AppError::internal("Failed to fetch user", e))?
        .map(Json)
        .ok_or_else(|| AppError::not_found("User not found"))
}
