//! User CRUD handlers.
//!
//! Reads are served through the cached user repository; mutations invalidate
//! `users:all` and refresh `user:<id>` inside the decorator, so the handlers
//! stay oblivious to caching.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};

use storefront_core::commerce::{NewUser, User, UserPatch};
use storefront_core::storage::RepositoryError;

use crate::{handlers::AppError, state::AppState};

/// List all users (GET /api/users).
pub async fn list_users(State(state): State<AppState>) -> Result<Json<Vec<User>>, AppError> {
    Ok(Json(state.user_repo.list_users().await?))
}

/// Get a single user by ID (GET /api/users/{id}).
pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<User>, AppError> {
    let user = state
        .user_repo
        .get_user(id)
        .await?
        .ok_or_else(|| RepositoryError::not_found("User", id))?;
    Ok(Json(user))
}

/// Create a new user (POST /api/users).
pub async fn create_user(
    State(state): State<AppState>,
    Json(payload): Json<NewUser>,
) -> Result<impl IntoResponse, AppError> {
    if payload.name.trim().is_empty() || payload.email.trim().is_empty() {
        return Err(RepositoryError::InvalidData(
            "name and email must not be empty".to_string(),
        )
        .into());
    }

    let user = state.user_repo.create_user(&payload).await?;
    tracing::info!(user_id = user.id, "Created user");

    Ok((StatusCode::CREATED, Json(user)))
}

/// Update a user by ID (PUT /api/users/{id}).
pub async fn update_user(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<UserPatch>,
) -> Result<Json<User>, AppError> {
    let user = state.user_repo.update_user(id, &payload).await?;
    tracing::info!(user_id = id, "Updated user");
    Ok(Json(user))
}

/// Delete a user by ID (DELETE /api/users/{id}).
pub async fn delete_user(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<User>, AppError> {
    let user = state.user_repo.delete_user(id).await?;
    tracing::info!(user_id = id, "Deleted user");
    Ok(Json(user))
}
