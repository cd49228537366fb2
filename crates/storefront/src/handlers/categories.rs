//! Category CRUD handlers. Categories are not cached (the listings are
//! cheap and rarely read compared to products), so these go straight to the
//! repository.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};

use storefront_core::commerce::{Category, CategoryPatch, NewCategory};
use storefront_core::storage::RepositoryError;

use crate::{handlers::AppError, state::AppState};

/// List all categories (GET /api/categories).
pub async fn list_categories(
    State(state): State<AppState>,
) -> Result<Json<Vec<Category>>, AppError> {
    Ok(Json(state.category_repo.list_categories().await?))
}

/// Get a single category by ID (GET /api/categories/{id}).
pub async fn get_category(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Category>, AppError> {
    let category = state
        .category_repo
        .get_category(id)
        .await?
        .ok_or_else(|| RepositoryError::not_found("Category", id))?;
    Ok(Json(category))
}

/// Get a single category by slug (GET /api/categories/slug/{slug}).
pub async fn get_category_by_slug(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<Category>, AppError> {
    let category = state
        .category_repo
        .get_category_by_slug(&slug)
        .await?
        .ok_or(RepositoryError::NotFound {
            entity_type: "Category",
            id: slug,
        })?;
    Ok(Json(category))
}

/// Create a new category (POST /api/categories).
pub async fn create_category(
    State(state): State<AppState>,
    Json(payload): Json<NewCategory>,
) -> Result<impl IntoResponse, AppError> {
    if payload.name.trim().is_empty() || payload.slug.trim().is_empty() {
        return Err(RepositoryError::InvalidData(
            "name and slug must not be empty".to_string(),
        )
        .into());
    }

    let category = state.category_repo.create_category(&payload).await?;
    tracing::info!(category_id = category.id, slug = %category.slug, "Created category");

    Ok((StatusCode::CREATED, Json(category)))
}

/// Update a category by ID (PUT /api/categories/{id}).
pub async fn update_category(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<CategoryPatch>,
) -> Result<Json<Category>, AppError> {
    let category = state.category_repo.update_category(id, &payload).await?;
    tracing::info!(category_id = id, "Updated category");
    Ok(Json(category))
}

/// Delete a category by ID (DELETE /api/categories/{id}).
pub async fn delete_category(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Category>, AppError> {
    let category = state.category_repo.delete_category(id).await?;
    tracing::info!(category_id = id, "Deleted category");
    Ok(Json(category))
}
