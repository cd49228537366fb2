//! Product CRUD handlers.
//!
//! The hot path of the API: listings and single-product reads come from the
//! cached product repository, and every mutation triggers its invalidation
//! fan-out behind the repository trait.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;

use storefront_core::commerce::{NewProduct, Product, ProductPatch};
use storefront_core::storage::RepositoryError;

use crate::{handlers::AppError, state::AppState};

/// Query parameters for listing products.
#[derive(Debug, Deserialize)]
pub struct ListProductsQuery {
    /// Restrict the listing to one category.
    #[serde(default, alias = "categoryId")]
    pub category_id: Option<i64>,
}

fn validate_price(price: f64) -> Result<(), AppError> {
    if price < 0.0 || !price.is_finite() {
        return Err(RepositoryError::InvalidData("price must be non-negative".to_string()).into());
    }
    Ok(())
}

/// List products, optionally by category (GET /api/products?categoryId=N).
pub async fn list_products(
    State(state): State<AppState>,
    Query(query): Query<ListProductsQuery>,
) -> Result<Json<Vec<Product>>, AppError> {
    Ok(Json(
        state.product_repo.list_products(query.category_id).await?,
    ))
}

/// Get a single product by ID (GET /api/products/{id}).
pub async fn get_product(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Product>, AppError> {
    let product = state
        .product_repo
        .get_product(id)
        .await?
        .ok_or_else(|| RepositoryError::not_found("Product", id))?;
    Ok(Json(product))
}

/// Create a new product (POST /api/products).
pub async fn create_product(
    State(state): State<AppState>,
    Json(payload): Json<NewProduct>,
) -> Result<impl IntoResponse, AppError> {
    if payload.name.trim().is_empty() {
        return Err(RepositoryError::InvalidData("name must not be empty".to_string()).into());
    }
    validate_price(payload.price)?;

    let product = state.product_repo.create_product(&payload).await?;
    tracing::info!(product_id = product.id, name = %product.name, "Created product");

    Ok((StatusCode::CREATED, Json(product)))
}

/// Update a product by ID (PUT /api/products/{id}).
pub async fn update_product(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<ProductPatch>,
) -> Result<Json<Product>, AppError> {
    if let Some(price) = payload.price {
        validate_price(price)?;
    }

    let product = state.product_repo.update_product(id, &payload).await?;
    tracing::info!(product_id = id, "Updated product");
    Ok(Json(product))
}

/// Delete a product by ID (DELETE /api/products/{id}).
pub async fn delete_product(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Product>, AppError> {
    let product = state.product_repo.delete_product(id).await?;
    tracing::info!(product_id = id, "Deleted product");
    Ok(Json(product))
}
