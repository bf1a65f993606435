//! Admin product management.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::Deserialize;
use showcase_core::{NewProduct, Price, Product, ProductId};

use crate::error::{AppError, Result};
use crate::middleware::RequireAdminAuth;
use crate::state::AppState;

/// List the catalog.
pub async fn index(
    State(state): State<AppState>,
    _auth: RequireAdminAuth,
) -> Json<Vec<Product>> {
    Json(state.products().read().await.list().to_vec())
}

/// Add a product; the ID is assigned by the catalog.
pub async fn create(
    State(state): State<AppState>,
    RequireAdminAuth(admin): RequireAdminAuth,
    Json(product): Json<NewProduct>,
) -> Result<(StatusCode, Json<Product>)> {
    let product = state.products().write().await.add(product)?;
    tracing::info!(admin = %admin.username, product_id = %product.id, "Product created via API");
    Ok((StatusCode::CREATED, Json(product)))
}

/// Body for replacing a product.
///
/// Every field is replaced except `inStock`, which keeps its current value
/// when omitted.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplaceProductRequest {
    pub name: String,
    pub price: Price,
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub link: String,
    #[serde(default)]
    pub in_stock: Option<bool>,
    #[serde(default)]
    pub label_text: Option<String>,
    #[serde(default)]
    pub label_color: Option<String>,
}

/// Replace the product at `id`.
pub async fn update(
    State(state): State<AppState>,
    _auth: RequireAdminAuth,
    Path(id): Path<ProductId>,
    Json(request): Json<ReplaceProductRequest>,
) -> Result<Json<Product>> {
    let mut catalog = state.products().write().await;
    let current = catalog
        .get(id)
        .ok_or_else(|| AppError::NotFound(format!("Product {id} not found")))?;

    let product = Product {
        id,
        name: request.name,
        price: request.price,
        image: request.image,
        link: request.link,
        in_stock: request.in_stock.unwrap_or(current.in_stock),
        label_text: request.label_text,
        label_color: request.label_color,
    };
    if !catalog.update(product.clone())? {
        return Err(AppError::NotFound(format!("Product {id} not found")));
    }
    Ok(Json(product))
}

/// Delete the product at `id`.
pub async fn delete(
    State(state): State<AppState>,
    _auth: RequireAdminAuth,
    Path(id): Path<ProductId>,
) -> Result<StatusCode> {
    if !state.products().write().await.delete(id)? {
        return Err(AppError::NotFound(format!("Product {id} not found")));
    }
    Ok(StatusCode::NO_CONTENT)
}
