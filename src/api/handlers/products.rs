/*
 * Responsibility
 * - /api/products CRUD handlers
 * - Mutations record the acting subject from AuthCtx in the logs
 */
use axum::{Json, extract::State, http::StatusCode};
use tracing::info;

use crate::{
    api::{
        dto::products::{ProductRequest, ProductResponse},
        extractors::{ApiJson, AuthCtxExtractor, ResourceId},
    },
    error::AppError,
    state::AppState,
};

pub async fn list_products(
    State(state): State<AppState>,
) -> Result<Json<Vec<ProductResponse>>, AppError> {
    let rows = state.products.list().await?;
    Ok(Json(rows.into_iter().map(ProductResponse::from).collect()))
}

pub async fn get_product(
    State(state): State<AppState>,
    ResourceId(id): ResourceId,
) -> Result<Json<ProductResponse>, AppError> {
    let row = state
        .products
        .get(id)
        .await?
        .ok_or(AppError::not_found("product"))?;

    Ok(Json(row.into()))
}

pub async fn create_product(
    State(state): State<AppState>,
    AuthCtxExtractor(ctx): AuthCtxExtractor,
    ApiJson(req): ApiJson<ProductRequest>,
) -> Result<(StatusCode, Json<ProductResponse>), AppError> {
    let product = req.into_validated().map_err(AppError::Validation)?;
    let row = state.products.create(product).await?;

    info!(product_id = row.id, actor = %ctx.subject(), "product created");
    Ok((StatusCode::CREATED, Json(row.into())))
}

pub async fn update_product(
    State(state): State<AppState>,
    AuthCtxExtractor(ctx): AuthCtxExtractor,
    ResourceId(id): ResourceId,
    ApiJson(req): ApiJson<ProductRequest>,
) -> Result<(StatusCode, Json<ProductResponse>), AppError> {
    let product = req.into_validated().map_err(AppError::Validation)?;
    let row = state
        .products
        .update(id, product)
        .await?
        .ok_or(AppError::not_found("product"))?;

    info!(product_id = row.id, actor = %ctx.subject(), "product updated");
    Ok((StatusCode::CREATED, Json(row.into())))
}

pub async fn delete_product(
    State(state): State<AppState>,
    AuthCtxExtractor(ctx): AuthCtxExtractor,
    ResourceId(id): ResourceId,
) -> Result<Json<ProductResponse>, AppError> {
    let row = state
        .products
        .delete(id)
        .await?
        .ok_or(AppError::not_found("product"))?;

    info!(product_id = row.id, actor = %ctx.subject(), "product deleted");
    Ok(Json(row.into()))
}
