use axum::{
    extract::{Path, Query, State},
    Json,
};
use uuid::Uuid;

use crate::{
    error::{AppError, Result},
    models::{ListParams, ProductDetail, ProductListResponse, ProductSummary},
    queries::product_queries,
    AppState,
};

pub async fn list_products(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Result<Json<ProductListResponse>> {
    let criteria = params.normalize()?;
    let response = product_queries::search_products(&state.db, &criteria).await?;

    Ok(Json(response))
}

pub async fn get_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ProductDetail>> {
    // A malformed id cannot match any product.
    let id = parse_product_id(&id)?;

    let detail = product_queries::find_detail(&state.db, id)
        .await?
        .ok_or_else(|| AppError::NotFound("Product not found".to_string()))?;

    Ok(Json(detail))
}

pub async fn get_recommendations(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Vec<ProductSummary>>> {
    let id = parse_product_id(&id)?;

    let products = product_queries::find_recommendations(&state.db, id)
        .await?
        .ok_or_else(|| AppError::NotFound("Product not found".to_string()))?;

    Ok(Json(products))
}

pub(super) fn parse_product_id(id: &str) -> Result<Uuid> {
    Uuid::parse_str(id).map_err(|_| AppError::NotFound("Product not found".to_string()))
}
