use axum::{
    extract::{Path, State},
    Json,
};

use crate::{error::Result, models::Review, queries::review_queries, AppState};

use super::products::parse_product_id;

pub async fn get_product_reviews(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Vec<Review>>> {
    let id = parse_product_id(&id)?;
    let reviews = review_queries::find_by_product_id(&state.db, id).await?;

    Ok(Json(reviews))
}
