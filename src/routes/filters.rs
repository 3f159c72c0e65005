use axum::{extract::State, Json};

use crate::{error::Result, models::FilterOptions, queries::reference_queries, AppState};

pub async fn get_filter_options(State(state): State<AppState>) -> Result<Json<FilterOptions>> {
    let options = reference_queries::get_filter_options(&state.db).await?;

    Ok(Json(options))
}
