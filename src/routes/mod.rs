mod filters;
mod health;
mod products;
mod reviews;

use axum::{routing::get, Router};

use crate::AppState;

pub fn create_router() -> Router<AppState> {
    Router::new()
        .route("/health", get(health::health_check))
        .route("/health/ready", get(health::readiness_check))
        .route("/products", get(products::list_products))
        .route("/products/{id}", get(products::get_product))
        .route("/products/{id}/reviews", get(reviews::get_product_reviews))
        .route(
            "/products/{id}/recommendations",
            get(products::get_recommendations),
        )
        .route("/filters", get(filters::get_filter_options))
}
