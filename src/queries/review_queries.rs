use sqlx::PgPool;
use uuid::Uuid;

use crate::{error::Result, models::Review};

pub async fn find_by_product_id(pool: &PgPool, product_id: Uuid) -> Result<Vec<Review>> {
    let reviews = sqlx::query_as::<_, Review>(
        "SELECT id, product_id, author_id, rating, comment, created_at \
         FROM reviews \
         WHERE product_id = $1 \
         ORDER BY created_at DESC",
    )
    .bind(product_id)
    .fetch_all(pool)
    .await?;

    Ok(reviews)
}
