use sqlx::PgPool;

use crate::{
    error::Result,
    models::{Brand, Category, Color, FilterOptions, Gender, Size},
};

/// Fetch every reference list a filter UI renders. The five lookups are
/// independent and run concurrently.
pub async fn get_filter_options(pool: &PgPool) -> Result<FilterOptions> {
    let categories = sqlx::query_as::<_, Category>(
        "SELECT id, name, slug FROM categories ORDER BY name ASC",
    )
    .fetch_all(pool);

    let brands =
        sqlx::query_as::<_, Brand>("SELECT id, name, slug FROM brands ORDER BY name ASC")
            .fetch_all(pool);

    let genders =
        sqlx::query_as::<_, Gender>("SELECT id, label, slug FROM genders ORDER BY label ASC")
            .fetch_all(pool);

    let colors = sqlx::query_as::<_, Color>(
        "SELECT id, name, slug, hex_code FROM colors ORDER BY name ASC",
    )
    .fetch_all(pool);

    let sizes = sqlx::query_as::<_, Size>(
        "SELECT id, name, slug, sort_order FROM sizes ORDER BY sort_order ASC",
    )
    .fetch_all(pool);

    let (categories, brands, genders, colors, sizes) =
        tokio::try_join!(categories, brands, genders, colors, sizes)?;

    Ok(FilterOptions {
        categories,
        brands,
        genders,
        colors,
        sizes,
    })
}
