use std::collections::HashMap;

use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::{
    error::Result,
    models::{
        total_pages, ListCriteria, ProductBaseRow, ProductDetail, ProductImage,
        ProductListResponse, ProductRow, ProductSummary, ProductVariant, ResolvedCriteria, SortBy,
    },
    queries::lookup_queries,
};

const RECOMMENDATION_LIMIT: i64 = 8;

/// Aggregated listing head: products joined with their reference rows and
/// variants, price facts computed over all joined variant rows per product.
const SUMMARY_SELECT: &str = "SELECT p.id, p.name, p.description, \
     p.category_id, c.name AS category_name, \
     p.gender_id, g.label AS gender_label, \
     p.brand_id, b.name AS brand_name, \
     p.is_published, p.created_at, p.updated_at, \
     MIN(COALESCE(v.sale_price, v.price)) AS min_price, \
     MAX(COALESCE(v.sale_price, v.price)) AS max_price, \
     COUNT(v.sale_price) > 0 AS has_discount, \
     (SELECT i.url FROM product_images i \
      WHERE i.product_id = p.id AND i.is_primary = true LIMIT 1) AS primary_image \
     FROM products p \
     JOIN categories c ON c.id = p.category_id \
     JOIN genders g ON g.id = p.gender_id \
     JOIN brands b ON b.id = p.brand_id \
     JOIN product_variants v ON v.product_id = p.id";

const COUNT_SELECT: &str = "SELECT COUNT(DISTINCT p.id) \
     FROM products p \
     JOIN categories c ON c.id = p.category_id \
     JOIN genders g ON g.id = p.gender_id \
     JOIN brands b ON b.id = p.brand_id \
     JOIN product_variants v ON v.product_id = p.id";

const SUMMARY_GROUP_BY: &str = " GROUP BY p.id, c.name, g.label, b.name";

const DETAIL_SELECT: &str = "SELECT p.id, p.name, p.description, \
     p.category_id, c.name AS category_name, \
     p.gender_id, g.label AS gender_label, \
     p.brand_id, b.name AS brand_name, \
     p.is_published, p.created_at, p.updated_at \
     FROM products p \
     JOIN categories c ON c.id = p.category_id \
     JOIN genders g ON g.id = p.gender_id \
     JOIN brands b ON b.id = p.brand_id \
     WHERE p.id = $1 AND p.is_published = true";

const VARIANTS_SELECT: &str = "SELECT v.id, v.product_id, v.sku, v.price, v.sale_price, \
     v.color_id, col.name AS color_name, col.slug AS color_slug, col.hex_code AS color_hex, \
     v.size_id, s.name AS size_name, s.slug AS size_slug, s.sort_order AS size_sort_order, \
     v.in_stock, v.weight, v.dimensions \
     FROM product_variants v \
     JOIN colors col ON col.id = v.color_id \
     JOIN sizes s ON s.id = v.size_id \
     WHERE v.product_id = ANY($1) \
     ORDER BY v.product_id, s.sort_order ASC";

const IMAGES_SELECT: &str = "SELECT id, product_id, variant_id, url, sort_order, is_primary \
     FROM product_images \
     WHERE product_id = ANY($1) \
     ORDER BY product_id, sort_order ASC";

/// Shared filter predicate for the listing and count queries. Color, size
/// and price membership are independent existence checks over the variant
/// table; they do not require one variant to satisfy all of them.
fn push_filters(query: &mut QueryBuilder<'static, Postgres>, criteria: &ResolvedCriteria) {
    query.push(" WHERE p.is_published = true");

    // free-text search
    if let Some(ref q) = criteria.search {
        let pattern = format!("%{}%", q);
        query.push(" AND (p.name ILIKE ");
        query.push_bind(pattern.clone());
        query.push(" OR p.description ILIKE ");
        query.push_bind(pattern.clone());
        query.push(" OR b.name ILIKE ");
        query.push_bind(pattern.clone());
        query.push(" OR c.name ILIKE ");
        query.push_bind(pattern);
        query.push(")");
    }

    // product-level id sets
    if !criteria.category_ids.is_empty() {
        query.push(" AND p.category_id = ANY(");
        query.push_bind(criteria.category_ids.clone());
        query.push(")");
    }

    if !criteria.brand_ids.is_empty() {
        query.push(" AND p.brand_id = ANY(");
        query.push_bind(criteria.brand_ids.clone());
        query.push(")");
    }

    if !criteria.gender_ids.is_empty() {
        query.push(" AND p.gender_id = ANY(");
        query.push_bind(criteria.gender_ids.clone());
        query.push(")");
    }

    // variant-level existence checks
    if !criteria.color_ids.is_empty() {
        query.push(
            " AND EXISTS (SELECT 1 FROM product_variants cv \
             WHERE cv.product_id = p.id AND cv.color_id = ANY(",
        );
        query.push_bind(criteria.color_ids.clone());
        query.push("))");
    }

    if !criteria.size_ids.is_empty() {
        query.push(
            " AND EXISTS (SELECT 1 FROM product_variants sv \
             WHERE sv.product_id = p.id AND sv.size_id = ANY(",
        );
        query.push_bind(criteria.size_ids.clone());
        query.push("))");
    }

    // display-price range, open-ended on either side
    if criteria.price_min.is_some() || criteria.price_max.is_some() {
        query.push(
            " AND EXISTS (SELECT 1 FROM product_variants pv \
             WHERE pv.product_id = p.id",
        );
        if let Some(min) = criteria.price_min {
            query.push(" AND COALESCE(pv.sale_price, pv.price) >= ");
            query.push_bind(min);
        }
        if let Some(max) = criteria.price_max {
            query.push(" AND COALESCE(pv.sale_price, pv.price) <= ");
            query.push_bind(max);
        }
        query.push(")");
    }
}

fn order_clause(sort_by: SortBy) -> &'static str {
    match sort_by {
        SortBy::PriceAsc => "MIN(COALESCE(v.sale_price, v.price)) ASC",
        SortBy::PriceDesc => "MIN(COALESCE(v.sale_price, v.price)) DESC",
        SortBy::Latest => "p.created_at DESC",
        SortBy::Oldest => "p.created_at ASC",
        SortBy::NameAsc => "p.name ASC",
        SortBy::NameDesc => "p.name DESC",
    }
}

fn listing_query(criteria: &ResolvedCriteria) -> QueryBuilder<'static, Postgres> {
    let mut query = QueryBuilder::new(SUMMARY_SELECT);
    push_filters(&mut query, criteria);
    query.push(SUMMARY_GROUP_BY);
    query.push(" ORDER BY ");
    query.push(order_clause(criteria.sort_by));
    query.push(" LIMIT ");
    query.push_bind(criteria.limit as i64);
    query.push(" OFFSET ");
    query.push_bind(criteria.offset());
    query
}

fn count_query(criteria: &ResolvedCriteria) -> QueryBuilder<'static, Postgres> {
    let mut query = QueryBuilder::new(COUNT_SELECT);
    push_filters(&mut query, criteria);
    query
}

/// Run the aggregation pipeline: resolve selector tokens, fetch the page
/// and the unpaginated count under the same predicate, then batch-fetch
/// and attach each page product's images and variants.
pub async fn search_products(
    pool: &PgPool,
    criteria: &ListCriteria,
) -> Result<ProductListResponse> {
    let resolved = lookup_queries::resolve_criteria(pool, criteria).await?;

    let rows = listing_query(&resolved)
        .build_query_as::<ProductRow>()
        .fetch_all(pool)
        .await?;

    let total_count: i64 = count_query(&resolved)
        .build_query_scalar()
        .fetch_one(pool)
        .await?;

    let products = assemble_summaries(pool, rows).await?;

    Ok(ProductListResponse {
        products,
        total_count,
        total_pages: total_pages(total_count, criteria.limit),
        current_page: criteria.page,
    })
}

/// Batch-fetch images and variants for a page of rows and group them per
/// product. The two fetches are independent and run concurrently.
async fn assemble_summaries(pool: &PgPool, rows: Vec<ProductRow>) -> Result<Vec<ProductSummary>> {
    if rows.is_empty() {
        return Ok(Vec::new());
    }

    let product_ids: Vec<Uuid> = rows.iter().map(|r| r.id).collect();

    let (images, variants) = tokio::try_join!(
        find_images_by_product_ids(pool, &product_ids),
        find_variants_by_product_ids(pool, &product_ids),
    )?;

    let mut images_map: HashMap<Uuid, Vec<String>> = HashMap::new();
    for image in images {
        images_map
            .entry(image.product_id)
            .or_default()
            .push(image.url);
    }

    let mut variants_map: HashMap<Uuid, Vec<ProductVariant>> = HashMap::new();
    for variant in variants {
        variants_map
            .entry(variant.product_id)
            .or_default()
            .push(variant);
    }

    let products = rows
        .into_iter()
        .map(|row| {
            let images = images_map.remove(&row.id).unwrap_or_default();
            let variants = variants_map.remove(&row.id).unwrap_or_default();
            ProductSummary::from_row(row, images, variants)
        })
        .collect();

    Ok(products)
}

pub async fn find_images_by_product_ids(
    pool: &PgPool,
    product_ids: &[Uuid],
) -> Result<Vec<ProductImage>> {
    let images = sqlx::query_as::<_, ProductImage>(IMAGES_SELECT)
        .bind(product_ids)
        .fetch_all(pool)
        .await?;

    Ok(images)
}

pub async fn find_variants_by_product_ids(
    pool: &PgPool,
    product_ids: &[Uuid],
) -> Result<Vec<ProductVariant>> {
    let variants = sqlx::query_as::<_, ProductVariant>(VARIANTS_SELECT)
        .bind(product_ids)
        .fetch_all(pool)
        .await?;

    Ok(variants)
}

/// Assemble the full detail view of one published product, or None when
/// the id does not match a published product.
pub async fn find_detail(pool: &PgPool, product_id: Uuid) -> Result<Option<ProductDetail>> {
    let base = sqlx::query_as::<_, ProductBaseRow>(DETAIL_SELECT)
        .bind(product_id)
        .fetch_optional(pool)
        .await?;

    let Some(base) = base else {
        return Ok(None);
    };

    let ids = [product_id];
    let (variants, images) = tokio::try_join!(
        find_variants_by_product_ids(pool, &ids),
        find_images_by_product_ids(pool, &ids),
    )?;

    Ok(Some(ProductDetail::assemble(base, variants, images)))
}

/// Published products sharing the anchor's category or brand, newest
/// first. None when the anchor itself is missing or unpublished.
pub async fn find_recommendations(
    pool: &PgPool,
    product_id: Uuid,
) -> Result<Option<Vec<ProductSummary>>> {
    let anchor = sqlx::query_as::<_, (Uuid, Uuid)>(
        "SELECT category_id, brand_id FROM products WHERE id = $1 AND is_published = true",
    )
    .bind(product_id)
    .fetch_optional(pool)
    .await?;

    let Some((category_id, brand_id)) = anchor else {
        return Ok(None);
    };

    let mut query = QueryBuilder::<Postgres>::new(SUMMARY_SELECT);
    query.push(" WHERE p.is_published = true AND p.id <> ");
    query.push_bind(product_id);
    query.push(" AND (p.category_id = ");
    query.push_bind(category_id);
    query.push(" OR p.brand_id = ");
    query.push_bind(brand_id);
    query.push(")");
    query.push(SUMMARY_GROUP_BY);
    query.push(" ORDER BY p.created_at DESC LIMIT ");
    query.push_bind(RECOMMENDATION_LIMIT);

    let rows = query.build_query_as::<ProductRow>().fetch_all(pool).await?;
    let products = assemble_summaries(pool, rows).await?;

    Ok(Some(products))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn criteria() -> ResolvedCriteria {
        ResolvedCriteria {
            search: None,
            category_ids: vec![],
            brand_ids: vec![],
            gender_ids: vec![],
            color_ids: vec![],
            size_ids: vec![],
            price_min: None,
            price_max: None,
            sort_by: SortBy::Latest,
            page: 1,
            limit: 20,
        }
    }

    #[test]
    fn bare_criteria_filter_to_published_products_only() {
        let sql = listing_query(&criteria()).into_sql();
        assert!(sql.contains("WHERE p.is_published = true"));
        assert!(sql.contains("GROUP BY p.id, c.name, g.label, b.name"));
        assert!(sql.contains("MIN(COALESCE(v.sale_price, v.price)) AS min_price"));
        assert!(sql.contains("ORDER BY p.created_at DESC"));
    }

    #[test]
    fn color_and_size_filters_are_independent_existence_checks() {
        // A product with a red/8 and a blue/9 variant must match
        // color=red,size=9: each check runs its own subquery.
        let mut c = criteria();
        c.color_ids = vec![Uuid::new_v4()];
        c.size_ids = vec![Uuid::new_v4()];

        let sql = listing_query(&c).into_sql();
        assert!(sql.contains("EXISTS (SELECT 1 FROM product_variants cv"));
        assert!(sql.contains("EXISTS (SELECT 1 FROM product_variants sv"));
        assert!(sql.contains("cv.color_id = ANY("));
        assert!(sql.contains("sv.size_id = ANY("));
    }

    #[test]
    fn price_filter_uses_display_price_and_supports_open_bounds() {
        let mut c = criteria();
        c.price_min = Some(dec!(50));
        let sql = listing_query(&c).into_sql();
        assert!(sql.contains("COALESCE(pv.sale_price, pv.price) >="));
        assert!(!sql.contains("COALESCE(pv.sale_price, pv.price) <="));

        let mut c = criteria();
        c.price_max = Some(dec!(100));
        let sql = listing_query(&c).into_sql();
        assert!(!sql.contains("COALESCE(pv.sale_price, pv.price) >="));
        assert!(sql.contains("COALESCE(pv.sale_price, pv.price) <="));
    }

    #[test]
    fn search_matches_name_description_brand_and_category() {
        let mut c = criteria();
        c.search = Some("pegasus".to_string());
        let sql = listing_query(&c).into_sql();
        assert!(sql.contains("p.name ILIKE"));
        assert!(sql.contains("p.description ILIKE"));
        assert!(sql.contains("b.name ILIKE"));
        assert!(sql.contains("c.name ILIKE"));
        // OR within the search group, AND against the rest.
        assert!(sql.contains("AND (p.name ILIKE"));
    }

    #[test]
    fn sort_keys_map_to_order_expressions() {
        assert_eq!(
            order_clause(SortBy::PriceAsc),
            "MIN(COALESCE(v.sale_price, v.price)) ASC"
        );
        assert_eq!(
            order_clause(SortBy::PriceDesc),
            "MIN(COALESCE(v.sale_price, v.price)) DESC"
        );
        assert_eq!(order_clause(SortBy::Oldest), "p.created_at ASC");
        assert_eq!(order_clause(SortBy::NameAsc), "p.name ASC");
        assert_eq!(order_clause(SortBy::NameDesc), "p.name DESC");
    }

    #[test]
    fn count_query_counts_distinct_products_under_the_same_predicate() {
        let mut c = criteria();
        c.color_ids = vec![Uuid::new_v4()];
        c.price_min = Some(dec!(10));
        c.price_max = Some(dec!(90));

        let listing = listing_query(&c).into_sql();
        let count = count_query(&c).into_sql();

        assert!(count.starts_with("SELECT COUNT(DISTINCT p.id)"));
        assert!(!count.contains("GROUP BY"));
        assert!(!count.contains("LIMIT"));
        // Both queries carry the exact same predicate text.
        let listing_predicate = listing
            .strip_prefix(SUMMARY_SELECT)
            .and_then(|s| s.split(" GROUP BY").next())
            .unwrap();
        let count_predicate = count.strip_prefix(COUNT_SELECT).unwrap();
        assert_eq!(listing_predicate, count_predicate);
    }

    #[test]
    fn pagination_binds_limit_and_offset() {
        let mut c = criteria();
        c.page = 3;
        c.limit = 10;
        let sql = listing_query(&c).into_sql();
        assert!(sql.contains(" LIMIT $1 OFFSET $2"));
    }
}
