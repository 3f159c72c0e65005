use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use uuid::Uuid;

/// One row of the aggregated listing query: base product columns joined
/// with reference names, plus the derived price facts computed in SQL.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ProductRow {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub category_id: Uuid,
    pub category_name: String,
    pub gender_id: Uuid,
    pub gender_label: String,
    pub brand_id: Uuid,
    pub brand_name: String,
    pub is_published: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub min_price: Option<Decimal>,
    pub max_price: Option<Decimal>,
    pub has_discount: bool,
    pub primary_image: Option<String>,
}

/// Base product columns for the detail lookup. Price facts are computed
/// in application code over the full variant list.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ProductBaseRow {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub category_id: Uuid,
    pub category_name: String,
    pub gender_id: Uuid,
    pub gender_label: String,
    pub brand_id: Uuid,
    pub brand_name: String,
    pub is_published: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A variant pre-joined with its color and size reference rows.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ProductVariant {
    pub id: Uuid,
    #[serde(skip_serializing)]
    pub product_id: Uuid,
    pub sku: String,
    pub price: Decimal,
    pub sale_price: Option<Decimal>,
    pub color_id: Uuid,
    pub color_name: String,
    pub color_slug: String,
    pub color_hex: String,
    pub size_id: Uuid,
    pub size_name: String,
    pub size_slug: String,
    #[serde(skip_serializing)]
    pub size_sort_order: i32,
    pub in_stock: i32,
    pub weight: f32,
    pub dimensions: Option<serde_json::Value>,
}

impl ProductVariant {
    /// Sale price when set, list price otherwise.
    pub fn display_price(&self) -> Decimal {
        self.sale_price.unwrap_or(self.price)
    }
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ProductImage {
    pub id: Uuid,
    #[serde(skip_serializing)]
    pub product_id: Uuid,
    pub variant_id: Option<Uuid>,
    pub url: String,
    pub sort_order: i32,
    pub is_primary: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductSummary {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub category_id: Uuid,
    pub category_name: String,
    pub gender_id: Uuid,
    pub gender_label: String,
    pub brand_id: Uuid,
    pub brand_name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub min_price: Decimal,
    pub max_price: Decimal,
    pub has_discount: bool,
    pub primary_image: Option<String>,
    pub images: Vec<String>,
    pub variants: Vec<ProductVariant>,
}

impl ProductSummary {
    pub fn from_row(
        row: ProductRow,
        images: Vec<String>,
        variants: Vec<ProductVariant>,
    ) -> Self {
        Self {
            id: row.id,
            name: row.name,
            description: row.description,
            category_id: row.category_id,
            category_name: row.category_name,
            gender_id: row.gender_id,
            gender_label: row.gender_label,
            brand_id: row.brand_id,
            brand_name: row.brand_name,
            created_at: row.created_at,
            updated_at: row.updated_at,
            min_price: row.min_price.unwrap_or_default(),
            max_price: row.max_price.unwrap_or_default(),
            has_discount: row.has_discount,
            primary_image: row.primary_image,
            images,
            variants,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductListResponse {
    pub products: Vec<ProductSummary>,
    pub total_count: i64,
    pub total_pages: u32,
    pub current_page: u32,
}

/// One entry per distinct color among a product's variants, with a
/// representative image for swatch rendering.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ColorOption {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub hex: String,
    pub image: Option<String>,
}

/// One entry per distinct size; in_stock aggregates across colors.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SizeOption {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub in_stock: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductDetail {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub category_id: Uuid,
    pub category_name: String,
    pub gender_id: Uuid,
    pub gender_label: String,
    pub brand_id: Uuid,
    pub brand_name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub min_price: Decimal,
    pub max_price: Decimal,
    pub has_discount: bool,
    pub primary_image: Option<String>,
    pub images: Vec<String>,
    pub variants: Vec<ProductVariant>,
    pub all_images: Vec<ProductImage>,
    pub color_options: Vec<ColorOption>,
    pub size_options: Vec<SizeOption>,
}

impl ProductDetail {
    pub fn assemble(
        base: ProductBaseRow,
        variants: Vec<ProductVariant>,
        images: Vec<ProductImage>,
    ) -> Self {
        let (min_price, max_price) =
            display_price_bounds(&variants).unwrap_or((Decimal::ZERO, Decimal::ZERO));
        let has_discount = variants.iter().any(|v| v.sale_price.is_some());
        let primary_image = primary_image_url(&images).map(str::to_string);
        let color_options = color_options(&variants, &images);
        let size_options = size_options(&variants);

        Self {
            id: base.id,
            name: base.name,
            description: base.description,
            category_id: base.category_id,
            category_name: base.category_name,
            gender_id: base.gender_id,
            gender_label: base.gender_label,
            brand_id: base.brand_id,
            brand_name: base.brand_name,
            created_at: base.created_at,
            updated_at: base.updated_at,
            min_price,
            max_price,
            has_discount,
            primary_image,
            images: images.iter().map(|i| i.url.clone()).collect(),
            variants,
            all_images: images,
            color_options,
            size_options,
        }
    }
}

/// Min and max display price over a variant set; None when it is empty.
pub fn display_price_bounds(variants: &[ProductVariant]) -> Option<(Decimal, Decimal)> {
    let mut bounds: Option<(Decimal, Decimal)> = None;
    for variant in variants {
        let price = variant.display_price();
        bounds = Some(match bounds {
            Some((min, max)) => (min.min(price), max.max(price)),
            None => (price, price),
        });
    }
    bounds
}

/// First image flagged primary wins; ties are not enforced by the schema.
pub fn primary_image_url(images: &[ProductImage]) -> Option<&str> {
    images
        .iter()
        .find(|i| i.is_primary)
        .map(|i| i.url.as_str())
}

/// Groups variants by color, keeping first-seen order. The representative
/// image prefers a variant-specific primary image, then any variant image,
/// then the product primary, then the first product image.
pub fn color_options(variants: &[ProductVariant], images: &[ProductImage]) -> Vec<ColorOption> {
    let product_primary = primary_image_url(images);
    let first_image = images.first().map(|i| i.url.as_str());

    let mut options: Vec<ColorOption> = Vec::new();
    for variant in variants {
        if options.iter().any(|o| o.id == variant.color_id) {
            continue;
        }

        let variant_images: Vec<&ProductImage> = images
            .iter()
            .filter(|i| i.variant_id == Some(variant.id))
            .collect();
        let image = variant_images
            .iter()
            .find(|i| i.is_primary)
            .or_else(|| variant_images.first())
            .map(|i| i.url.as_str())
            .or(product_primary)
            .or(first_image);

        options.push(ColorOption {
            id: variant.color_id,
            name: variant.color_name.clone(),
            slug: variant.color_slug.clone(),
            hex: variant.color_hex.clone(),
            image: image.map(str::to_string),
        });
    }
    options
}

/// Groups variants by size, ordered by the size's display sort order.
/// A size is in stock when any variant of that size has stock left.
pub fn size_options(variants: &[ProductVariant]) -> Vec<SizeOption> {
    let mut options: Vec<(i32, SizeOption)> = Vec::new();
    for variant in variants {
        match options.iter_mut().find(|(_, o)| o.id == variant.size_id) {
            Some((_, existing)) => {
                existing.in_stock = existing.in_stock || variant.in_stock > 0;
            }
            None => options.push((
                variant.size_sort_order,
                SizeOption {
                    id: variant.size_id,
                    name: variant.size_name.clone(),
                    slug: variant.size_slug.clone(),
                    in_stock: variant.in_stock > 0,
                },
            )),
        }
    }
    options.sort_by_key(|(order, _)| *order);
    options.into_iter().map(|(_, o)| o).collect()
}

/// Ceil-division pagination metadata.
pub fn total_pages(total_count: i64, limit: u32) -> u32 {
    if total_count <= 0 {
        return 0;
    }
    ((total_count as u64).div_ceil(limit as u64)) as u32
}
