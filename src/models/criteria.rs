use rust_decimal::Decimal;
use serde::Deserialize;
use uuid::Uuid;

use crate::{
    error::{AppError, Result},
    utils::filter_state::parse_price_range,
};

pub const DEFAULT_PAGE_SIZE: u32 = 20;
pub const MAX_PAGE_SIZE: u32 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortBy {
    PriceAsc,
    PriceDesc,
    #[default]
    Latest,
    Oldest,
    NameAsc,
    NameDesc,
}

impl SortBy {
    /// Accepts the six canonical sort keys plus the presentation-layer
    /// aliases that map onto them.
    pub fn parse(value: &str) -> Result<Self> {
        match value {
            "price_asc" | "price_low" => Ok(SortBy::PriceAsc),
            "price_desc" | "price_high" => Ok(SortBy::PriceDesc),
            "latest" | "newest" | "featured" => Ok(SortBy::Latest),
            "oldest" => Ok(SortBy::Oldest),
            "name_asc" | "alphabetical" => Ok(SortBy::NameAsc),
            "name_desc" => Ok(SortBy::NameDesc),
            other => Err(AppError::Validation(format!(
                "Unknown sort value: {}",
                other
            ))),
        }
    }
}

/// Raw listing query parameters as they arrive on the wire. Selector
/// values are comma-joined lists of slugs or ids.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListParams {
    pub search: Option<String>,
    pub category: Option<String>,
    pub brand: Option<String>,
    pub gender: Option<String>,
    pub color: Option<String>,
    pub size: Option<String>,
    #[serde(rename = "priceRange")]
    pub price_range: Option<String>,
    pub sort: Option<String>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

impl ListParams {
    pub fn normalize(&self) -> Result<ListCriteria> {
        let (price_min, price_max) = match self.price_range.as_deref() {
            // A malformed range token means no price filter.
            Some(token) => match parse_price_range(token) {
                Some((min, max)) => (Some(min), Some(max)),
                None => (None, None),
            },
            None => (None, None),
        };

        ListCriteria::new(
            self.search.clone().filter(|s| !s.trim().is_empty()),
            split_tokens(self.category.as_deref()),
            split_tokens(self.brand.as_deref()),
            split_tokens(self.gender.as_deref()),
            split_tokens(self.color.as_deref()),
            split_tokens(self.size.as_deref()),
            price_min,
            price_max,
            self.sort.as_deref(),
            self.page,
            self.limit,
        )
    }
}

fn split_tokens(value: Option<&str>) -> Vec<String> {
    value
        .map(|v| {
            v.split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

/// Validated, fully-typed filter criteria. Selector tokens are still
/// slugs-or-ids at this point; resolution happens at query time.
#[derive(Debug, Clone, PartialEq)]
pub struct ListCriteria {
    pub search: Option<String>,
    pub category: Vec<String>,
    pub brand: Vec<String>,
    pub gender: Vec<String>,
    pub color: Vec<String>,
    pub size: Vec<String>,
    pub price_min: Option<Decimal>,
    pub price_max: Option<Decimal>,
    pub sort_by: SortBy,
    pub page: u32,
    pub limit: u32,
}

impl ListCriteria {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        search: Option<String>,
        category: Vec<String>,
        brand: Vec<String>,
        gender: Vec<String>,
        color: Vec<String>,
        size: Vec<String>,
        price_min: Option<Decimal>,
        price_max: Option<Decimal>,
        sort: Option<&str>,
        page: Option<u32>,
        limit: Option<u32>,
    ) -> Result<Self> {
        if price_min.is_some_and(|p| p.is_sign_negative())
            || price_max.is_some_and(|p| p.is_sign_negative())
        {
            return Err(AppError::Validation(
                "Price bounds must not be negative".to_string(),
            ));
        }

        let sort_by = match sort {
            Some(value) => SortBy::parse(value)?,
            None => SortBy::default(),
        };

        let page = page.unwrap_or(1);
        if page < 1 {
            return Err(AppError::Validation("Page must be at least 1".to_string()));
        }

        let limit = limit.unwrap_or(DEFAULT_PAGE_SIZE);
        if !(1..=MAX_PAGE_SIZE).contains(&limit) {
            return Err(AppError::Validation(format!(
                "Limit must be between 1 and {}",
                MAX_PAGE_SIZE
            )));
        }

        Ok(Self {
            search,
            category,
            brand,
            gender,
            color,
            size,
            price_min,
            price_max,
            sort_by,
            page,
            limit,
        })
    }
}

/// Criteria after slug resolution: selector lists hold internal ids only.
#[derive(Debug, Clone)]
pub struct ResolvedCriteria {
    pub search: Option<String>,
    pub category_ids: Vec<Uuid>,
    pub brand_ids: Vec<Uuid>,
    pub gender_ids: Vec<Uuid>,
    pub color_ids: Vec<Uuid>,
    pub size_ids: Vec<Uuid>,
    pub price_min: Option<Decimal>,
    pub price_max: Option<Decimal>,
    pub sort_by: SortBy,
    pub page: u32,
    pub limit: u32,
}

impl ResolvedCriteria {
    pub fn offset(&self) -> i64 {
        (self.page as i64 - 1) * self.limit as i64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn params() -> ListParams {
        ListParams::default()
    }

    #[test]
    fn normalize_applies_defaults() {
        let criteria = params().normalize().unwrap();
        assert_eq!(criteria.sort_by, SortBy::Latest);
        assert_eq!(criteria.page, 1);
        assert_eq!(criteria.limit, DEFAULT_PAGE_SIZE);
        assert!(criteria.category.is_empty());
    }

    #[test]
    fn normalize_splits_comma_lists() {
        let mut p = params();
        p.color = Some("red,blue".to_string());
        p.size = Some(" 9 , 10 ".to_string());
        let criteria = p.normalize().unwrap();
        assert_eq!(criteria.color, vec!["red", "blue"]);
        assert_eq!(criteria.size, vec!["9", "10"]);
    }

    #[test]
    fn normalize_parses_price_range() {
        let mut p = params();
        p.price_range = Some("50-100".to_string());
        let criteria = p.normalize().unwrap();
        assert_eq!(criteria.price_min, Some(dec!(50)));
        assert_eq!(criteria.price_max, Some(dec!(100)));
    }

    #[test]
    fn normalize_treats_malformed_price_range_as_absent() {
        let mut p = params();
        p.price_range = Some("abc-100".to_string());
        let criteria = p.normalize().unwrap();
        assert_eq!(criteria.price_min, None);
        assert_eq!(criteria.price_max, None);
    }

    #[test]
    fn normalize_rejects_unknown_sort() {
        let mut p = params();
        p.sort = Some("cheapest".to_string());
        assert!(matches!(
            p.normalize(),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn sort_aliases_map_to_canonical_keys() {
        assert_eq!(SortBy::parse("featured").unwrap(), SortBy::Latest);
        assert_eq!(SortBy::parse("newest").unwrap(), SortBy::Latest);
        assert_eq!(SortBy::parse("price_low").unwrap(), SortBy::PriceAsc);
        assert_eq!(SortBy::parse("price_high").unwrap(), SortBy::PriceDesc);
        assert_eq!(SortBy::parse("alphabetical").unwrap(), SortBy::NameAsc);
    }

    #[test]
    fn normalize_rejects_out_of_range_pagination() {
        let mut p = params();
        p.page = Some(0);
        assert!(p.normalize().is_err());

        let mut p = params();
        p.limit = Some(0);
        assert!(p.normalize().is_err());

        let mut p = params();
        p.limit = Some(101);
        assert!(p.normalize().is_err());

        let mut p = params();
        p.limit = Some(100);
        assert!(p.normalize().is_ok());
    }

    #[test]
    fn negative_price_bounds_are_rejected() {
        let result = ListCriteria::new(
            None,
            vec![],
            vec![],
            vec![],
            vec![],
            vec![],
            Some(dec!(-1)),
            None,
            None,
            None,
            None,
        );
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[test]
    fn blank_search_is_dropped() {
        let mut p = params();
        p.search = Some("   ".to_string());
        let criteria = p.normalize().unwrap();
        assert_eq!(criteria.search, None);
    }
}
