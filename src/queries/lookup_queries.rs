use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    error::Result,
    models::{ListCriteria, ReferenceKind, ResolvedCriteria},
};

/// True when the token is in canonical UUID text form (8-4-4-4-12 hex
/// groups). Anything else is treated as a slug.
pub fn is_canonical_id(token: &str) -> bool {
    let bytes = token.as_bytes();
    if bytes.len() != 36 {
        return false;
    }
    bytes.iter().enumerate().all(|(i, &c)| match i {
        8 | 13 | 18 | 23 => c == b'-',
        _ => c.is_ascii_hexdigit(),
    })
}

/// Map a selector token list to internal ids. A list made up entirely of
/// canonical-id tokens passes through without a lookup; otherwise the whole
/// list is treated as slugs. Slugs with no match are dropped.
pub async fn resolve_ids(
    pool: &PgPool,
    kind: ReferenceKind,
    tokens: &[String],
) -> Result<Vec<Uuid>> {
    if tokens.is_empty() {
        return Ok(Vec::new());
    }

    if tokens.iter().all(|t| is_canonical_id(t)) {
        return Ok(tokens
            .iter()
            .filter_map(|t| Uuid::parse_str(t).ok())
            .collect());
    }

    let sql = format!("SELECT id FROM {} WHERE slug = ANY($1)", kind.table());
    let ids = sqlx::query_scalar::<_, Uuid>(&sql)
        .bind(tokens)
        .fetch_all(pool)
        .await?;

    Ok(ids)
}

/// Resolve every selector list of the criteria against its reference table.
pub async fn resolve_criteria(pool: &PgPool, criteria: &ListCriteria) -> Result<ResolvedCriteria> {
    let (category_ids, brand_ids, gender_ids, color_ids, size_ids) = tokio::try_join!(
        resolve_ids(pool, ReferenceKind::Category, &criteria.category),
        resolve_ids(pool, ReferenceKind::Brand, &criteria.brand),
        resolve_ids(pool, ReferenceKind::Gender, &criteria.gender),
        resolve_ids(pool, ReferenceKind::Color, &criteria.color),
        resolve_ids(pool, ReferenceKind::Size, &criteria.size),
    )?;

    Ok(ResolvedCriteria {
        search: criteria.search.clone(),
        category_ids,
        brand_ids,
        gender_ids,
        color_ids,
        size_ids,
        price_min: criteria.price_min,
        price_max: criteria.price_max,
        sort_by: criteria.sort_by,
        page: criteria.page,
        limit: criteria.limit,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonical_id_format_is_recognized() {
        assert!(is_canonical_id("9f8b6c1e-4a2d-4f3b-8c1e-2a7d9f8b6c1e"));
        assert!(is_canonical_id("9F8B6C1E-4A2D-4F3B-8C1E-2A7D9F8B6C1E"));

        assert!(!is_canonical_id("running-shoes"));
        assert!(!is_canonical_id("9f8b6c1e4a2d4f3b8c1e2a7d9f8b6c1e"));
        assert!(!is_canonical_id("9f8b6c1e-4a2d-4f3b-8c1e-2a7d9f8b6c1"));
        assert!(!is_canonical_id("9f8b6c1e-4a2d-4f3b-8c1e-2a7d9f8b6c1g"));
        assert!(!is_canonical_id(""));
    }

    #[test]
    fn all_id_lists_pass_through_as_ids() {
        // Pass-through applies whether or not the ids exist in the table,
        // so it needs no database round trip.
        let tokens = vec![
            "9f8b6c1e-4a2d-4f3b-8c1e-2a7d9f8b6c1e".to_string(),
            "00000000-0000-0000-0000-000000000000".to_string(),
        ];
        assert!(tokens.iter().all(|t| is_canonical_id(t)));

        let parsed: Vec<Uuid> = tokens
            .iter()
            .filter_map(|t| Uuid::parse_str(t).ok())
            .collect();
        assert_eq!(parsed.len(), tokens.len());
        assert_eq!(parsed[0].to_string(), tokens[0]);
    }

    #[test]
    fn one_slug_makes_the_whole_list_slugs() {
        let tokens = vec![
            "9f8b6c1e-4a2d-4f3b-8c1e-2a7d9f8b6c1e".to_string(),
            "running-shoes".to_string(),
        ];
        assert!(!tokens.iter().all(|t| is_canonical_id(t)));
    }
}
