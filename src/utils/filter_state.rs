//! Pure bidirectional mapping between canonical filter state and a URL
//! query string, plus the mutation helpers the presentation layer uses to
//! keep navigation in sync with the listing query. No I/O here.

use rust_decimal::Decimal;

pub const DEFAULT_SORT: &str = "latest";

/// Canonical, URL-independent filter state. List selectors are encoded as
/// comma-joined values; absent keys mean the defaults below.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterState {
    pub search: Option<String>,
    pub category: Vec<String>,
    pub brand: Vec<String>,
    pub gender: Vec<String>,
    pub color: Vec<String>,
    pub size: Vec<String>,
    pub price_range: Option<String>,
    pub sort: String,
    pub page: u32,
}

impl Default for FilterState {
    fn default() -> Self {
        Self {
            search: None,
            category: Vec::new(),
            brand: Vec::new(),
            gender: Vec::new(),
            color: Vec::new(),
            size: Vec::new(),
            price_range: None,
            sort: DEFAULT_SORT.to_string(),
            page: 1,
        }
    }
}

/// The selector lists a single filter chip can toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterKind {
    Gender,
    Color,
    Size,
}

impl FilterState {
    fn list_mut(&mut self, kind: FilterKind) -> &mut Vec<String> {
        match kind {
            FilterKind::Gender => &mut self.gender,
            FilterKind::Color => &mut self.color,
            FilterKind::Size => &mut self.size,
        }
    }
}

/// Parse a query string into filter state. Accepts both comma-joined and
/// repeated-key list encodings; unknown keys are ignored.
pub fn parse(query: &str) -> FilterState {
    let mut state = FilterState::default();

    for (key, value) in form_urlencoded::parse(query.trim_start_matches('?').as_bytes()) {
        let value = value.into_owned();
        match key.as_ref() {
            "search" if !value.is_empty() => state.search = Some(value),
            "category" => extend_list(&mut state.category, &value),
            "brand" => extend_list(&mut state.brand, &value),
            "gender" => extend_list(&mut state.gender, &value),
            "color" => extend_list(&mut state.color, &value),
            "size" => extend_list(&mut state.size, &value),
            "priceRange" if !value.is_empty() => state.price_range = Some(value),
            "sort" if !value.is_empty() => state.sort = value,
            "page" => state.page = value.parse().unwrap_or(1),
            _ => {}
        }
    }

    state
}

fn extend_list(list: &mut Vec<String>, value: &str) {
    for token in value.split(',') {
        let token = token.trim();
        if !token.is_empty() && !list.iter().any(|t| t == token) {
            list.push(token.to_string());
        }
    }
}

/// Serialize filter state back to a query string. Empty lists and strings
/// are omitted, as are the default sort and page so that the default state
/// stringifies to "".
pub fn stringify(state: &FilterState) -> String {
    let mut serializer = form_urlencoded::Serializer::new(String::new());

    if let Some(search) = state.search.as_deref().filter(|s| !s.is_empty()) {
        serializer.append_pair("search", search);
    }
    for (key, list) in [
        ("category", &state.category),
        ("brand", &state.brand),
        ("gender", &state.gender),
        ("color", &state.color),
        ("size", &state.size),
    ] {
        if !list.is_empty() {
            serializer.append_pair(key, &list.join(","));
        }
    }
    if let Some(range) = state.price_range.as_deref().filter(|s| !s.is_empty()) {
        serializer.append_pair("priceRange", range);
    }
    if state.sort != DEFAULT_SORT {
        serializer.append_pair("sort", &state.sort);
    }
    if state.page != 1 {
        serializer.append_pair("page", &state.page.to_string());
    }

    serializer.finish()
}

/// Add a value to a selector list; a no-op when already present. Page
/// resets to 1 in the returned state.
pub fn add_filter(state: &FilterState, kind: FilterKind, value: &str) -> FilterState {
    let mut next = state.clone();
    let list = next.list_mut(kind);
    if !list.iter().any(|v| v == value) {
        list.push(value.to_string());
    }
    next.page = 1;
    next
}

/// Remove a value from a selector list; a no-op when absent. Page resets
/// to 1 in the returned state.
pub fn remove_filter(state: &FilterState, kind: FilterKind, value: &str) -> FilterState {
    let mut next = state.clone();
    next.list_mut(kind).retain(|v| v != value);
    next.page = 1;
    next
}

pub fn update_sort(state: &FilterState, sort: &str) -> FilterState {
    let mut next = state.clone();
    next.sort = sort.to_string();
    next.page = 1;
    next
}

pub fn update_price_range(state: &FilterState, price_range: Option<&str>) -> FilterState {
    let mut next = state.clone();
    next.price_range = price_range.map(str::to_string);
    next.page = 1;
    next
}

/// The canonical default state: empty selectors, default sort, page 1.
pub fn clear_all() -> FilterState {
    FilterState::default()
}

/// Parse a "min-max" price range token into numeric bounds. Malformed
/// tokens mean no price filter.
pub fn parse_price_range(token: &str) -> Option<(Decimal, Decimal)> {
    let (min, max) = token.split_once('-')?;
    let min = min.trim().parse::<Decimal>().ok()?;
    let max = max.trim().parse::<Decimal>().ok()?;
    Some((min, max))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn sample_state() -> FilterState {
        FilterState {
            search: Some("pegasus".to_string()),
            category: vec!["shoes".to_string()],
            brand: vec![],
            gender: vec!["men".to_string(), "women".to_string()],
            color: vec!["red".to_string()],
            size: vec!["9".to_string()],
            price_range: Some("50-100".to_string()),
            sort: "price_asc".to_string(),
            page: 3,
        }
    }

    #[test]
    fn round_trips_through_query_string() {
        let state = sample_state();
        assert_eq!(parse(&stringify(&state)), state);
    }

    #[test]
    fn default_state_stringifies_to_empty() {
        assert_eq!(stringify(&FilterState::default()), "");
        assert_eq!(parse(""), FilterState::default());
    }

    #[test]
    fn parse_accepts_comma_joined_and_repeated_keys() {
        let comma = parse("color=red,blue&page=2");
        let repeated = parse("color=red&color=blue&page=2");
        assert_eq!(comma.color, vec!["red", "blue"]);
        assert_eq!(comma, repeated);
    }

    #[test]
    fn parse_defaults_sort_and_page() {
        let state = parse("gender=men");
        assert_eq!(state.sort, "latest");
        assert_eq!(state.page, 1);
    }

    #[test]
    fn parse_ignores_unknown_keys_and_bad_page() {
        let state = parse("utm_source=ad&page=abc");
        assert_eq!(state.page, 1);
        assert_eq!(state, FilterState::default());
    }

    #[test]
    fn add_filter_is_idempotent_and_resets_page() {
        let state = sample_state();
        let once = add_filter(&state, FilterKind::Color, "blue");
        let twice = add_filter(&once, FilterKind::Color, "blue");
        assert_eq!(once, twice);
        assert_eq!(once.color, vec!["red", "blue"]);
        assert_eq!(once.page, 1);
    }

    #[test]
    fn remove_filter_is_idempotent_and_resets_page() {
        let state = sample_state();
        let removed = remove_filter(&state, FilterKind::Gender, "men");
        assert_eq!(removed.gender, vec!["women"]);
        assert_eq!(removed.page, 1);

        let again = remove_filter(&removed, FilterKind::Gender, "men");
        assert_eq!(removed, again);
    }

    #[test]
    fn sort_and_price_updates_reset_page() {
        let state = sample_state();
        let sorted = update_sort(&state, "name_desc");
        assert_eq!(sorted.sort, "name_desc");
        assert_eq!(sorted.page, 1);

        let ranged = update_price_range(&state, Some("100-150"));
        assert_eq!(ranged.price_range.as_deref(), Some("100-150"));
        assert_eq!(ranged.page, 1);

        let cleared = update_price_range(&state, None);
        assert_eq!(cleared.price_range, None);
    }

    #[test]
    fn clear_all_returns_the_default_state() {
        assert_eq!(clear_all(), FilterState::default());
    }

    #[test]
    fn price_range_token_parsing() {
        assert_eq!(parse_price_range("50-100"), Some((dec!(50), dec!(100))));
        assert_eq!(parse_price_range("0-50"), Some((dec!(0), dec!(50))));
        assert_eq!(parse_price_range("abc-100"), None);
        assert_eq!(parse_price_range("100"), None);
    }
}
