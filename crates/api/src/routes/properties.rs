//! Property search endpoint.

use std::collections::HashMap;
use std::sync::Arc;

use axum::Json;
use axum::extract::{Query, State};
use common::Money;
use listings::{ListingStore, PropertyPage, PropertyQuery};

use super::AppState;
use crate::error::ApiError;

/// Reads an integer parameter, treating missing or empty values as `default`
/// and clamping the result into `[min, max]`.
fn int_param(
    params: &HashMap<String, String>,
    name: &str,
    default: i64,
    min: i64,
    max: i64,
) -> Result<i64, ApiError> {
    let value = match params.get(name).map(|raw| raw.trim()) {
        None | Some("") => default,
        Some(raw) => raw
            .parse::<i64>()
            .map_err(|_| ApiError::BadRequest(format!("'{name}' must be an integer")))?,
    };
    Ok(value.clamp(min, max))
}

/// Reads an optional decimal parameter.
fn number_param(params: &HashMap<String, String>, name: &str) -> Result<Option<f64>, ApiError> {
    match params.get(name).map(|raw| raw.trim()) {
        None | Some("") => Ok(None),
        Some(raw) => raw
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
            .map(Some)
            .ok_or_else(|| ApiError::BadRequest(format!("'{name}' must be a number"))),
    }
}

/// Translates raw query-string parameters into a search.
pub fn parse_query(params: &HashMap<String, String>) -> Result<PropertyQuery, ApiError> {
    let page = int_param(params, "page", 1, 1, i64::from(u32::MAX))?;
    let page_size = int_param(
        params,
        "page_size",
        i64::from(listings::query::DEFAULT_PAGE_SIZE),
        1,
        i64::from(listings::query::MAX_PAGE_SIZE),
    )?;
    let min_beds = int_param(params, "min_beds", 0, 0, i64::from(u32::MAX))?;
    let min_price = number_param(params, "min_price")?;
    let max_price = number_param(params, "max_price")?;

    let mut query = PropertyQuery::new()
        .page(page as u32)
        .page_size(page_size as u32)
        .min_beds(min_beds as u32);
    if let Some(q) = params.get("q") {
        query = query.search(q.as_str());
    }
    if let Some(min) = min_price {
        query = query.min_price(Money::from_dollars_f64(min));
    }
    if let Some(max) = max_price {
        query = query.max_price(Money::from_dollars_f64(max));
    }
    Ok(query)
}

/// GET /properties: search listings, newest first.
#[tracing::instrument(skip(state))]
pub async fn list<S: ListingStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<PropertyPage>, ApiError> {
    let query = parse_query(&params)?;
    let page = state.store.search_properties(query).await?;
    tracing::debug!(total = page.total, returned = page.items.len(), "property search");
    Ok(Json(page))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn defaults_when_empty() {
        let query = parse_query(&params(&[])).unwrap();
        assert_eq!(query, PropertyQuery::new());
    }

    #[test]
    fn empty_values_use_defaults() {
        let query = parse_query(&params(&[("page", ""), ("min_price", "")])).unwrap();
        assert_eq!(query.page, 1);
        assert_eq!(query.min_price, None);
    }

    #[test]
    fn paging_is_clamped() {
        let query = parse_query(&params(&[("page", "-4"), ("page_size", "1000")])).unwrap();
        assert_eq!(query.page, 1);
        assert_eq!(query.page_size, 100);

        let query = parse_query(&params(&[("min_beds", "-2")])).unwrap();
        assert_eq!(query.min_beds, 0);
    }

    #[test]
    fn non_integer_page_is_rejected() {
        let err = parse_query(&params(&[("page", "two")])).unwrap_err();
        assert!(matches!(err, ApiError::BadRequest(msg) if msg == "'page' must be an integer"));
    }

    #[test]
    fn non_numeric_price_is_rejected() {
        let err = parse_query(&params(&[("max_price", "cheap")])).unwrap_err();
        assert!(matches!(err, ApiError::BadRequest(msg) if msg == "'max_price' must be a number"));
    }

    #[test]
    fn prices_are_converted_to_money() {
        let query = parse_query(&params(&[("min_price", "250000.50"), ("q", " newark ")])).unwrap();
        assert_eq!(query.min_price, Some(Money::from_cents(25_000_050)));
        assert_eq!(query.q.as_deref(), Some("newark"));
    }
}
