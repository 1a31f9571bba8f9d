use serde::{Deserialize, Serialize};

use crate::{Money, Property};

/// Page size used when none is requested.
pub const DEFAULT_PAGE_SIZE: u32 = 20;

/// Largest page size a caller may request.
pub const MAX_PAGE_SIZE: u32 = 100;

/// Builder for property searches.
///
/// Filters by a free-text term, a price range, and a minimum bedroom
/// count, and selects one page of results ordered newest first.
/// Out-of-range paging values are clamped rather than rejected.
#[derive(Debug, Clone, PartialEq)]
pub struct PropertyQuery {
    /// Case-insensitive substring matched against address, city, state and zip.
    pub q: Option<String>,

    /// Minimum price (inclusive).
    pub min_price: Option<Money>,

    /// Maximum price (inclusive).
    pub max_price: Option<Money>,

    /// Minimum bedroom count. Zero disables the filter.
    pub min_beds: u32,

    /// 1-based page number.
    pub page: u32,

    /// Number of results per page.
    pub page_size: u32,
}

impl Default for PropertyQuery {
    fn default() -> Self {
        Self {
            q: None,
            min_price: None,
            max_price: None,
            min_beds: 0,
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl PropertyQuery {
    /// Creates a query matching every property, first page.
    pub fn new() -> Self {
        Self::default()
    }

    /// Filters by a search term. Blank terms are ignored.
    pub fn search(mut self, q: impl Into<String>) -> Self {
        let q = q.into().trim().to_string();
        self.q = if q.is_empty() { None } else { Some(q) };
        self
    }

    pub fn min_price(mut self, price: Money) -> Self {
        self.min_price = Some(price);
        self
    }

    pub fn max_price(mut self, price: Money) -> Self {
        self.max_price = Some(price);
        self
    }

    pub fn min_beds(mut self, beds: u32) -> Self {
        self.min_beds = beds;
        self
    }

    pub fn page(mut self, page: u32) -> Self {
        self.page = page;
        self
    }

    pub fn page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size;
        self
    }

    /// Returns a copy with paging values forced into their valid ranges.
    pub fn clamped(mut self) -> Self {
        self.page = self.page.max(1);
        self.page_size = self.page_size.clamp(1, MAX_PAGE_SIZE);
        if let Some(q) = self.q.take() {
            let q = q.trim().to_string();
            self.q = if q.is_empty() { None } else { Some(q) };
        }
        self
    }

    /// Number of rows to skip for the selected page.
    pub fn offset(&self) -> u64 {
        u64::from(self.page.saturating_sub(1)) * u64::from(self.page_size)
    }

    /// Returns true if the property passes every filter.
    pub fn matches(&self, property: &Property) -> bool {
        if let Some(ref q) = self.q {
            let needle = q.to_lowercase();
            let hit = [
                &property.address,
                &property.city,
                &property.state,
                &property.zip,
            ]
            .iter()
            .any(|field| field.to_lowercase().contains(&needle));
            if !hit {
                return false;
            }
        }
        if let Some(min) = self.min_price
            && !property.price.is_some_and(|p| p >= min)
        {
            return false;
        }
        if let Some(max) = self.max_price
            && !property.price.is_some_and(|p| p <= max)
        {
            return false;
        }
        if self.min_beds > 0
            && !property
                .beds
                .is_some_and(|b| i64::from(b) >= i64::from(self.min_beds))
        {
            return false;
        }
        true
    }
}

/// One page of search results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertyPage {
    pub items: Vec<Property>,
    /// Number of matching properties across all pages.
    pub total: u64,
    pub page: u32,
    pub page_size: u32,
}
