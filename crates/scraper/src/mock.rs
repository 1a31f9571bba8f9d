//! Deterministic scraper used until a real listing source is wired in.

use async_trait::async_trait;
use common::Money;
use listings::NewProperty;

use crate::error::Result;
use crate::service::Scraper;

/// Produces synthetic listings derived from the query text.
///
/// The same `(query, index)` pair always yields the same listing URL, so
/// repeating a query is skipped by the ingestion pipeline as duplicates.
#[derive(Debug, Clone, Copy, Default)]
pub struct MockScraper;

impl MockScraper {
    pub fn new() -> Self {
        Self
    }

    /// Builds the `index`-th synthetic listing for `query`.
    pub fn listing(query: &str, index: u32) -> NewProperty {
        let digest = format!("{:x}", md5::compute(format!("{query}:{index}")));
        let hash = &digest[..8];

        let (city, state, zip) = if query.to_lowercase().contains("staten") {
            ("Staten Island", "NY", "10301")
        } else {
            ("Newark", "NJ", "07102")
        };

        let i = i64::from(index);
        let beds = 2 + (index % 4) as i32;
        let baths = if beds <= 2 { 1.0 } else { 2.0 };

        NewProperty::new(
            "mock",
            format!("https://example.com/{hash}"),
            format!("{} {} St", 100 + i, title_case(query)),
            city,
            state,
            zip,
        )
        .price(Money::from_dollars(250_000 + i * 25_000))
        .beds(beds)
        .baths(baths)
        .sqft(900 + (index as i32) * 120)
        .description(format!("Mock listing for query='{query}'"))
    }
}

#[async_trait]
impl Scraper for MockScraper {
    async fn scrape(&self, query: &str, max_results: u32) -> Result<Vec<NewProperty>> {
        Ok((0..max_results)
            .map(|index| Self::listing(query, index))
            .collect())
    }
}

/// Upper-cases the first letter of every alphabetic run and lower-cases the rest.
fn title_case(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut at_word_start = true;
    for c in text.chars() {
        if c.is_alphabetic() {
            if at_word_start {
                out.extend(c.to_uppercase());
            } else {
                out.extend(c.to_lowercase());
            }
            at_word_start = false;
        } else {
            out.push(c);
            at_word_start = true;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn title_case_capitalizes_each_word() {
        assert_eq!(title_case("staten island"), "Staten Island");
        assert_eq!(title_case("NEW york-city"), "New York-City");
        assert_eq!(title_case("3rd ave"), "3Rd Ave");
    }

    #[test]
    fn listing_is_deterministic() {
        let a = MockScraper::listing("newark", 3);
        let b = MockScraper::listing("newark", 3);
        assert_eq!(a, b);
        assert_ne!(a.listing_url, MockScraper::listing("newark", 4).listing_url);
    }

    #[test]
    fn listing_url_uses_md5_prefix() {
        let listing = MockScraper::listing("newark", 0);
        let expected = format!("{:x}", md5::compute("newark:0"));
        assert_eq!(listing.listing_url, format!("https://example.com/{}", &expected[..8]));
    }

    #[test]
    fn staten_queries_land_in_staten_island() {
        let listing = MockScraper::listing("Staten Island homes", 0);
        assert_eq!(listing.city, "Staten Island");
        assert_eq!(listing.state, "NY");
        assert_eq!(listing.zip, "10301");

        let listing = MockScraper::listing("brick city", 0);
        assert_eq!(listing.city, "Newark");
        assert_eq!(listing.state, "NJ");
    }

    #[test]
    fn listing_fields_follow_index() {
        let listing = MockScraper::listing("bay", 2);
        assert_eq!(listing.address, "102 Bay St");
        assert_eq!(listing.price, Some(Money::from_dollars(300_000)));
        assert_eq!(listing.beds, Some(4));
        assert_eq!(listing.baths, Some(2.0));
        assert_eq!(listing.sqft, Some(1140));
        assert_eq!(listing.listing_source, "mock");
        assert_eq!(listing.description.as_deref(), Some("Mock listing for query='bay'"));

        let first = MockScraper::listing("bay", 0);
        assert_eq!(first.beds, Some(2));
        assert_eq!(first.baths, Some(1.0));
    }

    #[tokio::test]
    async fn scrape_returns_requested_count() {
        let items = MockScraper::new().scrape("newark", 12).await.unwrap();
        assert_eq!(items.len(), 12);
    }
}
