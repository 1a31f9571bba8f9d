//! Listing records as stored and served.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{ListingError, Money, PropertyId, ScrapeRunId};

/// A stored property listing together with its photos.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Property {
    pub id: PropertyId,
    pub listing_source: String,
    pub listing_url: String,
    pub address: String,
    pub city: String,
    pub state: String,
    pub zip: String,
    pub price: Option<Money>,
    pub beds: Option<i32>,
    pub baths: Option<f64>,
    pub sqft: Option<i32>,
    pub description: Option<String>,
    pub scraped_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Photos ordered by `sort_order`.
    pub photos: Vec<PropertyPhoto>,
}

/// Fields needed to insert a property.
///
/// Use the chained setters for the optional attributes:
///
/// ```
/// use listings::{Money, NewProperty};
///
/// let listing = NewProperty::new("manual", "https://example.com/1", "1 Main St", "Newark", "NJ", "07102")
///     .price(Money::from_dollars(300_000))
///     .beds(3);
/// assert_eq!(listing.beds, Some(3));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewProperty {
    pub listing_source: String,
    pub listing_url: String,
    pub address: String,
    pub city: String,
    pub state: String,
    pub zip: String,
    pub price: Option<Money>,
    pub beds: Option<i32>,
    pub baths: Option<f64>,
    pub sqft: Option<i32>,
    pub description: Option<String>,
    pub scraped_at: Option<DateTime<Utc>>,
}

impl NewProperty {
    /// Creates a listing with the required location fields set.
    pub fn new(
        listing_source: impl Into<String>,
        listing_url: impl Into<String>,
        address: impl Into<String>,
        city: impl Into<String>,
        state: impl Into<String>,
        zip: impl Into<String>,
    ) -> Self {
        Self {
            listing_source: listing_source.into(),
            listing_url: listing_url.into(),
            address: address.into(),
            city: city.into(),
            state: state.into(),
            zip: zip.into(),
            price: None,
            beds: None,
            baths: None,
            sqft: None,
            description: None,
            scraped_at: None,
        }
    }

    pub fn price(mut self, price: Money) -> Self {
        self.price = Some(price);
        self
    }

    pub fn beds(mut self, beds: i32) -> Self {
        self.beds = Some(beds);
        self
    }

    pub fn baths(mut self, baths: f64) -> Self {
        self.baths = Some(baths);
        self
    }

    pub fn sqft(mut self, sqft: i32) -> Self {
        self.sqft = Some(sqft);
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn scraped_at(mut self, scraped_at: DateTime<Utc>) -> Self {
        self.scraped_at = Some(scraped_at);
        self
    }

    /// Checks the column length limits of the `properties` table.
    pub fn validate(&self) -> Result<(), ListingError> {
        let limits = [
            ("listing_source", &self.listing_source, 50),
            ("listing_url", &self.listing_url, 500),
            ("address", &self.address, 255),
            ("city", &self.city, 100),
            ("state", &self.state, 50),
            ("zip", &self.zip, 20),
        ];
        for (field, value, max) in limits {
            if value.trim().is_empty() {
                return Err(ListingError::InvalidData(format!("{field} is required")));
            }
            if value.chars().count() > max {
                return Err(ListingError::InvalidData(format!(
                    "{field} exceeds {max} characters"
                )));
            }
        }
        Ok(())
    }
}

/// A photo attached to a property.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyPhoto {
    pub id: i64,
    pub property_id: PropertyId,
    pub photo_url: String,
    pub sort_order: i32,
}

/// Scoring output for a property. At most one exists per property.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub id: i64,
    pub property_id: PropertyId,
    pub score_total: f64,
    pub score_breakdown: serde_json::Value,
    pub reasons: Option<serde_json::Value>,
    pub analyzed_at: DateTime<Utc>,
}

/// Fields needed to record (or replace) an analysis.
#[derive(Debug, Clone, PartialEq)]
pub struct NewAnalysis {
    pub property_id: PropertyId,
    pub score_total: f64,
    pub score_breakdown: serde_json::Value,
    pub reasons: Option<serde_json::Value>,
}

/// Lifecycle status of a scrape run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScrapeRunStatus {
    Started,
    Succeeded,
    SucceededWithErrors,
    Failed,
}

impl ScrapeRunStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScrapeRunStatus::Started => "started",
            ScrapeRunStatus::Succeeded => "succeeded",
            ScrapeRunStatus::SucceededWithErrors => "succeeded_with_errors",
            ScrapeRunStatus::Failed => "failed",
        }
    }

    /// Returns true once the run has stopped.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, ScrapeRunStatus::Started)
    }
}

impl std::fmt::Display for ScrapeRunStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ScrapeRunStatus {
    type Err = ListingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "started" => Ok(ScrapeRunStatus::Started),
            "succeeded" => Ok(ScrapeRunStatus::Succeeded),
            "succeeded_with_errors" => Ok(ScrapeRunStatus::SucceededWithErrors),
            "failed" => Ok(ScrapeRunStatus::Failed),
            other => Err(ListingError::InvalidData(format!(
                "unknown scrape run status '{other}'"
            ))),
        }
    }
}

/// A recorded failure from a scrape run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorSample {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub listing_url: Option<String>,
    pub error: String,
}

impl ErrorSample {
    pub fn for_listing(listing_url: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            listing_url: Some(listing_url.into()),
            error: error.into(),
        }
    }

    pub fn general(error: impl Into<String>) -> Self {
        Self {
            listing_url: None,
            error: error.into(),
        }
    }
}

/// Bookkeeping row for one scrape invocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScrapeRun {
    pub id: ScrapeRunId,
    pub query: String,
    pub max_results: Option<i32>,
    pub status: ScrapeRunStatus,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    pub properties_found: i32,
    pub error_count: i32,
    pub error_samples: Option<Vec<ErrorSample>>,
}

/// Final counts written when a scrape run stops.
#[derive(Debug, Clone, PartialEq)]
pub struct ScrapeRunOutcome {
    pub status: ScrapeRunStatus,
    pub properties_found: i32,
    pub error_count: i32,
    /// Stored as NULL when empty.
    pub error_samples: Vec<ErrorSample>,
}

impl ScrapeRunOutcome {
    pub(crate) fn samples_or_none(&self) -> Option<Vec<ErrorSample>> {
        if self.error_samples.is_empty() {
            None
        } else {
            Some(self.error_samples.clone())
        }
    }
}
