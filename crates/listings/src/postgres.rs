use std::collections::HashMap;

use async_trait::async_trait;
use sqlx::{PgPool, Postgres, QueryBuilder, Row, postgres::PgRow};

use crate::{
    AnalysisResult, ErrorSample, ListingError, Money, NewAnalysis, NewProperty, Property,
    PropertyId, PropertyPage, PropertyPhoto, PropertyQuery, Result, ScrapeRun, ScrapeRunId,
    ScrapeRunOutcome, store::ListingStore,
};

const PROPERTY_COLUMNS: &str = "id, listing_source, listing_url, address, city, state, zip, \
     (price * 100)::BIGINT AS price_cents, beds, baths::FLOAT8 AS baths, sqft, description, \
     scraped_at, created_at, updated_at";

const SCRAPE_RUN_COLUMNS: &str = "id, query, max_results, status, started_at, finished_at, \
     properties_found, error_count, error_samples";

/// PostgreSQL-backed listing store implementation.
#[derive(Clone)]
pub struct PostgresListingStore {
    pool: PgPool,
}

impl PostgresListingStore {
    /// Creates a new PostgreSQL listing store.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connects to `database_url` and returns a store over a fresh pool.
    pub async fn connect(database_url: &str) -> Result<Self> {
        let pool = sqlx::postgres::PgPoolOptions::new()
            .max_connections(10)
            .connect(database_url)
            .await?;
        Ok(Self::new(pool))
    }

    /// Gets a reference to the underlying connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Runs the database migrations.
    pub async fn run_migrations(&self) -> Result<()> {
        sqlx::migrate!("../../migrations").run(&self.pool).await?;
        Ok(())
    }

    fn row_to_property(row: &PgRow) -> Result<Property> {
        Ok(Property {
            id: PropertyId::new(row.try_get("id")?),
            listing_source: row.try_get("listing_source")?,
            listing_url: row.try_get("listing_url")?,
            address: row.try_get("address")?,
            city: row.try_get("city")?,
            state: row.try_get("state")?,
            zip: row.try_get("zip")?,
            price: row
                .try_get::<Option<i64>, _>("price_cents")?
                .map(Money::from_cents),
            beds: row.try_get("beds")?,
            baths: row.try_get("baths")?,
            sqft: row.try_get("sqft")?,
            description: row.try_get("description")?,
            scraped_at: row.try_get("scraped_at")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
            photos: Vec::new(),
        })
    }

    fn row_to_photo(row: &PgRow) -> Result<PropertyPhoto> {
        Ok(PropertyPhoto {
            id: row.try_get("id")?,
            property_id: PropertyId::new(row.try_get("property_id")?),
            photo_url: row.try_get("photo_url")?,
            sort_order: row.try_get("sort_order")?,
        })
    }

    fn row_to_analysis(row: &PgRow) -> Result<AnalysisResult> {
        Ok(AnalysisResult {
            id: row.try_get("id")?,
            property_id: PropertyId::new(row.try_get("property_id")?),
            score_total: row.try_get("score_total")?,
            score_breakdown: row.try_get("score_breakdown")?,
            reasons: row.try_get("reasons")?,
            analyzed_at: row.try_get("analyzed_at")?,
        })
    }

    fn row_to_scrape_run(row: &PgRow) -> Result<ScrapeRun> {
        let status: String = row.try_get("status")?;
        let samples: Option<serde_json::Value> = row.try_get("error_samples")?;
        let error_samples = samples
            .map(serde_json::from_value::<Vec<ErrorSample>>)
            .transpose()?;

        Ok(ScrapeRun {
            id: ScrapeRunId::new(row.try_get("id")?),
            query: row.try_get("query")?,
            max_results: row.try_get("max_results")?,
            status: status.parse()?,
            started_at: row.try_get("started_at")?,
            finished_at: row.try_get("finished_at")?,
            properties_found: row.try_get("properties_found")?,
            error_count: row.try_get("error_count")?,
            error_samples,
        })
    }

    /// Loads photos for the given properties and attaches them in sort order.
    async fn attach_photos(&self, properties: &mut [Property]) -> Result<()> {
        if properties.is_empty() {
            return Ok(());
        }
        let ids: Vec<i64> = properties.iter().map(|p| p.id.as_i64()).collect();

        let rows = sqlx::query(
            r#"
            SELECT id, property_id, photo_url, sort_order
            FROM property_photos
            WHERE property_id = ANY($1)
            ORDER BY property_id, sort_order, id
            "#,
        )
        .bind(&ids)
        .fetch_all(&self.pool)
        .await?;

        let mut by_property: HashMap<PropertyId, Vec<PropertyPhoto>> = HashMap::new();
        for row in &rows {
            let photo = Self::row_to_photo(row)?;
            by_property.entry(photo.property_id).or_default().push(photo);
        }
        for property in properties.iter_mut() {
            property.photos = by_property.remove(&property.id).unwrap_or_default();
        }
        Ok(())
    }
}

/// Appends the WHERE clause for a property search.
fn push_filters(builder: &mut QueryBuilder<'_, Postgres>, query: &PropertyQuery) {
    builder.push(" WHERE 1=1");

    if let Some(ref q) = query.q {
        let like = format!("%{q}%");
        builder
            .push(" AND (address ILIKE ")
            .push_bind(like.clone())
            .push(" OR city ILIKE ")
            .push_bind(like.clone())
            .push(" OR state ILIKE ")
            .push_bind(like.clone())
            .push(" OR zip ILIKE ")
            .push_bind(like)
            .push(")");
    }
    if let Some(min) = query.min_price {
        builder
            .push(" AND price >= ")
            .push_bind(min.cents())
            .push("::BIGINT / 100.0");
    }
    if let Some(max) = query.max_price {
        builder
            .push(" AND price <= ")
            .push_bind(max.cents())
            .push("::BIGINT / 100.0");
    }
    if query.min_beds > 0 {
        builder
            .push(" AND beds >= ")
            .push_bind(i64::from(query.min_beds));
    }
}

fn map_insert_error(err: sqlx::Error, listing_url: &str) -> ListingError {
    if let sqlx::Error::Database(ref db_err) = err
        && db_err.is_unique_violation()
    {
        return ListingError::Duplicate {
            listing_url: listing_url.to_string(),
        };
    }
    ListingError::Database(err)
}

fn map_foreign_key_error(err: sqlx::Error, property_id: PropertyId) -> ListingError {
    if let sqlx::Error::Database(ref db_err) = err
        && db_err.is_foreign_key_violation()
    {
        return ListingError::PropertyNotFound(property_id);
    }
    ListingError::Database(err)
}

#[async_trait]
impl ListingStore for PostgresListingStore {
    #[tracing::instrument(skip(self))]
    async fn search_properties(&self, query: PropertyQuery) -> Result<PropertyPage> {
        let query = query.clamped();

        let mut count = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM properties");
        push_filters(&mut count, &query);
        let total: i64 = count.build_query_scalar().fetch_one(&self.pool).await?;

        let mut select = QueryBuilder::<Postgres>::new(format!(
            "SELECT {PROPERTY_COLUMNS} FROM properties"
        ));
        push_filters(&mut select, &query);
        select
            .push(" ORDER BY created_at DESC, id DESC LIMIT ")
            .push_bind(i64::from(query.page_size))
            .push(" OFFSET ")
            .push_bind(i64::try_from(query.offset()).unwrap_or(i64::MAX));
        let rows = select.build().fetch_all(&self.pool).await?;

        let mut items = rows
            .iter()
            .map(Self::row_to_property)
            .collect::<Result<Vec<_>>>()?;
        self.attach_photos(&mut items).await?;

        Ok(PropertyPage {
            items,
            total: u64::try_from(total).unwrap_or_default(),
            page: query.page,
            page_size: query.page_size,
        })
    }

    async fn get_property(&self, id: PropertyId) -> Result<Option<Property>> {
        let row = sqlx::query(&format!(
            "SELECT {PROPERTY_COLUMNS} FROM properties WHERE id = $1"
        ))
        .bind(id.as_i64())
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };
        let mut property = [Self::row_to_property(&row)?];
        self.attach_photos(&mut property).await?;
        let [property] = property;
        Ok(Some(property))
    }

    async fn property_exists(&self, listing_url: &str) -> Result<bool> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM properties WHERE listing_url = $1)")
                .bind(listing_url)
                .fetch_one(&self.pool)
                .await?;
        Ok(exists)
    }

    #[tracing::instrument(skip(self, property), fields(listing_url = %property.listing_url))]
    async fn insert_property(&self, property: NewProperty) -> Result<Property> {
        property.validate()?;

        let row = sqlx::query(&format!(
            r#"
            INSERT INTO properties
                (listing_source, listing_url, address, city, state, zip,
                 price, beds, baths, sqft, description, scraped_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7::BIGINT / 100.0, $8, $9::FLOAT8, $10, $11, $12)
            RETURNING {PROPERTY_COLUMNS}
            "#
        ))
        .bind(&property.listing_source)
        .bind(&property.listing_url)
        .bind(&property.address)
        .bind(&property.city)
        .bind(&property.state)
        .bind(&property.zip)
        .bind(property.price.map(|p| p.cents()))
        .bind(property.beds)
        .bind(property.baths)
        .bind(property.sqft)
        .bind(&property.description)
        .bind(property.scraped_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_insert_error(e, &property.listing_url))?;

        Self::row_to_property(&row)
    }

    async fn add_photo(
        &self,
        property_id: PropertyId,
        photo_url: &str,
        sort_order: i32,
    ) -> Result<PropertyPhoto> {
        let row = sqlx::query(
            r#"
            INSERT INTO property_photos (property_id, photo_url, sort_order)
            VALUES ($1, $2, $3)
            RETURNING id, property_id, photo_url, sort_order
            "#,
        )
        .bind(property_id.as_i64())
        .bind(photo_url)
        .bind(sort_order)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_foreign_key_error(e, property_id))?;

        Self::row_to_photo(&row)
    }

    async fn upsert_analysis(&self, analysis: NewAnalysis) -> Result<AnalysisResult> {
        let row = sqlx::query(
            r#"
            INSERT INTO analysis_results (property_id, score_total, score_breakdown, reasons)
            VALUES ($1, $2::FLOAT8, $3, $4)
            ON CONFLICT (property_id) DO UPDATE
            SET score_total = EXCLUDED.score_total,
                score_breakdown = EXCLUDED.score_breakdown,
                reasons = EXCLUDED.reasons,
                analyzed_at = NOW()
            RETURNING id, property_id, score_total::FLOAT8 AS score_total,
                      score_breakdown, reasons, analyzed_at
            "#,
        )
        .bind(analysis.property_id.as_i64())
        .bind(analysis.score_total)
        .bind(&analysis.score_breakdown)
        .bind(&analysis.reasons)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_foreign_key_error(e, analysis.property_id))?;

        Self::row_to_analysis(&row)
    }

    async fn get_analysis(&self, property_id: PropertyId) -> Result<Option<AnalysisResult>> {
        let row = sqlx::query(
            r#"
            SELECT id, property_id, score_total::FLOAT8 AS score_total,
                   score_breakdown, reasons, analyzed_at
            FROM analysis_results
            WHERE property_id = $1
            "#,
        )
        .bind(property_id.as_i64())
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(Self::row_to_analysis).transpose()
    }

    #[tracing::instrument(skip(self))]
    async fn create_scrape_run(&self, query: &str, max_results: Option<i32>) -> Result<ScrapeRun> {
        let row = sqlx::query(&format!(
            r#"
            INSERT INTO scrape_runs (query, max_results, status, properties_found, error_count)
            VALUES ($1, $2, 'started', 0, 0)
            RETURNING {SCRAPE_RUN_COLUMNS}
            "#
        ))
        .bind(query)
        .bind(max_results)
        .fetch_one(&self.pool)
        .await?;

        Self::row_to_scrape_run(&row)
    }

    #[tracing::instrument(skip(self, outcome), fields(status = %outcome.status))]
    async fn finish_scrape_run(
        &self,
        id: ScrapeRunId,
        outcome: ScrapeRunOutcome,
    ) -> Result<ScrapeRun> {
        let samples = outcome
            .samples_or_none()
            .map(serde_json::to_value)
            .transpose()?;

        let row = sqlx::query(&format!(
            r#"
            UPDATE scrape_runs
            SET status = $2,
                finished_at = NOW(),
                properties_found = $3,
                error_count = $4,
                error_samples = $5
            WHERE id = $1
            RETURNING {SCRAPE_RUN_COLUMNS}
            "#
        ))
        .bind(id.as_i64())
        .bind(outcome.status.as_str())
        .bind(outcome.properties_found)
        .bind(outcome.error_count)
        .bind(samples)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(ListingError::ScrapeRunNotFound(id))?;

        Self::row_to_scrape_run(&row)
    }

    async fn list_scrape_runs(&self, limit: usize) -> Result<Vec<ScrapeRun>> {
        let rows = sqlx::query(&format!(
            "SELECT {SCRAPE_RUN_COLUMNS} FROM scrape_runs ORDER BY started_at DESC, id DESC LIMIT $1"
        ))
        .bind(i64::try_from(limit).unwrap_or(i64::MAX))
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(Self::row_to_scrape_run).collect()
    }

    async fn get_scrape_run(&self, id: ScrapeRunId) -> Result<Option<ScrapeRun>> {
        let row = sqlx::query(&format!(
            "SELECT {SCRAPE_RUN_COLUMNS} FROM scrape_runs WHERE id = $1"
        ))
        .bind(id.as_i64())
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(Self::row_to_scrape_run).transpose()
    }
}
