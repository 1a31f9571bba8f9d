//! PostgreSQL integration tests
//!
//! These tests use a shared PostgreSQL container and need a local Docker
//! daemon, so they are ignored by default. Run with:
//!
//! ```bash
//! cargo test -p listings --test postgres_integration -- --ignored --test-threads=1
//! ```

use std::sync::Arc;

use listings::{
    ErrorSample, ListingError, ListingStore, Money, NewAnalysis, NewProperty,
    PostgresListingStore, PropertyQuery, ScrapeRunOutcome, ScrapeRunStatus, seed::seed,
};
use testcontainers::{ContainerAsync, runners::AsyncRunner};
use testcontainers_modules::postgres::Postgres;
use tokio::sync::OnceCell;

/// Shared container info - container stays alive for all tests
struct ContainerInfo {
    #[allow(dead_code)] // Container must stay alive for tests
    container: ContainerAsync<Postgres>,
    connection_string: String,
}

/// Global shared container
static CONTAINER: OnceCell<Arc<ContainerInfo>> = OnceCell::const_new();

async fn get_container_info() -> Arc<ContainerInfo> {
    CONTAINER
        .get_or_init(|| async {
            let container = Postgres::default().start().await.unwrap();

            let host = container.get_host().await.unwrap();
            let port = container.get_host_port_ipv4(5432).await.unwrap();

            let connection_string =
                format!("postgres://postgres:postgres@{}:{}/postgres", host, port);

            let store = PostgresListingStore::connect(&connection_string)
                .await
                .unwrap();
            store.run_migrations().await.unwrap();
            store.pool().close().await;

            Arc::new(ContainerInfo {
                container,
                connection_string,
            })
        })
        .await
        .clone()
}

/// Get a fresh store with its own pool and cleared tables
async fn get_test_store() -> PostgresListingStore {
    let info = get_container_info().await;
    let store = PostgresListingStore::connect(&info.connection_string)
        .await
        .unwrap();

    sqlx::query(
        "TRUNCATE TABLE analysis_results, property_photos, properties, scrape_runs RESTART IDENTITY",
    )
    .execute(store.pool())
    .await
    .unwrap();

    store
}

fn listing(n: u32, city: &str, price: i64, beds: i32) -> NewProperty {
    NewProperty::new(
        "manual",
        format!("https://example.com/listing/{n}"),
        format!("{n} Main St"),
        city,
        "NJ",
        "07102",
    )
    .price(Money::from_dollars(price))
    .beds(beds)
    .baths(1.5)
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn insert_and_load_property() {
    let store = get_test_store().await;

    let inserted = store
        .insert_property(listing(1, "Newark", 390_000, 3))
        .await
        .unwrap();
    store.add_photo(inserted.id, "b.jpg", 2).await.unwrap();
    store.add_photo(inserted.id, "a.jpg", 1).await.unwrap();

    let loaded = store.get_property(inserted.id).await.unwrap().unwrap();
    assert_eq!(loaded.price, Some(Money::from_dollars(390_000)));
    assert_eq!(loaded.baths, Some(1.5));
    let urls: Vec<&str> = loaded.photos.iter().map(|p| p.photo_url.as_str()).collect();
    assert_eq!(urls, vec!["a.jpg", "b.jpg"]);
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn duplicate_listing_url_maps_to_duplicate() {
    let store = get_test_store().await;
    store
        .insert_property(listing(1, "Newark", 1, 1))
        .await
        .unwrap();

    let err = store
        .insert_property(listing(1, "Newark", 1, 1))
        .await
        .unwrap_err();
    assert!(matches!(err, ListingError::Duplicate { .. }));
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn search_filters_and_paginates() {
    let store = get_test_store().await;
    seed(&store).await.unwrap();

    let page = store
        .search_properties(
            PropertyQuery::new()
                .search("staten")
                .min_beds(3)
                .max_price(Money::from_dollars(600_000)),
        )
        .await
        .unwrap();
    assert_eq!(page.total, 1);
    assert_eq!(page.items[0].address, "123 Main St");
    assert_eq!(page.items[0].photos.len(), 3);

    let page = store
        .search_properties(PropertyQuery::new().page(2).page_size(5))
        .await
        .unwrap();
    assert_eq!(page.total, 8);
    assert_eq!(page.items.len(), 3);
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn analysis_upsert_replaces_row() {
    let store = get_test_store().await;
    let property = store
        .insert_property(listing(1, "Newark", 1, 1))
        .await
        .unwrap();

    for score in [50.0, 75.25] {
        store
            .upsert_analysis(NewAnalysis {
                property_id: property.id,
                score_total: score,
                score_breakdown: serde_json::json!({ "cap_rate": score }),
                reasons: None,
            })
            .await
            .unwrap();
    }

    let analysis = store.get_analysis(property.id).await.unwrap().unwrap();
    assert_eq!(analysis.score_total, 75.25);
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn scrape_run_round_trip() {
    let store = get_test_store().await;
    let run = store.create_scrape_run("newark", Some(3)).await.unwrap();
    assert_eq!(run.status, ScrapeRunStatus::Started);

    store
        .finish_scrape_run(
            run.id,
            ScrapeRunOutcome {
                status: ScrapeRunStatus::SucceededWithErrors,
                properties_found: 3,
                error_count: 1,
                error_samples: vec![ErrorSample::for_listing("https://example.com/x", "boom")],
            },
        )
        .await
        .unwrap();

    let loaded = store.get_scrape_run(run.id).await.unwrap().unwrap();
    assert_eq!(loaded.status, ScrapeRunStatus::SucceededWithErrors);
    assert!(loaded.finished_at.is_some());
    assert_eq!(
        loaded.error_samples,
        Some(vec![ErrorSample::for_listing("https://example.com/x", "boom")])
    );
    assert_eq!(store.list_scrape_runs(50).await.unwrap().len(), 1);
}
