//! Loads the fixture listings into the configured database.

use api::config::Config;
use listings::PostgresListingStore;

#[tokio::main]
async fn main() {
    let config = Config::from_env();
    api::init_tracing(&config.log_level);

    let Some(url) = config.database_url else {
        tracing::error!("DATABASE_URL must be set to seed listings");
        std::process::exit(1);
    };

    let store = PostgresListingStore::connect(&url)
        .await
        .expect("failed to connect to database");
    store
        .run_migrations()
        .await
        .expect("failed to run migrations");

    tracing::info!("seeding properties");
    let inserted = listings::seed::seed(&store).await.expect("seeding failed");
    tracing::info!(count = inserted.len(), "done seeding");
}
