//! Prints the BRRRR Radar status page for the configured backend.

use status::{HttpHealthProbe, StatusConfig, StatusPage};

#[tokio::main]
async fn main() {
    let config = StatusConfig::from_env();

    {
        use tracing_subscriber::EnvFilter;
        use tracing_subscriber::layer::SubscriberExt;
        use tracing_subscriber::util::SubscriberInitExt;

        tracing_subscriber::registry()
            .with(EnvFilter::new(&config.log_level))
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }

    tracing::info!(endpoint = %config.endpoint, "checking backend health");

    let page = StatusPage::new(HttpHealthProbe::new(config.endpoint));
    let mut mounted = page.mount();
    println!("{}", mounted.render());

    mounted.settled().await;
    println!("\n{}", mounted.render());
}
