//! End-to-end tests for the status page against a local HTTP backend.

use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use axum::Router;
use axum::http::StatusCode;
use axum::routing::get;
use status::{DisplayState, HealthProbe, HealthResponse, HttpHealthProbe, ProbeError, StatusPage};
use tokio::net::TcpListener;
use tokio::sync::Notify;

/// A backend whose `/health` always answers with the same status and body.
struct MockBackend {
    addr: SocketAddr,
    hits: Arc<AtomicUsize>,
}

impl MockBackend {
    async fn start(status: StatusCode, body: &'static str) -> Self {
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&hits);
        let app = Router::new().route(
            "/health",
            get(move || {
                let counter = Arc::clone(&counter);
                async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                    (status, body)
                }
            }),
        );

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { addr, hits }
    }

    fn health_url(&self) -> String {
        format!("http://{}/health", self.addr)
    }

    fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }
}

async fn settle_against(status: StatusCode, body: &'static str) -> DisplayState {
    let backend = MockBackend::start(status, body).await;
    let page = StatusPage::new(HttpHealthProbe::new(backend.health_url()));
    let mut mounted = page.mount();
    mounted.settled().await
}

/// Blocks inside `check` until released, then records completion.
#[derive(Clone, Default)]
struct GatedProbe {
    gate: Arc<Notify>,
    completed: Arc<AtomicBool>,
}

#[async_trait]
impl HealthProbe for GatedProbe {
    async fn check(&self) -> Result<HealthResponse, ProbeError> {
        self.gate.notified().await;
        self.completed.store(true, Ordering::SeqCst);
        Ok(serde_json::json!({ "status": "ok" }))
    }
}

#[tokio::test]
async fn test_ok_json_shows_data_status() {
    let state = settle_against(StatusCode::OK, r#"{"status":"ok"}"#).await;
    assert_eq!(state, DisplayState::DataStatus);
}

#[tokio::test]
async fn test_any_json_shape_shows_data_status() {
    assert_eq!(
        settle_against(StatusCode::OK, "{}").await,
        DisplayState::DataStatus
    );
    assert_eq!(
        settle_against(StatusCode::OK, r#""just a string""#).await,
        DisplayState::DataStatus
    );
}

#[tokio::test]
async fn test_status_code_is_not_checked() {
    let state = settle_against(StatusCode::INTERNAL_SERVER_ERROR, r#"{"error":"down"}"#).await;
    assert_eq!(state, DisplayState::DataStatus);
}

#[tokio::test]
async fn test_malformed_body_shows_error() {
    let state = settle_against(StatusCode::OK, "<html>not json</html>").await;
    assert_eq!(state, DisplayState::Error);
}

#[tokio::test]
async fn test_unreachable_backend_shows_error() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let page = StatusPage::new(HttpHealthProbe::new(format!("http://{addr}/health")));
    let mut mounted = page.mount();

    assert_eq!(mounted.settled().await, DisplayState::Error);
    assert_eq!(mounted.render(), "BRRRR Radar\n\nBackend status: error");
}

#[tokio::test]
async fn test_one_request_per_mount() {
    let backend = MockBackend::start(StatusCode::OK, r#"{"status":"ok"}"#).await;
    let page = StatusPage::new(HttpHealthProbe::new(backend.health_url()));

    let mut first = page.mount();
    first.settled().await;
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(backend.hits(), 1);
    assert_eq!(first.state(), DisplayState::DataStatus);
    drop(first);

    let mut second = page.mount();
    second.settled().await;
    assert_eq!(backend.hits(), 2);
}

#[tokio::test]
async fn test_loading_until_request_settles() {
    let probe = GatedProbe::default();
    let page = StatusPage::new(probe.clone());
    let mut mounted = page.mount();

    assert_eq!(mounted.state(), DisplayState::Loading);
    assert_eq!(mounted.render(), "BRRRR Radar\n\nBackend status: loading...");

    probe.gate.notify_one();
    assert_eq!(mounted.settled().await, DisplayState::DataStatus);
    assert_eq!(
        mounted.render(),
        "BRRRR Radar\n\nBackend status: data.status"
    );
}

#[tokio::test]
async fn test_unmount_abandons_pending_request() {
    let probe = GatedProbe::default();
    let page = StatusPage::new(probe.clone());

    let mounted = page.mount();
    tokio::task::yield_now().await;
    drop(mounted);

    probe.gate.notify_one();
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(!probe.completed.load(Ordering::SeqCst));
}
