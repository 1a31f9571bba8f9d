//! Integration tests for the API server.

use std::sync::{Arc, OnceLock};

use axum::body::Body;
use axum::http::{Request, StatusCode};
use listings::InMemoryListingStore;
use metrics_exporter_prometheus::PrometheusHandle;
use tower::ServiceExt;

static METRICS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

fn get_metrics_handle() -> PrometheusHandle {
    METRICS_HANDLE
        .get_or_init(|| {
            let builder = metrics_exporter_prometheus::PrometheusBuilder::new();
            builder
                .install_recorder()
                .expect("failed to install Prometheus recorder")
        })
        .clone()
}

fn setup() -> axum::Router {
    setup_with_state().0
}

fn setup_with_state() -> (
    axum::Router,
    Arc<api::routes::AppState<InMemoryListingStore>>,
) {
    let store = InMemoryListingStore::new();
    let state = api::create_default_state(store);
    let app = api::create_app(state.clone(), get_metrics_handle(), "http://localhost:5173");
    (app, state)
}

async fn send(app: &axum::Router, request: Request<Body>) -> (StatusCode, serde_json::Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = if body.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&body).unwrap()
    };
    (status, json)
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn post_json(uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_string(&body).unwrap()))
        .unwrap()
}

#[tokio::test]
async fn test_health_check() {
    let app = setup();

    let (status, json) = send(&app, get("/health")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json, serde_json::json!({ "status": "ok" }));
}

#[tokio::test]
async fn test_health_allows_frontend_origin() {
    let app = setup();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/health")
                .header("origin", "http://localhost:5173")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(
        response.headers()["access-control-allow-origin"],
        "http://localhost:5173"
    );
}

#[tokio::test]
async fn test_list_properties_empty() {
    let app = setup();

    let (status, json) = send(&app, get("/properties")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["total"], 0);
    assert_eq!(json["page"], 1);
    assert_eq!(json["page_size"], 20);
    assert_eq!(json["items"], serde_json::json!([]));
}

#[tokio::test]
async fn test_list_properties_filters_seeded_data() {
    let (app, state) = setup_with_state();
    listings::seed::seed(&state.store).await.unwrap();

    let (status, json) = send(&app, get("/properties?q=newark&min_beds=4")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["total"], 1);
    let item = &json["items"][0];
    assert_eq!(item["address"], "88 Market St");
    assert_eq!(item["price"], 425000.0);
    assert_eq!(item["photos"].as_array().unwrap().len(), 4);
}

#[tokio::test]
async fn test_list_properties_paginates() {
    let (app, state) = setup_with_state();
    listings::seed::seed(&state.store).await.unwrap();

    let (_, json) = send(&app, get("/properties?page=2&page_size=3")).await;

    assert_eq!(json["total"], 8);
    assert_eq!(json["page"], 2);
    assert_eq!(json["items"].as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn test_list_properties_rejects_bad_numbers() {
    let app = setup();

    let (status, json) = send(&app, get("/properties?page_size=lots")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"]["message"], "'page_size' must be an integer");

    let (status, json) = send(&app, get("/properties?min_price=abc")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"]["message"], "'min_price' must be a number");
}

#[tokio::test]
async fn test_run_scrape() {
    let app = setup();

    let (status, json) = send(
        &app,
        post_json(
            "/scrape/run",
            serde_json::json!({ "query": "staten island", "max_results": 3 }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "succeeded");
    assert_eq!(json["query"], "staten island");
    assert_eq!(json["properties_found"], 3);
    assert_eq!(json["inserted_count"], 3);
    assert_eq!(json["skipped_count"], 0);
    assert_eq!(json["error_count"], 0);

    let (_, json) = send(&app, get("/properties?q=staten")).await;
    assert_eq!(json["total"], 3);
}

#[tokio::test]
async fn test_run_scrape_validation() {
    let app = setup();

    let (status, json) = send(
        &app,
        post_json("/scrape/run", serde_json::json!({ "max_results": 3 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"]["message"], "'query' is required");

    let (status, json) = send(
        &app,
        post_json(
            "/scrape/run",
            serde_json::json!({ "query": "newark", "max_results": 500 }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        json["error"]["message"],
        "'max_results' must be between 1 and 200"
    );
}

#[tokio::test]
async fn test_run_scrape_with_malformed_body() {
    let app = setup();

    let (status, json) = send(
        &app,
        Request::builder()
            .method("POST")
            .uri("/scrape/run")
            .body(Body::from("not json"))
            .unwrap(),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"]["message"], "'query' is required");
}

#[tokio::test]
async fn test_scrape_run_history() {
    let app = setup();

    let (_, created) = send(
        &app,
        post_json(
            "/scrape/run",
            serde_json::json!({ "query": "newark", "max_results": 2 }),
        ),
    )
    .await;
    let run_id = created["run_id"].as_i64().unwrap();

    let (status, json) = send(&app, get("/scrape/runs")).await;
    assert_eq!(status, StatusCode::OK);
    let items = json["items"].as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["id"], run_id);
    assert_eq!(items[0]["status"], "succeeded");
    assert!(items[0].get("error_samples").is_none());

    let (status, json) = send(&app, get(&format!("/scrape/runs/{run_id}"))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["query"], "newark");
    assert_eq!(json["max_results"], 2);
    assert_eq!(json["properties_found"], 2);
    assert!(json["finished_at"].is_string());
    assert!(json["error_samples"].is_null());
}

#[tokio::test]
async fn test_get_unknown_scrape_run() {
    let app = setup();

    let (status, json) = send(&app, get("/scrape/runs/999")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["error"]["message"], "ScrapeRun 999 not found");

    let (status, _) = send(&app, get("/scrape/runs/abc")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_metrics_endpoint() {
    let app = setup();

    send(
        &app,
        post_json(
            "/scrape/run",
            serde_json::json!({ "query": "newark", "max_results": 1 }),
        ),
    )
    .await;

    let response = app.oneshot(get("/metrics")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let text = String::from_utf8(body.to_vec()).unwrap();
    assert!(text.contains("scrape_runs_total"));
}
