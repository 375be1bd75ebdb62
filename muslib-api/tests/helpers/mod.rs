//! Shared helpers for muslib-api integration tests

#![allow(dead_code)]

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::routing::get;
use axum::Router;
use muslib_api::services::EnrichmentClient;
use muslib_api::{build_router, AppState};
use serde_json::Value;
use std::sync::Arc;

/// Canned lookup response for "Muse - Supermassive Black Hole"
pub const SMBH_DETAIL: &str = r#"{
    "release_date": "16.07.2006",
    "text": "Ooh baby, don't you know I suffer?\nOoh baby, can you hear me moan?",
    "link": "https://www.youtube.com/watch?v=Xsp3_a-PMTw"
}"#;

/// Start a stub enrichment service answering every lookup with `status` and `body`
///
/// Returns the lookup URL.
pub async fn spawn_enrichment_stub(status: StatusCode, body: &'static str) -> String {
    let app = Router::new().route("/info", get(move || async move { (status, body) }));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    format!("http://{}/info", addr)
}

/// A lookup URL with nothing listening behind it
pub async fn unreachable_enrichment_url() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{}/info", addr)
}

/// Router over a fresh in-memory database and the given lookup URL
pub async fn setup_app(enrichment_url: String) -> Router {
    let db = muslib_common::db::init_database("sqlite::memory:")
        .await
        .expect("Should create in-memory database");
    let client = EnrichmentClient::new(enrichment_url, None).expect("Should build client");

    build_router(AppState::new(db, Arc::new(client)))
}

/// Router whose lookups always succeed with [`SMBH_DETAIL`]
pub async fn setup_default_app() -> Router {
    setup_app(spawn_enrichment_stub(StatusCode::OK, SMBH_DETAIL).await).await
}

pub fn empty_request(method: &str, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

pub fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub fn raw_json_request(method: &str, uri: &str, body: &'static str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body))
        .unwrap()
}

/// Extract JSON body from response
pub async fn extract_json(body: Body) -> Value {
    let bytes = axum::body::to_bytes(body, usize::MAX)
        .await
        .expect("Should read body");
    serde_json::from_slice(&bytes).expect("Should parse JSON")
}
