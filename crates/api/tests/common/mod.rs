#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Method, Request, Response};
use axum::Router;
use catalog_core::catalog::Catalog;
use catalog_core::placement::PlacementPolicy;
use catalog_core::settings::CatalogSettings;
use catalog_core::store::MemoryStore;
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

use catalog_api::config::ServerConfig;
use catalog_api::router::build_app_router;
use catalog_api::state::AppState;

/// Build a test `ServerConfig` with safe defaults.
///
/// Uses `http://localhost:5173` as CORS origin (matching the dev default),
/// a 30-second request timeout and no database.
pub fn test_config(catalog: CatalogSettings) -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        database_url: None,
        catalog,
    }
}

/// Full application router over a freshly seeded in-memory store, with the
/// default (contiguous) placement policy.
pub fn build_test_app() -> Router {
    build_test_app_with(PlacementPolicy::default())
}

pub fn build_test_app_with(placement: PlacementPolicy) -> Router {
    let config = test_config(CatalogSettings::new(placement, 5));
    let catalog = Catalog::new(Arc::new(MemoryStore::seeded()), config.catalog);
    let state = AppState {
        catalog,
        config: Arc::new(config.clone()),
    };
    build_app_router(state, &config)
}

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    send(app, Method::GET, uri, None).await
}

pub async fn send_json(app: Router, method: Method, uri: &str, body: Value) -> Response<Body> {
    send(app, method, uri, Some(body)).await
}

pub async fn delete(app: Router, uri: &str) -> Response<Body> {
    send(app, Method::DELETE, uri, None).await
}

async fn send(app: Router, method: Method, uri: &str, body: Option<Value>) -> Response<Body> {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    app.oneshot(request).await.unwrap()
}

pub async fn body_json(response: Response<Body>) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

/// Create a character and return its id.
pub async fn create_character(app: &Router, name: &str, specie: &str) -> i64 {
    let response = send_json(
        app.clone(),
        Method::POST,
        "/api/v1/characters",
        serde_json::json!({ "name": name, "specie": specie }),
    )
    .await;
    assert_eq!(response.status(), 201, "character fixture should be created");
    body_json(response).await["data"]["id"].as_i64().unwrap()
}

/// Create an episode and return its id.
pub async fn create_episode(app: &Router, name: &str, season: Option<&str>) -> i64 {
    let response = send_json(
        app.clone(),
        Method::POST,
        "/api/v1/episodes",
        serde_json::json!({ "name": name, "season": season }),
    )
    .await;
    assert_eq!(response.status(), 201, "episode fixture should be created");
    body_json(response).await["data"]["id"].as_i64().unwrap()
}

pub async fn place(
    app: &Router,
    episode_id: i64,
    character_id: i64,
    start: &str,
    end: &str,
) -> Response<Body> {
    send_json(
        app.clone(),
        Method::POST,
        "/api/v1/performances",
        serde_json::json!({
            "episode_id": episode_id,
            "character_id": character_id,
            "interval": { "start": start, "end": end },
        }),
    )
    .await
}
