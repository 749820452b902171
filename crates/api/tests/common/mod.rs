#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Method, Request, Response, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

use sketchy_api::config::ServerConfig;
use sketchy_api::router::build_app_router;
use sketchy_api::startup;
use sketchy_api::state::AppState;
use sketchy_pipeline::ImageProducer;

pub const ADMIN_SECRET: &str = "test-secret";

/// A router over local mock backends rooted in a temporary directory.
pub struct TestApp {
    pub router: Router,
    pub state: AppState,
    _dir: TempDir,
}

/// Build a test `ServerConfig` for local mock mode.
///
/// `overrides` take precedence over the defaults set here; an empty value
/// unsets a variable.
pub fn test_config(dir: &TempDir, overrides: &[(&str, &str)]) -> ServerConfig {
    let images_dir = dir.path().join("images").to_string_lossy().into_owned();
    let mut vars: Vec<(String, String)> = vec![
        ("HOST".into(), "127.0.0.1".into()),
        ("PORT".into(), "0".into()),
        ("CORS_ORIGINS".into(), "http://localhost:3000".into()),
        ("IMAGES_DIR".into(), images_dir),
        ("ADMIN_SECRET".into(), ADMIN_SECRET.into()),
    ];
    for (k, v) in overrides {
        vars.retain(|(name, _)| name != k);
        vars.push((k.to_string(), v.to_string()));
    }
    ServerConfig::from_lookup(move |k| {
        vars.iter().find(|(name, _)| name == k).map(|(_, v)| v.clone())
    })
    .unwrap()
}

/// Build the full application with default test configuration.
pub async fn build_test_app() -> TestApp {
    build_test_app_with(&[]).await
}

/// Build the full application with configuration overrides.
pub async fn build_test_app_with(overrides: &[(&str, &str)]) -> TestApp {
    let dir = tempfile::tempdir().unwrap();
    let config = test_config(&dir, overrides);
    let state = startup::build_state(config.clone()).await.unwrap();
    TestApp {
        router: build_app_router(state.clone(), &config),
        state,
        _dir: dir,
    }
}

/// Build the full application around a custom image producer.
pub async fn build_test_app_with_producer(producer: Arc<dyn ImageProducer>) -> TestApp {
    let dir = tempfile::tempdir().unwrap();
    let config = test_config(&dir, &[]);
    let (artifacts, metadata) = startup::build_backends(&config).await.unwrap();
    let state = AppState::new(
        config.clone(),
        startup::build_expander(&config),
        producer,
        artifacts,
        metadata,
    );
    TestApp {
        router: build_app_router(state.clone(), &config),
        state,
        _dir: dir,
    }
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

pub async fn get(app: &Router, uri: &str) -> Response<Body> {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    app.clone().oneshot(request).await.unwrap()
}

/// Send a JSON request, optionally carrying the admin secret header.
pub async fn send_json(
    app: &Router,
    method: Method,
    uri: &str,
    body: Value,
    secret: Option<&str>,
) -> Response<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json");
    if let Some(secret) = secret {
        builder = builder.header("x-admin-secret", secret);
    }
    let request = builder.body(Body::from(body.to_string())).unwrap();
    app.clone().oneshot(request).await.unwrap()
}

pub async fn body_bytes(response: Response<Body>) -> Vec<u8> {
    response.into_body().collect().await.unwrap().to_bytes().to_vec()
}

pub async fn body_json(response: Response<Body>) -> Value {
    serde_json::from_slice(&body_bytes(response).await).unwrap()
}

/// Generate one image and return the response body.
pub async fn generate(app: &Router, prompt: &str) -> Value {
    let response = send_json(
        app,
        Method::POST,
        "/generate-image",
        serde_json::json!({ "prompt": prompt }),
        None,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    body_json(response).await
}

/// Fetch the gallery and return the response body.
pub async fn gallery(app: &Router, uri: &str) -> Value {
    let response = get(app, uri).await;
    assert_eq!(response.status(), StatusCode::OK);
    body_json(response).await
}
