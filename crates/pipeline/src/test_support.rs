//! Shared fixtures for the pipeline unit tests.

use std::collections::HashMap;
use std::io::Cursor;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::extract::Query;
use axum::http::{HeaderMap, StatusCode};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};
use sketchy_core::generation::{ArtifactDescriptor, GenerationRecord};
use sketchy_openai::OpenAiApi;
use sketchy_storage::{
    ArtifactStore, InMemoryMetadataIndex, LocalArtifactStore, MetadataIndex, StorageError,
    StorageResult,
};
use tokio::sync::Notify;

pub const KEY: &str = "sk-test";

/// Encode a small gradient PNG.
pub fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    let img = image::RgbImage::from_fn(width, height, |x, y| {
        image::Rgb([(x % 256) as u8, (y % 256) as u8, 128])
    });
    let mut out = Cursor::new(Vec::new());
    img.write_to(&mut out, image::ImageFormat::Png).unwrap();
    out.into_inner()
}

// ---------------------------------------------------------------------------
// Fake generation API
// ---------------------------------------------------------------------------

pub struct FakeOpenAi {
    addr: SocketAddr,
    placeholder_texts: Arc<Mutex<Vec<String>>>,
}

impl FakeOpenAi {
    pub fn api(&self) -> OpenAiApi {
        self.api_with_key(KEY)
    }

    pub fn api_with_key(&self, key: &str) -> OpenAiApi {
        OpenAiApi::new(key.to_string(), format!("http://{}/v1", self.addr))
    }

    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn placeholder_texts(&self) -> Vec<String> {
        self.placeholder_texts.lock().unwrap().clone()
    }
}

fn authorized(headers: &HeaderMap) -> bool {
    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v == format!("Bearer {KEY}"))
}

/// Chat replies with `Scene: <instruction>`. Image generation points at a
/// served PNG, except for the prompt `expired`, which points at a 404.
pub async fn spawn_fake_openai() -> FakeOpenAi {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let placeholder_texts: Arc<Mutex<Vec<String>>> = Arc::default();
    let texts = placeholder_texts.clone();

    let app = Router::new()
        .route(
            "/v1/chat/completions",
            post(|headers: HeaderMap, Json(body): Json<Value>| async move {
                if !authorized(&headers) {
                    return (StatusCode::UNAUTHORIZED, Json(json!({"error": "bad key"})));
                }
                let asked = body["messages"][0]["content"].as_str().unwrap_or_default();
                (
                    StatusCode::OK,
                    Json(json!({"choices": [{"message": {"content": format!("Scene: {asked}")}}]})),
                )
            }),
        )
        .route(
            "/v1/images/generations",
            post(move |headers: HeaderMap, Json(body): Json<Value>| async move {
                if !authorized(&headers) {
                    return (StatusCode::UNAUTHORIZED, Json(json!({"error": "bad key"})));
                }
                let path = if body["prompt"] == "expired" { "missing" } else { "out.png" };
                (
                    StatusCode::OK,
                    Json(json!({"data": [{"url": format!("http://{addr}/files/{path}")}]})),
                )
            }),
        )
        .route("/files/out.png", get(|| async { png_bytes(64, 48) }))
        .route(
            "/600x400/png",
            get(move |Query(params): Query<HashMap<String, String>>| async move {
                if let Some(text) = params.get("text") {
                    texts.lock().unwrap().push(text.clone());
                }
                png_bytes(60, 40)
            }),
        );

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    FakeOpenAi {
        addr,
        placeholder_texts,
    }
}

// ---------------------------------------------------------------------------
// Storage fixtures
// ---------------------------------------------------------------------------

pub struct LocalFixture {
    _dir: tempfile::TempDir,
    pub artifacts: Arc<LocalArtifactStore>,
    pub metadata: Arc<InMemoryMetadataIndex>,
}

pub async fn local_fixture() -> LocalFixture {
    let dir = tempfile::tempdir().unwrap();
    let artifacts = LocalArtifactStore::open(dir.path().join("images"), "/api/images")
        .await
        .unwrap();
    LocalFixture {
        _dir: dir,
        artifacts: Arc::new(artifacts),
        metadata: Arc::new(InMemoryMetadataIndex::new()),
    }
}

/// Wraps a real store and fails every save whose name contains `fail_on`.
pub struct FlakyArtifactStore {
    pub inner: Arc<LocalArtifactStore>,
    pub fail_on: &'static str,
}

#[async_trait]
impl ArtifactStore for FlakyArtifactStore {
    fn backend_name(&self) -> &'static str {
        "flaky"
    }

    async fn save(&self, name: &str, bytes: Vec<u8>) -> StorageResult<ArtifactDescriptor> {
        if name.contains(self.fail_on) {
            return Err(StorageError::ObjectStore(format!("injected failure for {name}")));
        }
        self.inner.save(name, bytes).await
    }

    async fn list(&self) -> StorageResult<Vec<ArtifactDescriptor>> {
        self.inner.list().await
    }

    async fn delete(&self, identifier: &str) -> StorageResult<()> {
        self.inner.delete(identifier).await
    }

    async fn clear(&self) -> StorageResult<usize> {
        self.inner.clear().await
    }
}

/// Metadata index whose writes always fail.
pub struct UnwritableMetadataIndex;

#[async_trait]
impl MetadataIndex for UnwritableMetadataIndex {
    fn backend_name(&self) -> &'static str {
        "unwritable"
    }

    async fn put(&self, _record: &GenerationRecord) -> StorageResult<()> {
        Err(StorageError::Kv {
            status: 503,
            body: "unavailable".into(),
        })
    }

    async fn get(&self, _image_url: &str) -> StorageResult<Option<GenerationRecord>> {
        Ok(None)
    }

    async fn delete(&self, _image_url: &str) -> StorageResult<bool> {
        Ok(false)
    }

    async fn clear(&self) -> StorageResult<usize> {
        Ok(0)
    }
}

/// Metadata index whose `put` signals `entered`, waits for `release`, then
/// fails. Lets a test act while a generation is between its writes.
#[derive(Default)]
pub struct GatedMetadataIndex {
    pub entered: Notify,
    pub release: Notify,
}

#[async_trait]
impl MetadataIndex for GatedMetadataIndex {
    fn backend_name(&self) -> &'static str {
        "gated"
    }

    async fn put(&self, _record: &GenerationRecord) -> StorageResult<()> {
        self.entered.notify_one();
        self.release.notified().await;
        Err(StorageError::Kv {
            status: 503,
            body: "unavailable".into(),
        })
    }

    async fn get(&self, _image_url: &str) -> StorageResult<Option<GenerationRecord>> {
        Ok(None)
    }

    async fn delete(&self, _image_url: &str) -> StorageResult<bool> {
        Ok(false)
    }

    async fn clear(&self) -> StorageResult<usize> {
        Ok(0)
    }
}
