//! Shared test helpers for integration tests.

#![allow(dead_code)]

use std::io::Cursor;
use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use bytes::Bytes;
use http::{HeaderMap, Request, StatusCode};
use serde_json::Value;
use tower::ServiceExt;
use uuid::Uuid;

use assetdeck_core::config::AppConfig;
use assetdeck_database::{AssetStore, MemoryAssetStore};
use assetdeck_storage::StorageManager;
use assetdeck_storage::providers::MemoryStorageProvider;

const BOUNDARY: &str = "assetdeck-test-boundary";

/// Test application context
pub struct TestApp {
    /// The Axum router for making test requests
    pub router: Router,
    /// Owner sent with every request unless overridden
    pub owner: Uuid,
    /// Physical objects written by the app
    pub objects: MemoryStorageProvider,
    /// Application config
    pub config: AppConfig,
}

impl TestApp {
    /// Create a new test application on in-memory backends
    pub fn new() -> Self {
        Self::with_config(AppConfig::in_memory())
    }

    /// Create a test application with a custom configuration
    pub fn with_config(config: AppConfig) -> Self {
        let store: Arc<dyn AssetStore> = Arc::new(MemoryAssetStore::new());
        let objects = MemoryStorageProvider::new();
        let storage = StorageManager::new(Arc::new(objects.clone()));
        let router = assetdeck_api::build_app(config.clone(), store, storage);

        Self {
            router,
            owner: Uuid::new_v4(),
            objects,
            config,
        }
    }

    /// Make a JSON request as the default owner
    pub async fn request(&self, method: &str, path: &str, body: Option<Value>) -> TestResponse {
        self.request_as(Some(self.owner), method, path, body).await
    }

    /// Make a JSON request as `owner` (or without the owner header)
    pub async fn request_as(
        &self,
        owner: Option<Uuid>,
        method: &str,
        path: &str,
        body: Option<Value>,
    ) -> TestResponse {
        let body_str = body
            .map(|b| serde_json::to_string(&b).expect("Failed to serialize body"))
            .unwrap_or_default();

        let mut req = Request::builder()
            .method(method)
            .uri(path)
            .header("Content-Type", "application/json");

        if let Some(owner) = owner {
            req = req.header("X-Owner-Id", owner.to_string());
        }

        let req = req
            .body(Body::from(body_str))
            .expect("Failed to build request");

        self.send(req).await
    }

    /// POST a multipart upload. `fields` are plain form fields, `files`
    /// are `(file name, content)` pairs sent as `files` parts.
    pub async fn upload(&self, fields: &[(&str, &str)], files: &[(&str, Vec<u8>)]) -> TestResponse {
        let mut body = Vec::new();
        for (name, value) in fields {
            body.extend_from_slice(
                format!(
                    "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
                )
                .as_bytes(),
            );
        }
        for (file_name, data) in files {
            body.extend_from_slice(
                format!(
                    "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"files\"; filename=\"{file_name}\"\r\nContent-Type: application/octet-stream\r\n\r\n"
                )
                .as_bytes(),
            );
            body.extend_from_slice(data);
            body.extend_from_slice(b"\r\n");
        }
        body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

        let req = Request::builder()
            .method("POST")
            .uri("/api/resources/upload")
            .header(
                "Content-Type",
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .header("X-Owner-Id", self.owner.to_string())
            .body(Body::from(body))
            .expect("Failed to build request");

        self.send(req).await
    }

    /// GET a binary response as the default owner
    pub async fn download(&self, path: &str) -> (StatusCode, HeaderMap, Bytes) {
        let req = Request::builder()
            .method("GET")
            .uri(path)
            .header("X-Owner-Id", self.owner.to_string())
            .body(Body::empty())
            .expect("Failed to build request");

        let response = self
            .router
            .clone()
            .oneshot(req)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let headers = response.headers().clone();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("Failed to read body");
        (status, headers, bytes)
    }

    /// Create a folder and return its JSON representation
    pub async fn create_folder(&self, category: &str, parent: Option<&str>, name: &str) -> Value {
        let response = self
            .request(
                "POST",
                "/api/folders",
                Some(serde_json::json!({
                    "category": category,
                    "parent_id": parent,
                    "name": name,
                })),
            )
            .await;
        assert_eq!(
            response.status,
            StatusCode::CREATED,
            "Create failed: {:?}",
            response.body
        );
        response.body["data"].clone()
    }

    async fn send(&self, req: Request<Body>) -> TestResponse {
        let response = self
            .router
            .clone()
            .oneshot(req)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let body_bytes = axum::body::to_bytes(response.into_body(), 16 * 1024 * 1024)
            .await
            .expect("Failed to read body");

        let body: Value = serde_json::from_slice(&body_bytes).unwrap_or(Value::Null);

        TestResponse { status, body }
    }
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    /// HTTP status code
    pub status: StatusCode,
    /// Parsed JSON body
    pub body: Value,
}

impl TestResponse {
    /// The `data` member of the envelope
    pub fn data(&self) -> &Value {
        &self.body["data"]
    }

    /// The `errors` member of the envelope as strings
    pub fn errors(&self) -> Vec<String> {
        self.body["errors"]
            .as_array()
            .map(|a| {
                a.iter()
                    .filter_map(|v| v.as_str().map(String::from))
                    .collect()
            })
            .unwrap_or_default()
    }
}

/// Field of a JSON object as a string
pub fn str_of<'a>(value: &'a Value, key: &str) -> &'a str {
    value[key].as_str().unwrap_or_default()
}

/// Encode a blank PNG of the given size
pub fn png(width: u32, height: u32) -> Vec<u8> {
    let img = image::RgbaImage::new(width, height);
    let mut out = Cursor::new(Vec::new());
    img.write_to(&mut out, image::ImageFormat::Png)
        .expect("encode png");
    out.into_inner()
}
