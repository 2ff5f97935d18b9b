//! Shared helpers for HTTP-level integration tests.
//!
//! Uses Axum's `tower::ServiceExt` to send requests directly to the router
//! without an actual TCP listener. The upload root lives in a per-test
//! temporary directory.

#![allow(dead_code)]

use std::path::Path;
use std::sync::Arc;

use axum::body::Body;
use axum::http::{Method, Request, Response, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use sqlx::PgPool;
use tempfile::TempDir;
use tower::ServiceExt;

use atelier_api::config::ServerConfig;
use atelier_api::print::build_templates;
use atelier_api::router::build_app_router;
use atelier_api::state::AppState;
use atelier_core::storage::Storage;

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config(upload_root: &Path) -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        upload_root: upload_root.to_path_buf(),
        public_base_url: "http://localhost:3000".to_string(),
    }
}

/// Build the full application router with all middleware layers, using the
/// given database pool and upload root.
///
/// This mirrors the router construction in `main.rs` so integration tests
/// exercise the same middleware stack that production uses.
pub fn build_test_app(pool: PgPool, upload_root: &Path) -> Router {
    let config = test_config(upload_root);
    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
        storage: Arc::new(Storage::new(upload_root)),
        templates: Arc::new(build_templates().expect("print templates must compile")),
    };
    build_app_router(state, &config)
}

/// Router plus a fresh temporary upload root. Keep the `TempDir` alive for
/// the duration of the test; rebuild routers off the same path for
/// follow-up requests.
pub fn test_app(pool: PgPool) -> (Router, TempDir) {
    let upload_root = tempfile::tempdir().expect("tempdir");
    let router = build_test_app(pool, upload_root.path());
    (router, upload_root)
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    app.oneshot(
        Request::builder()
            .method(Method::GET)
            .uri(uri)
            .body(Body::empty())
            .unwrap(),
    )
    .await
    .unwrap()
}

pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response<Body> {
    app.oneshot(
        Request::builder()
            .method(Method::POST)
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
    )
    .await
    .unwrap()
}

pub async fn delete(app: Router, uri: &str) -> Response<Body> {
    app.oneshot(
        Request::builder()
            .method(Method::DELETE)
            .uri(uri)
            .body(Body::empty())
            .unwrap(),
    )
    .await
    .unwrap()
}

/// Parse a response body as JSON.
pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap_or_else(|e| {
        panic!(
            "response body is not JSON ({e}): {}",
            String::from_utf8_lossy(&bytes)
        )
    })
}

/// Raw response body bytes.
pub async fn body_bytes(response: Response<Body>) -> Vec<u8> {
    response
        .into_body()
        .collect()
        .await
        .unwrap()
        .to_bytes()
        .to_vec()
}

// ---------------------------------------------------------------------------
// Multipart helpers
// ---------------------------------------------------------------------------

const BOUNDARY: &str = "atelier-test-boundary";

/// Hand-assembled `multipart/form-data` body for the admin write endpoints.
#[derive(Default)]
pub struct MultipartBuilder {
    body: Vec<u8>,
}

impl MultipartBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(mut self, name: &str, value: &str) -> Self {
        self.body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
            )
            .as_bytes(),
        );
        self
    }

    pub fn file(mut self, name: &str, filename: &str, content_type: &str, bytes: &[u8]) -> Self {
        self.body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"; \
                 filename=\"{filename}\"\r\nContent-Type: {content_type}\r\n\r\n"
            )
            .as_bytes(),
        );
        self.body.extend_from_slice(bytes);
        self.body.extend_from_slice(b"\r\n");
        self
    }

    pub fn finish(mut self) -> (String, Vec<u8>) {
        self.body
            .extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
        (
            format!("multipart/form-data; boundary={BOUNDARY}"),
            self.body,
        )
    }
}

/// Send a multipart request with the given method.
pub async fn send_multipart(
    app: Router,
    method: Method,
    uri: &str,
    builder: MultipartBuilder,
) -> Response<Body> {
    let (content_type, body) = builder.finish();
    app.oneshot(
        Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", content_type)
            .body(Body::from(body))
            .unwrap(),
    )
    .await
    .unwrap()
}

// ---------------------------------------------------------------------------
// Fixture data
// ---------------------------------------------------------------------------

/// Encode a solid-color PNG of the given size.
pub fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    use image::{DynamicImage, ImageFormat, Rgb, RgbImage};

    let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(width, height, Rgb([120, 90, 60])));
    let mut cursor = std::io::Cursor::new(Vec::new());
    img.write_to(&mut cursor, ImageFormat::Png).unwrap();
    cursor.into_inner()
}

/// Assert a 422 validation failure that mentions `field` in its error map.
pub async fn assert_validation_error(response: Response<Body>, field: &str) {
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let json = body_json(response).await;
    assert_eq!(json["code"], "VALIDATION_ERROR");
    assert!(
        json["errors"].get(field).is_some(),
        "expected an error for field '{field}', got: {json}"
    );
}
