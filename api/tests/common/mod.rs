#![allow(dead_code)]

use std::{path::Path, sync::Arc, time::Duration};

use axum::Router;
use axum::body::Body;
use axum::http::{Method, Request, Response, header};
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

use poster_board_api::{
    AppState,
    auth::{ADMIN_SUBJECT, create_token},
    build_router,
    config::{AdminSecret, Config, StorageBackend},
    storage::{MemoryKv, MemoryObjectStore},
};

pub const ADMIN_PASSWORD: &str = "correct horse battery";
pub const JWT_SECRET: &str = "integration-test-secret";
pub const BASE_URL: &str = "https://posters.example.com";
pub const BOUNDARY: &str = "----poster-board-test-boundary";

/// In-memory storage, small pages and no startup rebuild.
pub fn test_config() -> Config {
    Config {
        host: "127.0.0.1".to_string(),
        port: 0,
        jwt_secret: JWT_SECRET.to_string(),
        admin_secret: AdminSecret::Hash(bcrypt::hash(ADMIN_PASSWORD, 4).unwrap()),
        public_base_url: BASE_URL.to_string(),
        storage_backend: StorageBackend::Memory,
        data_dir: "./unused".into(),
        max_upload_bytes: 5 * 1024 * 1024,
        posters_per_page: 5,
        list_cache_ttl: Duration::from_secs(60),
        rebuild_on_startup: false,
        login_attempts_per_minute: 10,
        request_timeout: Duration::from_secs(30),
        max_concurrent_requests: 64,
        cors_origins: vec![],
    }
}

pub fn fs_config(data_dir: &Path) -> Config {
    Config {
        storage_backend: StorageBackend::Filesystem,
        data_dir: data_dir.to_path_buf(),
        rebuild_on_startup: true,
        ..test_config()
    }
}

pub struct TestApp {
    pub router: Router,
    pub state: AppState,
}

pub fn test_app() -> TestApp {
    test_app_with(test_config())
}

pub fn test_app_with(config: Config) -> TestApp {
    let state = AppState::new(
        config,
        Arc::new(MemoryKv::new()),
        Arc::new(MemoryObjectStore::new()),
    )
    .unwrap();
    TestApp {
        router: build_router(state.clone()),
        state,
    }
}

pub fn admin_token() -> String {
    create_token(ADMIN_SUBJECT, JWT_SECRET).unwrap()
}

pub fn json_request(method: Method, uri: &str, body: Option<Value>, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

pub async fn send(app: &Router, request: Request<Body>) -> Response<Body> {
    app.clone().oneshot(request).await.unwrap()
}

pub async fn get(app: &Router, uri: &str) -> Response<Body> {
    send(app, json_request(Method::GET, uri, None, None)).await
}

pub async fn body_bytes(response: Response<Body>) -> Vec<u8> {
    response
        .into_body()
        .collect()
        .await
        .unwrap()
        .to_bytes()
        .to_vec()
}

pub async fn body_json(response: Response<Body>) -> Value {
    serde_json::from_slice(&body_bytes(response).await).unwrap()
}

/// Creates a poster through the API and returns its JSON.
pub async fn create_poster(app: &Router, title: &str, category: &str) -> Value {
    let request = json_request(
        Method::POST,
        "/api/poster-metadata",
        Some(serde_json::json!({
            "title": title,
            "description": format!("{title} description"),
            "category": category,
            "targetAudience": ["students"],
            "imageKey": format!("posters/{}.png", title.replace(' ', "-")),
        })),
        Some(&admin_token()),
    );
    let response = send(app, request).await;
    assert_eq!(response.status(), 201, "creating {title}");
    body_json(response).await["poster"].clone()
}

pub fn multipart_body(field: &str, file_name: Option<&str>, content_type: &str, data: &[u8]) -> Vec<u8> {
    let disposition = match file_name {
        Some(name) => format!("form-data; name=\"{field}\"; filename=\"{name}\""),
        None => format!("form-data; name=\"{field}\""),
    };
    let mut body = Vec::new();
    body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
    body.extend_from_slice(format!("Content-Disposition: {disposition}\r\n").as_bytes());
    body.extend_from_slice(format!("Content-Type: {content_type}\r\n\r\n").as_bytes());
    body.extend_from_slice(data);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());
    body
}

pub fn upload_request(body: Vec<u8>, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method(Method::POST)
        .uri("/api/upload-poster")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        );
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::from(body)).unwrap()
}
