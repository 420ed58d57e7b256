use axum::body::{to_bytes, Body};
use axum::http::header::CONTENT_TYPE;
use axum::http::{Method, Request, Response};
use axum::Router;
use rusqlite::Connection;
use serde_json::Value;
use tower::ServiceExt;

use condo_manager::api::{self, AppState};
use condo_manager::{setup_database, Config};

pub const BOUNDARY: &str = "condo-test-boundary";

/// Full application router over a fresh in-memory database.
pub fn build_test_app() -> Router {
    build_test_app_with(&Config::default())
}

/// Same as `build_test_app`, with router settings taken from `config`.
pub fn build_test_app_with(config: &Config) -> Router {
    let conn = Connection::open_in_memory().expect("open in-memory database");
    setup_database(&conn).expect("create schema");
    api::router(AppState::new(conn), config)
}

pub async fn get(app: &Router, uri: &str) -> Response<Body> {
    let request = Request::builder()
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    app.clone().oneshot(request).await.unwrap()
}

pub async fn delete(app: &Router, uri: &str) -> Response<Body> {
    let request = Request::builder()
        .method(Method::DELETE)
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    app.clone().oneshot(request).await.unwrap()
}

/// Send a JSON body with the given method.
pub async fn send_json(app: &Router, method: Method, uri: &str, body: &Value) -> Response<Body> {
    send_raw(app, method, uri, "application/json", body.to_string()).await
}

pub async fn post_json(app: &Router, uri: &str, body: &Value) -> Response<Body> {
    send_json(app, Method::POST, uri, body).await
}

pub async fn send_raw(
    app: &Router,
    method: Method,
    uri: &str,
    content_type: &str,
    body: impl Into<Body>,
) -> Response<Body> {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header(CONTENT_TYPE, content_type)
        .body(body.into())
        .unwrap();
    app.clone().oneshot(request).await.unwrap()
}

/// POST a single-file multipart form to `/api/import`.
pub async fn post_import(app: &Router, field: &str, contents: &[u8]) -> Response<Body> {
    let mut body = Vec::new();
    body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
    body.extend_from_slice(
        format!(
            "Content-Disposition: form-data; name=\"{field}\"; filename=\"export.json\"\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(b"Content-Type: application/json\r\n\r\n");
    body.extend_from_slice(contents);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());

    send_raw(
        app,
        Method::POST,
        "/api/import",
        &format!("multipart/form-data; boundary={BOUNDARY}"),
        body,
    )
    .await
}

pub async fn body_bytes(response: Response<Body>) -> Vec<u8> {
    to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap()
        .to_vec()
}

pub async fn body_json(response: Response<Body>) -> Value {
    serde_json::from_slice(&body_bytes(response).await).unwrap()
}

pub async fn body_text(response: Response<Body>) -> String {
    String::from_utf8(body_bytes(response).await).unwrap()
}
