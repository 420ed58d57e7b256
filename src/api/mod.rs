// HTTP surface - axum router over the storage, search, transfer and report layers

pub mod error;
pub mod expenses;
pub mod payments;
pub mod reports;
pub mod residents;
pub mod transfer;

use std::sync::{Arc, Mutex};

use axum::extract::rejection::PathRejection;
use axum::extract::{DefaultBodyLimit, Path, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse};
use axum::routing::{get, post};
use axum::{Json, Router};
use rusqlite::Connection;
use serde::Serialize;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

use crate::config::Config;
use crate::error::Result;
use crate::VERSION;

pub use error::{AppError, AppResult};

/// Shared application state: one explicit database handle.
#[derive(Clone)]
pub struct AppState {
    db: Arc<Mutex<Connection>>,
}

impl AppState {
    pub fn new(conn: Connection) -> Self {
        AppState {
            db: Arc::new(Mutex::new(conn)),
        }
    }

    /// Run synchronous storage work while holding the connection lock.
    /// The guard is released before the caller awaits anything.
    pub fn with_db<T, F>(&self, work: F) -> AppResult<T>
    where
        F: FnOnce(&mut Connection) -> Result<T>,
    {
        let mut conn = self
            .db
            .lock()
            .map_err(|_| AppError::Internal("database lock poisoned".to_string()))?;
        work(&mut conn).map_err(AppError::from)
    }
}

/// Response body for PUT: the submitted fields plus the path id.
#[derive(Debug, Serialize)]
pub struct Updated<T> {
    pub id: i64,
    #[serde(flatten)]
    pub fields: T,
}

/// Numeric `:id` segment, rejected with the entity's own message.
pub(crate) fn path_id(
    path: std::result::Result<Path<i64>, PathRejection>,
    entity: &str,
) -> AppResult<i64> {
    match path {
        Ok(Path(id)) => Ok(id),
        Err(_) => Err(AppError::bad_request(format!(
            "Invalid {} ID",
            entity.to_lowercase()
        ))),
    }
}

pub(crate) fn deleted() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "result": "success" }))
}

pub fn router(state: AppState, config: &Config) -> Router {
    let api_routes = Router::new()
        .route("/health", get(health_check))
        // Residents
        .route("/residents", get(residents::list).post(residents::create))
        .route(
            "/residents/:id",
            get(residents::get_one)
                .put(residents::update)
                .delete(residents::delete),
        )
        // Payments
        .route("/payments", get(payments::list).post(payments::create))
        .route(
            "/payments/:id",
            get(payments::get_one)
                .put(payments::update)
                .delete(payments::delete),
        )
        // Expenses
        .route("/expenses", get(expenses::list).post(expenses::create))
        .route(
            "/expenses/:id",
            get(expenses::get_one)
                .put(expenses::update)
                .delete(expenses::delete),
        )
        // Bulk transfer
        .route("/export", get(transfer::export))
        .route(
            "/import",
            post(transfer::import).layer(DefaultBodyLimit::max(config.import_max_bytes)),
        )
        // Search
        .route("/search/residents", get(residents::search))
        .route("/search/payments", get(payments::search))
        .route("/search/expenses", get(expenses::search))
        // Reports
        .route("/reports/payments/export", get(reports::payments))
        .route("/reports/expenses/export", get(reports::expenses))
        .fallback(api_not_found);

    Router::new()
        .route("/", get(serve_index))
        .nest("/api", api_routes)
        .nest_service("/static", ServeDir::new(&config.static_dir))
        .fallback(serve_index)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// GET /api/health
async fn health_check(State(state): State<AppState>) -> AppResult<Json<serde_json::Value>> {
    state.with_db(|conn| {
        conn.query_row("SELECT 1", [], |row| row.get::<_, i64>(0))?;
        Ok(())
    })?;
    Ok(Json(serde_json::json!({ "status": "ok", "version": VERSION })))
}

async fn api_not_found() -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(serde_json::json!({ "error": "Not found" })),
    )
}

/// GET / and any unknown non-API path
async fn serve_index() -> impl IntoResponse {
    Html(include_str!("../../web/index.html"))
}
