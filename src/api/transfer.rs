use axum::extract::multipart::MultipartRejection;
use axum::extract::{Multipart, State};
use axum::http::header;
use axum::response::IntoResponse;
use axum::Json;
use chrono::Local;
use serde::Serialize;
use tracing::{info, warn};

use super::{AppError, AppResult, AppState};
use crate::transfer::{self, ImportSummary};

/// Multipart field carrying the export document.
pub const IMPORT_FIELD: &str = "importFile";

#[derive(Debug, Serialize)]
pub struct ImportResponse {
    pub message: &'static str,
    pub imported_residents: usize,
    pub imported_payments: usize,
    pub imported_expenses: usize,
}

impl From<ImportSummary> for ImportResponse {
    fn from(summary: ImportSummary) -> Self {
        ImportResponse {
            message: "Database import successful",
            imported_residents: summary.residents,
            imported_payments: summary.payments,
            imported_expenses: summary.expenses,
        }
    }
}

/// GET /api/export - full snapshot as a JSON attachment
pub async fn export(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let document = state.with_db(|conn| transfer::export_database(conn))?;
    let disposition = format!(
        "attachment; filename=condo_export_{}.json",
        Local::now().format("%Y-%m-%d")
    );
    Ok(([(header::CONTENT_DISPOSITION, disposition)], Json(document)))
}

/// POST /api/import - replace everything with an uploaded export document
pub async fn import(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> AppResult<Json<ImportResponse>> {
    let mut multipart = multipart.map_err(|e| {
        warn!(error = %e, "Import request is not multipart");
        AppError::bad_request("Unable to parse form")
    })?;

    let mut upload = None;
    while let Some(field) = multipart.next_field().await.map_err(|e| {
        warn!(error = %e, "Malformed multipart body");
        AppError::bad_request("Unable to parse form")
    })? {
        if field.name() != Some(IMPORT_FIELD) {
            continue;
        }
        let bytes = field.bytes().await.map_err(|e| {
            warn!(error = %e, "Failed to read import file");
            AppError::bad_request("Error reading import file")
        })?;
        upload = Some(bytes);
        break;
    }

    let bytes = upload.ok_or_else(|| AppError::bad_request("Error retrieving import file"))?;
    let document = transfer::parse_document(&bytes)?;
    info!(bytes = bytes.len(), "Importing database");

    let summary = state.with_db(|conn| transfer::import_database(conn, &document))?;
    Ok(Json(summary.into()))
}
