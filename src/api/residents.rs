use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use tracing::info;

use super::{deleted, path_id, AppResult, AppState, Updated};
use crate::entities::{self, resident::ENTITY, Resident, ResidentInput};
use crate::search::SearchParams;

/// GET /api/residents
pub async fn list(State(state): State<AppState>) -> AppResult<Json<Vec<Resident>>> {
    let residents = state.with_db(|conn| entities::list_residents(conn))?;
    Ok(Json(residents))
}

/// POST /api/residents
pub async fn create(
    State(state): State<AppState>,
    body: Result<Json<ResidentInput>, JsonRejection>,
) -> AppResult<(StatusCode, Json<Resident>)> {
    let Json(input) = body?;
    let resident = state.with_db(|conn| entities::create_resident(conn, &input))?;
    info!(id = resident.id, unit = %resident.unit, "Resident created");
    Ok((StatusCode::CREATED, Json(resident)))
}

/// GET /api/residents/:id
pub async fn get_one(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
) -> AppResult<Json<Resident>> {
    let id = path_id(path, ENTITY)?;
    let resident = state.with_db(|conn| entities::get_resident(conn, id))?;
    Ok(Json(resident))
}

/// PUT /api/residents/:id
pub async fn update(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
    body: Result<Json<ResidentInput>, JsonRejection>,
) -> AppResult<Json<Updated<ResidentInput>>> {
    let id = path_id(path, ENTITY)?;
    let Json(input) = body?;
    let rows = state.with_db(|conn| entities::update_resident(conn, id, &input))?;
    info!(id, rows, "Resident updated");
    Ok(Json(Updated { id, fields: input }))
}

/// DELETE /api/residents/:id
pub async fn delete(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
) -> AppResult<Json<serde_json::Value>> {
    let id = path_id(path, ENTITY)?;
    let rows = state.with_db(|conn| entities::delete_resident(conn, id))?;
    info!(id, rows, "Resident deleted");
    Ok(deleted())
}

/// GET /api/search/residents?q=
pub async fn search(
    State(state): State<AppState>,
    query: Result<Query<SearchParams>, QueryRejection>,
) -> AppResult<Json<Vec<Resident>>> {
    let Query(params) = query?;
    let filter = params.resident_filter();
    let residents = state.with_db(|conn| entities::search_residents(conn, &filter))?;
    Ok(Json(residents))
}
