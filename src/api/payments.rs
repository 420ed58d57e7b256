use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use tracing::info;

use super::{deleted, path_id, AppResult, AppState, Updated};
use crate::entities::{self, payment::ENTITY, Payment, PaymentInput};
use crate::search::SearchParams;

/// GET /api/payments
pub async fn list(State(state): State<AppState>) -> AppResult<Json<Vec<Payment>>> {
    let payments = state.with_db(|conn| entities::list_payments(conn))?;
    Ok(Json(payments))
}

/// POST /api/payments
pub async fn create(
    State(state): State<AppState>,
    body: Result<Json<PaymentInput>, JsonRejection>,
) -> AppResult<(StatusCode, Json<Payment>)> {
    let Json(input) = body?;
    let payment = state.with_db(|conn| entities::create_payment(conn, &input))?;
    info!(
        id = payment.id,
        resident_id = payment.resident_id,
        amount = payment.amount,
        "Payment recorded"
    );
    Ok((StatusCode::CREATED, Json(payment)))
}

/// GET /api/payments/:id
pub async fn get_one(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
) -> AppResult<Json<Payment>> {
    let id = path_id(path, ENTITY)?;
    let payment = state.with_db(|conn| entities::get_payment(conn, id))?;
    Ok(Json(payment))
}

/// PUT /api/payments/:id
pub async fn update(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
    body: Result<Json<PaymentInput>, JsonRejection>,
) -> AppResult<Json<Updated<PaymentInput>>> {
    let id = path_id(path, ENTITY)?;
    let Json(input) = body?;
    let rows = state.with_db(|conn| entities::update_payment(conn, id, &input))?;
    info!(id, rows, "Payment updated");
    Ok(Json(Updated { id, fields: input }))
}

/// DELETE /api/payments/:id
pub async fn delete(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
) -> AppResult<Json<serde_json::Value>> {
    let id = path_id(path, ENTITY)?;
    let rows = state.with_db(|conn| entities::delete_payment(conn, id))?;
    info!(id, rows, "Payment deleted");
    Ok(deleted())
}

/// GET /api/search/payments?q=&resident_id=&start_date=&end_date=
pub async fn search(
    State(state): State<AppState>,
    query: Result<Query<SearchParams>, QueryRejection>,
) -> AppResult<Json<Vec<Payment>>> {
    let Query(params) = query?;
    let filter = params.payment_filter()?;
    let payments = state.with_db(|conn| entities::search_payments(conn, &filter))?;
    Ok(Json(payments))
}
