use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::http::header;
use axum::response::IntoResponse;
use chrono::Local;

use super::{AppResult, AppState};
use crate::report;
use crate::search::SearchParams;

fn csv_attachment(prefix: &str, body: String) -> impl IntoResponse {
    let disposition = format!(
        "attachment; filename={prefix}_{}.csv",
        Local::now().format("%Y-%m-%d")
    );
    (
        [
            (header::CONTENT_TYPE, "text/csv".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        body,
    )
}

/// GET /api/reports/payments/export?q=&resident_id=&start_date=&end_date=
pub async fn payments(
    State(state): State<AppState>,
    query: Result<Query<SearchParams>, QueryRejection>,
) -> AppResult<impl IntoResponse> {
    let Query(params) = query?;
    let filter = params.payment_filter()?;
    let csv = state.with_db(|conn| report::payments_report(conn, &filter))?;
    Ok(csv_attachment("payments_report", csv))
}

/// GET /api/reports/expenses/export?q=&category=&start_date=&end_date=
pub async fn expenses(
    State(state): State<AppState>,
    query: Result<Query<SearchParams>, QueryRejection>,
) -> AppResult<impl IntoResponse> {
    let Query(params) = query?;
    let filter = params.expense_filter()?;
    let csv = state.with_db(|conn| report::expenses_report(conn, &filter))?;
    Ok(csv_attachment("expenses_report", csv))
}
