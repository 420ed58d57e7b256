use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use tracing::info;

use super::{deleted, path_id, AppResult, AppState, Updated};
use crate::entities::{self, expense::ENTITY, Expense, ExpenseInput};
use crate::search::SearchParams;

/// GET /api/expenses
pub async fn list(State(state): State<AppState>) -> AppResult<Json<Vec<Expense>>> {
    let expenses = state.with_db(|conn| entities::list_expenses(conn))?;
    Ok(Json(expenses))
}

/// POST /api/expenses
pub async fn create(
    State(state): State<AppState>,
    body: Result<Json<ExpenseInput>, JsonRejection>,
) -> AppResult<(StatusCode, Json<Expense>)> {
    let Json(input) = body?;
    let expense = state.with_db(|conn| entities::create_expense(conn, &input))?;
    info!(id = expense.id, amount = expense.amount, "Expense recorded");
    Ok((StatusCode::CREATED, Json(expense)))
}

/// GET /api/expenses/:id
pub async fn get_one(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
) -> AppResult<Json<Expense>> {
    let id = path_id(path, ENTITY)?;
    let expense = state.with_db(|conn| entities::get_expense(conn, id))?;
    Ok(Json(expense))
}

/// PUT /api/expenses/:id
pub async fn update(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
    body: Result<Json<ExpenseInput>, JsonRejection>,
) -> AppResult<Json<Updated<ExpenseInput>>> {
    let id = path_id(path, ENTITY)?;
    let Json(input) = body?;
    let rows = state.with_db(|conn| entities::update_expense(conn, id, &input))?;
    info!(id, rows, "Expense updated");
    Ok(Json(Updated { id, fields: input }))
}

/// DELETE /api/expenses/:id
pub async fn delete(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
) -> AppResult<Json<serde_json::Value>> {
    let id = path_id(path, ENTITY)?;
    let rows = state.with_db(|conn| entities::delete_expense(conn, id))?;
    info!(id, rows, "Expense deleted");
    Ok(deleted())
}

/// GET /api/search/expenses?q=&category=&start_date=&end_date=
pub async fn search(
    State(state): State<AppState>,
    query: Result<Query<SearchParams>, QueryRejection>,
) -> AppResult<Json<Vec<Expense>>> {
    let Query(params) = query?;
    let filter = params.expense_filter()?;
    let expenses = state.with_db(|conn| entities::search_expenses(conn, &filter))?;
    Ok(Json(expenses))
}
