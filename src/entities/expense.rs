// Expense Entity - money spent by the association

use chrono::{DateTime, Utc};
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};
use crate::search::{ExpenseFilter, Predicate};
use crate::validation::validate_expense;

pub const ENTITY: &str = "Expense";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Expense {
    pub id: i64,
    pub amount: f64,
    #[serde(default)]
    pub description: String,
    pub expense_date: String,
    #[serde(default)]
    pub category: String,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExpenseInput {
    pub amount: f64,
    pub description: String,
    pub expense_date: String,
    pub category: String,
}

impl From<Expense> for ExpenseInput {
    fn from(expense: Expense) -> Self {
        ExpenseInput {
            amount: expense.amount,
            description: expense.description,
            expense_date: expense.expense_date,
            category: expense.category,
        }
    }
}

const SELECT_EXPENSES: &str =
    "SELECT id, amount, description, expense_date, category, created_at FROM expenses";

const ORDER_EXPENSES: &str = " ORDER BY expense_date DESC, id DESC";

pub(crate) fn from_row(row: &Row<'_>) -> rusqlite::Result<Expense> {
    let description: Option<String> = row.get(2)?;
    let category: Option<String> = row.get(4)?;

    Ok(Expense {
        id: row.get(0)?,
        amount: row.get(1)?,
        description: description.unwrap_or_default(),
        expense_date: row.get(3)?,
        category: category.unwrap_or_default(),
        created_at: row.get(5)?,
    })
}

pub(crate) fn select_where(conn: &Connection, predicate: &Predicate) -> Result<Vec<Expense>> {
    let sql = format!("{SELECT_EXPENSES}{}{ORDER_EXPENSES}", predicate.where_clause());
    let mut stmt = conn.prepare(&sql)?;

    let expenses = stmt
        .query_map(params_from_iter(predicate.values()), from_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    Ok(expenses)
}

pub fn list_expenses(conn: &Connection) -> Result<Vec<Expense>> {
    select_where(conn, &Predicate::new())
}

pub fn search_expenses(conn: &Connection, filter: &ExpenseFilter) -> Result<Vec<Expense>> {
    select_where(conn, &filter.predicate())
}

pub fn get_expense(conn: &Connection, id: i64) -> Result<Expense> {
    let sql = format!("{SELECT_EXPENSES} WHERE id = ?1");
    conn.query_row(&sql, [id], from_row)
        .optional()?
        .ok_or_else(|| Error::not_found(ENTITY, id))
}

pub fn create_expense(conn: &Connection, input: &ExpenseInput) -> Result<Expense> {
    validate_expense(input)?;

    conn.execute(
        "INSERT INTO expenses (amount, description, expense_date, category)
         VALUES (?1, ?2, ?3, ?4)",
        params![
            input.amount,
            input.description,
            input.expense_date,
            input.category
        ],
    )?;
    let id = conn.last_insert_rowid();
    debug!(id, amount = input.amount, category = %input.category, "Expense created");

    get_expense(conn, id)
}

pub fn update_expense(conn: &Connection, id: i64, input: &ExpenseInput) -> Result<usize> {
    validate_expense(input)?;

    let updated = conn.execute(
        "UPDATE expenses
         SET amount = ?1, description = ?2, expense_date = ?3, category = ?4
         WHERE id = ?5",
        params![
            input.amount,
            input.description,
            input.expense_date,
            input.category,
            id
        ],
    )?;
    debug!(id, updated, "Expense update");

    Ok(updated)
}

pub fn delete_expense(conn: &Connection, id: i64) -> Result<usize> {
    let deleted = conn.execute("DELETE FROM expenses WHERE id = ?1", [id])?;
    debug!(id, deleted, "Expense delete");
    Ok(deleted)
}

pub(crate) fn all_by_id(conn: &Connection) -> Result<Vec<Expense>> {
    let sql = format!("{SELECT_EXPENSES} ORDER BY id");
    let mut stmt = conn.prepare(&sql)?;
    let expenses = stmt
        .query_map([], from_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(expenses)
}

pub(crate) fn insert_with_id(conn: &Connection, expense: &Expense) -> Result<()> {
    conn.execute(
        "INSERT INTO expenses (id, amount, description, expense_date, category, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            expense.id,
            expense.amount,
            expense.description,
            expense.expense_date,
            expense.category,
            expense.created_at,
        ],
    )?;
    Ok(())
}
