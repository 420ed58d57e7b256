// Payment Entity - money received from a resident

use chrono::{DateTime, Utc};
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};
use crate::search::{PaymentFilter, Predicate};
use crate::validation::validate_payment;

pub const ENTITY: &str = "Payment";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Payment {
    pub id: i64,
    pub resident_id: i64,
    /// Only filled on reads that join residents.
    #[serde(rename = "residentName", default, skip_serializing_if = "Option::is_none")]
    pub resident_name: Option<String>,
    pub amount: f64,
    #[serde(default)]
    pub description: String,
    pub payment_date: String,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PaymentInput {
    pub resident_id: i64,
    pub amount: f64,
    pub description: String,
    pub payment_date: String,
}

impl From<Payment> for PaymentInput {
    fn from(payment: Payment) -> Self {
        PaymentInput {
            resident_id: payment.resident_id,
            amount: payment.amount,
            description: payment.description,
            payment_date: payment.payment_date,
        }
    }
}

const SELECT_PAYMENTS: &str = "SELECT p.id, p.resident_id, r.name, p.amount, p.description, p.payment_date, p.created_at
     FROM payments p
     JOIN residents r ON p.resident_id = r.id";

const ORDER_PAYMENTS: &str = " ORDER BY p.payment_date DESC, p.id DESC";

fn from_joined_row(row: &Row<'_>) -> rusqlite::Result<Payment> {
    let description: Option<String> = row.get(4)?;

    Ok(Payment {
        id: row.get(0)?,
        resident_id: row.get(1)?,
        resident_name: Some(row.get(2)?),
        amount: row.get(3)?,
        description: description.unwrap_or_default(),
        payment_date: row.get(5)?,
        created_at: row.get(6)?,
    })
}

pub(crate) fn select_where(conn: &Connection, predicate: &Predicate) -> Result<Vec<Payment>> {
    let sql = format!("{SELECT_PAYMENTS}{}{ORDER_PAYMENTS}", predicate.where_clause());
    let mut stmt = conn.prepare(&sql)?;

    let payments = stmt
        .query_map(params_from_iter(predicate.values()), from_joined_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    Ok(payments)
}

/// All payments with their resident's name, newest payment date first.
pub fn list_payments(conn: &Connection) -> Result<Vec<Payment>> {
    select_where(conn, &Predicate::new())
}

pub fn search_payments(conn: &Connection, filter: &PaymentFilter) -> Result<Vec<Payment>> {
    select_where(conn, &filter.predicate())
}

pub fn get_payment(conn: &Connection, id: i64) -> Result<Payment> {
    let sql = format!("{SELECT_PAYMENTS} WHERE p.id = ?1");
    conn.query_row(&sql, [id], from_joined_row)
        .optional()?
        .ok_or_else(|| Error::not_found(ENTITY, id))
}

/// The resident is not checked for existence; a payment for an unknown
/// resident is stored but stays invisible to joined reads.
pub fn create_payment(conn: &Connection, input: &PaymentInput) -> Result<Payment> {
    validate_payment(input)?;

    conn.execute(
        "INSERT INTO payments (resident_id, amount, description, payment_date)
         VALUES (?1, ?2, ?3, ?4)",
        params![
            input.resident_id,
            input.amount,
            input.description,
            input.payment_date
        ],
    )?;
    let id = conn.last_insert_rowid();
    debug!(id, resident_id = input.resident_id, amount = input.amount, "Payment created");

    match get_payment(conn, id) {
        Ok(payment) => Ok(payment),
        Err(Error::NotFound { .. }) => raw_by_id(conn, id),
        Err(e) => Err(e),
    }
}

pub fn update_payment(conn: &Connection, id: i64, input: &PaymentInput) -> Result<usize> {
    validate_payment(input)?;

    let updated = conn.execute(
        "UPDATE payments
         SET resident_id = ?1, amount = ?2, description = ?3, payment_date = ?4
         WHERE id = ?5",
        params![
            input.resident_id,
            input.amount,
            input.description,
            input.payment_date,
            id
        ],
    )?;
    debug!(id, updated, "Payment update");

    Ok(updated)
}

pub fn delete_payment(conn: &Connection, id: i64) -> Result<usize> {
    let deleted = conn.execute("DELETE FROM payments WHERE id = ?1", [id])?;
    debug!(id, deleted, "Payment delete");
    Ok(deleted)
}

// ============================================================================
// RAW TABLE ACCESS (no join, used by transfer)
// ============================================================================

const SELECT_RAW: &str =
    "SELECT id, resident_id, amount, description, payment_date, created_at FROM payments";

fn from_raw_row(row: &Row<'_>) -> rusqlite::Result<Payment> {
    let description: Option<String> = row.get(3)?;

    Ok(Payment {
        id: row.get(0)?,
        resident_id: row.get(1)?,
        resident_name: None,
        amount: row.get(2)?,
        description: description.unwrap_or_default(),
        payment_date: row.get(4)?,
        created_at: row.get(5)?,
    })
}

fn raw_by_id(conn: &Connection, id: i64) -> Result<Payment> {
    let sql = format!("{SELECT_RAW} WHERE id = ?1");
    conn.query_row(&sql, [id], from_raw_row)
        .optional()?
        .ok_or_else(|| Error::not_found(ENTITY, id))
}

/// Every row in id order, including payments whose resident is gone.
pub(crate) fn all_by_id(conn: &Connection) -> Result<Vec<Payment>> {
    let sql = format!("{SELECT_RAW} ORDER BY id");
    let mut stmt = conn.prepare(&sql)?;
    let payments = stmt
        .query_map([], from_raw_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(payments)
}

pub(crate) fn insert_with_id(conn: &Connection, payment: &Payment) -> Result<()> {
    conn.execute(
        "INSERT INTO payments (id, resident_id, amount, description, payment_date, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            payment.id,
            payment.resident_id,
            payment.amount,
            payment.description,
            payment.payment_date,
            payment.created_at,
        ],
    )?;
    Ok(())
}
