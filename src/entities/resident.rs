// Resident Entity - one household member attached to a unit

use chrono::{DateTime, Utc};
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};
use crate::search::{Predicate, ResidentFilter};
use crate::validation::validate_resident;

pub const ENTITY: &str = "Resident";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resident {
    pub id: i64,
    pub name: String,
    pub unit: String,
    #[serde(default)]
    pub contact: String,
    #[serde(default)]
    pub email: String,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
    #[serde(default = "Utc::now")]
    pub updated_at: DateTime<Utc>,
}

/// Mutable fields accepted on create and update.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResidentInput {
    pub name: String,
    pub unit: String,
    pub contact: String,
    pub email: String,
}

impl From<Resident> for ResidentInput {
    fn from(resident: Resident) -> Self {
        ResidentInput {
            name: resident.name,
            unit: resident.unit,
            contact: resident.contact,
            email: resident.email,
        }
    }
}

const SELECT_RESIDENTS: &str =
    "SELECT id, name, unit, contact, email, created_at, updated_at FROM residents";

const ORDER_RESIDENTS: &str = " ORDER BY name, id";

pub(crate) fn from_row(row: &Row<'_>) -> rusqlite::Result<Resident> {
    let contact: Option<String> = row.get(3)?;
    let email: Option<String> = row.get(4)?;

    Ok(Resident {
        id: row.get(0)?,
        name: row.get(1)?,
        unit: row.get(2)?,
        contact: contact.unwrap_or_default(),
        email: email.unwrap_or_default(),
        created_at: row.get(5)?,
        updated_at: row.get(6)?,
    })
}

pub(crate) fn select_where(conn: &Connection, predicate: &Predicate) -> Result<Vec<Resident>> {
    let sql = format!("{SELECT_RESIDENTS}{}{ORDER_RESIDENTS}", predicate.where_clause());
    let mut stmt = conn.prepare(&sql)?;

    let residents = stmt
        .query_map(params_from_iter(predicate.values()), from_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    Ok(residents)
}

/// All residents, ordered by name.
pub fn list_residents(conn: &Connection) -> Result<Vec<Resident>> {
    select_where(conn, &Predicate::new())
}

/// Substring search over name, unit, email and contact.
pub fn search_residents(conn: &Connection, filter: &ResidentFilter) -> Result<Vec<Resident>> {
    select_where(conn, &filter.predicate())
}

pub fn get_resident(conn: &Connection, id: i64) -> Result<Resident> {
    let sql = format!("{SELECT_RESIDENTS} WHERE id = ?1");
    conn.query_row(&sql, [id], from_row)
        .optional()?
        .ok_or_else(|| Error::not_found(ENTITY, id))
}

pub fn create_resident(conn: &Connection, input: &ResidentInput) -> Result<Resident> {
    validate_resident(input)?;

    conn.execute(
        "INSERT INTO residents (name, unit, contact, email) VALUES (?1, ?2, ?3, ?4)",
        params![input.name, input.unit, input.contact, input.email],
    )?;
    let id = conn.last_insert_rowid();
    debug!(id, unit = %input.unit, "Resident created");

    get_resident(conn, id)
}

/// Replace every mutable field and refresh `updated_at`.
/// Returns the number of rows touched (0 when the id is unknown).
pub fn update_resident(conn: &Connection, id: i64, input: &ResidentInput) -> Result<usize> {
    validate_resident(input)?;

    let updated = conn.execute(
        "UPDATE residents
         SET name = ?1, unit = ?2, contact = ?3, email = ?4, updated_at = CURRENT_TIMESTAMP
         WHERE id = ?5",
        params![input.name, input.unit, input.contact, input.email, id],
    )?;
    debug!(id, updated, "Resident update");

    Ok(updated)
}

/// Payments that reference this resident are left in place.
pub fn delete_resident(conn: &Connection, id: i64) -> Result<usize> {
    let deleted = conn.execute("DELETE FROM residents WHERE id = ?1", [id])?;
    debug!(id, deleted, "Resident delete");
    Ok(deleted)
}

/// Insert with a caller-supplied identity and timestamps (import path).
pub(crate) fn insert_with_id(conn: &Connection, resident: &Resident) -> Result<()> {
    conn.execute(
        "INSERT INTO residents (id, name, unit, contact, email, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            resident.id,
            resident.name,
            resident.unit,
            resident.contact,
            resident.email,
            resident.created_at,
            resident.updated_at,
        ],
    )?;
    Ok(())
}

/// Every row in id order, for export.
pub(crate) fn all_by_id(conn: &Connection) -> Result<Vec<Resident>> {
    let sql = format!("{SELECT_RESIDENTS} ORDER BY id");
    let mut stmt = conn.prepare(&sql)?;
    let residents = stmt
        .query_map([], from_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(residents)
}
