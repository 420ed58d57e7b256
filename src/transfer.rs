// Bulk Transfer - whole-database export and all-or-nothing import

use std::io::{Read, Write};

use chrono::Local;
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::db::clear_all;
use crate::entities::{expense, payment, resident, Expense, Payment, Resident};
use crate::error::Result;

/// Full snapshot of the three tables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportDocument {
    #[serde(default)]
    pub residents: Vec<Resident>,
    #[serde(default)]
    pub payments: Vec<Payment>,
    #[serde(default)]
    pub expenses: Vec<Expense>,
    #[serde(default)]
    pub export_date: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ImportSummary {
    pub residents: usize,
    pub payments: usize,
    pub expenses: usize,
}

/// Read every row of every table. Never filtered or paginated.
pub fn export_database(conn: &Connection) -> Result<ExportDocument> {
    let document = ExportDocument {
        residents: resident::all_by_id(conn)?,
        payments: payment::all_by_id(conn)?,
        expenses: expense::all_by_id(conn)?,
        export_date: Local::now().to_rfc3339(),
    };

    info!(
        residents = document.residents.len(),
        payments = document.payments.len(),
        expenses = document.expenses.len(),
        "Database exported"
    );
    Ok(document)
}

/// Replace all data with the document's contents, keeping its ids.
///
/// Runs in a single transaction: if any delete or insert fails the
/// transaction is dropped uncommitted and the previous data stays intact.
pub fn import_database(conn: &mut Connection, document: &ExportDocument) -> Result<ImportSummary> {
    let tx = conn.transaction()?;

    clear_all(&tx)?;

    for r in &document.residents {
        resident::insert_with_id(&tx, r)?;
    }
    for p in &document.payments {
        payment::insert_with_id(&tx, p)?;
    }
    for e in &document.expenses {
        expense::insert_with_id(&tx, e)?;
    }

    tx.commit()?;

    let summary = ImportSummary {
        residents: document.residents.len(),
        payments: document.payments.len(),
        expenses: document.expenses.len(),
    };
    info!(
        residents = summary.residents,
        payments = summary.payments,
        expenses = summary.expenses,
        "Database imported"
    );
    Ok(summary)
}

/// Decode an import document from raw bytes (upload body or file).
pub fn parse_document(bytes: &[u8]) -> Result<ExportDocument> {
    let document: ExportDocument = serde_json::from_slice(bytes)?;
    if document.export_date.is_empty() {
        warn!("Import document has no export_date");
    }
    Ok(document)
}

/// Serialize and flush, so buffered writers surface their final write error.
pub fn write_document<W: Write>(mut writer: W, document: &ExportDocument) -> Result<()> {
    serde_json::to_writer_pretty(&mut writer, document)?;
    writer.flush()?;
    Ok(())
}

pub fn read_document<R: Read>(mut reader: R) -> Result<ExportDocument> {
    let mut bytes = Vec::new();
    reader.read_to_end(&mut bytes)?;
    parse_document(&bytes)
}
