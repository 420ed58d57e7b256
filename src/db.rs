use std::path::Path;

use rusqlite::Connection;
use tracing::{debug, info};

use crate::error::Result;

/// Open (or create) the database file and make sure the schema exists.
pub fn open_database(path: &Path) -> Result<Connection> {
    if let Some(dir) = path.parent() {
        if !dir.as_os_str().is_empty() && !dir.exists() {
            std::fs::create_dir_all(dir)?;
        }
    }

    let conn = Connection::open(path)?;
    setup_database(&conn)?;
    info!(path = %path.display(), "Database ready");

    Ok(conn)
}

pub fn setup_database(conn: &Connection) -> Result<()> {
    // Enable WAL mode for crash recovery (in-memory databases ignore it)
    conn.pragma_update(None, "journal_mode", "WAL")?;
    // Bundled SQLite enforces foreign keys by default; payments may outlive their resident
    conn.pragma_update(None, "foreign_keys", false)?;

    // ==========================================================================
    // Residents
    // ==========================================================================
    conn.execute(
        "CREATE TABLE IF NOT EXISTS residents (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            unit TEXT NOT NULL,
            contact TEXT,
            email TEXT,
            created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP,
            updated_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP
        )",
        [],
    )?;

    // ==========================================================================
    // Payments (resident_id is declared, not enforced: foreign_keys stays off)
    // ==========================================================================
    conn.execute(
        "CREATE TABLE IF NOT EXISTS payments (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            resident_id INTEGER NOT NULL,
            amount REAL NOT NULL,
            description TEXT,
            payment_date DATE NOT NULL,
            created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP,
            FOREIGN KEY (resident_id) REFERENCES residents (id)
        )",
        [],
    )?;

    // ==========================================================================
    // Expenses
    // ==========================================================================
    conn.execute(
        "CREATE TABLE IF NOT EXISTS expenses (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            amount REAL NOT NULL,
            description TEXT,
            expense_date DATE NOT NULL,
            category TEXT,
            created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP
        )",
        [],
    )?;

    debug!("Schema verified");
    Ok(())
}

/// Row count for one of the three tables.
pub fn count_rows(conn: &Connection, table: Table) -> Result<i64> {
    let sql = format!("SELECT COUNT(*) FROM {}", table.name());
    let count = conn.query_row(&sql, [], |row| row.get(0))?;
    Ok(count)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Table {
    Residents,
    Payments,
    Expenses,
}

impl Table {
    pub fn name(&self) -> &'static str {
        match self {
            Table::Residents => "residents",
            Table::Payments => "payments",
            Table::Expenses => "expenses",
        }
    }
}

/// Delete order that respects payments -> residents.
pub(crate) const CLEAR_ORDER: [Table; 3] = [Table::Payments, Table::Expenses, Table::Residents];

/// Empty every table. Callers run this inside their own transaction.
pub(crate) fn clear_all(conn: &Connection) -> Result<()> {
    for table in CLEAR_ORDER {
        conn.execute(&format!("DELETE FROM {}", table.name()), [])?;
    }
    Ok(())
}
