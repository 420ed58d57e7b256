// Reports - filtered payments/expenses as CSV text
//
// Rows that fail to decode are logged and skipped; the rest of the report
// is still produced.

use csv::{QuoteStyle, WriterBuilder};
use rusqlite::{params_from_iter, Connection, Row};
use tracing::warn;

use crate::error::{Error, Result};
use crate::search::{ExpenseFilter, PaymentFilter};

pub const PAYMENTS_HEADER: [&str; 6] = ["ID", "Resident", "Unit", "Amount", "Description", "Date"];
pub const EXPENSES_HEADER: [&str; 5] = ["ID", "Amount", "Description", "Date", "Category"];

#[derive(Debug, Clone, PartialEq)]
struct PaymentLine {
    id: i64,
    name: String,
    unit: String,
    amount: f64,
    description: String,
    date: String,
}

impl PaymentLine {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        let description: Option<String> = row.get(4)?;
        Ok(PaymentLine {
            id: row.get(0)?,
            name: row.get(1)?,
            unit: row.get(2)?,
            amount: row.get(3)?,
            description: description.unwrap_or_default(),
            date: row.get(5)?,
        })
    }

    fn record(&self) -> [String; 6] {
        [
            self.id.to_string(),
            self.name.clone(),
            self.unit.clone(),
            format_amount(self.amount),
            self.description.clone(),
            self.date.clone(),
        ]
    }
}

#[derive(Debug, Clone, PartialEq)]
struct ExpenseLine {
    id: i64,
    amount: f64,
    description: String,
    date: String,
    category: String,
}

impl ExpenseLine {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        let description: Option<String> = row.get(2)?;
        let category: Option<String> = row.get(4)?;
        Ok(ExpenseLine {
            id: row.get(0)?,
            amount: row.get(1)?,
            description: description.unwrap_or_default(),
            date: row.get(3)?,
            category: category.unwrap_or_default(),
        })
    }

    fn record(&self) -> [String; 5] {
        [
            self.id.to_string(),
            format_amount(self.amount),
            self.description.clone(),
            self.date.clone(),
            self.category.clone(),
        ]
    }
}

pub fn format_amount(amount: f64) -> String {
    format!("{amount:.2}")
}

/// CSV with `PAYMENTS_HEADER`, newest payment date first.
pub fn payments_report(conn: &Connection, filter: &PaymentFilter) -> Result<String> {
    let predicate = filter.predicate();
    let sql = format!(
        "SELECT p.id, r.name, r.unit, p.amount, p.description, p.payment_date
         FROM payments p
         JOIN residents r ON p.resident_id = r.id{}
         ORDER BY p.payment_date DESC, p.id DESC",
        predicate.where_clause()
    );

    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params_from_iter(predicate.values()), PaymentLine::from_row)?;

    let mut writer = new_writer();
    writer.write_record(PAYMENTS_HEADER)?;
    for row in rows {
        match row {
            Ok(line) => writer.write_record(line.record())?,
            Err(e) => warn!(error = %e, "Skipping payment row in report"),
        }
    }

    finish(writer)
}

/// CSV with `EXPENSES_HEADER`, newest expense date first.
pub fn expenses_report(conn: &Connection, filter: &ExpenseFilter) -> Result<String> {
    let predicate = filter.predicate();
    let sql = format!(
        "SELECT id, amount, description, expense_date, category FROM expenses{}
         ORDER BY expense_date DESC, id DESC",
        predicate.where_clause()
    );

    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params_from_iter(predicate.values()), ExpenseLine::from_row)?;

    let mut writer = new_writer();
    writer.write_record(EXPENSES_HEADER)?;
    for row in rows {
        match row {
            Ok(line) => writer.write_record(line.record())?,
            Err(e) => warn!(error = %e, "Skipping expense row in report"),
        }
    }

    finish(writer)
}

fn new_writer() -> csv::Writer<Vec<u8>> {
    WriterBuilder::new()
        .quote_style(QuoteStyle::Necessary)
        .from_writer(Vec::new())
}

fn finish(writer: csv::Writer<Vec<u8>>) -> Result<String> {
    let bytes = writer
        .into_inner()
        .map_err(|e| Error::Io(e.into_error()))?;
    String::from_utf8(bytes).map_err(|e| Error::Internal(format!("report is not UTF-8: {e}")))
}
