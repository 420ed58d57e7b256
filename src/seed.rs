// Demo dataset loaded by `--sample`. Destructive: clears all tables first.

use rusqlite::{params, Connection};
use tracing::info;

use crate::db::clear_all;
use crate::error::Result;

const RESIDENTS: [(&str, &str, &str, &str); 5] = [
    ("John Smith", "101", "555-123-4567", "john.smith@example.com"),
    ("Jane Doe", "102", "555-234-5678", "jane.doe@example.com"),
    ("Robert Johnson", "201", "555-345-6789", "robert.j@example.com"),
    ("Maria Garcia", "202", "555-456-7890", "maria.g@example.com"),
    ("James Wilson", "301", "555-567-8901", "james.w@example.com"),
];

/// (index into RESIDENTS, amount, description, date)
const PAYMENTS: [(usize, f64, &str, &str); 8] = [
    (0, 500.00, "Monthly maintenance fee", "2023-05-01"),
    (1, 500.00, "Monthly maintenance fee", "2023-05-02"),
    (2, 500.00, "Monthly maintenance fee", "2023-05-03"),
    (3, 500.00, "Monthly maintenance fee", "2023-05-05"),
    (4, 500.00, "Monthly maintenance fee", "2023-05-07"),
    (0, 500.00, "Monthly maintenance fee", "2023-06-01"),
    (1, 500.00, "Monthly maintenance fee", "2023-06-02"),
    (2, 500.00, "Monthly maintenance fee", "2023-06-04"),
];

/// (amount, description, category, date)
const EXPENSES: [(f64, &str, &str, &str); 7] = [
    (1200.00, "Building cleaning", "Cleaning", "2023-05-15"),
    (350.50, "Elevator maintenance", "Maintenance", "2023-05-20"),
    (750.75, "Water bill", "Utilities", "2023-05-25"),
    (825.25, "Electricity bill", "Utilities", "2023-05-25"),
    (125.00, "Garden maintenance", "Maintenance", "2023-06-05"),
    (950.00, "Insurance premium", "Insurance", "2023-06-10"),
    (500.00, "Parking lot repair", "Maintenance", "2023-06-15"),
];

pub fn insert_sample_data(conn: &mut Connection) -> Result<()> {
    let tx = conn.transaction()?;

    clear_all(&tx)?;

    let mut resident_ids = Vec::with_capacity(RESIDENTS.len());
    {
        let mut stmt =
            tx.prepare("INSERT INTO residents (name, unit, contact, email) VALUES (?1, ?2, ?3, ?4)")?;
        for (name, unit, contact, email) in RESIDENTS {
            stmt.execute(params![name, unit, contact, email])?;
            resident_ids.push(tx.last_insert_rowid());
        }

        let mut stmt = tx.prepare(
            "INSERT INTO payments (resident_id, amount, description, payment_date)
             VALUES (?1, ?2, ?3, ?4)",
        )?;
        for (index, amount, description, date) in PAYMENTS {
            stmt.execute(params![resident_ids[index], amount, description, date])?;
        }

        let mut stmt = tx.prepare(
            "INSERT INTO expenses (amount, description, category, expense_date)
             VALUES (?1, ?2, ?3, ?4)",
        )?;
        for (amount, description, category, date) in EXPENSES {
            stmt.execute(params![amount, description, category, date])?;
        }
    }

    tx.commit()?;

    info!(
        residents = RESIDENTS.len(),
        payments = PAYMENTS.len(),
        expenses = EXPENSES.len(),
        "Sample data loaded"
    );
    Ok(())
}
