// Condo Manager - Core Library
// Residents, payments and expenses for a condominium association, stored in
// SQLite and served over HTTP. Used by the `condo-manager` binary and tests.

pub mod api;
pub mod config;
pub mod db;
pub mod entities;
pub mod error;
pub mod report;
pub mod search;
pub mod seed;
pub mod transfer;
pub mod validation;

// Re-export commonly used types
pub use config::Config;
pub use db::{open_database, setup_database};
pub use entities::{
    Expense, ExpenseInput, Payment, PaymentInput, Resident, ResidentInput,
};
pub use error::{Error, Result};
pub use report::{expenses_report, payments_report};
pub use search::{DateRange, ExpenseFilter, PaymentFilter, Predicate, ResidentFilter, SearchParams};
pub use seed::insert_sample_data;
pub use transfer::{export_database, import_database, ExportDocument, ImportSummary};
pub use validation::{validate_expense, validate_payment, validate_resident, ValidationError};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Build metadata, compiled in when the release tooling sets them.
pub const BUILD_TIME: Option<&str> = option_env!("CONDO_BUILD_TIME");
pub const COMMIT_HASH: Option<&str> = option_env!("CONDO_COMMIT_HASH");

/// `Condo Manager <version>` plus whatever build metadata is present.
pub fn version_banner() -> String {
    let mut banner = format!("Condo Manager {VERSION}");
    if let Some(time) = BUILD_TIME.filter(|t| !t.is_empty()) {
        banner.push_str(&format!("\nBuild Time: {time}"));
    }
    if let Some(commit) = COMMIT_HASH.filter(|c| !c.is_empty()) {
        banner.push_str(&format!("\nCommit: {commit}"));
    }
    banner
}
