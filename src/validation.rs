// Shape Layer - Validation
// Field-presence and format checks applied before every create/update

use chrono::NaiveDate;

use crate::entities::{ExpenseInput, PaymentInput, ResidentInput};

// ============================================================================
// VALIDATION ERROR
// ============================================================================

/// First rule a record broke. `message` is what the client sees.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

impl ValidationError {
    pub fn new(field: &str, message: &str) -> Self {
        ValidationError {
            field: field.to_string(),
            message: message.to_string(),
        }
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for ValidationError {}

pub type ValidationResult = Result<(), ValidationError>;

pub const DATE_FORMAT: &str = "%Y-%m-%d";

const INVALID_DATE: &str = "invalid date format, must be YYYY-MM-DD";

// ============================================================================
// RULES
// ============================================================================

/// Strict `YYYY-MM-DD`: zero-padded and a real calendar day.
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    // chrono tolerates signs, padding and short fields; only the canonical form is accepted
    NaiveDate::parse_from_str(value, DATE_FORMAT)
        .ok()
        .filter(|date| date.format(DATE_FORMAT).to_string() == value)
}

/// Date check shared by search/report filters.
pub fn validate_date(field: &str, value: &str) -> ValidationResult {
    match parse_date(value) {
        Some(_) => Ok(()),
        None => Err(ValidationError::new(field, INVALID_DATE)),
    }
}

pub fn validate_resident(resident: &ResidentInput) -> ValidationResult {
    if resident.name.is_empty() {
        return Err(ValidationError::new("name", "name is required"));
    }
    if resident.unit.is_empty() {
        return Err(ValidationError::new("unit", "unit is required"));
    }
    if !resident.email.is_empty()
        && !(resident.email.contains('@') && resident.email.contains('.'))
    {
        return Err(ValidationError::new("email", "invalid email format"));
    }
    Ok(())
}

pub fn validate_payment(payment: &PaymentInput) -> ValidationResult {
    if payment.resident_id <= 0 {
        return Err(ValidationError::new("resident_id", "resident is required"));
    }
    if !(payment.amount > 0.0) {
        return Err(ValidationError::new(
            "amount",
            "amount must be greater than zero",
        ));
    }
    if payment.payment_date.is_empty() {
        return Err(ValidationError::new(
            "payment_date",
            "payment date is required",
        ));
    }
    validate_date("payment_date", &payment.payment_date)
}

pub fn validate_expense(expense: &ExpenseInput) -> ValidationResult {
    if !(expense.amount > 0.0) {
        return Err(ValidationError::new(
            "amount",
            "amount must be greater than zero",
        ));
    }
    if expense.description.is_empty() {
        return Err(ValidationError::new(
            "description",
            "description is required",
        ));
    }
    if expense.expense_date.is_empty() {
        return Err(ValidationError::new(
            "expense_date",
            "expense date is required",
        ));
    }
    validate_date("expense_date", &expense.expense_date)
}
