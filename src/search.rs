// Search Layer - composable WHERE clauses
//
// Filters become a list of (fragment, bound values) pairs joined with AND.
// Column names only ever come from this crate; user input is always bound.

use rusqlite::types::Value;
use serde::Deserialize;

use crate::error::Result;
use crate::validation::{validate_date, ValidationError};

// ============================================================================
// PREDICATE
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
struct Clause {
    fragment: String,
    values: Vec<Value>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Predicate {
    clauses: Vec<Clause>,
}

impl Predicate {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&mut self, fragment: String, values: Vec<Value>) -> &mut Self {
        self.clauses.push(Clause { fragment, values });
        self
    }

    pub fn equals(&mut self, column: &str, value: impl Into<Value>) -> &mut Self {
        self.push(format!("{column} = ?"), vec![value.into()])
    }

    /// Inclusive lower bound.
    pub fn at_least(&mut self, column: &str, value: impl Into<Value>) -> &mut Self {
        self.push(format!("{column} >= ?"), vec![value.into()])
    }

    /// Inclusive upper bound.
    pub fn at_most(&mut self, column: &str, value: impl Into<Value>) -> &mut Self {
        self.push(format!("{column} <= ?"), vec![value.into()])
    }

    /// Substring match on any of `columns`, as one parenthesized OR group.
    pub fn contains_any(&mut self, columns: &[&str], needle: &str) -> &mut Self {
        if columns.is_empty() {
            return self;
        }
        let pattern = format!("%{needle}%");
        let fragment = columns
            .iter()
            .map(|column| format!("{column} LIKE ?"))
            .collect::<Vec<_>>()
            .join(" OR ");
        let values = columns
            .iter()
            .map(|_| Value::Text(pattern.clone()))
            .collect();
        self.push(format!("({fragment})"), values)
    }

    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    /// `""` when there is nothing to filter on, otherwise `" WHERE a AND b"`.
    pub fn where_clause(&self) -> String {
        if self.clauses.is_empty() {
            return String::new();
        }
        let joined = self
            .clauses
            .iter()
            .map(|clause| clause.fragment.as_str())
            .collect::<Vec<_>>()
            .join(" AND ");
        format!(" WHERE {joined}")
    }

    /// Bound values in placeholder order.
    pub fn values(&self) -> impl Iterator<Item = &Value> {
        self.clauses.iter().flat_map(|clause| clause.values.iter())
    }
}

// ============================================================================
// FILTERS
// ============================================================================

/// Inclusive `[start, end]` on a `YYYY-MM-DD` column.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DateRange {
    pub start: Option<String>,
    pub end: Option<String>,
}

impl DateRange {
    fn apply(&self, predicate: &mut Predicate, column: &str) {
        if let Some(start) = &self.start {
            predicate.at_least(column, start.clone());
        }
        if let Some(end) = &self.end {
            predicate.at_most(column, end.clone());
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResidentFilter {
    pub text: Option<String>,
}

impl ResidentFilter {
    pub fn predicate(&self) -> Predicate {
        let mut predicate = Predicate::new();
        if let Some(text) = &self.text {
            predicate.contains_any(&["name", "unit", "email", "contact"], text);
        }
        predicate
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PaymentFilter {
    pub text: Option<String>,
    pub resident_id: Option<i64>,
    pub dates: DateRange,
}

impl PaymentFilter {
    /// Column names assume `payments p JOIN residents r`.
    pub fn predicate(&self) -> Predicate {
        let mut predicate = Predicate::new();
        if let Some(text) = &self.text {
            predicate.contains_any(&["p.description", "r.name"], text);
        }
        if let Some(resident_id) = self.resident_id {
            predicate.equals("p.resident_id", resident_id);
        }
        self.dates.apply(&mut predicate, "p.payment_date");
        predicate
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExpenseFilter {
    pub text: Option<String>,
    pub category: Option<String>,
    pub dates: DateRange,
}

impl ExpenseFilter {
    pub fn predicate(&self) -> Predicate {
        let mut predicate = Predicate::new();
        if let Some(text) = &self.text {
            predicate.contains_any(&["description"], text);
        }
        if let Some(category) = &self.category {
            predicate.equals("category", category.clone());
        }
        self.dates.apply(&mut predicate, "expense_date");
        predicate
    }
}

// ============================================================================
// QUERY STRING
// ============================================================================

/// Raw query-string parameters shared by search and report endpoints.
/// Missing and empty values both mean "no filter".
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchParams {
    pub q: Option<String>,
    pub resident_id: Option<String>,
    pub category: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

fn present(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

impl SearchParams {
    fn dates(&self) -> Result<DateRange> {
        let start = present(&self.start_date);
        let end = present(&self.end_date);
        if let Some(start) = &start {
            validate_date("start_date", start)?;
        }
        if let Some(end) = &end {
            validate_date("end_date", end)?;
        }
        Ok(DateRange { start, end })
    }

    pub fn resident_filter(&self) -> ResidentFilter {
        ResidentFilter {
            text: present(&self.q),
        }
    }

    pub fn payment_filter(&self) -> Result<PaymentFilter> {
        let resident_id = match present(&self.resident_id) {
            Some(raw) => Some(raw.parse::<i64>().map_err(|_| {
                ValidationError::new("resident_id", "Invalid resident ID")
            })?),
            None => None,
        };
        Ok(PaymentFilter {
            text: present(&self.q),
            resident_id,
            dates: self.dates()?,
        })
    }

    pub fn expense_filter(&self) -> Result<ExpenseFilter> {
        Ok(ExpenseFilter {
            text: present(&self.q),
            category: present(&self.category),
            dates: self.dates()?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    #[test]
    fn test_empty_predicate_has_no_where() {
        let predicate = Predicate::new();
        assert!(predicate.is_empty());
        assert_eq!(predicate.where_clause(), "");
        assert_eq!(predicate.values().count(), 0);
    }

    #[test]
    fn test_predicate_joins_with_and_and_groups_or() {
        let mut predicate = Predicate::new();
        predicate
            .contains_any(&["p.description", "r.name"], "fee")
            .equals("p.resident_id", 3_i64)
            .at_least("p.payment_date", "2023-05-01".to_string());

        assert_eq!(
            predicate.where_clause(),
            " WHERE (p.description LIKE ? OR r.name LIKE ?) AND p.resident_id = ? AND p.payment_date >= ?"
        );
        let values: Vec<&Value> = predicate.values().collect();
        assert_eq!(
            values,
            vec![
                &Value::Text("%fee%".to_string()),
                &Value::Text("%fee%".to_string()),
                &Value::Integer(3),
                &Value::Text("2023-05-01".to_string()),
            ]
        );
    }

    #[test]
    fn test_filters_omit_absent_values() {
        assert!(ResidentFilter::default().predicate().is_empty());
        assert!(PaymentFilter::default().predicate().is_empty());
        assert!(ExpenseFilter::default().predicate().is_empty());
    }

    #[test]
    fn test_expense_filter_predicate() {
        let filter = ExpenseFilter {
            text: None,
            category: Some("Utilities".to_string()),
            dates: DateRange {
                start: None,
                end: Some("2023-05-31".to_string()),
            },
        };
        assert_eq!(
            filter.predicate().where_clause(),
            " WHERE category = ? AND expense_date <= ?"
        );
    }

    #[test]
    fn test_search_params_treat_empty_as_absent() {
        let params = SearchParams {
            q: Some("  ".to_string()),
            resident_id: Some(String::new()),
            category: Some(String::new()),
            start_date: Some(String::new()),
            end_date: None,
        };
        assert_eq!(params.resident_filter(), ResidentFilter::default());
        assert_eq!(params.payment_filter().unwrap(), PaymentFilter::default());
        assert_eq!(params.expense_filter().unwrap(), ExpenseFilter::default());
    }

    #[test]
    fn test_search_params_reject_bad_values() {
        let params = SearchParams {
            resident_id: Some("abc".to_string()),
            ..Default::default()
        };
        assert!(matches!(params.payment_filter(), Err(Error::Validation(_))));

        let params = SearchParams {
            start_date: Some("05/01/2023".to_string()),
            ..Default::default()
        };
        assert!(matches!(params.expense_filter(), Err(Error::Validation(_))));
    }
}
