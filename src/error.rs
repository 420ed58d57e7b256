// Error model shared by storage, validation, transfer and reports

use thiserror::Error;

use crate::validation::ValidationError;

#[derive(Debug, Error)]
pub enum Error {
    /// A write was rejected before touching storage.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Lookup by id found no row.
    #[error("{entity} not found")]
    NotFound { entity: &'static str, id: i64 },

    #[error("{0}")]
    Storage(#[from] rusqlite::Error),

    /// Export/import document could not be encoded or decoded.
    #[error("Invalid import file format: {0}")]
    Document(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Internal(String),
}

impl Error {
    pub fn not_found(entity: &'static str, id: i64) -> Self {
        Error::NotFound { entity, id }
    }

    /// True for errors caused by the caller's input rather than the server.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Error::Validation(_) | Error::NotFound { .. } | Error::Document(_)
        )
    }
}

// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;
