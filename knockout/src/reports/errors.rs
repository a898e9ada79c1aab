//! Report error types.

use thiserror::Error;

use crate::db::StoreError;
use crate::tournament::TournamentId;

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("Tournament not found: {0}")]
    TournamentNotFound(TournamentId),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

impl ReportError {
    /// Get a client-safe error message
    pub fn client_message(&self) -> String {
        match self {
            ReportError::Store(_) => "Internal server error".to_string(),
            _ => self.to_string(),
        }
    }

    /// Stable machine-readable error kind
    pub fn error_code(&self) -> &'static str {
        match self {
            ReportError::TournamentNotFound(_) => "NOT_FOUND",
            ReportError::Store(_) => "STORE_ERROR",
        }
    }
}

pub type ReportResult<T> = Result<T, ReportError>;
