//! Domain error types

use crate::collaboration::RosterError;
use thiserror::Error;

/// Domain-level errors
#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Roster error: {0}")]
    Roster(#[from] RosterError),

    #[error("Unknown system instruction: {0}")]
    UnknownInstruction(String),

    #[error("No document is open")]
    NoDocument,

    #[error("Operation cancelled")]
    Cancelled,
}

impl DomainError {
    /// Check if this error represents a cancellation
    pub fn is_cancelled(&self) -> bool {
        matches!(self, DomainError::Cancelled)
    }
}
