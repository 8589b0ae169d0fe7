//! The module contains the errors the engine can throw.
//!
//! The errors are:
//!
//! - [`Validation`] thrown when user input violates a split precondition.
//! - [`Invariant`] thrown when an allocation fails its own sum check.
//! - [`KeyNotFound`] thrown when an expense is not found.
//!
//!  [`Validation`]: EngineError::Validation
//!  [`Invariant`]: EngineError::Invariant
//!  [`KeyNotFound`]: EngineError::KeyNotFound
use sea_orm::DbErr;
use thiserror::Error;

/// Engine custom errors.
#[derive(Error, Debug)]
pub enum EngineError {
    /// User-input-driven failure. Surfaced verbatim, never retried.
    #[error("Validation error: {0}")]
    Validation(String),
    /// The allocator could not reconcile its own sum even after the
    /// corrective nudges. Signals a defect in the allocator, not bad input.
    #[error("Internal invariant violated: {0}")]
    Invariant(String),
    #[error("\"{0}\" key not found!")]
    KeyNotFound(String),
    #[error(transparent)]
    Database(#[from] DbErr),
}

impl PartialEq for EngineError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Validation(a), Self::Validation(b)) => a == b,
            (Self::Invariant(a), Self::Invariant(b)) => a == b,
            (Self::KeyNotFound(a), Self::KeyNotFound(b)) => a == b,
            (Self::Database(a), Self::Database(b)) => a.to_string() == b.to_string(),
            _ => false,
        }
    }
}
