//! The module contains the errors the ledger can throw.
//!
//! The taxonomy is deliberately small and stable so the server can map each
//! variant to a fixed HTTP status:
//!
//! - [`Validation`] for malformed or out-of-range input.
//! - [`NotFound`] for an entity that is absent or not owned by the caller.
//!   The two cases are indistinguishable on purpose, so one user cannot
//!   probe for another user's entity ids.
//! - [`InvalidReference`] for a foreign key that does not resolve to an
//!   entity owned by the caller.
//! - [`InvalidOperation`] for business-rule violations such as deleting a
//!   referenced account or transferring to the same account.
//!
//! [`Validation`]: LedgerError::Validation
//! [`NotFound`]: LedgerError::NotFound
//! [`InvalidReference`]: LedgerError::InvalidReference
//! [`InvalidOperation`]: LedgerError::InvalidOperation
use sea_orm::DbErr;
use thiserror::Error;

/// Ledger custom errors.
#[derive(Error, Debug)]
pub enum LedgerError {
    #[error("Invalid value: {0}")]
    Validation(String),
    #[error("{0} not found")]
    NotFound(String),
    #[error("Invalid {0}")]
    InvalidReference(String),
    #[error("{0}")]
    InvalidOperation(String),
    #[error(transparent)]
    Database(#[from] DbErr),
}

impl PartialEq for LedgerError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Validation(a), Self::Validation(b)) => a == b,
            (Self::NotFound(a), Self::NotFound(b)) => a == b,
            (Self::InvalidReference(a), Self::InvalidReference(b)) => a == b,
            (Self::InvalidOperation(a), Self::InvalidOperation(b)) => a == b,
            (Self::Database(a), Self::Database(b)) => a.to_string() == b.to_string(),
            _ => false,
        }
    }
}
