//! The module contains the error the engine can throw.
//!
//! The errors are:
//!
//! - [`DuplicateUsername`] thrown when registering a username that is taken.
//! - [`NotFound`] thrown when an account does not exist.
//! - [`InvalidAmount`] thrown for non-positive amounts or insufficient funds.
//! - [`InvalidInput`] thrown when a username, password or display name is rejected.
//! - [`StorageUnavailable`] thrown when the database fails. It is fatal.
//!
//!  [`DuplicateUsername`]: EngineError::DuplicateUsername
//!  [`NotFound`]: EngineError::NotFound
//!  [`InvalidAmount`]: EngineError::InvalidAmount
//!  [`InvalidInput`]: EngineError::InvalidInput
//!  [`StorageUnavailable`]: EngineError::StorageUnavailable
use sea_orm::DbErr;
use thiserror::Error;

/// Engine custom errors.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("\"{0}\" already exists!")]
    DuplicateUsername(String),
    #[error("\"{0}\" not found!")]
    NotFound(String),
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Password hashing failed: {0}")]
    Hash(#[from] bcrypt::BcryptError),
    #[error("Storage unavailable: {0}")]
    StorageUnavailable(#[from] DbErr),
}

impl EngineError {
    /// Whether the caller can re-prompt and try again.
    ///
    /// Storage and hashing failures are not recoverable from the menu.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::DuplicateUsername(_)
                | Self::NotFound(_)
                | Self::InvalidAmount(_)
                | Self::InvalidInput(_)
        )
    }
}

impl PartialEq for EngineError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::DuplicateUsername(a), Self::DuplicateUsername(b)) => a == b,
            (Self::NotFound(a), Self::NotFound(b)) => a == b,
            (Self::InvalidAmount(a), Self::InvalidAmount(b)) => a == b,
            (Self::InvalidInput(a), Self::InvalidInput(b)) => a == b,
            (Self::Hash(a), Self::Hash(b)) => a.to_string() == b.to_string(),
            (Self::StorageUnavailable(a), Self::StorageUnavailable(b)) => {
                a.to_string() == b.to_string()
            }
            _ => false,
        }
    }
}
