//! The module contains the errors the engine can return.
//!
//! The errors are:
//!
//! - [`Validation`] returned when a payload or snapshot is malformed. Nothing
//!   is applied.
//! - [`UnsupportedVersion`] returned when a snapshot has an unknown version.
//! - [`KeyNotFound`] returned when a record is not found.
//! - [`InvalidRow`] returned when a stored row cannot be mapped back to its
//!   record.
//! - [`Database`] returned on any storage failure. The whole operation is
//!   rolled back.
//!
//! Conflicts are not errors: they are part of the push result.
//!
//!  [`Validation`]: EngineError::Validation
//!  [`UnsupportedVersion`]: EngineError::UnsupportedVersion
//!  [`KeyNotFound`]: EngineError::KeyNotFound
//!  [`InvalidRow`]: EngineError::InvalidRow
//!  [`Database`]: EngineError::Database
use sea_orm::DbErr;
use thiserror::Error;

/// Engine custom errors.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Invalid payload: {0}")]
    Validation(String),
    #[error("Unsupported snapshot version: {0}")]
    UnsupportedVersion(u32),
    #[error("\"{0}\" key not found!")]
    KeyNotFound(String),
    #[error("Invalid stored row: {0}")]
    InvalidRow(String),
    #[error(transparent)]
    Serialization(#[from] serde_json::Error),
    #[error(transparent)]
    Database(#[from] DbErr),
}

impl EngineError {
    /// True for errors caused by the caller's input rather than the store.
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_) | Self::UnsupportedVersion(_))
    }
}

impl PartialEq for EngineError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Validation(a), Self::Validation(b)) => a == b,
            (Self::UnsupportedVersion(a), Self::UnsupportedVersion(b)) => a == b,
            (Self::KeyNotFound(a), Self::KeyNotFound(b)) => a == b,
            (Self::InvalidRow(a), Self::InvalidRow(b)) => a == b,
            (Self::Serialization(a), Self::Serialization(b)) => a.to_string() == b.to_string(),
            (Self::Database(a), Self::Database(b)) => a.to_string() == b.to_string(),
            _ => false,
        }
    }
}
