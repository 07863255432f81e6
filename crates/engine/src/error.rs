//! The module contains the errors the engine can return.
//!
//! The main ones are:
//!
//! - [`KeyNotFound`] returned when a shop, user, connection or transaction
//!   does not exist.
//! - [`InvalidAmount`] returned when a negative monetary value is supplied.
//! - [`InvalidStateTransition`] returned when a cross-shop transaction is
//!   already in a terminal state.
//! - [`DuplicateConnection`] returned when a connection already exists and
//!   the caller asked to reject duplicates.
//!
//!  [`KeyNotFound`]: EngineError::KeyNotFound
//!  [`InvalidAmount`]: EngineError::InvalidAmount
//!  [`InvalidStateTransition`]: EngineError::InvalidStateTransition
//!  [`DuplicateConnection`]: EngineError::DuplicateConnection
use sea_orm::DbErr;
use thiserror::Error;

/// Engine custom errors.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("\"{0}\" key not found!")]
    KeyNotFound(String),
    #[error("\"{0}\" already present!")]
    ExistingKey(String),
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),
    #[error("Invalid state transition: {0}")]
    InvalidStateTransition(String),
    #[error("Duplicate connection: {0}")]
    DuplicateConnection(String),
    #[error("Invalid connection: {0}")]
    InvalidConnection(String),
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error(transparent)]
    Database(#[from] DbErr),
}

impl PartialEq for EngineError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::KeyNotFound(a), Self::KeyNotFound(b)) => a == b,
            (Self::ExistingKey(a), Self::ExistingKey(b)) => a == b,
            (Self::InvalidAmount(a), Self::InvalidAmount(b)) => a == b,
            (Self::InvalidStateTransition(a), Self::InvalidStateTransition(b)) => a == b,
            (Self::DuplicateConnection(a), Self::DuplicateConnection(b)) => a == b,
            (Self::InvalidConnection(a), Self::InvalidConnection(b)) => a == b,
            (Self::InvalidInput(a), Self::InvalidInput(b)) => a == b,
            (Self::Database(a), Self::Database(b)) => a.to_string() == b.to_string(),
            _ => false,
        }
    }
}
