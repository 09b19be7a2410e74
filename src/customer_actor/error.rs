//! Error types for the Customer actor.

use thiserror::Error;

/// Errors that can occur during customer and loyalty operations.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum CustomerError {
    /// The requested customer was not found.
    #[error("Customer not found: {0}")]
    NotFound(String),

    /// The phone number is not 10 or 11 digits once formatting is stripped.
    #[error("Invalid phone number: {0}")]
    InvalidPhone(String),

    /// The balance cannot cover the debit.
    #[error("Insufficient points: requested {requested}, available {available}")]
    InsufficientPoints { requested: u64, available: u64 },

    /// Earn and spend amounts must be positive.
    #[error("Point amount must be greater than zero")]
    InvalidPoints,

    /// An error occurred while communicating with the actor system.
    #[error("Actor communication error: {0}")]
    ActorCommunicationError(String),
}

impl From<String> for CustomerError {
    fn from(msg: String) -> Self {
        CustomerError::ActorCommunicationError(msg)
    }
}
