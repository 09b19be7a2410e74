//! Error types for checkout.

use crate::model::OrderId;
use std::fmt::Display;
use thiserror::Error;

/// Message shown to the customer for every checkout failure.
pub const GENERIC_FAILURE_MESSAGE: &str = "주문에 실패했습니다. 다시 시도해주세요.";

/// The checkout step a failure happened in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    LoadCart,
    LoadCatalog,
    LoadAccount,
    PlaceOrder,
    ClearCart,
}

impl Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Stage::LoadCart => "load cart",
            Stage::LoadCatalog => "load catalog",
            Stage::LoadAccount => "load loyalty account",
            Stage::PlaceOrder => "place order",
            Stage::ClearCart => "clear cart",
        };
        f.write_str(name)
    }
}

/// Form problems caught before any call is made.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Customer name is required")]
    EmptyName,
    #[error("Invalid phone number: {0}")]
    InvalidPhone(String),
    #[error("Pickup in {0} minutes is not offered")]
    PickupDelayNotOffered(u32),
}

/// Checkout failures, by what the caller may do next.
///
/// Every variant except `PartialFailure` and `SessionCompleted` is safe to retry as is. A retry
/// after `PartialFailure` only finishes the follow-up steps for the order already placed.
/// `SessionCompleted` needs a new session.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum CheckoutError {
    #[error("Invalid checkout form: {0}")]
    Validation(#[from] ValidationError),

    /// Another submit on the same session has not finished.
    #[error("A submission is already in progress")]
    SubmissionInFlight,

    /// A step failed and nothing after it ran.
    #[error("Checkout failed at {stage}: {reason}")]
    Rejected { stage: Stage, reason: String },

    #[error("Checkout timed out at {stage}")]
    Timeout { stage: Stage },

    /// The order exists but a follow-up step did not complete.
    #[error("Order {order_id} was placed but {reason}")]
    PartialFailure { order_id: OrderId, reason: String },

    /// The session already placed its order; open a new one to order again.
    #[error("Checkout already completed with order {order_id}")]
    SessionCompleted { order_id: OrderId },
}

impl CheckoutError {
    /// What the customer sees. Categories exist for logs and support, not for UI copy.
    pub fn user_message(&self) -> &'static str {
        GENERIC_FAILURE_MESSAGE
    }

    pub fn is_partial_failure(&self) -> bool {
        matches!(self, CheckoutError::PartialFailure { .. })
    }

    /// The order id, if the session placed one.
    pub fn placed_order(&self) -> Option<OrderId> {
        match self {
            CheckoutError::PartialFailure { order_id, .. }
            | CheckoutError::SessionCompleted { order_id } => Some(*order_id),
            _ => None,
        }
    }
}
