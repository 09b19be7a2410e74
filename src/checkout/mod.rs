//! # Checkout
//!
//! Turns the cart into a placed order.
//!
//! - [`pricing`] - redemption bounds and discount arithmetic
//! - [`session`] - [`CheckoutSession`]: validation, single-flight submit, timeouts
//! - [`error`] - [`CheckoutError`] and the failure taxonomy
//!
//! The order insert and the loyalty debit happen in one order-actor message, so a failed
//! debit never leaves an order behind. What can still split is the cart clear after a
//! successful placement; that surfaces as [`CheckoutError::PartialFailure`].

pub mod error;
pub mod pricing;
pub mod session;

pub use error::*;
pub use pricing::*;
pub use session::*;
