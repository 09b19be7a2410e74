//! # System Lifecycle & Orchestration
//!
//! Starts, wires and stops the storefront's actors.
//!
//! ## Wiring
//!
//! The actors form a small dependency graph resolved by context injection at `run()` time:
//!
//! ```text
//! Cart actor      Context = LocalStore      (persists after every mutation)
//! Customer actor  Context = ()
//! Order actor     Context = CustomerClient  (debits points inside on_create)
//! ```
//!
//! [`StorefrontSystem::start`] restores the persisted cart before the cart actor starts, so the
//! first message already sees it.
//!
//! ## Shutdown
//!
//! Dropping every client closes the actors' channels; each actor then leaves its loop and
//! [`StorefrontSystem::shutdown`] awaits the tasks. Clones of a client held elsewhere (a live
//! [`OrderTracker`](crate::tracking::OrderTracker), a checkout session) keep their actor alive,
//! so drop those first.
//!
//! ## Observability
//!
//! [`setup_tracing`] installs the subscriber once per process.

pub mod storefront_system;
pub mod tracing;

pub use self::storefront_system::{StorefrontSystem, SystemError};
pub use self::tracing::setup_tracing;
