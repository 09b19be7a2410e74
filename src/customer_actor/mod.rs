//! # Customer Actor
//!
//! Customers and their loyalty accounts. Stands in for the remote customer and ledger
//! tables: the order actor debits points through it, the auth flow finds or creates
//! customers by phone.
//!
//! ## Structure
//!
//! - [`entity`] - [`ActorEntity`](actor_framework::ActorEntity) implementation for [`Customer`]
//! - [`error`] - [`CustomerError`]
//! - [`actions`] - [`CustomerAction`] and [`CustomerActionResult`]
//!
//! ## Usage
//!
//! ```rust
//! use storefront_checkout::customer_actor;
//! use storefront_checkout::model::CustomerCreate;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let (actor, client) = customer_actor::new(32);
//!     tokio::spawn(actor.run(()));
//!
//!     let id = client
//!         .create_customer(CustomerCreate { phone: "010-1234-5678".into(), name: None })
//!         .await?;
//!     client.earn_points(id, None, 500).await?;
//!     assert_eq!(client.account(id).await?, 500);
//!     Ok(())
//! }
//! ```

pub mod actions;
pub mod entity;
pub mod error;

pub use actions::*;
pub use error::*;

use crate::clients::CustomerClient;
use crate::model::{Customer, CustomerId};
use actor_framework::ResourceActor;
use std::sync::atomic::{AtomicU32, Ordering};

/// Creates a new Customer actor and its client.
pub fn new(buffer: usize) -> (ResourceActor<Customer>, CustomerClient) {
    let customer_id_counter = AtomicU32::new(1);
    let next_customer_id = move || CustomerId(customer_id_counter.fetch_add(1, Ordering::SeqCst));

    let (actor, generic_client) = ResourceActor::new(buffer, next_customer_id);
    (actor, CustomerClient::new(generic_client))
}
