//! # Cart Actor
//!
//! Holds the device-local cart and serializes every mutation through one task, so rapid
//! repeated adds are applied one after another against the latest state.
//!
//! ## Structure
//!
//! - [`entity`] - [`ActorEntity`](actor_framework::ActorEntity) implementation for [`Cart`]
//! - [`error`] - [`CartError`] type for type-safe error handling
//! - [`actions`] - [`CartAction`] and [`CartActionResult`]
//! - [`new()`] / [`restore()`] - create the actor, optionally from the persisted cart
//!
//! ## Persistence
//!
//! The actor's `Context` is a [`LocalStore`](crate::storage::LocalStore). The cart is loaded
//! once at startup with [`restore()`] and saved after every mutation.

pub mod actions;
pub mod entity;
pub mod error;

pub use actions::*;
pub use entity::CartCreate;
pub use error::*;

use crate::clients::CartClient;
use crate::model::{Cart, CartId};
use crate::storage::{LocalStore, StorageError, CART_KEY};
use actor_framework::ResourceActor;
use std::sync::atomic::{AtomicU32, Ordering};
use tracing::{info, warn};

/// Creates a new Cart actor holding an empty local cart, plus its client.
pub fn new(buffer: usize) -> (ResourceActor<Cart>, CartClient) {
    with_cart(buffer, Cart::new(CartId::LOCAL))
}

/// Creates a Cart actor seeded with `cart`.
pub fn with_cart(buffer: usize, cart: Cart) -> (ResourceActor<Cart>, CartClient) {
    let cart_id_counter = AtomicU32::new(CartId::LOCAL.0 + 1);
    let next_cart_id = move || CartId(cart_id_counter.fetch_add(1, Ordering::SeqCst));

    let (mut actor, generic_client) = ResourceActor::new(buffer, next_cart_id);
    actor.seed(cart.id, cart);
    (actor, CartClient::new(generic_client))
}

/// Reads the persisted cart, falling back to an empty one.
///
/// An unreadable document is logged and replaced rather than blocking startup.
pub async fn restore(store: &LocalStore) -> Result<Cart, StorageError> {
    match store.load::<Cart>(CART_KEY).await {
        Ok(Some(cart)) => {
            let cart = cart.restored(CartId::LOCAL);
            info!(lines = cart.lines().len(), "Restored cart");
            Ok(cart)
        }
        Ok(None) => Ok(Cart::new(CartId::LOCAL)),
        Err(StorageError::Serde { key, source }) => {
            warn!(key, error = %source, "Discarding unreadable cart");
            Ok(Cart::new(CartId::LOCAL))
        }
        Err(e) => Err(e),
    }
}
