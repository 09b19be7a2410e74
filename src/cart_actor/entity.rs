//! Entity trait implementation for the Cart domain type.
//!
//! The actor is the cart's only writer; every successful mutation is written through to the
//! [`LocalStore`] before the caller hears back. A failed write rolls the cart back.

use super::actions::{CartAction, CartActionResult};
use super::error::CartError;
use crate::model::{Cart, CartId};
use crate::storage::{LocalStore, CART_KEY};
use actor_framework::ActorEntity;
use async_trait::async_trait;
use tracing::warn;

/// Payload for creating a new (empty) cart.
#[derive(Debug, Clone, Default)]
pub struct CartCreate;

impl Cart {
    async fn persist(&self, store: &LocalStore) -> Result<(), CartError> {
        store
            .save(CART_KEY, self)
            .await
            .map_err(|e| CartError::Storage(e.to_string()))
    }
}

#[async_trait]
impl ActorEntity for Cart {
    type Id = CartId;
    type Create = CartCreate;
    type Update = ();
    type Action = CartAction;
    type ActionResult = CartActionResult;
    type Context = LocalStore;
    type Error = CartError;

    fn from_create_params(id: CartId, _params: CartCreate) -> Result<Self, Self::Error> {
        Ok(Cart::new(id))
    }

    async fn on_update(&mut self, _update: (), _ctx: &LocalStore) -> Result<(), Self::Error> {
        Ok(())
    }

    /// Handles custom actions for the Cart entity.
    ///
    /// # Actions
    /// - `AddLine`, `RemoveLine`, `SetQuantity`, `Clear`: mutate, then persist
    /// - `Snapshot`: returns a copy, touches nothing
    async fn handle_action(
        &mut self,
        action: CartAction,
        store: &LocalStore,
    ) -> Result<CartActionResult, Self::Error> {
        let before = self.clone();
        let result = match action {
            CartAction::Snapshot => return Ok(CartActionResult::Snapshot(before)),
            CartAction::AddLine {
                store: store_id,
                item,
                modifiers,
                choices,
            } => CartActionResult::AddLine(self.add_line(&store_id, &item, &modifiers, &choices)?),
            CartAction::RemoveLine(item_id) => CartActionResult::RemoveLine(self.remove_line(&item_id)),
            CartAction::SetQuantity {
                item_id,
                modifier_key,
                quantity,
            } => CartActionResult::SetQuantity(self.set_quantity(&item_id, &modifier_key, quantity)),
            CartAction::Clear => {
                self.clear();
                CartActionResult::Clear(())
            }
        };

        if *self != before {
            if let Err(e) = self.persist(store).await {
                warn!(cart_id = %self.id, error = %e, "Rolling back unsaved cart change");
                *self = before;
                return Err(e);
            }
        }
        Ok(result)
    }
}
