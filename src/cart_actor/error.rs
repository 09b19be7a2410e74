//! Error types for the Cart actor.

use crate::model::{MenuItemId, ModifierId, OptionId, StoreId};
use thiserror::Error;

/// Errors that can occur during cart operations.
///
/// Everything except `Storage` and `ActorCommunicationError` is a usage error: it is raised
/// before the cart is touched.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum CartError {
    /// The cart already holds lines from another store.
    #[error("Cart is bound to store {bound}; cannot add an item from store {attempted}")]
    CrossStore { bound: StoreId, attempted: StoreId },

    /// The item belongs to a different store than the one it was added from.
    #[error("Item {item} is not sold at store {store}")]
    NotSoldAtStore { item: MenuItemId, store: StoreId },

    #[error("Item {0} is not available")]
    Unavailable(MenuItemId),

    #[error("Modifier {modifier} does not belong to item {item}")]
    UnknownModifier { item: MenuItemId, modifier: ModifierId },

    #[error("Option {option} does not belong to modifier {modifier}")]
    UnknownOption { modifier: ModifierId, option: OptionId },

    #[error("Modifier {0} was chosen twice")]
    DuplicateModifier(ModifierId),

    /// A `single` modifier received more than one option.
    #[error("Modifier {0} accepts a single option")]
    TooManyOptions(ModifierId),

    #[error("Modifier {0} is required")]
    MissingRequired(ModifierId),

    /// The change could not be persisted and was rolled back.
    #[error("Cart storage error: {0}")]
    Storage(String),

    /// An error occurred while communicating with the actor system.
    #[error("Actor communication error: {0}")]
    ActorCommunicationError(String),
}

impl From<String> for CartError {
    fn from(msg: String) -> Self {
        CartError::ActorCommunicationError(msg)
    }
}
