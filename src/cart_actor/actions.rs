//! Custom actions for the Cart actor.
//!
//! Every cart mutation is one action, so the actor applies it as a single read-modify-write
//! against the current cart no matter how quickly the UI fires them.

use crate::model::{
    Cart, LineKey, MenuItem, MenuItemId, Modifier, ModifierChoice, ModifierKey, StoreId,
};

#[derive(Debug, Clone)]
pub enum CartAction {
    /// Adds one unit; see [`Cart::add_line`].
    AddLine {
        store: StoreId,
        item: MenuItem,
        modifiers: Vec<Modifier>,
        choices: Vec<ModifierChoice>,
    },
    RemoveLine(MenuItemId),
    SetQuantity {
        item_id: MenuItemId,
        modifier_key: ModifierKey,
        quantity: i64,
    },
    Clear,
    /// Read-only copy of the current cart.
    Snapshot,
}

/// Results from CartActions - variants match 1:1 with CartAction
#[derive(Debug, Clone)]
pub enum CartActionResult {
    AddLine(LineKey),
    /// Number of lines removed.
    RemoveLine(usize),
    /// Whether a line matched.
    SetQuantity(bool),
    Clear(()),
    Snapshot(Cart),
}
