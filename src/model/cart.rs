/// The customer's in-progress selection.
///
/// # Actor Framework
/// This struct implements the [`ActorEntity`](actor_framework::ActorEntity) trait,
/// allowing it to be managed by a [`ResourceActor`](actor_framework::ResourceActor).
///
/// See [`impl ActorEntity for Cart`](#impl-ActorEntity-for-Cart) for details on:
/// - Custom actions ([`CartAction`](crate::cart_actor::CartAction))
/// - Persistence after every mutation
use crate::cart_actor::CartError;
use crate::model::{
    MenuItem, MenuItemId, Modifier, ModifierId, ModifierOption, OptionId, PriceBreakdown,
    SelectionType, StoreId,
};
use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// Type-safe identifier for Carts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CartId(pub u32);

impl CartId {
    /// The single cart that belongs to this device.
    pub const LOCAL: CartId = CartId(1);
}

impl Display for CartId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "cart_{}", self.0)
    }
}

/// The options a customer ticked for one modifier, as sent by the menu screen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModifierChoice {
    pub modifier_id: ModifierId,
    pub option_ids: Vec<OptionId>,
}

impl ModifierChoice {
    pub fn new(modifier_id: impl Into<String>, option_ids: &[&str]) -> Self {
        Self {
            modifier_id: ModifierId::new(modifier_id),
            option_ids: option_ids.iter().map(|id| OptionId::new(*id)).collect(),
        }
    }
}

/// A validated modifier selection stored on a cart line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModifierSelection {
    pub modifier_id: ModifierId,
    pub modifier_name: String,
    pub options: Vec<ModifierOption>,
}

impl ModifierSelection {
    pub fn price(&self) -> u64 {
        self.options.iter().map(|option| option.price).sum()
    }
}

/// The modifier half of a line's identity: `modifier:option,option|modifier:option`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ModifierKey(String);

impl ModifierKey {
    pub fn from_selections(selections: &[ModifierSelection]) -> Self {
        let key = selections
            .iter()
            .map(|selection| {
                let options: Vec<&str> =
                    selection.options.iter().map(|option| option.id.as_str()).collect();
                format!("{}:{}", selection.modifier_id, options.join(","))
            })
            .collect::<Vec<_>>()
            .join("|");
        Self(key)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for ModifierKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identity of a cart line: two lines are the same line iff their keys are equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LineKey {
    pub item_id: MenuItemId,
    pub modifier_key: ModifierKey,
}

impl Display for LineKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}__{}", self.item_id, self.modifier_key)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartLine {
    pub item: MenuItem,
    pub quantity: u32,
    pub selections: Vec<ModifierSelection>,
}

impl CartLine {
    pub fn key(&self) -> LineKey {
        LineKey {
            item_id: self.item.id.clone(),
            modifier_key: ModifierKey::from_selections(&self.selections),
        }
    }

    /// Sum of the selected option prices for one unit.
    pub fn modifier_total(&self) -> u64 {
        self.selections.iter().map(ModifierSelection::price).sum()
    }

    pub fn unit_price(&self) -> u64 {
        self.item.price + self.modifier_total()
    }

    pub fn line_total(&self) -> u64 {
        self.unit_price() * u64::from(self.quantity)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cart {
    pub id: CartId,
    lines: Vec<CartLine>,
    store_id: Option<StoreId>,
}

impl Cart {
    pub fn new(id: CartId) -> Self {
        Self {
            id,
            lines: Vec::new(),
            store_id: None,
        }
    }

    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    /// The store every line belongs to; `None` while the cart is empty.
    pub fn store_id(&self) -> Option<&StoreId> {
        self.store_id.as_ref()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Adds one unit of `item` with the given modifier choices, browsed at `store`.
    ///
    /// An identical line (same item, same selections) has its quantity bumped; otherwise a
    /// new line is appended and, for the first line, the cart is bound to `store`. Every
    /// check runs before anything is touched, so an error leaves the cart unchanged.
    pub fn add_line(
        &mut self,
        store: &StoreId,
        item: &MenuItem,
        modifiers: &[Modifier],
        choices: &[ModifierChoice],
    ) -> Result<LineKey, CartError> {
        if let Some(bound) = &self.store_id {
            if !self.lines.is_empty() && bound != store {
                return Err(CartError::CrossStore {
                    bound: bound.clone(),
                    attempted: store.clone(),
                });
            }
        }
        if !item.is_sold_at(store) {
            return Err(CartError::NotSoldAtStore {
                item: item.id.clone(),
                store: store.clone(),
            });
        }
        if !item.available {
            return Err(CartError::Unavailable(item.id.clone()));
        }

        let selections = resolve_selections(item, modifiers, choices)?;
        let candidate = CartLine {
            item: item.clone(),
            quantity: 1,
            selections,
        };
        let key = candidate.key();

        match self.lines.iter_mut().find(|line| line.key() == key) {
            Some(existing) => existing.quantity = existing.quantity.saturating_add(1),
            None => {
                if self.lines.is_empty() {
                    self.store_id = Some(store.clone());
                }
                self.lines.push(candidate);
            }
        }
        Ok(key)
    }

    /// Removes every line for `item_id`, whatever its modifiers. Returns how many went.
    pub fn remove_line(&mut self, item_id: &MenuItemId) -> usize {
        let before = self.lines.len();
        self.lines.retain(|line| &line.item.id != item_id);
        if self.lines.is_empty() {
            self.store_id = None;
        }
        before - self.lines.len()
    }

    /// Overwrites the quantity of one line. `quantity <= 0` behaves like [`Cart::remove_line`].
    ///
    /// Returns `false` when no line matched.
    pub fn set_quantity(
        &mut self,
        item_id: &MenuItemId,
        modifier_key: &ModifierKey,
        quantity: i64,
    ) -> bool {
        if quantity <= 0 {
            return self.remove_line(item_id) > 0;
        }
        let quantity = u32::try_from(quantity).unwrap_or(u32::MAX);
        match self
            .lines
            .iter_mut()
            .find(|line| &line.item.id == item_id && &line.key().modifier_key == modifier_key)
        {
            Some(line) => {
                line.quantity = quantity;
                true
            }
            None => false,
        }
    }

    pub fn clear(&mut self) {
        self.lines.clear();
        self.store_id = None;
    }

    pub fn subtotal(&self) -> u64 {
        self.lines.iter().map(CartLine::line_total).sum()
    }

    pub fn tax(&self) -> u64 {
        self.breakdown().tax
    }

    pub fn total(&self) -> u64 {
        self.breakdown().total
    }

    pub fn breakdown(&self) -> PriceBreakdown {
        PriceBreakdown::from_subtotal(self.subtotal())
    }

    /// Sum of quantities, for badge displays.
    pub fn line_count(&self) -> u32 {
        self.lines.iter().map(|line| line.quantity).sum()
    }

    /// Re-establishes the store binding rule on a cart read back from disk.
    pub(crate) fn restored(mut self, id: CartId) -> Self {
        self.id = id;
        self.lines.retain(|line| line.quantity > 0);
        if self.lines.is_empty() {
            self.store_id = None;
        }
        self
    }
}

/// Validates `choices` against the item's modifiers and returns them in catalog order.
fn resolve_selections(
    item: &MenuItem,
    modifiers: &[Modifier],
    choices: &[ModifierChoice],
) -> Result<Vec<ModifierSelection>, CartError> {
    let own: Vec<&Modifier> = modifiers
        .iter()
        .filter(|modifier| modifier.menu_item_id == item.id)
        .collect();

    let mut picked: Vec<(usize, ModifierSelection)> = Vec::new();
    for choice in choices {
        let (position, modifier) = own
            .iter()
            .enumerate()
            .find(|(_, modifier)| modifier.id == choice.modifier_id)
            .ok_or_else(|| CartError::UnknownModifier {
                item: item.id.clone(),
                modifier: choice.modifier_id.clone(),
            })?;
        if picked.iter().any(|(seen, _)| *seen == position) {
            return Err(CartError::DuplicateModifier(modifier.id.clone()));
        }

        let mut options: Vec<(usize, ModifierOption)> = Vec::new();
        for option_id in &choice.option_ids {
            let (option_position, option) = modifier
                .option_position(option_id)
                .zip(modifier.option(option_id))
                .ok_or_else(|| CartError::UnknownOption {
                    modifier: modifier.id.clone(),
                    option: option_id.clone(),
                })?;
            if !options.iter().any(|(seen, _)| *seen == option_position) {
                options.push((option_position, option.clone()));
            }
        }
        if modifier.selection_type == SelectionType::Single && options.len() > 1 {
            return Err(CartError::TooManyOptions(modifier.id.clone()));
        }
        if options.is_empty() {
            continue;
        }
        options.sort_by_key(|(option_position, _)| *option_position);
        picked.push((
            position,
            ModifierSelection {
                modifier_id: modifier.id.clone(),
                modifier_name: modifier.name.clone(),
                options: options.into_iter().map(|(_, option)| option).collect(),
            },
        ));
    }

    if let Some(missing) = own.iter().enumerate().find(|(position, modifier)| {
        modifier.required && !picked.iter().any(|(seen, _)| seen == position)
    }) {
        return Err(CartError::MissingRequired(missing.1.id.clone()));
    }

    picked.sort_by_key(|(position, _)| *position);
    Ok(picked.into_iter().map(|(_, selection)| selection).collect())
}
