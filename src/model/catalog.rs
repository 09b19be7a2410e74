//! Catalog records: brands, stores, categories, menu items and their modifiers.
//!
//! These are read-only facts from the cart's point of view. Ids are opaque strings wrapped in
//! newtypes so a store id can never be passed where a menu item id is expected.

use serde::{Deserialize, Serialize};
use std::fmt::Display;

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

string_id!(
    /// Identifies a white-label brand.
    BrandId
);
string_id!(
    /// Identifies one store of a brand.
    StoreId
);
string_id!(CategoryId);
string_id!(MenuItemId);
string_id!(ModifierId);
string_id!(OptionId);

/// Points-to-currency ratio used when a brand does not configure one.
pub const DEFAULT_POINTS_RATIO: u64 = 100;

fn default_points_ratio() -> u64 {
    DEFAULT_POINTS_RATIO
}

/// A brand's loyalty feature flag.
///
/// `points_to_currency_ratio` is how many points buy one hundred minor units of discount:
/// with the default of 100, one point is worth one unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoyaltyConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default = "default_points_ratio")]
    pub points_to_currency_ratio: u64,
}

impl Default for LoyaltyConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            points_to_currency_ratio: DEFAULT_POINTS_RATIO,
        }
    }
}

impl LoyaltyConfig {
    /// Redemption is only possible with the flag on and a usable ratio.
    pub fn is_active(&self) -> bool {
        self.enabled && self.points_to_currency_ratio > 0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Brand {
    pub id: BrandId,
    pub slug: String,
    pub name: String,
    #[serde(default)]
    pub loyalty: LoyaltyConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreStatus {
    Active,
    Inactive,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Store {
    pub id: StoreId,
    pub brand_id: BrandId,
    pub name: String,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    pub status: StoreStatus,
}

/// The part of a store an order read carries along.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreSummary {
    pub id: StoreId,
    pub name: String,
    pub address: Option<String>,
    pub phone: Option<String>,
}

impl From<&Store> for StoreSummary {
    fn from(store: &Store) -> Self {
        Self {
            id: store.id.clone(),
            name: store.name.clone(),
            address: store.address.clone(),
            phone: store.phone.clone(),
        }
    }
}

/// A menu category. `store_id == None` means it is shown at every store of the brand.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub brand_id: BrandId,
    #[serde(default)]
    pub store_id: Option<StoreId>,
    pub name: String,
    #[serde(default)]
    pub display_order: i32,
}

/// A menu item. `store_id == None` means it is sold at every store of the brand.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MenuItem {
    pub id: MenuItemId,
    pub brand_id: BrandId,
    #[serde(default)]
    pub store_id: Option<StoreId>,
    #[serde(default)]
    pub category_id: Option<CategoryId>,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub price: u64,
    pub available: bool,
}

impl MenuItem {
    /// Whether the item may be put in a cart bound to `store`.
    pub fn is_sold_at(&self, store: &StoreId) -> bool {
        self.store_id.as_ref().map_or(true, |own| own == store)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SelectionType {
    /// At most one option per cart line.
    Single,
    /// Zero or more options per cart line.
    Multiple,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModifierOption {
    pub id: OptionId,
    pub name: String,
    pub price: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Modifier {
    pub id: ModifierId,
    pub menu_item_id: MenuItemId,
    pub name: String,
    pub selection_type: SelectionType,
    #[serde(default)]
    pub required: bool,
    pub options: Vec<ModifierOption>,
}

impl Modifier {
    pub fn option(&self, id: &OptionId) -> Option<&ModifierOption> {
        self.options.iter().find(|option| &option.id == id)
    }

    /// Position of an option in the modifier's declared order.
    pub fn option_position(&self, id: &OptionId) -> Option<usize> {
        self.options.iter().position(|option| &option.id == id)
    }
}
