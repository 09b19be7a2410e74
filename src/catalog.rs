//! # Catalog Snapshot
//!
//! Read-only view of brands, stores, categories, menu items and modifiers, loaded once from
//! a JSON document. The cart and checkout only ever read from it.
//!
//! Store-scoped queries follow the "this store or every store" rule: a category or item with
//! no `store_id` is shown at every store of its brand.

use crate::model::{
    Brand, BrandId, Category, LoyaltyConfig, MenuItem, MenuItemId, Modifier, Store, StoreId,
    StoreStatus, StoreSummary,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Could not read catalog {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Malformed catalog: {0}")]
    Parse(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CatalogSnapshot {
    #[serde(default)]
    pub brands: Vec<Brand>,
    #[serde(default)]
    pub stores: Vec<Store>,
    #[serde(default)]
    pub categories: Vec<Category>,
    #[serde(default)]
    pub items: Vec<MenuItem>,
    #[serde(default)]
    pub modifiers: Vec<Modifier>,
}

impl CatalogSnapshot {
    pub async fn from_path(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let path = path.as_ref();
        let text = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| CatalogError::Io {
                path: path.to_path_buf(),
                source,
            })?;
        let catalog = Self::from_json(&text)?;
        info!(
            path = %path.display(),
            brands = catalog.brands.len(),
            stores = catalog.stores.len(),
            items = catalog.items.len(),
            "Catalog loaded"
        );
        Ok(catalog)
    }

    pub fn from_json(text: &str) -> Result<Self, CatalogError> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn brand(&self, id: &BrandId) -> Option<&Brand> {
        self.brands.iter().find(|brand| &brand.id == id)
    }

    pub fn brand_by_slug(&self, slug: &str) -> Option<&Brand> {
        self.brands.iter().find(|brand| brand.slug == slug)
    }

    pub fn store(&self, id: &StoreId) -> Option<&Store> {
        self.stores.iter().find(|store| &store.id == id)
    }

    /// Stores of a brand in the given status, by name.
    pub fn stores_for_brand(&self, brand: &BrandId, status: StoreStatus) -> Vec<&Store> {
        let mut stores: Vec<&Store> = self
            .stores
            .iter()
            .filter(|store| &store.brand_id == brand && store.status == status)
            .collect();
        stores.sort_by(|a, b| a.name.cmp(&b.name));
        stores
    }

    /// Categories shown at `store`, by display order.
    pub fn categories_for_store(&self, store: &Store) -> Vec<&Category> {
        let mut categories: Vec<&Category> = self
            .categories
            .iter()
            .filter(|category| {
                category.brand_id == store.brand_id
                    && category.store_id.as_ref().map_or(true, |own| own == &store.id)
            })
            .collect();
        categories.sort_by_key(|category| category.display_order);
        categories
    }

    /// Available items sold at `store`, by name.
    pub fn items_for_store(&self, store: &Store) -> Vec<&MenuItem> {
        let mut items: Vec<&MenuItem> = self
            .items
            .iter()
            .filter(|item| {
                item.available && item.brand_id == store.brand_id && item.is_sold_at(&store.id)
            })
            .collect();
        items.sort_by(|a, b| a.name.cmp(&b.name));
        items
    }

    pub fn item(&self, id: &MenuItemId) -> Option<&MenuItem> {
        self.items.iter().find(|item| &item.id == id)
    }

    /// Modifiers of an item in catalog order.
    pub fn modifiers_for_item(&self, item: &MenuItemId) -> Vec<Modifier> {
        self.modifiers
            .iter()
            .filter(|modifier| &modifier.menu_item_id == item)
            .cloned()
            .collect()
    }

    /// The loyalty flag of the brand that owns `store`.
    pub fn loyalty_for_store(&self, store: &StoreId) -> Option<LoyaltyConfig> {
        let store = self.store(store)?;
        self.brand(&store.brand_id).map(|brand| brand.loyalty)
    }

    pub fn store_summary(&self, store: &StoreId) -> Option<StoreSummary> {
        self.store(store).map(StoreSummary::from)
    }
}
