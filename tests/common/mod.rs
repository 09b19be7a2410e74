//! Fixtures shared by the integration tests.
#![allow(dead_code)]

use chrono::Utc;
use storefront_checkout::catalog::CatalogSnapshot;
use storefront_checkout::config::StorefrontConfig;
use storefront_checkout::model::{
    BrandId, MenuItem, MenuItemId, OrderCreate, OrderItem, PickupWindow, PriceBreakdown,
    Redemption, StoreId, StoreSummary, CustomerId,
};
use std::path::PathBuf;
use std::time::Duration;

pub fn fixture_catalog_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("fixtures/demo_catalog.json")
}

pub fn catalog() -> CatalogSnapshot {
    let text = std::fs::read_to_string(fixture_catalog_path()).unwrap();
    CatalogSnapshot::from_json(&text).unwrap()
}

pub fn config(data_dir: &std::path::Path) -> StorefrontConfig {
    StorefrontConfig {
        data_dir: data_dir.to_path_buf(),
        catalog_path: fixture_catalog_path(),
        submit_timeout: Duration::from_secs(5),
        ..StorefrontConfig::default()
    }
}

pub fn gangnam() -> StoreId {
    StoreId::new("store_gangnam")
}

pub fn item(catalog: &CatalogSnapshot, id: &str) -> MenuItem {
    catalog.item(&MenuItemId::new(id)).unwrap().clone()
}

/// A one-item order for `store_gangnam` worth 4000 + 400 tax.
pub fn order_params(key: &str, customer_id: Option<CustomerId>, points: u64) -> OrderCreate {
    let breakdown = PriceBreakdown::from_subtotal(4_000);
    OrderCreate {
        idempotency_key: key.to_string(),
        brand_id: BrandId::new("brand_bean"),
        store: StoreSummary {
            id: gangnam(),
            name: "Bean House Gangnam".into(),
            address: None,
            phone: None,
        },
        customer_id,
        customer_name: "Kim".into(),
        customer_phone: "01012345678".into(),
        items: vec![OrderItem {
            menu_item_id: MenuItemId::new("item_americano"),
            name: "Americano".into(),
            quantity: 1,
            unit_price: 4_000,
            modifier_total: 0,
            modifiers: Vec::new(),
        }],
        subtotal: breakdown.subtotal,
        tax: breakdown.tax,
        redemption: (points > 0).then_some(Redemption {
            points,
            discount: points,
        }),
        total: breakdown.total - points,
        pickup_window: PickupWindow::after(Utc::now(), 20),
    }
}
