//! Integer money arithmetic.
//!
//! Every amount is a `u64` in minor currency units. There is no floating point anywhere on the
//! pricing path, so a preview and the persisted order always agree.

/// Tax rate applied to the subtotal, in percent.
pub const TAX_RATE_PERCENT: u64 = 10;

/// Tax owed on `subtotal`: 10%, rounded half-up to the nearest unit.
pub fn tax_for(subtotal: u64) -> u64 {
    (subtotal * TAX_RATE_PERCENT + 50) / 100
}

/// Subtotal, tax and total of a cart at one moment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
pub struct PriceBreakdown {
    pub subtotal: u64,
    pub tax: u64,
    pub total: u64,
}

impl PriceBreakdown {
    pub fn from_subtotal(subtotal: u64) -> Self {
        let tax = tax_for(subtotal);
        Self {
            subtotal,
            tax,
            total: subtotal + tax,
        }
    }
}
