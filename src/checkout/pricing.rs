//! Points redemption arithmetic.
//!
//! All divisions floor. Over-requests are capped silently, never rejected.

use crate::model::LoyaltyConfig;
use serde::{Deserialize, Serialize};

/// How a redemption request resolves against one order total and one balance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RedemptionQuote {
    pub requested: u64,
    /// `floor(total * ratio / 100)`
    pub max_by_order_value: u64,
    /// `min(balance, max_by_order_value)`
    pub max_redeemable: u64,
    /// The request clamped into `[0, max_redeemable]`.
    pub points: u64,
    /// `floor(points * 100 / ratio)`
    pub discount: u64,
    /// `max(0, total - discount)`
    pub final_total: u64,
}

/// Resolves `requested` points against `total` and `balance`.
///
/// With loyalty switched off nothing is redeemable and the total is unchanged.
pub fn quote_redemption(
    total: u64,
    balance: u64,
    requested: u64,
    loyalty: &LoyaltyConfig,
) -> RedemptionQuote {
    if !loyalty.is_active() {
        return RedemptionQuote {
            requested,
            final_total: total,
            ..RedemptionQuote::default()
        };
    }
    let ratio = loyalty.points_to_currency_ratio;
    let max_by_order_value = total.saturating_mul(ratio) / 100;
    let max_redeemable = balance.min(max_by_order_value);
    let points = requested.min(max_redeemable);
    let discount = points.saturating_mul(100) / ratio;
    RedemptionQuote {
        requested,
        max_by_order_value,
        max_redeemable,
        points,
        discount,
        final_total: apply_discount(total, discount),
    }
}

/// `total - discount`, floored at zero.
pub fn apply_discount(total: u64, discount: u64) -> u64 {
    total.saturating_sub(discount)
}
