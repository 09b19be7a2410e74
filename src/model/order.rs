/// A placed order.
///
/// # Actor Framework
/// This struct implements the [`ActorEntity`](actor_framework::ActorEntity) trait,
/// allowing it to be managed by a [`ResourceActor`](actor_framework::ResourceActor).
///
/// See [`impl ActorEntity for Order`](#impl-ActorEntity-for-Order) for details on:
/// - Creation parameters ([`OrderCreate`])
/// - Update parameters ([`OrderPatch`]), applied only by fulfillment
use crate::model::{BrandId, CartLine, CustomerId, MenuItemId, ModifierId, OptionId, StoreSummary};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use uuid::Uuid;

/// Type-safe identifier for Orders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderId(pub Uuid);

impl OrderId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for OrderId {
    fn default() -> Self {
        Self::new()
    }
}

impl Display for OrderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Fulfillment state of an order.
///
/// The forward path is [`OrderStatus::FORWARD`]; `Cancelled` and `PaymentIssue` are side
/// states. Which transitions are legal is decided by the fulfillment process, not here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Pending,
    Waiting,
    Confirmed,
    Preparing,
    Ready,
    Completed,
    Cancelled,
    PaymentIssue,
}

/// Where a status sits relative to the forward path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Progress {
    /// Zero-based position on the forward path.
    Step { index: usize, total: usize },
    /// Cancelled or stuck on payment; rendered apart from the numbered steps.
    OffPath,
}

impl OrderStatus {
    pub const FORWARD: [OrderStatus; 6] = [
        OrderStatus::Pending,
        OrderStatus::Waiting,
        OrderStatus::Confirmed,
        OrderStatus::Preparing,
        OrderStatus::Ready,
        OrderStatus::Completed,
    ];

    pub fn progress(self) -> Progress {
        match Self::FORWARD.iter().position(|status| *status == self) {
            Some(index) => Progress::Step {
                index,
                total: Self::FORWARD.len(),
            },
            None => Progress::OffPath,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            OrderStatus::Pending => "대기 중",
            OrderStatus::Waiting => "접수 대기",
            OrderStatus::Confirmed => "접수 완료",
            OrderStatus::Preparing => "준비 중",
            OrderStatus::Ready => "픽업 대기",
            OrderStatus::Completed => "완료",
            OrderStatus::Cancelled => "취소됨",
            OrderStatus::PaymentIssue => "결제 문제",
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, OrderStatus::Completed | OrderStatus::Cancelled)
    }
}

impl Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Pending,
    Paid,
    Failed,
    Refunded,
}

/// Minutes between the start and the end of a pickup window.
pub const PICKUP_WINDOW_MINUTES: i64 = 10;

/// `[start, end)` range in which the order should be ready.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PickupWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl PickupWindow {
    pub fn after(now: DateTime<Utc>, delay_minutes: u32) -> Self {
        let start = now + Duration::minutes(i64::from(delay_minutes));
        Self {
            start,
            end: start + Duration::minutes(PICKUP_WINDOW_MINUTES),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderItemModifier {
    pub modifier_id: ModifierId,
    pub option_ids: Vec<OptionId>,
}

/// Snapshot of a cart line at submission. Later catalog edits never reach it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderItem {
    pub menu_item_id: MenuItemId,
    pub name: String,
    pub quantity: u32,
    /// Base item price, without modifiers.
    pub unit_price: u64,
    /// Selected option prices for one unit.
    pub modifier_total: u64,
    pub modifiers: Vec<OrderItemModifier>,
}

impl OrderItem {
    pub fn line_total(&self) -> u64 {
        (self.unit_price + self.modifier_total) * u64::from(self.quantity)
    }
}

impl From<&CartLine> for OrderItem {
    fn from(line: &CartLine) -> Self {
        Self {
            menu_item_id: line.item.id.clone(),
            name: line.item.name.clone(),
            quantity: line.quantity,
            unit_price: line.item.price,
            modifier_total: line.modifier_total(),
            modifiers: line
                .selections
                .iter()
                .map(|selection| OrderItemModifier {
                    modifier_id: selection.modifier_id.clone(),
                    option_ids: selection.options.iter().map(|o| o.id.clone()).collect(),
                })
                .collect(),
        }
    }
}

/// Points applied to an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Redemption {
    pub points: u64,
    pub discount: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub brand_id: BrandId,
    pub store: StoreSummary,
    pub customer_id: Option<CustomerId>,
    pub customer_name: String,
    pub customer_phone: String,
    pub items: Vec<OrderItem>,
    pub subtotal: u64,
    pub tax: u64,
    pub points_redeemed: u64,
    pub points_discount: u64,
    /// Amount due after the points discount.
    pub total: u64,
    pub status: OrderStatus,
    pub payment_status: PaymentStatus,
    pub pickup_window: PickupWindow,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Order {
    /// Merges the fields present in `patch`. Returns whether anything changed, so applying
    /// the same patch twice is a no-op the second time.
    pub fn apply(&mut self, patch: &OrderPatch) -> bool {
        let mut changed = false;
        if let Some(status) = patch.status {
            changed |= self.status != status;
            self.status = status;
        }
        if let Some(payment_status) = patch.payment_status {
            changed |= self.payment_status != payment_status;
            self.payment_status = payment_status;
        }
        changed
    }
}

/// Payload for creating a new order.
#[derive(Debug, Clone)]
pub struct OrderCreate {
    /// One key per checkout session; a repeated key returns the order already placed.
    pub idempotency_key: String,
    pub brand_id: BrandId,
    pub store: StoreSummary,
    pub customer_id: Option<CustomerId>,
    pub customer_name: String,
    pub customer_phone: String,
    pub items: Vec<OrderItem>,
    pub subtotal: u64,
    pub tax: u64,
    pub redemption: Option<Redemption>,
    pub total: u64,
    pub pickup_window: PickupWindow,
}

/// Partial update from the fulfillment side. Absent fields are left as they are.
///
/// Unknown fields in a raw change payload are ignored on decode; an unknown status value is a
/// decode error.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<OrderStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_status: Option<PaymentStatus>,
}

impl OrderPatch {
    pub fn status(status: OrderStatus) -> Self {
        Self {
            status: Some(status),
            payment_status: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_progress_on_and_off_path() {
        assert_eq!(
            OrderStatus::Pending.progress(),
            Progress::Step { index: 0, total: 6 }
        );
        assert_eq!(
            OrderStatus::Ready.progress(),
            Progress::Step { index: 4, total: 6 }
        );
        assert_eq!(OrderStatus::Cancelled.progress(), Progress::OffPath);
        assert_eq!(OrderStatus::PaymentIssue.progress(), Progress::OffPath);
    }

    #[test]
    fn test_terminal_states() {
        assert!(OrderStatus::Completed.is_terminal());
        assert!(OrderStatus::Cancelled.is_terminal());
        assert!(!OrderStatus::PaymentIssue.is_terminal());
        assert!(!OrderStatus::Ready.is_terminal());
    }

    #[test]
    fn test_patch_decodes_wire_names_and_ignores_other_fields() {
        let patch: OrderPatch = serde_json::from_value(serde_json::json!({
            "id": "whatever",
            "status": "payment_issue",
            "total": 4500
        }))
        .unwrap();
        assert_eq!(patch.status, Some(OrderStatus::PaymentIssue));
        assert_eq!(patch.payment_status, None);

        let unknown = serde_json::from_value::<OrderPatch>(serde_json::json!({
            "status": "teleported"
        }));
        assert!(unknown.is_err());
    }

    #[test]
    fn test_pickup_window_is_ten_minutes_after_delay() {
        let now = Utc::now();
        let window = PickupWindow::after(now, 30);
        assert_eq!(window.start - now, Duration::minutes(30));
        assert_eq!(window.end - window.start, Duration::minutes(10));
    }
}
