//! Entity trait implementation for the Order domain type.
//!
//! `on_create` is where placement becomes atomic: the loyalty debit runs before the order is
//! stored, and a failed debit means the order never exists.

use super::error::OrderError;
use crate::clients::CustomerClient;
use crate::model::{Order, OrderCreate, OrderId, OrderPatch, OrderStatus, PaymentStatus};
use actor_framework::ActorEntity;
use async_trait::async_trait;
use chrono::Utc;
use tracing::info;

#[async_trait]
impl ActorEntity for Order {
    type Id = OrderId;
    type Create = OrderCreate;
    type Update = OrderPatch;
    type Action = ();
    type ActionResult = ();
    type Context = CustomerClient;
    type Error = OrderError;

    /// Builds a `pending` order after checking the figures add up.
    fn from_create_params(id: OrderId, params: OrderCreate) -> Result<Self, Self::Error> {
        if params.items.is_empty() {
            return Err(OrderError::ValidationError("order has no items".into()));
        }
        let subtotal: u64 = params.items.iter().map(|item| item.line_total()).sum();
        if subtotal != params.subtotal {
            return Err(OrderError::ValidationError(format!(
                "subtotal {} does not match items ({subtotal})",
                params.subtotal
            )));
        }
        let (points_redeemed, points_discount) = params
            .redemption
            .map_or((0, 0), |r| (r.points, r.discount));
        if points_redeemed > 0 && params.customer_id.is_none() {
            return Err(OrderError::ValidationError(
                "points redeemed without a customer".into(),
            ));
        }
        let expected_total = (params.subtotal + params.tax).saturating_sub(points_discount);
        if params.total != expected_total {
            return Err(OrderError::ValidationError(format!(
                "total {} does not match {expected_total}",
                params.total
            )));
        }

        let now = Utc::now();
        Ok(Self {
            id,
            brand_id: params.brand_id,
            store: params.store,
            customer_id: params.customer_id,
            customer_name: params.customer_name,
            customer_phone: params.customer_phone,
            items: params.items,
            subtotal: params.subtotal,
            tax: params.tax,
            points_redeemed,
            points_discount,
            total: params.total,
            status: OrderStatus::Pending,
            payment_status: PaymentStatus::Pending,
            pickup_window: params.pickup_window,
            created_at: now,
            updated_at: now,
        })
    }

    fn idempotency_key(params: &OrderCreate) -> Option<String> {
        Some(params.idempotency_key.clone())
    }

    /// Debits redeemed points from the customer's loyalty account.
    async fn on_create(&mut self, customers: &CustomerClient) -> Result<(), Self::Error> {
        let Some(customer_id) = self.customer_id else {
            return Ok(());
        };
        if self.points_redeemed == 0 {
            return Ok(());
        }
        let row = customers
            .spend_points(customer_id, Some(self.id), self.points_redeemed)
            .await?;
        info!(order_id = %self.id, %customer_id, spent = row.points_spent, balance = row.balance, "Points debited");
        Ok(())
    }

    /// Applies a fulfillment patch; `updated_at` only moves when something changed.
    async fn on_update(&mut self, patch: OrderPatch, _ctx: &CustomerClient) -> Result<(), Self::Error> {
        if self.apply(&patch) {
            self.updated_at = Utc::now();
        }
        Ok(())
    }

    async fn handle_action(&mut self, _action: (), _ctx: &CustomerClient) -> Result<(), Self::Error> {
        Ok(())
    }
}
