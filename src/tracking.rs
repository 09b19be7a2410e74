//! # Live Order Tracking
//!
//! [`OrderTracker`] follows one order: it subscribes to the order's change feed, reads the
//! current record, and folds each fulfillment patch into its local copy. The subscription is
//! taken before the read so no change slips between the two.
//!
//! Applying a patch that changes nothing is a no-op, so redelivered or replayed changes are
//! harmless. A lagged feed is resynchronized from the order actor.

use crate::clients::OrderClient;
use crate::model::{Order, OrderId, OrderPatch, OrderStatus, PaymentStatus, PickupWindow, Progress};
use crate::order_actor::OrderError;
use actor_framework::ActorClient;
use futures::stream::{self, Stream};
use thiserror::Error;
use tokio::sync::broadcast::{self, error::RecvError};
use tracing::{debug, info, instrument, warn};

#[derive(Debug, Error)]
pub enum TrackingError {
    #[error("Order not found: {0}")]
    NotFound(OrderId),
    #[error(transparent)]
    Order(#[from] OrderError),
}

/// One step of the forward path as the tracking screen draws it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimelineStep {
    pub status: OrderStatus,
    pub label: &'static str,
    pub reached: bool,
    pub current: bool,
}

/// Render model for the tracking screen.
#[derive(Debug, Clone, PartialEq)]
pub struct TrackingView {
    pub order_id: OrderId,
    pub status: OrderStatus,
    pub label: &'static str,
    pub progress: Progress,
    pub timeline: Vec<TimelineStep>,
    pub payment_status: PaymentStatus,
    pub total: u64,
    pub pickup_window: PickupWindow,
    pub store_name: String,
    /// Cancelled or payment issue; shown apart from the timeline.
    pub off_path: bool,
    /// No further changes are expected.
    pub terminal: bool,
}

impl From<&Order> for TrackingView {
    fn from(order: &Order) -> Self {
        let progress = order.status.progress();
        let current_index = match progress {
            Progress::Step { index, .. } => Some(index),
            Progress::OffPath => None,
        };
        let timeline = OrderStatus::FORWARD
            .iter()
            .enumerate()
            .map(|(index, status)| TimelineStep {
                status: *status,
                label: status.label(),
                reached: current_index.is_some_and(|current| index <= current),
                current: current_index == Some(index),
            })
            .collect();
        Self {
            order_id: order.id,
            status: order.status,
            label: order.status.label(),
            progress,
            timeline,
            payment_status: order.payment_status,
            total: order.total,
            pickup_window: order.pickup_window,
            store_name: order.store.name.clone(),
            off_path: current_index.is_none(),
            terminal: order.status.is_terminal(),
        }
    }
}

pub struct OrderTracker {
    orders: OrderClient,
    order: Order,
    feed: broadcast::Receiver<OrderPatch>,
}

impl OrderTracker {
    /// Subscribes to `id` and loads its current state.
    #[instrument(skip(orders))]
    pub async fn open(orders: OrderClient, id: OrderId) -> Result<Self, TrackingError> {
        let feed = orders.watch(id).await.map_err(|e| not_found(id, e))?;
        let order = orders
            .get(id)
            .await
            .map_err(|e| not_found(id, e))?
            .ok_or(TrackingError::NotFound(id))?;
        info!(status = %order.status, "Tracking order");
        Ok(Self { orders, order, feed })
    }

    pub fn snapshot(&self) -> &Order {
        &self.order
    }

    pub fn view(&self) -> TrackingView {
        TrackingView::from(&self.order)
    }

    /// Folds `patch` into the local copy. Returns whether anything changed.
    pub fn apply(&mut self, patch: &OrderPatch) -> bool {
        let changed = self.order.apply(patch);
        if changed {
            info!(order_id = %self.order.id, status = %self.order.status, "Order status changed");
        } else {
            debug!(order_id = %self.order.id, ?patch, "Change already applied");
        }
        changed
    }

    /// Like [`apply`](Self::apply) for an undecoded change payload. A payload that does not
    /// decode (for instance an unknown status) is logged and ignored.
    pub fn apply_raw(&mut self, raw: &serde_json::Value) -> bool {
        match serde_json::from_value::<OrderPatch>(raw.clone()) {
            Ok(patch) => self.apply(&patch),
            Err(e) => {
                warn!(order_id = %self.order.id, error = %e, "Ignoring undecodable order change");
                false
            }
        }
    }

    /// Waits for the next change that actually alters the order.
    ///
    /// Returns `Ok(None)` once the feed is closed.
    pub async fn next_change(&mut self) -> Result<Option<TrackingView>, TrackingError> {
        loop {
            match self.feed.recv().await {
                Ok(patch) => {
                    if self.apply(&patch) {
                        return Ok(Some(self.view()));
                    }
                }
                Err(RecvError::Lagged(missed)) => {
                    warn!(order_id = %self.order.id, missed, "Change feed lagged, resyncing");
                    if self.resync().await? {
                        return Ok(Some(self.view()));
                    }
                }
                Err(RecvError::Closed) => {
                    debug!(order_id = %self.order.id, "Change feed closed");
                    return Ok(None);
                }
            }
        }
    }

    async fn resync(&mut self) -> Result<bool, TrackingError> {
        let id = self.order.id;
        let latest = self
            .orders
            .get(id)
            .await
            .map_err(|e| not_found(id, e))?
            .ok_or(TrackingError::NotFound(id))?;
        let changed = latest != self.order;
        self.order = latest;
        Ok(changed)
    }

    /// Stops listening. Dropping the tracker has the same effect.
    pub fn close(self) {
        info!(order_id = %self.order.id, "Stopped tracking order");
    }

    /// Current view first, then one item per change, ending after a terminal status or when
    /// the feed closes.
    pub fn into_stream(self) -> impl Stream<Item = TrackingView> {
        let first = self.view();
        stream::unfold(
            (self, Some(first), false),
            |(mut tracker, pending, done)| async move {
                if let Some(view) = pending {
                    let finished = view.terminal;
                    return Some((view, (tracker, None, finished)));
                }
                if done {
                    return None;
                }
                match tracker.next_change().await {
                    Ok(Some(view)) => {
                        let finished = view.terminal;
                        Some((view, (tracker, None, finished)))
                    }
                    Ok(None) => None,
                    Err(e) => {
                        warn!(error = %e, "Tracking stream ended");
                        None
                    }
                }
            },
        )
    }
}

fn not_found(id: OrderId, e: OrderError) -> TrackingError {
    match e {
        OrderError::NotFound(_) => TrackingError::NotFound(id),
        other => TrackingError::Order(other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{BrandId, StoreId, StoreSummary};
    use chrono::Utc;

    fn order(status: OrderStatus) -> Order {
        let now = Utc::now();
        Order {
            id: OrderId::new(),
            brand_id: BrandId::new("brand_1"),
            store: StoreSummary {
                id: StoreId::new("store_1"),
                name: "Gangnam".into(),
                address: None,
                phone: None,
            },
            customer_id: None,
            customer_name: "Kim".into(),
            customer_phone: "01012345678".into(),
            items: Vec::new(),
            subtotal: 0,
            tax: 0,
            points_redeemed: 0,
            points_discount: 0,
            total: 0,
            status,
            payment_status: PaymentStatus::Pending,
            pickup_window: PickupWindow::after(now, 20),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_view_marks_reached_steps() {
        let view = TrackingView::from(&order(OrderStatus::Confirmed));
        let reached: Vec<_> = view.timeline.iter().map(|s| s.reached).collect();
        assert_eq!(reached, vec![true, true, true, false, false, false]);
        assert!(view.timeline[2].current);
        assert_eq!(view.label, "접수 완료");
        assert!(!view.off_path);
        assert!(!view.terminal);
    }

    #[test]
    fn test_view_off_path() {
        let view = TrackingView::from(&order(OrderStatus::Cancelled));
        assert!(view.off_path);
        assert!(view.terminal);
        assert!(view.timeline.iter().all(|s| !s.reached && !s.current));

        let issue = TrackingView::from(&order(OrderStatus::PaymentIssue));
        assert!(issue.off_path);
        assert!(!issue.terminal);
    }
}
