//! # Order Client
//!
//! Provides a high‑level API for interacting with the `Order` actor.
//! Placement (with its loyalty debit) happens in the Order actor's `on_create` hook.
use crate::model::{CustomerId, Order, OrderCreate, OrderId, OrderPatch};
use crate::order_actor::OrderError;
use actor_framework::{ActorClient, FrameworkError, ResourceClient};
use async_trait::async_trait;
use tokio::sync::broadcast;
use tracing::{debug, info, instrument};

/// Client for interacting with the Order actor.
#[derive(Clone)]
pub struct OrderClient {
    inner: ResourceClient<Order>,
}

impl OrderClient {
    pub fn new(inner: ResourceClient<Order>) -> Self {
        Self { inner }
    }

    /// Stores the order and debits any redeemed points in one step.
    ///
    /// Placing twice with the same idempotency key returns the first order's id.
    #[instrument(skip(self, params), fields(key = %params.idempotency_key))]
    pub async fn place(&self, params: OrderCreate) -> Result<OrderId, OrderError> {
        debug!(?params, "place called");
        info!("Sending place to actor");
        self.inner.create(params).await.map_err(Self::map_error)
    }

    /// Fulfillment-side status change. The storefront itself never calls this.
    #[instrument(skip(self))]
    pub async fn apply_fulfillment_update(
        &self,
        id: OrderId,
        patch: OrderPatch,
    ) -> Result<Order, OrderError> {
        debug!("Sending request");
        self.inner.update(id, patch).await.map_err(Self::map_error)
    }

    /// The customer's orders, newest first. Guest orders never appear here.
    #[instrument(skip(self))]
    pub async fn history(&self, customer_id: CustomerId) -> Result<Vec<Order>, OrderError> {
        debug!("Sending request");
        let mut orders: Vec<Order> = self
            .list()
            .await?
            .into_iter()
            .filter(|order| order.customer_id == Some(customer_id))
            .collect();
        orders.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(orders)
    }

    /// Change feed of the patches applied to one order.
    #[instrument(skip(self))]
    pub async fn watch(&self, id: OrderId) -> Result<broadcast::Receiver<OrderPatch>, OrderError> {
        debug!("Sending request");
        self.inner.watch(id).await.map_err(Self::map_error)
    }
}

#[async_trait]
impl ActorClient<Order> for OrderClient {
    type Error = OrderError;

    fn inner(&self) -> &ResourceClient<Order> {
        &self.inner
    }

    fn map_error(e: FrameworkError) -> Self::Error {
        match e {
            FrameworkError::NotFound(id) => OrderError::NotFound(id),
            other => match other.entity_error::<OrderError>() {
                Some(order_error) => order_error.clone(),
                None => OrderError::ActorCommunicationError(other.to_string()),
            },
        }
    }
}
