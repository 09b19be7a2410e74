//! Order-specific resource logic and entity implementation.
//!
//! The order actor depends on the customer actor (`Context = CustomerClient`) for the
//! loyalty debit performed while an order is created.

pub mod entity;
pub mod error;

pub use error::*;

use crate::clients::OrderClient;
use crate::model::{Order, OrderId};
use actor_framework::ResourceActor;

/// Creates a new Order actor and its client.
pub fn new(buffer: usize) -> (ResourceActor<Order>, OrderClient) {
    let (actor, generic_client) = ResourceActor::new(buffer, OrderId::new);
    (actor, OrderClient::new(generic_client))
}
