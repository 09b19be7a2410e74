//! Type-safe wrappers around [`ResourceClient`](actor_framework::ResourceClient).
//!
//! Each wrapper implements [`ActorClient`](actor_framework::ActorClient) for `get`, `list`
//! and `delete`, and adds the resource's own operations. Entity errors raised inside an actor
//! come back as the resource's own error type.

pub mod cart_client;
pub mod customer_client;
pub mod order_client;

pub use cart_client::*;
pub use customer_client::*;
pub use order_client::*;
