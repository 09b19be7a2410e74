//! # Actor Framework
//!
//! Building blocks for type-safe resource actors on Tokio: each resource type (a cart, a
//! customer's loyalty account, an order) lives in its own task, owns its state outright and
//! is reached only through messages.
//!
//! ## Why ROA + Actor Model?
//!
//! - **Resource-oriented**: every actor speaks the same CRUD + Action vocabulary.
//! - **Actor model**: one task per resource type processes requests one at a time, so a
//!   request is a complete read-modify-write. Rapid-fire mutations from a UI queue up instead
//!   of interleaving.
//! - **Coordination by message**: an entity hook may call another actor through a client in
//!   its `Context` (an order debiting loyalty points while it is being created).
//!
//! ## Architecture Overview
//!
//! 1. **Entity Layer** ([`ActorEntity`]) - business rules and lifecycle hooks
//! 2. **Runtime Layer** ([`ResourceActor`]) - message loop, store, idempotent create,
//!    change feeds
//! 3. **Interface Layer** ([`ResourceClient`], [`ActorClient`]) - typed async calls
//!
//! ```rust
//! use actor_framework::{ActorEntity, ResourceActor};
//! use async_trait::async_trait;
//! use std::sync::atomic::{AtomicU32, Ordering};
//!
//! #[derive(Clone, Debug)]
//! struct Wallet { id: u32, points: u64 }
//! #[derive(Debug)] struct WalletCreate { points: u64 }
//! #[derive(Debug, Clone)] struct WalletUpdate;
//! #[derive(Debug)] enum WalletAction { Spend(u64) }
//! #[derive(Debug, thiserror::Error)] #[error("not enough points")] struct WalletError;
//!
//! #[async_trait]
//! impl ActorEntity for Wallet {
//!     type Id = u32;
//!     type Create = WalletCreate;
//!     type Update = WalletUpdate;
//!     type Action = WalletAction;
//!     type ActionResult = u64;
//!     type Context = ();
//!     type Error = WalletError;
//!
//!     fn from_create_params(id: u32, params: WalletCreate) -> Result<Self, Self::Error> {
//!         Ok(Self { id, points: params.points })
//!     }
//!     async fn on_update(&mut self, _: WalletUpdate, _: &()) -> Result<(), Self::Error> { Ok(()) }
//!     async fn handle_action(&mut self, action: WalletAction, _: &()) -> Result<u64, Self::Error> {
//!         match action {
//!             WalletAction::Spend(n) if n <= self.points => { self.points -= n; Ok(self.points) }
//!             WalletAction::Spend(_) => Err(WalletError),
//!         }
//!     }
//! }
//!
//! #[tokio::main]
//! async fn main() {
//!     let counter = AtomicU32::new(1);
//!     let (actor, client) = ResourceActor::<Wallet>::new(10, move || counter.fetch_add(1, Ordering::SeqCst));
//!     tokio::spawn(actor.run(()));
//!
//!     let id = client.create(WalletCreate { points: 500 }).await.unwrap();
//!     let left = client.perform_action(id, WalletAction::Spend(200)).await.unwrap();
//!     assert_eq!(left, 300);
//!     assert!(client.perform_action(id, WalletAction::Spend(1_000)).await.is_err());
//! }
//! ```
//!
//! ## Context Injection Pattern
//!
//! Dependencies are handed to `run(context)`, not to `new()`. Actors can therefore be created
//! in any order and wired afterwards; an order actor is started with the customer client it
//! needs for loyalty debits.
//!
//! ## Change Feeds
//!
//! [`ResourceClient::watch`] returns a `broadcast::Receiver` of the update payloads applied
//! to one entity. Dropping the receiver unsubscribes.
//!
//! ## Testing
//!
//! See [`mock`] for `MockClient` and the manual responder helpers.

pub mod actor;
pub mod client;
pub mod client_trait;
pub mod entity;
pub mod error;
pub mod message;
pub mod mock;

// Re-export core types for convenience
pub use actor::ResourceActor;
pub use client::ResourceClient;
pub use client_trait::ActorClient;
pub use entity::ActorEntity;
pub use error::FrameworkError;
pub use message::{ResourceRequest, Response};
