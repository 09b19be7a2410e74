//! # Storefront Checkout
//!
//! The ordering core of a white-label pickup storefront: a device-local cart, a checkout that
//! turns the cart into an order while redeeming loyalty points, and live tracking of the order
//! as the kitchen moves it along.
//!
//! Every piece of mutable state lives in a resource actor from [`actor_framework`], so
//! concurrent calls are applied one at a time against the latest state without locks.
//!
//! ## 🗺️ Module Tour
//!
//! ### 1. Values ([`model`])
//! Catalog records, the [`Cart`](model::Cart) aggregate, [`Order`](model::Order) and
//! [`Customer`](model::Customer). All money is an integer amount of minor currency units.
//!
//! ### 2. Actors ([`cart_actor`], [`customer_actor`], [`order_actor`])
//! - **Cart**: every add/remove/quantity change is one message and is persisted through
//!   [`storage::LocalStore`].
//! - **Customer**: the loyalty balance and its ledger; a spend appends the ledger row and moves
//!   the balance in one message.
//! - **Order**: `on_create` debits redeemed points before the order is stored, so an order
//!   never exists without its debit. Status changes arrive only from fulfillment.
//!
//! ### 3. The Interface ([`clients`])
//! [`CartClient`](clients::CartClient), [`CustomerClient`](clients::CustomerClient) and
//! [`OrderClient`](clients::OrderClient) hide message passing and return typed errors.
//!
//! ### 4. Workflows ([`checkout`], [`tracking`], [`auth`])
//! - [`CheckoutSession`](checkout::CheckoutSession): validation, points redemption,
//!   single-flight submit with an idempotency key, per-step timeouts.
//! - [`OrderTracker`](tracking::OrderTracker): change-feed subscription and the display model
//!   for the tracking screen.
//! - [`Auth`](auth::Auth): phone sign-in, remembered across restarts.
//!
//! ### 5. The Orchestrator ([`lifecycle`], [`config`], [`catalog`])
//! [`StorefrontSystem`](lifecycle::StorefrontSystem) loads the
//! [`CatalogSnapshot`](catalog::CatalogSnapshot) and persisted state, wires the actors and
//! shuts them down.
//!
//! ## 🚀 Quick Start
//!
//! ```bash
//! # Run the demo with info logs
//! RUST_LOG=info cargo run
//!
//! # Tests
//! cargo test
//! ```

pub mod auth;
pub mod cart_actor;
pub mod catalog;
pub mod checkout;
pub mod clients;
pub mod config;
pub mod customer_actor;
pub mod lifecycle;
pub mod model;
pub mod order_actor;
pub mod storage;
pub mod tracking;
