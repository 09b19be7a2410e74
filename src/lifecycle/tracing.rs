//! # Observability & Tracing
//!
//! [`setup_tracing`] installs a compact `tracing-subscriber` formatter filtered by `RUST_LOG`.
//! Module paths are hidden (`with_target(false)`); the structured fields (`order_id`,
//! `customer_id`, `key`, `stage`) carry the context instead.
//!
//! ```bash
//! # Workflow-level logs
//! RUST_LOG=info cargo run
//!
//! # Full payloads at client entry points
//! RUST_LOG=debug cargo run
//!
//! # Only checkout internals
//! RUST_LOG=storefront_checkout::checkout=debug cargo run
//! ```
//!
//! With `RUST_LOG=info` a checkout reads roughly like:
//!
//! ```text
//! INFO checkout:submit: Sending place to actor key="checkout-…"
//! INFO Action ok entity_type="Customer" id=customer_1
//! INFO Points debited order_id=… customer_id=customer_1 spent=500 balance=1500
//! INFO Created entity_type="Order" id=… size=1
//! INFO checkout:submit: Order placed order_id=… total=4500 points=500
//! ```
//!
//! Failures keep the same fields: a timed-out step logs `stage`, and an order that was placed
//! but not followed up logs `order_id` at `error` level.

/// Initializes the global subscriber. Call once, at the top of `main`.
pub fn setup_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_target(false)
        .compact()
        .init();
}
