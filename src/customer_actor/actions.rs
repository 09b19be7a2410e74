//! Custom actions for the Customer actor.
//!
//! Spending and earning are single actions: the ledger row and the balance move inside one
//! message, so they can never disagree.

use crate::model::{LoyaltyTransaction, OrderId};

#[derive(Debug, Clone)]
pub enum CustomerAction {
    /// Debits points, optionally against an order.
    ///
    /// # Errors
    /// Fails if the balance is lower than `points`.
    Spend {
        order_id: Option<OrderId>,
        points: u64,
    },
    /// Credits points from the external earn process.
    Earn {
        order_id: Option<OrderId>,
        points: u64,
    },
    /// Current balance, read-only.
    Balance,
    /// Ledger history, read-only.
    Ledger,
}

/// Results from CustomerActions - variants match 1:1 with CustomerAction
#[derive(Debug, Clone)]
pub enum CustomerActionResult {
    Spend(LoyaltyTransaction),
    Earn(LoyaltyTransaction),
    Balance(u64),
    /// Newest first.
    Ledger(Vec<LoyaltyTransaction>),
}
