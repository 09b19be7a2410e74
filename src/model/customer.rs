/// A customer and their loyalty account.
///
/// # Actor Framework
/// This struct implements the [`ActorEntity`](actor_framework::ActorEntity) trait,
/// allowing it to be managed by a [`ResourceActor`](actor_framework::ResourceActor).
///
/// See [`impl ActorEntity for Customer`](#impl-ActorEntity-for-Customer) for details on:
/// - Creation parameters ([`CustomerCreate`])
/// - Custom actions ([`CustomerAction`](crate::customer_actor::CustomerAction))
use crate::customer_actor::CustomerError;
use crate::model::OrderId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// Type-safe identifier for Customers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CustomerId(pub u32);

impl From<u32> for CustomerId {
    fn from(id: u32) -> Self {
        Self(id)
    }
}

impl Display for CustomerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "customer_{}", self.0)
    }
}

/// Strips everything but digits and accepts 10 or 11 of them.
pub fn normalize_phone(raw: &str) -> Option<String> {
    let digits: String = raw.chars().filter(char::is_ascii_digit).collect();
    (10..=11).contains(&digits.len()).then_some(digits)
}

/// One append-only ledger row.
///
/// `balance` is the account balance right after this row was applied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoyaltyTransaction {
    pub customer_id: CustomerId,
    pub order_id: Option<OrderId>,
    pub points_earned: u64,
    pub points_spent: u64,
    pub balance: u64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoyaltyAccount {
    balance: u64,
    ledger: Vec<LoyaltyTransaction>,
}

impl LoyaltyAccount {
    pub fn balance(&self) -> u64 {
        self.balance
    }

    /// Ledger rows in the order they were applied.
    pub fn ledger(&self) -> &[LoyaltyTransaction] {
        &self.ledger
    }

    /// Debits `points`, appending the ledger row and moving the balance together.
    pub fn spend(
        &mut self,
        customer_id: CustomerId,
        order_id: Option<OrderId>,
        points: u64,
    ) -> Result<LoyaltyTransaction, CustomerError> {
        if points == 0 {
            return Err(CustomerError::InvalidPoints);
        }
        if points > self.balance {
            return Err(CustomerError::InsufficientPoints {
                requested: points,
                available: self.balance,
            });
        }
        Ok(self.record(customer_id, order_id, 0, points))
    }

    pub fn earn(
        &mut self,
        customer_id: CustomerId,
        order_id: Option<OrderId>,
        points: u64,
    ) -> Result<LoyaltyTransaction, CustomerError> {
        if points == 0 {
            return Err(CustomerError::InvalidPoints);
        }
        Ok(self.record(customer_id, order_id, points, 0))
    }

    fn record(
        &mut self,
        customer_id: CustomerId,
        order_id: Option<OrderId>,
        earned: u64,
        spent: u64,
    ) -> LoyaltyTransaction {
        self.balance = self.balance - spent + earned;
        let row = LoyaltyTransaction {
            customer_id,
            order_id,
            points_earned: earned,
            points_spent: spent,
            balance: self.balance,
            created_at: Utc::now(),
        };
        self.ledger.push(row.clone());
        row
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Customer {
    pub id: CustomerId,
    pub phone: String,
    pub name: Option<String>,
    pub loyalty: LoyaltyAccount,
    pub created_at: DateTime<Utc>,
}

/// Payload for creating a new customer. The phone is normalized on creation.
#[derive(Debug, Clone)]
pub struct CustomerCreate {
    pub phone: String,
    pub name: Option<String>,
}

/// DTO for customer profile updates.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CustomerUpdate {
    pub name: Option<String>,
}
