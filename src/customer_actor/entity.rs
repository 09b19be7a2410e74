//! Entity trait implementation for the Customer domain type.

use super::actions::{CustomerAction, CustomerActionResult};
use super::error::CustomerError;
use crate::model::{normalize_phone, Customer, CustomerCreate, CustomerId, CustomerUpdate, LoyaltyAccount};
use actor_framework::ActorEntity;
use async_trait::async_trait;
use chrono::Utc;

#[async_trait]
impl ActorEntity for Customer {
    type Id = CustomerId;
    type Create = CustomerCreate;
    type Update = CustomerUpdate;
    type Action = CustomerAction;
    type ActionResult = CustomerActionResult;
    type Context = ();
    type Error = CustomerError;

    /// New customers start with a zero balance and an empty ledger.
    fn from_create_params(id: CustomerId, params: CustomerCreate) -> Result<Self, Self::Error> {
        let phone = normalize_phone(&params.phone)
            .ok_or_else(|| CustomerError::InvalidPhone(params.phone.clone()))?;
        Ok(Self {
            id,
            phone,
            name: params.name,
            loyalty: LoyaltyAccount::default(),
            created_at: Utc::now(),
        })
    }

    /// One customer per phone number: a second create for the same number returns the first.
    fn idempotency_key(params: &CustomerCreate) -> Option<String> {
        normalize_phone(&params.phone).map(|phone| format!("phone:{phone}"))
    }

    async fn on_update(&mut self, update: CustomerUpdate, _ctx: &()) -> Result<(), Self::Error> {
        if let Some(name) = update.name {
            self.name = Some(name);
        }
        Ok(())
    }

    async fn handle_action(
        &mut self,
        action: CustomerAction,
        _ctx: &(),
    ) -> Result<CustomerActionResult, Self::Error> {
        match action {
            CustomerAction::Spend { order_id, points } => self
                .loyalty
                .spend(self.id, order_id, points)
                .map(CustomerActionResult::Spend),
            CustomerAction::Earn { order_id, points } => self
                .loyalty
                .earn(self.id, order_id, points)
                .map(CustomerActionResult::Earn),
            CustomerAction::Balance => Ok(CustomerActionResult::Balance(self.loyalty.balance())),
            CustomerAction::Ledger => Ok(CustomerActionResult::Ledger(
                self.loyalty.ledger().iter().rev().cloned().collect(),
            )),
        }
    }
}
