//! # Customer Client
//!
//! Customer lookup and the loyalty ledger.
use crate::customer_actor::{CustomerAction, CustomerActionResult, CustomerError};
use crate::model::{
    normalize_phone, Customer, CustomerCreate, CustomerId, LoyaltyTransaction, OrderId,
};
use actor_framework::{ActorClient, FrameworkError, ResourceClient};
use async_trait::async_trait;
use tracing::{debug, instrument};

/// Client for interacting with the Customer actor.
#[derive(Clone)]
pub struct CustomerClient {
    inner: ResourceClient<Customer>,
}

impl CustomerClient {
    pub fn new(inner: ResourceClient<Customer>) -> Self {
        Self { inner }
    }

    async fn act(
        &self,
        id: CustomerId,
        action: CustomerAction,
    ) -> Result<CustomerActionResult, CustomerError> {
        self.inner
            .perform_action(id, action)
            .await
            .map_err(Self::map_error)
    }

    /// Creates a customer, or returns the existing id if the phone is already registered.
    #[instrument(skip(self))]
    pub async fn create_customer(&self, params: CustomerCreate) -> Result<CustomerId, CustomerError> {
        debug!("Sending request");
        self.inner.create(params).await.map_err(Self::map_error)
    }

    #[instrument(skip(self))]
    pub async fn find_by_phone(&self, phone: &str) -> Result<Option<Customer>, CustomerError> {
        let phone =
            normalize_phone(phone).ok_or_else(|| CustomerError::InvalidPhone(phone.to_string()))?;
        debug!("Sending request");
        let customers = self.list().await?;
        Ok(customers.into_iter().find(|customer| customer.phone == phone))
    }

    /// Current loyalty balance.
    #[instrument(skip(self))]
    pub async fn account(&self, id: CustomerId) -> Result<u64, CustomerError> {
        match self.act(id, CustomerAction::Balance).await? {
            CustomerActionResult::Balance(balance) => Ok(balance),
            other => Err(unexpected(other)),
        }
    }

    /// Debits points; the ledger row and the new balance are written together.
    #[instrument(skip(self))]
    pub async fn spend_points(
        &self,
        id: CustomerId,
        order_id: Option<OrderId>,
        points: u64,
    ) -> Result<LoyaltyTransaction, CustomerError> {
        debug!("Sending request");
        match self.act(id, CustomerAction::Spend { order_id, points }).await? {
            CustomerActionResult::Spend(row) => Ok(row),
            other => Err(unexpected(other)),
        }
    }

    #[instrument(skip(self))]
    pub async fn earn_points(
        &self,
        id: CustomerId,
        order_id: Option<OrderId>,
        points: u64,
    ) -> Result<LoyaltyTransaction, CustomerError> {
        debug!("Sending request");
        match self.act(id, CustomerAction::Earn { order_id, points }).await? {
            CustomerActionResult::Earn(row) => Ok(row),
            other => Err(unexpected(other)),
        }
    }

    /// Ledger history, newest first.
    #[instrument(skip(self))]
    pub async fn ledger(&self, id: CustomerId) -> Result<Vec<LoyaltyTransaction>, CustomerError> {
        match self.act(id, CustomerAction::Ledger).await? {
            CustomerActionResult::Ledger(rows) => Ok(rows),
            other => Err(unexpected(other)),
        }
    }
}

fn unexpected(result: CustomerActionResult) -> CustomerError {
    CustomerError::ActorCommunicationError(format!("unexpected action result: {result:?}"))
}

#[async_trait]
impl ActorClient<Customer> for CustomerClient {
    type Error = CustomerError;

    fn inner(&self) -> &ResourceClient<Customer> {
        &self.inner
    }

    fn map_error(e: FrameworkError) -> Self::Error {
        match e {
            FrameworkError::NotFound(id) => CustomerError::NotFound(id),
            other => match other.entity_error::<CustomerError>() {
                Some(customer_error) => customer_error.clone(),
                None => CustomerError::ActorCommunicationError(other.to_string()),
            },
        }
    }
}
