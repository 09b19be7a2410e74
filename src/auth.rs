//! # Signed-in Customer
//!
//! A lightweight phone login: the number is normalized, the customer is found or created, and
//! the record is persisted under [`AUTH_KEY`] so it survives a restart. There is no password
//! or session token; this only establishes that a customer record exists.

use crate::clients::CustomerClient;
use crate::customer_actor::CustomerError;
use crate::model::{normalize_phone, CustomerCreate, CustomerId};
use crate::storage::{LocalStore, StorageError, AUTH_KEY};
use actor_framework::ActorClient;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::{info, instrument, warn};

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Phone number must have 10 or 11 digits")]
    InvalidPhone,
    #[error(transparent)]
    Customer(#[from] CustomerError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// What the device remembers about the signed-in customer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthenticatedCustomer {
    pub id: CustomerId,
    pub phone: String,
    pub name: Option<String>,
    pub loyalty_points: u64,
}

/// Shared handle to the signed-in customer. Clones see the same state.
#[derive(Clone)]
pub struct Auth {
    store: LocalStore,
    customers: CustomerClient,
    current: Arc<RwLock<Option<AuthenticatedCustomer>>>,
}

impl Auth {
    /// Restores whoever was signed in last time.
    pub async fn load(store: LocalStore, customers: CustomerClient) -> Result<Self, AuthError> {
        let current = match store.load::<AuthenticatedCustomer>(AUTH_KEY).await {
            Ok(current) => current,
            Err(StorageError::Serde { key, source }) => {
                warn!(key, error = %source, "Discarding unreadable sign-in record");
                None
            }
            Err(e) => return Err(e.into()),
        };
        Ok(Self {
            store,
            customers,
            current: Arc::new(RwLock::new(current)),
        })
    }

    pub async fn current(&self) -> Option<AuthenticatedCustomer> {
        self.current.read().await.clone()
    }

    /// Signs in by phone, registering the customer with a zero balance on first use.
    #[instrument(skip(self, phone))]
    pub async fn login(&self, phone: &str) -> Result<AuthenticatedCustomer, AuthError> {
        let phone = normalize_phone(phone).ok_or(AuthError::InvalidPhone)?;

        let customer = match self.customers.find_by_phone(&phone).await? {
            Some(existing) => existing,
            None => {
                let id = self
                    .customers
                    .create_customer(CustomerCreate {
                        phone: phone.clone(),
                        name: None,
                    })
                    .await?;
                info!(customer_id = %id, "Registered new customer");
                self.customers
                    .get(id)
                    .await?
                    .ok_or_else(|| CustomerError::NotFound(id.to_string()))?
            }
        };

        let record = AuthenticatedCustomer {
            id: customer.id,
            phone: customer.phone,
            name: customer.name,
            loyalty_points: customer.loyalty.balance(),
        };
        self.store.save(AUTH_KEY, &record).await?;
        *self.current.write().await = Some(record.clone());
        info!(customer_id = %record.id, "Signed in");
        Ok(record)
    }

    pub async fn logout(&self) -> Result<(), AuthError> {
        self.store.remove(AUTH_KEY).await?;
        *self.current.write().await = None;
        info!("Signed out");
        Ok(())
    }

    /// Re-reads the loyalty balance, e.g. after a checkout spent points.
    ///
    /// Returns `Ok(None)` when nobody is signed in.
    #[instrument(skip(self))]
    pub async fn refresh(&self) -> Result<Option<AuthenticatedCustomer>, AuthError> {
        let Some(mut record) = self.current().await else {
            return Ok(None);
        };
        record.loyalty_points = self.customers.account(record.id).await?;
        self.store.save(AUTH_KEY, &record).await?;
        *self.current.write().await = Some(record.clone());
        Ok(Some(record))
    }
}
