use crate::auth::{Auth, AuthError};
use crate::cart_actor;
use crate::catalog::{CatalogError, CatalogSnapshot};
use crate::checkout::{CheckoutContext, CheckoutEntry, CheckoutError, CheckoutSession};
use crate::clients::{CartClient, CustomerClient, OrderClient};
use crate::config::StorefrontConfig;
use crate::customer_actor;
use crate::order_actor;
use crate::storage::{LocalStore, StorageError};
use crate::tracking::{OrderTracker, TrackingError};
use crate::model::OrderId;
use std::sync::Arc;
use thiserror::Error;
use tokio::task::JoinHandle;
use tracing::{error, info};

#[derive(Debug, Error)]
pub enum SystemError {
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error(transparent)]
    Catalog(#[from] CatalogError),
    #[error(transparent)]
    Auth(#[from] AuthError),
    #[error("Actor task failed: {0}")]
    ActorTask(String),
}

/// The running storefront: catalog, actors and the signed-in customer.
///
/// # Example
///
/// ```no_run
/// # use storefront_checkout::config::StorefrontConfig;
/// # use storefront_checkout::lifecycle::StorefrontSystem;
/// # async fn demo() -> Result<(), Box<dyn std::error::Error>> {
/// let system = StorefrontSystem::start(StorefrontConfig::from_env()?).await?;
/// system.auth.login("010-1234-5678").await?;
/// // ... browse, add to cart, check out ...
/// system.shutdown().await?;
/// # Ok(())
/// # }
/// ```
pub struct StorefrontSystem {
    pub cart_client: CartClient,
    pub customer_client: CustomerClient,
    pub order_client: OrderClient,
    pub auth: Auth,
    pub catalog: Arc<CatalogSnapshot>,
    pub config: StorefrontConfig,

    /// Task handles for all running actors (used for graceful shutdown)
    handles: Vec<JoinHandle<()>>,
}

impl StorefrontSystem {
    /// Loads the catalog and persisted state, then starts every actor.
    pub async fn start(config: StorefrontConfig) -> Result<Self, SystemError> {
        let store = LocalStore::open(&config.data_dir).await?;
        let catalog = Arc::new(CatalogSnapshot::from_path(&config.catalog_path).await?);
        let cart = cart_actor::restore(&store).await?;

        // 1. Create actors
        let (cart_actor, cart_client) = cart_actor::with_cart(config.actor_buffer, cart);
        let (customer_actor, customer_client) = customer_actor::new(config.actor_buffer);
        let (order_actor, order_client) = order_actor::new(config.actor_buffer);

        // 2. Start them with their context
        let cart_handle = tokio::spawn(cart_actor.run(store.clone()));
        let customer_handle = tokio::spawn(customer_actor.run(()));
        let order_handle = tokio::spawn(order_actor.run(customer_client.clone()));

        let auth = Auth::load(store, customer_client.clone()).await?;
        info!(data_dir = %config.data_dir.display(), "Storefront started");

        Ok(Self {
            cart_client,
            customer_client,
            order_client,
            auth,
            catalog,
            config,
            handles: vec![cart_handle, customer_handle, order_handle],
        })
    }

    pub fn checkout_context(&self) -> CheckoutContext {
        CheckoutContext {
            catalog: Arc::clone(&self.catalog),
            cart: self.cart_client.clone(),
            customers: self.customer_client.clone(),
            orders: self.order_client.clone(),
            auth: Some(self.auth.clone()),
            settings: self.config.checkout_settings(),
        }
    }

    /// Opens checkout for the signed-in customer (or a guest).
    pub async fn open_checkout(&self) -> Result<CheckoutEntry, CheckoutError> {
        CheckoutSession::open(self.checkout_context()).await
    }

    pub async fn track(&self, order_id: OrderId) -> Result<OrderTracker, TrackingError> {
        OrderTracker::open(self.order_client.clone(), order_id).await
    }

    /// Stops every actor and waits for it to finish.
    ///
    /// Sessions and trackers hold client clones; drop them before calling this.
    pub async fn shutdown(self) -> Result<(), SystemError> {
        info!("Shutting down storefront...");

        // Dropping the clients closes the actor channels. Auth holds a customer client too.
        drop(self.auth);
        drop(self.cart_client);
        drop(self.order_client);
        drop(self.customer_client);

        for handle in self.handles {
            if let Err(e) = handle.await {
                error!("Actor task failed: {:?}", e);
                return Err(SystemError::ActorTask(format!("{e:?}")));
            }
        }

        info!("Storefront shutdown complete.");
        Ok(())
    }
}
