//! # Checkout Session
//!
//! One session per visit to the checkout screen. It resolves the store, brand and loyalty
//! settings once, then runs submissions:
//!
//! 1. re-read the cart and recompute subtotal, tax and total
//! 2. quote the redemption against the current balance
//! 3. place the order; the order actor debits the points in the same step
//! 4. read the stored order back; its figures are the ones reported
//! 5. clear the cart
//! 6. refresh the signed-in customer's balance (best effort)
//!
//! Each step runs under `submit_timeout`. A session carries one idempotency key for all its
//! submissions and admits one submission at a time. After a successful checkout the session
//! refuses further submits with [`CheckoutError::SessionCompleted`].

use super::error::{CheckoutError, Stage, ValidationError};
use super::pricing::{quote_redemption, RedemptionQuote};
use crate::auth::{Auth, AuthenticatedCustomer};
use crate::catalog::CatalogSnapshot;
use crate::clients::{CartClient, CustomerClient, OrderClient};
use crate::model::{
    normalize_phone, BrandId, Cart, LoyaltyConfig, Order, OrderCreate, OrderId, OrderItem,
    PickupWindow, PriceBreakdown, Redemption, StoreSummary,
};
use actor_framework::ActorClient;
use chrono::Utc;
use std::fmt::Display;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{error, info, instrument, warn};
use uuid::Uuid;

/// Pickup delays offered when none are configured, in minutes.
pub const DEFAULT_PICKUP_DELAYS: [u32; 4] = [20, 30, 40, 60];

#[derive(Debug, Clone)]
pub struct CheckoutSettings {
    /// Upper bound for each individual step.
    pub submit_timeout: Duration,
    pub pickup_delays: Vec<u32>,
}

impl Default for CheckoutSettings {
    fn default() -> Self {
        Self {
            submit_timeout: Duration::from_secs(10),
            pickup_delays: DEFAULT_PICKUP_DELAYS.to_vec(),
        }
    }
}

/// Everything a session talks to.
#[derive(Clone)]
pub struct CheckoutContext {
    pub catalog: Arc<CatalogSnapshot>,
    pub cart: CartClient,
    pub customers: CustomerClient,
    pub orders: OrderClient,
    /// Source of the signed-in customer; `None` means guest only.
    pub auth: Option<Auth>,
    pub settings: CheckoutSettings,
}

/// What the customer typed on the checkout screen.
#[derive(Debug, Clone)]
pub struct CheckoutForm {
    pub customer_name: String,
    pub customer_phone: String,
    pub pickup_delay_minutes: u32,
    pub points_to_redeem: u64,
}

/// A form that passed [`validate_form`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedForm {
    pub customer_name: String,
    pub customer_phone: String,
    pub pickup_delay_minutes: u32,
}

/// Checks the form without touching any actor.
pub fn validate_form(
    form: &CheckoutForm,
    pickup_delays: &[u32],
) -> Result<ValidatedForm, ValidationError> {
    let customer_name = form.customer_name.trim();
    if customer_name.is_empty() {
        return Err(ValidationError::EmptyName);
    }
    let customer_phone = normalize_phone(&form.customer_phone)
        .ok_or_else(|| ValidationError::InvalidPhone(form.customer_phone.clone()))?;
    if !pickup_delays.contains(&form.pickup_delay_minutes) {
        return Err(ValidationError::PickupDelayNotOffered(
            form.pickup_delay_minutes,
        ));
    }
    Ok(ValidatedForm {
        customer_name: customer_name.to_string(),
        customer_phone,
        pickup_delay_minutes: form.pickup_delay_minutes,
    })
}

/// Result of opening checkout.
pub enum CheckoutEntry {
    Ready(CheckoutSession),
    /// The cart is empty; show the cart instead.
    BackToCart,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutPreview {
    pub breakdown: PriceBreakdown,
    pub balance: u64,
    pub redemption: RedemptionQuote,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlacedOrder {
    pub order_id: OrderId,
    pub total: u64,
    pub points_redeemed: u64,
    pub pickup_window: PickupWindow,
}

impl From<&Order> for PlacedOrder {
    fn from(order: &Order) -> Self {
        Self {
            order_id: order.id,
            total: order.total,
            points_redeemed: order.points_redeemed,
            pickup_window: order.pickup_window,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Navigate to tracking for this order.
    Placed(PlacedOrder),
    /// The cart emptied since the session opened.
    BackToCart,
}

pub struct CheckoutSession {
    ctx: CheckoutContext,
    brand_id: BrandId,
    store: StoreSummary,
    loyalty: LoyaltyConfig,
    customer: Option<AuthenticatedCustomer>,
    idempotency_key: String,
    state: Mutex<SubmitState>,
}

/// What earlier submits of a session achieved. Guarded by the single-flight lock.
#[derive(Debug, Default)]
struct SubmitState {
    /// Set once the order actor accepted the order.
    placed: Option<OrderId>,
    /// Set once checkout finished; no further submits.
    completed: Option<OrderId>,
}

impl CheckoutSession {
    /// Opens checkout for the signed-in customer, if any.
    pub async fn open(ctx: CheckoutContext) -> Result<CheckoutEntry, CheckoutError> {
        let customer = match &ctx.auth {
            Some(auth) => auth.current().await,
            None => None,
        };
        Self::open_for(ctx, customer).await
    }

    /// Opens checkout for an explicit customer (or a guest).
    #[instrument(skip(ctx, customer), fields(customer_id = ?customer.as_ref().map(|c| c.id)))]
    pub async fn open_for(
        ctx: CheckoutContext,
        customer: Option<AuthenticatedCustomer>,
    ) -> Result<CheckoutEntry, CheckoutError> {
        let timeout = ctx.settings.submit_timeout;
        let cart = run_step(timeout, Stage::LoadCart, ctx.cart.snapshot()).await?;
        let Some(store_id) = cart.store_id().filter(|_| !cart.is_empty()).cloned() else {
            info!("Cart is empty, back to cart");
            return Ok(CheckoutEntry::BackToCart);
        };

        let rejected = |reason: String| CheckoutError::Rejected {
            stage: Stage::LoadCatalog,
            reason,
        };
        let store = ctx
            .catalog
            .store(&store_id)
            .ok_or_else(|| rejected(format!("unknown store {store_id}")))?;
        let brand = ctx
            .catalog
            .brand(&store.brand_id)
            .ok_or_else(|| rejected(format!("unknown brand {}", store.brand_id)))?;

        let session = CheckoutSession {
            brand_id: brand.id.clone(),
            store: StoreSummary::from(store),
            loyalty: brand.loyalty,
            customer,
            idempotency_key: format!("checkout-{}", Uuid::new_v4()),
            state: Mutex::new(SubmitState::default()),
            ctx,
        };
        info!(store = %session.store.id, key = %session.idempotency_key, "Checkout opened");
        Ok(CheckoutEntry::Ready(session))
    }

    pub fn store(&self) -> &StoreSummary {
        &self.store
    }

    pub fn loyalty(&self) -> LoyaltyConfig {
        self.loyalty
    }

    pub fn customer(&self) -> Option<&AuthenticatedCustomer> {
        self.customer.as_ref()
    }

    pub fn idempotency_key(&self) -> &str {
        &self.idempotency_key
    }

    async fn step<T, E: Display>(
        &self,
        stage: Stage,
        fut: impl Future<Output = Result<T, E>>,
    ) -> Result<T, CheckoutError> {
        run_step(self.ctx.settings.submit_timeout, stage, fut).await
    }

    /// Balance that may be redeemed: zero for guests or when loyalty is off.
    async fn redeemable_balance(&self) -> Result<u64, CheckoutError> {
        match &self.customer {
            Some(customer) if self.loyalty.is_active() => {
                self.step(Stage::LoadAccount, self.ctx.customers.account(customer.id))
                    .await
            }
            _ => Ok(0),
        }
    }

    /// Totals and redemption for the cart as it is now. `None` if the cart is empty.
    pub async fn preview(&self, points: u64) -> Result<Option<CheckoutPreview>, CheckoutError> {
        let cart = self.step(Stage::LoadCart, self.ctx.cart.snapshot()).await?;
        if cart.is_empty() {
            return Ok(None);
        }
        let breakdown = cart.breakdown();
        let balance = self.redeemable_balance().await?;
        Ok(Some(CheckoutPreview {
            breakdown,
            balance,
            redemption: quote_redemption(breakdown.total, balance, points, &self.loyalty),
        }))
    }

    /// Submits the order. See the module docs for the step order.
    ///
    /// Once an order is placed the session is bound to it: a retry after a partial failure
    /// only finishes the follow-up steps, and a submit after success is refused.
    #[instrument(skip(self, form), fields(key = %self.idempotency_key))]
    pub async fn submit(&self, form: &CheckoutForm) -> Result<SubmitOutcome, CheckoutError> {
        let mut state = self
            .state
            .try_lock()
            .map_err(|_| CheckoutError::SubmissionInFlight)?;
        if let Some(order_id) = state.completed {
            return Err(CheckoutError::SessionCompleted { order_id });
        }
        let valid = validate_form(form, &self.ctx.settings.pickup_delays)?;

        let (order_id, submitted_items) = match state.placed {
            Some(order_id) => {
                info!(%order_id, "Order already placed, finishing checkout");
                (order_id, None)
            }
            None => {
                let cart = self.step(Stage::LoadCart, self.ctx.cart.snapshot()).await?;
                if cart.is_empty() {
                    info!("Cart emptied before submit, back to cart");
                    return Ok(SubmitOutcome::BackToCart);
                }
                if cart.store_id() != Some(&self.store.id) {
                    return Err(CheckoutError::Rejected {
                        stage: Stage::LoadCart,
                        reason: format!("cart no longer belongs to store {}", self.store.id),
                    });
                }

                let breakdown = cart.breakdown();
                let balance = self.redeemable_balance().await?;
                let quote =
                    quote_redemption(breakdown.total, balance, form.points_to_redeem, &self.loyalty);
                let params = self.order_params(&cart, breakdown, quote, valid);
                let items = params.items.clone();

                let order_id = self
                    .step(Stage::PlaceOrder, self.ctx.orders.place(params))
                    .await?;
                (order_id, Some(items))
            }
        };
        state.placed = Some(order_id);

        // A repeated key returns the order stored first; report what was stored.
        let stored = self.stored_order(order_id).await?;
        if submitted_items.is_some_and(|items| items != stored.items) {
            warn!(%order_id, "Session already placed an order for a different cart");
            state.completed = Some(order_id);
            return Err(CheckoutError::SessionCompleted { order_id });
        }
        info!(%order_id, total = stored.total, points = stored.points_redeemed, "Order placed");

        if let Err(e) = self.step(Stage::ClearCart, self.ctx.cart.clear()).await {
            error!(%order_id, error = %e, "Order placed but cart was not cleared");
            return Err(CheckoutError::PartialFailure {
                order_id,
                reason: format!("clearing the cart failed: {e}"),
            });
        }

        if let Some(auth) = &self.ctx.auth {
            if let Err(e) = auth.refresh().await {
                warn!(%order_id, error = %e, "Could not refresh customer after checkout");
            }
        }

        state.completed = Some(order_id);
        Ok(SubmitOutcome::Placed(PlacedOrder::from(&stored)))
    }

    async fn stored_order(&self, order_id: OrderId) -> Result<Order, CheckoutError> {
        let reason = match self.step(Stage::PlaceOrder, self.ctx.orders.get(order_id)).await {
            Ok(Some(order)) => return Ok(order),
            Ok(None) => "the placed order could not be found".to_string(),
            Err(e) => format!("reading the placed order failed: {e}"),
        };
        error!(%order_id, %reason, "Order placed but not read back");
        Err(CheckoutError::PartialFailure { order_id, reason })
    }

    fn order_params(
        &self,
        cart: &Cart,
        breakdown: PriceBreakdown,
        quote: RedemptionQuote,
        form: ValidatedForm,
    ) -> OrderCreate {
        let redemption = self
            .customer
            .as_ref()
            .filter(|_| quote.points > 0)
            .map(|_| Redemption {
                points: quote.points,
                discount: quote.discount,
            });
        let total = match redemption {
            Some(_) => quote.final_total,
            None => breakdown.total,
        };
        OrderCreate {
            idempotency_key: self.idempotency_key.clone(),
            brand_id: self.brand_id.clone(),
            store: self.store.clone(),
            customer_id: self.customer.as_ref().map(|c| c.id),
            customer_name: form.customer_name,
            customer_phone: form.customer_phone,
            items: cart.lines().iter().map(OrderItem::from).collect(),
            subtotal: breakdown.subtotal,
            tax: breakdown.tax,
            redemption,
            total,
            pickup_window: PickupWindow::after(Utc::now(), form.pickup_delay_minutes),
        }
    }
}

async fn run_step<T, E: Display>(
    timeout: Duration,
    stage: Stage,
    fut: impl Future<Output = Result<T, E>>,
) -> Result<T, CheckoutError> {
    match tokio::time::timeout(timeout, fut).await {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(e)) => {
            warn!(%stage, error = %e, "Checkout step failed");
            Err(CheckoutError::Rejected {
                stage,
                reason: e.to_string(),
            })
        }
        Err(_) => {
            warn!(%stage, ?timeout, "Checkout step timed out");
            Err(CheckoutError::Timeout { stage })
        }
    }
}
