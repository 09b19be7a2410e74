use futures::StreamExt;
use std::error::Error;
use std::time::Duration;
use storefront_checkout::checkout::{CheckoutEntry, CheckoutForm, SubmitOutcome};
use storefront_checkout::config::StorefrontConfig;
use storefront_checkout::lifecycle::{setup_tracing, StorefrontSystem};
use storefront_checkout::model::{ModifierChoice, OrderPatch, OrderStatus, PaymentStatus, StoreStatus};
use tracing::{error, info, Instrument};

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // Reads .env as well
    let config = StorefrontConfig::from_env()?;
    setup_tracing();

    info!("Starting storefront demo");
    let system = StorefrontSystem::start(config).await?;

    // Sign in and give the customer something to redeem
    let span = tracing::info_span!("sign_in");
    let me = async {
        let me = system.auth.login("010-1234-5678").await?;
        system.customer_client.earn_points(me.id, None, 2_000).await?;
        Ok::<_, Box<dyn Error>>(system.auth.refresh().await?.unwrap_or(me))
    }
    .instrument(span)
    .await?;
    info!(customer_id = %me.id, points = me.loyalty_points, "Signed in");

    // Browse one store and fill the cart
    let span = tracing::info_span!("browse");
    async {
        let brand = system
            .catalog
            .brand_by_slug("bean-house")
            .ok_or("demo brand missing from catalog")?;
        let store = system
            .catalog
            .stores_for_brand(&brand.id, StoreStatus::Active)
            .into_iter()
            .next()
            .ok_or("demo brand has no active store")?;
        info!(store = %store.name, "Browsing");

        system.cart_client.clear().await?;
        for item in system.catalog.items_for_store(store) {
            let modifiers = system.catalog.modifiers_for_item(&item.id);
            let choices = match item.id.as_str() {
                "item_latte" => vec![
                    ModifierChoice::new("mod_size", &["opt_large"]),
                    ModifierChoice::new("mod_extras", &["opt_shot"]),
                ],
                "item_americano" => vec![ModifierChoice::new("mod_temp", &["opt_iced"])],
                _ => Vec::new(),
            };
            let key = system
                .cart_client
                .add_line(&store.id, item, &modifiers, &choices)
                .await?;
            info!(%key, "Added to cart");
        }

        let cart = system.cart_client.snapshot().await?;
        info!(
            items = cart.line_count(),
            subtotal = cart.subtotal(),
            tax = cart.tax(),
            total = cart.total(),
            "Cart ready"
        );
        Ok::<_, Box<dyn Error>>(())
    }
    .instrument(span)
    .await?;

    // Check out with points
    let span = tracing::info_span!("checkout");
    let placed = async {
        let session = match system.open_checkout().await? {
            CheckoutEntry::Ready(session) => session,
            CheckoutEntry::BackToCart => return Err::<_, Box<dyn Error>>("cart is empty".into()),
        };
        if let Some(preview) = session.preview(1_000).await? {
            info!(
                total = preview.breakdown.total,
                redeemable = preview.redemption.max_redeemable,
                final_total = preview.redemption.final_total,
                "Preview"
            );
        }
        let form = CheckoutForm {
            customer_name: "Kim Minji".to_string(),
            customer_phone: me.phone.clone(),
            pickup_delay_minutes: 20,
            points_to_redeem: 1_000,
        };
        match session.submit(&form).await {
            Ok(SubmitOutcome::Placed(placed)) => Ok(placed),
            Ok(SubmitOutcome::BackToCart) => Err("cart emptied during checkout".into()),
            Err(e) => {
                error!(error = %e, message = e.user_message(), "Checkout failed");
                Err(Box::<dyn Error>::from(e))
            }
        }
    }
    .instrument(span)
    .await?;
    info!(order_id = %placed.order_id, total = placed.total, points = placed.points_redeemed, "Order placed");

    // The kitchen moves the order along while the customer watches
    let tracker = system.track(placed.order_id).await?;
    let kitchen = system.order_client.clone();
    let order_id = placed.order_id;
    let fulfillment = tokio::spawn(
        async move {
            let steps = [
                OrderPatch {
                    status: Some(OrderStatus::Waiting),
                    payment_status: Some(PaymentStatus::Paid),
                },
                OrderPatch::status(OrderStatus::Confirmed),
                OrderPatch::status(OrderStatus::Preparing),
                OrderPatch::status(OrderStatus::Ready),
                OrderPatch::status(OrderStatus::Completed),
            ];
            for patch in steps {
                tokio::time::sleep(Duration::from_millis(50)).await;
                if let Err(e) = kitchen.apply_fulfillment_update(order_id, patch).await {
                    error!(error = %e, "Fulfillment update failed");
                    break;
                }
            }
        }
        .instrument(tracing::info_span!("fulfillment")),
    );

    let mut updates = Box::pin(tracker.into_stream());
    while let Some(view) = updates.next().await {
        info!(status = view.label, payment = ?view.payment_status, "Tracking");
    }
    drop(updates);
    fulfillment.await?;

    for row in system.customer_client.ledger(me.id).await? {
        info!(earned = row.points_earned, spent = row.points_spent, balance = row.balance, "Ledger");
    }

    for order in system.order_client.history(me.id).await? {
        info!(order_id = %order.id, store = %order.store.name, total = order.total, status = order.status.label(), "Recent order");
    }

    system.shutdown().await?;
    info!("Demo completed successfully");
    Ok(())
}
