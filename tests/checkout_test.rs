mod common;

use actor_framework::mock::{
    create_mock_client, expect_action, expect_create, expect_get, MockClient,
};
use actor_framework::{ActorClient, ActorEntity, FrameworkError, ResourceRequest};
use std::sync::Arc;
use std::time::Duration;
use storefront_checkout::auth::AuthenticatedCustomer;
use storefront_checkout::cart_actor::{CartAction, CartActionResult, CartError};
use storefront_checkout::checkout::{
    CheckoutContext, CheckoutEntry, CheckoutError, CheckoutForm, CheckoutSession,
    CheckoutSettings, Stage, SubmitOutcome, ValidationError, GENERIC_FAILURE_MESSAGE,
};
use storefront_checkout::clients::{CartClient, CustomerClient, OrderClient};
use storefront_checkout::customer_actor::{self, CustomerActionResult};
use storefront_checkout::model::{
    Cart, CartId, Customer, CustomerCreate, CustomerId, ModifierChoice, MenuItemId, Order,
    OrderCreate, OrderId, Redemption,
};
use storefront_checkout::order_actor;
use tokio::sync::mpsc;

struct Harness {
    ctx: CheckoutContext,
    carts: mpsc::Receiver<ResourceRequest<Cart>>,
    orders: mpsc::Receiver<ResourceRequest<Order>>,
    customers: MockClient<Customer>,
}

fn harness(submit_timeout: Duration) -> Harness {
    let (cart_client, carts) = create_mock_client::<Cart>(8);
    let (order_client, orders) = create_mock_client::<Order>(8);
    let customers = MockClient::<Customer>::new();
    let ctx = CheckoutContext {
        catalog: Arc::new(common::catalog()),
        cart: CartClient::new(cart_client),
        customers: CustomerClient::new(customers.client()),
        orders: OrderClient::new(order_client),
        auth: None,
        settings: CheckoutSettings {
            submit_timeout,
            ..CheckoutSettings::default()
        },
    };
    Harness {
        ctx,
        carts,
        orders,
        customers,
    }
}

/// `quantity` iced americanos at Gangnam, 4000 each plus 10% tax.
fn americanos(quantity: u32) -> Cart {
    let catalog = common::catalog();
    let item = common::item(&catalog, "item_americano");
    let modifiers = catalog.modifiers_for_item(&MenuItemId::new("item_americano"));
    let mut cart = Cart::new(CartId::LOCAL);
    for _ in 0..quantity {
        cart.add_line(
            &common::gangnam(),
            &item,
            &modifiers,
            &[ModifierChoice::new("mod_temp", &["opt_iced"])],
        )
        .unwrap();
    }
    cart
}

/// One iced americano: 4000 + 400 tax.
fn americano_cart() -> Cart {
    americanos(1)
}

fn form(points: u64) -> CheckoutForm {
    CheckoutForm {
        customer_name: "Kim Minji".into(),
        customer_phone: "010-1234-5678".into(),
        pickup_delay_minutes: 20,
        points_to_redeem: points,
    }
}

/// Answers the next cart request, which must be a snapshot.
async fn answer_snapshot(carts: &mut mpsc::Receiver<ResourceRequest<Cart>>, cart: &Cart) {
    let (id, action, respond_to) = expect_action(carts).await.expect("expected a cart action");
    assert_eq!(id, CartId::LOCAL);
    assert!(matches!(action, CartAction::Snapshot));
    respond_to
        .send(Ok(CartActionResult::Snapshot(cart.clone())))
        .unwrap();
}

/// Answers the read-back of a placed order with what the actor stored for `params`.
async fn answer_stored(
    orders: &mut mpsc::Receiver<ResourceRequest<Order>>,
    order_id: OrderId,
    params: &OrderCreate,
) {
    let (id, respond_to) = expect_get(orders).await.expect("expected an order read");
    assert_eq!(id, order_id);
    let stored = Order::from_create_params(order_id, params.clone()).unwrap();
    respond_to.send(Ok(Some(stored))).unwrap();
}

/// Answers the next cart request, which must be a clear.
async fn answer_clear(carts: &mut mpsc::Receiver<ResourceRequest<Cart>>) {
    let (_, action, respond_to) = expect_action(carts).await.expect("expected a cart action");
    assert!(matches!(action, CartAction::Clear));
    respond_to.send(Ok(CartActionResult::Clear(()))).unwrap();
}

async fn open(
    h: &mut Harness,
    customer: Option<AuthenticatedCustomer>,
    cart: &Cart,
) -> Arc<CheckoutSession> {
    let opening = tokio::spawn(CheckoutSession::open_for(h.ctx.clone(), customer));
    answer_snapshot(&mut h.carts, cart).await;
    match opening.await.unwrap().unwrap() {
        CheckoutEntry::Ready(session) => Arc::new(session),
        CheckoutEntry::BackToCart => panic!("expected a ready session"),
    }
}

fn submit(session: &Arc<CheckoutSession>, form: CheckoutForm) -> tokio::task::JoinHandle<Result<SubmitOutcome, CheckoutError>> {
    let session = Arc::clone(session);
    tokio::spawn(async move { session.submit(&form).await })
}

#[tokio::test]
async fn test_empty_cart_goes_back_to_cart() {
    let mut h = harness(Duration::from_secs(1));
    let opening = tokio::spawn(CheckoutSession::open_for(h.ctx.clone(), None));
    answer_snapshot(&mut h.carts, &Cart::new(CartId::LOCAL)).await;
    assert!(matches!(
        opening.await.unwrap(),
        Ok(CheckoutEntry::BackToCart)
    ));
}

#[tokio::test]
async fn test_invalid_form_makes_no_calls() {
    let mut h = harness(Duration::from_secs(1));
    let session = open(&mut h, None, &americano_cart()).await;

    let mut bad = form(0);
    bad.customer_phone = "12-34".into();
    let result = session.submit(&bad).await;
    assert!(matches!(
        result,
        Err(CheckoutError::Validation(ValidationError::InvalidPhone(_)))
    ));
    assert!(h.carts.try_recv().is_err());
    assert!(h.orders.try_recv().is_err());
}

#[tokio::test]
async fn test_second_submit_while_in_flight_is_refused() {
    let mut h = harness(Duration::from_secs(5));
    let cart = americano_cart();
    let session = open(&mut h, None, &cart).await;

    let first = submit(&session, form(0));
    // Hold the first submission at its cart read.
    let (_, _, snapshot_reply) = expect_action(&mut h.carts).await.unwrap();

    assert_eq!(
        session.submit(&form(0)).await,
        Err(CheckoutError::SubmissionInFlight)
    );

    snapshot_reply
        .send(Ok(CartActionResult::Snapshot(cart)))
        .unwrap();
    let order_id = OrderId::new();
    let (params, reply) = expect_create(&mut h.orders).await.unwrap();
    assert_eq!(params.total, 4_400);
    assert_eq!(params.redemption, None);
    reply.send(Ok(order_id)).unwrap();
    answer_stored(&mut h.orders, order_id, &params).await;
    answer_clear(&mut h.carts).await;

    match first.await.unwrap() {
        Ok(SubmitOutcome::Placed(placed)) => {
            assert_eq!(placed.order_id, order_id);
            assert_eq!(placed.total, 4_400);
        }
        other => panic!("unexpected outcome: {other:?}"),
    }
}

#[tokio::test]
async fn test_timeout_leaves_cart_and_retry_reuses_key() {
    let mut h = harness(Duration::from_millis(100));
    let cart = americano_cart();
    let session = open(&mut h, None, &cart).await;

    // First attempt: the order actor never answers.
    let attempt = submit(&session, form(0));
    answer_snapshot(&mut h.carts, &cart).await;
    let (first_params, _held_reply) = expect_create(&mut h.orders).await.unwrap();
    assert_eq!(
        attempt.await.unwrap(),
        Err(CheckoutError::Timeout {
            stage: Stage::PlaceOrder
        })
    );
    // The cart was not cleared.
    assert!(h.carts.try_recv().is_err());

    // Retry on the same session: same key, so the actor can dedupe.
    let retry = submit(&session, form(0));
    answer_snapshot(&mut h.carts, &cart).await;
    let (retry_params, reply) = expect_create(&mut h.orders).await.unwrap();
    assert_eq!(retry_params.idempotency_key, first_params.idempotency_key);
    assert_eq!(retry_params.idempotency_key, session.idempotency_key());
    let order_id = OrderId::new();
    reply.send(Ok(order_id)).unwrap();
    answer_stored(&mut h.orders, order_id, &retry_params).await;
    answer_clear(&mut h.carts).await;

    assert!(matches!(
        retry.await.unwrap(),
        Ok(SubmitOutcome::Placed(placed)) if placed.order_id == order_id
    ));
}

#[tokio::test]
async fn test_cart_clear_failure_is_partial() {
    let mut h = harness(Duration::from_secs(5));
    let cart = americano_cart();
    let session = open(&mut h, None, &cart).await;

    let attempt = submit(&session, form(0));
    answer_snapshot(&mut h.carts, &cart).await;
    let order_id = OrderId::new();
    let (params, reply) = expect_create(&mut h.orders).await.unwrap();
    reply.send(Ok(order_id)).unwrap();
    answer_stored(&mut h.orders, order_id, &params).await;

    let (_, _, reply) = expect_action(&mut h.carts).await.unwrap();
    reply
        .send(Err(FrameworkError::EntityError(Box::new(CartError::Storage(
            "disk full".into(),
        )))))
        .unwrap();

    let err = attempt.await.unwrap().unwrap_err();
    assert!(err.is_partial_failure());
    assert_eq!(err.placed_order(), Some(order_id));
    assert_eq!(err.user_message(), GENERIC_FAILURE_MESSAGE);

    // The retry neither re-reads the cart nor places again; it finishes the clear.
    let retry = submit(&session, form(0));
    answer_stored(&mut h.orders, order_id, &params).await;
    answer_clear(&mut h.carts).await;
    assert!(matches!(
        retry.await.unwrap(),
        Ok(SubmitOutcome::Placed(placed)) if placed.order_id == order_id && placed.total == 4_400
    ));
    assert!(h.orders.try_recv().is_err());
}

#[tokio::test]
async fn test_signed_in_customer_redeems_clamped_points() {
    let mut h = harness(Duration::from_secs(5));
    let cart = americano_cart();
    let me = AuthenticatedCustomer {
        id: CustomerId(7),
        phone: "01012345678".into(),
        name: None,
        loyalty_points: 500,
    };
    h.customers
        .expect_action(CustomerId(7))
        .return_ok(CustomerActionResult::Balance(500));
    let session = open(&mut h, Some(me), &cart).await;
    assert!(session.loyalty().is_active());

    // Ask for far more than the balance.
    let attempt = submit(&session, form(10_000));
    answer_snapshot(&mut h.carts, &cart).await;
    let order_id = OrderId::new();
    let (params, reply) = expect_create(&mut h.orders).await.unwrap();
    assert_eq!(params.customer_id, Some(CustomerId(7)));
    assert_eq!(
        params.redemption,
        Some(Redemption {
            points: 500,
            discount: 500
        })
    );
    assert_eq!(params.total, 3_900);
    assert_eq!(params.customer_phone, "01012345678");
    reply.send(Ok(order_id)).unwrap();
    answer_stored(&mut h.orders, order_id, &params).await;
    answer_clear(&mut h.carts).await;

    match attempt.await.unwrap() {
        Ok(SubmitOutcome::Placed(placed)) => {
            assert_eq!(placed.points_redeemed, 500);
            assert_eq!(placed.total, 3_900);
        }
        other => panic!("unexpected outcome: {other:?}"),
    }
    h.customers.verify();
}

#[tokio::test]
async fn test_completed_session_refuses_another_submit() {
    let mut h = harness(Duration::from_secs(5));
    let cart = americano_cart();
    let session = open(&mut h, None, &cart).await;

    let attempt = submit(&session, form(0));
    answer_snapshot(&mut h.carts, &cart).await;
    let order_id = OrderId::new();
    let (params, reply) = expect_create(&mut h.orders).await.unwrap();
    reply.send(Ok(order_id)).unwrap();
    answer_stored(&mut h.orders, order_id, &params).await;
    answer_clear(&mut h.carts).await;
    assert!(matches!(
        attempt.await.unwrap(),
        Ok(SubmitOutcome::Placed(_))
    ));

    // A new cart filled after checkout must not ride on the finished session.
    let err = session.submit(&form(0)).await.unwrap_err();
    assert_eq!(err, CheckoutError::SessionCompleted { order_id });
    assert_eq!(err.placed_order(), Some(order_id));
    assert!(h.carts.try_recv().is_err());
    assert!(h.orders.try_recv().is_err());
}

/// The held placement landed with one americano; the retry sees two in the cart. The key
/// returns the stored order, which does not match, so the cart is left alone.
#[tokio::test]
async fn test_repeated_key_for_a_different_cart_keeps_the_cart() {
    let mut h = harness(Duration::from_millis(100));
    let session = open(&mut h, None, &americano_cart()).await;

    let attempt = submit(&session, form(0));
    answer_snapshot(&mut h.carts, &americano_cart()).await;
    let (first_params, _held_reply) = expect_create(&mut h.orders).await.unwrap();
    assert!(matches!(
        attempt.await.unwrap(),
        Err(CheckoutError::Timeout { .. })
    ));

    let retry = submit(&session, form(0));
    answer_snapshot(&mut h.carts, &americanos(2)).await;
    let (retry_params, reply) = expect_create(&mut h.orders).await.unwrap();
    assert_eq!(retry_params.total, 8_800);
    let order_id = OrderId::new();
    reply.send(Ok(order_id)).unwrap();
    answer_stored(&mut h.orders, order_id, &first_params).await;

    assert_eq!(
        retry.await.unwrap(),
        Err(CheckoutError::SessionCompleted { order_id })
    );
    assert!(h.carts.try_recv().is_err());
}

/// Real customer and order actors. The first submit debits 500 points and then fails to
/// clear the cart. By the retry the balance is 0, yet the order stored 500 points and 3900,
/// and that is what the retry reports.
#[tokio::test]
async fn test_retry_after_partial_failure_reports_stored_figures() {
    let (customer_actor, customers) = customer_actor::new(8);
    let customer_handle = tokio::spawn(customer_actor.run(()));
    let (order_actor, orders) = order_actor::new(8);
    let order_handle = tokio::spawn(order_actor.run(customers.clone()));
    let (cart_client, mut carts) = create_mock_client::<Cart>(8);

    let me = customers
        .create_customer(CustomerCreate {
            phone: "01012345678".into(),
            name: None,
        })
        .await
        .unwrap();
    customers.earn_points(me, None, 500).await.unwrap();

    let ctx = CheckoutContext {
        catalog: Arc::new(common::catalog()),
        cart: CartClient::new(cart_client),
        customers: customers.clone(),
        orders: orders.clone(),
        auth: None,
        settings: CheckoutSettings::default(),
    };
    let customer = AuthenticatedCustomer {
        id: me,
        phone: "01012345678".into(),
        name: None,
        loyalty_points: 500,
    };
    let cart = americano_cart();
    let opening = tokio::spawn(CheckoutSession::open_for(ctx, Some(customer)));
    answer_snapshot(&mut carts, &cart).await;
    let session = match opening.await.unwrap().unwrap() {
        CheckoutEntry::Ready(session) => Arc::new(session),
        CheckoutEntry::BackToCart => panic!("expected a ready session"),
    };

    let attempt = submit(&session, form(10_000));
    answer_snapshot(&mut carts, &cart).await;
    let (_, action, reply) = expect_action(&mut carts).await.unwrap();
    assert!(matches!(action, CartAction::Clear));
    reply
        .send(Err(FrameworkError::EntityError(Box::new(CartError::Storage(
            "disk full".into(),
        )))))
        .unwrap();
    let order_id = attempt.await.unwrap().unwrap_err().placed_order().unwrap();
    assert_eq!(customers.account(me).await.unwrap(), 0);

    let retry = submit(&session, form(10_000));
    answer_clear(&mut carts).await;
    let placed = match retry.await.unwrap() {
        Ok(SubmitOutcome::Placed(placed)) => placed,
        other => panic!("unexpected outcome: {other:?}"),
    };

    let stored = orders.get(order_id).await.unwrap().unwrap();
    assert_eq!(placed.order_id, order_id);
    assert_eq!(placed.total, 3_900);
    assert_eq!(placed.points_redeemed, 500);
    assert_eq!(placed.total, stored.total);
    assert_eq!(placed.points_redeemed, stored.points_redeemed);
    assert_eq!(placed.pickup_window, stored.pickup_window);
    assert_eq!(orders.list().await.unwrap().len(), 1);
    assert_eq!(customers.account(me).await.unwrap(), 0);

    drop(session);
    drop(orders);
    order_handle.await.unwrap();
    drop(customers);
    customer_handle.await.unwrap();
}
