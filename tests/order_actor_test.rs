mod common;

use actor_framework::mock::MockClient;
use actor_framework::{ActorClient, FrameworkError};
use chrono::Utc;
use storefront_checkout::clients::CustomerClient;
use storefront_checkout::customer_actor::{CustomerActionResult, CustomerError};
use storefront_checkout::model::{Customer, CustomerId, LoyaltyTransaction, OrderStatus, PaymentStatus};
use storefront_checkout::order_actor::{self, OrderError};

fn spent(points: u64, balance: u64) -> LoyaltyTransaction {
    LoyaltyTransaction {
        customer_id: CustomerId(1),
        order_id: None,
        points_earned: 0,
        points_spent: points,
        balance,
        created_at: Utc::now(),
    }
}

/// Real Order actor with a mocked Customer dependency.
/// The debit happens in `Order::on_create`, so the mock sees exactly one Spend action.
#[tokio::test]
async fn test_order_with_points_debits_customer() {
    let mut customers = MockClient::<Customer>::new();
    customers
        .expect_action(CustomerId(1))
        .return_ok(CustomerActionResult::Spend(spent(300, 700)));

    let (order_actor, order_client) = order_actor::new(8);
    let actor_handle = tokio::spawn(order_actor.run(CustomerClient::new(customers.client())));

    let order_id = order_client
        .place(common::order_params("key-1", Some(CustomerId(1)), 300))
        .await
        .expect("order placement failed");

    let order = order_client.get(order_id).await.unwrap().expect("order not stored");
    assert_eq!(order.points_redeemed, 300);
    assert_eq!(order.points_discount, 300);
    assert_eq!(order.total, 4_100);
    assert_eq!(order.status, OrderStatus::Pending);
    assert_eq!(order.payment_status, PaymentStatus::Pending);

    customers.verify();

    drop(order_client);
    actor_handle.await.unwrap();
}

/// A refused debit must leave no order behind.
#[tokio::test]
async fn test_failed_debit_stores_no_order() {
    let mut customers = MockClient::<Customer>::new();
    customers
        .expect_action(CustomerId(1))
        .return_err(FrameworkError::EntityError(Box::new(
            CustomerError::InsufficientPoints {
                requested: 300,
                available: 100,
            },
        )));

    let (order_actor, order_client) = order_actor::new(8);
    let actor_handle = tokio::spawn(order_actor.run(CustomerClient::new(customers.client())));

    let result = order_client
        .place(common::order_params("key-1", Some(CustomerId(1)), 300))
        .await;
    assert_eq!(
        result,
        Err(OrderError::Loyalty(CustomerError::InsufficientPoints {
            requested: 300,
            available: 100,
        }))
    );
    assert!(order_client.list().await.unwrap().is_empty());
    customers.verify();

    drop(order_client);
    actor_handle.await.unwrap();
}

/// The same idempotency key places one order and debits once.
#[tokio::test]
async fn test_repeated_key_returns_first_order() {
    let mut customers = MockClient::<Customer>::new();
    customers
        .expect_action(CustomerId(1))
        .return_ok(CustomerActionResult::Spend(spent(300, 700)));

    let (order_actor, order_client) = order_actor::new(8);
    let actor_handle = tokio::spawn(order_actor.run(CustomerClient::new(customers.client())));

    let first = order_client
        .place(common::order_params("checkout-abc", Some(CustomerId(1)), 300))
        .await
        .unwrap();
    let second = order_client
        .place(common::order_params("checkout-abc", Some(CustomerId(1)), 300))
        .await
        .unwrap();

    assert_eq!(first, second);
    assert_eq!(order_client.list().await.unwrap().len(), 1);
    // Only one Spend expectation was scripted; a second debit would have found none.
    customers.verify();

    drop(order_client);
    actor_handle.await.unwrap();
}

/// Guest orders never touch the customer actor, and bad figures are rejected up front.
#[tokio::test]
async fn test_guest_order_and_validation() {
    let customers = MockClient::<Customer>::new();
    let (order_actor, order_client) = order_actor::new(8);
    let actor_handle = tokio::spawn(order_actor.run(CustomerClient::new(customers.client())));

    let guest = order_client
        .place(common::order_params("guest", None, 0))
        .await
        .unwrap();
    assert_eq!(order_client.get(guest).await.unwrap().unwrap().total, 4_400);

    let stray_points = order_client
        .place(common::order_params("stray", None, 100))
        .await;
    assert!(matches!(stray_points, Err(OrderError::ValidationError(_))));

    let mut wrong_total = common::order_params("wrong", None, 0);
    wrong_total.total += 1;
    assert!(matches!(
        order_client.place(wrong_total).await,
        Err(OrderError::ValidationError(_))
    ));

    customers.verify();
    drop(order_client);
    actor_handle.await.unwrap();
}

/// History holds only the customer's own orders, newest first.
#[tokio::test]
async fn test_history_lists_customer_orders_newest_first() {
    let customers = MockClient::<Customer>::new();
    let (order_actor, order_client) = order_actor::new(8);
    let actor_handle = tokio::spawn(order_actor.run(CustomerClient::new(customers.client())));

    let mut mine = Vec::new();
    for key in ["first", "second", "third"] {
        mine.push(
            order_client
                .place(common::order_params(key, Some(CustomerId(1)), 0))
                .await
                .unwrap(),
        );
        order_client
            .place(common::order_params(&format!("{key}-guest"), None, 0))
            .await
            .unwrap();
        order_client
            .place(common::order_params(&format!("{key}-other"), Some(CustomerId(2)), 0))
            .await
            .unwrap();
    }

    let history = order_client.history(CustomerId(1)).await.unwrap();
    let ids: Vec<_> = history.iter().map(|order| order.id).collect();
    mine.reverse();
    assert_eq!(ids, mine);
    assert!(history
        .windows(2)
        .all(|pair| pair[0].created_at >= pair[1].created_at));
    assert_eq!(history[0].store.id, common::gangnam());

    assert!(order_client.history(CustomerId(3)).await.unwrap().is_empty());

    customers.verify();
    drop(order_client);
    actor_handle.await.unwrap();
}
