mod common;

use storefront_checkout::cart_actor;
use storefront_checkout::clients::CartClient;
use storefront_checkout::model::Cart;
use storefront_checkout::storage::{LocalStore, CART_KEY};
use tokio::task::JoinHandle;

async fn start(dir: &std::path::Path) -> (CartClient, LocalStore, JoinHandle<()>) {
    let store = LocalStore::open(dir).await.unwrap();
    let (actor, cart) = cart_actor::new(32);
    let handle = tokio::spawn(actor.run(store.clone()));
    (cart, store, handle)
}

/// Rapid taps on the same item all land on one line, and the saved cart matches.
#[tokio::test]
async fn test_concurrent_adds_of_same_line_merge() {
    const TAPS: u32 = 20;
    let dir = tempfile::tempdir().unwrap();
    let (cart, store, handle) = start(dir.path()).await;
    let croissant = common::item(&common::catalog(), "item_croissant");

    let adds: Vec<_> = (0..TAPS)
        .map(|_| {
            let cart = cart.clone();
            let croissant = croissant.clone();
            tokio::spawn(async move {
                cart.add_line(&common::gangnam(), &croissant, &[], &[])
                    .await
            })
        })
        .collect();
    let mut keys = Vec::new();
    for add in adds {
        keys.push(add.await.unwrap().unwrap());
    }
    keys.dedup();
    assert_eq!(keys.len(), 1);

    let snapshot = cart.snapshot().await.unwrap();
    assert_eq!(snapshot.lines().len(), 1);
    assert_eq!(snapshot.lines()[0].quantity, TAPS);
    assert_eq!(snapshot.line_count(), TAPS);
    assert_eq!(snapshot.subtotal(), 3_800 * u64::from(TAPS));

    let saved = store.load::<Cart>(CART_KEY).await.unwrap().expect("cart not saved");
    assert_eq!(saved, snapshot);

    drop(cart);
    handle.await.unwrap();
}

/// Reading the cart never writes it.
#[tokio::test]
async fn test_snapshot_does_not_persist() {
    let dir = tempfile::tempdir().unwrap();
    let (cart, store, handle) = start(dir.path()).await;

    assert!(cart.snapshot().await.unwrap().is_empty());
    assert_eq!(store.load::<Cart>(CART_KEY).await.unwrap(), None);

    drop(cart);
    handle.await.unwrap();
}
