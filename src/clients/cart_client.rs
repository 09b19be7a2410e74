//! # Cart Client
//!
//! High-level API over the Cart actor. Every method is one actor message.
use crate::cart_actor::{CartAction, CartActionResult, CartError};
use crate::model::{
    Cart, CartId, LineKey, MenuItem, MenuItemId, Modifier, ModifierChoice, ModifierKey, StoreId,
};
use actor_framework::{ActorClient, FrameworkError, ResourceClient};
use async_trait::async_trait;
use tracing::{debug, instrument};

/// Client for the device-local cart.
#[derive(Clone)]
pub struct CartClient {
    inner: ResourceClient<Cart>,
    id: CartId,
}

impl CartClient {
    pub fn new(inner: ResourceClient<Cart>) -> Self {
        Self {
            inner,
            id: CartId::LOCAL,
        }
    }

    async fn act(&self, action: CartAction) -> Result<CartActionResult, CartError> {
        self.inner
            .perform_action(self.id, action)
            .await
            .map_err(Self::map_error)
    }

    /// Adds one unit of `item` browsed at `store`. Returns the key of the line it landed on.
    #[instrument(skip(self, item, modifiers), fields(item_id = %item.id))]
    pub async fn add_line(
        &self,
        store: &StoreId,
        item: &MenuItem,
        modifiers: &[Modifier],
        choices: &[ModifierChoice],
    ) -> Result<LineKey, CartError> {
        debug!("Sending request");
        let action = CartAction::AddLine {
            store: store.clone(),
            item: item.clone(),
            modifiers: modifiers.to_vec(),
            choices: choices.to_vec(),
        };
        match self.act(action).await? {
            CartActionResult::AddLine(key) => Ok(key),
            other => Err(unexpected(other)),
        }
    }

    /// Removes every line of `item_id`. Returns how many lines went.
    #[instrument(skip(self))]
    pub async fn remove_line(&self, item_id: &MenuItemId) -> Result<usize, CartError> {
        debug!("Sending request");
        match self.act(CartAction::RemoveLine(item_id.clone())).await? {
            CartActionResult::RemoveLine(removed) => Ok(removed),
            other => Err(unexpected(other)),
        }
    }

    #[instrument(skip(self))]
    pub async fn set_quantity(
        &self,
        item_id: &MenuItemId,
        modifier_key: &ModifierKey,
        quantity: i64,
    ) -> Result<bool, CartError> {
        debug!("Sending request");
        let action = CartAction::SetQuantity {
            item_id: item_id.clone(),
            modifier_key: modifier_key.clone(),
            quantity,
        };
        match self.act(action).await? {
            CartActionResult::SetQuantity(found) => Ok(found),
            other => Err(unexpected(other)),
        }
    }

    #[instrument(skip(self))]
    pub async fn clear(&self) -> Result<(), CartError> {
        debug!("Sending request");
        match self.act(CartAction::Clear).await? {
            CartActionResult::Clear(()) => Ok(()),
            other => Err(unexpected(other)),
        }
    }

    /// A copy of the cart as the actor holds it right now.
    #[instrument(skip(self))]
    pub async fn snapshot(&self) -> Result<Cart, CartError> {
        match self.act(CartAction::Snapshot).await? {
            CartActionResult::Snapshot(cart) => Ok(cart),
            other => Err(unexpected(other)),
        }
    }
}

fn unexpected(result: CartActionResult) -> CartError {
    CartError::ActorCommunicationError(format!("unexpected action result: {result:?}"))
}

#[async_trait]
impl ActorClient<Cart> for CartClient {
    type Error = CartError;

    fn inner(&self) -> &ResourceClient<Cart> {
        &self.inner
    }

    /// Entity errors come back as the `CartError` the actor raised.
    fn map_error(e: FrameworkError) -> Self::Error {
        match e.entity_error::<CartError>() {
            Some(cart_error) => cart_error.clone(),
            None => CartError::ActorCommunicationError(e.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::BrandId;
    use actor_framework::mock::{create_mock_client, expect_action};

    fn toast() -> MenuItem {
        MenuItem {
            id: MenuItemId::new("toast"),
            brand_id: BrandId::new("brand"),
            store_id: None,
            category_id: None,
            name: "Toast".into(),
            description: None,
            price: 3_000,
            available: true,
        }
    }

    #[tokio::test]
    async fn test_add_line_sends_the_local_cart_action() {
        let (client, mut receiver) = create_mock_client::<Cart>(10);
        let cart_client = CartClient::new(client);

        let add_task = tokio::spawn(async move {
            cart_client
                .add_line(&StoreId::new("a"), &toast(), &[], &[])
                .await
        });

        let (id, action, responder) = expect_action(&mut receiver)
            .await
            .expect("Expected Action request");
        assert_eq!(id, CartId::LOCAL);
        match action {
            CartAction::AddLine { store, item, .. } => {
                assert_eq!(store, StoreId::new("a"));
                assert_eq!(item.id, MenuItemId::new("toast"));
            }
            other => panic!("Expected AddLine, got {other:?}"),
        }

        let key = LineKey {
            item_id: MenuItemId::new("toast"),
            modifier_key: ModifierKey::default(),
        };
        responder
            .send(Ok(CartActionResult::AddLine(key.clone())))
            .unwrap();

        assert_eq!(add_task.await.unwrap().unwrap(), key);
    }

    #[tokio::test]
    async fn test_entity_error_keeps_its_type() {
        let (client, mut receiver) = create_mock_client::<Cart>(10);
        let cart_client = CartClient::new(client);

        let add_task = tokio::spawn(async move {
            cart_client
                .add_line(&StoreId::new("b"), &toast(), &[], &[])
                .await
        });

        let (_, _, responder) = expect_action(&mut receiver).await.unwrap();
        let cross_store = CartError::CrossStore {
            bound: StoreId::new("a"),
            attempted: StoreId::new("b"),
        };
        responder
            .send(Err(FrameworkError::EntityError(Box::new(cross_store.clone()))))
            .unwrap();

        assert_eq!(add_task.await.unwrap().unwrap_err(), cross_store);
    }

    #[tokio::test]
    async fn test_mismatched_result_is_reported() {
        let (client, mut receiver) = create_mock_client::<Cart>(10);
        let cart_client = CartClient::new(client);

        let clear_task = tokio::spawn(async move { cart_client.clear().await });
        let (_, _, responder) = expect_action(&mut receiver).await.unwrap();
        responder.send(Ok(CartActionResult::RemoveLine(0))).unwrap();

        assert!(matches!(
            clear_task.await.unwrap(),
            Err(CartError::ActorCommunicationError(_))
        ));
    }
}
