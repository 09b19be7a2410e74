//! # Generic Actor Server
//!
//! `ResourceActor` owns the store for one entity type and processes requests one at a time.
//! Each request is a complete read-modify-write against the current state, so two clients
//! racing to mutate the same entity can never lose an update.

use crate::client::ResourceClient;
use crate::entity::ActorEntity;
use crate::error::FrameworkError;
use crate::message::ResourceRequest;
use std::collections::HashMap;
use tokio::sync::{broadcast, mpsc};
use tracing::{debug, info, warn};

/// Capacity of each per-entity change feed.
const WATCH_CAPACITY: usize = 64;

/// The generic actor that manages a collection of entities.
///
/// # Architecture Note
/// This struct is the "Server" half of the actor. It owns the state (`store`) and
/// the receiver end of the channel. It runs in its own Tokio task and is the only
/// writer of its store, so no `Mutex` guards the entities.
///
/// # Usage Pattern
///
/// 1.  **Create**: `ResourceActor::new(buffer, next_id)` returns the actor and its client.
/// 2.  **Seed** (optional): load previously persisted entities with [`ResourceActor::seed`].
/// 3.  **Wire & Run**: spawn `actor.run(context)` with the dependencies the hooks need.
///
/// ## Operations
///
/// * **Create**: looks up the idempotency key first and answers with the existing id on a
///   repeat. Otherwise mints an id, builds the entity, runs `on_create` and only then
///   inserts it. A failing hook leaves the store untouched.
/// * **Get / List**: clones out of the store.
/// * **Update**: runs `on_update` in place, then publishes the update to the entity's
///   watchers.
/// * **Delete**: runs `on_delete`, removes the entity and closes its change feed.
/// * **Action**: runs `handle_action` in place.
/// * **Watch**: hands out a receiver on the entity's change feed.
pub struct ResourceActor<T: ActorEntity> {
    receiver: mpsc::Receiver<ResourceRequest<T>>,
    store: HashMap<T::Id, T>,
    idempotency: HashMap<String, T::Id>,
    watchers: HashMap<T::Id, broadcast::Sender<T::Update>>,
    next_id: Box<dyn Fn() -> T::Id + Send + Sync>,
}

impl<T: ActorEntity> ResourceActor<T> {
    /// Creates a new `ResourceActor` and its associated `ResourceClient`.
    ///
    /// * `buffer_size` - capacity of the request channel; senders wait when it is full.
    /// * `next_id` - mints the id for every successful `Create`.
    pub fn new(
        buffer_size: usize,
        next_id: impl Fn() -> T::Id + Send + Sync + 'static,
    ) -> (Self, ResourceClient<T>) {
        let (sender, receiver) = mpsc::channel(buffer_size);
        let actor = Self {
            receiver,
            store: HashMap::new(),
            idempotency: HashMap::new(),
            watchers: HashMap::new(),
            next_id: Box::new(next_id),
        };
        let client = ResourceClient::new(sender);
        (actor, client)
    }

    /// Inserts an already-built entity before the loop starts, e.g. one restored from disk.
    pub fn seed(&mut self, id: T::Id, entity: T) {
        self.store.insert(id, entity);
    }

    fn publish(&mut self, id: &T::Id, update: &T::Update) {
        let Some(sender) = self.watchers.get(id) else {
            return;
        };
        if sender.send(update.clone()).is_err() {
            // Every receiver is gone; drop the feed until someone watches again.
            self.watchers.remove(id);
        }
    }

    /// Runs the actor's event loop, processing messages until the channel closes.
    ///
    /// # Context Injection
    /// `context` is handed to every entity hook, which lets entities call actors that were
    /// created after this one.
    pub async fn run(mut self, context: T::Context) {
        // Extract just the type name (e.g. "Order" instead of "storefront_checkout::model::order::Order")
        let entity_type = std::any::type_name::<T>()
            .split("::")
            .last()
            .unwrap_or("Unknown");
        info!(entity_type, seeded = self.store.len(), "Actor started");

        while let Some(msg) = self.receiver.recv().await {
            match msg {
                ResourceRequest::Create { params, respond_to } => {
                    debug!(entity_type, ?params, "Create");
                    let key = T::idempotency_key(&params);
                    if let Some(existing) = key
                        .as_ref()
                        .and_then(|k| self.idempotency.get(k))
                        .filter(|id| self.store.contains_key(*id))
                    {
                        info!(entity_type, id = %existing, "Duplicate create, returning existing");
                        let _ = respond_to.send(Ok(existing.clone()));
                        continue;
                    }

                    let id = (self.next_id)();
                    match T::from_create_params(id.clone(), params) {
                        Ok(mut item) => {
                            if let Err(e) = item.on_create(&context).await {
                                warn!(entity_type, error = %e, "on_create failed");
                                let _ =
                                    respond_to.send(Err(FrameworkError::EntityError(Box::new(e))));
                                continue;
                            }
                            self.store.insert(id.clone(), item);
                            if let Some(key) = key {
                                self.idempotency.insert(key, id.clone());
                            }
                            info!(entity_type, %id, size = self.store.len(), "Created");
                            let _ = respond_to.send(Ok(id));
                        }
                        Err(e) => {
                            warn!(entity_type, error = %e, "Create failed");
                            let _ = respond_to.send(Err(FrameworkError::EntityError(Box::new(e))));
                        }
                    }
                }
                ResourceRequest::Get { id, respond_to } => {
                    let item = self.store.get(&id).cloned();
                    let found = item.is_some();
                    debug!(entity_type, %id, found, "Get");
                    let _ = respond_to.send(Ok(item));
                }
                ResourceRequest::List { respond_to } => {
                    debug!(entity_type, size = self.store.len(), "List");
                    let _ = respond_to.send(Ok(self.store.values().cloned().collect()));
                }
                ResourceRequest::Update {
                    id,
                    update,
                    respond_to,
                } => {
                    debug!(entity_type, %id, ?update, "Update");
                    let Some(item) = self.store.get_mut(&id) else {
                        warn!(entity_type, %id, "Not found");
                        let _ = respond_to.send(Err(FrameworkError::NotFound(id.to_string())));
                        continue;
                    };
                    if let Err(e) = item.on_update(update.clone(), &context).await {
                        warn!(entity_type, %id, error = %e, "Update failed");
                        let _ = respond_to.send(Err(FrameworkError::EntityError(Box::new(e))));
                        continue;
                    }
                    let snapshot = item.clone();
                    self.publish(&id, &update);
                    info!(entity_type, %id, "Updated");
                    let _ = respond_to.send(Ok(snapshot));
                }
                ResourceRequest::Delete { id, respond_to } => {
                    debug!(entity_type, %id, "Delete");
                    let Some(item) = self.store.get(&id) else {
                        warn!(entity_type, %id, "Not found");
                        let _ = respond_to.send(Err(FrameworkError::NotFound(id.to_string())));
                        continue;
                    };
                    if let Err(e) = item.on_delete(&context).await {
                        warn!(entity_type, %id, error = %e, "on_delete failed");
                        let _ = respond_to.send(Err(FrameworkError::EntityError(Box::new(e))));
                        continue;
                    }
                    self.store.remove(&id);
                    self.watchers.remove(&id);
                    self.idempotency.retain(|_, stored| *stored != id);
                    info!(entity_type, %id, size = self.store.len(), "Deleted");
                    let _ = respond_to.send(Ok(()));
                }
                ResourceRequest::Action {
                    id,
                    action,
                    respond_to,
                } => {
                    debug!(entity_type, %id, ?action, "Action");
                    let Some(item) = self.store.get_mut(&id) else {
                        warn!(entity_type, %id, "Not found");
                        let _ = respond_to.send(Err(FrameworkError::NotFound(id.to_string())));
                        continue;
                    };
                    let result = item
                        .handle_action(action, &context)
                        .await
                        .map_err(|e| FrameworkError::EntityError(Box::new(e)));
                    match &result {
                        Ok(_) => info!(entity_type, %id, "Action ok"),
                        Err(e) => warn!(entity_type, %id, error = %e, "Action failed"),
                    }
                    let _ = respond_to.send(result);
                }
                ResourceRequest::Watch { id, respond_to } => {
                    if !self.store.contains_key(&id) {
                        warn!(entity_type, %id, "Watch on unknown entity");
                        let _ = respond_to.send(Err(FrameworkError::NotFound(id.to_string())));
                        continue;
                    }
                    let receiver = self
                        .watchers
                        .entry(id.clone())
                        .or_insert_with(|| broadcast::channel(WATCH_CAPACITY).0)
                        .subscribe();
                    debug!(entity_type, %id, "Watch");
                    let _ = respond_to.send(Ok(receiver));
                }
            }
        }

        info!(entity_type, size = self.store.len(), "Shutdown");
    }
}
