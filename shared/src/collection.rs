use std::cell::RefCell;
use std::rc::Rc;

use serde_json::Value;

use crate::address::Address;
use crate::connection::{ConnectionRef, MessageHandler};
use crate::entity::{EntityConfig, EntityCore};
use crate::error::SyncError;
use crate::model::{Model, SyncModel};
use crate::sync::Syncable;
use crate::types::EntityId;

/// A collection decorated with synchronization capability. Owns an ordered
/// set of sync-capable models, a fixed address, and a factory used to
/// construct models from inbound attribute payloads.
///
/// Cheap to clone; clones share the same contents and the same state.
pub struct SyncCollection<M: Model> {
    models: Rc<RefCell<Vec<SyncModel<M>>>>,
    core: Rc<EntityCore>,
    address: Address,
    factory: Rc<dyn Fn(&Value) -> M>,
    config: EntityConfig,
}

impl<M: Model> Clone for SyncCollection<M> {
    fn clone(&self) -> Self {
        Self {
            models: self.models.clone(),
            core: self.core.clone(),
            address: self.address.clone(),
            factory: self.factory.clone(),
            config: self.config.clone(),
        }
    }
}

impl<M: Model + 'static> SyncCollection<M> {
    pub fn new(
        address: impl Into<Address>,
        factory: impl Fn(&Value) -> M + 'static,
        config: EntityConfig,
    ) -> Self {
        Self {
            models: Rc::new(RefCell::new(Vec::new())),
            core: EntityCore::new(config.clone()),
            address: address.into(),
            factory: Rc::new(factory),
            config,
        }
    }

    pub fn core(&self) -> &Rc<EntityCore> {
        &self.core
    }

    pub fn address(&self) -> &Address {
        &self.address
    }

    /// Constructs a model from inbound attributes, wrapped with the same
    /// configuration as the collection.
    pub fn spawn(&self, attrs: &Value) -> SyncModel<M> {
        SyncModel::new((self.factory)(attrs), self.config.clone())
    }

    /// Adds a model and subscribes to its local `remove` event, so a model
    /// deleted through its own bindings leaves the collection on its own.
    pub fn add(&self, model: SyncModel<M>) {
        let models = Rc::downgrade(&self.models);
        let model_core = Rc::downgrade(model.core());
        let on_remove: Rc<MessageHandler> = Rc::new(move |_data, _ack| {
            if let (Some(models), Some(model_core)) = (models.upgrade(), model_core.upgrade()) {
                models
                    .borrow_mut()
                    .retain(|m| !Rc::ptr_eq(m.core(), &model_core));
            }
        });
        model.core().emitter().on("remove", on_remove);
        self.models.borrow_mut().push(model);
    }

    pub fn get(&self, id: &EntityId) -> Option<SyncModel<M>> {
        self.models
            .borrow()
            .iter()
            .find(|m| m.id().as_ref() == Some(id))
            .cloned()
    }

    pub fn remove(&self, id: &EntityId) -> Option<SyncModel<M>> {
        let mut models = self.models.borrow_mut();
        let pos = models.iter().position(|m| m.id().as_ref() == Some(id))?;
        Some(models.remove(pos))
    }

    /// Snapshot of the contained models. Cloned out so callers may mutate
    /// the collection while iterating.
    pub fn models(&self) -> Vec<SyncModel<M>> {
        self.models.borrow().clone()
    }

    pub fn len(&self) -> usize {
        self.models.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.borrow().is_empty()
    }

    /// The collection's full serialized contents: a JSON array of each
    /// model's attributes, in insertion order.
    pub fn serialized(&self) -> Value {
        Value::Array(self.models.borrow().iter().map(|m| m.attributes()).collect())
    }

    /// Establishes a process-local identity if none is set yet.
    pub fn ensure_local_id(&self) {
        if self.core.id().is_none() {
            self.core.establish_id(EntityId::local());
        }
    }

    /// Bridge-binds `event` against the collection's address.
    pub fn bind(
        &self,
        event: &str,
        connection: Option<&ConnectionRef>,
        callback: Rc<MessageHandler>,
    ) -> Result<(), SyncError> {
        self.core.bind(&self.address, event, connection, callback)
    }

    pub fn unbind(
        &self,
        event: &str,
        connection: Option<&ConnectionRef>,
        callback: Option<&Rc<MessageHandler>>,
    ) -> Result<(), SyncError> {
        self.core.unbind(event, connection, callback)
    }

    pub fn unbind_all(&self, connection: Option<&ConnectionRef>) -> Result<(), SyncError> {
        self.core.unbind_all(connection)
    }
}

impl<M: Model + 'static> Syncable for SyncCollection<M> {
    fn core(&self) -> &Rc<EntityCore> {
        &self.core
    }

    fn sync_address(&self) -> Option<Address> {
        Some(self.address.clone())
    }

    fn serialized(&self) -> Value {
        self.serialized()
    }
}
