use std::cell::RefCell;
use std::rc::Rc;

use serde_json::Value;

use crate::address::Address;
use crate::connection::{ConnectionRef, MessageHandler};
use crate::entity::{EntityConfig, EntityCore};
use crate::error::SyncError;
use crate::sync::{sync, SyncMethod, SyncOptions, Syncable};
use crate::types::EntityId;

/// Collaborator surface supplied by the data-binding framework for a
/// model-like entity. This layer never reimplements attribute storage,
/// validation, or address computation; it only calls them.
pub trait Model {
    /// Identity carried in the model's attributes, if any.
    fn attr_id(&self) -> Option<EntityId>;

    /// The model's canonical address (its route), if resolvable.
    fn address(&self) -> Option<Address>;

    /// Serialized attribute set, as a plain JSON object.
    fn attributes(&self) -> Value;

    /// Applies incoming attributes through the framework's validated set.
    /// Returning false rejects the mutation; nothing may be persisted.
    fn apply(&mut self, attrs: &Value) -> bool;
}

/// A model decorated with synchronization capability: the event bridge,
/// the attached-connection registry, and sync-adapter entry points.
///
/// Cheap to clone; clones share the same model and the same state.
pub struct SyncModel<M: Model> {
    inner: Rc<RefCell<M>>,
    core: Rc<EntityCore>,
}

impl<M: Model> Clone for SyncModel<M> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
            core: self.core.clone(),
        }
    }
}

impl<M: Model> SyncModel<M> {
    pub fn new(model: M, config: EntityConfig) -> Self {
        Self {
            inner: Rc::new(RefCell::new(model)),
            core: EntityCore::new(config),
        }
    }

    pub fn core(&self) -> &Rc<EntityCore> {
        &self.core
    }

    pub fn inner(&self) -> &Rc<RefCell<M>> {
        &self.inner
    }

    /// Establishes identity from the model's attributes if none is set yet.
    pub fn ensure_id(&self) {
        if self.core.id().is_none() {
            if let Some(id) = self.inner.borrow().attr_id() {
                self.core.establish_id(id);
            }
        }
    }

    pub fn id(&self) -> Option<EntityId> {
        self.core.id().or_else(|| self.inner.borrow().attr_id())
    }

    pub fn address(&self) -> Result<Address, SyncError> {
        self.inner.borrow().address().ok_or(SyncError::NoAddress)
    }

    pub fn attributes(&self) -> Value {
        self.inner.borrow().attributes()
    }

    /// Applies incoming attributes; false means the framework rejected them.
    pub fn apply(&self, attrs: &Value) -> bool {
        self.inner.borrow_mut().apply(attrs)
    }

    /// Emits `event` on the model's local emitter.
    pub fn trigger(&self, event: &str, data: &Value) {
        self.core.emitter().trigger(event, data, None);
    }

    /// Bridge-binds `event` against this model's address.
    pub fn bind(
        &self,
        event: &str,
        connection: Option<&ConnectionRef>,
        callback: Rc<MessageHandler>,
    ) -> Result<(), SyncError> {
        let address = self.address()?;
        self.core.bind(&address, event, connection, callback)
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

    /// Persists the model: an `update` sync in the model's configured mode.
    pub fn save(&self) -> Result<(), SyncError> {
        sync(SyncMethod::Update, Some(self), SyncOptions::new())
    }

    /// Destroys the model: a `delete` sync in the model's configured mode.
    pub fn destroy(&self) -> Result<(), SyncError> {
        sync(SyncMethod::Delete, Some(self), SyncOptions::new())
    }
}

impl<M: Model> Syncable for SyncModel<M> {
    fn core(&self) -> &Rc<EntityCore> {
        &self.core
    }

    fn sync_address(&self) -> Option<Address> {
        self.inner.borrow().address()
    }

    fn serialized(&self) -> Value {
        self.inner.borrow().attributes()
    }
}
