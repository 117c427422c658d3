use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use log::trace;
use serde_json::Value;

use crate::address::Address;
use crate::bridge::{Binding, BindingRegistry};
use crate::connection::{Ack, Connection, ConnectionRef, MessageHandler};
use crate::emitter::Emitter;
use crate::error::SyncError;
use crate::sync::SyncMode;
use crate::types::{ConnectionId, EntityId};

/// Construction-time configuration for a sync-capable entity.
#[derive(Clone)]
pub struct EntityConfig {
    /// Delivery mode used by the sync adapter for this entity.
    pub mode: SyncMode,
    /// Whether the role behaviors register their standard bindings
    /// (`update`/`delete` for models, `create`/`read` for collections).
    pub auto_bind: bool,
    /// Fallback connection, consulted after the entity's own attached
    /// connection when no explicit one is passed.
    pub default_connection: Option<ConnectionRef>,
}

impl EntityConfig {
    pub fn client(default_connection: ConnectionRef) -> Self {
        Self {
            mode: SyncMode::SingleConnection,
            auto_bind: true,
            default_connection: Some(default_connection),
        }
    }

    pub fn server() -> Self {
        Self {
            mode: SyncMode::FanOut,
            auto_bind: true,
            default_connection: None,
        }
    }

    pub fn without_auto_bind(mut self) -> Self {
        self.auto_bind = false;
        self
    }
}

impl Default for EntityConfig {
    fn default() -> Self {
        Self {
            mode: SyncMode::SingleConnection,
            auto_bind: true,
            default_connection: None,
        }
    }
}

/// Per-entity synchronization state: identity, the local emitter, the
/// binding registry, and the registry of attached connections. Owned
/// exclusively by one entity wrapper and never shared across entities.
pub struct EntityCore {
    id: RefCell<Option<EntityId>>,
    mode: SyncMode,
    auto_bind: bool,
    attached: RefCell<Option<ConnectionRef>>,
    default_connection: RefCell<Option<ConnectionRef>>,
    connections: RefCell<HashMap<ConnectionId, ConnectionRef>>,
    emitter: Emitter,
    bindings: RefCell<BindingRegistry>,
    // Listeners registered directly on a connection, outside the bridge.
    // Keyed by connection so role teardown can remove exactly its own.
    direct: RefCell<HashMap<ConnectionId, Vec<(String, Rc<MessageHandler>)>>>,
}

impl EntityCore {
    pub fn new(config: EntityConfig) -> Rc<Self> {
        Rc::new(Self {
            id: RefCell::new(None),
            mode: config.mode,
            auto_bind: config.auto_bind,
            attached: RefCell::new(None),
            default_connection: RefCell::new(config.default_connection),
            connections: RefCell::new(HashMap::new()),
            emitter: Emitter::new(),
            bindings: RefCell::new(BindingRegistry::new()),
            direct: RefCell::new(HashMap::new()),
        })
    }

    pub fn mode(&self) -> SyncMode {
        self.mode
    }

    pub fn auto_bind(&self) -> bool {
        self.auto_bind
    }

    pub fn id(&self) -> Option<EntityId> {
        self.id.borrow().clone()
    }

    /// Sets the identity if it has not been established yet.
    pub fn establish_id(&self, id: EntityId) {
        let mut slot = self.id.borrow_mut();
        if slot.is_none() {
            *slot = Some(id);
        }
    }

    pub fn emitter(&self) -> &Emitter {
        &self.emitter
    }

    // -- connection registry --------------------------------------------

    /// Records a connection in the attached-connection registry, keyed by
    /// its identifier. Re-attaching an already known connection replaces
    /// the previous handle.
    pub fn attach(&self, connection: &ConnectionRef) {
        self.connections
            .borrow_mut()
            .insert(connection.id(), connection.clone());
    }

    pub fn detach(&self, id: &ConnectionId) {
        self.connections.borrow_mut().remove(id);
    }

    pub fn is_attached(&self, id: &ConnectionId) -> bool {
        self.connections.borrow().contains_key(id)
    }

    /// Snapshot of every attached connection. Cloned out so callers may
    /// mutate the registry while iterating.
    pub fn connections(&self) -> Vec<ConnectionRef> {
        self.connections.borrow().values().cloned().collect()
    }

    /// Sets the entity's own connection, consulted before the configured
    /// default when resolving.
    pub fn set_attached_connection(&self, connection: ConnectionRef) {
        *self.attached.borrow_mut() = Some(connection);
    }

    /// Resolves a connection by precedence: explicit argument, the
    /// entity's own attached connection, the configured default.
    pub fn resolve_connection(
        &self,
        explicit: Option<&ConnectionRef>,
    ) -> Result<ConnectionRef, SyncError> {
        if let Some(connection) = explicit {
            return Ok(connection.clone());
        }
        if let Some(connection) = self.attached.borrow().as_ref() {
            return Ok(connection.clone());
        }
        if let Some(connection) = self.default_connection.borrow().as_ref() {
            return Ok(connection.clone());
        }
        Err(SyncError::NoConnection)
    }

    // -- event bridge ----------------------------------------------------

    /// Binds `event` both locally and on the resolved connection under the
    /// global name `<address>:<event>`. The transport-side wrapper re-emits
    /// the event through the entity's own emitter with whatever payload the
    /// connection delivered.
    ///
    /// Not idempotent: binding the same callback twice yields two
    /// independent records and two firings per event.
    pub fn bind(
        self: &Rc<Self>,
        address: &Address,
        event: &str,
        connection: Option<&ConnectionRef>,
        callback: Rc<MessageHandler>,
    ) -> Result<(), SyncError> {
        let connection = self.resolve_connection(connection)?;
        let global = address.event_name(event);

        let remote: Rc<MessageHandler> = {
            let core = Rc::clone(self);
            let event = event.to_string();
            Rc::new(move |data: &Value, ack: Option<Ack>| {
                core.emitter.trigger(&event, data, ack);
            })
        };

        self.emitter.on(event, callback.clone());
        connection.on(&global, remote.clone());
        self.bindings.borrow_mut().insert(Binding {
            name: event.to_string(),
            global: global.clone(),
            connection: connection.id(),
            local: callback,
            remote,
        });
        trace!("bound {} on {}", global, connection.id());
        Ok(())
    }

    /// Removes bindings for `event` on the resolved connection. With a
    /// callback, removes the first record on that connection whose local
    /// callback matches by reference, deregistering both its local listener
    /// and its transport wrapper. Without one, removes every record living
    /// on that connection; records on other connections stay registered.
    ///
    /// A missing registry entry is a no-op, not an error.
    pub fn unbind(
        &self,
        event: &str,
        connection: Option<&ConnectionRef>,
        callback: Option<&Rc<MessageHandler>>,
    ) -> Result<(), SyncError> {
        if !self.bindings.borrow().contains(event) {
            return Ok(());
        }
        let connection = self.resolve_connection(connection)?;

        match callback {
            Some(callback) => {
                let removed =
                    self.bindings
                        .borrow_mut()
                        .remove_first_match(event, connection.id(), callback);
                if let Some(binding) = removed {
                    self.emitter.off(event, &binding.local);
                    connection.off(&binding.global, &binding.remote);
                    trace!("unbound {} on {}", binding.global, connection.id());
                }
            }
            None => {
                let removed = self
                    .bindings
                    .borrow_mut()
                    .remove_for_connection(event, connection.id());
                for binding in removed {
                    self.emitter.off(event, &binding.local);
                    connection.off(&binding.global, &binding.remote);
                    trace!("unbound {} on {}", binding.global, connection.id());
                }
            }
        }
        Ok(())
    }

    /// Unbinds, on the resolved connection, every event name currently
    /// registered. A no-op when nothing was ever bound.
    pub fn unbind_all(&self, connection: Option<&ConnectionRef>) -> Result<(), SyncError> {
        // Snapshot the names first; unbind needs the registry mutably.
        let events = self.bindings.borrow().event_names();
        for event in events {
            self.unbind(&event, connection, None)?;
        }
        Ok(())
    }

    pub fn binding_count(&self, event: &str) -> usize {
        self.bindings.borrow().count(event)
    }

    pub fn has_bindings(&self) -> bool {
        !self.bindings.borrow().is_empty()
    }

    // -- direct listeners --------------------------------------------------

    /// Remembers a listener registered directly on a connection (outside
    /// the bridge) so role teardown can remove it later.
    pub fn remember_direct(&self, id: ConnectionId, name: String, handler: Rc<MessageHandler>) {
        self.direct
            .borrow_mut()
            .entry(id)
            .or_default()
            .push((name, handler));
    }

    /// Takes back every direct listener remembered for a connection.
    pub fn take_direct(&self, id: &ConnectionId) -> Vec<(String, Rc<MessageHandler>)> {
        self.direct.borrow_mut().remove(id).unwrap_or_default()
    }
}
