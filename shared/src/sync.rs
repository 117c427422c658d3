use std::rc::Rc;

use log::warn;
use serde_json::{json, Value};

use crate::address::{Address, AddressSource};
use crate::connection::{Ack, Connection};
use crate::entity::EntityCore;
use crate::error::SyncError;

/// Persistence operation kinds, mapped one-to-one onto wire verbs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SyncMethod {
    Create,
    Read,
    Update,
    Delete,
}

impl SyncMethod {
    pub fn verb(&self) -> &'static str {
        match self {
            SyncMethod::Create => "create",
            SyncMethod::Read => "read",
            SyncMethod::Update => "update",
            SyncMethod::Delete => "delete",
        }
    }
}

/// Delivery mode of the sync adapter, chosen explicitly at entity
/// construction rather than inferred from the execution environment.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SyncMode {
    /// Send on the single resolved connection; acknowledgement data and
    /// errors route to the caller's callbacks.
    SingleConnection,
    /// Broadcast on every connection attached to the entity; there is no
    /// single originating caller, so acknowledgement errors are only
    /// logged.
    FanOut,
}

/// Options for one sync operation: an optional explicit address, an
/// optional explicit payload, and response callbacks (honored in
/// single-connection mode only).
#[derive(Default)]
pub struct SyncOptions {
    pub url: Option<AddressSource>,
    pub data: Option<Value>,
    pub success: Option<Box<dyn FnOnce(Value)>>,
    pub error: Option<Box<dyn FnOnce(String)>>,
}

impl SyncOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_url(mut self, url: impl Into<AddressSource>) -> Self {
        self.url = Some(url.into());
        self
    }

    pub fn with_data(mut self, data: Value) -> Self {
        self.data = Some(data);
        self
    }

    pub fn on_success(mut self, callback: impl FnOnce(Value) + 'static) -> Self {
        self.success = Some(Box::new(callback));
        self
    }

    pub fn on_error(mut self, callback: impl FnOnce(String) + 'static) -> Self {
        self.error = Some(Box::new(callback));
        self
    }
}

/// What the sync adapter needs from an entity: its synchronization state,
/// its address, and its serialized representation. Implemented by both
/// model and collection wrappers.
pub trait Syncable {
    fn core(&self) -> &Rc<EntityCore>;
    fn sync_address(&self) -> Option<Address>;
    fn serialized(&self) -> Value;
}

/// Translates one local persistence operation into exactly one named
/// outbound message.
///
/// The message is named `<namespace>:<verb>`, where the namespace is the
/// first path segment of the resolved address. Address resolution order:
/// explicit option address (a provider is invoked), then the entity's own
/// address. The payload is the explicit option payload, else the entity's
/// serialized attributes, else an empty object.
pub fn sync(
    method: SyncMethod,
    entity: Option<&dyn Syncable>,
    options: SyncOptions,
) -> Result<(), SyncError> {
    let address = match &options.url {
        Some(source) => source.resolve(),
        None => entity
            .and_then(Syncable::sync_address)
            .ok_or(SyncError::NoAddress)?,
    };
    let name = address.message_name(method.verb());
    let payload = options
        .data
        .or_else(|| entity.map(Syncable::serialized))
        .unwrap_or_else(|| json!({}));

    let mode = entity.map_or(SyncMode::SingleConnection, |e| e.core().mode());
    match mode {
        SyncMode::SingleConnection => {
            let connection = match entity {
                Some(entity) => entity.core().resolve_connection(None)?,
                None => return Err(SyncError::NoConnection),
            };
            let success = options.success;
            let error = options.error;
            let ack: Ack = Box::new(move |result| match result {
                Ok(data) => {
                    if let Some(callback) = success {
                        callback(data);
                    }
                }
                Err(err) => {
                    if let Some(callback) = error {
                        callback(err);
                    }
                }
            });
            connection.emit(&name, &payload, Some(ack));
        }
        SyncMode::FanOut => {
            let entity = entity.ok_or(SyncError::NoConnection)?;
            for connection in entity.core().connections() {
                let message = name.clone();
                let ack: Ack = Box::new(move |result| {
                    if let Err(err) = result {
                        warn!("fan-out ack error for {}: {}", message, err);
                    }
                });
                connection.emit(&name, &payload, Some(ack));
            }
        }
    }
    Ok(())
}
