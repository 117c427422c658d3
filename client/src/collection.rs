use std::rc::Rc;

use log::warn;
use serde_json::Value;

use bindsync_shared::{EntityId, Model, SyncCollection, SyncError};

use crate::model::ClientModel;

/// Client-side role for a collection: mirror server-originated `create` and
/// `update` events into the local contents.
pub trait ClientCollection {
    /// Binds `create` and `update` (both routed to the same handler) via
    /// the event bridge, then propagates `bind_client` to every contained
    /// model.
    fn bind_client(&self) -> Result<(), SyncError>;

    /// Unbinds every collection-level binding, then runs model-level
    /// cleanup for every contained model.
    fn cleanup(&self) -> Result<(), SyncError>;
}

impl<M: Model + 'static> ClientCollection for SyncCollection<M> {
    fn bind_client(&self) -> Result<(), SyncError> {
        if self.core().auto_bind() {
            for event in ["create", "update"] {
                let collection = self.clone();
                self.bind(
                    event,
                    None,
                    Rc::new(move |data, _ack| on_server_create(&collection, data)),
                )?;
            }
        }
        for model in self.models() {
            model.bind_client()?;
        }
        Ok(())
    }

    fn cleanup(&self) -> Result<(), SyncError> {
        self.unbind_all(None)?;
        for model in self.models() {
            model.cleanup(None)?;
        }
        Ok(())
    }
}

/// Handles a server-originated `create` or `update`: an unknown id
/// constructs a model, binds it as a client entity, and adds it; a known id
/// merges the incoming attributes and persists.
fn on_server_create<M: Model + 'static>(collection: &SyncCollection<M>, data: &Value) {
    let Some(id) = EntityId::from_attributes(data) else {
        warn!(
            "dropping server create for {}: {}",
            collection.address(),
            SyncError::MissingId
        );
        return;
    };
    match collection.get(&id) {
        None => {
            let model = collection.spawn(data);
            if let Err(err) = model.bind_client() {
                warn!("failed to bind created model {}: {}", id, err);
            }
            collection.add(model);
        }
        Some(model) => {
            if model.apply(data) {
                if let Err(err) = model.save() {
                    warn!("failed to persist merged update for {}: {}", id, err);
                }
            }
        }
    }
}
