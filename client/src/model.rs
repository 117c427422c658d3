use std::rc::Rc;

use log::warn;
use serde_json::Value;

use bindsync_shared::{Connection, ConnectionRef, Model, SyncError, SyncModel};

/// Client-side role for a model: apply server-originated state and remove
/// the local entity when the server deletes it.
pub trait ClientModel {
    /// Establishes identity from attributes if not already set and (unless
    /// auto-bind is suppressed) binds `update` and `delete` on the model's
    /// resolved connection.
    fn bind_client(&self) -> Result<(), SyncError>;

    /// Removes every binding for the given connection (or the model's
    /// resolved one when omitted).
    fn cleanup(&self, connection: Option<&ConnectionRef>) -> Result<(), SyncError>;
}

impl<M: Model + 'static> ClientModel for SyncModel<M> {
    fn bind_client(&self) -> Result<(), SyncError> {
        self.ensure_id();
        if self.core().auto_bind() {
            let model = self.clone();
            self.bind(
                "update",
                None,
                Rc::new(move |data, _ack| {
                    // Receiving end: apply, never re-persist.
                    model.apply(data);
                }),
            )?;
            let model = self.clone();
            self.bind(
                "delete",
                None,
                Rc::new(move |data, _ack| on_server_delete(&model, data)),
            )?;
        }
        Ok(())
    }

    fn cleanup(&self, connection: Option<&ConnectionRef>) -> Result<(), SyncError> {
        self.unbind_all(connection)
    }
}

/// Announces the removal locally (the collection, if any, listens for
/// `remove`), then clears bindings on the connections they actually live
/// on.
fn on_server_delete<M: Model>(model: &SyncModel<M>, data: &Value) {
    model.trigger("remove", data);
    let connections = model.core().connections();
    if connections.is_empty() {
        // Client bindings resolve to the default connection.
        if let Err(err) = model.unbind_all(None) {
            warn!("cleanup after server delete failed: {}", err);
        }
        return;
    }
    for connection in connections {
        if let Err(err) = model.unbind_all(Some(&connection)) {
            warn!("cleanup after server delete failed on {}: {}", connection.id(), err);
        }
    }
}
