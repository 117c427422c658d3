use std::rc::Rc;

use log::warn;
use serde_json::Value;

use bindsync_shared::{Connection, ConnectionRef, Model, SyncError, SyncModel};

/// Server-side role for a model: expose it to a connecting socket so that
/// inbound client messages drive local mutation and deletion, and local
/// persistence fans out to every attached connection.
pub trait ServerModel {
    /// Records the connection, establishes identity from attributes if not
    /// already set, and (unless auto-bind is suppressed) binds `update` and
    /// `delete` against this model's address on that connection.
    fn bind_server(&self, connection: &ConnectionRef) -> Result<(), SyncError>;

    /// Removes every binding associated with the connection and forgets it.
    fn unbind_server(&self, connection: &ConnectionRef) -> Result<(), SyncError>;
}

impl<M: Model + 'static> ServerModel for SyncModel<M> {
    fn bind_server(&self, connection: &ConnectionRef) -> Result<(), SyncError> {
        self.core().attach(connection);
        self.ensure_id();
        if self.core().auto_bind() {
            let model = self.clone();
            self.bind(
                "update",
                Some(connection),
                Rc::new(move |data, _ack| on_client_update(&model, data)),
            )?;
            let model = self.clone();
            self.bind(
                "delete",
                Some(connection),
                Rc::new(move |data, _ack| on_client_delete(&model, data)),
            )?;
        }
        Ok(())
    }

    fn unbind_server(&self, connection: &ConnectionRef) -> Result<(), SyncError> {
        self.unbind_all(Some(connection))?;
        self.core().detach(&connection.id());
        Ok(())
    }
}

/// Applies incoming attributes; a validation rejection aborts without
/// persisting.
fn on_client_update<M: Model>(model: &SyncModel<M>, data: &Value) {
    if !model.apply(data) {
        return;
    }
    if let Err(err) = model.save() {
        warn!("failed to persist client update: {}", err);
    }
}

/// Destroys the model, announces the removal locally (its collection, if
/// any, listens for `remove`), then clears the bindings of every attached
/// connection.
fn on_client_delete<M: Model>(model: &SyncModel<M>, data: &Value) {
    if let Err(err) = model.destroy() {
        warn!("failed to propagate client delete: {}", err);
    }
    model.trigger("remove", data);
    for connection in model.core().connections() {
        if let Err(err) = model.unbind_all(Some(&connection)) {
            warn!("cleanup after delete failed on {}: {}", connection.id(), err);
        }
    }
}
