use std::rc::Rc;

use log::warn;
use serde_json::Value;

use bindsync_shared::{
    sync, Connection, ConnectionRef, EntityId, MessageHandler, Model, SyncCollection, SyncError,
    SyncMethod, SyncOptions,
};

use crate::model::ServerModel;

/// Server-side role for a collection: serve `read` requests, construct or
/// merge models from inbound `create` messages, and keep every contained
/// model exposed to the same connections.
pub trait ServerCollection {
    /// Records the connection, establishes a local identity if absent, and
    /// (unless auto-bind is suppressed) registers listeners for
    /// `<address>:create` and `<address>:read` directly on the connection.
    /// Direct registration, not the bridge: the generic path would stack a
    /// duplicate pair of records per connection. Propagates `bind_server`
    /// to every contained model.
    fn bind_server(&self, connection: &ConnectionRef) -> Result<(), SyncError>;

    /// Clears the bridge bindings for the connection, removes the two
    /// direct listeners, and forgets the connection.
    fn unbind_server(&self, connection: &ConnectionRef) -> Result<(), SyncError>;
}

impl<M: Model + 'static> ServerCollection for SyncCollection<M> {
    fn bind_server(&self, connection: &ConnectionRef) -> Result<(), SyncError> {
        self.core().attach(connection);
        self.ensure_local_id();

        if self.core().auto_bind() {
            let create_name = self.address().event_name("create");
            let collection = self.clone();
            let on_create: Rc<MessageHandler> =
                Rc::new(move |data, _ack| on_client_create(&collection, data));
            connection.on(&create_name, on_create.clone());
            self.core()
                .remember_direct(connection.id(), create_name, on_create);

            let read_name = self.address().event_name("read");
            let collection = self.clone();
            let on_read: Rc<MessageHandler> = Rc::new(move |_data, ack| {
                if let Some(ack) = ack {
                    ack(Ok(collection.serialized()));
                }
            });
            connection.on(&read_name, on_read.clone());
            self.core()
                .remember_direct(connection.id(), read_name, on_read);
        }

        for model in self.models() {
            model.bind_server(connection)?;
        }
        Ok(())
    }

    fn unbind_server(&self, connection: &ConnectionRef) -> Result<(), SyncError> {
        self.unbind_all(Some(connection))?;
        for (name, handler) in self.core().take_direct(&connection.id()) {
            connection.off(&name, &handler);
        }
        self.core().detach(&connection.id());
        Ok(())
    }
}

/// Handles an inbound `create`: an unknown id constructs a model and
/// announces the creation to every attached connection; a known id merges
/// the incoming attributes and persists. Both branches expose the model to
/// every currently registered connection.
fn on_client_create<M: Model + 'static>(collection: &SyncCollection<M>, data: &Value) {
    let Some(id) = EntityId::from_attributes(data) else {
        warn!(
            "dropping create for {}: {}",
            collection.address(),
            SyncError::MissingId
        );
        return;
    };

    let (model, is_new) = match collection.get(&id) {
        None => {
            let model = collection.spawn(data);
            collection.add(model.clone());
            (model, true)
        }
        Some(model) => {
            if model.apply(data) {
                if let Err(err) = model.save() {
                    warn!("failed to persist merged create for {}: {}", id, err);
                }
            }
            (model, false)
        }
    };

    for connection in collection.core().connections() {
        if let Err(err) = model.bind_server(&connection) {
            warn!("failed to expose {} on {}: {}", id, connection.id(), err);
        }
    }

    // Announced after the connections are attached, so the fan-out of the
    // create-sync reaches every one of them.
    if is_new {
        let options = SyncOptions::new().with_url(collection.address().clone());
        if let Err(err) = sync(SyncMethod::Create, Some(&model), options) {
            warn!("failed to announce create for {}: {}", id, err);
        }
    }
}
