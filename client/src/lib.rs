//! # Bindsync Client
//! Client-side role behaviors: keep hydrated models and collections current
//! with server-originated events. The client is the receiving end, not the
//! authority; inbound state is applied locally and never re-persisted.

#![deny(trivial_numeric_casts, unstable_features, unused_import_braces)]

pub mod shared {
    pub use bindsync_shared::{
        sync, Address, AddressSource, Connection, ConnectionId, ConnectionRef, EntityConfig,
        EntityId, Model, SyncCollection, SyncError, SyncMethod, SyncMode, SyncModel, SyncOptions,
        Syncable,
    };
}

mod collection;
mod model;

pub use collection::ClientCollection;
pub use model::ClientModel;
