//! # Bindsync Server
//! Server-side role behaviors: expose models and collections to connecting
//! sockets, fan local mutations out to every attached connection, and let
//! inbound client messages drive local mutation and deletion.

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

pub use collection::ServerCollection;
pub use model::ServerModel;
