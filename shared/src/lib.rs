//! # Bindsync Shared
//! Common functionality shared between bindsync-server & bindsync-client
//! crates: the event bridge, the sync adapter, and the entity wrappers that
//! carry synchronization state.

#![deny(trivial_numeric_casts, unstable_features, unused_import_braces)]

mod address;
mod bridge;
mod collection;
mod connection;
mod emitter;
mod entity;
mod error;
mod model;
mod sync;
mod types;

pub use address::{Address, AddressSource};
pub use bridge::{Binding, BindingRegistry};
pub use collection::SyncCollection;
pub use connection::{Ack, Connection, ConnectionRef, MessageHandler};
pub use emitter::Emitter;
pub use entity::{EntityConfig, EntityCore};
pub use error::SyncError;
pub use model::{Model, SyncModel};
pub use sync::{sync, SyncMethod, SyncMode, SyncOptions, Syncable};
pub use types::{ConnectionId, EntityId};
