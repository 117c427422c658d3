use thiserror::Error;

use crate::types::EntityId;

/// Errors surfaced by the sync adapter, the event bridge, and the role
/// behaviors. Every variant corresponds to a condition the adapter refuses
/// to paper over with a silent no-op.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SyncError {
    /// Neither an explicit option address nor the entity's own address could
    /// be resolved
    #[error("No address resolvable for sync operation")]
    NoAddress,

    /// The connection precedence chain (explicit argument, entity's attached
    /// connection, configured default) resolved nothing
    #[error("No connection available")]
    NoConnection,

    /// An inbound message referenced an entity that is not present
    #[error("Entity not found: {id}")]
    EntityNotFound {
        id: EntityId,
    },

    /// An inbound create/update payload carried no usable `id` attribute
    #[error("Payload carries no usable id attribute")]
    MissingId,
}
