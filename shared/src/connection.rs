use std::rc::Rc;

use serde_json::Value;

use crate::types::ConnectionId;

/// Acknowledgement continuation delivered back to the emitter of a message.
/// Invoked by the receiving side with either returned data or an error.
pub type Ack = Box<dyn FnOnce(Result<Value, String>)>;

/// Handler for a named inbound message. Handlers are held behind `Rc` so
/// that removal can match a specific registration by pointer identity.
pub type MessageHandler = dyn Fn(&Value, Option<Ack>);

/// Shared handle to a transport connection.
pub type ConnectionRef = Rc<dyn Connection>;

/// A bidirectional transport channel capable of emitting and receiving
/// named messages with optional acknowledgement.
///
/// This layer never defines a transport; it only relies on this surface.
/// The execution model is cooperative and single-threaded: `emit` may drive
/// the peer's listeners synchronously (as the in-memory test transport
/// does) or defer delivery, and listeners registered through `on` are
/// invoked with whatever payload the transport delivers.
pub trait Connection {
    /// Stable identifier for this connection.
    fn id(&self) -> ConnectionId;

    /// Emits a named message, optionally requesting an acknowledgement.
    fn emit(&self, name: &str, payload: &Value, ack: Option<Ack>);

    /// Registers a listener for a named inbound message.
    fn on(&self, name: &str, handler: Rc<MessageHandler>);

    /// Removes one previous registration of `handler` for `name`, matched
    /// by pointer identity. Unknown handlers are a no-op.
    fn off(&self, name: &str, handler: &Rc<MessageHandler>);

    /// Removes every listener registered for `name`.
    fn off_all(&self, name: &str);
}
