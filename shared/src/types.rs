use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use serde_json::Value;

/// Stable identifier for a transport connection, assigned by the transport.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConnectionId(u64);

impl ConnectionId {
    pub fn new(value: u64) -> Self {
        ConnectionId(value)
    }

    pub fn to_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "conn-{}", self.0)
    }
}

/// Identity of a model or collection. Either an explicit id carried in the
/// entity's attributes, or a process-local fallback generated for entities
/// (typically collections) that never receive one.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct EntityId(String);

static NEXT_LOCAL_ID: AtomicU64 = AtomicU64::new(1);

impl EntityId {
    pub fn new(value: impl Into<String>) -> Self {
        EntityId(value.into())
    }

    /// Generates a process-local fallback identity.
    pub fn local() -> Self {
        let n = NEXT_LOCAL_ID.fetch_add(1, Ordering::Relaxed);
        EntityId(format!("local-{}", n))
    }

    /// Reads an identity out of a JSON attribute value. Accepts strings and
    /// integers, which is everything the wire format ever carries for ids.
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::String(s) => Some(EntityId(s.clone())),
            Value::Number(n) => Some(EntityId(n.to_string())),
            _ => None,
        }
    }

    /// Reads the `id` attribute of a JSON payload, if present and usable.
    pub fn from_attributes(attrs: &Value) -> Option<Self> {
        attrs.get("id").and_then(Self::from_value)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for EntityId {
    fn from(value: &str) -> Self {
        EntityId(value.to_string())
    }
}

impl From<u64> for EntityId {
    fn from(value: u64) -> Self {
        EntityId(value.to_string())
    }
}
