use std::collections::HashMap;
use std::rc::Rc;

use crate::connection::MessageHandler;
use crate::types::ConnectionId;

/// The paired registration of a local event listener and a transport
/// listener. The remote wrapper is a fresh closure per binding, so
/// unbinding can remove exactly one transport listener without touching
/// others bound to the same global name. Each record remembers the
/// connection its wrapper was registered on, so teardown scoped to one
/// connection leaves the others' records in place.
pub struct Binding {
    pub name: String,
    pub global: String,
    pub connection: ConnectionId,
    pub local: Rc<MessageHandler>,
    pub remote: Rc<MessageHandler>,
}

/// Per-entity table of live bindings: local event name mapped to the
/// ordered records currently registered. Entries are created lazily on
/// first bind and deleted when their last record is removed.
#[derive(Default)]
pub struct BindingRegistry {
    events: HashMap<String, Vec<Binding>>,
}

impl BindingRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, binding: Binding) {
        self.events
            .entry(binding.name.clone())
            .or_default()
            .push(binding);
    }

    /// Removes and returns every record for `event` that lives on the given
    /// connection. Records on other connections are untouched. The entry is
    /// compacted away once its last record is gone.
    pub fn remove_for_connection(
        &mut self,
        event: &str,
        connection: ConnectionId,
    ) -> Vec<Binding> {
        let Some(list) = self.events.get_mut(event) else {
            return Vec::new();
        };
        let mut removed = Vec::new();
        let mut index = 0;
        while index < list.len() {
            if list[index].connection == connection {
                removed.push(list.remove(index));
            } else {
                index += 1;
            }
        }
        if list.is_empty() {
            self.events.remove(event);
        }
        removed
    }

    /// Removes the first record for `event` on the given connection whose
    /// local callback is the given one, matched by pointer identity. The
    /// entry is compacted away once its last record is gone.
    pub fn remove_first_match(
        &mut self,
        event: &str,
        connection: ConnectionId,
        callback: &Rc<MessageHandler>,
    ) -> Option<Binding> {
        let list = self.events.get_mut(event)?;
        let pos = list
            .iter()
            .position(|b| b.connection == connection && Rc::ptr_eq(&b.local, callback))?;
        let binding = list.remove(pos);
        if list.is_empty() {
            self.events.remove(event);
        }
        Some(binding)
    }

    pub fn event_names(&self) -> Vec<String> {
        self.events.keys().cloned().collect()
    }

    pub fn contains(&self, event: &str) -> bool {
        self.events.contains_key(event)
    }

    pub fn count(&self, event: &str) -> usize {
        self.events.get(event).map_or(0, Vec::len)
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}
