use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use serde_json::Value;

use crate::connection::{Ack, MessageHandler};

/// Local event emitter owned by a single entity.
///
/// Stands in for the data-binding framework's own bind/unbind/trigger
/// surface: the event bridge registers local callbacks here and re-emits
/// inbound transport messages through `trigger`. Handler lists are cloned
/// out before invocation, so a handler may bind or unbind on the same
/// emitter without poisoning the iteration.
#[derive(Default)]
pub struct Emitter {
    handlers: RefCell<HashMap<String, Vec<Rc<MessageHandler>>>>,
}

impl Emitter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on(&self, event: &str, handler: Rc<MessageHandler>) {
        self.handlers
            .borrow_mut()
            .entry(event.to_string())
            .or_default()
            .push(handler);
    }

    /// Removes one previous registration of `handler`, matched by pointer
    /// identity. Unknown handlers are a no-op.
    pub fn off(&self, event: &str, handler: &Rc<MessageHandler>) {
        let mut handlers = self.handlers.borrow_mut();
        if let Some(list) = handlers.get_mut(event) {
            if let Some(pos) = list.iter().position(|h| Rc::ptr_eq(h, handler)) {
                list.remove(pos);
            }
            if list.is_empty() {
                handlers.remove(event);
            }
        }
    }

    pub fn off_all(&self, event: &str) {
        self.handlers.borrow_mut().remove(event);
    }

    /// Invokes every handler registered for `event`. The acknowledgement,
    /// if any, is handed to the first handler only.
    pub fn trigger(&self, event: &str, data: &Value, ack: Option<Ack>) {
        let list: Vec<Rc<MessageHandler>> = match self.handlers.borrow().get(event) {
            Some(list) => list.clone(),
            None => return,
        };
        let mut ack = ack;
        for handler in list {
            handler(data, ack.take());
        }
    }

    pub fn count(&self, event: &str) -> usize {
        self.handlers.borrow().get(event).map_or(0, Vec::len)
    }
}
