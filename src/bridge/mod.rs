// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Nereid and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Named-event channel between the agent and the remote inspector UI.
//!
//! Every event is fire-and-forget: there are no correlation ids and no replies. Delivery order
//! is send order. The physical transport is behind the [`Wall`] trait.

pub(crate) mod listeners;
pub mod wire;

use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::rc::{Rc, Weak};

use serde::Serialize;
use serde_json::Value;
use smallvec::SmallVec;
use smol_str::SmolStr;
use tracing::{trace, warn};

use crate::config::BridgeConfig;
use crate::model::ElementId;
use listeners::{Listener, ListenerTable};

pub use listeners::Subscription;
pub use wire::{names, Envelope, WireError, WireEvent};

/// Outbound side of the physical transport.
pub trait Wall {
    fn send(&self, envelope: Envelope);
}

impl<F> Wall for F
where
    F: Fn(Envelope),
{
    fn send(&self, envelope: Envelope) {
        self(envelope)
    }
}

type Handlers = HashMap<SmolStr, ListenerTable<Value>>;

struct BridgeInner {
    wall: Box<dyn Wall>,
    config: BridgeConfig,
    handlers: Rc<RefCell<Handlers>>,
    queue: RefCell<Vec<WireEvent>>,
    inspectables: RefCell<HashSet<ElementId>>,
}

/// Cheaply cloneable handle to one channel endpoint.
#[derive(Clone)]
pub struct Bridge {
    inner: Rc<BridgeInner>,
}

#[derive(Clone)]
pub struct WeakBridge {
    inner: Weak<BridgeInner>,
}

impl WeakBridge {
    pub fn upgrade(&self) -> Option<Bridge> {
        self.inner.upgrade().map(|inner| Bridge { inner })
    }
}

impl Bridge {
    pub fn new(wall: impl Wall + 'static, config: BridgeConfig) -> Self {
        Self {
            inner: Rc::new(BridgeInner {
                wall: Box::new(wall),
                config,
                handlers: Rc::new(RefCell::new(HashMap::new())),
                queue: RefCell::new(Vec::new()),
                inspectables: RefCell::new(HashSet::new()),
            }),
        }
    }

    pub fn config(&self) -> BridgeConfig {
        self.inner.config
    }

    /// Non-owning handle, for handlers registered on this bridge that need to reply on it.
    pub fn downgrade(&self) -> WeakBridge {
        WeakBridge { inner: Rc::downgrade(&self.inner) }
    }

    /// Serializes `payload` and sends it as event `name`.
    ///
    /// A payload that fails to serialize is logged and dropped.
    pub fn send(&self, name: &str, payload: impl Serialize) {
        match serde_json::to_value(payload) {
            Ok(payload) => self.send_value(name, payload),
            Err(err) => warn!(event = name, error = %err, "dropping unserializable payload"),
        }
    }

    pub fn send_value(&self, name: &str, payload: Value) {
        let event = WireEvent::new(name, payload);
        if !self.inner.config.batch {
            self.inner.wall.send(Envelope::Event(event));
            return;
        }

        let full = {
            let mut queue = self.inner.queue.borrow_mut();
            queue.push(event);
            queue.len() >= self.inner.config.max_batch.max(1)
        };
        if full {
            self.flush();
        }
    }

    /// Sends a payload describing `id` and remembers that the remote may hold state for it.
    pub fn send_inspectable(&self, id: &ElementId, name: &str, payload: impl Serialize) {
        self.inner.inspectables.borrow_mut().insert(id.clone());
        self.send(name, payload);
    }

    pub fn is_inspectable(&self, id: &ElementId) -> bool {
        self.inner.inspectables.borrow().contains(id)
    }

    /// Tells the remote it may release anything tied to `id`.
    pub fn forget(&self, id: &ElementId) {
        if !self.inner.inspectables.borrow_mut().remove(id) {
            trace!(%id, "forgetting an id that was never sent as inspectable");
        }
        self.send(names::FORGET, id);
    }

    /// Delivers queued events as one envelope. No-op when nothing is queued.
    pub fn flush(&self) {
        let events = std::mem::take(&mut *self.inner.queue.borrow_mut());
        if events.is_empty() {
            return;
        }
        self.inner.wall.send(Envelope::Many { events });
    }

    pub fn pending(&self) -> usize {
        self.inner.queue.borrow().len()
    }

    /// Registers `handler` for inbound event `name`.
    pub fn on(&self, name: &str, handler: impl Fn(&Value) + 'static) -> Subscription {
        let name = SmolStr::new(name);
        let listener: Listener<Value> = Rc::new(handler);
        let id = self.inner.handlers.borrow_mut().entry(name.clone()).or_default().add(listener);

        let handlers = Rc::downgrade(&self.inner.handlers);
        Subscription::new(move || {
            let Some(handlers) = handlers.upgrade() else {
                return;
            };
            let mut handlers = handlers.borrow_mut();
            if let Some(table) = handlers.get_mut(&name) {
                table.remove(id);
                if table.is_empty() {
                    handlers.remove(&name);
                }
            }
        })
    }

    pub fn listener_count(&self, name: &str) -> usize {
        self.inner.handlers.borrow().get(name).map_or(0, ListenerTable::len)
    }

    /// Dispatches every event in `envelope` to its handlers, in order.
    pub fn receive(&self, envelope: Envelope) {
        for event in envelope.events() {
            self.dispatch(event);
        }
    }

    /// Parses a JSON envelope and dispatches it.
    pub fn receive_json(&self, text: &str) -> Result<(), WireError> {
        let envelope = serde_json::from_str::<Envelope>(text).map_err(WireError::Malformed)?;
        self.receive(envelope);
        Ok(())
    }

    fn dispatch(&self, event: &WireEvent) {
        let handlers: SmallVec<[Listener<Value>; 4]> = self
            .inner
            .handlers
            .borrow()
            .get(event.name.as_str())
            .map(ListenerTable::snapshot)
            .unwrap_or_default();

        if handlers.is_empty() {
            trace!(event = %event.name, "no handler for inbound event");
            return;
        }
        for handler in handlers {
            handler(&event.payload);
        }
    }
}
