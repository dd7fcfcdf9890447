// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Nereid and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! The mirroring agent.
//!
//! Producers (renderers) report lifecycle changes for their handles; the agent assigns
//! identities, keeps the last snapshot per identity, and announces changes on its event bus.
//! A linked [`Bridge`] forwards the wire-facing subset to the remote UI and feeds remote
//! commands back in through [`Agent::dispatch`].
//!
//! All entry points run to completion on the caller's thread. No internal borrow is held while
//! listeners or producer callbacks run, so both may call back into the agent.

pub mod commands;
pub mod events;
pub mod host;
pub mod renderer;
mod selection;

use std::cell::{Cell, Ref, RefCell, RefMut};
use std::rc::{Rc, Weak};

use serde_json::Value;
use tracing::{debug, info, trace, warn};

use crate::bridge::wire::{names, MakeGlobalPayload, TextContentPayload, UpdateValuePayload};
use crate::bridge::{Bridge, Subscription, WeakBridge};
use crate::config::AgentConfig;
use crate::model::{
    Capabilities, ElementId, ElementSnapshot, Handle, Opaque, RawElement, RendererId, UpdateSlot,
};
use crate::store::{ElementStore, IdentityRegistry};

pub use commands::{Command, INBOUND_EVENTS};
pub use events::{AgentEvent, EventBus, Highlight, HighlightNodes};
pub use host::{
    same_native, DebugSlot, FrameCallback, FrameScheduler, HostConsole, ManualFrames,
    MemoryConsole, NativeNode, NativeRef, SlotValue,
};
pub use renderer::{HandleFromNative, LookupError, NativeFromHandle, RendererInterface};

use renderer::Renderers;

/// The single externally visible selection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Selection {
    #[default]
    Unselected,
    Selected(ElementId),
}

impl Selection {
    pub fn id(&self) -> Option<&ElementId> {
        match self {
            Self::Unselected => None,
            Self::Selected(id) => Some(id),
        }
    }
}

struct State {
    registry: IdentityRegistry,
    store: ElementStore,
    renderers: Renderers,
    selection: Selection,
    inspect_enabled: bool,
    last_checked_native: Option<NativeRef>,
    last_selected_instance: Option<Opaque>,
}

struct Shared {
    state: RefCell<State>,
    events: EventBus,
    host: Rc<dyn HostConsole>,
    frames: Rc<dyn FrameScheduler>,
    capabilities: Capabilities,
    scroll_pending: Cell<bool>,
}

/// Cheaply cloneable handle to one agent.
#[derive(Clone)]
pub struct Agent {
    shared: Rc<Shared>,
}

/// Subscriptions wiring an agent to a bridge. Dropping it keeps the link alive.
#[derive(Debug)]
pub struct BridgeLink {
    subscriptions: Vec<Subscription>,
}

impl BridgeLink {
    pub fn detach(self) {
        for subscription in self.subscriptions {
            subscription.unsubscribe();
        }
    }
}

impl Agent {
    pub fn new(
        config: AgentConfig,
        host: Rc<dyn HostConsole>,
        frames: Rc<dyn FrameScheduler>,
    ) -> Self {
        let capabilities = config.capabilities.apply(host.detect_capabilities());
        let agent = Self {
            shared: Rc::new(Shared {
                state: RefCell::new(State {
                    registry: IdentityRegistry::new(config.id_prefix),
                    store: ElementStore::new(),
                    renderers: Renderers::default(),
                    selection: Selection::Unselected,
                    inspect_enabled: false,
                    last_checked_native: None,
                    last_selected_instance: None,
                }),
                events: EventBus::default(),
                host,
                frames,
                capabilities,
                scroll_pending: Cell::new(false),
            }),
        };

        let weak = agent.downgrade();
        let _hook = agent.subscribe(move |event| {
            if let (AgentEvent::Selected(id), Some(agent)) = (event, Agent::upgrade(&weak)) {
                agent.expose_selected_instance(id);
            }
        });
        agent
    }

    fn downgrade(&self) -> Weak<Shared> {
        Rc::downgrade(&self.shared)
    }

    fn upgrade(weak: &Weak<Shared>) -> Option<Self> {
        weak.upgrade().map(|shared| Self { shared })
    }

    fn state(&self) -> Ref<'_, State> {
        self.shared.state.borrow()
    }

    fn state_mut(&self) -> RefMut<'_, State> {
        self.shared.state.borrow_mut()
    }

    fn emit(&self, event: AgentEvent) {
        trace!(?event, "agent event");
        self.shared.events.emit(&event);
    }

    pub fn subscribe(&self, listener: impl Fn(&AgentEvent) + 'static) -> Subscription {
        self.shared.events.subscribe(listener)
    }

    pub fn capabilities(&self) -> Capabilities {
        self.shared.capabilities
    }

    pub fn selection(&self) -> Selection {
        self.state().selection.clone()
    }

    pub fn snapshot(&self, id: &ElementId) -> Option<ElementSnapshot> {
        self.state().store.get(id).cloned()
    }

    pub fn roots(&self) -> Vec<ElementId> {
        self.state().store.roots().cloned().collect()
    }

    pub fn is_root(&self, id: &ElementId) -> bool {
        self.state().store.is_root(id)
    }

    pub fn renderer_of(&self, id: &ElementId) -> Option<RendererId> {
        self.state().store.renderer_of(id).cloned()
    }

    pub fn element_count(&self) -> usize {
        self.state().store.len()
    }

    /// Identity for `handle`, allocating one if the handle is new.
    pub fn id_for_handle(&self, handle: &Handle) -> ElementId {
        self.state_mut().registry.identity_for(handle)
    }

    /// Identity for `handle` if it already has one.
    pub fn lookup_handle(&self, handle: &Handle) -> Option<ElementId> {
        self.state().registry.lookup(handle)
    }

    // Producer lifecycle.

    pub fn register_renderer(&self, renderer: RendererId, interface: RendererInterface) {
        let mut state = self.state_mut();
        debug!(%renderer, ?interface, "renderer registered");
        state.renderers.register(renderer, interface);
        trace!(renderers = state.renderers.len(), "renderer table updated");
    }

    pub fn add_root(&self, renderer: &RendererId, handle: &Handle) -> ElementId {
        let id = {
            let mut state = self.state_mut();
            let id = state.registry.identity_for(handle);
            state.store.add_root(id.clone());
            id
        };
        trace!(%renderer, %id, "root added");
        self.emit(AgentEvent::Root(id.clone()));
        id
    }

    pub fn root_committed(&self, renderer: &RendererId, handle: &Handle) -> ElementId {
        let id = self.id_for_handle(handle);
        trace!(%renderer, %id, "root committed");
        self.emit(AgentEvent::RootCommitted(id.clone()));
        id
    }

    pub fn on_mounted(&self, renderer: &RendererId, handle: &Handle, raw: RawElement) -> ElementId {
        let payload = {
            let mut guard = self.state_mut();
            let state = &mut *guard;
            let id = state.registry.identity_for(handle);
            state.store.set_renderer(id.clone(), renderer.clone());
            state.store.put(id.clone(), raw, &mut state.registry).payload(&id)
        };
        let id = payload.id.clone();
        self.emit(AgentEvent::Mount(payload));
        id
    }

    /// Replaces the snapshot of a mounted handle. Updates for handles that were never mounted
    /// are dropped.
    pub fn on_updated(&self, handle: &Handle, raw: RawElement) -> Option<ElementId> {
        let payload = {
            let mut guard = self.state_mut();
            let state = &mut *guard;
            let Some(id) = state.registry.lookup(handle).filter(|id| state.store.contains(id))
            else {
                warn!(?handle, "update for a handle that is not mounted");
                return None;
            };
            state.store.put(id.clone(), raw, &mut state.registry).payload(&id)
        };
        let id = payload.id.clone();
        self.emit(AgentEvent::Update(payload));
        Some(id)
    }

    /// Drops everything known about `handle` and announces the unmount. The identity stays
    /// resolvable until the `unmount` listeners have run.
    pub fn on_unmounted(&self, handle: &Handle) -> Option<ElementId> {
        let (id, was_root) = {
            let mut state = self.state_mut();
            let id = state.registry.lookup(handle).filter(|id| {
                handle.is_object() || state.store.contains(id) || state.store.is_root(id)
            });
            let Some(id) = id else {
                warn!(?handle, "unmount for an unknown handle");
                return None;
            };
            state.store.delete(&id);
            let was_root = state.store.remove_root(&id);
            state.store.remove_renderer(&id);
            if state.selection.id() == Some(&id) {
                state.selection = Selection::Unselected;
            }
            (id, was_root)
        };

        if was_root {
            self.emit(AgentEvent::RootUnmounted(id.clone()));
        }
        self.emit(AgentEvent::Unmount(id.clone()));
        self.state_mut().registry.forget(handle);
        Some(id)
    }

    // Bridge wiring.

    /// Links `bridge`: inbound commands are decoded and dispatched to this agent, and the
    /// wire-facing agent events are sent out.
    pub fn add_bridge(&self, bridge: &Bridge) -> BridgeLink {
        let mut subscriptions = Vec::with_capacity(INBOUND_EVENTS.len() + 1);
        for name in INBOUND_EVENTS {
            let agent = self.downgrade();
            let responder = bridge.downgrade();
            subscriptions.push(bridge.on(name, move |payload| {
                if let Some(agent) = Agent::upgrade(&agent) {
                    agent.receive_command(name, payload, &responder);
                }
            }));
        }

        let outbound = bridge.clone();
        subscriptions.push(self.subscribe(move |event| forward_to_bridge(&outbound, event)));
        BridgeLink { subscriptions }
    }

    fn receive_command(&self, name: &str, payload: &Value, responder: &WeakBridge) {
        match Command::decode(name, payload) {
            Ok(Some(Command::RequestCapabilities)) => {
                if let Some(bridge) = responder.upgrade() {
                    bridge.send(names::CAPABILITIES, self.capabilities());
                }
                self.dispatch(Command::RequestCapabilities);
            }
            Ok(Some(command)) => self.dispatch(command),
            Ok(None) => trace!(event = name, "ignoring unknown inbound event"),
            Err(err) => warn!(error = %err, "dropping malformed inbound command"),
        }
    }

    /// Applies one remote command. Commands aimed at unknown identities or unsupported
    /// capabilities are logged and ignored.
    pub fn dispatch(&self, command: Command) {
        match command {
            Command::RequestCapabilities => self.emit(AgentEvent::Connected),
            Command::SetValue { slot, update } => self.set_value(slot, update),
            Command::MakeGlobal(payload) => self.make_global(payload),
            Command::Highlight(id) => self.highlight(&id),
            Command::HighlightMany(ids) => self.highlight_many(&ids),
            Command::HideHighlight => self.emit(AgentEvent::HideHighlight),
            Command::StartInspecting => self.emit(AgentEvent::StartInspecting),
            Command::StopInspecting => self.emit(AgentEvent::StopInspecting),
            Command::Selected(id) => self.select_from_ui(id),
            Command::SetInspectEnabled(enabled) => self.set_inspect_enabled(enabled),
            Command::Shutdown => self.emit(AgentEvent::Shutdown),
            Command::ChangeTextContent(payload) => self.change_text_content(payload),
            Command::PutSelectedNode(id) => self.put_selected_node(id.as_ref()),
            Command::PutSelectedInstance(id) => self.put_selected_instance(id.as_ref()),
            Command::CheckSelection => self.check_selection(),
            Command::ScrollToNode(id) => self.scroll_to_node(&id),
            Command::Passthrough { name, payload } => {
                self.emit(AgentEvent::Passthrough { name, payload })
            }
        }
    }

    // Mutation commands.

    pub fn set_props(&self, update: UpdateValuePayload) {
        self.set_value(UpdateSlot::Props, update);
    }

    pub fn set_state(&self, update: UpdateValuePayload) {
        self.set_value(UpdateSlot::State, update);
    }

    pub fn set_context(&self, update: UpdateValuePayload) {
        self.set_value(UpdateSlot::Context, update);
    }

    fn set_value(&self, slot: UpdateSlot, update: UpdateValuePayload) {
        let setter = {
            let state = self.state();
            let Some(snapshot) = state.store.get(&update.id) else {
                warn!(id = %update.id, %slot, "cannot set value: element is not mounted");
                return;
            };
            snapshot.updater().and_then(|updater| updater.setter(slot)).cloned()
        };
        let Some(setter) = setter else {
            warn!(id = %update.id, %slot, "element does not support value updates");
            return;
        };
        setter(&update.path, update.value);
    }

    /// Exposes the public instance (`"instance"`) or a snapshot value on the `$tmp` slot.
    pub fn make_global(&self, payload: MakeGlobalPayload) {
        let value = {
            let state = self.state();
            let Some(snapshot) = state.store.get(&payload.id) else {
                debug!(id = %payload.id, "makeGlobal for an element that is not mounted");
                return;
            };
            if payload.path.is_instance() {
                snapshot.public_instance().cloned().map(SlotValue::Object)
            } else {
                snapshot.value_at(&payload.path.keys()).map(SlotValue::Json)
            }
        };
        info!(slot = DebugSlot::Temp.global_name(), value = ?value, "exposed value for debugging");
        self.shared.host.set_slot(DebugSlot::Temp, value);
    }

    pub fn change_text_content(&self, payload: TextContentPayload) {
        let Some(node) = self.native_for_id(&payload.id) else {
            warn!(id = %payload.id, "unable to resolve the native node to edit");
            return;
        };
        if !node.set_text_content(&payload.text) {
            warn!(id = %payload.id, "native node does not support text edits");
        }
    }

    // Native resolution.

    /// Resolves `id` to its native node. The owning renderer is asked first, then every other
    /// renderer in registration order; a failing renderer counts as a miss.
    pub fn native_for_id(&self, id: &ElementId) -> Option<NativeRef> {
        let (handle, lookups) = {
            let state = self.state();
            let handle = state
                .registry
                .handle_for(id)
                .or_else(|| state.store.contains(id).then(|| Handle::value(id.clone())))?;
            let lookups = state.renderers.native_lookups(state.store.renderer_of(id));
            (handle, lookups)
        };

        for (renderer, lookup) in lookups {
            match lookup(&handle) {
                Ok(Some(node)) => return Some(node),
                Ok(None) => {}
                Err(err) => debug!(%renderer, %id, error = %err, "native lookup failed"),
            }
        }
        None
    }

    /// Resolves a native node to the identity of the handle that renders it, trying renderers
    /// in registration order.
    pub fn id_for_native(&self, node: &NativeRef) -> Option<ElementId> {
        let lookups = self.state().renderers.handle_lookups();
        for (renderer, lookup) in lookups {
            match lookup(node) {
                Ok(Some(handle)) => return Some(self.id_for_handle(&handle)),
                Ok(None) => {}
                Err(err) => debug!(%renderer, error = %err, "handle lookup failed"),
            }
        }
        None
    }
}

fn forward_to_bridge(bridge: &Bridge, event: &AgentEvent) {
    match event {
        AgentEvent::Root(id) => bridge.send(names::ROOT, id),
        AgentEvent::Mount(payload) => bridge.send_inspectable(&payload.id, names::MOUNT, payload),
        AgentEvent::Update(payload) => {
            bridge.send_inspectable(&payload.id, names::UPDATE, payload)
        }
        AgentEvent::Unmount(id) => {
            bridge.send(names::UNMOUNT, id);
            bridge.forget(id);
        }
        AgentEvent::SetSelection(payload) => bridge.send(names::SELECT, payload),
        AgentEvent::SetInspectEnabled(enabled) => bridge.send(names::SET_INSPECT_ENABLED, enabled),
        _ => {}
    }
}

#[cfg(test)]
pub(crate) mod fixtures;

#[cfg(test)]
mod tests;
