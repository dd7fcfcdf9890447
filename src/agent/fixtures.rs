// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Nereid and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::any::Any;
use std::cell::{Cell, RefCell};
use std::rc::Rc;

use serde_json::Value;

use super::host::{ManualFrames, MemoryConsole, NativeNode, NativeRef};
use super::renderer::RendererInterface;
use super::{same_native, Agent, AgentEvent};
use crate::bridge::{Bridge, Envelope};
use crate::config::{AgentConfig, BridgeConfig};
use crate::model::{Capabilities, ElementId, Handle, RawElement, RendererId};

/// Stand-in for a component instance owned by a renderer.
#[derive(Debug)]
pub(crate) struct Fiber {
    pub(crate) name: String,
}

impl Fiber {
    pub(crate) fn handle(name: &str) -> Handle {
        Handle::object(Rc::new(Fiber { name: name.to_owned() }))
    }
}

/// A native node that records what was done to it.
pub(crate) struct FakeNode {
    pub(crate) label: String,
    pub(crate) element: bool,
    pub(crate) parent: Option<NativeRef>,
    pub(crate) precise_scroll: bool,
    pub(crate) scrolls: Cell<u32>,
    pub(crate) text: RefCell<Option<String>>,
    pub(crate) editable: bool,
}

impl FakeNode {
    fn build(label: &str, element: bool, parent: Option<NativeRef>) -> Self {
        Self {
            label: label.to_owned(),
            element,
            parent,
            precise_scroll: true,
            scrolls: Cell::new(0),
            text: RefCell::new(None),
            editable: true,
        }
    }

    pub(crate) fn element(label: &str) -> Rc<Self> {
        Rc::new(Self::build(label, true, None))
    }

    pub(crate) fn text(label: &str, parent: Option<NativeRef>) -> Rc<Self> {
        Rc::new(Self::build(label, false, parent))
    }

    /// An element that only supports the basic scroll fallback.
    pub(crate) fn coarse(label: &str) -> Rc<Self> {
        Rc::new(Self { precise_scroll: false, ..Self::build(label, true, None) })
    }
}

impl NativeNode for FakeNode {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn is_element(&self) -> bool {
        self.element
    }

    fn parent_element(&self) -> Option<NativeRef> {
        self.parent.clone()
    }

    fn scroll_into_view_if_needed(&self) -> bool {
        if self.precise_scroll {
            self.scrolls.set(self.scrolls.get() + 1);
        }
        self.precise_scroll
    }

    fn scroll_into_view(&self) -> bool {
        self.scrolls.set(self.scrolls.get() + 1);
        true
    }

    fn set_text_content(&self, text: &str) -> bool {
        if self.editable {
            *self.text.borrow_mut() = Some(text.to_owned());
        }
        self.editable
    }
}

pub(crate) type NodeMap = Rc<RefCell<Vec<(Handle, NativeRef)>>>;
pub(crate) type Recorded = Rc<RefCell<Vec<AgentEvent>>>;
pub(crate) type Sent = Rc<RefCell<Vec<Envelope>>>;

/// Renderer interface backed by an explicit handle/node table.
pub(crate) fn table_renderer(nodes: &NodeMap) -> RendererInterface {
    let forward = Rc::clone(nodes);
    let backward = Rc::clone(nodes);
    RendererInterface::default()
        .with_native_from_handle(move |handle| {
            Ok(forward.borrow().iter().find(|(h, _)| h.ptr_eq(handle)).map(|(_, n)| Rc::clone(n)))
        })
        .with_handle_from_native(move |node| {
            Ok(backward.borrow().iter().find(|(_, n)| same_native(n, node)).map(|(h, _)| h.clone()))
        })
}

pub(crate) struct Harness {
    pub(crate) agent: Agent,
    pub(crate) console: Rc<MemoryConsole>,
    pub(crate) frames: Rc<ManualFrames>,
    pub(crate) renderer: RendererId,
    pub(crate) nodes: NodeMap,
    pub(crate) events: Recorded,
}

impl Harness {
    pub(crate) fn new(capabilities: Capabilities) -> Self {
        let console = Rc::new(MemoryConsole::new(capabilities));
        let frames = Rc::new(ManualFrames::new());
        let agent = Agent::new(AgentConfig::default(), console.clone(), frames.clone());

        let renderer = RendererId::new("dom").expect("renderer id");
        let nodes: NodeMap = Rc::new(RefCell::new(Vec::new()));
        agent.register_renderer(renderer.clone(), table_renderer(&nodes));

        let events: Recorded = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&events);
        let _recording = agent.subscribe(move |event| sink.borrow_mut().push(event.clone()));

        Self { agent, console, frames, renderer, nodes, events }
    }

    /// Links a recording bridge to the agent.
    pub(crate) fn bridge(&self, config: BridgeConfig) -> (Bridge, Sent) {
        let sent: Sent = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&sent);
        let bridge =
            Bridge::new(move |envelope: Envelope| sink.borrow_mut().push(envelope), config);
        let _link = self.agent.add_bridge(&bridge);
        (bridge, sent)
    }

    pub(crate) fn attach(&self, handle: &Handle, node: NativeRef) {
        self.nodes.borrow_mut().push((handle.clone(), node));
    }

    /// Mounts a childless element rendered by `node`.
    pub(crate) fn mount_with_node(&self, name: &str, node: NativeRef) -> (Handle, ElementId) {
        let handle = Fiber::handle(name);
        self.attach(&handle, node);
        let id = self.agent.on_mounted(&self.renderer, &handle, RawElement::new(name));
        (handle, id)
    }

    pub(crate) fn kinds(&self) -> Vec<&'static str> {
        self.events.borrow().iter().map(AgentEvent::kind).collect()
    }

    pub(crate) fn clear(&self) {
        self.events.borrow_mut().clear();
    }
}

pub(crate) fn wire_events(sent: &Sent) -> Vec<(String, Value)> {
    sent.borrow()
        .iter()
        .flat_map(|envelope| {
            envelope
                .events()
                .iter()
                .map(|event| (event.name.to_string(), event.payload.clone()))
                .collect::<Vec<_>>()
        })
        .collect()
}
