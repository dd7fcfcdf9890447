// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Nereid and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Seams between the agent and the environment it is embedded in.

use std::any::Any;
use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};
use std::fmt;
use std::rc::Rc;

use serde_json::Value;

use crate::model::{same_object, Capabilities, Opaque};

pub type NativeRef = Rc<dyn NativeNode>;

/// A node in the host's native tree (a DOM element, a text node, a native view).
///
/// Optional abilities default to "unsupported"; an implementation opts in by overriding them.
pub trait NativeNode: 'static {
    fn as_any(&self) -> &dyn Any;

    /// Element-like nodes can be scrolled to and measured. Text nodes are not element-like.
    fn is_element(&self) -> bool {
        true
    }

    fn parent_element(&self) -> Option<NativeRef> {
        None
    }

    /// Precision scroll. Returns `false` when unsupported.
    fn scroll_into_view_if_needed(&self) -> bool {
        false
    }

    /// Basic scroll fallback. Returns `false` when unsupported.
    fn scroll_into_view(&self) -> bool {
        false
    }

    /// Replaces the node's text. Returns `false` when unsupported.
    fn set_text_content(&self, _text: &str) -> bool {
        false
    }
}

pub fn same_native(a: &NativeRef, b: &NativeRef) -> bool {
    std::ptr::eq(Rc::as_ptr(a) as *const (), Rc::as_ptr(b) as *const ())
}

/// Well-known debugging slots the host exposes for manual, interactive debugging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DebugSlot {
    /// Public instance of the last node selected in the UI (`$r`).
    SelectedInstance,
    /// Native node last pushed for inspection (`$node`).
    InspectedNode,
    /// Public instance last pushed for inspection (`$inst`).
    InspectedInstance,
    /// Raw type reference last pushed for inspection (`$type`).
    InspectedType,
    /// Target of `makeGlobal` (`$tmp`).
    Temp,
}

impl DebugSlot {
    pub fn global_name(self) -> &'static str {
        match self {
            Self::SelectedInstance => "$r",
            Self::InspectedNode => "$node",
            Self::InspectedInstance => "$inst",
            Self::InspectedType => "$type",
            Self::Temp => "$tmp",
        }
    }
}

#[derive(Clone)]
pub enum SlotValue {
    Object(Opaque),
    Native(NativeRef),
    Json(Value),
}

impl SlotValue {
    /// Reference identity for objects and nodes, structural equality for JSON.
    pub fn same(&self, other: &SlotValue) -> bool {
        match (self, other) {
            (Self::Object(a), Self::Object(b)) => same_object(a, b),
            (Self::Native(a), Self::Native(b)) => same_native(a, b),
            (Self::Json(a), Self::Json(b)) => a == b,
            _ => false,
        }
    }

    pub fn as_native(&self) -> Option<&NativeRef> {
        match self {
            Self::Native(node) => Some(node),
            _ => None,
        }
    }

    pub fn as_json(&self) -> Option<&Value> {
        match self {
            Self::Json(value) => Some(value),
            _ => None,
        }
    }
}

impl fmt::Debug for SlotValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Object(object) => write!(f, "Object({:p})", Rc::as_ptr(object) as *const ()),
            Self::Native(node) => write!(f, "Native({:p})", Rc::as_ptr(node) as *const ()),
            Self::Json(value) => write!(f, "Json({value})"),
        }
    }
}

/// The hosting environment's console globals.
pub trait HostConsole {
    fn slot(&self, slot: DebugSlot) -> Option<SlotValue>;

    fn set_slot(&self, slot: DebugSlot, value: Option<SlotValue>);

    /// The native node currently inspected by tooling outside this protocol (`$0`).
    fn inspected_native(&self) -> Option<NativeRef>;

    /// Capabilities the host can offer, before configuration overrides.
    fn detect_capabilities(&self) -> Capabilities {
        Capabilities::default()
    }
}

/// In-memory [`HostConsole`], for embedding without real globals and for tests.
#[derive(Default)]
pub struct MemoryConsole {
    slots: RefCell<HashMap<DebugSlot, SlotValue>>,
    inspected: RefCell<Option<NativeRef>>,
    capabilities: Capabilities,
}

impl MemoryConsole {
    pub fn new(capabilities: Capabilities) -> Self {
        Self { capabilities, ..Self::default() }
    }

    /// Simulates an outside tool changing `$0`.
    pub fn set_inspected_native(&self, node: Option<NativeRef>) {
        *self.inspected.borrow_mut() = node;
    }
}

impl HostConsole for MemoryConsole {
    fn slot(&self, slot: DebugSlot) -> Option<SlotValue> {
        self.slots.borrow().get(&slot).cloned()
    }

    fn set_slot(&self, slot: DebugSlot, value: Option<SlotValue>) {
        let mut slots = self.slots.borrow_mut();
        match value {
            Some(value) => {
                slots.insert(slot, value);
            }
            None => {
                slots.remove(&slot);
            }
        }
    }

    fn inspected_native(&self) -> Option<NativeRef> {
        self.inspected.borrow().clone()
    }

    fn detect_capabilities(&self) -> Capabilities {
        self.capabilities
    }
}

pub type FrameCallback = Box<dyn FnOnce()>;

/// Runs callbacks on the host's next animation frame.
pub trait FrameScheduler {
    fn request_frame(&self, callback: FrameCallback);
}

/// Frame scheduler driven by the embedder: callbacks run on [`ManualFrames::run_frame`].
#[derive(Default)]
pub struct ManualFrames {
    pending: RefCell<VecDeque<FrameCallback>>,
}

impl ManualFrames {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pending(&self) -> usize {
        self.pending.borrow().len()
    }

    /// Runs the callbacks queued before this call and returns how many ran. Callbacks queued
    /// while running wait for the next frame.
    pub fn run_frame(&self) -> usize {
        let due = std::mem::take(&mut *self.pending.borrow_mut());
        let ran = due.len();
        for callback in due {
            callback();
        }
        ran
    }
}

impl FrameScheduler for ManualFrames {
    fn request_frame(&self, callback: FrameCallback) {
        self.pending.borrow_mut().push_back(callback);
    }
}
