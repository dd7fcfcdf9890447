// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Nereid and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Selection, highlighting, inspect mode and console-slot reconciliation.

use tracing::{debug, trace, warn};

use super::events::{AgentEvent, Highlight, HighlightNodes};
use super::host::{same_native, DebugSlot, NativeRef, SlotValue};
use super::{Agent, Selection};
use crate::bridge::wire::SelectionPayload;
use crate::model::{same_object, ElementId, Handle};

impl Agent {
    /// Selection made in the remote UI.
    pub(super) fn select_from_ui(&self, id: ElementId) {
        self.state_mut().selection = Selection::Selected(id.clone());
        self.emit(AgentEvent::Selected(id));
    }

    fn push_selection(&self, payload: SelectionPayload) -> ElementId {
        let id = payload.id.clone();
        self.state_mut().selection = Selection::Selected(id.clone());
        self.emit(AgentEvent::SetSelection(payload));
        id
    }

    /// Selects whatever renders `node`. Returns `None` when no renderer claims it.
    pub fn select_from_native(
        &self,
        node: &NativeRef,
        quiet: bool,
        offset_from_leaf: Option<u32>,
    ) -> Option<ElementId> {
        let Some(id) = self.id_for_native(node) else {
            debug!("no renderer claims the native node to select");
            return None;
        };
        Some(self.push_selection(SelectionPayload { id, quiet, offset_from_leaf }))
    }

    /// Selects a handle that already has an identity. Never allocates one.
    pub fn select_from_handle(&self, handle: &Handle, quiet: bool) -> Option<ElementId> {
        let Some(id) = self.lookup_handle(handle) else {
            debug!(?handle, "cannot select a handle without an identity");
            return None;
        };
        Some(self.push_selection(SelectionPayload { id, quiet, offset_from_leaf: None }))
    }

    /// Mirrors the UI selection into `$r`, unless something else overwrote `$r` since the
    /// agent last wrote it.
    pub(super) fn expose_selected_instance(&self, id: &ElementId) {
        let Some(instance) =
            self.state().store.get(id).and_then(|snapshot| snapshot.public_instance().cloned())
        else {
            return;
        };

        let current = self.shared.host.slot(DebugSlot::SelectedInstance);
        let last = self.state().last_selected_instance.clone();
        let untouched = match (&current, &last) {
            (None, None) => true,
            (Some(SlotValue::Object(current)), Some(last)) => same_object(current, last),
            _ => false,
        };
        if !untouched {
            let slot = DebugSlot::SelectedInstance.global_name();
            trace!(%id, slot, "slot was overwritten outside the agent");
            return;
        }

        let value = SlotValue::Object(instance.clone());
        self.shared.host.set_slot(DebugSlot::SelectedInstance, Some(value));
        self.state_mut().last_selected_instance = Some(instance);
    }

    /// Reconciles the host's inspected node (`$0`) with the selection. Only a change since the
    /// previous check that differs from the node last pushed to `$node` selects, quietly.
    pub fn check_selection(&self) {
        let current = self.shared.host.inspected_native();
        {
            let mut state = self.state_mut();
            let unchanged = match (&current, &state.last_checked_native) {
                (None, None) => true,
                (Some(current), Some(previous)) => same_native(current, previous),
                _ => false,
            };
            if unchanged {
                return;
            }
            state.last_checked_native = current.clone();
        }

        let Some(current) = current else {
            return;
        };
        let pushed = self.shared.host.slot(DebugSlot::InspectedNode);
        let pushed = pushed.as_ref().and_then(SlotValue::as_native);
        if pushed.is_some_and(|node| same_native(node, &current)) {
            return;
        }
        self.select_from_native(&current, true, None);
    }

    /// Writes the native node for `id` to `$node`. `None`, or an id without a node, clears it.
    pub fn put_selected_node(&self, id: Option<&ElementId>) {
        let node = id.and_then(|id| self.native_for_id(id));
        self.shared.host.set_slot(DebugSlot::InspectedNode, node.map(SlotValue::Native));
    }

    /// Writes the type and public instance for `id` to `$type` and `$inst`.
    pub fn put_selected_instance(&self, id: Option<&ElementId>) {
        let (element_type, instance) = {
            let state = self.state();
            match id.and_then(|id| state.store.get(id)) {
                Some(snapshot) => {
                    (snapshot.element_type().cloned(), snapshot.public_instance().cloned())
                }
                None => (None, None),
            }
        };
        let host = &self.shared.host;
        host.set_slot(DebugSlot::InspectedType, element_type.map(SlotValue::Object));
        host.set_slot(DebugSlot::InspectedInstance, instance.map(SlotValue::Object));
    }

    pub fn highlight(&self, id: &ElementId) {
        let meta = self
            .state()
            .store
            .get(id)
            .map(|snapshot| (snapshot.name().to_owned(), snapshot.fields().props.clone()));
        let Some((name, props)) = meta else {
            trace!(%id, "nothing to highlight: element is not mounted");
            return;
        };
        let Some(node) = self.native_for_id(id) else {
            trace!(%id, "nothing to highlight: no native node");
            return;
        };
        self.emit(AgentEvent::Highlight(Highlight { id: id.clone(), node, name, props }));
    }

    /// Highlights every id that resolves to a node. Emits nothing when none do.
    pub fn highlight_many(&self, ids: &[ElementId]) {
        let nodes: HighlightNodes = ids.iter().filter_map(|id| self.native_for_id(id)).collect();
        if nodes.is_empty() {
            trace!(requested = ids.len(), "nothing to highlight");
            return;
        }
        self.emit(AgentEvent::HighlightMany(nodes));
    }

    /// Scrolls the element-like node for `id` (or its nearest element parent) into view and
    /// highlights it.
    pub fn scroll_to_node(&self, id: &ElementId) {
        let Some(node) = self.native_for_id(id) else {
            warn!(%id, "unable to get the native node for scrolling");
            return;
        };
        let Some(element) = element_like(node) else {
            warn!(%id, "unable to get an element-like node for scrolling");
            return;
        };

        if !element.scroll_into_view_if_needed() && !element.scroll_into_view() {
            debug!(%id, "native node cannot scroll");
        }
        self.highlight(id);
    }

    pub fn inspect_enabled(&self) -> bool {
        self.state().inspect_enabled
    }

    /// Turns native-tree inspect mode on or off. Any change stops a UI-driven inspection.
    pub fn set_inspect_enabled(&self, enabled: bool) {
        self.state_mut().inspect_enabled = enabled;
        self.emit(AgentEvent::StopInspecting);
    }

    /// A click in the native tree. While inspect mode is on it selects the clicked node, leaves
    /// inspect mode and returns `true`, meaning the host should swallow the click.
    pub fn on_native_click(&self, node: &NativeRef) -> bool {
        if !self.inspect_enabled() {
            return false;
        }
        let Some(id) = self.id_for_native(node) else {
            debug!("inspect click on a node no renderer claims");
            return false;
        };
        self.push_selection(SelectionPayload { id, quiet: false, offset_from_leaf: None });
        self.state_mut().inspect_enabled = false;
        self.emit(AgentEvent::SetInspectEnabled(false));
        true
    }

    pub fn on_native_hover(&self, node: &NativeRef) {
        if !self.inspect_enabled() {
            return;
        }
        if let Some(id) = self.id_for_native(node) {
            self.highlight(&id);
        }
    }

    pub fn on_resize(&self) {
        self.emit(AgentEvent::StopInspecting);
    }

    /// Requests one overlay refresh on the next frame. Scrolls before that frame coalesce.
    pub fn on_scroll(&self) {
        if self.shared.scroll_pending.replace(true) {
            return;
        }
        let weak = self.downgrade();
        self.shared.frames.request_frame(Box::new(move || {
            if let Some(agent) = Agent::upgrade(&weak) {
                agent.emit(AgentEvent::RefreshMultiOverlay);
                agent.shared.scroll_pending.set(false);
            }
        }));
    }
}

fn element_like(node: NativeRef) -> Option<NativeRef> {
    if node.is_element() {
        Some(node)
    } else {
        node.parent_element().filter(|parent| parent.is_element())
    }
}
