// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Nereid and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use serde_json::Value;
use smallvec::SmallVec;
use smol_str::SmolStr;

use super::host::NativeRef;
use crate::bridge::listeners::{subscribe, ListenerTable};
use crate::bridge::wire::SelectionPayload;
use crate::bridge::Subscription;
use crate::model::{ElementId, ElementPayload};

/// A highlight request for overlays: the resolved native node plus display metadata.
#[derive(Clone)]
pub struct Highlight {
    pub id: ElementId,
    pub node: NativeRef,
    pub name: String,
    pub props: Option<Value>,
}

impl fmt::Debug for Highlight {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Highlight")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("props", &self.props)
            .finish_non_exhaustive()
    }
}

pub type HighlightNodes = SmallVec<[NativeRef; 4]>;

/// Everything the agent announces to in-process listeners. Bridges subscribe to the subset
/// that crosses the wire; overlays subscribe to the highlight family.
#[derive(Clone)]
pub enum AgentEvent {
    Connected,
    Root(ElementId),
    RootCommitted(ElementId),
    RootUnmounted(ElementId),
    Mount(ElementPayload),
    Update(ElementPayload),
    Unmount(ElementId),
    SetSelection(SelectionPayload),
    SetInspectEnabled(bool),
    Selected(ElementId),
    Highlight(Highlight),
    HighlightMany(HighlightNodes),
    HideHighlight,
    StartInspecting,
    StopInspecting,
    RefreshMultiOverlay,
    Shutdown,
    Passthrough { name: SmolStr, payload: Value },
}

impl AgentEvent {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Connected => "connected",
            Self::Root(_) => "root",
            Self::RootCommitted(_) => "rootCommitted",
            Self::RootUnmounted(_) => "rootUnmounted",
            Self::Mount(_) => "mount",
            Self::Update(_) => "update",
            Self::Unmount(_) => "unmount",
            Self::SetSelection(_) => "setSelection",
            Self::SetInspectEnabled(_) => "setInspectEnabled",
            Self::Selected(_) => "selected",
            Self::Highlight(_) => "highlight",
            Self::HighlightMany(_) => "highlightMany",
            Self::HideHighlight => "hideHighlight",
            Self::StartInspecting => "startInspecting",
            Self::StopInspecting => "stopInspecting",
            Self::RefreshMultiOverlay => "refreshMultiOverlay",
            Self::Shutdown => "shutdown",
            Self::Passthrough { .. } => "passthrough",
        }
    }
}

impl fmt::Debug for AgentEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Root(id)
            | Self::RootCommitted(id)
            | Self::RootUnmounted(id)
            | Self::Unmount(id)
            | Self::Selected(id) => write!(f, "{}({id})", self.kind()),
            Self::Mount(payload) | Self::Update(payload) => {
                write!(f, "{}({})", self.kind(), payload.id)
            }
            Self::SetSelection(payload) => write!(f, "setSelection({payload:?})"),
            Self::SetInspectEnabled(enabled) => write!(f, "setInspectEnabled({enabled})"),
            Self::Highlight(highlight) => write!(f, "{highlight:?}"),
            Self::HighlightMany(nodes) => write!(f, "highlightMany({} nodes)", nodes.len()),
            Self::Passthrough { name, payload } => write!(f, "passthrough({name}, {payload})"),
            _ => f.write_str(self.kind()),
        }
    }
}

/// Typed broadcast bus owned by the agent.
#[derive(Clone, Default)]
pub struct EventBus {
    table: Rc<RefCell<ListenerTable<AgentEvent>>>,
}

impl EventBus {
    pub fn subscribe(&self, listener: impl Fn(&AgentEvent) + 'static) -> Subscription {
        subscribe(&self.table, Rc::new(listener))
    }

    /// Delivers `event` to the listeners registered when the call starts.
    pub fn emit(&self, event: &AgentEvent) {
        let listeners = self.table.borrow().snapshot();
        for listener in listeners {
            listener(event);
        }
    }

    pub fn listener_count(&self) -> usize {
        self.table.borrow().len()
    }
}
