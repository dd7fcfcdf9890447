// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Nereid and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::collections::BTreeMap;
use std::fmt;

use schemars::{schema_for, JsonSchema, Schema};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use smol_str::SmolStr;

use crate::model::{Capabilities, ElementId, ElementPayload, PathKey};

/// Event names used on the wire.
pub mod names {
    // Outbound.
    pub const ROOT: &str = "root";
    pub const MOUNT: &str = "mount";
    pub const UPDATE: &str = "update";
    pub const UNMOUNT: &str = "unmount";
    pub const SELECT: &str = "select";
    pub const CAPABILITIES: &str = "capabilities";
    pub const FORGET: &str = "forget";
    pub const SET_INSPECT_ENABLED: &str = "setInspectEnabled";

    // Inbound.
    pub const REQUEST_CAPABILITIES: &str = "requestCapabilities";
    pub const SET_STATE: &str = "setState";
    pub const SET_PROPS: &str = "setProps";
    pub const SET_CONTEXT: &str = "setContext";
    pub const MAKE_GLOBAL: &str = "makeGlobal";
    pub const HIGHLIGHT: &str = "highlight";
    pub const HIGHLIGHT_MANY: &str = "highlightMany";
    pub const HIDE_HIGHLIGHT: &str = "hideHighlight";
    pub const START_INSPECTING: &str = "startInspecting";
    pub const STOP_INSPECTING: &str = "stopInspecting";
    pub const SELECTED: &str = "selected";
    pub const SHUTDOWN: &str = "shutdown";
    pub const CHANGE_TEXT_CONTENT: &str = "changeTextContent";
    pub const PUT_SELECTED_NODE: &str = "putSelectedNode";
    pub const PUT_SELECTED_INSTANCE: &str = "putSelectedInstance";
    pub const CHECK_SELECTION: &str = "checkSelection";
    pub const SCROLL_TO_NODE: &str = "scrollToNode";
    pub const TRACE_UPDATES_STATE_CHANGE: &str = "traceupdatesstatechange";
    pub const COLORIZER_CHANGE: &str = "colorizerchange";

    /// Inbound events forwarded onto the agent bus without interpretation.
    pub const PASSTHROUGH: [&str; 2] = [TRACE_UPDATES_STATE_CHANGE, COLORIZER_CHANGE];
}

/// One named event with its payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct WireEvent {
    #[schemars(with = "String")]
    pub name: SmolStr,
    #[serde(default)]
    pub payload: Value,
}

impl WireEvent {
    pub fn new(name: impl Into<SmolStr>, payload: Value) -> Self {
        Self { name: name.into(), payload }
    }
}

/// Unit of transport. Batched bridges deliver `Many`; receivers accept both.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Envelope {
    Event(WireEvent),
    Many { events: Vec<WireEvent> },
}

impl Envelope {
    pub fn events(&self) -> &[WireEvent] {
        match self {
            Self::Event(event) => std::slice::from_ref(event),
            Self::Many { events } => events,
        }
    }
}

/// `select`: ask the remote to select an identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct SelectionPayload {
    pub id: ElementId,
    /// Suppresses focus-stealing behavior on the remote side.
    #[serde(default)]
    pub quiet: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offset_from_leaf: Option<u32>,
}

/// `setProps` / `setState` / `setContext`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct UpdateValuePayload {
    pub id: ElementId,
    pub path: Vec<PathKey>,
    #[serde(default)]
    pub value: Value,
}

/// Target of `makeGlobal`: the string `"instance"` or a key path into the snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum GlobalPath {
    Named(String),
    Keys(Vec<PathKey>),
}

impl GlobalPath {
    pub const INSTANCE: &'static str = "instance";

    pub fn instance() -> Self {
        Self::Named(Self::INSTANCE.to_owned())
    }

    pub fn is_instance(&self) -> bool {
        matches!(self, Self::Named(name) if name == Self::INSTANCE)
    }

    /// The key path; a bare name other than `"instance"` is a one-key path.
    pub fn keys(&self) -> Vec<PathKey> {
        match self {
            Self::Named(name) => vec![PathKey::Key(name.clone())],
            Self::Keys(keys) => keys.clone(),
        }
    }
}

/// `makeGlobal`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct MakeGlobalPayload {
    pub id: ElementId,
    pub path: GlobalPath,
}

/// `changeTextContent`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct TextContentPayload {
    pub id: ElementId,
    pub text: String,
}

/// JSON schemas for every typed payload, keyed by the event names that carry them.
pub fn payload_schemas() -> BTreeMap<&'static str, Schema> {
    BTreeMap::from([
        ("envelope", schema_for!(Envelope)),
        (names::CAPABILITIES, schema_for!(Capabilities)),
        (names::MOUNT, schema_for!(ElementPayload)),
        (names::UPDATE, schema_for!(ElementPayload)),
        (names::SELECT, schema_for!(SelectionPayload)),
        (names::SET_PROPS, schema_for!(UpdateValuePayload)),
        (names::SET_STATE, schema_for!(UpdateValuePayload)),
        (names::SET_CONTEXT, schema_for!(UpdateValuePayload)),
        (names::MAKE_GLOBAL, schema_for!(MakeGlobalPayload)),
        (names::CHANGE_TEXT_CONTENT, schema_for!(TextContentPayload)),
    ])
}

#[derive(Debug)]
pub enum WireError {
    /// The envelope itself did not parse.
    Malformed(serde_json::Error),
    /// A known event carried a payload of the wrong shape.
    Payload { event: SmolStr, source: serde_json::Error },
}

impl fmt::Display for WireError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Malformed(err) => write!(f, "malformed envelope: {err}"),
            Self::Payload { event, source } => write!(f, "invalid '{event}' payload: {source}"),
        }
    }
}

impl std::error::Error for WireError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Malformed(err) => Some(err),
            Self::Payload { source, .. } => Some(source),
        }
    }
}

/// Decodes the payload of `event` into `T`.
pub fn decode<T: serde::de::DeserializeOwned>(
    event: &str,
    payload: &Value,
) -> Result<T, WireError> {
    T::deserialize(payload)
        .map_err(|source| WireError::Payload { event: SmolStr::new(event), source })
}
