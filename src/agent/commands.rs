// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Nereid and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Inbound commands from the remote UI.
//!
//! Every inbound event name the agent understands decodes into one [`Command`]. Decoding is the
//! only place a remote payload can be rejected; dispatch itself never fails.

use serde_json::Value;
use smol_str::SmolStr;

use crate::bridge::wire::{
    decode, names, MakeGlobalPayload, TextContentPayload, UpdateValuePayload, WireError,
};
use crate::model::{ElementId, UpdateSlot};

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    RequestCapabilities,
    SetValue { slot: UpdateSlot, update: UpdateValuePayload },
    MakeGlobal(MakeGlobalPayload),
    Highlight(ElementId),
    HighlightMany(Vec<ElementId>),
    HideHighlight,
    StartInspecting,
    StopInspecting,
    Selected(ElementId),
    SetInspectEnabled(bool),
    Shutdown,
    ChangeTextContent(TextContentPayload),
    PutSelectedNode(Option<ElementId>),
    PutSelectedInstance(Option<ElementId>),
    CheckSelection,
    ScrollToNode(ElementId),
    Passthrough { name: SmolStr, payload: Value },
}

/// Every inbound event name [`Command::decode`] accepts.
pub const INBOUND_EVENTS: [&str; 20] = [
    names::REQUEST_CAPABILITIES,
    names::SET_STATE,
    names::SET_PROPS,
    names::SET_CONTEXT,
    names::MAKE_GLOBAL,
    names::HIGHLIGHT,
    names::HIGHLIGHT_MANY,
    names::HIDE_HIGHLIGHT,
    names::START_INSPECTING,
    names::STOP_INSPECTING,
    names::SELECTED,
    names::SET_INSPECT_ENABLED,
    names::SHUTDOWN,
    names::CHANGE_TEXT_CONTENT,
    names::PUT_SELECTED_NODE,
    names::PUT_SELECTED_INSTANCE,
    names::CHECK_SELECTION,
    names::SCROLL_TO_NODE,
    names::TRACE_UPDATES_STATE_CHANGE,
    names::COLORIZER_CHANGE,
];

impl Command {
    /// Decodes inbound event `name`. Unknown names yield `Ok(None)`.
    pub fn decode(name: &str, payload: &Value) -> Result<Option<Self>, WireError> {
        let command = match name {
            names::REQUEST_CAPABILITIES => Self::RequestCapabilities,
            names::SET_PROPS => {
                Self::SetValue { slot: UpdateSlot::Props, update: decode(name, payload)? }
            }
            names::SET_STATE => {
                Self::SetValue { slot: UpdateSlot::State, update: decode(name, payload)? }
            }
            names::SET_CONTEXT => {
                Self::SetValue { slot: UpdateSlot::Context, update: decode(name, payload)? }
            }
            names::MAKE_GLOBAL => Self::MakeGlobal(decode(name, payload)?),
            names::HIGHLIGHT => Self::Highlight(decode(name, payload)?),
            names::HIGHLIGHT_MANY => Self::HighlightMany(decode(name, payload)?),
            names::HIDE_HIGHLIGHT => Self::HideHighlight,
            names::START_INSPECTING => Self::StartInspecting,
            names::STOP_INSPECTING => Self::StopInspecting,
            names::SELECTED => Self::Selected(decode(name, payload)?),
            names::SET_INSPECT_ENABLED => Self::SetInspectEnabled(decode(name, payload)?),
            names::SHUTDOWN => Self::Shutdown,
            names::CHANGE_TEXT_CONTENT => Self::ChangeTextContent(decode(name, payload)?),
            names::PUT_SELECTED_NODE => Self::PutSelectedNode(decode(name, payload)?),
            names::PUT_SELECTED_INSTANCE => Self::PutSelectedInstance(decode(name, payload)?),
            names::CHECK_SELECTION => Self::CheckSelection,
            names::SCROLL_TO_NODE => Self::ScrollToNode(decode(name, payload)?),
            _ if names::PASSTHROUGH.contains(&name) => {
                Self::Passthrough { name: SmolStr::new(name), payload: payload.clone() }
            }
            _ => return Ok(None),
        };
        Ok(Some(command))
    }
}

#[cfg(test)]
mod tests {
    use serde_json::{json, Value};

    use super::{Command, INBOUND_EVENTS};
    use crate::bridge::wire::names;
    use crate::model::{ElementId, PathKey, UpdateSlot};

    fn eid(value: &str) -> ElementId {
        ElementId::new(value).expect("element id")
    }

    #[test]
    fn decodes_value_updates_into_slots() {
        let payload = json!({ "id": "r3", "path": ["count"], "value": 2 });
        let Some(Command::SetValue { slot, update }) =
            Command::decode(names::SET_STATE, &payload).expect("decode")
        else {
            panic!("expected SetValue");
        };
        assert_eq!(slot, UpdateSlot::State);
        assert_eq!(update.id, eid("r3"));
        assert_eq!(update.path, vec![PathKey::Key("count".to_owned())]);
        assert_eq!(update.value, json!(2));
    }

    #[test]
    fn put_selected_accepts_null() {
        let command = Command::decode(names::PUT_SELECTED_NODE, &Value::Null).expect("decode");
        assert_eq!(command, Some(Command::PutSelectedNode(None)));
    }

    #[test]
    fn passthrough_keeps_payload_verbatim() {
        let payload = json!({ "enabled": true, "extra": [1, 2] });
        let command = Command::decode(names::COLORIZER_CHANGE, &payload).expect("decode");
        assert_eq!(
            command,
            Some(Command::Passthrough { name: "colorizerchange".into(), payload })
        );
    }

    #[test]
    fn unknown_events_are_not_commands() {
        assert_eq!(Command::decode("storeSnapshot", &Value::Null).expect("decode"), None);
    }

    #[test]
    fn malformed_payloads_are_errors() {
        assert!(Command::decode(names::HIGHLIGHT_MANY, &json!("r1")).is_err());
        assert!(Command::decode(names::HIGHLIGHT, &json!("")).is_err());
    }

    #[test]
    fn every_inbound_event_decodes_with_some_payload() {
        for name in INBOUND_EVENTS {
            let decoded = [
                Value::Null,
                json!("r1"),
                json!(["r1"]),
                json!(true),
                json!({ "id": "r1", "path": [], "value": 1, "text": "t" }),
            ]
            .iter()
            .any(|payload| matches!(Command::decode(name, payload), Ok(Some(_))));
            assert!(decoded, "{name} never decoded");
        }
    }
}
