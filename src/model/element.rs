// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Nereid and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::fmt;
use std::rc::Rc;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::handle::{Handle, Opaque};
use super::ids::ElementId;

/// One step into a nested props/state/context value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum PathKey {
    Index(u64),
    Key(String),
}

impl From<&str> for PathKey {
    fn from(key: &str) -> Self {
        Self::Key(key.to_owned())
    }
}

impl From<u64> for PathKey {
    fn from(index: u64) -> Self {
        Self::Index(index)
    }
}

impl fmt::Display for PathKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Index(index) => write!(f, "{index}"),
            Self::Key(key) => f.write_str(key),
        }
    }
}

/// Walks `path` through `value`. Keys index objects; numeric keys also index arrays.
pub fn value_at<'a>(value: &'a Value, path: &[PathKey]) -> Option<&'a Value> {
    path.iter().try_fold(value, |current, key| match (current, key) {
        (Value::Object(map), PathKey::Key(key)) => map.get(key),
        (Value::Object(map), PathKey::Index(index)) => map.get(&index.to_string()),
        (Value::Array(items), PathKey::Index(index)) => {
            usize::try_from(*index).ok().and_then(|index| items.get(index))
        }
        (Value::Array(items), PathKey::Key(key)) => {
            key.parse::<usize>().ok().and_then(|index| items.get(index))
        }
        _ => None,
    })
}

/// Which updater slot a command targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UpdateSlot {
    Props,
    State,
    Context,
}

impl UpdateSlot {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Props => "props",
            Self::State => "state",
            Self::Context => "context",
        }
    }
}

impl fmt::Display for UpdateSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub type PathSetter = Rc<dyn Fn(&[PathKey], Value)>;
pub type ForceUpdate = Rc<dyn Fn()>;

/// Producer-supplied mutation capabilities for one node.
///
/// Support is decided by presence: a `None` slot means the producer cannot perform that
/// mutation, and commands targeting it are dropped.
#[derive(Clone, Default)]
pub struct Updater {
    pub set_in_props: Option<PathSetter>,
    pub set_in_state: Option<PathSetter>,
    pub set_in_context: Option<PathSetter>,
    pub force_update: Option<ForceUpdate>,
}

impl Updater {
    pub fn setter(&self, slot: UpdateSlot) -> Option<&PathSetter> {
        match slot {
            UpdateSlot::Props => self.set_in_props.as_ref(),
            UpdateSlot::State => self.set_in_state.as_ref(),
            UpdateSlot::Context => self.set_in_context.as_ref(),
        }
    }

    pub fn can_update(&self) -> bool {
        self.force_update.is_some()
    }
}

impl fmt::Debug for Updater {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Updater")
            .field("set_in_props", &self.set_in_props.is_some())
            .field("set_in_state", &self.set_in_state.is_some())
            .field("set_in_context", &self.set_in_context.is_some())
            .field("force_update", &self.force_update.is_some())
            .finish()
    }
}

/// Coarse node classification reported by producers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub enum NodeType {
    Composite,
    Native,
    Text,
    Wrapper,
    Empty,
    Special,
}

/// Children as the producer reports them.
#[derive(Clone, Default)]
pub enum RawChildren {
    #[default]
    None,
    Text(String),
    Handles(Vec<Handle>),
}

impl fmt::Debug for RawChildren {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => f.write_str("None"),
            Self::Text(text) => f.debug_tuple("Text").field(text).finish(),
            Self::Handles(handles) => f.debug_tuple("Handles").field(handles).finish(),
        }
    }
}

/// The producer's raw description of a node, as passed to mount/update.
#[derive(Clone, Default)]
pub struct RawElement {
    pub node_type: Option<NodeType>,
    pub name: String,
    pub key: Option<String>,
    pub ref_name: Option<String>,
    pub source: Option<Value>,
    pub props: Option<Value>,
    pub state: Option<Value>,
    pub context: Option<Value>,
    pub children: RawChildren,
    pub text: Option<String>,
    pub updater: Option<Updater>,
    pub public_instance: Option<Opaque>,
    /// Raw type reference. Kept locally for debugging slots, never serialized.
    pub element_type: Option<Opaque>,
}

impl RawElement {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), ..Self::default() }
    }

    pub fn with_node_type(mut self, node_type: NodeType) -> Self {
        self.node_type = Some(node_type);
        self
    }

    pub fn with_children(mut self, children: Vec<Handle>) -> Self {
        self.children = RawChildren::Handles(children);
        self
    }

    pub fn with_text_children(mut self, text: impl Into<String>) -> Self {
        self.children = RawChildren::Text(text.into());
        self
    }

    pub fn with_props(mut self, props: Value) -> Self {
        self.props = Some(props);
        self
    }

    pub fn with_state(mut self, state: Value) -> Self {
        self.state = Some(state);
        self
    }

    pub fn with_context(mut self, context: Value) -> Self {
        self.context = Some(context);
        self
    }

    pub fn with_updater(mut self, updater: Updater) -> Self {
        self.updater = Some(updater);
        self
    }

    pub fn with_public_instance(mut self, instance: Opaque) -> Self {
        self.public_instance = Some(instance);
        self
    }

    pub fn with_element_type(mut self, element_type: Opaque) -> Self {
        self.element_type = Some(element_type);
        self
    }
}

impl fmt::Debug for RawElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RawElement")
            .field("node_type", &self.node_type)
            .field("name", &self.name)
            .field("children", &self.children)
            .field("updater", &self.updater)
            .finish_non_exhaustive()
    }
}

/// Children once translated: never raw handles.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum Children {
    Text(String),
    Ids(Vec<ElementId>),
}

impl Children {
    pub fn ids(&self) -> &[ElementId] {
        match self {
            Self::Ids(ids) => ids,
            Self::Text(_) => &[],
        }
    }
}

/// Serializable part of a node snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ElementFields {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub node_type: Option<NodeType>,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    #[serde(default, rename = "ref", skip_serializing_if = "Option::is_none")]
    pub ref_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub props: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub children: Option<Children>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

/// Outbound `mount`/`update` payload: the snapshot minus everything that cannot cross the
/// bridge (updater closures, raw type reference, public instance).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ElementPayload {
    pub id: ElementId,
    #[serde(flatten)]
    pub fields: ElementFields,
    pub can_update: bool,
}

/// Last-known state of one mirrored node.
#[derive(Clone)]
pub struct ElementSnapshot {
    fields: ElementFields,
    updater: Option<Updater>,
    public_instance: Option<Opaque>,
    element_type: Option<Opaque>,
}

impl ElementSnapshot {
    /// Splits `raw` into its serializable fields and local-only capabilities. `resolve` maps
    /// each child handle to its identity.
    pub(crate) fn from_raw(raw: RawElement, mut resolve: impl FnMut(&Handle) -> ElementId) -> Self {
        let children = match raw.children {
            RawChildren::None => None,
            RawChildren::Text(text) => Some(Children::Text(text)),
            RawChildren::Handles(handles) => {
                Some(Children::Ids(handles.iter().map(&mut resolve).collect()))
            }
        };

        Self {
            fields: ElementFields {
                node_type: raw.node_type,
                name: raw.name,
                key: raw.key,
                ref_name: raw.ref_name,
                source: raw.source,
                props: raw.props,
                state: raw.state,
                context: raw.context,
                children,
                text: raw.text,
            },
            updater: raw.updater,
            public_instance: raw.public_instance,
            element_type: raw.element_type,
        }
    }

    pub fn fields(&self) -> &ElementFields {
        &self.fields
    }

    pub fn name(&self) -> &str {
        &self.fields.name
    }

    pub fn children(&self) -> Option<&Children> {
        self.fields.children.as_ref()
    }

    pub fn updater(&self) -> Option<&Updater> {
        self.updater.as_ref()
    }

    pub fn can_update(&self) -> bool {
        self.updater.as_ref().is_some_and(Updater::can_update)
    }

    pub fn public_instance(&self) -> Option<&Opaque> {
        self.public_instance.as_ref()
    }

    pub fn element_type(&self) -> Option<&Opaque> {
        self.element_type.as_ref()
    }

    pub fn payload(&self, id: &ElementId) -> ElementPayload {
        ElementPayload {
            id: id.clone(),
            fields: self.fields.clone(),
            can_update: self.can_update(),
        }
    }

    /// Looks up a nested value in the serializable fields, e.g. `["props", "style", "color"]`.
    pub fn value_at(&self, path: &[PathKey]) -> Option<Value> {
        let root = serde_json::to_value(&self.fields).ok()?;
        value_at(&root, path).cloned()
    }
}

impl fmt::Debug for ElementSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ElementSnapshot")
            .field("fields", &self.fields)
            .field("updater", &self.updater)
            .field("public_instance", &self.public_instance.is_some())
            .finish_non_exhaustive()
    }
}
