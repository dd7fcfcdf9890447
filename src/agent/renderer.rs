// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Nereid and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::fmt;
use std::rc::Rc;

use smallvec::SmallVec;

use super::host::NativeRef;
use crate::model::{Handle, RendererId};

/// A producer's lookup failed for a reason other than "not mine".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookupError {
    message: String,
}

impl LookupError {
    pub fn new(message: impl Into<String>) -> Self {
        Self { message: message.into() }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for LookupError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "renderer lookup failed: {}", self.message)
    }
}

impl std::error::Error for LookupError {}

pub type NativeFromHandle = Rc<dyn Fn(&Handle) -> Result<Option<NativeRef>, LookupError>>;
pub type HandleFromNative = Rc<dyn Fn(&NativeRef) -> Result<Option<Handle>, LookupError>>;

/// Lookup capabilities a renderer registers with the agent. Both are optional.
#[derive(Clone, Default)]
pub struct RendererInterface {
    pub native_from_handle: Option<NativeFromHandle>,
    pub handle_from_native: Option<HandleFromNative>,
}

impl RendererInterface {
    pub fn with_native_from_handle(
        mut self,
        lookup: impl Fn(&Handle) -> Result<Option<NativeRef>, LookupError> + 'static,
    ) -> Self {
        self.native_from_handle = Some(Rc::new(lookup));
        self
    }

    pub fn with_handle_from_native(
        mut self,
        lookup: impl Fn(&NativeRef) -> Result<Option<Handle>, LookupError> + 'static,
    ) -> Self {
        self.handle_from_native = Some(Rc::new(lookup));
        self
    }
}

impl fmt::Debug for RendererInterface {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RendererInterface")
            .field("native_from_handle", &self.native_from_handle.is_some())
            .field("handle_from_native", &self.handle_from_native.is_some())
            .finish()
    }
}

/// Registered renderers in registration order.
#[derive(Debug, Default)]
pub(crate) struct Renderers {
    entries: Vec<(RendererId, RendererInterface)>,
}

impl Renderers {
    /// Re-registering an id replaces its interface but keeps its position.
    pub(crate) fn register(&mut self, id: RendererId, interface: RendererInterface) {
        match self.entries.iter_mut().find(|(existing, _)| *existing == id) {
            Some((_, slot)) => *slot = interface,
            None => self.entries.push((id, interface)),
        }
    }

    pub(crate) fn get(&self, id: &RendererId) -> Option<&RendererInterface> {
        self.entries.iter().find(|(existing, _)| existing == id).map(|(_, interface)| interface)
    }

    /// Native lookups with `preferred` first, then the rest in registration order.
    pub(crate) fn native_lookups(
        &self,
        preferred: Option<&RendererId>,
    ) -> SmallVec<[(RendererId, NativeFromHandle); 2]> {
        let mut lookups = SmallVec::new();
        let preferred = preferred.and_then(|id| self.get(id).map(|interface| (id, interface)));
        if let Some((id, interface)) = preferred {
            if let Some(lookup) = interface.native_from_handle.clone() {
                lookups.push((id.clone(), lookup));
            }
        }
        for (id, interface) in &self.entries {
            if preferred.is_some_and(|(owner, _)| owner == id) {
                continue;
            }
            if let Some(lookup) = interface.native_from_handle.clone() {
                lookups.push((id.clone(), lookup));
            }
        }
        lookups
    }

    pub(crate) fn handle_lookups(&self) -> Vec<(RendererId, HandleFromNative)> {
        self.entries
            .iter()
            .filter_map(|(id, interface)| {
                interface.handle_from_native.clone().map(|lookup| (id.clone(), lookup))
            })
            .collect()
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }
}
