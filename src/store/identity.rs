// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Nereid and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use smol_str::SmolStr;

use crate::model::handle::{HandleKey, WeakHandle};
use crate::model::{ElementId, Handle};

// Shared by every registry in the process so two agents never hand out the same token.
static NEXT_TOKEN: AtomicU64 = AtomicU64::new(1);

#[derive(Clone)]
struct Entry {
    handle: WeakHandle,
    id: ElementId,
}

/// Bidirectional handle <-> identity table.
///
/// Neither direction owns the handle: both sides hold weak references, and entries are only
/// removed through [`IdentityRegistry::forget`].
pub struct IdentityRegistry {
    prefix: SmolStr,
    ids_by_handle: HashMap<HandleKey, Entry>,
    handles_by_id: HashMap<ElementId, WeakHandle>,
}

impl IdentityRegistry {
    pub fn new(prefix: impl Into<SmolStr>) -> Self {
        Self { prefix: prefix.into(), ids_by_handle: HashMap::new(), handles_by_id: HashMap::new() }
    }

    /// Returns the identity for `handle`, allocating one on first sight.
    ///
    /// Value handles are already identities and are returned unchanged.
    pub fn identity_for(&mut self, handle: &Handle) -> ElementId {
        let object = match handle {
            Handle::Value(id) => return id.clone(),
            Handle::Object(object) => object,
        };

        if let Some(id) = self.lookup(handle) {
            return id;
        }

        let key = HandleKey::of(object);
        if let Some(stale) = self.ids_by_handle.remove(&key) {
            self.handles_by_id.remove(&stale.id);
        }

        let id = ElementId::from_counter(&self.prefix, NEXT_TOKEN.fetch_add(1, Ordering::Relaxed));
        let weak = WeakHandle::new(object);
        self.ids_by_handle.insert(key, Entry { handle: weak.clone(), id: id.clone() });
        self.handles_by_id.insert(id.clone(), weak);
        id
    }

    /// Like [`identity_for`](Self::identity_for) but never allocates.
    pub fn lookup(&self, handle: &Handle) -> Option<ElementId> {
        match handle {
            Handle::Value(id) => Some(id.clone()),
            Handle::Object(_) => {
                let entry = self.ids_by_handle.get(&handle.key()?)?;
                entry.handle.is_live().then(|| entry.id.clone())
            }
        }
    }

    /// Reverse lookup. `None` once forgotten or once the producer dropped the handle.
    pub fn handle_for(&self, id: &ElementId) -> Option<Handle> {
        self.handles_by_id.get(id)?.upgrade()
    }

    /// Drops the association for `handle` in both directions and returns the old identity.
    pub fn forget(&mut self, handle: &Handle) -> Option<ElementId> {
        let entry = self.ids_by_handle.remove(&handle.key()?)?;
        self.handles_by_id.remove(&entry.id);
        Some(entry.id)
    }

    pub fn len(&self) -> usize {
        self.ids_by_handle.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids_by_handle.is_empty()
    }
}

impl Default for IdentityRegistry {
    fn default() -> Self {
        Self::new(crate::config::DEFAULT_ID_PREFIX)
    }
}
