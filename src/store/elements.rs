// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Nereid and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::collections::{BTreeSet, HashMap};

use super::identity::IdentityRegistry;
use crate::model::{ElementId, ElementSnapshot, RawElement, RendererId};

/// Last-known snapshot per identity, plus root membership and renderer attribution.
#[derive(Debug, Default)]
pub struct ElementStore {
    snapshots: HashMap<ElementId, ElementSnapshot>,
    roots: BTreeSet<ElementId>,
    renderers: HashMap<ElementId, RendererId>,
}

impl ElementStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `raw` under `id`, translating child handles through `registry` first.
    pub fn put(
        &mut self,
        id: ElementId,
        raw: RawElement,
        registry: &mut IdentityRegistry,
    ) -> &ElementSnapshot {
        let snapshot = ElementSnapshot::from_raw(raw, |child| registry.identity_for(child));
        self.snapshots.insert(id.clone(), snapshot);
        &self.snapshots[&id]
    }

    pub fn get(&self, id: &ElementId) -> Option<&ElementSnapshot> {
        self.snapshots.get(id)
    }

    pub fn contains(&self, id: &ElementId) -> bool {
        self.snapshots.contains_key(id)
    }

    pub fn delete(&mut self, id: &ElementId) -> Option<ElementSnapshot> {
        self.snapshots.remove(id)
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    pub fn add_root(&mut self, id: ElementId) -> bool {
        self.roots.insert(id)
    }

    /// Removing a non-member is a no-op that returns `false`.
    pub fn remove_root(&mut self, id: &ElementId) -> bool {
        self.roots.remove(id)
    }

    pub fn is_root(&self, id: &ElementId) -> bool {
        self.roots.contains(id)
    }

    pub fn roots(&self) -> impl Iterator<Item = &ElementId> + '_ {
        self.roots.iter()
    }

    pub fn set_renderer(&mut self, id: ElementId, renderer: RendererId) {
        self.renderers.insert(id, renderer);
    }

    pub fn renderer_of(&self, id: &ElementId) -> Option<&RendererId> {
        self.renderers.get(id)
    }

    pub fn remove_renderer(&mut self, id: &ElementId) -> Option<RendererId> {
        self.renderers.remove(id)
    }
}
