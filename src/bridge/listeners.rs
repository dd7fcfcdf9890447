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

use smallvec::SmallVec;

pub(crate) type Listener<T> = Rc<dyn Fn(&T)>;

/// Ordered listener list with stable ids for removal.
pub(crate) struct ListenerTable<T> {
    next_id: u64,
    entries: Vec<(u64, Listener<T>)>,
}

impl<T> Default for ListenerTable<T> {
    fn default() -> Self {
        Self { next_id: 0, entries: Vec::new() }
    }
}

impl<T> ListenerTable<T> {
    pub(crate) fn add(&mut self, listener: Listener<T>) -> u64 {
        let id = self.next_id;
        self.next_id = self.next_id.wrapping_add(1);
        self.entries.push((id, listener));
        id
    }

    pub(crate) fn remove(&mut self, id: u64) -> bool {
        let before = self.entries.len();
        self.entries.retain(|(entry_id, _)| *entry_id != id);
        self.entries.len() != before
    }

    /// Copies the current listeners out so callers can invoke them without holding a borrow;
    /// listeners are free to subscribe or unsubscribe while being called.
    pub(crate) fn snapshot(&self) -> SmallVec<[Listener<T>; 4]> {
        self.entries.iter().map(|(_, listener)| Rc::clone(listener)).collect()
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Handle returned by every `subscribe`/`on` call.
///
/// Dropping it leaves the listener registered; call [`Subscription::unsubscribe`] to remove it.
pub struct Subscription {
    cancel: Option<Box<dyn FnOnce()>>,
}

impl Subscription {
    pub(crate) fn new(cancel: impl FnOnce() + 'static) -> Self {
        Self { cancel: Some(Box::new(cancel)) }
    }

    pub fn unsubscribe(mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription").field("active", &self.cancel.is_some()).finish()
    }
}

/// Registers `listener` on a shared table and returns a subscription that removes it.
pub(crate) fn subscribe<T: 'static>(
    table: &Rc<RefCell<ListenerTable<T>>>,
    listener: Listener<T>,
) -> Subscription {
    let id = table.borrow_mut().add(listener);
    let table = Rc::downgrade(table);
    Subscription::new(move || {
        if let Some(table) = table.upgrade() {
            table.borrow_mut().remove(id);
        }
    })
}
