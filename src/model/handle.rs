// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Nereid and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::any::Any;
use std::fmt;
use std::rc::{Rc, Weak};

use super::ids::ElementId;

/// Opaque producer-owned object, compared by reference.
pub type Opaque = Rc<dyn Any>;

/// A reference to a live node in a producer's tree.
///
/// `Object` handles have no identity of their own beyond their address; the registry assigns
/// one. `Value` handles already are an identity and pass through unchanged.
#[derive(Clone)]
pub enum Handle {
    Object(Opaque),
    Value(ElementId),
}

impl Handle {
    pub fn object<T: Any>(value: Rc<T>) -> Self {
        Self::Object(value)
    }

    pub fn value(id: ElementId) -> Self {
        Self::Value(id)
    }

    pub fn is_object(&self) -> bool {
        matches!(self, Self::Object(_))
    }

    pub fn downcast<T: Any>(&self) -> Option<Rc<T>> {
        match self {
            Self::Object(object) => Rc::clone(object).downcast::<T>().ok(),
            Self::Value(_) => None,
        }
    }

    pub fn ptr_eq(&self, other: &Handle) -> bool {
        match (self, other) {
            (Self::Object(a), Self::Object(b)) => same_object(a, b),
            (Self::Value(a), Self::Value(b)) => a == b,
            _ => false,
        }
    }

    pub(crate) fn key(&self) -> Option<HandleKey> {
        match self {
            Self::Object(object) => Some(HandleKey::of(object)),
            Self::Value(_) => None,
        }
    }
}

impl fmt::Debug for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Object(object) => {
                write!(f, "Handle::Object({:p})", Rc::as_ptr(object) as *const ())
            }
            Self::Value(id) => write!(f, "Handle::Value({id})"),
        }
    }
}

impl From<ElementId> for Handle {
    fn from(id: ElementId) -> Self {
        Self::Value(id)
    }
}

/// Address of an object handle, usable as a map key.
///
/// Addresses can be reused once the producer drops the object, so a key is only meaningful
/// together with a live [`WeakHandle`] for the same allocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct HandleKey(usize);

impl HandleKey {
    pub(crate) fn of(object: &Opaque) -> Self {
        Self(Rc::as_ptr(object) as *const () as usize)
    }
}

/// Non-owning reference to an object handle.
#[derive(Clone)]
pub(crate) struct WeakHandle(Weak<dyn Any>);

impl WeakHandle {
    pub(crate) fn new(object: &Opaque) -> Self {
        Self(Rc::downgrade(object))
    }

    pub(crate) fn upgrade(&self) -> Option<Handle> {
        self.0.upgrade().map(Handle::Object)
    }

    pub(crate) fn is_live(&self) -> bool {
        self.0.strong_count() > 0
    }
}

/// Reference equality for opaque objects, ignoring vtable metadata.
pub fn same_object(a: &Opaque, b: &Opaque) -> bool {
    std::ptr::eq(Rc::as_ptr(a) as *const (), Rc::as_ptr(b) as *const ())
}
