// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Nereid and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Core data model.
//!
//! Handles are the producer's opaque node references; everything that crosses the bridge is
//! expressed in terms of [`ElementId`]s and serializable [`ElementFields`].

pub mod capabilities;
pub mod element;
pub mod handle;
pub mod ids;

pub use capabilities::{Capabilities, CapabilityOverrides};
pub use element::{
    value_at, Children, ElementFields, ElementPayload, ElementSnapshot, ForceUpdate, NodeType,
    PathKey, PathSetter, RawChildren, RawElement, UpdateSlot, Updater,
};
pub use handle::{same_object, Handle, Opaque};
pub use ids::{ElementId, Id, IdError, RendererId};
