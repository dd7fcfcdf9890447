// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Nereid and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Nereid Mirror: an inspector agent that mirrors a live tree of opaque node handles to a remote
//! UI over a named-event bridge.
//!
//! Renderers report mounts, updates and unmounts to an [`agent::Agent`]. The agent gives every
//! handle a stable string identity, keeps the last snapshot per identity, and forwards
//! serializable payloads through a [`bridge::Bridge`]. Commands from the remote UI come back
//! through the same bridge and are routed to the renderer that owns the target node.

pub mod agent;
pub mod bridge;
pub mod config;
pub mod model;
pub mod store;

pub use agent::{Agent, AgentEvent};
pub use bridge::{Bridge, Envelope, Wall};
pub use model::{ElementId, Handle, RawElement, RendererId};
