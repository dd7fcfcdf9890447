// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Nereid and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Mirror-side state keyed by identity.
//!
//! The registry maps producer handles to identities; the element store keeps the last snapshot
//! for each identity. Both are mutated only from the agent's event-processing thread.

pub mod elements;
pub mod identity;

pub use elements::ElementStore;
pub use identity::IdentityRegistry;
