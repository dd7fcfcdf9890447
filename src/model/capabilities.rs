// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Nereid and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Feature flags answered once during the connection handshake.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Capabilities {
    /// The host can scroll a native node into view.
    pub scroll: bool,
    /// Native nodes are live, inspectable DOM-like elements.
    pub dom: bool,
    /// `changeTextContent` is honored.
    pub edit_text_content: bool,
}

/// Per-flag overrides merged over host-detected capabilities.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CapabilityOverrides {
    pub scroll: Option<bool>,
    pub dom: Option<bool>,
    pub edit_text_content: Option<bool>,
}

impl CapabilityOverrides {
    pub fn apply(self, detected: Capabilities) -> Capabilities {
        Capabilities {
            scroll: self.scroll.unwrap_or(detected.scroll),
            dom: self.dom.unwrap_or(detected.dom),
            edit_text_content: self.edit_text_content.unwrap_or(detected.edit_text_content),
        }
    }
}
