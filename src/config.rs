// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Nereid and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Agent and bridge settings.
//!
//! Defaults work for an embedded agent. `*_from_env` layers `NEREID_MIRROR_*` variables on top;
//! unparsable values are ignored rather than rejected.

use std::str::FromStr;

use smol_str::SmolStr;

use crate::model::CapabilityOverrides;

pub const DEFAULT_ID_PREFIX: &str = "r";
pub const DEFAULT_MAX_BATCH: usize = 64;

pub const ENV_ID_PREFIX: &str = "NEREID_MIRROR_ID_PREFIX";
pub const ENV_BATCH: &str = "NEREID_MIRROR_BATCH";
pub const ENV_MAX_BATCH: &str = "NEREID_MIRROR_MAX_BATCH";
pub const ENV_EDIT_TEXT_CONTENT: &str = "NEREID_MIRROR_EDIT_TEXT_CONTENT";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentConfig {
    /// Prefix for allocated identities.
    pub id_prefix: SmolStr,
    /// Merged over host-detected capabilities once, at agent construction.
    pub capabilities: CapabilityOverrides,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self { id_prefix: SmolStr::new_static(DEFAULT_ID_PREFIX), capabilities: Default::default() }
    }
}

impl AgentConfig {
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Some(prefix) = env_string(ENV_ID_PREFIX) {
            config.id_prefix = SmolStr::from(prefix);
        }
        config.capabilities.edit_text_content = env_parse::<bool>(ENV_EDIT_TEXT_CONTENT);
        config
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BridgeConfig {
    /// Queue outbound events and deliver them as one `many` envelope per flush.
    pub batch: bool,
    /// A batching bridge flushes on its own once this many events are queued.
    pub max_batch: usize,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self { batch: false, max_batch: DEFAULT_MAX_BATCH }
    }
}

impl BridgeConfig {
    pub fn batched() -> Self {
        Self { batch: true, ..Self::default() }
    }

    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            batch: env_parse(ENV_BATCH).unwrap_or(defaults.batch),
            max_batch: env_parse::<usize>(ENV_MAX_BATCH)
                .filter(|n| *n > 0)
                .unwrap_or(defaults.max_batch),
        }
    }
}

fn env_string(name: &str) -> Option<String> {
    std::env::var(name).ok().map(|raw| raw.trim().to_owned()).filter(|raw| !raw.is_empty())
}

fn env_parse<T: FromStr>(name: &str) -> Option<T> {
    env_string(name).and_then(|raw| raw.parse::<T>().ok())
}
