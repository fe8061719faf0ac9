//! Startup configuration for the mixer

use serde::{Deserialize, Serialize};

/// Startup configuration for the mixer
///
/// Volume levels run 0..=15; values above that are treated as full volume.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MixerConfig {
    /// Effect volume level
    pub sfx_volume: u8,
    /// Music volume level
    pub music_volume: u8,
    /// Effects that must never overlap themselves; always routed to slot 0
    pub exclusive_effects: Vec<u16>,
}

impl Default for MixerConfig {
    fn default() -> Self {
        Self {
            sfx_volume: 15,
            music_volume: 15,
            exclusive_effects: Vec::new(),
        }
    }
}
