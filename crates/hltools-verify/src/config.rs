use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Directory and extension names used to lay out a game install.
///
/// Every field is optional in the JSON form and falls back to the stock
/// Half-Life layout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VerifierConfig {
    /// Fallback game directory searched after the mod.
    pub valve_dir: String,
    pub maps_dir: String,
    /// Prefix prepended to `ambient_generic` messages.
    pub sound_dir: String,
    pub model_extension: String,
    pub wad_extension: String,
    pub map_extension: String,
}

impl Default for VerifierConfig {
    fn default() -> Self {
        Self {
            valve_dir: "valve".to_string(),
            maps_dir: "maps".to_string(),
            sound_dir: "sound".to_string(),
            model_extension: ".mdl".to_string(),
            wad_extension: "wad".to_string(),
            map_extension: "bsp".to_string(),
        }
    }
}

impl VerifierConfig {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let bytes =
            std::fs::read(path).with_context(|| format!("read config {}", path.display()))?;
        serde_json::from_slice(&bytes).with_context(|| format!("parse config {}", path.display()))
    }
}
