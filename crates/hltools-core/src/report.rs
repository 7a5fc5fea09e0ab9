#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A lump that could not be decoded while verifying a map.
///
/// Lump failures are recorded instead of aborting the run; sibling lumps
/// are still decoded.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LumpFailure {
    pub lump: String,
    pub error: String,
}

/// A resolved texture archive whose directory could not be read.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveFailure {
    pub path: String,
    pub error: String,
}

/// The categorized outcome of verifying one map against a mod layout.
///
/// Every list is ordered by first occurrence and holds no duplicates, except
/// `used` and `missing`, which are sorted unions of the per-kind lists.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VerificationReport {
    /// Map path relative to the mod directory.
    pub map: String,
    #[cfg_attr(feature = "serde", serde(default))]
    pub skyname: Option<String>,
    pub has_worldspawn: bool,
    /// Raw `wad` references from worldspawn, in declaration order.
    pub wad_references: Vec<String>,
    /// Names of textures stored outside the map (all mip offsets zero).
    pub required_textures: Vec<String>,

    pub malformed_wad_files: Vec<String>,
    pub misnamed_mod_dirs: Vec<String>,
    pub not_existing_files: Vec<String>,
    pub missing_textures: Vec<String>,

    pub used_sprites: Vec<String>,
    pub missing_sprites: Vec<String>,
    pub used_sounds: Vec<String>,
    pub missing_sounds: Vec<String>,
    pub used_models: Vec<String>,
    pub missing_models: Vec<String>,

    pub used: Vec<String>,
    pub missing: Vec<String>,

    pub lump_failures: Vec<LumpFailure>,
    pub archive_failures: Vec<ArchiveFailure>,
    pub entity_errors: Vec<String>,
    pub bad_magic_archives: Vec<String>,
}

impl VerificationReport {
    pub fn new(map: impl Into<String>) -> Self {
        Self {
            map: map.into(),
            ..Self::default()
        }
    }

    /// A server can run the map when no texture is missing.
    pub fn server_capable(&self) -> bool {
        self.missing_textures.is_empty()
    }

    /// A client additionally needs every sprite, sound and model.
    pub fn client_capable(&self) -> bool {
        self.server_capable()
            && self.missing_sprites.is_empty()
            && self.missing_sounds.is_empty()
            && self.missing_models.is_empty()
    }

    /// Weighted count of wad reference problems: 1 per malformed reference,
    /// 2 per misnamed mod directory, 4 per archive that does not exist.
    pub fn penalty(&self) -> usize {
        self.malformed_wad_files.len()
            + 2 * self.misnamed_mod_dirs.len()
            + 4 * self.not_existing_files.len()
    }

    /// Rebuild the sorted `used` and `missing` unions from the per-kind lists.
    pub fn collect_unions(&mut self) {
        self.used = sorted_union(&[&self.used_sprites, &self.used_sounds, &self.used_models]);
        self.missing = sorted_union(&[
            &self.missing_sprites,
            &self.missing_sounds,
            &self.missing_models,
        ]);
    }
}

/// Append `value` unless an equal string is already present.
pub fn push_unique(list: &mut Vec<String>, value: &str) {
    if !list.iter().any(|v| v == value) {
        list.push(value.to_string());
    }
}

fn sorted_union(lists: &[&Vec<String>]) -> Vec<String> {
    let mut out: Vec<String> = lists.iter().flat_map(|l| l.iter().cloned()).collect();
    out.sort();
    out.dedup();
    out
}
