//! Map dependency verification.

use hltools_core::error::Error;
use hltools_core::report::{push_unique, ArchiveFailure, LumpFailure, VerificationReport};
use hltools_format::{BspFile, EntityParser, EntityRecord, EntityTable, MipTexture, WadFile};
use log::{debug, info, warn};
use std::collections::HashSet;
use std::io::{Read, Seek};
use std::path::Path;

use crate::asset::{AssetRef, PathMatch};
use crate::config::VerifierConfig;
use crate::fs::{DiskFs, GameFs};

/// Result of verifying one map in a batch.
#[derive(Debug)]
pub struct MapOutcome {
    pub map: String,
    pub result: Result<VerificationReport, Error>,
}

pub struct Verifier<F = DiskFs> {
    fs: F,
    mod_dir: String,
    config: VerifierConfig,
}

impl Verifier<DiskFs> {
    /// Verifier over `base` on disk for the mod in `base/<mod_dir>`.
    pub fn on_disk(base: &Path, mod_dir: &str, config: VerifierConfig) -> Self {
        Self::new(DiskFs::with_config(base, &config), mod_dir, config)
    }
}

impl<F: GameFs> Verifier<F> {
    pub fn new(fs: F, mod_dir: impl Into<String>, config: VerifierConfig) -> Self {
        Self {
            fs,
            mod_dir: mod_dir.into(),
            config,
        }
    }

    pub fn mod_dir(&self) -> &str {
        &self.mod_dir
    }

    pub fn config(&self) -> &VerifierConfig {
        &self.config
    }

    /// Game directories searched for assets: the mod, then the fallback.
    fn search_dirs(&self) -> Vec<&str> {
        let mut dirs = vec![self.mod_dir.as_str()];
        if self.mod_dir != self.config.valve_dir {
            dirs.push(self.config.valve_dir.as_str());
        }
        dirs
    }

    /// Archives that could satisfy a map's `wad` references.
    pub fn candidates(&self) -> Result<Vec<AssetRef>, Error> {
        let mut out = Vec::new();
        for dir in self.search_dirs() {
            let names = self.fs.list_wads(dir)?;
            if names.is_empty() {
                info!("no texture archives in {}", self.fs.path(dir, "").display());
            }
            out.extend(names.iter().map(|name| AssetRef::new(dir, name)));
        }
        Ok(out)
    }

    /// Map path relative to the mod directory; the map extension is added
    /// when `name` has none.
    pub fn map_path(&self, name: &str) -> String {
        let has_extension = Path::new(name).extension().is_some();
        if has_extension {
            format!("{}/{}", self.config.maps_dir, name)
        } else {
            format!(
                "{}/{}.{}",
                self.config.maps_dir, name, self.config.map_extension
            )
        }
    }

    /// Verify one map from the mod's maps directory.
    ///
    /// Only a missing map or an unreadable lump directory is an error; every
    /// other problem is recorded in the report.
    pub fn verify(&self, map: &str) -> Result<VerificationReport, Error> {
        let candidates = self.candidates()?;
        let rel = self.map_path(map);
        if !self.fs.exists(&self.mod_dir, &rel) {
            return Err(Error::MapNotFound {
                path: self.fs.path(&self.mod_dir, &rel),
            });
        }
        info!("verifying {}", self.fs.path(&self.mod_dir, &rel).display());

        let mut report = VerificationReport::new(rel.clone());
        let mut bsp = BspFile::new(self.fs.open(&self.mod_dir, &rel)?)?;
        bsp.load_directory()?;

        match required_textures(&mut bsp) {
            Ok(names) => report.required_textures = names,
            Err(err) => report.lump_failures.push(LumpFailure {
                lump: "textures".to_string(),
                error: err.to_string(),
            }),
        }

        let text = match bsp.read_entity_text() {
            Ok(text) => text,
            Err(err) => {
                report.lump_failures.push(LumpFailure {
                    lump: "entities".to_string(),
                    error: err.to_string(),
                });
                String::new()
            }
        };
        let (table, errors) = EntityTable::parse_lenient(&text);
        report.entity_errors = errors.iter().map(ToString::to_string).collect();

        let Some(worldspawn) = table.first("worldspawn") else {
            warn!("{rel} has no worldspawn entity");
            return Ok(report);
        };
        report.has_worldspawn = true;
        report.skyname = worldspawn.get("skyname").map(str::to_string);

        let resolved = self.resolve_wads(worldspawn, &candidates, &mut report);
        let available = self.archive_names(&resolved, &mut report);
        for name in &report.required_textures {
            if !available.contains(&name.to_ascii_lowercase()) {
                push_unique(&mut report.missing_textures, name);
            }
        }

        self.check_assets(&text, &mut report);
        report.collect_unions();
        debug!(
            "{rel}: {} missing textures, {} missing assets, penalty {}",
            report.missing_textures.len(),
            report.missing.len(),
            report.penalty()
        );
        Ok(report)
    }

    /// Verify every map in the mod's maps directory, in name order. A map
    /// that fails does not stop the rest.
    pub fn verify_all(&self) -> Result<Vec<MapOutcome>, Error> {
        let dir = format!("{}/{}", self.mod_dir, self.config.maps_dir);
        let maps = self.fs.list_maps(&dir)?;
        Ok(maps
            .into_iter()
            .map(|map| {
                let result = self.verify(&map);
                if let Err(err) = &result {
                    warn!("{map}: {err}");
                }
                MapOutcome { map, result }
            })
            .collect())
    }

    /// Match each `wad` reference against the candidate archives and record
    /// malformed, misnamed and missing references.
    fn resolve_wads(
        &self,
        worldspawn: &EntityRecord,
        candidates: &[AssetRef],
        report: &mut VerificationReport,
    ) -> Vec<AssetRef> {
        let references = worldspawn
            .get("wad")
            .unwrap_or_default()
            .split(';')
            .filter(|s| !s.is_empty());

        let mut resolved: Vec<AssetRef> = Vec::new();
        for reference in references {
            push_unique(&mut report.wad_references, reference);
            let wanted = AssetRef::from_path(reference);
            let normalized = reference.replace('\\', "/");
            if wanted.dir.is_empty() || normalized != wanted.relevant_path() {
                push_unique(&mut report.malformed_wad_files, reference);
            }
            let found = if wanted.dir.is_empty() {
                self.find_bare_archive(&wanted, candidates)
            } else {
                find_archive(&wanted, candidates)
            };
            match found {
                Some((found, kind)) => {
                    if kind == PathMatch::EqualFile {
                        push_unique(&mut report.misnamed_mod_dirs, reference);
                    }
                    debug!("{reference} resolved to {found}");
                    if !resolved.contains(found) {
                        resolved.push(found.clone());
                    }
                }
                None => push_unique(&mut report.not_existing_files, reference),
            }
        }
        resolved
    }

    /// Archive for a reference without a directory: the mod's copy first,
    /// then the fallback's. Only a fallback hit outside the fallback mod
    /// counts as a misnamed directory.
    fn find_bare_archive<'a>(
        &self,
        wanted: &AssetRef,
        candidates: &'a [AssetRef],
    ) -> Option<(&'a AssetRef, PathMatch)> {
        self.search_dirs().into_iter().find_map(|dir| {
            let found = candidates
                .iter()
                .find(|c| c.dir == dir && c.file.eq_ignore_ascii_case(&wanted.file))?;
            let kind = if dir == self.mod_dir {
                PathMatch::Equal
            } else {
                PathMatch::EqualFile
            };
            Some((found, kind))
        })
    }

    /// Case-folded entry names across all resolved archives.
    fn archive_names(
        &self,
        archives: &[AssetRef],
        report: &mut VerificationReport,
    ) -> HashSet<String> {
        let mut names = HashSet::new();
        for archive in archives {
            let label = archive.relevant_path();
            let result = self
                .fs
                .open(&archive.dir, &archive.file)
                .and_then(WadFile::new)
                .and_then(|mut wad| {
                    if !wad.magic_ok() {
                        push_unique(&mut report.bad_magic_archives, &label);
                    }
                    wad.load_entries()?;
                    names.extend(wad.names().map(str::to_ascii_lowercase));
                    Ok(())
                });
            if let Err(err) = result {
                warn!("cannot read archive {label}: {err}");
                report.archive_failures.push(ArchiveFailure {
                    path: label,
                    error: err.to_string(),
                });
            }
        }
        names
    }

    /// Collect sprites, sounds and models referenced by entities and check
    /// each against the mod and fallback directories.
    fn check_assets(&self, text: &str, report: &mut VerificationReport) {
        for record in EntityParser::new(text).records().filter_map(Result::ok) {
            let class = record.classname().unwrap_or_default();
            if class == "env_sprite" {
                if let Some(model) = record.get("model") {
                    push_unique(&mut report.used_sprites, model);
                }
            }
            if class == "ambient_generic" {
                if let Some(message) = record.get("message") {
                    let path = format!("{}/{}", self.config.sound_dir, message);
                    push_unique(&mut report.used_sounds, &path);
                }
            }
            if let Some(model) = record.get("model") {
                if model.ends_with(&self.config.model_extension) {
                    push_unique(&mut report.used_models, model);
                }
            }
        }

        let missing = |used: &[String]| -> Vec<String> {
            used.iter()
                .filter(|path| !self.asset_exists(path))
                .cloned()
                .collect()
        };
        report.missing_sprites = missing(&report.used_sprites);
        report.missing_sounds = missing(&report.used_sounds);
        report.missing_models = missing(&report.used_models);
    }

    fn asset_exists(&self, path: &str) -> bool {
        self.search_dirs()
            .into_iter()
            .any(|dir| self.fs.exists(dir, path))
    }
}

/// An exact match wins outright; otherwise the first candidate with the same
/// file name in another directory.
fn find_archive<'a>(
    wanted: &AssetRef,
    candidates: &'a [AssetRef],
) -> Option<(&'a AssetRef, PathMatch)> {
    let mut fallback = None;
    for candidate in candidates {
        match candidate.compare(wanted) {
            PathMatch::Equal => return Some((candidate, PathMatch::Equal)),
            PathMatch::EqualFile => {
                fallback.get_or_insert((candidate, PathMatch::EqualFile));
            }
            PathMatch::NotEqual => {}
        }
    }
    fallback
}

/// Names of textures the map expects to find in an archive.
fn required_textures<R: Read + Seek>(bsp: &mut BspFile<R>) -> Result<Vec<String>, Error> {
    bsp.load_texture_offsets()?;
    let mut names = Vec::new();
    bsp.for_each_texture(Some(&mut |texture: MipTexture| {
        if texture.is_external() {
            push_unique(&mut names, &texture.name);
        }
    }))?;
    Ok(names)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{map_bytes, wad_bytes, write};
    use tempfile::TempDir;

    fn verifier(dir: &TempDir, mod_dir: &str) -> Verifier {
        Verifier::on_disk(dir.path(), mod_dir, VerifierConfig::default())
    }

    #[test]
    fn reports_malformed_and_missing_archives() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "valve/halflife.wad", &wad_bytes(&["BRICK1"]));
        write(
            dir.path(),
            "cstrike/maps/de_test.bsp",
            &map_bytes(
                r#"{"classname" "worldspawn" "wad" "/valve/halflife.wad;/cstrike/xeno.wad" "skyname" "desert"}"#,
                &[("brick1", true), ("XENO1", true), ("embedded", false)],
            ),
        );

        let report = verifier(&dir, "cstrike").verify("de_test.bsp").unwrap();
        assert!(report.has_worldspawn);
        assert_eq!(report.skyname.as_deref(), Some("desert"));
        assert_eq!(report.not_existing_files, vec!["/cstrike/xeno.wad"]);
        assert_eq!(
            report.malformed_wad_files,
            vec!["/valve/halflife.wad", "/cstrike/xeno.wad"]
        );
        assert!(report.misnamed_mod_dirs.is_empty());
        assert_eq!(report.required_textures, vec!["brick1", "XENO1"]);
        assert_eq!(report.missing_textures, vec!["XENO1"]);
        assert!(!report.server_capable());
        assert_eq!(report.penalty(), 2 + 4);
    }

    #[test]
    fn archive_in_wrong_directory_is_misnamed() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "valve/decals.wad", &wad_bytes(&["WALL"]));
        write(
            dir.path(),
            "mymod/maps/a.bsp",
            &map_bytes(
                r#"{"classname" "worldspawn" "wad" "mymod/decals.wad"}"#,
                &[("wall", true)],
            ),
        );

        let report = verifier(&dir, "mymod").verify("a").unwrap();
        assert_eq!(report.map, "maps/a.bsp");
        assert_eq!(report.misnamed_mod_dirs, vec!["mymod/decals.wad"]);
        assert!(report.malformed_wad_files.is_empty());
        assert!(report.missing_textures.is_empty());
        assert!(report.server_capable());
    }

    #[test]
    fn bare_archive_name_is_malformed_and_resolved_by_file() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "valve/decals.wad", &wad_bytes(&["WALL"]));
        let map = map_bytes(
            r#"{"classname" "worldspawn" "wad" "decals.wad"}"#,
            &[("wall", true)],
        );
        write(dir.path(), "valve/maps/a.bsp", &map);
        write(dir.path(), "mymod/maps/a.bsp", &map);

        let report = verifier(&dir, "valve").verify("a").unwrap();
        assert_eq!(report.malformed_wad_files, vec!["decals.wad"]);
        assert!(report.misnamed_mod_dirs.is_empty());
        assert!(report.not_existing_files.is_empty());
        assert!(report.missing_textures.is_empty());
        assert_eq!(report.penalty(), 1);

        let report = verifier(&dir, "mymod").verify("a").unwrap();
        assert_eq!(report.malformed_wad_files, vec!["decals.wad"]);
        assert_eq!(report.misnamed_mod_dirs, vec!["decals.wad"]);
        assert!(report.missing_textures.is_empty());
        assert_eq!(report.penalty(), 1 + 2);

        write(dir.path(), "mymod/decals.wad", &wad_bytes(&["WALL"]));
        let report = verifier(&dir, "mymod").verify("a").unwrap();
        assert!(report.misnamed_mod_dirs.is_empty());
        assert_eq!(report.penalty(), 1);
    }

    #[test]
    fn resolves_assets_through_mod_then_valve() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "valve/sprites/glow.spr", b"s");
        write(dir.path(), "mymod/sound/ambience/wind.wav", b"w");
        write(dir.path(), "mymod/models/crate.mdl", b"m");
        write(
            dir.path(),
            "mymod/maps/b.bsp",
            &map_bytes(
                concat!(
                    r#"{"classname" "worldspawn"}"#,
                    r#"{"classname" "env_sprite" "model" "sprites/glow.spr"}"#,
                    r#"{"classname" "env_sprite" "model" "sprites/gone.spr"}"#,
                    r#"{"classname" "ambient_generic" "message" "ambience/wind.wav"}"#,
                    r#"{"classname" "ambient_generic" "message" "ambience/rain.wav"}"#,
                    r#"{"classname" "cycler" "model" "/models/crate.mdl"}"#,
                    r#"{"classname" "monster_x" "model" "models/x.mdl"}"#,
                    r#"{"classname" "func_wall" "model" "*1"}"#,
                ),
                &[],
            ),
        );

        let report = verifier(&dir, "mymod").verify("b.bsp").unwrap();
        assert_eq!(report.used_sprites, vec!["sprites/glow.spr", "sprites/gone.spr"]);
        assert_eq!(report.missing_sprites, vec!["sprites/gone.spr"]);
        assert_eq!(
            report.used_sounds,
            vec!["sound/ambience/wind.wav", "sound/ambience/rain.wav"]
        );
        assert_eq!(report.missing_sounds, vec!["sound/ambience/rain.wav"]);
        assert_eq!(report.used_models, vec!["/models/crate.mdl", "models/x.mdl"]);
        assert_eq!(report.missing_models, vec!["models/x.mdl"]);
        assert_eq!(
            report.missing,
            vec!["models/x.mdl", "sound/ambience/rain.wav", "sprites/gone.spr"]
        );
        assert!(report.server_capable());
        assert!(!report.client_capable());
    }

    #[test]
    fn missing_map_fails_before_decoding() {
        let dir = tempfile::tempdir().unwrap();
        let err = verifier(&dir, "cstrike").verify("nope").unwrap_err();
        match err {
            Error::MapNotFound { path } => assert!(path.ends_with("cstrike/maps/nope.bsp")),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn truncated_map_is_malformed() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "valve/maps/short.bsp", &[30, 0, 0, 0, 1, 2]);
        let err = verifier(&dir, "valve").verify("short").unwrap_err();
        assert!(matches!(
            err,
            Error::Format(hltools_core::error::FormatError::MalformedContainer { .. })
        ));
    }

    #[test]
    fn map_without_worldspawn_is_an_empty_report() {
        let dir = tempfile::tempdir().unwrap();
        write(
            dir.path(),
            "valve/maps/c.bsp",
            &map_bytes(r#"{"classname" "info_player_start"}"#, &[]),
        );
        let report = verifier(&dir, "valve").verify("c").unwrap();
        assert!(!report.has_worldspawn);
        assert!(report.wad_references.is_empty());
        assert!(report.client_capable());
    }

    #[test]
    fn unreadable_archive_is_recorded() {
        let dir = tempfile::tempdir().unwrap();
        let mut broken = wad_bytes(&["A"]);
        broken[4] = 9;
        write(dir.path(), "valve/broken.wad", &broken);
        let mut odd = wad_bytes(&["B"]);
        odd[3] = b'2';
        write(dir.path(), "valve/odd.wad", &odd);
        write(
            dir.path(),
            "valve/maps/d.bsp",
            &map_bytes(
                r#"{"classname" "worldspawn" "wad" "valve/broken.wad;valve/odd.wad"}"#,
                &[("a", true), ("b", true)],
            ),
        );

        let report = verifier(&dir, "valve").verify("d").unwrap();
        assert_eq!(report.archive_failures.len(), 1);
        assert_eq!(report.archive_failures[0].path, "valve/broken.wad");
        assert_eq!(report.bad_magic_archives, vec!["valve/odd.wad"]);
        assert_eq!(report.missing_textures, vec!["a"]);
    }

    #[test]
    fn conflicting_entity_is_reported_and_skipped() {
        let dir = tempfile::tempdir().unwrap();
        write(
            dir.path(),
            "valve/maps/e.bsp",
            &map_bytes(
                concat!(
                    r#"{"classname" "cycler" "model" "models/a.mdl" "model" "models/b.mdl"}"#,
                    r#"{"classname" "worldspawn"}"#,
                ),
                &[],
            ),
        );
        let report = verifier(&dir, "valve").verify("e").unwrap();
        assert!(report.has_worldspawn);
        assert_eq!(report.entity_errors.len(), 1);
        assert!(report.used_models.is_empty());
    }

    #[test]
    fn verify_all_keeps_going_after_a_failure() {
        let dir = tempfile::tempdir().unwrap();
        write(
            dir.path(),
            "valve/maps/good.bsp",
            &map_bytes(r#"{"classname" "worldspawn"}"#, &[]),
        );
        write(dir.path(), "valve/maps/bad.bsp", b"xx");

        let outcomes = verifier(&dir, "valve").verify_all().unwrap();
        let maps: Vec<_> = outcomes.iter().map(|o| o.map.as_str()).collect();
        assert_eq!(maps, vec!["bad.bsp", "good.bsp"]);
        assert!(outcomes[0].result.is_err());
        assert!(outcomes[1].result.as_ref().unwrap().has_worldspawn);
    }

    #[test]
    fn candidates_list_mod_before_valve_once() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "valve/b.wad", &wad_bytes(&[]));
        write(dir.path(), "mymod/a.wad", &wad_bytes(&[]));
        let names: Vec<_> = verifier(&dir, "mymod")
            .candidates()
            .unwrap()
            .iter()
            .map(AssetRef::relevant_path)
            .collect();
        assert_eq!(names, vec!["mymod/a.wad", "valve/b.wad"]);
        assert_eq!(verifier(&dir, "valve").candidates().unwrap().len(), 1);
    }
}
