//! Access to a game install, addressed as (game directory, relative path).

use hltools_core::error::Error;
use hltools_format::{map_file, MappedReader};
use log::debug;
use std::io::{self, Read, Seek};
use std::path::{Path, PathBuf};

use crate::config::VerifierConfig;

pub trait GameFs {
    type Reader: Read + Seek;

    /// Location of `rel` inside game directory `dir`, for messages.
    fn path(&self, dir: &str, rel: &str) -> PathBuf;

    /// Texture archive file names directly inside `dir`, sorted. A missing
    /// directory has no archives.
    fn list_wads(&self, dir: &str) -> Result<Vec<String>, Error>;

    /// Map file names directly inside `dir`, sorted. A missing directory has
    /// no maps.
    fn list_maps(&self, dir: &str) -> Result<Vec<String>, Error>;

    fn exists(&self, dir: &str, rel: &str) -> bool;

    fn open(&self, dir: &str, rel: &str) -> Result<Self::Reader, Error>;
}

/// [`GameFs`] over a directory on disk; files are memory-mapped.
#[derive(Debug, Clone)]
pub struct DiskFs {
    base: PathBuf,
    wad_extension: String,
    map_extension: String,
}

impl DiskFs {
    pub fn new(base: impl Into<PathBuf>) -> Self {
        Self::with_config(base, &VerifierConfig::default())
    }

    pub fn with_config(base: impl Into<PathBuf>, config: &VerifierConfig) -> Self {
        Self {
            base: base.into(),
            wad_extension: config.wad_extension.clone(),
            map_extension: config.map_extension.clone(),
        }
    }

    pub fn base(&self) -> &Path {
        &self.base
    }

    fn list_with_extension(&self, dir: &str, extension: &str) -> Result<Vec<String>, Error> {
        let path = self.base.join(dir);
        let read_dir = match std::fs::read_dir(&path) {
            Ok(rd) => rd,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                debug!("{} does not exist; nothing to list", path.display());
                return Ok(Vec::new());
            }
            Err(err) => return Err(err.into()),
        };
        let mut names = Vec::new();
        for entry in read_dir {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }
            let name = entry.file_name().to_string_lossy().into_owned();
            let matches = Path::new(&name)
                .extension()
                .is_some_and(|ext| ext.to_string_lossy().eq_ignore_ascii_case(extension));
            if matches {
                names.push(name);
            }
        }
        names.sort();
        Ok(names)
    }
}

/// Engine paths use either separator and may start with one.
fn normalize(rel: &str) -> String {
    rel.trim_start_matches(['/', '\\']).replace('\\', "/")
}

impl GameFs for DiskFs {
    type Reader = MappedReader;

    fn path(&self, dir: &str, rel: &str) -> PathBuf {
        self.base.join(dir).join(normalize(rel))
    }

    fn list_wads(&self, dir: &str) -> Result<Vec<String>, Error> {
        self.list_with_extension(dir, &self.wad_extension)
    }

    fn list_maps(&self, dir: &str) -> Result<Vec<String>, Error> {
        self.list_with_extension(dir, &self.map_extension)
    }

    fn exists(&self, dir: &str, rel: &str) -> bool {
        self.path(dir, rel).is_file()
    }

    fn open(&self, dir: &str, rel: &str) -> Result<Self::Reader, Error> {
        map_file(self.path(dir, rel))
    }
}
