use std::fmt;

/// How two asset references relate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathMatch {
    /// Same directory and same file name.
    Equal,
    /// Same file name in a different directory.
    EqualFile,
    NotEqual,
}

/// A file reduced to the part the engine cares about: its immediate parent
/// directory and its file name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AssetRef {
    pub dir: String,
    pub file: String,
}

fn is_separator(c: char) -> bool {
    c == '/' || c == '\\'
}

impl AssetRef {
    pub fn new(dir: impl Into<String>, file: &str) -> Self {
        Self {
            dir: dir.into(),
            file: file.trim_start_matches(is_separator).to_string(),
        }
    }

    /// Reduce a raw path (either separator) to its parent directory name and
    /// file name. A bare file name gets an empty directory.
    pub fn from_path(path: &str) -> Self {
        let mut parts = path.rsplit(is_separator);
        let file = parts.next().unwrap_or_default();
        let dir = parts.next().unwrap_or_default();
        Self::new(dir, file)
    }

    /// `dir/file`, or just `file` when there is no directory.
    pub fn relevant_path(&self) -> String {
        if self.dir.is_empty() {
            self.file.clone()
        } else {
            format!("{}/{}", self.dir, self.file)
        }
    }

    /// File names compare case-insensitively, directory names exactly.
    pub fn compare(&self, other: &AssetRef) -> PathMatch {
        if !self.file.eq_ignore_ascii_case(&other.file) {
            PathMatch::NotEqual
        } else if self.dir == other.dir {
            PathMatch::Equal
        } else {
            PathMatch::EqualFile
        }
    }
}

impl fmt::Display for AssetRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.relevant_path())
    }
}
