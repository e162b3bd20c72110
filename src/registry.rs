//! The set of source files known to one report run.
//!
//! Exactly one [`SourceFile`] exists per canonical path. Tracefiles and the
//! baseline file all resolve into the same registry, and files keep the order
//! in which they were first registered.

use std::collections::HashMap;
use std::path::{Component, Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;

use crate::model::{Counts, SourceFile};

static SEPARATORS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"/+").unwrap());
static DRIVE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[A-Za-z]:").unwrap());

#[derive(Debug, Default)]
pub struct Registry {
    files: Vec<SourceFile>,
    index: HashMap<PathBuf, usize>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.files.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Position of the file registered under `path`.
    #[must_use]
    pub fn position(&self, path: &Path) -> Option<usize> {
        self.index.get(path).copied()
    }

    #[must_use]
    pub fn get(&self, path: &Path) -> Option<&SourceFile> {
        self.position(path).map(|idx| &self.files[idx])
    }

    pub fn get_mut(&mut self, path: &Path) -> Option<&mut SourceFile> {
        let idx = self.position(path)?;
        Some(&mut self.files[idx])
    }

    #[must_use]
    pub fn get_index(&self, idx: usize) -> Option<&SourceFile> {
        self.files.get(idx)
    }

    pub fn get_index_mut(&mut self, idx: usize) -> Option<&mut SourceFile> {
        self.files.get_mut(idx)
    }

    /// Register a new file, returning its position. A file already registered
    /// under the same path is kept and its position returned instead.
    pub fn insert(&mut self, file: SourceFile) -> usize {
        if let Some(idx) = self.position(file.path()) {
            return idx;
        }
        let idx = self.files.len();
        self.index.insert(file.path().to_path_buf(), idx);
        self.files.push(file);
        idx
    }

    pub fn iter(&self) -> impl Iterator<Item = &SourceFile> {
        self.files.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut SourceFile> {
        self.files.iter_mut()
    }

    /// Totals over every registered file.
    #[must_use]
    pub fn counts(&self) -> Counts {
        self.files
            .iter()
            .fold(Counts::default(), |acc, file| acc + file.counts())
    }
}

/// Lexically normalize a path from an `SF:` record: `.` components are
/// dropped and `..` pops its parent. Relative paths are anchored at `base`.
/// The filesystem is never consulted.
pub fn canonical_path(raw: &str, base: &Path) -> PathBuf {
    let raw = Path::new(raw);
    let joined;
    let path = if raw.is_absolute() {
        raw
    } else {
        joined = base.join(raw);
        &joined
    };

    let mut result = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !result.pop() {
                    result.push(component);
                }
            }
            other => result.push(other),
        }
    }
    result
}

/// Directory of `path` in the form used for display: forward slashes, no
/// repeated separators and no drive letter.
pub fn display_dir(path: &Path) -> String {
    let parent = path
        .parent()
        .map(|p| p.to_string_lossy().into_owned())
        .unwrap_or_default();
    normalize_display(&parent)
}

fn normalize_display(path: &str) -> String {
    let forward = path.replace('\\', "/");
    let collapsed = SEPARATORS.replace_all(&forward, "/");
    // "C:/src" -> "/src"
    DRIVE.replace(&collapsed, "").into_owned()
}
