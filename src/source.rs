//! Loading literal source text for a covered file.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// How tab characters in source text are rendered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TabExpansion {
    /// Leave tabs alone.
    #[default]
    Off,
    /// Replace every tab with this many spaces.
    Spaces(usize),
}

impl TabExpansion {
    pub fn from_num_spaces(num_spaces: Option<usize>) -> Self {
        num_spaces.map_or(TabExpansion::Off, TabExpansion::Spaces)
    }
}

/// Settings for resolving `SF:` paths and reading the files they name.
#[derive(Debug, Clone)]
pub struct SourceOptions {
    pub tabs: TabExpansion,
    /// Skip reading source text entirely.
    pub no_source: bool,
    /// Directory relative `SF:` paths are resolved against.
    pub base_dir: PathBuf,
}

impl Default for SourceOptions {
    fn default() -> Self {
        Self {
            tabs: TabExpansion::Off,
            no_source: false,
            base_dir: PathBuf::from("/"),
        }
    }
}

/// Right-trim a source line and expand its tabs.
pub fn format_code(raw: &str, tabs: TabExpansion) -> String {
    let trimmed = raw.trim_end();
    match tabs {
        TabExpansion::Off => trimmed.to_string(),
        TabExpansion::Spaces(width) => trimmed.replace('\t', &" ".repeat(width)),
    }
}

/// Read a source file into formatted lines. Invalid UTF-8 is replaced rather
/// than rejected.
pub fn load_source(path: &Path, tabs: TabExpansion) -> std::io::Result<Vec<String>> {
    let bytes = std::fs::read(path)?;
    let text = String::from_utf8_lossy(&bytes);
    Ok(text.lines().map(|line| format_code(line, tabs)).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_code_right_trims() {
        assert_eq!(format_code("  let x = 1;   \t", TabExpansion::Off), "  let x = 1;");
    }

    #[test]
    fn test_format_code_expands_tabs() {
        assert_eq!(format_code("\tx\ty", TabExpansion::Spaces(4)), "    x    y");
        assert_eq!(format_code("\tx", TabExpansion::Spaces(0)), "x");
        assert_eq!(format_code("\tx", TabExpansion::Off), "\tx");
    }

    #[test]
    fn test_load_source() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("main.c");
        std::fs::write(&path, "int main() {\r\n\treturn 0;  \n}\n").unwrap();

        let lines = load_source(&path, TabExpansion::Spaces(2)).unwrap();
        assert_eq!(lines, vec!["int main() {", "  return 0;", "}"]);
    }

    #[test]
    fn test_load_source_missing() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_source(&dir.path().join("nope.c"), TabExpansion::Off).is_err());
    }
}
