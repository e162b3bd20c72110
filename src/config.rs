//! Configuration for one report run.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{CovtreeError, Result};
use crate::source::{SourceOptions, TabExpansion};

/// Main configuration structure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Replace tabs in source text with this many spaces. Tabs are left alone
    /// when unset.
    pub num_spaces: Option<usize>,
    /// Do not read source files.
    pub no_source: bool,
    /// Prefix to strip from displayed directories instead of the computed one.
    pub prefix: Option<String>,
    /// Do not strip any prefix.
    pub no_prefix: bool,
    /// Report title.
    pub title: Option<String>,
    /// Tracefile whose counts are subtracted from the run.
    pub baseline_file: Option<PathBuf>,
    /// Test case descriptions produced by `gendesc`.
    pub description_file: Option<PathBuf>,
    /// Keep descriptions of test cases that were not part of the run.
    pub keep_descriptions: bool,
    pub function_coverage: bool,
    pub branch_coverage: bool,
    /// Rates at or above this percentage are rated high.
    pub hi_limit: u8,
    /// Rates at or above this percentage are rated medium.
    pub med_limit: u8,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            num_spaces: None,
            no_source: false,
            prefix: None,
            no_prefix: false,
            title: None,
            baseline_file: None,
            description_file: None,
            keep_descriptions: false,
            function_coverage: true,
            branch_coverage: true,
            hi_limit: 90,
            med_limit: 75,
        }
    }
}

impl Config {
    /// Load configuration from a TOML file. Keys that are absent keep their
    /// defaults.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| {
            CovtreeError::Config(format!("config file {}: {e}", path.display()))
        })?;
        Self::from_toml(&text)
    }

    pub fn from_toml(text: &str) -> Result<Self> {
        let config: Self =
            toml::from_str(text).map_err(|e| CovtreeError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.hi_limit > 100 {
            return Err(CovtreeError::Config(format!(
                "hi_limit must be at most 100, got {}",
                self.hi_limit
            )));
        }
        if self.med_limit > self.hi_limit {
            return Err(CovtreeError::Config(format!(
                "med_limit ({}) must not exceed hi_limit ({})",
                self.med_limit, self.hi_limit
            )));
        }
        Ok(())
    }

    #[must_use]
    pub fn tab_expansion(&self) -> TabExpansion {
        TabExpansion::from_num_spaces(self.num_spaces)
    }

    /// Source loading settings, with relative `SF:` paths resolved against
    /// `base_dir`.
    #[must_use]
    pub fn source_options(&self, base_dir: &Path) -> SourceOptions {
        SourceOptions {
            tabs: self.tab_expansion(),
            no_source: self.no_source,
            base_dir: base_dir.to_path_buf(),
        }
    }
}
