pub mod desc;
pub mod lcov;

use std::collections::BTreeSet;

use thiserror::Error;

/// What a tracefile is being read for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseMode {
    /// Counts are added to the registry; new files and units are created.
    Trace,
    /// Counts are subtracted from units that already exist.
    Baseline,
    /// Lines outside a file record are test case descriptions.
    Description,
}

impl ParseMode {
    #[must_use]
    pub fn is_baseline(self) -> bool {
        self == ParseMode::Baseline
    }
}

/// Why a single record was dropped. Never fatal to a run.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RecordError {
    #[error("expected {expected} fields, found {found}")]
    FieldCount { expected: &'static str, found: usize },

    #[error("invalid integer '{0}'")]
    InvalidInteger(String),

    #[error("line numbers start at 1")]
    ZeroLine,

    #[error("negative execution count {0}")]
    NegativeCount(i64),

    #[error("empty source file path")]
    EmptyPath,

    #[error("empty function name")]
    EmptyName,

    #[error("{0} record outside of a source file block")]
    NoOpenFile(&'static str),

    #[error("end_of_record without an open source file block")]
    UnexpectedEndOfRecord,
}

impl RecordError {
    /// Record arrived in the wrong place rather than being malformed.
    #[must_use]
    pub fn is_protocol_violation(&self) -> bool {
        matches!(
            self,
            RecordError::NoOpenFile(_) | RecordError::UnexpectedEndOfRecord
        )
    }
}

/// What happened while reading one tracefile.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParseStats {
    /// Records that changed the registry.
    pub applied: usize,
    /// Malformed records that were dropped.
    pub skipped: usize,
    /// Records that arrived outside a source file block.
    pub violations: usize,
    /// Lines that were not understood, or understood and deliberately unused.
    pub ignored: usize,
    /// Lines handed to the description collector.
    pub descriptions: usize,
    /// Non-empty `TN:` names seen.
    pub test_names: BTreeSet<String>,
}

impl ParseStats {
    /// Fold another file's stats into this one.
    pub fn merge(&mut self, other: ParseStats) {
        self.applied += other.applied;
        self.skipped += other.skipped;
        self.violations += other.violations;
        self.ignored += other.ignored;
        self.descriptions += other.descriptions;
        self.test_names.extend(other.test_names);
    }

    pub(crate) fn record_error(&mut self, err: &RecordError) {
        if err.is_protocol_violation() {
            self.violations += 1;
        } else {
            self.skipped += 1;
        }
    }
}

/// Split the value of a record (everything after the first `:`) into its
/// comma separated fields.
pub(crate) fn split_fields(value: &str) -> Vec<&str> {
    value.split(',').map(str::trim).collect()
}

pub(crate) fn expect_fields<'a>(
    value: &'a str,
    expected: &'static str,
    accept: impl Fn(usize) -> bool,
) -> Result<Vec<&'a str>, RecordError> {
    let fields = split_fields(value);
    if accept(fields.len()) {
        Ok(fields)
    } else {
        Err(RecordError::FieldCount {
            expected,
            found: fields.len(),
        })
    }
}

pub(crate) fn parse_line_number(field: &str) -> Result<u32, RecordError> {
    let number = field
        .parse::<u32>()
        .map_err(|_| RecordError::InvalidInteger(field.to_string()))?;
    if number == 0 {
        return Err(RecordError::ZeroLine);
    }
    Ok(number)
}

/// Parse an execution count. Counts are signed in some producers; negative
/// ones are rejected.
pub(crate) fn parse_count(field: &str) -> Result<u64, RecordError> {
    let count = field
        .parse::<i64>()
        .map_err(|_| RecordError::InvalidInteger(field.to_string()))?;
    u64::try_from(count).map_err(|_| RecordError::NegativeCount(count))
}
