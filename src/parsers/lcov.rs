/// Parser for the LCOV tracefile format.
///
/// Reference: https://ltp.sourceforge.net/coverage/lcov/geninfo.1.php
///
/// Records used:
///   TN:<test name>
///   SF:<path to source file>       (KF:<path> is accepted as a synonym)
///   FN:<line>,<function name>
///   FNDA:<execution count>,<function name>
///   DA:<line number>,<execution count>[,<checksum>]
///   BRDA:<line>,<block>,<branch>,<taken>   ("-" means 0)
///   end_of_record
///
/// Summary records (LF, LH, FNF, FNH, BRF, BRH) are ignored; totals are
/// derived from the data.
///
/// The parser is a small state machine over the current source file block
/// and the current test case. Malformed records are dropped one at a time and
/// never abort the parse.
use std::io::BufRead;

use tracing::{debug, trace};

use super::desc::Descriptions;
use super::{
    expect_fields, parse_count, parse_line_number, ParseMode, ParseStats, RecordError,
};
use crate::model::{HitMode, SourceFile, DEFAULT_TEST_NAME};
use crate::registry::{canonical_path, display_dir, Registry};
use crate::source::{load_source, SourceOptions};

/// Which source file block the parser is inside.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Block {
    Closed,
    Open(usize),
    /// A baseline block naming a file the registry does not know.
    Unmatched,
}

/// Result of a record that parsed cleanly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Applied {
    Yes,
    /// Nothing to apply it to (baseline without a match, or unused record).
    No,
}

pub struct TraceFileParser<'a> {
    registry: &'a mut Registry,
    options: &'a SourceOptions,
    mode: ParseMode,
    descriptions: Option<&'a mut Descriptions>,
    block: Block,
    test_name: String,
    line_no: usize,
    stats: ParseStats,
}

impl<'a> TraceFileParser<'a> {
    pub fn new(registry: &'a mut Registry, options: &'a SourceOptions, mode: ParseMode) -> Self {
        Self {
            registry,
            options,
            mode,
            descriptions: None,
            block: Block::Closed,
            test_name: DEFAULT_TEST_NAME.to_string(),
            line_no: 0,
            stats: ParseStats::default(),
        }
    }

    /// Collect description lines when parsing in [`ParseMode::Description`].
    pub fn with_descriptions(mut self, descriptions: &'a mut Descriptions) -> Self {
        self.descriptions = Some(descriptions);
        self
    }

    /// Test case the next record is attributed to.
    #[must_use]
    pub fn current_test(&self) -> &str {
        &self.test_name
    }

    /// Read every line of `reader`. Only I/O failures (including invalid
    /// UTF-8) are returned as errors.
    pub fn parse_reader(&mut self, reader: &mut dyn BufRead) -> std::io::Result<()> {
        let mut raw_line = String::new();
        loop {
            raw_line.clear();
            let n = reader.read_line(&mut raw_line)?;
            if n == 0 {
                break;
            }
            self.parse_line(&raw_line);
        }
        Ok(())
    }

    /// Feed an in-memory tracefile through the parser.
    pub fn parse_str(&mut self, input: &str) {
        for line in input.lines() {
            self.parse_line(line);
        }
    }

    /// Process a single tracefile line.
    pub fn parse_line(&mut self, raw: &str) {
        self.line_no += 1;
        let raw = raw.trim_end_matches(&['\r', '\n'][..]);
        let line = raw.trim();
        if line.is_empty() {
            return;
        }

        if line == "end_of_record" {
            self.end_of_record();
            return;
        }

        if let Some(path) = line.strip_prefix("SF:").or_else(|| line.strip_prefix("KF:")) {
            let result = self.open_block(path.trim());
            self.finish_record(line, result);
            return;
        }

        if self.mode == ParseMode::Description && self.block == Block::Closed {
            if let Some(descriptions) = self.descriptions.as_deref_mut() {
                descriptions.push_line(raw.trim_start());
                self.stats.descriptions += 1;
                return;
            }
        }

        let Some((tag, value)) = line.split_once(':') else {
            trace!(line_no = self.line_no, "Unexpected line: {line}");
            self.stats.ignored += 1;
            return;
        };

        let result = match tag {
            "TN" => {
                self.set_test_name(value);
                return;
            }
            "DA" => self.line_data(value),
            "FN" => self.function_definition(value),
            "FNDA" => self.function_data(value),
            "BRDA" => self.branch_data(value),
            _ => {
                trace!(line_no = self.line_no, "Ignoring record: {line}");
                self.stats.ignored += 1;
                return;
            }
        };
        self.finish_record(line, result);
    }

    /// Stop parsing and return what happened.
    pub fn finish(self) -> ParseStats {
        if self.block != Block::Closed {
            debug!("Tracefile ended inside a source file block (missing end_of_record)");
        }
        self.stats
    }

    fn finish_record(&mut self, line: &str, result: Result<Applied, RecordError>) {
        match result {
            Ok(Applied::Yes) => self.stats.applied += 1,
            Ok(Applied::No) => self.stats.ignored += 1,
            Err(err) => {
                debug!(line_no = self.line_no, "Could not parse line '{line}': {err}");
                self.stats.record_error(&err);
            }
        }
    }

    fn set_test_name(&mut self, value: &str) {
        let name = value.trim();
        if name.is_empty() {
            self.test_name = DEFAULT_TEST_NAME.to_string();
        } else {
            self.test_name = name.to_string();
            self.stats.test_names.insert(name.to_string());
        }
    }

    fn end_of_record(&mut self) {
        if self.block == Block::Closed {
            let err = RecordError::UnexpectedEndOfRecord;
            debug!(line_no = self.line_no, "{err}");
            self.stats.record_error(&err);
            return;
        }
        self.block = Block::Closed;
        self.test_name = DEFAULT_TEST_NAME.to_string();
    }

    fn open_block(&mut self, path: &str) -> Result<Applied, RecordError> {
        if path.is_empty() {
            return Err(RecordError::EmptyPath);
        }
        let canonical = canonical_path(path, &self.options.base_dir);
        self.block = match self.registry.position(&canonical) {
            Some(idx) => Block::Open(idx),
            None if self.mode.is_baseline() => {
                debug!(
                    "Baseline references {} which no tracefile mentions",
                    canonical.display()
                );
                Block::Unmatched
            }
            None => {
                let file = open_source_file(canonical, self.options);
                Block::Open(self.registry.insert(file))
            }
        };
        Ok(Applied::Yes)
    }

    fn hit_mode(&self) -> HitMode {
        if self.mode.is_baseline() {
            HitMode::Subtract
        } else {
            HitMode::Accumulate
        }
    }

    /// The open file for a data record, `None` inside an unmatched block.
    fn open_file(&mut self, tag: &'static str) -> Result<Option<&mut SourceFile>, RecordError> {
        match self.block {
            Block::Open(idx) => Ok(self.registry.get_index_mut(idx)),
            Block::Unmatched => Ok(None),
            Block::Closed => Err(RecordError::NoOpenFile(tag)),
        }
    }

    // DA:<line number>,<execution count>[,<checksum>]
    fn line_data(&mut self, value: &str) -> Result<Applied, RecordError> {
        let mode = self.hit_mode();
        let test_name = self.test_name.clone();
        let Some(file) = self.open_file("DA")? else {
            return Ok(Applied::No);
        };
        let fields = expect_fields(value, "at least 2", |n| n >= 2)?;
        let number = parse_line_number(fields[0])?;
        let count = parse_count(fields[1])?;

        file.line_entry(number).counter.apply(&test_name, count, mode);
        file.record_test_name(&test_name);
        Ok(Applied::Yes)
    }

    // FN:<line number of function start>,<function name>
    fn function_definition(&mut self, value: &str) -> Result<Applied, RecordError> {
        let baseline = self.mode.is_baseline();
        let Some(file) = self.open_file("FN")? else {
            return Ok(Applied::No);
        };
        if baseline {
            return Ok(Applied::No);
        }
        let fields = expect_fields(value, "2", |n| n == 2)?;
        parse_line_number(fields[0])?;
        let name = fields[1];
        if name.is_empty() {
            return Err(RecordError::EmptyName);
        }

        match file.function_entry(name, true) {
            Some(function) => {
                function.line = Some(fields[0].to_string());
                Ok(Applied::Yes)
            }
            None => Ok(Applied::No),
        }
    }

    // FNDA:<execution count>,<function name>
    fn function_data(&mut self, value: &str) -> Result<Applied, RecordError> {
        let mode = self.hit_mode();
        let create = !self.mode.is_baseline();
        let test_name = self.test_name.clone();
        let Some(file) = self.open_file("FNDA")? else {
            return Ok(Applied::No);
        };
        let fields = expect_fields(value, "2", |n| n == 2)?;
        let count = parse_count(fields[0])?;
        let name = fields[1];
        if name.is_empty() {
            return Err(RecordError::EmptyName);
        }

        let Some(function) = file.function_entry(name, create) else {
            return Ok(Applied::No);
        };
        function.counter.apply(&test_name, count, mode);
        file.record_test_name(&test_name);
        Ok(Applied::Yes)
    }

    // BRDA:<line number>,<block number>,<branch number>,<taken>
    fn branch_data(&mut self, value: &str) -> Result<Applied, RecordError> {
        let mode = self.hit_mode();
        let create = !self.mode.is_baseline();
        let test_name = self.test_name.clone();
        let Some(file) = self.open_file("BRDA")? else {
            return Ok(Applied::No);
        };
        let fields = expect_fields(value, "4", |n| n == 4)?;
        let number = parse_line_number(fields[0])?;
        let (block, branch) = (fields[1], fields[2]);
        // "-" marks a branch whose condition was never evaluated.
        let taken = match fields[3] {
            "-" => 0,
            other => parse_count(other)?,
        };

        let line = if create {
            Some(file.line_entry(number))
        } else {
            file.line_mut(number)
        };
        let Some(branch) = line.and_then(|line| line.branch_entry(block, branch, create)) else {
            return Ok(Applied::No);
        };
        branch.counter.apply(&test_name, taken, mode);
        file.record_test_name(&test_name);
        Ok(Applied::Yes)
    }
}

/// Create the registry entry for a newly seen source file, loading its text
/// unless disabled. A file that cannot be read is kept without source.
pub fn open_source_file(path: std::path::PathBuf, options: &SourceOptions) -> SourceFile {
    let dir = display_dir(&path);
    let mut file = SourceFile::new(path, dir);
    if !options.no_source {
        match load_source(file.path(), options.tabs) {
            Ok(code) => file.set_source(code),
            Err(e) => debug!("Can not read source file {}: {e}", file.path().display()),
        }
    }
    file
}

/// Parse an in-memory tracefile into `registry`.
pub fn parse_str(
    registry: &mut Registry,
    options: &SourceOptions,
    mode: ParseMode,
    input: &str,
) -> ParseStats {
    let mut parser = TraceFileParser::new(registry, options, mode);
    parser.parse_str(input);
    parser.finish()
}
