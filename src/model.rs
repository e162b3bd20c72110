//! In-memory coverage model. Every countable thing (line, branch, function)
//! embeds a [`HitCounter`] that keeps one hit count per test case; a
//! [`SourceFile`] owns the lines (which own their branches) and functions of
//! one source file and derives the valid/covered totals from them.

use std::collections::{BTreeMap, BTreeSet};
use std::ops::{Add, AddAssign};
use std::path::{Path, PathBuf};

/// Hit count reported for a unit that was never marked executable.
pub const NON_EXECUTABLE: i64 = -1;

/// Test case name used until a `TN:` record names one.
pub const DEFAULT_TEST_NAME: &str = "<unnamed>";

/// Compute a coverage rate, returning `None` when there is nothing to cover.
#[must_use]
pub fn rate(covered: u64, total: u64) -> Option<f64> {
    if total == 0 {
        None
    } else {
        Some(covered as f64 / total as f64)
    }
}

/// Whether a count from a tracefile is added to or taken from the
/// accumulated hits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitMode {
    Accumulate,
    Subtract,
}

/// Per-test-case hit counts plus the executable flag.
///
/// Counts are stored unsigned, so subtraction saturates at zero. Once a count
/// has been written the counter is executable for good.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HitCounter {
    executable: bool,
    hits: BTreeMap<String, u64>,
}

impl HitCounter {
    /// A counter that reports [`NON_EXECUTABLE`] until it is written to.
    pub fn new() -> Self {
        Self::default()
    }

    /// A counter that is executable from the start with zero hits.
    pub fn executable() -> Self {
        Self {
            executable: true,
            hits: BTreeMap::new(),
        }
    }

    pub fn mark_executable(&mut self) {
        self.executable = true;
    }

    #[must_use]
    pub fn is_executable(&self) -> bool {
        self.executable
    }

    /// Sum of hits across all test cases, or [`NON_EXECUTABLE`].
    #[must_use]
    pub fn total_hits(&self) -> i64 {
        if !self.executable {
            return NON_EXECUTABLE;
        }
        let sum = self.hits.values().fold(0u64, |acc, h| acc.saturating_add(*h));
        i64::try_from(sum).unwrap_or(i64::MAX)
    }

    /// Hits recorded for one test case, or [`NON_EXECUTABLE`].
    #[must_use]
    pub fn hits(&self, test_case: &str) -> i64 {
        if !self.executable {
            return NON_EXECUTABLE;
        }
        let hits = self.hits.get(test_case).copied().unwrap_or(0);
        i64::try_from(hits).unwrap_or(i64::MAX)
    }

    /// Total hits as an unsigned count, `None` when not executable.
    #[must_use]
    pub fn total(&self) -> Option<u64> {
        u64::try_from(self.total_hits()).ok()
    }

    /// Store a hit count for a test case, clamping negative values to zero.
    pub fn set_hits(&mut self, test_case: &str, hits: i64) {
        self.executable = true;
        let clamped = u64::try_from(hits.max(0)).unwrap_or(0);
        self.hits.insert(test_case.to_string(), clamped);
    }

    /// Add or subtract `count` from the hits of `test_case`.
    pub fn apply(&mut self, test_case: &str, count: u64, mode: HitMode) {
        self.executable = true;
        let entry = self.hits.entry(test_case.to_string()).or_insert(0);
        *entry = match mode {
            HitMode::Accumulate => entry.saturating_add(count),
            HitMode::Subtract => entry.saturating_sub(count),
        };
    }

    /// Executable and hit at least once by some test case.
    #[must_use]
    pub fn is_covered(&self) -> bool {
        self.total_hits() > 0
    }

    /// Executable and hit at least once by `test_case`.
    #[must_use]
    pub fn is_covered_by(&self, test_case: &str) -> bool {
        self.executable && self.hits(test_case) > 0
    }

    /// Test cases with a non-zero hit count.
    pub fn covering_tests(&self) -> impl Iterator<Item = &str> {
        self.hits
            .iter()
            .filter(|(_, hits)| **hits > 0)
            .map(|(name, _)| name.as_str())
    }

    /// Non-zero hit counts keyed by test case.
    #[must_use]
    pub fn test_hits(&self) -> BTreeMap<String, u64> {
        self.hits
            .iter()
            .filter(|(_, hits)| **hits > 0)
            .map(|(name, hits)| (name.clone(), *hits))
            .collect()
    }
}

/// Anything that carries a [`HitCounter`].
pub trait Counted {
    fn counter(&self) -> &HitCounter;

    fn is_executable(&self) -> bool {
        self.counter().is_executable()
    }

    fn total_hits(&self) -> i64 {
        self.counter().total_hits()
    }

    fn hits(&self, test_case: &str) -> i64 {
        self.counter().hits(test_case)
    }
}

/// Number of executable units covered by `test_case`.
pub fn count_covered_by<'a, T, I>(units: I, test_case: &str) -> u64
where
    T: Counted + 'a,
    I: IntoIterator<Item = &'a T>,
{
    units
        .into_iter()
        .filter(|unit| unit.counter().is_covered_by(test_case))
        .count() as u64
}

/// One conditional branch arm. Block and branch ids are opaque tokens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Branch {
    pub block: String,
    pub number: String,
    pub counter: HitCounter,
}

impl Branch {
    pub fn new(block: &str, number: &str) -> Self {
        Self {
            block: block.to_string(),
            number: number.to_string(),
            counter: HitCounter::executable(),
        }
    }

    #[must_use]
    pub fn matches(&self, block: &str, number: &str) -> bool {
        self.block == block && self.number == number
    }
}

impl Counted for Branch {
    fn counter(&self) -> &HitCounter {
        &self.counter
    }
}

/// One source line with its branches in parse order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Line {
    number: u32,
    code: Option<String>,
    pub counter: HitCounter,
    branches: Vec<Branch>,
}

impl Line {
    /// Line numbers start at 1.
    pub fn new(number: u32) -> Self {
        debug_assert!(number > 0, "line numbers start at 1");
        Self {
            number,
            code: None,
            counter: HitCounter::new(),
            branches: Vec::new(),
        }
    }

    #[must_use]
    pub fn number(&self) -> u32 {
        self.number
    }

    #[must_use]
    pub fn code(&self) -> Option<&str> {
        self.code.as_deref()
    }

    /// Store already formatted source text (see [`crate::source::format_code`]).
    pub fn set_code(&mut self, code: String) {
        self.code = Some(code);
    }

    #[must_use]
    pub fn branches(&self) -> &[Branch] {
        &self.branches
    }

    pub fn branch_mut(&mut self, block: &str, number: &str) -> Option<&mut Branch> {
        self.branches.iter_mut().find(|b| b.matches(block, number))
    }

    /// Look up a branch, appending a new one when `create` is set.
    pub fn branch_entry(&mut self, block: &str, number: &str, create: bool) -> Option<&mut Branch> {
        match self.branches.iter().position(|b| b.matches(block, number)) {
            Some(idx) => Some(&mut self.branches[idx]),
            None if create => {
                self.branches.push(Branch::new(block, number));
                self.branches.last_mut()
            }
            None => None,
        }
    }
}

impl Counted for Line {
    fn counter(&self) -> &HitCounter {
        &self.counter
    }
}

/// A function definition, keyed by name within its file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Function {
    pub name: String,
    /// Declaration line as it appeared in the `FN:` record.
    pub line: Option<String>,
    pub counter: HitCounter,
}

impl Function {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            line: None,
            counter: HitCounter::executable(),
        }
    }
}

impl Counted for Function {
    fn counter(&self) -> &HitCounter {
        &self.counter
    }
}

/// Valid/covered totals for lines, functions and branches.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Counts {
    pub lines_valid: u64,
    pub lines_covered: u64,
    pub functions_valid: u64,
    pub functions_covered: u64,
    pub branches_valid: u64,
    pub branches_covered: u64,
}

impl Counts {
    #[must_use]
    pub fn line_rate(&self) -> Option<f64> {
        rate(self.lines_covered, self.lines_valid)
    }

    #[must_use]
    pub fn function_rate(&self) -> Option<f64> {
        rate(self.functions_covered, self.functions_valid)
    }

    #[must_use]
    pub fn branch_rate(&self) -> Option<f64> {
        rate(self.branches_covered, self.branches_valid)
    }
}

impl AddAssign for Counts {
    fn add_assign(&mut self, other: Self) {
        self.lines_valid += other.lines_valid;
        self.lines_covered += other.lines_covered;
        self.functions_valid += other.functions_valid;
        self.functions_covered += other.functions_covered;
        self.branches_valid += other.branches_valid;
        self.branches_covered += other.branches_covered;
    }
}

impl Add for Counts {
    type Output = Counts;

    fn add(mut self, other: Self) -> Self {
        self += other;
        self
    }
}

/// Lines, branches and functions hit by one test case in one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestCaseHits {
    pub name: String,
    pub lines_hit: u64,
    pub branches_hit: u64,
    pub functions_hit: u64,
}

/// Coverage of one physical source file, accumulated across every tracefile
/// and test case that mentions it.
#[derive(Debug, Clone)]
pub struct SourceFile {
    path: PathBuf,
    dir: String,
    name: String,
    prefix: Option<String>,
    lines: BTreeMap<u32, Line>,
    functions: BTreeMap<String, Function>,
    has_source: bool,
    test_names: BTreeSet<String>,
}

impl SourceFile {
    /// `path` is the canonical path; `dir` the display directory.
    pub fn new(path: PathBuf, dir: String) -> Self {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.to_string_lossy().into_owned());
        Self {
            path,
            dir,
            name,
            prefix: None,
            lines: BTreeMap::new(),
            functions: BTreeMap::new(),
            has_source: false,
            test_names: BTreeSet::new(),
        }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Directory shown in index pages, after prefix stripping.
    #[must_use]
    pub fn dir(&self) -> &str {
        &self.dir
    }

    /// File name shown in index pages.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn prefix(&self) -> Option<&str> {
        self.prefix.as_deref()
    }

    /// Replace the display directory, remembering the stripped prefix.
    pub fn set_display_dir(&mut self, dir: String, prefix: Option<String>) {
        self.dir = dir;
        self.prefix = prefix;
    }

    #[must_use]
    pub fn has_source(&self) -> bool {
        self.has_source
    }

    /// Seed the line map with literal source text, one non-executable line
    /// per source line.
    pub fn set_source(&mut self, code: Vec<String>) {
        for (idx, text) in code.into_iter().enumerate() {
            let number = u32::try_from(idx + 1).unwrap_or(u32::MAX);
            self.line_entry(number).set_code(text);
        }
        self.has_source = true;
    }

    pub fn lines(&self) -> impl Iterator<Item = &Line> {
        self.lines.values()
    }

    #[must_use]
    pub fn line(&self, number: u32) -> Option<&Line> {
        self.lines.get(&number)
    }

    pub fn line_mut(&mut self, number: u32) -> Option<&mut Line> {
        self.lines.get_mut(&number)
    }

    /// The line at `number`, created as non-executable when missing.
    pub fn line_entry(&mut self, number: u32) -> &mut Line {
        self.lines.entry(number).or_insert_with(|| Line::new(number))
    }

    pub fn functions(&self) -> impl Iterator<Item = &Function> {
        self.functions.values()
    }

    #[must_use]
    pub fn function(&self, name: &str) -> Option<&Function> {
        self.functions.get(name)
    }

    /// Look up a function, creating it when `create` is set.
    pub fn function_entry(&mut self, name: &str, create: bool) -> Option<&mut Function> {
        if create {
            Some(
                self.functions
                    .entry(name.to_string())
                    .or_insert_with(|| Function::new(name)),
            )
        } else {
            self.functions.get_mut(name)
        }
    }

    pub fn branches(&self) -> impl Iterator<Item = &Branch> {
        self.lines.values().flat_map(|line| line.branches().iter())
    }

    /// Remember that records were applied under `test_case`.
    pub fn record_test_name(&mut self, test_case: &str) {
        if !self.test_names.contains(test_case) {
            self.test_names.insert(test_case.to_string());
        }
    }

    /// Every test case name records were applied under, hit or not.
    #[must_use]
    pub fn test_names_seen(&self) -> &BTreeSet<String> {
        &self.test_names
    }

    /// Test cases that hit at least one line, branch or function.
    #[must_use]
    pub fn covering_tests(&self) -> BTreeSet<&str> {
        let mut names = BTreeSet::new();
        for line in self.lines.values() {
            names.extend(line.counter.covering_tests());
            for branch in line.branches() {
                names.extend(branch.counter.covering_tests());
            }
        }
        for function in self.functions.values() {
            names.extend(function.counter.covering_tests());
        }
        names
    }

    #[must_use]
    pub fn counts(&self) -> Counts {
        let executable = self.lines.values().filter(|l| l.is_executable());
        let (lines_valid, lines_covered) = executable.fold((0, 0), |(valid, covered), line| {
            (valid + 1, covered + u64::from(line.counter.is_covered()))
        });
        let branches_valid = self.branches().count() as u64;
        let branches_covered = self.branches().filter(|b| b.counter.is_covered()).count() as u64;
        let functions_valid = self.functions.len() as u64;
        let functions_covered = self
            .functions
            .values()
            .filter(|f| f.counter.is_covered())
            .count() as u64;
        Counts {
            lines_valid,
            lines_covered,
            functions_valid,
            functions_covered,
            branches_valid,
            branches_covered,
        }
    }

    #[must_use]
    pub fn lines_hit_by(&self, test_case: &str) -> u64 {
        count_covered_by(self.lines.values(), test_case)
    }

    #[must_use]
    pub fn branches_hit_by(&self, test_case: &str) -> u64 {
        count_covered_by(self.branches(), test_case)
    }

    #[must_use]
    pub fn functions_hit_by(&self, test_case: &str) -> u64 {
        count_covered_by(self.functions.values(), test_case)
    }

    /// Per-test-case breakdown for every test that hit something here.
    #[must_use]
    pub fn test_case_hits(&self) -> Vec<TestCaseHits> {
        self.covering_tests()
            .into_iter()
            .map(|name| TestCaseHits {
                name: name.to_string(),
                lines_hit: self.lines_hit_by(name),
                branches_hit: self.branches_hit_by(name),
                functions_hit: self.functions_hit_by(name),
            })
            .collect()
    }
}
