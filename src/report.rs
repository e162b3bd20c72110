//! The data handed to a renderer, and the built-in text, markdown and JSON
//! formatters.

use std::collections::BTreeMap;
use std::fmt::Write;

use serde::Serialize;
use tracing::info;

use crate::config::Config;
use crate::ingest::CoverageRun;
use crate::model::{Branch, Counted, Counts, Function, Line, SourceFile, TestCaseHits};
use crate::tree::{build_tree, EntryKind, IndexEntry, IndexNode};

/// Code shown for lines of a file whose source could not be read.
pub const NO_SOURCE_CODE: &str = "/* EOF */";

/// Presentation settings taken from the run configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportOptions {
    pub function_coverage: bool,
    pub branch_coverage: bool,
    pub no_source: bool,
    pub hi_limit: u8,
    pub med_limit: u8,
}

impl Default for ReportOptions {
    fn default() -> Self {
        Self::from(&Config::default())
    }
}

impl From<&Config> for ReportOptions {
    fn from(config: &Config) -> Self {
        Self {
            function_coverage: config.function_coverage,
            branch_coverage: config.branch_coverage,
            no_source: config.no_source,
            hi_limit: config.hi_limit,
            med_limit: config.med_limit,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Rating {
    High,
    Medium,
    Low,
}

impl ReportOptions {
    /// Classify a rate against the configured limits. `None` when there is
    /// no data.
    #[must_use]
    pub fn rating(&self, rate: Option<f64>) -> Option<Rating> {
        let pct = rate? * 100.0;
        Some(if pct >= f64::from(self.hi_limit) {
            Rating::High
        } else if pct >= f64::from(self.med_limit) {
            Rating::Medium
        } else {
            Rating::Low
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct CountsView {
    pub lines_valid: u64,
    pub lines_covered: u64,
    pub line_rate: Option<f64>,
    pub functions_valid: u64,
    pub functions_covered: u64,
    pub function_rate: Option<f64>,
    pub branches_valid: u64,
    pub branches_covered: u64,
    pub branch_rate: Option<f64>,
}

impl From<Counts> for CountsView {
    fn from(counts: Counts) -> Self {
        Self {
            lines_valid: counts.lines_valid,
            lines_covered: counts.lines_covered,
            line_rate: counts.line_rate(),
            functions_valid: counts.functions_valid,
            functions_covered: counts.functions_covered,
            function_rate: counts.function_rate(),
            branches_valid: counts.branches_valid,
            branches_covered: counts.branches_covered,
            branch_rate: counts.branch_rate(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct TestCaseView {
    pub name: String,
    pub lines_hit: u64,
    pub branches_hit: u64,
    pub functions_hit: u64,
}

impl From<&TestCaseHits> for TestCaseView {
    fn from(hits: &TestCaseHits) -> Self {
        Self {
            name: hits.name.clone(),
            lines_hit: hits.lines_hit,
            branches_hit: hits.branches_hit,
            functions_hit: hits.functions_hit,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct BranchView {
    pub block: String,
    pub number: String,
    pub taken: u64,
    pub test_hits: BTreeMap<String, u64>,
}

impl From<&Branch> for BranchView {
    fn from(branch: &Branch) -> Self {
        Self {
            block: branch.block.clone(),
            number: branch.number.clone(),
            taken: branch.counter.total().unwrap_or(0),
            test_hits: branch.counter.test_hits(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct LineView {
    pub number: u32,
    /// Absent for lines that are not executable.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hits: Option<u64>,
    pub code: Option<String>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub test_hits: BTreeMap<String, u64>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub branches: Vec<BranchView>,
}

impl LineView {
    fn new(line: &Line, code: Option<String>) -> Self {
        Self {
            number: line.number(),
            hits: line.counter.total(),
            code,
            test_hits: line.counter.test_hits(),
            branches: line.branches().iter().map(BranchView::from).collect(),
        }
    }

    fn placeholder(number: u32) -> Self {
        Self {
            number,
            hits: None,
            code: Some(NO_SOURCE_CODE.to_string()),
            test_hits: BTreeMap::new(),
            branches: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct FunctionView {
    pub name: String,
    pub line_number: Option<String>,
    pub hits: u64,
    pub test_hits: BTreeMap<String, u64>,
}

impl From<&Function> for FunctionView {
    fn from(function: &Function) -> Self {
        Self {
            name: function.name.clone(),
            line_number: function.line.clone(),
            hits: function.counter.total().unwrap_or(0),
            test_hits: function.counter.test_hits(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct SourceFileView {
    pub name: String,
    pub dir: String,
    pub path: String,
    pub prefix: Option<String>,
    #[serde(flatten)]
    pub counts: CountsView,
    pub has_source: bool,
    pub test_cases: Vec<TestCaseView>,
    pub lines: Vec<LineView>,
    pub functions: Vec<FunctionView>,
    /// Executable lines nobody hit.
    #[serde(skip)]
    pub missed_lines: Vec<u32>,
    #[serde(skip)]
    pub executable_lines: Vec<u32>,
}

impl SourceFileView {
    pub fn new(file: &SourceFile, no_source: bool) -> Self {
        let executable_lines: Vec<u32> = file
            .lines()
            .filter(|line| line.is_executable())
            .map(Line::number)
            .collect();
        let missed_lines = file
            .lines()
            .filter(|line| line.is_executable() && !line.counter.is_covered())
            .map(Line::number)
            .collect();

        Self {
            name: file.name().to_string(),
            dir: file.dir().to_string(),
            path: file.path().to_string_lossy().into_owned(),
            prefix: file.prefix().map(str::to_string),
            counts: file.counts().into(),
            has_source: file.has_source(),
            test_cases: file.test_case_hits().iter().map(TestCaseView::from).collect(),
            lines: line_views(file, no_source),
            functions: file.functions().map(FunctionView::from).collect(),
            missed_lines,
            executable_lines,
        }
    }
}

/// Lines in number order. Without readable source, every line shows
/// [`NO_SOURCE_CODE`] and numbering gaps are filled with placeholders, unless
/// source loading was turned off altogether.
fn line_views(file: &SourceFile, no_source: bool) -> Vec<LineView> {
    let placeholders = !no_source && !file.has_source();
    let mut views = Vec::new();
    let mut previous = 0;
    for line in file.lines() {
        if placeholders {
            while previous + 1 < line.number() {
                previous += 1;
                views.push(LineView::placeholder(previous));
            }
            previous = line.number();
            views.push(LineView::new(line, Some(NO_SOURCE_CODE.to_string())));
        } else {
            views.push(LineView::new(line, line.code().map(str::to_string)));
        }
    }
    views
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct IndexEntryView {
    pub kind: EntryKind,
    pub name: String,
    #[serde(flatten)]
    pub counts: CountsView,
    pub rating: Option<Rating>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub test_cases: Vec<TestCaseView>,
}

impl IndexEntryView {
    fn new(entry: &IndexEntry, options: &ReportOptions) -> Self {
        Self {
            kind: entry.kind,
            name: entry.name.clone(),
            counts: entry.counts.into(),
            rating: options.rating(entry.counts.line_rate()),
            test_cases: entry.test_cases.iter().map(TestCaseView::from).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct IndexNodeView {
    pub path: String,
    pub prefix: Option<String>,
    #[serde(flatten)]
    pub counts: CountsView,
    pub entries: Vec<IndexEntryView>,
}

impl IndexNodeView {
    fn new(node: &IndexNode, options: &ReportOptions) -> Self {
        Self {
            path: node.path.clone(),
            prefix: node.prefix.clone(),
            counts: node.counts.into(),
            entries: node
                .entries
                .iter()
                .map(|entry| IndexEntryView::new(entry, options))
                .collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DescriptionView {
    pub name: String,
    pub text: Vec<String>,
}

/// Everything a renderer needs for one run.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct ReportDocument {
    pub title: String,
    pub date: String,
    pub prefix: Option<String>,
    pub test_names: Vec<String>,
    pub descriptions: Vec<DescriptionView>,
    pub summary: CountsView,
    pub rating: Option<Rating>,
    pub top: IndexNodeView,
    pub directories: Vec<IndexNodeView>,
    pub files: Vec<SourceFileView>,
    #[serde(skip)]
    pub totals: Counts,
    #[serde(skip)]
    pub options: ReportOptions,
}

impl ReportDocument {
    /// Build the report for `run`, dated today.
    pub fn build(run: &CoverageRun, options: ReportOptions) -> Self {
        let tree = build_tree(&run.registry);
        let totals = tree.top.counts;
        Self {
            title: run.title.clone(),
            date: chrono::Local::now().format("%Y-%m-%d").to_string(),
            prefix: run.prefix.clone(),
            test_names: run.test_names.iter().cloned().collect(),
            descriptions: run
                .descriptions
                .iter()
                .map(|d| DescriptionView {
                    name: d.name.clone(),
                    text: d.text.clone(),
                })
                .collect(),
            summary: totals.into(),
            rating: options.rating(totals.line_rate()),
            top: IndexNodeView::new(&tree.top, &options),
            directories: tree
                .directories
                .iter()
                .map(|node| IndexNodeView::new(node, &options))
                .collect(),
            files: run
                .registry
                .iter()
                .map(|file| SourceFileView::new(file, options.no_source))
                .collect(),
            totals,
            options,
        }
    }

    #[must_use]
    pub fn with_date(mut self, date: &str) -> Self {
        self.date = date.to_string();
        self
    }

    /// Format using a specific formatter.
    #[must_use]
    pub fn format(&self, formatter: &dyn ReportFormatter) -> String {
        formatter.format(self)
    }

    fn files_in<'a>(&'a self, dir: &'a str) -> impl Iterator<Item = &'a SourceFileView> + 'a {
        self.files.iter().filter(move |file| file.dir == dir)
    }
}

/// Trait for formatting coverage reports.
pub trait ReportFormatter {
    /// Format the report to a string.
    fn format(&self, report: &ReportDocument) -> String;
}

/// Summary lines in the form `lines......: 83.3% (5 of 6 lines)`.
#[must_use]
pub fn summary_lines(counts: &Counts, options: &ReportOptions) -> Vec<String> {
    let mut kinds = vec![("lines", counts.lines_covered, counts.lines_valid)];
    if options.function_coverage {
        kinds.push(("functions", counts.functions_covered, counts.functions_valid));
    }
    if options.branch_coverage {
        kinds.push(("branches", counts.branches_covered, counts.branches_valid));
    }

    kinds
        .into_iter()
        .map(|(kind, hit, total)| {
            let label = format!("{kind:.<11}");
            match crate::model::rate(hit, total) {
                Some(rate) => {
                    let pct = rate * 100.0;
                    format!("{label}: {pct:.1}% ({hit} of {total} {kind})")
                }
                None => format!("{label}: no data found"),
            }
        })
        .collect()
}

/// Log the overall coverage rate of a run.
pub fn log_summary(counts: &Counts, options: &ReportOptions) {
    info!("Overall coverage rate:");
    for line in summary_lines(counts, options) {
        info!("  {line}");
    }
}

/// `83.3% (5/6)`, or `-` without data.
fn cell(covered: u64, valid: u64) -> String {
    match crate::model::rate(covered, valid) {
        Some(rate) => {
            let pct = rate * 100.0;
            format!("{pct:.1}% ({covered}/{valid})")
        }
        None => "-".to_string(),
    }
}

fn row_cells(counts: &CountsView, options: &ReportOptions) -> Vec<String> {
    let mut cells = vec![cell(counts.lines_covered, counts.lines_valid)];
    if options.function_coverage {
        cells.push(cell(counts.functions_covered, counts.functions_valid));
    }
    if options.branch_coverage {
        cells.push(cell(counts.branches_covered, counts.branches_valid));
    }
    cells
}

fn header_cells(options: &ReportOptions) -> Vec<&'static str> {
    let mut cells = vec!["LINES"];
    if options.function_coverage {
        cells.push("FUNCTIONS");
    }
    if options.branch_coverage {
        cells.push("BRANCHES");
    }
    cells
}

/// Plain text formatter.
pub struct TextFormatter;

impl ReportFormatter for TextFormatter {
    fn format(&self, report: &ReportDocument) -> String {
        let options = &report.options;
        let mut out = String::new();

        writeln!(out, "{} ({})", report.title, report.date).unwrap();
        if let Some(prefix) = &report.prefix {
            writeln!(out, "Prefix: {prefix}").unwrap();
        }
        if !report.test_names.is_empty() {
            writeln!(out, "Tests:  {}", report.test_names.join(", ")).unwrap();
        }
        out.push('\n');
        writeln!(out, "Overall coverage rate:").unwrap();
        for line in summary_lines(&report.totals, options) {
            writeln!(out, "  {line}").unwrap();
        }

        for dir in &report.directories {
            out.push('\n');
            write!(out, "{:<50}", dir.path).unwrap();
            for header in header_cells(options) {
                write!(out, " {header:>20}").unwrap();
            }
            out.push('\n');
            writeln!(out, "{}", "-".repeat(50 + 21 * header_cells(options).len())).unwrap();

            for entry in &dir.entries {
                write!(out, "{:<50}", entry.name).unwrap();
                for value in row_cells(&entry.counts, options) {
                    write!(out, " {value:>20}").unwrap();
                }
                out.push('\n');
            }
            for file in report.files_in(&dir.path) {
                if !file.missed_lines.is_empty() {
                    let missed = format_line_ranges(&file.missed_lines, &file.executable_lines);
                    writeln!(out, "  {}  missed: {missed}", file.name).unwrap();
                }
            }
        }

        out
    }
}

/// Markdown formatter.
pub struct MarkdownFormatter;

impl ReportFormatter for MarkdownFormatter {
    fn format(&self, report: &ReportDocument) -> String {
        let options = &report.options;
        let mut md = String::new();

        let pct = report.totals.line_rate().unwrap_or(0.0) * 100.0;
        writeln!(md, "### {}: {pct:.1}%\n", report.title).unwrap();
        writeln!(md, "Generated {}", report.date).unwrap();
        if let Some(prefix) = &report.prefix {
            writeln!(md, "\nPaths are relative to `{prefix}`").unwrap();
        }

        md.push_str("\n| | Hit | Total | Coverage |\n");
        md.push_str("|:--|--:|--:|--:|\n");
        let counts = &report.summary;
        let mut kinds = vec![("Lines", counts.lines_covered, counts.lines_valid)];
        if options.function_coverage {
            kinds.push(("Functions", counts.functions_covered, counts.functions_valid));
        }
        if options.branch_coverage {
            kinds.push(("Branches", counts.branches_covered, counts.branches_valid));
        }
        for (kind, hit, total) in kinds {
            let coverage = match crate::model::rate(hit, total) {
                Some(rate) => format!("{:.1}%", rate * 100.0),
                None => "-".to_string(),
            };
            writeln!(md, "| {kind} | {hit} | {total} | {coverage} |").unwrap();
        }

        let headers: Vec<String> = header_cells(options)
            .iter()
            .map(|h| {
                let mut h = h.to_lowercase();
                h[..1].make_ascii_uppercase();
                h
            })
            .collect();
        write!(md, "\n| Directory | {} |\n", headers.join(" | ")).unwrap();
        writeln!(md, "|:--|{}", "--:|".repeat(headers.len())).unwrap();
        for entry in &report.top.entries {
            let cells = row_cells(&entry.counts, options);
            writeln!(md, "| `{}` | {} |", entry.name, cells.join(" | ")).unwrap();
        }

        let missed: Vec<&SourceFileView> = report
            .files
            .iter()
            .filter(|f| !f.missed_lines.is_empty())
            .collect();
        if missed.is_empty() {
            md.push_str("\nEvery executable line is covered.\n");
        } else {
            md.push_str("\n<details>\n<summary>Missed lines</summary>\n\n");
            for file in missed {
                let ranges = format_line_ranges(&file.missed_lines, &file.executable_lines);
                let shown = if file.dir.is_empty() {
                    file.name.clone()
                } else {
                    format!("{}/{}", file.dir, file.name)
                };
                writeln!(md, "**`{shown}`**: {ranges}\n").unwrap();
            }
            md.push_str("</details>\n");
        }

        if !report.descriptions.is_empty() {
            md.push_str("\n#### Test cases\n\n");
            for desc in &report.descriptions {
                writeln!(md, "- **{}**: {}", desc.name, desc.text.join(" ")).unwrap();
            }
        }

        md
    }
}

/// JSON formatter exposing the full document.
pub struct JsonFormatter;

impl ReportFormatter for JsonFormatter {
    fn format(&self, report: &ReportDocument) -> String {
        let mut json =
            serde_json::to_string_pretty(report).expect("report views always serialize");
        json.push('\n');
        json
    }
}

/// Maximum number of consecutive non-executable lines that can be bridged
/// when coalescing missed ranges.
const MAX_BRIDGE_GAP: u32 = 2;

/// Coalesce sorted line numbers into `(start, end)` ranges, bridging small
/// gaps where every line in the gap is non-executable.
///
/// Both `lines` and `executable` must be sorted and deduplicated.
#[must_use]
pub fn coalesce_ranges(lines: &[u32], executable: &[u32]) -> Vec<(u32, u32)> {
    let Some((&first, rest)) = lines.split_first() else {
        return Vec::new();
    };

    let mut ranges = Vec::new();
    let (mut start, mut end) = (first, first);
    for &line in rest {
        let gap = line - end - 1;
        if gap <= MAX_BRIDGE_GAP && (end + 1..line).all(|l| executable.binary_search(&l).is_err())
        {
            end = line;
        } else {
            ranges.push((start, end));
            start = line;
            end = line;
        }
    }
    ranges.push((start, end));
    ranges
}

/// Format line numbers into compact range notation, e.g. "1, 3-5, 8".
#[must_use]
pub fn format_line_ranges(lines: &[u32], executable: &[u32]) -> String {
    coalesce_ranges(lines, executable)
        .iter()
        .map(|&(start, end)| {
            if start == end {
                start.to_string()
            } else {
                format!("{start}-{end}")
            }
        })
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::HitMode;
    use crate::parsers::desc::Descriptions;
    use crate::parsers::{lcov, ParseMode};
    use crate::registry::Registry;
    use crate::source::SourceOptions;

    fn run(input: &str, no_source: bool) -> CoverageRun {
        let options = SourceOptions {
            no_source,
            base_dir: std::env::temp_dir().join("covtree-missing-sources"),
            ..SourceOptions::default()
        };
        let mut registry = Registry::new();
        let stats = lcov::parse_str(&mut registry, &options, ParseMode::Trace, input);
        CoverageRun {
            registry,
            title: "unit".to_string(),
            test_names: stats.test_names.clone(),
            descriptions: Descriptions::default(),
            prefix: None,
            summary: Default::default(),
        }
    }

    const INPUT: &str = "\
TN:t
SF:/p/a.c
FN:1,main
FNDA:1,main
DA:1,1
DA:2,1
DA:4,0
DA:5,0
BRDA:2,0,0,1
BRDA:2,0,1,0
end_of_record
";

    #[test]
    fn test_summary_lines() {
        let counts = Counts {
            lines_valid: 6,
            lines_covered: 5,
            ..Counts::default()
        };
        let lines = summary_lines(&counts, &ReportOptions::default());
        assert_eq!(lines[0], "lines......: 83.3% (5 of 6 lines)");
        assert_eq!(lines[1], "functions..: no data found");
        assert_eq!(lines[2], "branches...: no data found");

        let options = ReportOptions {
            branch_coverage: false,
            ..ReportOptions::default()
        };
        assert_eq!(summary_lines(&counts, &options).len(), 2);
    }

    #[test]
    fn test_rating() {
        let options = ReportOptions::default();
        assert_eq!(options.rating(Some(0.95)), Some(Rating::High));
        assert_eq!(options.rating(Some(0.90)), Some(Rating::High));
        assert_eq!(options.rating(Some(0.80)), Some(Rating::Medium));
        assert_eq!(options.rating(Some(0.10)), Some(Rating::Low));
        assert_eq!(options.rating(None), None);
    }

    #[test]
    fn test_placeholder_lines_without_source() {
        let run = run(INPUT, false);
        let doc = ReportDocument::build(&run, ReportOptions::default());
        let lines = &doc.files[0].lines;

        let numbers: Vec<u32> = lines.iter().map(|l| l.number).collect();
        assert_eq!(numbers, vec![1, 2, 3, 4, 5]);
        assert!(lines.iter().all(|l| l.code.as_deref() == Some(NO_SOURCE_CODE)));
        assert_eq!(lines[2].hits, None);
        assert_eq!(lines[0].hits, Some(1));
        assert_eq!(lines[1].branches.len(), 2);
    }

    #[test]
    fn test_no_placeholders_when_source_disabled() {
        let run = run(INPUT, true);
        let options = ReportOptions {
            no_source: true,
            ..ReportOptions::default()
        };
        let doc = ReportDocument::build(&run, options);
        let numbers: Vec<u32> = doc.files[0].lines.iter().map(|l| l.number).collect();
        assert_eq!(numbers, vec![1, 2, 4, 5]);
        assert!(doc.files[0].lines.iter().all(|l| l.code.is_none()));
    }

    #[test]
    fn test_json_output_contract() {
        let run = run(INPUT, true);
        let doc = ReportDocument::build(&run, ReportOptions::default()).with_date("2024-01-02");
        let json: serde_json::Value = serde_json::from_str(&doc.format(&JsonFormatter)).unwrap();

        assert_eq!(json["date"], "2024-01-02");
        assert_eq!(json["summary"]["lines-valid"], 4);
        assert_eq!(json["summary"]["lines-covered"], 2);
        assert_eq!(json["summary"]["line-rate"], 0.5);
        assert_eq!(json["summary"]["branches-covered"], 1);
        let file = &json["files"][0];
        assert_eq!(file["functions-valid"], 1);
        assert_eq!(file["functions"][0]["line-number"], "1");
        assert_eq!(file["functions"][0]["test-hits"]["t"], 1);
        assert_eq!(file["lines"][1]["branches"][0]["taken"], 1);
        assert_eq!(file["test-cases"][0]["lines-hit"], 2);
        assert_eq!(json["directories"][0]["entries"][0]["name"], "a.c");
        assert_eq!(json["directories"][0]["entries"][0]["kind"], "file");
        assert_eq!(json["top"]["entries"][0]["kind"], "directory");
    }

    #[test]
    fn test_text_formatter() {
        let run = run(INPUT, true);
        let doc = ReportDocument::build(&run, ReportOptions::default()).with_date("2024-01-02");
        let text = doc.format(&TextFormatter);

        assert!(text.starts_with("unit (2024-01-02)\n"));
        assert!(text.contains("lines......: 50.0% (2 of 4 lines)"));
        assert!(text.contains("functions..: 100.0% (1 of 1 functions)"));
        assert!(text.contains("/p"));
        assert!(text.contains("a.c  missed: 4-5"));
    }

    #[test]
    fn test_markdown_formatter() {
        let run = run(INPUT, true);
        let options = ReportOptions {
            branch_coverage: false,
            ..ReportOptions::default()
        };
        let doc = ReportDocument::build(&run, options);
        let md = doc.format(&MarkdownFormatter);

        assert!(md.contains("### unit: 50.0%"));
        assert!(md.contains("| Lines | 2 | 4 | 50.0% |"));
        assert!(!md.contains("| Branches |"));
        assert!(md.contains("| `/p` |"));
        assert!(md.contains("**`/p/a.c`**: 4-5"));
    }

    #[test]
    fn test_line_view_hits() {
        let mut file = SourceFile::new("/x.c".into(), "/".into());
        file.line_entry(3).counter.apply("a", 2, HitMode::Accumulate);
        file.line_entry(3).counter.apply("b", 0, HitMode::Accumulate);
        let view = SourceFileView::new(&file, true);
        assert_eq!(view.lines[0].hits, Some(2));
        assert_eq!(view.lines[0].test_hits.len(), 1);
        assert_eq!(view.missed_lines, Vec::<u32>::new());
    }

    #[test]
    fn test_coalesce_ranges() {
        assert_eq!(coalesce_ranges(&[], &[]), Vec::<(u32, u32)>::new());
        assert_eq!(coalesce_ranges(&[1, 2, 3], &[1, 2, 3]), vec![(1, 3)]);
        // 3 is not executable
        assert_eq!(coalesce_ranges(&[1, 2, 4, 5], &[1, 2, 4, 5]), vec![(1, 5)]);
        // 3 is executable and covered
        assert_eq!(
            coalesce_ranges(&[1, 2, 4, 5], &[1, 2, 3, 4, 5]),
            vec![(1, 2), (4, 5)]
        );
        assert_eq!(
            coalesce_ranges(&[1, 2, 6, 7], &[1, 2, 6, 7]),
            vec![(1, 2), (6, 7)]
        );
    }

    #[test]
    fn test_format_line_ranges() {
        assert_eq!(
            format_line_ranges(&[1, 3, 4, 5, 10], &[1, 2, 3, 4, 5, 6, 7, 8, 9, 10]),
            "1, 3-5, 10"
        );
    }
}
