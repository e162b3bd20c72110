//! Command handler functions for the covtree CLI.
//!
//! Each `cmd_*` function returns its output as a `String`, making them easy
//! to test without capturing stdout.

use std::fmt::Write;

use anyhow::{bail, Result};
use clap::ValueEnum;

use crate::ingest::CoverageRun;
use crate::model::{Counted, SourceFile};
use crate::report::{
    self, JsonFormatter, MarkdownFormatter, ReportDocument, ReportFormatter, ReportOptions,
    TextFormatter,
};

/// Output style for the `report` command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Style {
    Text,
    Markdown,
    Json,
}

impl Style {
    fn formatter(self) -> &'static dyn ReportFormatter {
        match self {
            Style::Text => &TextFormatter,
            Style::Markdown => &MarkdownFormatter,
            Style::Json => &JsonFormatter,
        }
    }
}

pub fn cmd_report(run: &CoverageRun, options: ReportOptions, style: Style) -> Result<String> {
    report::log_summary(&run.registry.counts(), &options);
    let document = ReportDocument::build(run, options);
    Ok(document.format(style.formatter()))
}

pub fn cmd_summary(run: &CoverageRun, options: &ReportOptions) -> Result<String> {
    let mut out = String::new();
    writeln!(out, "Title:      {}", run.title).unwrap();
    writeln!(
        out,
        "Tracefiles: {} read, {} missing",
        run.summary.read,
        run.summary.missing.len()
    )
    .unwrap();
    writeln!(out, "Files:      {}", run.registry.len()).unwrap();
    if !run.test_names.is_empty() {
        let names: Vec<&str> = run.test_names.iter().map(String::as_str).collect();
        writeln!(out, "Tests:      {}", names.join(", ")).unwrap();
    }
    if let Some(prefix) = &run.prefix {
        writeln!(out, "Prefix:     {prefix}").unwrap();
    }
    let stats = &run.summary.stats;
    if stats.skipped > 0 || stats.violations > 0 {
        writeln!(
            out,
            "Skipped:    {} malformed, {} out of place",
            stats.skipped, stats.violations
        )
        .unwrap();
    }
    for line in report::summary_lines(&run.registry.counts(), options) {
        writeln!(out, "{line}").unwrap();
    }
    Ok(out)
}

fn display_path(file: &SourceFile) -> String {
    if file.dir().is_empty() {
        file.name().to_string()
    } else {
        format!("{}/{}", file.dir(), file.name())
    }
}

pub fn cmd_files(run: &CoverageRun, sort_by_coverage: bool) -> Result<String> {
    let mut files: Vec<(String, crate::model::Counts)> = run
        .registry
        .iter()
        .map(|file| (display_path(file), file.counts()))
        .collect();

    if sort_by_coverage {
        files.sort_by(|a, b| {
            let a = a.1.line_rate().unwrap_or(0.0);
            let b = b.1.line_rate().unwrap_or(0.0);
            a.total_cmp(&b)
        });
    }

    let mut out = String::new();
    writeln!(
        out,
        "{:<60} {:>8} {:>8} {:>8}",
        "FILE", "LINES", "COVERED", "RATE"
    )
    .unwrap();
    writeln!(out, "{}", "-".repeat(88)).unwrap();

    for (path, counts) in &files {
        let rate = match counts.line_rate() {
            Some(rate) => format!("{:.1}%", rate * 100.0),
            None => "-".to_string(),
        };
        writeln!(
            out,
            "{:<60} {:>8} {:>8} {:>8}",
            path, counts.lines_valid, counts.lines_covered, rate
        )
        .unwrap();
    }

    Ok(out)
}

/// Find a file by canonical path or by its displayed path.
fn find_file<'a>(run: &'a CoverageRun, source_file: &str) -> Option<&'a SourceFile> {
    run.registry.iter().find(|file| {
        file.path().to_string_lossy() == source_file || display_path(file) == source_file
    })
}

pub fn cmd_lines(run: &CoverageRun, source_file: &str, uncovered: bool) -> Result<String> {
    let Some(file) = find_file(run, source_file) else {
        bail!("No coverage data for '{source_file}'");
    };
    let executable: Vec<_> = file.lines().filter(|l| l.is_executable()).collect();

    if uncovered {
        let missed: Vec<u32> = executable
            .iter()
            .filter(|l| !l.counter.is_covered())
            .map(|l| l.number())
            .collect();

        if missed.is_empty() {
            return Ok(format!(
                "All executable lines are covered in '{}'\n",
                source_file
            ));
        }

        let all: Vec<u32> = executable.iter().map(|l| l.number()).collect();
        let mut out = String::new();
        writeln!(out, "Uncovered lines in '{}':", source_file).unwrap();
        writeln!(out, "  {}", report::format_line_ranges(&missed, &all)).unwrap();
        writeln!(out, "  ({} lines)", missed.len()).unwrap();
        Ok(out)
    } else {
        let mut out = String::new();
        writeln!(out, "{:>6}  {:>10}", "LINE", "HITS").unwrap();
        writeln!(out, "{}", "-".repeat(18)).unwrap();
        for line in &executable {
            let hits = line.total_hits();
            let marker = if hits > 0 { "✓" } else { "✗" };
            let code = line.code().unwrap_or("");
            writeln!(out, "{:>6}  {:>10}  {}  {}", line.number(), hits, marker, code).unwrap();
        }
        Ok(out)
    }
}
