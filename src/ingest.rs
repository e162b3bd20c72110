use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::config::Config;
use crate::error::{CovtreeError, Result};
use crate::input::open_tracefile;
use crate::parsers::desc::Descriptions;
use crate::parsers::lcov::TraceFileParser;
use crate::parsers::{ParseMode, ParseStats};
use crate::prefix::{choose_prefix, strip_prefix};
use crate::registry::Registry;
use crate::source::SourceOptions;

/// Title used when neither the configuration nor a single tracefile names the
/// report.
pub const DEFAULT_TITLE: &str = "unnamed";

/// What happened while reading the inputs of a run.
#[derive(Debug, Clone, Default)]
pub struct IngestSummary {
    /// Tracefiles that were read.
    pub read: usize,
    /// Tracefiles that did not exist and were skipped.
    pub missing: Vec<PathBuf>,
    /// Parse results summed over every tracefile read.
    pub stats: ParseStats,
    /// Parse results of the baseline file, when one was given.
    pub baseline: Option<ParseStats>,
}

/// Everything a report is built from.
#[derive(Debug)]
pub struct CoverageRun {
    pub registry: Registry,
    pub title: String,
    /// Non-empty test case names seen in the tracefiles.
    pub test_names: BTreeSet<String>,
    pub descriptions: Descriptions,
    /// Prefix stripped from display directories.
    pub prefix: Option<String>,
    pub summary: IngestSummary,
}

/// Read `tracefiles`, then the baseline and description files named in
/// `config`, and shorten the display paths of the result.
///
/// Relative `SF:` paths are resolved against `base_dir`. Tracefiles that do
/// not exist are skipped; any other read failure aborts the run, as does a run
/// that found no source files at all.
pub fn ingest(tracefiles: &[PathBuf], config: &Config, base_dir: &Path) -> Result<CoverageRun> {
    config.validate()?;
    let options = config.source_options(base_dir);
    let mut registry = Registry::new();
    let mut summary = IngestSummary::default();

    for path in tracefiles {
        if !path.exists() {
            warn!("Tracefile {} does not exist, skipping", path.display());
            summary.missing.push(path.clone());
            continue;
        }
        info!("Reading data file {}", path.display());
        let stats = parse_file(&mut registry, &options, ParseMode::Trace, path, None)?;
        log_stats(path, &stats);
        summary.stats.merge(stats);
        summary.read += 1;
    }

    if registry.is_empty() {
        return Err(CovtreeError::NoSourceFiles);
    }
    info!("Found {} entries", registry.len());

    if let Some(baseline) = &config.baseline_file {
        info!("Reading baseline file {}", baseline.display());
        let stats = parse_file(&mut registry, &options, ParseMode::Baseline, baseline, None)?;
        log_stats(baseline, &stats);
        summary.baseline = Some(stats);
    }

    let test_names = summary.stats.test_names.clone();
    let mut descriptions = Descriptions::default();
    if let Some(desc) = &config.description_file {
        info!("Reading test description file {}", desc.display());
        parse_file(
            &mut registry,
            &options,
            ParseMode::Description,
            desc,
            Some(&mut descriptions),
        )?;
        if !config.keep_descriptions {
            descriptions.retain_run(&test_names);
        }
    }

    let prefix = choose_prefix(&registry, config.prefix.as_deref(), config.no_prefix);
    if let Some(prefix) = &prefix {
        let stripped = strip_prefix(&mut registry, prefix);
        debug!("Stripped prefix {prefix} from {stripped} files");
    }

    Ok(CoverageRun {
        registry,
        title: report_title(config, tracefiles),
        test_names,
        descriptions,
        prefix,
        summary,
    })
}

/// The configured title, else the name of the only tracefile.
pub fn report_title(config: &Config, tracefiles: &[PathBuf]) -> String {
    if let Some(title) = &config.title {
        return title.clone();
    }
    match tracefiles {
        [single] => single
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or(DEFAULT_TITLE)
            .to_string(),
        _ => DEFAULT_TITLE.to_string(),
    }
}

fn parse_file(
    registry: &mut Registry,
    options: &SourceOptions,
    mode: ParseMode,
    path: &Path,
    descriptions: Option<&mut Descriptions>,
) -> Result<ParseStats> {
    let (mut reader, compression) = open_tracefile(path)?;
    debug!("Opened {} ({compression})", path.display());

    let mut parser = TraceFileParser::new(registry, options, mode);
    if let Some(descriptions) = descriptions {
        parser = parser.with_descriptions(descriptions);
    }
    parser
        .parse_reader(&mut reader)
        .map_err(|source| CovtreeError::TraceFile {
            path: path.to_path_buf(),
            source,
        })?;
    Ok(parser.finish())
}

fn log_stats(path: &Path, stats: &ParseStats) {
    if stats.skipped > 0 || stats.violations > 0 {
        warn!(
            "{}: skipped {} malformed records and {} records outside a source file",
            path.display(),
            stats.skipped,
            stats.violations
        );
    }
}
