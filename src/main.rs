use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use covtree::cli::{self, Style};
use covtree::config::Config;
use covtree::ingest::{self, CoverageRun};
use covtree::report::ReportOptions;

/// Aggregate LCOV tracefiles into a hierarchical coverage report.
#[derive(Parser)]
#[command(name = "covtree", version, about)]
struct Cli {
    /// Only log warnings and errors.
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Log debug details (skipped records, unreadable sources).
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Options shared by every command that reads tracefiles.
#[derive(Args)]
struct RunArgs {
    /// Tracefiles to read (optionally gzip compressed).
    #[arg(required = true)]
    tracefiles: Vec<PathBuf>,

    /// TOML configuration file; command line flags take precedence.
    #[arg(long)]
    config_file: Option<PathBuf>,

    /// Tracefile whose counts are subtracted from the result.
    #[arg(short, long)]
    baseline_file: Option<PathBuf>,

    /// Test case descriptions produced by gendesc.
    #[arg(short, long)]
    description_file: Option<PathBuf>,

    /// Keep descriptions of test cases that are not part of the run.
    #[arg(long)]
    keep_descriptions: bool,

    /// Prefix to strip from displayed directories.
    #[arg(short, long)]
    prefix: Option<String>,

    /// Do not strip any prefix.
    #[arg(long)]
    no_prefix: bool,

    /// Do not read source files.
    #[arg(long)]
    no_source: bool,

    /// Replace tabs in source text with this many spaces.
    #[arg(long)]
    num_spaces: Option<usize>,

    /// Report title (default: tracefile name).
    #[arg(short, long)]
    title: Option<String>,

    /// Hide function coverage.
    #[arg(long)]
    no_function_coverage: bool,

    /// Hide branch coverage.
    #[arg(long)]
    no_branch_coverage: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the coverage report.
    Report {
        #[command(flatten)]
        run: RunArgs,

        /// Output style.
        #[arg(long, value_enum, default_value = "text")]
        style: Style,

        /// Write the report to a file instead of stdout.
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Show a summary of the run.
    Summary {
        #[command(flatten)]
        run: RunArgs,
    },

    /// List per-file coverage.
    Files {
        #[command(flatten)]
        run: RunArgs,

        /// Sort by coverage rate ascending (show worst files first).
        #[arg(long)]
        sort_by_coverage: bool,
    },

    /// Show line-level coverage for a source file.
    Lines {
        /// The source file, by full or displayed path.
        #[arg(long)]
        source_file: String,

        #[command(flatten)]
        run: RunArgs,

        /// Show only uncovered lines.
        #[arg(long)]
        uncovered: bool,
    },
}

impl RunArgs {
    /// Merge the configuration file with command line flags.
    fn config(&self) -> Result<Config> {
        let mut config = match &self.config_file {
            Some(path) => Config::from_file(path)?,
            None => Config::default(),
        };

        if self.baseline_file.is_some() {
            config.baseline_file.clone_from(&self.baseline_file);
        }
        if self.description_file.is_some() {
            config.description_file.clone_from(&self.description_file);
        }
        if self.prefix.is_some() {
            config.prefix.clone_from(&self.prefix);
        }
        if self.title.is_some() {
            config.title.clone_from(&self.title);
        }
        if self.num_spaces.is_some() {
            config.num_spaces = self.num_spaces;
        }
        config.keep_descriptions |= self.keep_descriptions;
        config.no_prefix |= self.no_prefix;
        config.no_source |= self.no_source;
        config.function_coverage &= !self.no_function_coverage;
        config.branch_coverage &= !self.no_branch_coverage;

        config.validate()?;
        Ok(config)
    }

    fn ingest(&self) -> Result<(CoverageRun, Config)> {
        let config = self.config()?;
        let base_dir = std::env::current_dir().context("Failed to resolve working directory")?;
        let run = ingest::ingest(&self.tracefiles, &config, &base_dir)
            .context("Failed to read coverage data")?;
        Ok((run, config))
    }
}

fn init_tracing(quiet: bool, verbose: bool) {
    let level = if quiet {
        "warn"
    } else if verbose {
        "debug"
    } else {
        "info"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .with(filter)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.quiet, cli.verbose);

    let output = match cli.command {
        Commands::Report { run, style, output } => {
            let (coverage, config) = run.ingest()?;
            let report = cli::cmd_report(&coverage, ReportOptions::from(&config), style)?;
            match output {
                Some(path) => {
                    std::fs::write(&path, &report)
                        .with_context(|| format!("Failed to write {}", path.display()))?;
                    return Ok(());
                }
                None => report,
            }
        }
        Commands::Summary { run } => {
            let (coverage, config) = run.ingest()?;
            cli::cmd_summary(&coverage, &ReportOptions::from(&config))?
        }
        Commands::Files {
            run,
            sort_by_coverage,
        } => {
            let (coverage, _) = run.ingest()?;
            cli::cmd_files(&coverage, sort_by_coverage)?
        }
        Commands::Lines {
            source_file,
            run,
            uncovered,
        } => {
            let (coverage, _) = run.ingest()?;
            cli::cmd_lines(&coverage, &source_file, uncovered)?
        }
    };

    print!("{output}");
    Ok(())
}
