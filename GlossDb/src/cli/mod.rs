//! glossdb CLI - merge localization archives into one database

pub mod progress;

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Instant;

use anyhow::Context;
use clap::{Parser, ValueEnum};
use tracing::Level;

use crate::merge::MergeEngine;
use crate::options::{ConflictPolicy, ConvertOptions};
use crate::store::Store;
use progress::{DISK, PACKAGE};

/// Project conflict policy as spelled on the command line.
#[derive(Debug, Clone, Copy, ValueEnum)]
enum ConflictArg {
    /// Keep the project stored first and warn
    KeepFirst,
    /// Skip the archive that disagrees
    Fail,
}

impl From<ConflictArg> for ConflictPolicy {
    fn from(arg: ConflictArg) -> Self {
        match arg {
            ConflictArg::KeepFirst => ConflictPolicy::KeepFirst,
            ConflictArg::Fail => ConflictPolicy::Fail,
        }
    }
}

#[derive(Parser)]
#[command(name = "glossdb", version)]
#[command(about = "glossdb: merge per-language localization archives into one SQLite database", long_about = None)]
struct Cli {
    /// Archives to merge, in order (directories, .zip or .dmg)
    archives: Vec<PathBuf>,

    /// Destination database [default: ios.sqlite]
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// TOML file with conversion options
    #[arg(long)]
    config: Option<PathBuf>,

    /// What to do when a file path reappears under another project
    #[arg(long, value_enum)]
    project_conflict: Option<ConflictArg>,

    /// Only print warnings and errors
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Print debug logging
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    fn options(&self) -> anyhow::Result<ConvertOptions> {
        let mut options = match &self.config {
            Some(path) => ConvertOptions::load(path)
                .with_context(|| format!("Failed to read config {}", path.display()))?,
            None => ConvertOptions::default(),
        };
        if let Some(output) = &self.output {
            options = options.with_database(output);
        }
        if let Some(policy) = self.project_conflict {
            options = options.with_project_conflict(policy.into());
        }
        Ok(options)
    }

    fn log_level(&self) -> Level {
        if self.verbose {
            Level::DEBUG
        } else if self.quiet {
            Level::WARN
        } else {
            Level::INFO
        }
    }
}

/// Run the glossdb CLI
pub fn run_cli() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    // Setup logging
    tracing_subscriber::fmt()
        .with_max_level(cli.log_level())
        .with_writer(std::io::stderr)
        .init();

    let options = cli.options()?;
    let started = Instant::now();
    let total = cli.archives.len() + 1;

    if !cli.quiet {
        progress::print_step(1, total, DISK, &format!("Opening {}...", options.database.display()));
    }
    let store = Store::open(&options.database)
        .with_context(|| format!("Failed to open database {}", options.database.display()))?;
    let mut engine = MergeEngine::new(&store, options.clone())?;

    let summary = engine.convert_with_progress(&cli.archives, |step| {
        if !cli.quiet {
            progress::print_step(
                step.current + 1,
                total,
                PACKAGE,
                &format!("Merging {}...", step.archive.display()),
            );
        }
    });

    if !cli.quiet {
        progress::print_summary(&summary);
        progress::print_done(started.elapsed());
    }

    Ok(if summary.is_success() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
