use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use tracing::{debug, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use smartdiff_core::{
    AlignerSettings, ComparisonOptions, ComparisonReport, DocumentComparer, DocumentKind,
    LineDiffSettings, SimilarityOptions,
};

const VERSION: &str = concat!(env!("CARGO_PKG_VERSION"), " (", env!("GIT_HASH"), ")");

#[derive(Parser)]
#[command(name = "smartdiff")]
#[command(version = VERSION)]
#[command(about = "Document alignment and diff tool", long_about = None)]
struct Cli {
    /// Enable debug logging (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compare two documents and print a JSON report
    Compare(CompareArgs),
    /// Print the similarity score of two strings
    Similarity {
        a: String,
        b: String,

        #[arg(long)]
        ignore_case: bool,
    },
    /// Print the content label of a line of text
    Classify { text: String },
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum KindArg {
    Auto,
    Json,
    Xml,
    Text,
    Paragraphs,
}

#[derive(clap::Args)]
struct CompareArgs {
    /// Older document
    old: PathBuf,

    /// Newer document
    new: PathBuf,

    #[arg(short, long, value_enum, default_value_t = KindArg::Auto)]
    kind: KindArg,

    /// Minimum similarity (0-1) to pair two paragraphs
    #[arg(long)]
    threshold: Option<f64>,

    /// Paragraphs to search ahead when resynchronizing
    #[arg(long)]
    look_ahead: Option<usize>,

    #[arg(long)]
    ignore_case: bool,

    /// Pair adjacent removed/added lines into modified rows (text kind)
    #[arg(long)]
    pair_modified: bool,

    /// Write the JSON report to a file instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Print a one-screen summary instead of the JSON report
    #[arg(long)]
    summary: bool,
}

#[derive(Serialize)]
struct Report<'a> {
    generated_at: DateTime<Utc>,
    tool_version: &'static str,
    old: String,
    new: String,
    comparison: &'a ComparisonReport,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| log_level.to_string()),
        ))
        .with(tracing_subscriber::fmt::layer().with_target(false).with_writer(std::io::stderr))
        .init();

    match cli.command {
        Commands::Compare(args) => run_compare(&args),
        Commands::Similarity { a, b, ignore_case } => {
            let options = SimilarityOptions::new()
                .with_ignore_case(ignore_case)
                .with_ignore_whitespace(true);
            println!("{:.4}", smartdiff_core::similarity(&a, &b, &options));
            Ok(())
        }
        Commands::Classify { text } => {
            println!("{}", smartdiff_core::classify(&text));
            Ok(())
        }
    }
}

fn run_compare(args: &CompareArgs) -> Result<()> {
    let kind = resolve_kind(args.kind, &args.old);
    info!("comparing {} and {} as {}", args.old.display(), args.new.display(), kind);

    let old_text = read_document(&args.old)?;
    let new_text = read_document(&args.new)?;

    let options = build_options(args);
    debug!(
        "threshold={} look_ahead={}",
        options.aligner.similarity_threshold, options.aligner.look_ahead_limit
    );

    let comparison = DocumentComparer::compare(kind, &old_text, &new_text, Some(&options))
        .with_context(|| format!("Failed to compare {} and {}", args.old.display(), args.new.display()))?;

    if args.summary {
        print_summary(&comparison);
        return Ok(());
    }

    let report = Report {
        generated_at: Utc::now(),
        tool_version: VERSION,
        old: args.old.display().to_string(),
        new: args.new.display().to_string(),
        comparison: &comparison,
    };
    let json = serde_json::to_string_pretty(&report).context("Failed to serialize report")?;

    match &args.output {
        Some(path) => {
            fs::write(path, json).with_context(|| format!("Failed to write {}", path.display()))?;
            info!("report written to {}", path.display());
        }
        None => println!("{}", json),
    }
    Ok(())
}

fn resolve_kind(arg: KindArg, old: &Path) -> DocumentKind {
    match arg {
        KindArg::Json => DocumentKind::Json,
        KindArg::Xml => DocumentKind::Xml,
        KindArg::Text => DocumentKind::Text,
        KindArg::Paragraphs => DocumentKind::Paragraphs,
        KindArg::Auto => DocumentKind::from_extension(old).unwrap_or_else(|e| {
            warn!("{}; falling back to text", e);
            DocumentKind::Text
        }),
    }
}

fn read_document(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))
}

fn build_options(args: &CompareArgs) -> ComparisonOptions {
    let mut aligner = AlignerSettings::new()
        .with_ignore_case(args.ignore_case)
        .with_log_callback(|message| debug!("{}", message));
    if let Some(threshold) = args.threshold {
        aligner = aligner.with_threshold(threshold);
    }
    if let Some(limit) = args.look_ahead {
        aligner = aligner.with_look_ahead(limit);
    }

    let lines = LineDiffSettings::new()
        .with_ignore_case(args.ignore_case)
        .with_pair_modified(args.pair_modified);

    ComparisonOptions::new().with_aligner(aligner).with_lines(lines)
}

fn print_summary(report: &ComparisonReport) {
    println!("kind:        {}", report.kind());
    println!("similarity:  {}%", report.similarity_percentage());
    println!("differences: {}", report.difference_count());

    let (added, removed, modified) = match report {
        ComparisonReport::Text(r) => (r.stats.added, r.stats.removed, r.stats.modified),
        ComparisonReport::Paragraphs(r) => (r.stats.added, r.stats.removed, r.stats.modified),
        ComparisonReport::Json(_) | ComparisonReport::Xml(_) => return,
    };
    println!("  added:    {}", added);
    println!("  removed:  {}", removed);
    println!("  modified: {}", modified);
}
