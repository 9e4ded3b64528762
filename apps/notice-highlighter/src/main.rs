//! Highlights party names and case numbers in a DOCX of judicial notices

use std::path::PathBuf;

use clap::Parser;
use notice_engine::RulesetVersion;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod run;

#[derive(Parser, Debug)]
#[command(name = "notice-highlighter")]
#[command(
    version,
    about = "Highlight party names and case numbers in judicial notice documents"
)]
struct Args {
    /// Input .docx file
    input: PathBuf,

    /// Output path (defaults to FINAL_<input name> next to the input)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Built-in ruleset: v1, v2, v3, v4 or latest
    #[arg(long, default_value = "v4", conflicts_with = "rules")]
    ruleset: RulesetVersion,

    /// TOML file layered over a built-in ruleset (its `base` picks the preset)
    #[arg(long)]
    rules: Option<PathBuf>,

    /// Extra name to highlight; may be repeated
    #[arg(long = "term", value_name = "NAME")]
    terms: Vec<String>,

    /// Write the JSON report here
    #[arg(long)]
    report: Option<PathBuf>,

    /// JSON list of names proposed as additional terms
    #[arg(long, value_name = "FILE")]
    audit_terms: Option<PathBuf>,

    /// Skip stripping spell-check and language markup before reading
    #[arg(long)]
    no_sanitize: bool,

    /// Debug logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let level = if args.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env().add_directive(level.into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    tracing::info!("notice-highlighter v{}", env!("CARGO_PKG_VERSION"));

    let report = run::run(&args)?;
    println!(
        "{} highlight(s) in {} paragraph(s)",
        report.spans_highlighted, report.paragraphs_rewritten
    );
    Ok(())
}
