use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use docx_io::{sanitize_container, DocxDocument};
use notice_engine::{
    HighlightEngine, JsonAuditFile, MonotonicProgress, ProgressSink, Ruleset, TracingProgress,
};
use shared_types::HighlightReport;
use tracing::{info, warn};

use crate::Args;

/// `FINAL_<name>` in the input's directory
pub fn default_output(input: &Path) -> PathBuf {
    let name = input
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "document.docx".to_string());
    input.with_file_name(format!("FINAL_{name}"))
}

pub fn load_ruleset(args: &Args) -> Result<Ruleset> {
    let mut ruleset = match &args.rules {
        Some(path) => Ruleset::from_file(path)
            .with_context(|| format!("Failed to load rules from {}", path.display()))?,
        None => Ruleset::preset(args.ruleset),
    };
    ruleset.manual_terms.extend(args.terms.iter().cloned());
    Ok(ruleset)
}

fn build_engine(args: &Args) -> Result<HighlightEngine> {
    let ruleset = load_ruleset(args)?;
    info!(ruleset = %ruleset.version, manual_terms = ruleset.manual_terms.len(), "Ruleset loaded");

    let mut engine = HighlightEngine::new(ruleset);
    if let Some(path) = &args.audit_terms {
        let audit = JsonAuditFile::open(path)
            .with_context(|| format!("Failed to load audit terms from {}", path.display()))?;
        engine = engine.with_audit(Box::new(audit));
    }
    Ok(engine)
}

fn read_document(args: &Args, progress: &mut dyn ProgressSink) -> Result<DocxDocument> {
    let bytes = std::fs::read(&args.input)
        .with_context(|| format!("Failed to read {}", args.input.display()))?;

    let bytes = if args.no_sanitize {
        bytes
    } else {
        progress.update("Cleaning document markup", 10);
        match sanitize_container(&bytes) {
            Ok(clean) => clean,
            Err(e) => {
                warn!(error = %e, "Sanitizer failed, using the original document");
                bytes
            }
        }
    };

    DocxDocument::from_bytes(&bytes)
        .with_context(|| format!("Failed to open {}", args.input.display()))
}

pub fn run(args: &Args) -> Result<HighlightReport> {
    let engine = build_engine(args)?;
    let mut progress = MonotonicProgress::new(TracingProgress);

    progress.update("Reading document", 0);
    let mut doc = read_document(args, &mut progress)?;

    let report = engine.process(&mut doc, &mut progress);

    progress.update("Saving document", 90);
    let output = args
        .output
        .clone()
        .unwrap_or_else(|| default_output(&args.input));
    doc.save(&output)
        .with_context(|| format!("Failed to write {}", output.display()))?;

    if let Some(path) = &args.report {
        let json = serde_json::to_string_pretty(&report)?;
        std::fs::write(path, json)
            .with_context(|| format!("Failed to write report {}", path.display()))?;
    }

    if !report.paragraphs_failed.is_empty() {
        warn!(
            paragraphs = ?report.paragraphs_failed,
            "Some paragraphs could not be highlighted"
        );
    }
    progress.update("Done", 100);
    info!(output = %output.display(), spans = report.spans_highlighted, "Finished");
    Ok(report)
}
