pub mod audit;
pub mod error;
pub mod extractors;
pub mod highlight;
pub mod matcher;
pub mod normalize;
pub mod patterns;
pub mod progress;
pub mod ruleset;
pub mod segmenter;
pub mod terms;
pub mod validator;

pub use audit::{AuditService, JsonAuditFile};
pub use error::{AuditError, ReconstructError, RulesetError};
pub use normalize::Normalizer;
pub use progress::{MonotonicProgress, NoProgress, ProgressSink, TracingProgress};
pub use ruleset::{RoleMarker, Ruleset, RulesetOverrides, RulesetVersion};
pub use terms::TermSet;
pub use validator::{Rejection, TermValidator};

use shared_types::{
    CandidateTerm, HighlightReport, Paragraph, ParagraphSequence, SegmentSkip, TermSource,
};
use tracing::{debug, info, warn};

use crate::extractors::{extract_process_numbers, MarkerExtractor};
use crate::highlight::{reconstruct, SpanResolver};
use crate::progress::scaled;
use crate::segmenter::PublicationSegmenter;

/// Paragraphs between progress checkpoints
pub const DEFAULT_CHECKPOINT_INTERVAL: usize = 250;

/// Outcome of the extraction pass
#[derive(Debug, Clone, Default)]
pub struct Extraction {
    pub terms: TermSet,
    pub paragraphs: usize,
    pub publications: usize,
    pub skipped: Vec<SegmentSkip>,
}

/// Outcome of the highlight pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HighlightPass {
    pub spans_highlighted: usize,
    pub paragraphs_rewritten: usize,
    pub paragraphs_failed: Vec<usize>,
}

/// HighlightEngine entry point
pub struct HighlightEngine {
    ruleset: Ruleset,
    normalizer: Normalizer,
    extractor: MarkerExtractor,
    audit: Option<Box<dyn AuditService>>,
    checkpoint_interval: usize,
}

impl HighlightEngine {
    pub fn new(ruleset: Ruleset) -> Self {
        Self {
            normalizer: Normalizer::new(&ruleset),
            extractor: MarkerExtractor::new(&ruleset),
            ruleset,
            audit: None,
            checkpoint_interval: DEFAULT_CHECKPOINT_INTERVAL,
        }
    }

    pub fn with_audit(mut self, audit: Box<dyn AuditService>) -> Self {
        self.audit = Some(audit);
        self
    }

    pub fn with_checkpoint_interval(mut self, interval: usize) -> Self {
        self.checkpoint_interval = interval.max(1);
        self
    }

    pub fn ruleset(&self) -> &Ruleset {
        &self.ruleset
    }

    pub fn normalizer(&self) -> &Normalizer {
        &self.normalizer
    }

    fn normalized_text<D>(&self, doc: &D, index: usize) -> String
    where
        D: ParagraphSequence + ?Sized,
    {
        doc.paragraph(index)
            .map(|p| self.normalizer.normalize(&p.text()))
            .unwrap_or_default()
    }

    /// Pass 1: stream paragraphs into publications and build the term set
    pub fn collect_terms<D>(&self, doc: &D, progress: &mut dyn ProgressSink) -> Extraction
    where
        D: ParagraphSequence + ?Sized,
    {
        let total = doc.paragraph_count();
        let interval = self.checkpoint_interval;
        let mut extraction = Extraction {
            paragraphs: total,
            ..Extraction::default()
        };
        let mut full_text = self.audit.as_ref().map(|_| String::new());

        progress.update("Extracting names and case numbers", 30);
        {
            let paragraphs = (0..total)
                .map(|i| (i, self.normalized_text(doc, i)))
                .inspect(|(i, _)| {
                    if (i + 1) % interval == 0 {
                        progress.update(
                            "Extracting names and case numbers",
                            scaled(30, 59, i + 1, total),
                        );
                    }
                });

            for publication in PublicationSegmenter::new(paragraphs) {
                extraction.publications += 1;
                if let Some(full_text) = full_text.as_mut() {
                    full_text.push_str(&publication.text);
                    full_text.push('\n');
                }

                extraction
                    .terms
                    .extend(extract_process_numbers(&publication.text));

                match self.extractor.extract(&publication.text) {
                    Ok(candidates) => {
                        debug!(
                            publication = publication.index,
                            candidates = candidates.len(),
                            "Extracted candidates"
                        );
                        extraction.terms.extend(candidates);
                    }
                    Err(reason) => {
                        debug!(publication = publication.index, %reason, "Skipped publication");
                        extraction.skipped.push(SegmentSkip {
                            publication: publication.index,
                            first_paragraph: publication.paragraphs.first().copied(),
                            reason,
                        });
                    }
                }
            }
        }

        for term in &self.ruleset.manual_terms {
            match self.extractor.validator().check(term) {
                Ok(()) => {
                    extraction.terms.insert_text(term, TermSource::Manual);
                }
                Err(rejection) => warn!(term = %term, reason = %rejection, "Ignoring manual term"),
            }
        }

        if let (Some(audit), Some(full_text)) = (self.audit.as_ref(), full_text) {
            self.apply_audit(audit.as_ref(), &full_text, &mut extraction.terms);
        }

        info!(
            paragraphs = extraction.paragraphs,
            publications = extraction.publications,
            terms = extraction.terms.len(),
            skipped = extraction.skipped.len(),
            "Extraction complete"
        );
        progress.update("Names and case numbers extracted", 60);
        extraction
    }

    fn apply_audit(&self, audit: &dyn AuditService, full_text: &str, terms: &mut TermSet) {
        let known = terms.texts();
        match audit.propose(full_text, &known) {
            Ok(proposals) => {
                let mut accepted = 0;
                for name in proposals {
                    match self.extractor.validator().check(&name) {
                        Ok(()) => {
                            if terms.insert_text(&name, TermSource::Audit) {
                                accepted += 1;
                            }
                        }
                        Err(rejection) => {
                            debug!(name = %name, reason = %rejection, "Rejected audit proposal")
                        }
                    }
                }
                info!(accepted, "Audit proposals merged");
            }
            Err(e) => warn!(error = %e, "Audit service failed, continuing without it"),
        }
    }

    /// Pass 2: resolve spans in every paragraph and rewrite the ones that match
    pub fn apply_highlights<D>(
        &self,
        doc: &mut D,
        terms: &[CandidateTerm],
        progress: &mut dyn ProgressSink,
    ) -> HighlightPass
    where
        D: ParagraphSequence + ?Sized,
    {
        let total = doc.paragraph_count();
        let resolver = SpanResolver::new(terms, self.ruleset.whole_word_matching);
        let mut pass = HighlightPass::default();

        progress.update("Applying highlights", 70);
        for index in 0..total {
            if (index + 1) % self.checkpoint_interval == 0 {
                progress.update("Applying highlights", scaled(70, 89, index + 1, total));
            }

            let text = self.normalized_text(doc, index);
            let spans = resolver.resolve(&text);
            if spans.is_empty() {
                continue;
            }

            let Some(paragraph) = doc.paragraph_mut(index) else {
                warn!(paragraph = index, "Paragraph cannot be rewritten, highlights skipped");
                pass.paragraphs_failed.push(index);
                continue;
            };
            match reconstruct(paragraph, &text, &spans) {
                Ok(true) => {
                    pass.paragraphs_rewritten += 1;
                    pass.spans_highlighted += spans.len();
                }
                Ok(false) => {}
                Err(e) => {
                    warn!(paragraph = index, error = %e, "Reconstruction failed, paragraph left untouched");
                    pass.paragraphs_failed.push(index);
                }
            }
        }

        info!(
            spans = pass.spans_highlighted,
            rewritten = pass.paragraphs_rewritten,
            failed = pass.paragraphs_failed.len(),
            "Highlighting complete"
        );
        pass
    }

    /// Run both passes over a document
    pub fn process<D>(&self, doc: &mut D, progress: &mut dyn ProgressSink) -> HighlightReport
    where
        D: ParagraphSequence + ?Sized,
    {
        let extraction = self.collect_terms(doc, progress);
        let terms = extraction.terms.into_vec();
        let pass = self.apply_highlights(doc, &terms, progress);

        HighlightReport {
            paragraphs: extraction.paragraphs,
            publications: extraction.publications,
            terms,
            spans_highlighted: pass.spans_highlighted,
            paragraphs_rewritten: pass.paragraphs_rewritten,
            paragraphs_failed: pass.paragraphs_failed,
            skipped_publications: extraction.skipped,
        }
    }

    /// Term set of a plain-text document, one paragraph per line (for testing)
    pub fn extract_text(&self, text: &str) -> Vec<CandidateTerm> {
        let doc: Vec<Paragraph> = text.lines().map(Paragraph::from_text).collect();
        self.collect_terms(&doc, &mut NoProgress).terms.into_vec()
    }
}

impl Default for HighlightEngine {
    fn default() -> Self {
        Self::new(Ruleset::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use shared_types::SkipReason;

    const NOTICE: &str = "1. PROCESSO 0001234-56.2023.8.26.0100 - Procedimento Comum
Parte(s): BANCO DO BRASIL S.A. OAB SP-123456 Advogado(s): MARIA SOUZA OAB: 98765
2. PROCESSO 1.0000.24.175224-5/004 - Agravo
Agravante: ACME COMÉRCIO LTDA Agravado: JOSÉ DA SILVA Relator: Des. FULANO";

    fn texts(terms: &[CandidateTerm]) -> Vec<&str> {
        terms.iter().map(|t| t.text.as_str()).collect()
    }

    #[test]
    fn test_engine_extracts_names_and_case_numbers() {
        let engine = HighlightEngine::default();
        let terms = engine.extract_text(NOTICE);
        assert_eq!(
            texts(&terms),
            vec![
                "0001234-56.2023.8.26.0100",
                "BANCO DO BRASIL S.A.",
                "MARIA SOUZA",
                "1.0000.24.175224-5/004",
                "ACME COMÉRCIO LTDA",
                "JOSÉ DA SILVA",
            ]
        );
        assert_eq!(terms[0].source, TermSource::ProcessNumber);
        assert_eq!(terms[4].source, TermSource::Role("agravante".into()));
    }

    #[test]
    fn test_engine_highlights_paragraphs() {
        let engine = HighlightEngine::default();
        let mut doc: Vec<Paragraph> = NOTICE.lines().map(Paragraph::from_text).collect();
        let report = engine.process(&mut doc, &mut NoProgress);

        assert_eq!(report.paragraphs, 4);
        assert_eq!(report.publications, 2);
        assert_eq!(report.paragraphs_rewritten, 4);
        assert_eq!(report.spans_highlighted, 6);
        assert!(report.paragraphs_failed.is_empty());

        let highlighted: Vec<String> = doc[1]
            .runs()
            .iter()
            .filter(|r| r.highlight)
            .map(|r| r.text.clone())
            .collect();
        assert_eq!(highlighted, vec!["BANCO DO BRASIL S.A.", "MARIA SOUZA"]);
    }

    #[test]
    fn test_every_highlight_passes_validation_unless_case_number() {
        let engine = HighlightEngine::default();
        let validator = TermValidator::new(engine.ruleset());
        let mut doc: Vec<Paragraph> = NOTICE.lines().map(Paragraph::from_text).collect();
        let report = engine.process(&mut doc, &mut NoProgress);

        for term in &report.terms {
            assert!(
                term.source.bypasses_validation() || validator.is_valid(&term.text),
                "{} should have been rejected",
                term.text
            );
        }
    }

    #[test]
    fn test_manual_terms_are_validated() {
        let mut ruleset = Ruleset::default();
        ruleset.manual_terms = vec!["FULANO DE TAL".into(), "PODER JUDICIÁRIO".into()];
        let engine = HighlightEngine::new(ruleset);
        let terms = engine.extract_text("Intimação de FULANO DE TAL");
        assert_eq!(
            terms,
            vec![CandidateTerm::new("FULANO DE TAL", TermSource::Manual)]
        );
    }

    #[test]
    fn test_skipped_publications_are_reported() {
        let engine = HighlightEngine::default();
        let mut doc = vec![
            Paragraph::from_text("1. EDITAL sem partes"),
            Paragraph::from_text("2. PROCESSO"),
            Paragraph::from_text("Parte(s): JOSÉ DA SILVA Intimação"),
        ];
        let report = engine.process(&mut doc, &mut NoProgress);
        assert_eq!(
            report.skipped_publications,
            vec![SegmentSkip {
                publication: 0,
                first_paragraph: Some(0),
                reason: SkipReason::NoRoleMarker,
            }]
        );
        assert_eq!(report.spans_highlighted, 1);
    }

    struct FailingAudit;

    impl AuditService for FailingAudit {
        fn propose(&self, _: &str, _: &[String]) -> Result<Vec<String>, AuditError> {
            Err(AuditError::Unavailable("offline".into()))
        }
    }

    #[test]
    fn test_audit_failure_is_ignored() {
        let engine = HighlightEngine::default().with_audit(Box::new(FailingAudit));
        let terms = engine.extract_text("Parte(s): JOSÉ DA SILVA Intimação");
        assert_eq!(texts(&terms), vec!["JOSÉ DA SILVA"]);
    }

    #[test]
    fn test_audit_proposals_are_validated() {
        let audit = JsonAuditFile::from_names(vec!["Pedro Lima".into(), "Vara Cível".into()]);
        let engine = HighlightEngine::default().with_audit(Box::new(audit));
        let terms = engine.extract_text("Pedro Lima compareceu à Vara Cível");
        assert_eq!(
            terms,
            vec![CandidateTerm::new("Pedro Lima", TermSource::Audit)]
        );
    }

    #[test]
    fn test_progress_is_reported_at_checkpoints() {
        let engine = HighlightEngine::default().with_checkpoint_interval(1);
        let mut doc: Vec<Paragraph> = NOTICE.lines().map(Paragraph::from_text).collect();
        let mut seen = Vec::new();
        let mut sink = |_: &str, percent: u8| seen.push(percent);
        engine.process(&mut doc, &mut sink);

        assert_eq!(seen.first(), Some(&30));
        assert!(seen.contains(&60));
        assert!(seen.contains(&70));
        assert!(seen.windows(2).all(|w| w[0] <= w[1]));
        assert!(seen.iter().all(|p| *p < 90));
    }
}
