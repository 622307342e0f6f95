//! Document structuring and citation linking for scholarly PDFs.
//!
//! The pipeline turns raw PDF bytes into two linked tables: the document's
//! sections in reading order, and every cited reference with the sections
//! it was used in. Four sequential stages do the work:
//!
//! 1. block extraction through a [`BlockSource`] backend,
//! 2. section segmentation under a journal profile ([`segment`]),
//! 3. citation scanning over each section's text ([`scan`]),
//! 4. reference resolution against the bibliography ([`resolve`]).
//!
//! Stages two through four are pure functions over the previous stage's
//! output; cancellation is checked between stages so an abandoned run
//! stops promptly.

pub mod config;
pub mod resolve;
pub mod scan;
pub mod segment;

pub use config::{EngineConfig, EngineConfigBuilder, ListOverride};
pub use resolve::Resolution;
pub use scan::ScanOutcome;
pub use segment::Segmentation;

use std::time::Instant;

use citelink_core::{
    BlockSource, Conversion, ConversionStats, ConversionWarning, ExtractionError, ProfileRegistry,
};
use thiserror::Error;
use tokio_util::sync::CancellationToken;

/// Errors that abort a conversion outright. Everything else degrades into
/// warnings on a best-effort [`Conversion`].
#[derive(Error, Debug)]
pub enum ConversionError {
    #[error(transparent)]
    Extraction(#[from] ExtractionError),
    /// The caller cancelled the run at a stage boundary.
    #[error("conversion cancelled")]
    Cancelled,
}

/// Convert one PDF into sections and linked references.
///
/// `deadline` bounds the extraction stage, which is where pathological PDFs
/// hang; the later stages are cheap in comparison. `cancel` is observed at
/// every stage boundary.
pub fn convert(
    bytes: &[u8],
    journal_id: &str,
    registry: &ProfileRegistry,
    config: &EngineConfig,
    source: &dyn BlockSource,
    deadline: Option<Instant>,
    cancel: &CancellationToken,
) -> Result<Conversion, ConversionError> {
    let profile = registry.get(journal_id);
    tracing::debug!(journal = %profile.id, bytes = bytes.len(), "starting conversion");

    let blocks = source.extract_blocks(bytes, deadline)?;
    if cancel.is_cancelled() {
        return Err(ConversionError::Cancelled);
    }
    let pages = blocks.iter().map(|b| b.page).max().unwrap_or(0) as usize;
    tracing::debug!(blocks = blocks.len(), pages, "extracted blocks");

    let segmentation = segment::segment(&blocks, profile, config);
    if cancel.is_cancelled() {
        return Err(ConversionError::Cancelled);
    }
    tracing::debug!(
        sections = segmentation.sections.len(),
        degraded = segmentation.degraded,
        "segmented document"
    );

    let outcome = scan::scan_sections(&segmentation, profile, config);
    if cancel.is_cancelled() {
        return Err(ConversionError::Cancelled);
    }
    tracing::debug!(
        occurrences = outcome.occurrences.len(),
        bracketed_numerals = outcome.bracketed_numerals,
        "scanned citations"
    );

    let resolution = resolve::resolve(&segmentation, &outcome.occurrences, config);
    if cancel.is_cancelled() {
        return Err(ConversionError::Cancelled);
    }
    let Resolution {
        references,
        warnings: unresolved,
    } = resolution;

    let mut warnings = Vec::new();
    if segmentation.degraded {
        warnings.push(ConversionWarning::SegmentationDegraded);
    }
    if outcome.occurrences.is_empty()
        && outcome.bracketed_numerals >= config.bracket_census_threshold
    {
        warnings.push(ConversionWarning::CitationCoverage {
            bracketed_numerals: outcome.bracketed_numerals,
        });
    }
    let unresolved_references = unresolved.len();
    warnings.extend(unresolved);

    let stats = ConversionStats {
        pages,
        blocks: blocks.len(),
        sections: segmentation.sections.len(),
        occurrences: outcome.occurrences.len(),
        references: references.len(),
        unresolved_references,
    };

    Ok(Conversion {
        sections: segmentation.sections,
        references,
        warnings,
        stats,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use citelink_core::{BlockKind, TextBlock};

    struct StubSource(Vec<TextBlock>);

    impl BlockSource for StubSource {
        fn extract_blocks(
            &self,
            _bytes: &[u8],
            _deadline: Option<Instant>,
        ) -> Result<Vec<TextBlock>, ExtractionError> {
            Ok(self.0.clone())
        }
    }

    struct FailingSource;

    impl BlockSource for FailingSource {
        fn extract_blocks(
            &self,
            _bytes: &[u8],
            _deadline: Option<Instant>,
        ) -> Result<Vec<TextBlock>, ExtractionError> {
            Err(ExtractionError::Unreadable("no text layer".to_string()))
        }
    }

    fn para(text: &str) -> TextBlock {
        TextBlock {
            page: 1,
            order: 0,
            kind: BlockKind::Paragraph,
            text: text.to_string(),
            font_size: 10.0,
            is_bold: false,
            is_italic: false,
            y_position: 700.0,
        }
    }

    fn heading(text: &str) -> TextBlock {
        TextBlock {
            kind: BlockKind::HeadingCandidate,
            font_size: 12.0,
            is_bold: true,
            ..para(text)
        }
    }

    fn article_blocks() -> Vec<TextBlock> {
        let blocks = vec![
            para("Performance Feedback and Local Search"),
            heading("Introduction"),
            para("Search is local (Greve, 2003). March (1991) framed exploration against exploitation."),
            heading("Methods"),
            para("Failure rates shift with aspirations (Greve, 2003: 714)."),
            heading("References"),
            para("Greve, H. R. 2003. Organizational learning from performance feedback. Cambridge University Press."),
            para("March, J. G. 1991. Exploration and exploitation in organizational learning. Organization Science."),
        ];
        blocks
            .into_iter()
            .enumerate()
            .map(|(i, mut b)| {
                b.order = i;
                b
            })
            .collect()
    }

    fn run(blocks: Vec<TextBlock>) -> Result<Conversion, ConversionError> {
        let registry = ProfileRegistry::builtin();
        let config = EngineConfig::default();
        let source = StubSource(blocks);
        let cancel = CancellationToken::new();
        convert(b"%PDF-", "generic", &registry, &config, &source, None, &cancel)
    }

    // =========================================================================
    // end-to-end pipeline
    // =========================================================================

    #[test]
    fn test_convert_links_references_to_sections() {
        let conversion = run(article_blocks()).unwrap();

        let names: Vec<&str> = conversion
            .sections
            .iter()
            .map(|s| s.canonical_name.as_str())
            .collect();
        assert_eq!(
            names,
            vec!["Unclassified", "Introduction", "Methods", "References"]
        );

        assert_eq!(conversion.references.len(), 2);
        let greve = &conversion.references[0];
        assert_eq!(greve.normalized_key, "greve2003");
        assert_eq!(greve.occurrence_count, 2);
        assert_eq!(greve.sections_used_in, vec!["Introduction", "Methods"]);
        assert!(greve
            .bibliography_text
            .as_ref()
            .unwrap()
            .contains("performance feedback"));

        let march = &conversion.references[1];
        assert_eq!(march.normalized_key, "march1991");
        assert_eq!(march.occurrence_count, 1);
        assert!(march.bibliography_text.is_some());

        assert!(conversion.warnings.is_empty());
        assert_eq!(conversion.stats.sections, 4);
        assert_eq!(conversion.stats.occurrences, 3);
        assert_eq!(conversion.stats.references, 2);
        assert_eq!(conversion.stats.unresolved_references, 0);
        assert_eq!(conversion.stats.pages, 1);
    }

    #[test]
    fn test_occurrence_counts_are_conserved() {
        let conversion = run(article_blocks()).unwrap();
        let total: usize = conversion
            .references
            .iter()
            .map(|r| r.occurrence_count)
            .sum();
        assert_eq!(total, conversion.stats.occurrences);
    }

    #[test]
    fn test_convert_is_deterministic() {
        let a = run(article_blocks()).unwrap();
        let b = run(article_blocks()).unwrap();
        assert_eq!(a, b);
    }

    // =========================================================================
    // degradation and failure
    // =========================================================================

    #[test]
    fn test_headingless_document_degrades() {
        let blocks = vec![
            para("An unstructured note citing nothing in particular."),
            para("A second paragraph of the same."),
        ];
        let conversion = run(blocks).unwrap();
        assert_eq!(conversion.sections.len(), 1);
        assert_eq!(conversion.sections[0].canonical_name, "Unclassified");
        assert!(conversion
            .warnings
            .contains(&ConversionWarning::SegmentationDegraded));
    }

    #[test]
    fn test_numeric_citation_style_warns() {
        let blocks = vec![para(
            "Deep networks [1] build on [2], [3] and transformers [4], [5].",
        )];
        let conversion = run(blocks).unwrap();
        assert!(conversion.references.is_empty());
        assert!(conversion.warnings.iter().any(|w| matches!(
            w,
            ConversionWarning::CitationCoverage {
                bracketed_numerals: 5
            }
        )));
    }

    #[test]
    fn test_unreadable_pdf_is_terminal() {
        let registry = ProfileRegistry::builtin();
        let config = EngineConfig::default();
        let cancel = CancellationToken::new();
        let err = convert(
            b"not a pdf",
            "generic",
            &registry,
            &config,
            &FailingSource,
            None,
            &cancel,
        )
        .unwrap_err();
        assert!(matches!(
            err,
            ConversionError::Extraction(ExtractionError::Unreadable(_))
        ));
    }

    #[test]
    fn test_cancellation_at_stage_boundary() {
        let registry = ProfileRegistry::builtin();
        let config = EngineConfig::default();
        let source = StubSource(article_blocks());
        let cancel = CancellationToken::new();
        cancel.cancel();
        let err = convert(
            b"%PDF-",
            "generic",
            &registry,
            &config,
            &source,
            None,
            &cancel,
        )
        .unwrap_err();
        assert!(matches!(err, ConversionError::Cancelled));
    }
}
