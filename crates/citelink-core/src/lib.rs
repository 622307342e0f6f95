pub mod backend;
pub mod config_file;
pub mod normalize;
pub mod profile;

// Re-export for convenience
pub use backend::{BlockSource, ExtractionError};
pub use profile::{
    GrammarId, HeadingContext, HeadingMatch, HeadingMatcher, HeadingRule, JournalProfile,
    ProfileRegistry, GENERIC_PROFILE_ID,
};

/// Classification of an extracted text block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockKind {
    /// Ordinary body text.
    Paragraph,
    /// Short line set noticeably larger than body text; a likely heading.
    HeadingCandidate,
    /// Small-font text low on the page.
    Footnote,
    /// A bare page number.
    PageNumber,
}

/// One typographic unit of extracted PDF text.
///
/// Blocks are immutable once produced and ordered by reading order:
/// page first, then column band, then vertical position within the band.
#[derive(Debug, Clone, PartialEq)]
pub struct TextBlock {
    /// 1-based page number the block came from.
    pub page: u32,
    /// Position in the document-wide reading order (0-based, contiguous).
    pub order: usize,
    pub kind: BlockKind,
    pub text: String,
    /// Dominant font size in points.
    pub font_size: f32,
    pub is_bold: bool,
    pub is_italic: bool,
    /// Baseline Y of the block's first line, in PDF page coordinates.
    pub y_position: f32,
}

/// A named, non-overlapping, contiguous span of the document.
///
/// Invariant: across a segmentation result, `order` is strictly increasing,
/// spans tile the block sequence (`end_block` of one section is immediately
/// followed by `start_block` of the next), and every block belongs to
/// exactly one section.
#[derive(Debug, Clone, PartialEq)]
pub struct Section {
    pub canonical_name: String,
    /// Position in document order (0-based).
    pub order: usize,
    /// Index of the first member block.
    pub start_block: usize,
    /// Index of the last member block (inclusive).
    pub end_block: usize,
    /// Flattened text of the member blocks, paragraph breaks normalized.
    pub text: String,
}

/// Name of the implicit section holding blocks before the first recognized
/// heading (and the whole document when segmentation degrades).
pub const UNCLASSIFIED_SECTION: &str = "Unclassified";

/// One textual mention of a reference at a specific location.
///
/// Ephemeral: produced and consumed within a single conversion run.
#[derive(Debug, Clone, PartialEq)]
pub struct CitationOccurrence {
    /// The matched citation text as it appears in the document.
    pub raw_text: String,
    /// Merge key: lowercased lead surname + year [+ disambiguator].
    pub normalized_key: String,
    /// Canonical name of the section the citation occurred in.
    pub section_name: String,
    /// Byte offset of the match within the section text.
    pub offset: usize,
}

/// A distinct cited reference and everywhere it was used.
#[derive(Debug, Clone, PartialEq)]
pub struct ReferenceEntry {
    pub normalized_key: String,
    /// Distinct section names, in first-use order. Non-empty by construction.
    pub sections_used_in: Vec<String>,
    /// Aligned bibliography entry text, when one was found.
    pub bibliography_text: Option<String>,
    pub occurrence_count: usize,
}

/// Non-fatal conditions attached to a best-effort conversion result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConversionWarning {
    /// No headings were detected; the whole document was emitted as a single
    /// "Unclassified" section.
    SegmentationDegraded,
    /// The document contains many short bracketed numerals but no grammar
    /// matched: the citation style is likely numeric/superscript, which the
    /// scanner does not cover.
    CitationCoverage { bracketed_numerals: usize },
    /// No bibliography entry aligned with this reference key.
    BibliographyUnresolved { key: String },
}

impl std::fmt::Display for ConversionWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConversionWarning::SegmentationDegraded => {
                write!(f, "no section headings detected; emitted a single Unclassified section")
            }
            ConversionWarning::CitationCoverage { bracketed_numerals } => {
                write!(
                    f,
                    "{} bracketed numerals but no citation matches; the paper likely uses a numeric citation style",
                    bracketed_numerals
                )
            }
            ConversionWarning::BibliographyUnresolved { key } => {
                write!(f, "no bibliography entry found for '{}'", key)
            }
        }
    }
}

/// Counters describing one conversion run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConversionStats {
    pub pages: usize,
    pub blocks: usize,
    pub sections: usize,
    pub occurrences: usize,
    pub references: usize,
    pub unresolved_references: usize,
}

/// Everything produced by one conversion run.
#[derive(Debug, Clone, PartialEq)]
pub struct Conversion {
    /// Sections in document order.
    pub sections: Vec<Section>,
    /// Distinct references in first-occurrence order.
    pub references: Vec<ReferenceEntry>,
    pub warnings: Vec<ConversionWarning>,
    pub stats: ConversionStats,
}
