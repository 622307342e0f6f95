use std::time::Instant;

use thiserror::Error;

use crate::TextBlock;

#[derive(Error, Debug)]
pub enum ExtractionError {
    /// The byte stream is not a parseable PDF, or the document carries no
    /// extractable text layer (e.g. scanned image-only pages).
    #[error("unreadable PDF: {0}")]
    Unreadable(String),
    /// The per-document extraction deadline elapsed.
    #[error("extraction deadline exceeded")]
    Timeout,
}

/// Trait for PDF block extraction backends.
///
/// Implementors provide the low-level layout step: raw bytes in, ordered
/// [`TextBlock`] sequence out. The structuring pipeline (section
/// segmentation, citation scanning, reference resolution) lives in
/// `citelink-parsing` and is backend-agnostic.
pub trait BlockSource: Send + Sync {
    /// Extract the ordered block sequence from raw PDF bytes.
    ///
    /// `deadline`, when set, bounds total processing time; implementations
    /// check it at page granularity and fail with
    /// [`ExtractionError::Timeout`] once it passes.
    fn extract_blocks(
        &self,
        bytes: &[u8],
        deadline: Option<Instant>,
    ) -> Result<Vec<TextBlock>, ExtractionError>;
}
