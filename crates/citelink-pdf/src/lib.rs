//! lopdf-backed [`BlockSource`] implementation.
//!
//! Extraction runs in two passes: the first interprets every page's
//! content stream into positioned spans and accumulates document-wide
//! font statistics, the second groups each page's spans into classified
//! text blocks against the document's body font size.

use std::time::Instant;

use lopdf::{Document, Object, ObjectId};

use citelink_core::{BlockSource, ExtractionError, TextBlock};

use crate::content::TextSpan;
use crate::fonts::FontStatistics;

mod content;
mod fonts;
mod layout;

/// PDF text block extractor backed by `lopdf`.
///
/// By default, text in the bottom 5% of each page (footers) and top 4%
/// (headers) is excluded so running titles like "Administrative Science
/// Quarterly 68 (2023)" do not land inside section text when sections
/// span page breaks.
pub struct LopdfSource {
    /// Fraction of page height from the bottom to exclude (0.0–1.0).
    /// Default 0.05. `None` disables footer exclusion.
    footer_exclusion_ratio: Option<f32>,
    /// Fraction of page height from the top to exclude (0.0–1.0).
    /// Default 0.04. `None` disables header exclusion.
    header_exclusion_ratio: Option<f32>,
}

impl Default for LopdfSource {
    fn default() -> Self {
        Self {
            footer_exclusion_ratio: Some(0.05),
            header_exclusion_ratio: Some(0.04),
        }
    }
}

impl LopdfSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the footer exclusion ratio. Pass `0.0` to disable.
    pub fn with_footer_exclusion(mut self, ratio: f32) -> Self {
        self.footer_exclusion_ratio = if ratio > 0.0 { Some(ratio) } else { None };
        self
    }

    /// Set the header exclusion ratio. Pass `0.0` to disable.
    pub fn with_header_exclusion(mut self, ratio: f32) -> Self {
        self.header_exclusion_ratio = if ratio > 0.0 { Some(ratio) } else { None };
        self
    }

    fn clip_margins(&self, spans: Vec<TextSpan>, page_height: f32) -> Vec<TextSpan> {
        spans
            .into_iter()
            .filter(|span| {
                if let Some(ratio) = self.footer_exclusion_ratio {
                    if span.y < page_height * ratio {
                        return false;
                    }
                }
                if let Some(ratio) = self.header_exclusion_ratio {
                    if span.y > page_height * (1.0 - ratio) {
                        return false;
                    }
                }
                true
            })
            .collect()
    }
}

impl BlockSource for LopdfSource {
    fn extract_blocks(
        &self,
        bytes: &[u8],
        deadline: Option<Instant>,
    ) -> Result<Vec<TextBlock>, ExtractionError> {
        let doc =
            Document::load_mem(bytes).map_err(|e| ExtractionError::Unreadable(e.to_string()))?;
        if doc.is_encrypted() {
            return Err(ExtractionError::Unreadable("encrypted document".to_string()));
        }

        let pages = doc.get_pages();
        let mut page_spans: Vec<(u32, f32, Vec<TextSpan>)> = Vec::new();
        let mut stats = FontStatistics::default();

        for (page_number, page_id) in &pages {
            if let Some(deadline) = deadline {
                if Instant::now() >= deadline {
                    return Err(ExtractionError::Timeout);
                }
            }
            let spans = match content::parse_page_spans(&doc, *page_id) {
                Ok(spans) => spans,
                Err(err) => {
                    tracing::debug!(page = *page_number, error = %err, "skipping unparsable page");
                    continue;
                }
            };
            let height = page_height(&doc, *page_id);
            let spans = self.clip_margins(spans, height);
            for span in &spans {
                stats.record(span.font_size, span.text.chars().count());
            }
            page_spans.push((*page_number, height, spans));
        }

        let body_size = stats.body_size();
        let mut blocks = Vec::new();
        let mut order = 0usize;
        for (page_number, height, spans) in page_spans {
            blocks.extend(layout::analyze_page(
                spans,
                body_size,
                height,
                page_number,
                &mut order,
            ));
        }

        if blocks.is_empty() {
            return Err(ExtractionError::Unreadable("no text content".to_string()));
        }
        tracing::debug!(
            pages = pages.len(),
            blocks = blocks.len(),
            body_size,
            "extracted text blocks"
        );
        Ok(blocks)
    }
}

fn page_height(doc: &Document, page_id: ObjectId) -> f32 {
    doc.get_dictionary(page_id)
        .ok()
        .and_then(|dict| dict.get(b"MediaBox").ok())
        .and_then(|obj| obj.as_array().ok())
        .and_then(|arr| arr.get(3))
        .and_then(|obj| match obj {
            Object::Integer(i) => Some(*i as f32),
            Object::Real(r) => Some(*r),
            _ => None,
        })
        .unwrap_or(792.0)
}

// =============================================================================
// Tests
// =============================================================================
