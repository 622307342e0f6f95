//! Font name heuristics and document-wide font size statistics.

use std::collections::HashMap;

/// Bold is inferred from the base font name; embedded subset prefixes
/// ("ABCDEF+Times-Bold") still carry the style suffix.
pub(crate) fn is_bold_font(name: &str) -> bool {
    let lower = name.to_lowercase();
    lower.contains("bold") || lower.contains("black") || lower.contains("heavy")
}

pub(crate) fn is_italic_font(name: &str) -> bool {
    let lower = name.to_lowercase();
    lower.contains("italic") || lower.contains("oblique")
}

/// Histogram of observed font sizes weighted by character count.
///
/// Sizes are bucketed to 0.1pt so fractional sizes produced by text matrix
/// scaling still aggregate into one bucket.
#[derive(Debug, Clone, Default)]
pub(crate) struct FontStatistics {
    histogram: HashMap<i32, usize>,
}

impl FontStatistics {
    pub(crate) fn record(&mut self, size: f32, chars: usize) {
        let key = (size * 10.0) as i32;
        *self.histogram.entry(key).or_insert(0) += chars;
    }

    /// The dominant font size, taken as the body text size. Ties resolve
    /// to the smaller size so headings never win. Defaults to 10pt for
    /// documents with no recorded text.
    pub(crate) fn body_size(&self) -> f32 {
        self.histogram
            .iter()
            .max_by(|a, b| a.1.cmp(b.1).then(b.0.cmp(a.0)))
            .map(|(key, _)| *key as f32 / 10.0)
            .unwrap_or(10.0)
    }
}

// =============================================================================
// Tests
// =============================================================================
