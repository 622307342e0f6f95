//! Page layout analysis: spans to lines, lines to blocks.
//!
//! PDF text space puts the origin at the bottom-left corner, so larger y
//! means higher on the page. Two-column pages are split at the gutter and
//! read column-major, the reading order of scholarly journals.

use std::cmp::Ordering;

use citelink_core::{BlockKind, TextBlock};

use crate::content::TextSpan;

/// Distance above the body size that marks a block as a heading candidate,
/// and below it as footnote-sized.
const HEADING_FONT_DELTA: f32 = 1.5;
/// Footnote-sized text only counts as a footnote in the bottom fraction of
/// the page.
const FOOTNOTE_PAGE_FRACTION: f32 = 0.3;

/// A baseline-aligned run of spans.
#[derive(Debug)]
struct Line {
    spans: Vec<TextSpan>,
    x: f32,
    y: f32,
    font_size: f32,
}

impl Line {
    fn from_spans(mut spans: Vec<TextSpan>) -> Self {
        spans.sort_by(|a, b| a.x.partial_cmp(&b.x).unwrap_or(Ordering::Equal));
        let chars: usize = spans.iter().map(|s| s.text.chars().count()).sum();
        let weighted: f32 = spans
            .iter()
            .map(|s| s.font_size * s.text.chars().count() as f32)
            .sum();
        let font_size = if chars > 0 {
            weighted / chars as f32
        } else {
            10.0
        };
        Line {
            x: spans[0].x,
            y: spans[0].y,
            font_size,
            spans,
        }
    }

    /// Join the line's spans, inserting a space where the x gap between
    /// neighbours exceeds a fraction of the character width.
    fn text(&self) -> String {
        let mut out = String::new();
        for (i, span) in self.spans.iter().enumerate() {
            if i > 0 {
                let prev = &self.spans[i - 1];
                let gap = span.x - (prev.x + prev.width);
                let char_width = 0.5 * span.font_size.max(1.0);
                if gap > 0.2 * char_width && !out.ends_with(' ') && !span.text.starts_with(' ') {
                    out.push(' ');
                }
            }
            out.push_str(&span.text);
        }
        out
    }
}

/// Turn one page's spans into ordered, classified text blocks. `order`
/// carries the running block index across pages.
pub(crate) fn analyze_page(
    spans: Vec<TextSpan>,
    body_size: f32,
    page_height: f32,
    page_number: u32,
    order: &mut usize,
) -> Vec<TextBlock> {
    let lines = group_into_lines(spans);
    let mut blocks = Vec::new();
    for group in group_into_blocks(lines) {
        let block = build_block(group, body_size, page_height, page_number, *order);
        *order += 1;
        blocks.push(block);
    }
    blocks
}

fn group_into_lines(spans: Vec<TextSpan>) -> Vec<Line> {
    if spans.is_empty() {
        return Vec::new();
    }
    match detect_gutter(&spans) {
        Some(gutter) => {
            tracing::debug!(gutter, "two-column page");
            let (left, right): (Vec<_>, Vec<_>) = spans
                .into_iter()
                .partition(|s| s.x + s.width / 2.0 < gutter);
            let mut lines = group_column_lines(left);
            lines.extend(group_column_lines(right));
            lines
        }
        None => group_column_lines(spans),
    }
}

/// Group one column's spans into baseline-aligned lines, top to bottom.
fn group_column_lines(mut spans: Vec<TextSpan>) -> Vec<Line> {
    spans.sort_by(|a, b| {
        b.y.partial_cmp(&a.y)
            .unwrap_or(Ordering::Equal)
            .then(a.x.partial_cmp(&b.x).unwrap_or(Ordering::Equal))
    });

    let mut lines = Vec::new();
    let mut current: Vec<TextSpan> = Vec::new();
    let mut current_y: Option<f32> = None;

    for span in spans {
        let tolerance = span.font_size * 0.3;
        match current_y {
            Some(y) if (span.y - y).abs() <= tolerance => current.push(span),
            _ => {
                if !current.is_empty() {
                    lines.push(Line::from_spans(std::mem::take(&mut current)));
                }
                current_y = Some(span.y);
                current.push(span);
            }
        }
    }
    if !current.is_empty() {
        lines.push(Line::from_spans(current));
    }
    lines
}

/// Look for a vertical gutter splitting the page into two columns.
///
/// The page is cut into 3pt vertical slices; the widest run of empty
/// slices in the middle of the page is the candidate gutter. It only
/// counts when it is at least 12pt wide and leaves a real column with a
/// real share of the spans on each side.
fn detect_gutter(spans: &[TextSpan]) -> Option<f32> {
    const SLICE_WIDTH: f32 = 3.0;
    const MIN_GUTTER: f32 = 12.0;
    const MIN_COLUMN_WIDTH: f32 = 80.0;

    let min_x = spans.iter().map(|s| s.x).fold(f32::INFINITY, f32::min);
    let max_x = spans
        .iter()
        .map(|s| s.x + s.width)
        .fold(f32::NEG_INFINITY, f32::max);
    let page_width = max_x - min_x;
    if page_width < 250.0 {
        return None;
    }

    let slices = (page_width / SLICE_WIDTH) as usize + 1;
    let mut occupancy = vec![0usize; slices];
    for span in spans {
        let start = ((span.x - min_x) / SLICE_WIDTH) as usize;
        let end = (((span.x + span.width) - min_x) / SLICE_WIDTH) as usize;
        for slot in occupancy
            .iter_mut()
            .take(end.min(slices - 1) + 1)
            .skip(start)
        {
            *slot += 1;
        }
    }

    // Widest empty run within the middle 70% of the text extent.
    let search_start = slices * 15 / 100;
    let search_end = slices * 85 / 100;
    let mut best: Option<(usize, usize)> = None;
    let mut run_start = 0;
    let mut run_len = 0;
    for (i, &count) in occupancy
        .iter()
        .enumerate()
        .take(search_end)
        .skip(search_start)
    {
        if count == 0 {
            if run_len == 0 {
                run_start = i;
            }
            run_len += 1;
        } else {
            if run_len > best.map_or(0, |(_, len)| len) {
                best = Some((run_start, run_len));
            }
            run_len = 0;
        }
    }
    if run_len > best.map_or(0, |(_, len)| len) {
        best = Some((run_start, run_len));
    }

    let (gap_start, gap_len) = best?;
    if (gap_len as f32) * SLICE_WIDTH < MIN_GUTTER {
        return None;
    }
    let gutter = min_x + (gap_start as f32 + gap_len as f32 / 2.0) * SLICE_WIDTH;

    if gutter - min_x < MIN_COLUMN_WIDTH || max_x - gutter < MIN_COLUMN_WIDTH {
        return None;
    }
    let left = spans
        .iter()
        .filter(|s| s.x + s.width / 2.0 < gutter)
        .count();
    let right = spans.len() - left;
    let min_spans = (spans.len() / 10).max(2);
    if left < min_spans || right < min_spans {
        return None;
    }
    Some(gutter)
}

fn group_into_blocks(lines: Vec<Line>) -> Vec<Vec<Line>> {
    if lines.is_empty() {
        return Vec::new();
    }
    let avg_spacing = average_line_spacing(&lines);
    let mut groups: Vec<Vec<Line>> = Vec::new();
    let mut current: Vec<Line> = Vec::new();
    for line in lines {
        if let Some(prev) = current.last() {
            if should_break(prev, &line, avg_spacing) {
                groups.push(std::mem::take(&mut current));
            }
        }
        current.push(line);
    }
    if !current.is_empty() {
        groups.push(current);
    }
    groups
}

fn average_line_spacing(lines: &[Line]) -> f32 {
    let spacings: Vec<f32> = lines
        .windows(2)
        .map(|w| (w[0].y - w[1].y).abs())
        .filter(|s| *s > 0.1)
        .collect();
    if spacings.is_empty() {
        return 12.0;
    }
    spacings.iter().sum::<f32>() / spacings.len() as f32
}

/// A block ends at a wide vertical gap, a font size change, or an
/// indentation shift.
fn should_break(prev: &Line, curr: &Line, avg_spacing: f32) -> bool {
    let spacing = (prev.y - curr.y).abs();
    spacing > avg_spacing * 1.5
        || (prev.font_size - curr.font_size).abs() > 1.0
        || (prev.x - curr.x).abs() > 20.0
}

fn build_block(
    lines: Vec<Line>,
    body_size: f32,
    page_height: f32,
    page: u32,
    order: usize,
) -> TextBlock {
    let text = lines.iter().map(Line::text).collect::<Vec<_>>().join("\n");

    let chars: usize = lines
        .iter()
        .flat_map(|l| &l.spans)
        .map(|s| s.text.chars().count())
        .sum();
    let weighted: f32 = lines
        .iter()
        .flat_map(|l| &l.spans)
        .map(|s| s.font_size * s.text.chars().count() as f32)
        .sum();
    let font_size = if chars > 0 {
        weighted / chars as f32
    } else {
        body_size
    };
    let bold_chars: usize = lines
        .iter()
        .flat_map(|l| &l.spans)
        .filter(|s| s.is_bold)
        .map(|s| s.text.chars().count())
        .sum();
    let italic_chars: usize = lines
        .iter()
        .flat_map(|l| &l.spans)
        .filter(|s| s.is_italic)
        .map(|s| s.text.chars().count())
        .sum();

    let y_position = lines.first().map(|l| l.y).unwrap_or(0.0);
    let kind = classify(&text, font_size, y_position, body_size, page_height);

    TextBlock {
        page,
        order,
        kind,
        text,
        font_size,
        is_bold: chars > 0 && bold_chars * 2 > chars,
        is_italic: chars > 0 && italic_chars * 2 > chars,
        y_position,
    }
}

fn classify(text: &str, font_size: f32, y: f32, body_size: f32, page_height: f32) -> BlockKind {
    let trimmed = text.trim();
    if !trimmed.is_empty() && trimmed.len() <= 4 && trimmed.chars().all(|c| c.is_ascii_digit()) {
        return BlockKind::PageNumber;
    }
    if font_size <= body_size - HEADING_FONT_DELTA && y < page_height * FOOTNOTE_PAGE_FRACTION {
        return BlockKind::Footnote;
    }
    if font_size >= body_size + HEADING_FONT_DELTA {
        return BlockKind::HeadingCandidate;
    }
    BlockKind::Paragraph
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn span(text: &str, x: f32, y: f32, size: f32) -> TextSpan {
        TextSpan {
            text: text.to_string(),
            x,
            y,
            width: 0.5 * size * text.chars().count() as f32,
            font_size: size,
            is_bold: false,
            is_italic: false,
        }
    }

    #[test]
    fn test_spans_group_by_baseline() {
        let spans = vec![
            span("feedback", 135.0, 700.1, 10.0),
            span("Performance", 72.0, 700.0, 10.0),
            span("shapes search.", 72.0, 688.0, 10.0),
        ];
        let lines = group_column_lines(spans);
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].text(), "Performance feedback");
        assert_eq!(lines[1].text(), "shapes search.");
    }

    #[test]
    fn test_abutting_spans_join_without_space() {
        // "Per" ends exactly where "formance" starts
        let spans = vec![
            span("Per", 72.0, 700.0, 10.0),
            span("formance", 87.0, 700.0, 10.0),
        ];
        let lines = group_column_lines(spans);
        assert_eq!(lines[0].text(), "Performance");
    }

    #[test]
    fn test_blocks_break_on_wide_gap() {
        let lines = vec![
            Line::from_spans(vec![span("First paragraph line one.", 72.0, 700.0, 10.0)]),
            Line::from_spans(vec![span("First paragraph line two.", 72.0, 688.0, 10.0)]),
            Line::from_spans(vec![span("Second paragraph starts here.", 72.0, 640.0, 10.0)]),
        ];
        let groups = group_into_blocks(lines);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].len(), 2);
    }

    #[test]
    fn test_blocks_break_on_font_change() {
        let lines = vec![
            Line::from_spans(vec![span("Methods", 72.0, 700.0, 14.0)]),
            Line::from_spans(vec![span("We sampled 120 firms.", 72.0, 688.0, 10.0)]),
        ];
        let groups = group_into_blocks(lines);
        assert_eq!(groups.len(), 2);
    }

    #[test]
    fn test_classify_page_number() {
        assert_eq!(classify("714", 9.0, 60.0, 10.0, 792.0), BlockKind::PageNumber);
        assert_eq!(classify("7", 10.0, 400.0, 10.0, 792.0), BlockKind::PageNumber);
    }

    #[test]
    fn test_classify_footnote_needs_small_font_low_on_page() {
        let footnote = classify("1 See the appendix.", 8.0, 90.0, 10.0, 792.0);
        assert_eq!(footnote, BlockKind::Footnote);
        // same font high on the page is an ordinary paragraph
        let high = classify("1 See the appendix.", 8.0, 600.0, 10.0, 792.0);
        assert_eq!(high, BlockKind::Paragraph);
    }

    #[test]
    fn test_classify_heading_candidate() {
        assert_eq!(
            classify("Discussion", 13.0, 700.0, 10.0, 792.0),
            BlockKind::HeadingCandidate
        );
        assert_eq!(
            classify("Body text.", 10.0, 700.0, 10.0, 792.0),
            BlockKind::Paragraph
        );
    }

    #[test]
    fn test_gutter_detected_for_two_columns() {
        let mut spans = Vec::new();
        for i in 0..12 {
            let y = 700.0 - 12.0 * i as f32;
            spans.push(span("left column body text", 50.0, y, 10.0));
            spans.push(span("right column body text", 320.0, y, 10.0));
        }
        let gutter = detect_gutter(&spans).expect("gutter");
        assert!(gutter > 155.0 && gutter < 320.0, "gutter at {gutter}");
    }

    #[test]
    fn test_no_gutter_for_single_column() {
        let spans: Vec<TextSpan> = (0..12)
            .map(|i| {
                span(
                    "a full width paragraph line of ordinary body text",
                    72.0,
                    700.0 - 12.0 * i as f32,
                    10.0,
                )
            })
            .collect();
        assert!(detect_gutter(&spans).is_none());
    }

    #[test]
    fn test_columns_read_in_column_major_order() {
        let mut spans = Vec::new();
        for i in 0..6 {
            let y = 700.0 - 12.0 * i as f32;
            spans.push(span("right side of the page here", 320.0, y, 10.0));
            spans.push(span("left side of the page here", 50.0, y, 10.0));
        }
        let lines = group_into_lines(spans);
        assert_eq!(lines.len(), 12);
        assert!(lines[0].text().starts_with("left"));
        assert!(lines[5].text().starts_with("left"));
        assert!(lines[6].text().starts_with("right"));
    }

    #[test]
    fn test_block_text_joins_lines_with_newline() {
        let lines = vec![
            Line::from_spans(vec![span("Search is local", 72.0, 700.0, 10.0)]),
            Line::from_spans(vec![span("and myopic.", 72.0, 688.0, 10.0)]),
        ];
        let block = build_block(lines, 10.0, 792.0, 1, 3);
        assert_eq!(block.text, "Search is local\nand myopic.");
        assert_eq!(block.page, 1);
        assert_eq!(block.order, 3);
        assert_eq!(block.kind, BlockKind::Paragraph);
    }
}
