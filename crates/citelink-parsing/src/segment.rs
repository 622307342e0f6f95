//! Section segmentation: fold the linear block stream into named sections.
//!
//! Headings are detected through the journal profile; everything between two
//! detected headings becomes one section. Blocks before the first heading
//! accumulate into an "Unclassified" preamble, and a document with no
//! detectable headings at all collapses into a single Unclassified section
//! so downstream stages still run.

use citelink_core::normalize;
use citelink_core::{BlockKind, JournalProfile, Section, TextBlock, UNCLASSIFIED_SECTION};

use crate::config::EngineConfig;

/// Result of segmenting one document.
#[derive(Debug, Clone)]
pub struct Segmentation {
    /// Sections in document order, tiling the block sequence.
    pub sections: Vec<Section>,
    /// True when no heading was detected anywhere.
    pub degraded: bool,
    /// Index into `sections` of the bibliography, when one was recognized.
    pub bibliography: Option<usize>,
}

/// Segment `blocks` into sections under `profile`.
///
/// Every block lands in exactly one section span and section order follows
/// document order. Heading blocks open their section's span but contribute
/// no body text; page-number blocks are spanned but textless. A heading
/// whose canonical name equals the current section's (a column-top repeat)
/// continues the section instead of opening a new one. Once a bibliography
/// heading opens, detection stops and every remaining block belongs to the
/// bibliography: reference lists rarely carry sub-headings, while their
/// author lines often look like ones.
pub fn segment(blocks: &[TextBlock], profile: &JournalProfile, config: &EngineConfig) -> Segmentation {
    let ctx = config.heading_context(median_body_font_size(blocks));
    // Both sides fold through the alias table so a profile listing
    // "Works Cited" still locks on a heading already folded to "References".
    let bibliography_names: Vec<String> = config
        .bibliography_headings
        .resolve(&profile.bibliography_headings)
        .iter()
        .map(|n| fold_for_bibliography(n, ctx.fuzzy_heading_threshold))
        .collect();

    let mut sections: Vec<Section> = Vec::new();
    let mut current_name = UNCLASSIFIED_SECTION.to_string();
    let mut current_start = 0usize;
    let mut current_parts: Vec<String> = Vec::new();
    let mut any_heading = false;
    let mut bibliography: Option<usize> = None;

    for (idx, block) in blocks.iter().enumerate() {
        if bibliography.is_none() {
            if let Some(m) = profile.detect_heading(block, &ctx) {
                let continues = normalize::normalize_heading(&m.canonical)
                    == normalize::normalize_heading(&current_name);
                if continues && any_heading {
                    // Repeated heading (page or column top); swallow its text.
                    continue;
                }
                if idx > current_start {
                    push_section(
                        &mut sections,
                        &current_name,
                        current_start,
                        idx - 1,
                        &current_parts,
                    );
                }
                if bibliography_names
                    .contains(&fold_for_bibliography(&m.canonical, ctx.fuzzy_heading_threshold))
                {
                    bibliography = Some(sections.len());
                }
                current_name = m.canonical;
                current_start = idx;
                current_parts = Vec::new();
                any_heading = true;
                continue;
            }
        }

        if block.kind != BlockKind::PageNumber {
            let trimmed = block.text.trim();
            if !trimmed.is_empty() {
                current_parts.push(trimmed.to_string());
            }
        }
    }

    if !blocks.is_empty() {
        push_section(
            &mut sections,
            &current_name,
            current_start,
            blocks.len() - 1,
            &current_parts,
        );
    }

    let degraded = !any_heading;
    if degraded {
        tracing::debug!("no headings detected; document collapsed into one section");
    }

    Segmentation {
        sections,
        degraded,
        bibliography,
    }
}

fn push_section(
    sections: &mut Vec<Section>,
    name: &str,
    start_block: usize,
    end_block: usize,
    parts: &[String],
) {
    sections.push(Section {
        canonical_name: name.to_string(),
        order: sections.len(),
        start_block,
        end_block,
        text: parts.join("\n\n"),
    });
}

/// Alias-folded normalized form of a heading name, for bibliography
/// membership tests.
fn fold_for_bibliography(name: &str, threshold: f64) -> String {
    let normalized = normalize::normalize_heading(name);
    match citelink_core::profile::canonical_alias(&normalized, threshold) {
        Some(canonical) => normalize::normalize_heading(canonical),
        None => normalized,
    }
}

/// Median font size over paragraph blocks; the document's body size.
fn median_body_font_size(blocks: &[TextBlock]) -> f32 {
    let mut sizes: Vec<f32> = blocks
        .iter()
        .filter(|b| b.kind == BlockKind::Paragraph)
        .map(|b| b.font_size)
        .collect();
    if sizes.is_empty() {
        sizes = blocks.iter().map(|b| b.font_size).collect();
    }
    if sizes.is_empty() {
        return 10.0;
    }
    sizes.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    sizes[sizes.len() / 2]
}
