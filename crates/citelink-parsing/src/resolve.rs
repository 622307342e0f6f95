//! Reference resolution: group occurrences into distinct references and
//! align each against its bibliography entry.
//!
//! Splitting the bibliography into entries is heuristic. Strategies are
//! tried in order of trust: blank-line gaps between blocks, then lines
//! anchored by a "Surname," start, then the whole text as one entry. The
//! first strategy producing at least two plausible entries wins.

use std::collections::HashMap;

use citelink_core::normalize;
use citelink_core::{CitationOccurrence, ConversionWarning, ReferenceEntry};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::config::EngineConfig;
use crate::segment::Segmentation;

static BLANK_LINE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n\s*\n").unwrap());

static AUTHOR_ANCHOR_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^[A-Z][\w'’\-]+,\s").unwrap());

static ANCHOR_YEAR_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b(1[5-9]\d{2}|20\d{2})\b").unwrap());

/// How far past an anchor the year must appear for the anchor to count as
/// the start of a bibliography entry.
const ANCHOR_YEAR_WINDOW: usize = 120;

/// What resolving a document produced.
#[derive(Debug, Clone, Default)]
pub struct Resolution {
    /// Distinct references, ordered by first occurrence.
    pub references: Vec<ReferenceEntry>,
    /// One `BibliographyUnresolved` per reference with no aligned entry.
    pub warnings: Vec<ConversionWarning>,
}

/// Group `occurrences` into references and align them against the
/// bibliography section, when one was recognized.
pub fn resolve(
    segmentation: &Segmentation,
    occurrences: &[CitationOccurrence],
    config: &EngineConfig,
) -> Resolution {
    let mut references = group_occurrences(occurrences);

    let entries = match segmentation.bibliography {
        Some(i) => split_entries(&segmentation.sections[i].text, config),
        None => Vec::new(),
    };
    let entry_folds: Vec<String> = entries.iter().map(|e| normalize::fold_alnum(e)).collect();

    let mut warnings = Vec::new();
    for reference in &mut references {
        match align(&reference.normalized_key, &entries, &entry_folds) {
            Some(text) => reference.bibliography_text = Some(text),
            None => {
                warnings.push(ConversionWarning::BibliographyUnresolved {
                    key: reference.normalized_key.clone(),
                });
            }
        }
    }

    tracing::debug!(
        references = references.len(),
        entries = entries.len(),
        unresolved = warnings.len(),
        "aligned references against bibliography"
    );

    Resolution {
        references,
        warnings,
    }
}

/// Fold the occurrence stream into distinct references, keyed by normalized
/// key, in first-occurrence order. Section lists keep first-use order.
fn group_occurrences(occurrences: &[CitationOccurrence]) -> Vec<ReferenceEntry> {
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut references: Vec<ReferenceEntry> = Vec::new();

    for occ in occurrences {
        match index.get(&occ.normalized_key) {
            Some(&i) => {
                let entry = &mut references[i];
                entry.occurrence_count += 1;
                if !entry.sections_used_in.contains(&occ.section_name) {
                    entry.sections_used_in.push(occ.section_name.clone());
                }
            }
            None => {
                index.insert(occ.normalized_key.clone(), references.len());
                references.push(ReferenceEntry {
                    normalized_key: occ.normalized_key.clone(),
                    sections_used_in: vec![occ.section_name.clone()],
                    bibliography_text: None,
                    occurrence_count: 1,
                });
            }
        }
    }
    references
}

/// Split the bibliography text into entry strings.
pub(crate) fn split_entries(text: &str, config: &EngineConfig) -> Vec<String> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Vec::new();
    }

    let blank = config.entry_split_re.as_ref().unwrap_or(&BLANK_LINE_RE);
    let by_blank: Vec<String> = blank
        .split(trimmed)
        .map(str::trim)
        .filter(|e| e.len() > config.min_entry_len)
        .map(normalize::collapse_whitespace)
        .collect();
    if by_blank.len() >= 2 {
        tracing::debug!(entries = by_blank.len(), "split bibliography on blank lines");
        return by_blank;
    }

    let by_anchor = split_on_author_anchors(trimmed, config);
    if by_anchor.len() >= 2 {
        tracing::debug!(entries = by_anchor.len(), "split bibliography on author anchors");
        return by_anchor;
    }

    vec![normalize::collapse_whitespace(trimmed)]
}

/// Split at lines that open with `Surname,` and carry a year close behind,
/// the house style of most author-date bibliographies. Anchors with no year
/// in reach are prose ("March, the firm reorganized.") and stay attached to
/// the entry above them.
fn split_on_author_anchors(text: &str, config: &EngineConfig) -> Vec<String> {
    let anchors: Vec<usize> = AUTHOR_ANCHOR_RE.find_iter(text).map(|m| m.start()).collect();
    let mut starts: Vec<usize> = Vec::new();
    for (i, &start) in anchors.iter().enumerate() {
        // The year must appear before the next anchor, so a neighbouring
        // entry's year cannot vouch for this one.
        let cap = anchors.get(i + 1).copied().unwrap_or(text.len());
        let end = ceil_char_boundary(text, (start + ANCHOR_YEAR_WINDOW).min(cap));
        if ANCHOR_YEAR_RE.is_match(&text[start..end]) {
            starts.push(start);
        }
    }
    if starts.len() < 2 {
        return Vec::new();
    }

    let mut pieces: Vec<&str> = Vec::new();
    for pair in starts.windows(2) {
        pieces.push(&text[pair[0]..pair[1]]);
    }
    if let Some(&last) = starts.last() {
        pieces.push(&text[last..]);
    }

    pieces
        .into_iter()
        .map(str::trim)
        .filter(|e| e.len() > config.min_entry_len)
        .map(normalize::collapse_whitespace)
        .collect()
}

/// First char boundary at or after `i`.
fn ceil_char_boundary(text: &str, mut i: usize) -> usize {
    while i < text.len() && !text.is_char_boundary(i) {
        i += 1;
    }
    i
}

/// Align one key against the bibliography entries: the first entry whose
/// folded text carries the surname and the year wins. Keys with a
/// disambiguator letter first try the lettered year ("2003a"), then fall
/// back to the plain year.
fn align(key: &str, entries: &[String], entry_folds: &[String]) -> Option<String> {
    let (surname, year, letter) = key_parts(key)?;

    if let Some(letter) = letter {
        let lettered = format!("{}{}", year, letter);
        for (i, fold) in entry_folds.iter().enumerate() {
            if fold.contains(surname) && fold.contains(&lettered) {
                return Some(entries[i].clone());
            }
        }
    }

    for (i, fold) in entry_folds.iter().enumerate() {
        if fold.contains(surname) && fold.contains(year) {
            return Some(entries[i].clone());
        }
    }
    None
}

/// Break a key back into surname, year, and optional disambiguator.
fn key_parts(key: &str) -> Option<(&str, &str, Option<char>)> {
    let bytes = key.as_bytes();
    let (stem, letter) = match bytes.last() {
        Some(&b)
            if b.is_ascii_lowercase()
                && bytes.len() >= 5
                && bytes[bytes.len() - 5..bytes.len() - 1]
                    .iter()
                    .all(u8::is_ascii_digit) =>
        {
            (&key[..key.len() - 1], Some(b as char))
        }
        _ => (key, None),
    };
    if stem.len() <= 4 {
        return None;
    }
    let (surname, year) = stem.split_at(stem.len() - 4);
    if !year.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    Some((surname, year, letter))
}
