//! Citation scanning: find author-year citations in section text.
//!
//! Each enabled grammar runs as an independent matcher over the section
//! text. Overlaps are resolved by keeping the longest match at the earliest
//! offset and discarding anything whose span falls inside an accepted match,
//! so a semicolon group swallows the single citations it contains. Accepted
//! matches are then decoded into occurrences keyed by the first author's
//! folded surname plus year.

use std::collections::{BTreeSet, HashMap};

use citelink_core::normalize;
use citelink_core::{CitationOccurrence, GrammarId, JournalProfile, Section};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::config::EngineConfig;
use crate::segment::Segmentation;

static GROUP_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\(([^()]*;[^()]*)\)").unwrap());

static SINGLE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\(([^():]*?[A-Za-z][^():]*?),?\s+(1[5-9]\d{2}|20\d{2})([a-z])?\s*\)").unwrap()
});

static NARRATIVE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"\b([A-Z][\w'’\-]+(?:,\s+[A-Z][\w'’\-]+)*?(?:,?\s+(?:and|&)\s+[A-Z][\w'’\-]+|\s+et\s+al\.?)?)\s*\((1[5-9]\d{2}|20\d{2})([a-z])?\)",
    )
    .unwrap()
});

static PAGINATED_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"\(([^():]*?[A-Za-z][^():]*?),?\s+(1[5-9]\d{2}|20\d{2})([a-z])?\s*:\s*\d+(?:\s*[–\-]\s*\d+)?\s*\)",
    )
    .unwrap()
});

static BRACKET_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\[\d{1,3}\]").unwrap());

/// What scanning an entire document produced.
#[derive(Debug, Clone, Default)]
pub struct ScanOutcome {
    /// Occurrences in document order: section order, then offset.
    pub occurrences: Vec<CitationOccurrence>,
    /// Count of short bracketed numerals seen across all section text, used
    /// to flag probable numeric citation styles the grammars do not cover.
    pub bracketed_numerals: usize,
}

/// Scan every section of a segmented document.
///
/// The bibliography section is censused but not scanned: its entries are
/// sources, not uses, and counting them would put every reference "in" the
/// References section. Disambiguator letters are reconciled document-wide
/// after all sections are scanned.
pub fn scan_sections(
    segmentation: &Segmentation,
    profile: &JournalProfile,
    config: &EngineConfig,
) -> ScanOutcome {
    let grammars = profile.select_grammars();
    let mut outcome = ScanOutcome::default();

    for (i, section) in segmentation.sections.iter().enumerate() {
        outcome.bracketed_numerals += bracket_census(&section.text);
        if Some(i) == segmentation.bibliography {
            continue;
        }
        outcome
            .occurrences
            .extend(scan_section(section, grammars, config));
    }

    reconcile_disambiguators(&mut outcome.occurrences);
    outcome
}

/// Scan one section's text with the given grammars.
pub fn scan_section(
    section: &Section,
    grammars: &[GrammarId],
    config: &EngineConfig,
) -> Vec<CitationOccurrence> {
    let text = section.text.as_str();
    if text.is_empty() {
        return Vec::new();
    }

    // Candidate spans from every enabled grammar: (start, end, trial index).
    let mut candidates: Vec<(usize, usize, usize)> = Vec::new();
    for (trial, &grammar) in grammars.iter().enumerate() {
        let re = pattern_for(grammar, config);
        for m in re.find_iter(text) {
            candidates.push((m.start(), m.end(), trial));
        }
    }

    // Longest match at the earliest offset wins; spans contained in or
    // overlapping an accepted match are discarded. Grammar trial order
    // breaks exact span ties.
    candidates.sort_by(|a, b| a.0.cmp(&b.0).then(b.1.cmp(&a.1)).then(a.2.cmp(&b.2)));

    let mut occurrences = Vec::new();
    let mut last_end = 0usize;
    for (start, end, trial) in candidates {
        if start < last_end {
            continue;
        }
        last_end = end;
        decode_match(
            &text[start..end],
            start,
            grammars[trial],
            &section.canonical_name,
            &mut occurrences,
        );
    }
    occurrences
}

/// Count short bracketed numerals (`[12]`) in a text.
pub fn bracket_census(text: &str) -> usize {
    BRACKET_RE.find_iter(text).count()
}

fn pattern_for<'a>(grammar: GrammarId, config: &'a EngineConfig) -> &'a Regex {
    match grammar {
        GrammarId::ParentheticalGroup => config.group_citation_re.as_ref().unwrap_or(&GROUP_RE),
        GrammarId::ParentheticalSingle => config.single_citation_re.as_ref().unwrap_or(&SINGLE_RE),
        GrammarId::Narrative => config.narrative_citation_re.as_ref().unwrap_or(&NARRATIVE_RE),
        GrammarId::Paginated => config.paginated_citation_re.as_ref().unwrap_or(&PAGINATED_RE),
    }
}

/// Turn one accepted span into occurrences. A parenthetical group yields one
/// occurrence per semicolon segment; the other grammars yield one.
fn decode_match(
    slice: &str,
    offset: usize,
    grammar: GrammarId,
    section_name: &str,
    out: &mut Vec<CitationOccurrence>,
) {
    match grammar {
        GrammarId::ParentheticalGroup => {
            let body = &slice[1..slice.len() - 1];
            let mut cursor = 0usize;
            for segment in body.split(';') {
                let lead_ws = segment.len() - segment.trim_start().len();
                let trimmed = segment.trim();
                if let Some(key) = decode_author_year(trimmed) {
                    out.push(CitationOccurrence {
                        raw_text: trimmed.to_string(),
                        normalized_key: key,
                        section_name: section_name.to_string(),
                        offset: offset + 1 + cursor + lead_ws,
                    });
                }
                cursor += segment.len() + 1;
            }
        }
        GrammarId::ParentheticalSingle | GrammarId::Paginated => {
            let body = &slice[1..slice.len() - 1];
            if let Some(key) = decode_author_year(body.trim()) {
                out.push(CitationOccurrence {
                    raw_text: slice.to_string(),
                    normalized_key: key,
                    section_name: section_name.to_string(),
                    offset,
                });
            }
        }
        GrammarId::Narrative => {
            if let Some(key) = decode_author_year(slice) {
                out.push(CitationOccurrence {
                    raw_text: slice.to_string(),
                    normalized_key: key,
                    section_name: section_name.to_string(),
                    offset,
                });
            }
        }
    }
}

/// Decode one author-year run into a merge key. Everything before the first
/// plausible year is the author chunk; a page locator after the year is
/// dropped from the key but stays in the raw text.
fn decode_author_year(segment: &str) -> Option<String> {
    static YEAR_RE: Lazy<Regex> =
        Lazy::new(|| Regex::new(r"\b(1[5-9]\d{2}|20\d{2})([a-z])?\b").unwrap());

    let caps = YEAR_RE.captures(segment)?;
    let year_match = caps.get(1)?;
    let disambiguator = caps
        .get(2)
        .and_then(|m| m.as_str().chars().next());

    let author_chunk = segment[..year_match.start()].trim_end_matches([',', '(', ' ', '\t', '\n']);
    let piece = first_author_piece(author_chunk)?;
    Some(normalize::citation_key(
        piece,
        year_match.as_str(),
        disambiguator,
    ))
}

/// First author of a multi-author chunk: the earliest comma/"and"/"&"
/// delimited piece that still holds a surname once initials and prose
/// markers are dropped.
fn first_author_piece(chunk: &str) -> Option<&str> {
    static SPLIT_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r",|&|\band\b|\bet\s+al\b").unwrap());
    SPLIT_RE
        .split(chunk)
        .find(|piece| !normalize::lead_surname(piece).is_empty())
}

/// Document-wide reconciliation of year disambiguators: a lone suffix
/// ("2003a" with no sibling "2003b") collapses onto the base key; two or
/// more distinct suffixes keep their letters.
pub fn reconcile_disambiguators(occurrences: &mut [CitationOccurrence]) {
    let mut suffixes: HashMap<String, BTreeSet<char>> = HashMap::new();
    for occ in occurrences.iter() {
        if let Some((base, letter)) = split_suffixed(&occ.normalized_key) {
            suffixes.entry(base.to_string()).or_default().insert(letter);
        }
    }

    for occ in occurrences.iter_mut() {
        let collapsed = match split_suffixed(&occ.normalized_key) {
            Some((base, _)) if suffixes[base].len() == 1 => Some(base.to_string()),
            _ => None,
        };
        if let Some(base) = collapsed {
            occ.normalized_key = base;
        }
    }
}

/// Split a key of the form `surname` + 4-digit year + letter.
fn split_suffixed(key: &str) -> Option<(&str, char)> {
    let bytes = key.as_bytes();
    let n = bytes.len();
    if n < 5 {
        return None;
    }
    let last = bytes[n - 1] as char;
    if !last.is_ascii_lowercase() {
        return None;
    }
    if bytes[n - 5..n - 1].iter().all(u8::is_ascii_digit) {
        Some((&key[..n - 1], last))
    } else {
        None
    }
}
