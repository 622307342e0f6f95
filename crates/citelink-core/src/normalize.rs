use once_cell::sync::Lazy;
use regex::Regex;
use unicode_normalization::UnicodeNormalization;

/// Fold a string to its bare comparable form: NFKD-decompose, keep ASCII
/// alphanumerics only, lowercase. Used for citation keys and bibliography
/// alignment, where diacritics, punctuation, and spacing must not matter
/// ("Gómez-Mejía" and "Gomez Mejia" fold identically).
pub fn fold_alnum(s: &str) -> String {
    let decomposed: String = s.nfkd().filter(|c| c.is_ascii()).collect();
    static NON_ALNUM: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^a-zA-Z0-9]").unwrap());
    NON_ALNUM.replace_all(&decomposed, "").to_lowercase()
}

/// Collapse runs of whitespace (including newlines) into single spaces.
pub fn collapse_whitespace(s: &str) -> String {
    static WS_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());
    WS_RE.replace_all(s.trim(), " ").to_string()
}

/// Normalize a heading for comparison against canonical section names.
///
/// Strips numbering prefixes ("1.", "3.2", "IV.", "A."), trailing
/// punctuation, and case/whitespace variation, so "1. INTRODUCTION" and
/// "Introduction" normalize identically.
pub fn normalize_heading(text: &str) -> String {
    display_heading(text).to_lowercase()
}

/// Display form of a heading: numbering prefix stripped, whitespace
/// collapsed, trailing punctuation removed, original casing kept.
///
/// Used as the section name when no canonical alias covers the heading.
pub fn display_heading(text: &str) -> String {
    static NUMBERING_RE: Lazy<Regex> =
        Lazy::new(|| Regex::new(r"^(?:\d{1,2}(?:\.\d{1,2})*\.?|[IVXLCDM]{1,5}\.|[A-Z]\.)\s+").unwrap());

    let trimmed = text.trim();
    let stripped = NUMBERING_RE.replace(trimmed, "");
    let stripped = stripped.trim_end_matches([':', '.', ' ']);
    collapse_whitespace(stripped)
}

/// Fuzzy comparison of two already-normalized headings.
///
/// Exact equality short-circuits; otherwise a rapidfuzz ratio over the two
/// strings must clear `threshold` (0.0–1.0). The tolerance absorbs PDF
/// artifacts like letter-spaced headings ("I N T R O D U C T I O N" after
/// whitespace collapse) and stray ligature damage.
pub fn headings_match(a: &str, b: &str, threshold: f64) -> bool {
    if a.is_empty() || b.is_empty() {
        return false;
    }
    if a == b {
        return true;
    }
    let score = rapidfuzz::fuzz::ratio(a.chars(), b.chars());
    score >= threshold
}

/// Extract the folded lead surname from an author chunk of a citation.
///
/// Drops initials ("R.", "R.M.") and leading prose markers so that
/// "e.g., R. M. Cyert" yields "cyert" and "van de Ven" yields "vandeven".
pub fn lead_surname(author_chunk: &str) -> String {
    static INITIAL_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Z]\.(?:[A-Z]\.)*$").unwrap());
    static PROSE_MARKER_RE: Lazy<Regex> =
        Lazy::new(|| Regex::new(r"(?i)^(?:e\.g\.?,?|i\.e\.?,?|see|cf\.?,?|also|in)$").unwrap());

    let kept: Vec<&str> = author_chunk
        .split_whitespace()
        .filter(|tok| !INITIAL_RE.is_match(tok) && !PROSE_MARKER_RE.is_match(tok))
        .collect();

    fold_alnum(&kept.join(" "))
}

/// Build a citation merge key from its parts.
///
/// The disambiguator letter is whatever trailed the year ("2003a"); whether
/// it survives into the final key is decided document-wide by the scanner's
/// reconciliation pass.
pub fn citation_key(author_chunk: &str, year: &str, disambiguator: Option<char>) -> String {
    let mut key = lead_surname(author_chunk);
    key.push_str(year);
    if let Some(d) = disambiguator {
        key.push(d);
    }
    key
}
