//! Journal profiles and the process-wide profile registry.
//!
//! A [`JournalProfile`] captures what one journal's layout looks like: which
//! headings open sections, which citation grammars its articles use, and
//! which heading opens the bibliography. Profiles are consulted through a
//! small capability surface ([`JournalProfile::detect_heading`] and
//! [`JournalProfile::select_grammars`]) so the segmenter and scanner never
//! branch on journal ids themselves.
//!
//! The [`ProfileRegistry`] is built once at startup and read-only afterwards.
//! Unknown journal ids resolve to the generic profile, which detects headings
//! by font shape alone and enables every grammar.

use std::collections::HashMap;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::normalize;
use crate::{BlockKind, TextBlock};

/// Id of the journal-agnostic fallback profile.
pub const GENERIC_PROFILE_ID: &str = "generic";

// ── citation grammars ──

/// One recognized citation shape. Profiles select which grammars the scanner
/// tries; the scanner owns the patterns themselves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GrammarId {
    /// `(Cyert & March, 1963; Greve, 2003a)` — one parenthetical holding one
    /// or more semicolon-separated citations.
    ParentheticalGroup,
    /// `(Greve, 2003)` — a single parenthetical citation.
    ParentheticalSingle,
    /// `Greve (2003)`, `Tushman and Anderson (1986)`, `Greve et al. (2003)`.
    Narrative,
    /// `(Greve, 2003: 714)` — parenthetical with a page locator.
    Paginated,
}

impl GrammarId {
    /// Every grammar, in trial priority order: wider shapes first so a
    /// group match shadows the single citations it contains.
    pub fn all() -> [GrammarId; 4] {
        [
            GrammarId::ParentheticalGroup,
            GrammarId::ParentheticalSingle,
            GrammarId::Narrative,
            GrammarId::Paginated,
        ]
    }
}

// ── heading rules ──

/// How a single rule recognizes its heading in a block.
#[derive(Debug, Clone)]
pub enum HeadingMatcher {
    /// Block text (normalized) must equal the given name, with fuzzy
    /// tolerance for ligature and OCR damage. Stored in normalized form.
    Exact(String),
    /// Raw block text must match the pattern. Gated on a structural signal
    /// (heading candidate, bold, or all-caps) so body prose that happens to
    /// echo the pattern does not split a section.
    Pattern(Regex),
    /// Accept short blocks whose typography already marks them as headings:
    /// classified as a heading candidate by the extractor, or set above the
    /// document's body font size by at least the configured margin.
    FontHeuristic,
}

impl HeadingMatcher {
    /// Tie-break weight: exact text beats pattern beats font shape.
    pub fn specificity(&self) -> u8 {
        match self {
            HeadingMatcher::Exact(_) => 3,
            HeadingMatcher::Pattern(_) => 2,
            HeadingMatcher::FontHeuristic => 1,
        }
    }
}

/// An ordered entry in a profile's heading table.
#[derive(Debug, Clone)]
pub struct HeadingRule {
    /// Canonical section name recorded on a match. `None` adopts the block's
    /// own display-normalized text, which is what pattern and font rules do.
    pub canonical: Option<String>,
    pub matcher: HeadingMatcher,
}

impl HeadingRule {
    pub fn exact(name: &str) -> Self {
        HeadingRule {
            canonical: Some(name.to_string()),
            matcher: HeadingMatcher::Exact(normalize::normalize_heading(name)),
        }
    }

    pub fn pattern(re: Regex) -> Self {
        HeadingRule {
            canonical: None,
            matcher: HeadingMatcher::Pattern(re),
        }
    }

    pub fn font_heuristic() -> Self {
        HeadingRule {
            canonical: None,
            matcher: HeadingMatcher::FontHeuristic,
        }
    }
}

/// Outcome of heading detection for one block.
#[derive(Debug, Clone, PartialEq)]
pub struct HeadingMatch {
    /// Alias-folded section name.
    pub canonical: String,
    /// Specificity of the winning rule.
    pub specificity: u8,
}

/// Ambient thresholds for heading detection, supplied by the segmenter.
#[derive(Debug, Clone, Copy)]
pub struct HeadingContext {
    /// Median body font size across the document, in points.
    pub body_font_size: f32,
    /// Points above body size at which a block reads as a heading.
    pub heading_font_delta: f32,
    /// Maximum character count for pattern and font-heuristic headings.
    pub short_heading_max_chars: usize,
    /// Fuzzy-match threshold for exact-name rules, 0.0–1.0.
    pub fuzzy_heading_threshold: f64,
}

impl Default for HeadingContext {
    fn default() -> Self {
        HeadingContext {
            body_font_size: 10.0,
            heading_font_delta: 1.5,
            short_heading_max_chars: 80,
            fuzzy_heading_threshold: 0.88,
        }
    }
}

// ── canonical aliases ──

/// Alias table folding heading variants onto one canonical name, so
/// "FINDINGS", "Results", and "4. Results" all land in the same section row.
/// Keys are normalized headings; values are display names.
static HEADING_ALIASES: Lazy<Vec<(&'static str, &'static str)>> = Lazy::new(|| {
    vec![
        ("abstract", "Abstract"),
        ("keywords", "Keywords"),
        ("introduction", "Introduction"),
        ("background", "Background"),
        ("theoretical background", "Background"),
        ("literature review", "Background"),
        ("related work", "Background"),
        ("theory", "Theory and Hypotheses"),
        ("theory and hypotheses", "Theory and Hypotheses"),
        ("hypotheses", "Theory and Hypotheses"),
        ("hypothesis development", "Theory and Hypotheses"),
        ("data", "Data"),
        ("method", "Methods"),
        ("methods", "Methods"),
        ("methodology", "Methods"),
        ("research design", "Methods"),
        ("data and methods", "Methods"),
        ("data and methodology", "Methods"),
        ("materials and methods", "Methods"),
        ("measures", "Measures"),
        ("analysis", "Analysis"),
        ("analyses", "Analysis"),
        ("results", "Results"),
        ("findings", "Results"),
        ("robustness checks", "Robustness Checks"),
        ("discussion", "Discussion"),
        ("general discussion", "Discussion"),
        ("discussion and conclusion", "Discussion"),
        ("limitations", "Limitations"),
        ("limitations and future research", "Limitations"),
        ("conclusion", "Conclusion"),
        ("conclusions", "Conclusion"),
        ("concluding remarks", "Conclusion"),
        ("acknowledgements", "Acknowledgements"),
        ("acknowledgments", "Acknowledgements"),
        ("appendix", "Appendix"),
        ("appendices", "Appendix"),
        ("notes", "Endnotes"),
        ("endnotes", "Endnotes"),
        ("references", "References"),
        ("reference list", "References"),
        ("bibliography", "References"),
        ("works cited", "References"),
        ("literature cited", "References"),
    ]
});

/// Fold a normalized heading onto its canonical alias. Exact table hits win
/// over fuzzy ones so near-neighbors like "analysis"/"analyses" resolve to
/// their own rows first.
pub fn canonical_alias(normalized: &str, threshold: f64) -> Option<&'static str> {
    for (alias, canonical) in HEADING_ALIASES.iter() {
        if normalized == *alias {
            return Some(canonical);
        }
    }
    for (alias, canonical) in HEADING_ALIASES.iter() {
        if normalize::headings_match(normalized, alias, threshold) {
            return Some(canonical);
        }
    }
    None
}

// ── profiles ──

/// Per-journal segmentation and scanning knowledge. Immutable once built.
#[derive(Debug, Clone)]
pub struct JournalProfile {
    pub id: String,
    /// Ordered heading rules; earlier rules win specificity ties.
    pub heading_rules: Vec<HeadingRule>,
    /// Grammars the scanner tries for this journal, in trial order.
    pub grammars: Vec<GrammarId>,
    /// Headings that open the bibliography, in display form.
    pub bibliography_headings: Vec<String>,
}

impl JournalProfile {
    /// Decide whether `block` opens a new section.
    ///
    /// Every rule is tried; the most specific match wins and declaration
    /// order breaks ties. The returned name is already alias-folded.
    pub fn detect_heading(&self, block: &TextBlock, ctx: &HeadingContext) -> Option<HeadingMatch> {
        if matches!(block.kind, BlockKind::Footnote | BlockKind::PageNumber) {
            return None;
        }
        let trimmed = block.text.trim();
        if trimmed.is_empty() {
            return None;
        }
        let normalized = normalize::normalize_heading(trimmed);
        let short_enough = trimmed.chars().count() <= ctx.short_heading_max_chars;

        let mut best: Option<HeadingMatch> = None;
        for rule in &self.heading_rules {
            let hit = match &rule.matcher {
                HeadingMatcher::Exact(name) => {
                    normalize::headings_match(&normalized, name, ctx.fuzzy_heading_threshold)
                }
                HeadingMatcher::Pattern(re) => {
                    short_enough && re.is_match(trimmed) && has_heading_signal(block, trimmed)
                }
                HeadingMatcher::FontHeuristic => {
                    // Display-size type is a document title or banner, not a
                    // section heading.
                    let ceiling = ctx.body_font_size + 4.0 * ctx.heading_font_delta;
                    short_enough
                        && block.font_size < ceiling
                        && (block.kind == BlockKind::HeadingCandidate
                            || block.font_size >= ctx.body_font_size + ctx.heading_font_delta)
                }
            };
            if !hit {
                continue;
            }
            let specificity = rule.matcher.specificity();
            if best.as_ref().is_some_and(|b| specificity <= b.specificity) {
                continue;
            }
            let name = match &rule.canonical {
                Some(name) => name.clone(),
                None => normalize::display_heading(trimmed),
            };
            let canonical = canonical_alias(
                &normalize::normalize_heading(&name),
                ctx.fuzzy_heading_threshold,
            )
            .map(str::to_string)
            .unwrap_or(name);
            best = Some(HeadingMatch {
                canonical,
                specificity,
            });
        }
        best
    }

    /// Grammars the citation scanner should try for this journal.
    pub fn select_grammars(&self) -> &[GrammarId] {
        &self.grammars
    }

    /// Whether an alias-folded section name opens the bibliography.
    pub fn is_bibliography_heading(&self, canonical: &str) -> bool {
        let target = normalize::normalize_heading(canonical);
        self.bibliography_headings
            .iter()
            .any(|h| normalize::normalize_heading(h) == target)
    }
}

/// Structural gate for pattern rules: some typographic signal beyond the
/// text itself must mark the block as a heading.
fn has_heading_signal(block: &TextBlock, trimmed: &str) -> bool {
    block.kind == BlockKind::HeadingCandidate || block.is_bold || is_all_caps(trimmed)
}

fn is_all_caps(s: &str) -> bool {
    let mut saw_letter = false;
    for c in s.chars() {
        if c.is_alphabetic() {
            saw_letter = true;
            if !c.is_uppercase() {
                return false;
            }
        }
    }
    saw_letter
}

// ── registry ──

/// All journal profiles known to the engine. Built once, then shared
/// read-only; conversions never mutate it.
#[derive(Debug, Clone)]
pub struct ProfileRegistry {
    generic: JournalProfile,
    /// Journal-specific profiles keyed by lowercase id.
    profiles: HashMap<String, JournalProfile>,
}

impl ProfileRegistry {
    /// Registry holding the built-in profiles.
    pub fn builtin() -> Self {
        let mut profiles = HashMap::new();
        for profile in [
            orgsci_profile(),
            annurev_orgpsych_profile(),
            aom_profile(),
            asq_profile(),
        ] {
            profiles.insert(profile.id.clone(), profile);
        }
        ProfileRegistry {
            generic: generic_profile(),
            profiles,
        }
    }

    /// Look up a journal id (case-insensitive), falling back to the generic
    /// profile for empty or unknown ids.
    pub fn get(&self, journal_id: &str) -> &JournalProfile {
        let key = journal_id.trim().to_lowercase();
        if key.is_empty() || key == GENERIC_PROFILE_ID {
            return &self.generic;
        }
        match self.profiles.get(&key) {
            Some(profile) => profile,
            None => {
                tracing::debug!(journal = %journal_id, "unknown journal id, using generic profile");
                &self.generic
            }
        }
    }

    /// Known ids: generic first, then journal-specific ids sorted.
    pub fn ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.profiles.keys().map(String::as_str).collect();
        ids.sort_unstable();
        ids.insert(0, GENERIC_PROFILE_ID);
        ids
    }

    /// Registry with user additions from the config file layered on top of
    /// the built-ins. Extra headings become exact rules appended after the
    /// profile's own; bibliography headings replace the profile's list. An
    /// unknown id under `[profiles.<id>]` starts from a generic clone.
    pub fn with_config(config: &crate::config_file::ConfigFile) -> Self {
        let mut registry = Self::builtin();
        let Some(overrides) = &config.profiles else {
            return registry;
        };
        for (id, over) in overrides {
            let key = id.trim().to_lowercase();
            let profile = if key == GENERIC_PROFILE_ID {
                &mut registry.generic
            } else {
                registry.profiles.entry(key.clone()).or_insert_with(|| {
                    let mut base = generic_profile();
                    base.id = key.clone();
                    base
                })
            };
            if let Some(extra) = &over.extra_headings {
                for name in extra {
                    profile.heading_rules.push(HeadingRule::exact(name));
                }
            }
            if let Some(bib) = &over.bibliography_headings {
                profile.bibliography_headings = bib.clone();
            }
        }
        registry
    }
}

// ── built-in profiles ──

/// Headings shared across management and organization journals.
const COMMON_HEADINGS: &[&str] = &[
    "Abstract",
    "Keywords",
    "Introduction",
    "Background",
    "Literature Review",
    "Related Work",
    "Theory and Hypotheses",
    "Hypotheses",
    "Data",
    "Methods",
    "Data and Methods",
    "Research Design",
    "Measures",
    "Analysis",
    "Results",
    "Findings",
    "Robustness Checks",
    "Discussion",
    "Limitations",
    "Conclusion",
    "Acknowledgements",
    "Appendix",
    "Endnotes",
    "References",
    "Bibliography",
    "Works Cited",
];

static NUMBERED_HEADING_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{1,2}\.?\s+[A-Z]").unwrap());

static ALL_CAPS_HEADING_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Z][A-Z\s&\-]{3,}$").unwrap());

fn base_rules() -> Vec<HeadingRule> {
    COMMON_HEADINGS.iter().map(|h| HeadingRule::exact(h)).collect()
}

fn default_bibliography_headings() -> Vec<String> {
    vec![
        "References".to_string(),
        "Bibliography".to_string(),
        "Works Cited".to_string(),
        "Literature Cited".to_string(),
        "Reference List".to_string(),
    ]
}

fn generic_profile() -> JournalProfile {
    let mut rules = base_rules();
    rules.push(HeadingRule::font_heuristic());
    JournalProfile {
        id: GENERIC_PROFILE_ID.to_string(),
        heading_rules: rules,
        grammars: GrammarId::all().to_vec(),
        bibliography_headings: default_bibliography_headings(),
    }
}

/// Organization Science: numbered bold headings ("1. Introduction").
fn orgsci_profile() -> JournalProfile {
    let mut rules = base_rules();
    rules.push(HeadingRule::pattern(NUMBERED_HEADING_RE.clone()));
    rules.push(HeadingRule::font_heuristic());
    JournalProfile {
        id: "orgsci".to_string(),
        heading_rules: rules,
        grammars: GrammarId::all().to_vec(),
        bibliography_headings: default_bibliography_headings(),
    }
}

/// Annual Review of Organizational Psychology: all-caps headings and a
/// bibliography titled "Literature Cited".
fn annurev_orgpsych_profile() -> JournalProfile {
    let mut rules = base_rules();
    rules.push(HeadingRule::exact("Literature Cited"));
    rules.push(HeadingRule::pattern(ALL_CAPS_HEADING_RE.clone()));
    rules.push(HeadingRule::font_heuristic());
    JournalProfile {
        id: "annurev-orgpsych".to_string(),
        heading_rules: rules,
        grammars: GrammarId::all().to_vec(),
        bibliography_headings: vec!["Literature Cited".to_string(), "References".to_string()],
    }
}

/// Academy of Management journals: all-caps headings, page-located quotes.
fn aom_profile() -> JournalProfile {
    let mut rules = base_rules();
    rules.push(HeadingRule::pattern(ALL_CAPS_HEADING_RE.clone()));
    rules.push(HeadingRule::font_heuristic());
    JournalProfile {
        id: "aom".to_string(),
        heading_rules: rules,
        grammars: GrammarId::all().to_vec(),
        bibliography_headings: default_bibliography_headings(),
    }
}

/// Administrative Science Quarterly: plain bold headings at body size.
fn asq_profile() -> JournalProfile {
    let mut rules = base_rules();
    rules.push(HeadingRule::font_heuristic());
    JournalProfile {
        id: "asq".to_string(),
        heading_rules: rules,
        grammars: GrammarId::all().to_vec(),
        bibliography_headings: default_bibliography_headings(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn block(text: &str, kind: BlockKind, font_size: f32, is_bold: bool) -> TextBlock {
        TextBlock {
            page: 1,
            order: 0,
            kind,
            text: text.to_string(),
            font_size,
            is_bold,
            is_italic: false,
            y_position: 700.0,
        }
    }

    // =========================================================================
    // registry
    // =========================================================================

    #[test]
    fn test_registry_known_ids() {
        let registry = ProfileRegistry::builtin();
        assert_eq!(registry.get("orgsci").id, "orgsci");
        assert_eq!(registry.get("OrgSci").id, "orgsci");
        assert_eq!(registry.get("annurev-orgpsych").id, "annurev-orgpsych");
    }

    #[test]
    fn test_registry_falls_back_to_generic() {
        let registry = ProfileRegistry::builtin();
        assert_eq!(registry.get("").id, GENERIC_PROFILE_ID);
        assert_eq!(registry.get("unknown-journal").id, GENERIC_PROFILE_ID);
    }

    #[test]
    fn test_registry_ids_generic_first() {
        let registry = ProfileRegistry::builtin();
        let ids = registry.ids();
        assert_eq!(ids[0], GENERIC_PROFILE_ID);
        assert!(ids.contains(&"orgsci"));
        assert!(ids.contains(&"asq"));
    }

    // =========================================================================
    // heading detection
    // =========================================================================

    #[test]
    fn test_exact_heading_case_insensitive() {
        let registry = ProfileRegistry::builtin();
        let ctx = HeadingContext::default();
        let b = block("INTRODUCTION", BlockKind::Paragraph, 10.0, false);
        let m = registry.get("generic").detect_heading(&b, &ctx).unwrap();
        assert_eq!(m.canonical, "Introduction");
    }

    #[test]
    fn test_exact_heading_fuzzy_tolerance() {
        let registry = ProfileRegistry::builtin();
        let ctx = HeadingContext::default();
        // Dropped character, as ligature damage produces.
        let b = block("Acknowledgemets", BlockKind::Paragraph, 10.0, false);
        let m = registry.get("generic").detect_heading(&b, &ctx).unwrap();
        assert_eq!(m.canonical, "Acknowledgements");
    }

    #[test]
    fn test_numbered_pattern_adopts_block_text() {
        let registry = ProfileRegistry::builtin();
        let ctx = HeadingContext::default();
        let b = block("3. Empirical Setting", BlockKind::Paragraph, 10.0, true);
        let m = registry.get("orgsci").detect_heading(&b, &ctx).unwrap();
        assert_eq!(m.canonical, "Empirical Setting");
        assert_eq!(m.specificity, 2);
    }

    #[test]
    fn test_numbered_pattern_needs_heading_signal() {
        let registry = ProfileRegistry::builtin();
        let ctx = HeadingContext::default();
        // Body prose starting with an enumeration, not bold, body font.
        let b = block("1. We first collected", BlockKind::Paragraph, 10.0, false);
        assert!(registry.get("orgsci").detect_heading(&b, &ctx).is_none());
    }

    #[test]
    fn test_exact_beats_pattern() {
        let registry = ProfileRegistry::builtin();
        let ctx = HeadingContext::default();
        // Matches both the all-caps pattern and the exact "References" rule;
        // the canonical name proves the exact rule won.
        let b = block("REFERENCES", BlockKind::HeadingCandidate, 12.0, true);
        let m = registry.get("aom").detect_heading(&b, &ctx).unwrap();
        assert_eq!(m.canonical, "References");
        assert_eq!(m.specificity, 3);
    }

    #[test]
    fn test_font_heuristic_on_oversized_block() {
        let registry = ProfileRegistry::builtin();
        let ctx = HeadingContext::default();
        let b = block("Empirical Context", BlockKind::Paragraph, 12.0, false);
        let m = registry.get("generic").detect_heading(&b, &ctx).unwrap();
        assert_eq!(m.canonical, "Empirical Context");
        assert_eq!(m.specificity, 1);
    }

    #[test]
    fn test_font_heuristic_ignores_title_sized_text() {
        let registry = ProfileRegistry::builtin();
        let ctx = HeadingContext::default();
        let b = block(
            "Performance Feedback and Innovation",
            BlockKind::HeadingCandidate,
            19.0,
            true,
        );
        assert!(registry.get("generic").detect_heading(&b, &ctx).is_none());
    }

    #[test]
    fn test_font_heuristic_rejects_long_blocks() {
        let registry = ProfileRegistry::builtin();
        let ctx = HeadingContext::default();
        let long = "This oversized opening line runs far past any plausible heading length and keeps going";
        let b = block(long, BlockKind::HeadingCandidate, 12.0, false);
        assert!(registry.get("generic").detect_heading(&b, &ctx).is_none());
    }

    #[test]
    fn test_footnote_and_page_number_never_match() {
        let registry = ProfileRegistry::builtin();
        let ctx = HeadingContext::default();
        let f = block("Introduction", BlockKind::Footnote, 8.0, false);
        let p = block("14", BlockKind::PageNumber, 9.0, false);
        assert!(registry.get("generic").detect_heading(&f, &ctx).is_none());
        assert!(registry.get("generic").detect_heading(&p, &ctx).is_none());
    }

    #[test]
    fn test_alias_folds_variant_headings() {
        let registry = ProfileRegistry::builtin();
        let ctx = HeadingContext::default();
        let b = block("FINDINGS", BlockKind::HeadingCandidate, 12.0, true);
        let m = registry.get("generic").detect_heading(&b, &ctx).unwrap();
        assert_eq!(m.canonical, "Results");
    }

    #[test]
    fn test_literature_cited_folds_to_references() {
        let registry = ProfileRegistry::builtin();
        let ctx = HeadingContext::default();
        let b = block("LITERATURE CITED", BlockKind::HeadingCandidate, 12.0, true);
        let profile = registry.get("annurev-orgpsych");
        let m = profile.detect_heading(&b, &ctx).unwrap();
        assert_eq!(m.canonical, "References");
        assert!(profile.is_bibliography_heading(&m.canonical));
    }

    // =========================================================================
    // aliases
    // =========================================================================

    #[test]
    fn test_canonical_alias_lookup() {
        assert_eq!(canonical_alias("findings", 0.88), Some("Results"));
        assert_eq!(canonical_alias("related work", 0.88), Some("Background"));
        assert_eq!(canonical_alias("works cited", 0.88), Some("References"));
        assert_eq!(canonical_alias("empirical setting", 0.88), None);
    }

    #[test]
    fn test_canonical_alias_exact_wins_over_fuzzy() {
        // "analyses" is close enough to "analysis" to fuzzy-match, but its
        // own exact row must resolve first.
        assert_eq!(canonical_alias("analyses", 0.88), Some("Analysis"));
    }

    // =========================================================================
    // config overrides
    // =========================================================================

    #[test]
    fn test_with_config_adds_headings() {
        let toml_str = r#"
            [profiles.orgsci]
            extra_headings = ["Empirical Setting"]

            [profiles.strategic-mgmt]
            bibliography_headings = ["Sources"]
        "#;
        let config: crate::config_file::ConfigFile = toml::from_str(toml_str).unwrap();
        let registry = ProfileRegistry::with_config(&config);
        let ctx = HeadingContext::default();

        let b = block("Empirical Setting", BlockKind::Paragraph, 10.0, false);
        let m = registry.get("orgsci").detect_heading(&b, &ctx).unwrap();
        assert_eq!(m.canonical, "Empirical Setting");
        assert_eq!(m.specificity, 3);

        let custom = registry.get("strategic-mgmt");
        assert_eq!(custom.id, "strategic-mgmt");
        assert!(custom.is_bibliography_heading("Sources"));
        assert!(!custom.is_bibliography_heading("References"));
    }

    #[test]
    fn test_grammar_selection() {
        let registry = ProfileRegistry::builtin();
        let grammars = registry.get("generic").select_grammars();
        assert_eq!(grammars.len(), 4);
        assert_eq!(grammars[0], GrammarId::ParentheticalGroup);
    }
}
