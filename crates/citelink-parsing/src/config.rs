use citelink_core::HeadingContext;
use regex::Regex;

/// Controls how a list of patterns/values is overridden from its defaults.
#[derive(Debug, Clone, Default)]
pub enum ListOverride<T> {
    /// Use the built-in defaults.
    #[default]
    Default,
    /// Completely replace the defaults with these values.
    Replace(Vec<T>),
    /// Append these values to the defaults.
    Extend(Vec<T>),
}

impl<T: Clone> ListOverride<T> {
    /// Resolve this override against the given defaults.
    pub fn resolve(&self, defaults: &[T]) -> Vec<T> {
        match self {
            ListOverride::Default => defaults.to_vec(),
            ListOverride::Replace(v) => v.clone(),
            ListOverride::Extend(v) => {
                let mut result = defaults.to_vec();
                result.extend(v.iter().cloned());
                result
            }
        }
    }
}

/// Configuration for the segmentation/scanning/resolution pipeline.
///
/// All regex fields are `Option<Regex>` — `None` means "use the built-in
/// default". Use [`EngineConfigBuilder`] to construct with string patterns.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    // ── segment.rs ──
    /// Points above body font size at which a block reads as a heading.
    pub(crate) heading_font_delta: f32,
    /// Maximum character count for heuristic headings.
    pub(crate) short_heading_max_chars: usize,
    /// Fuzzy-match threshold for heading names (0.0–1.0).
    pub(crate) fuzzy_heading_threshold: f64,
    /// Headings that open the bibliography, layered over the profile's own.
    pub(crate) bibliography_headings: ListOverride<String>,

    // ── scan.rs ──
    /// Pattern for semicolon-separated parenthetical groups.
    pub(crate) group_citation_re: Option<Regex>,
    /// Pattern for single parenthetical citations.
    pub(crate) single_citation_re: Option<Regex>,
    /// Pattern for narrative "Author (Year)" citations.
    pub(crate) narrative_citation_re: Option<Regex>,
    /// Pattern for paginated "(Author, Year: pp)" citations.
    pub(crate) paginated_citation_re: Option<Regex>,
    /// Bracketed-numeral count above which zero matches raises a coverage
    /// warning.
    pub(crate) bracket_census_threshold: usize,

    // ── resolve.rs ──
    /// Pattern splitting the bibliography into entries.
    pub(crate) entry_split_re: Option<Regex>,
    /// Minimum character length for a split piece to count as an entry.
    pub(crate) min_entry_len: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            heading_font_delta: 1.5,
            short_heading_max_chars: 80,
            fuzzy_heading_threshold: 0.88,
            bibliography_headings: ListOverride::Default,
            group_citation_re: None,
            single_citation_re: None,
            narrative_citation_re: None,
            paginated_citation_re: None,
            bracket_census_threshold: 5,
            entry_split_re: None,
            min_entry_len: 20,
        }
    }
}

impl EngineConfig {
    /// Heading-detection thresholds for a document whose median body font
    /// size is `body_font_size`.
    pub(crate) fn heading_context(&self, body_font_size: f32) -> HeadingContext {
        HeadingContext {
            body_font_size,
            heading_font_delta: self.heading_font_delta,
            short_heading_max_chars: self.short_heading_max_chars,
            fuzzy_heading_threshold: self.fuzzy_heading_threshold,
        }
    }
}

/// Builder for [`EngineConfig`].
///
/// Accepts string patterns that are compiled to `Regex` in
/// [`build()`](Self::build). Fails fast with `regex::Error` if any pattern
/// is invalid.
#[derive(Debug, Clone, Default)]
pub struct EngineConfigBuilder {
    heading_font_delta: Option<f32>,
    short_heading_max_chars: Option<usize>,
    fuzzy_heading_threshold: Option<f64>,
    bibliography_headings: ListOverridePlainBuilder,
    group_citation_re: Option<String>,
    single_citation_re: Option<String>,
    narrative_citation_re: Option<String>,
    paginated_citation_re: Option<String>,
    bracket_census_threshold: Option<usize>,
    entry_split_re: Option<String>,
    min_entry_len: Option<usize>,
}

/// Helper for building `ListOverride<String>`.
#[derive(Debug, Clone, Default)]
enum ListOverridePlainBuilder {
    #[default]
    Default,
    Replace(Vec<String>),
    Extend(Vec<String>),
}

impl EngineConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    // ── Segmentation thresholds ──

    pub fn heading_font_delta(mut self, delta: f32) -> Self {
        self.heading_font_delta = Some(delta);
        self
    }

    pub fn short_heading_max_chars(mut self, n: usize) -> Self {
        self.short_heading_max_chars = Some(n);
        self
    }

    pub fn fuzzy_heading_threshold(mut self, threshold: f64) -> Self {
        self.fuzzy_heading_threshold = Some(threshold);
        self
    }

    // ── Bibliography headings ──

    pub fn set_bibliography_headings(mut self, headings: Vec<String>) -> Self {
        self.bibliography_headings = ListOverridePlainBuilder::Replace(headings);
        self
    }

    pub fn add_bibliography_heading(mut self, heading: String) -> Self {
        match &mut self.bibliography_headings {
            ListOverridePlainBuilder::Extend(v) => v.push(heading),
            _ => self.bibliography_headings = ListOverridePlainBuilder::Extend(vec![heading]),
        }
        self
    }

    // ── Citation grammar patterns ──

    pub fn group_citation_regex(mut self, pattern: &str) -> Self {
        self.group_citation_re = Some(pattern.to_string());
        self
    }

    pub fn single_citation_regex(mut self, pattern: &str) -> Self {
        self.single_citation_re = Some(pattern.to_string());
        self
    }

    pub fn narrative_citation_regex(mut self, pattern: &str) -> Self {
        self.narrative_citation_re = Some(pattern.to_string());
        self
    }

    pub fn paginated_citation_regex(mut self, pattern: &str) -> Self {
        self.paginated_citation_re = Some(pattern.to_string());
        self
    }

    pub fn bracket_census_threshold(mut self, n: usize) -> Self {
        self.bracket_census_threshold = Some(n);
        self
    }

    // ── Bibliography splitting ──

    pub fn entry_split_regex(mut self, pattern: &str) -> Self {
        self.entry_split_re = Some(pattern.to_string());
        self
    }

    pub fn min_entry_len(mut self, n: usize) -> Self {
        self.min_entry_len = Some(n);
        self
    }

    /// Compile all string patterns into regexes and produce an
    /// [`EngineConfig`].
    pub fn build(self) -> Result<EngineConfig, regex::Error> {
        let compile = |opt: Option<String>| -> Result<Option<Regex>, regex::Error> {
            opt.map(|p| Regex::new(&p)).transpose()
        };

        let resolve_plain = |builder: ListOverridePlainBuilder| -> ListOverride<String> {
            match builder {
                ListOverridePlainBuilder::Default => ListOverride::Default,
                ListOverridePlainBuilder::Replace(v) => ListOverride::Replace(v),
                ListOverridePlainBuilder::Extend(v) => ListOverride::Extend(v),
            }
        };

        Ok(EngineConfig {
            heading_font_delta: self.heading_font_delta.unwrap_or(1.5),
            short_heading_max_chars: self.short_heading_max_chars.unwrap_or(80),
            fuzzy_heading_threshold: self.fuzzy_heading_threshold.unwrap_or(0.88),
            bibliography_headings: resolve_plain(self.bibliography_headings),
            group_citation_re: compile(self.group_citation_re)?,
            single_citation_re: compile(self.single_citation_re)?,
            narrative_citation_re: compile(self.narrative_citation_re)?,
            paginated_citation_re: compile(self.paginated_citation_re)?,
            bracket_census_threshold: self.bracket_census_threshold.unwrap_or(5),
            entry_split_re: compile(self.entry_split_re)?,
            min_entry_len: self.min_entry_len.unwrap_or(20),
        })
    }
}
