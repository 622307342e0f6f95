use std::collections::HashMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// On-disk TOML configuration structure.
/// All fields are optional so partial configs work (merge with defaults).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConfigFile {
    pub extraction: Option<ExtractionConfig>,
    pub segmentation: Option<SegmentationConfig>,
    pub scanning: Option<ScanningConfig>,
    /// Per-journal additions, keyed by journal id.
    pub profiles: Option<HashMap<String, ProfileOverride>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExtractionConfig {
    /// Fraction of page height excluded at the top (running heads).
    pub header_exclusion_ratio: Option<f32>,
    /// Fraction of page height excluded at the bottom (folios, footers).
    pub footer_exclusion_ratio: Option<f32>,
    /// Per-document extraction deadline; 0 disables it.
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SegmentationConfig {
    pub heading_font_delta: Option<f32>,
    pub short_heading_max_chars: Option<usize>,
    pub fuzzy_heading_threshold: Option<f64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScanningConfig {
    /// Bracketed-numeral count above which zero grammar matches raises a
    /// citation coverage warning.
    pub bracket_census_threshold: Option<usize>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProfileOverride {
    /// Extra section headings, appended to the profile as exact rules.
    pub extra_headings: Option<Vec<String>>,
    /// Replacement list of bibliography headings.
    pub bibliography_headings: Option<Vec<String>>,
}

/// Platform config directory path: `<config_dir>/citelink/config.toml`.
pub fn config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("citelink").join("config.toml"))
}

/// Load config by cascading CWD `.citelink.toml` over platform config.
/// CWD values override platform values.
pub fn load_config() -> ConfigFile {
    let platform = config_path().and_then(|p| load_from_path(&p));
    let cwd = load_from_path(&PathBuf::from(".citelink.toml"));

    match (platform, cwd) {
        (None, None) => ConfigFile::default(),
        (Some(p), None) => p,
        (None, Some(c)) => c,
        (Some(p), Some(c)) => merge(p, c),
    }
}

/// Load a config from a specific path. Returns `None` if the file doesn't
/// exist or can't be parsed.
pub fn load_from_path(path: &PathBuf) -> Option<ConfigFile> {
    let content = std::fs::read_to_string(path).ok()?;
    toml::from_str(&content).ok()
}

/// Merge two configs: `overlay` values take precedence over `base`.
pub fn merge(base: ConfigFile, overlay: ConfigFile) -> ConfigFile {
    ConfigFile {
        extraction: Some(ExtractionConfig {
            header_exclusion_ratio: overlay
                .extraction
                .as_ref()
                .and_then(|e| e.header_exclusion_ratio)
                .or_else(|| {
                    base.extraction
                        .as_ref()
                        .and_then(|e| e.header_exclusion_ratio)
                }),
            footer_exclusion_ratio: overlay
                .extraction
                .as_ref()
                .and_then(|e| e.footer_exclusion_ratio)
                .or_else(|| {
                    base.extraction
                        .as_ref()
                        .and_then(|e| e.footer_exclusion_ratio)
                }),
            timeout_secs: overlay
                .extraction
                .as_ref()
                .and_then(|e| e.timeout_secs)
                .or_else(|| base.extraction.as_ref().and_then(|e| e.timeout_secs)),
        }),
        segmentation: Some(SegmentationConfig {
            heading_font_delta: overlay
                .segmentation
                .as_ref()
                .and_then(|s| s.heading_font_delta)
                .or_else(|| {
                    base.segmentation
                        .as_ref()
                        .and_then(|s| s.heading_font_delta)
                }),
            short_heading_max_chars: overlay
                .segmentation
                .as_ref()
                .and_then(|s| s.short_heading_max_chars)
                .or_else(|| {
                    base.segmentation
                        .as_ref()
                        .and_then(|s| s.short_heading_max_chars)
                }),
            fuzzy_heading_threshold: overlay
                .segmentation
                .as_ref()
                .and_then(|s| s.fuzzy_heading_threshold)
                .or_else(|| {
                    base.segmentation
                        .as_ref()
                        .and_then(|s| s.fuzzy_heading_threshold)
                }),
        }),
        scanning: Some(ScanningConfig {
            bracket_census_threshold: overlay
                .scanning
                .as_ref()
                .and_then(|s| s.bracket_census_threshold)
                .or_else(|| {
                    base.scanning
                        .as_ref()
                        .and_then(|s| s.bracket_census_threshold)
                }),
        }),
        profiles: match (base.profiles, overlay.profiles) {
            (None, None) => None,
            (Some(b), None) => Some(b),
            (None, Some(o)) => Some(o),
            (Some(mut b), Some(o)) => {
                b.extend(o);
                Some(b)
            }
        },
    }
}
