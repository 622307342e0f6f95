use std::io::Write;
use std::path::Path;

use citelink_core::normalize::collapse_whitespace;
use citelink_core::{ReferenceEntry, Section};

/// Render the sections table: one row per section in document order.
pub fn render_sections_csv(sections: &[Section]) -> String {
    let mut out = String::from("section_name,order,text\n");
    for section in sections {
        out.push_str(&format!(
            "{},{},{}\n",
            csv_escape(&section.canonical_name),
            section.order,
            csv_escape(&sanitize_cell(&section.text)),
        ));
    }
    out
}

/// Render the references table: one row per distinct key in
/// first-occurrence order. `bibliography_text` is empty for keys that
/// never aligned with a bibliography entry.
pub fn render_references_csv(references: &[ReferenceEntry]) -> String {
    let mut out = String::from("reference_key,sections_used_in,occurrence_count,bibliography_text\n");
    for entry in references {
        let sections = entry.sections_used_in.join(";");
        let bibliography = entry.bibliography_text.as_deref().unwrap_or("");
        out.push_str(&format!(
            "{},{},{},{}\n",
            csv_escape(&entry.normalized_key),
            csv_escape(&sections),
            entry.occurrence_count,
            csv_escape(&sanitize_cell(bibliography)),
        ));
    }
    out
}

pub fn write_sections_csv(path: &Path, sections: &[Section]) -> std::io::Result<()> {
    write_file(path, &render_sections_csv(sections))
}

pub fn write_references_csv(path: &Path, references: &[ReferenceEntry]) -> std::io::Result<()> {
    write_file(path, &render_references_csv(references))
}

fn write_file(path: &Path, content: &str) -> std::io::Result<()> {
    let mut file = std::fs::File::create(path)?;
    file.write_all(content.as_bytes())
}

/// Section text spans many blocks; embedded newlines become spaces so each
/// record stays on one line.
fn sanitize_cell(s: &str) -> String {
    if s.contains('\n') || s.contains('\r') {
        collapse_whitespace(s)
    } else {
        s.to_string()
    }
}

fn csv_escape(s: &str) -> String {
    if s.contains('"') || s.contains(',') || s.contains('\n') {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    // ── helpers ──────────────────────────────────────────────────────

    fn make_section(name: &str, order: usize, text: &str) -> Section {
        Section {
            canonical_name: name.to_string(),
            order,
            start_block: order,
            end_block: order,
            text: text.to_string(),
        }
    }

    fn make_reference(
        key: &str,
        sections: &[&str],
        count: usize,
        bibliography: Option<&str>,
    ) -> ReferenceEntry {
        ReferenceEntry {
            normalized_key: key.to_string(),
            sections_used_in: sections.iter().map(|s| s.to_string()).collect(),
            bibliography_text: bibliography.map(|s| s.to_string()),
            occurrence_count: count,
        }
    }

    // ── escaping and sanitization ────────────────────────────────────

    #[test]
    fn test_csv_escape_quotes() {
        assert_eq!(csv_escape(r#"the "core" claim"#), r#""the ""core"" claim""#);
    }

    #[test]
    fn test_csv_escape_comma() {
        assert_eq!(csv_escape("Greve, H. R."), "\"Greve, H. R.\"");
    }

    #[test]
    fn test_csv_escape_clean() {
        assert_eq!(csv_escape("greve2003"), "greve2003");
    }

    #[test]
    fn test_sanitize_cell_flattens_newlines() {
        assert_eq!(
            sanitize_cell("first block\n\nsecond block"),
            "first block second block"
        );
        assert_eq!(sanitize_cell("already flat"), "already flat");
    }

    // ── sections table ───────────────────────────────────────────────

    #[test]
    fn test_sections_csv_rows_in_document_order() {
        let sections = vec![
            make_section("Introduction", 0, "Search is local."),
            make_section("Methods", 1, "We sampled firms."),
        ];
        let csv = render_sections_csv(&sections);
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines[0], "section_name,order,text");
        assert_eq!(lines[1], "Introduction,0,Search is local.");
        assert_eq!(lines[2], "Methods,1,We sampled firms.");
    }

    #[test]
    fn test_sections_csv_quotes_text_with_commas() {
        let sections = vec![make_section(
            "Introduction",
            0,
            "Performance shapes search (Greve, 2003).\nAspirations matter.",
        )];
        let csv = render_sections_csv(&sections);
        assert!(csv.contains(
            "\"Performance shapes search (Greve, 2003). Aspirations matter.\""
        ));
    }

    #[test]
    fn test_sections_csv_header_only_when_empty() {
        assert_eq!(render_sections_csv(&[]), "section_name,order,text\n");
    }

    // ── references table ─────────────────────────────────────────────

    #[test]
    fn test_references_csv_scenario_row() {
        let references = vec![make_reference(
            "greve2003",
            &["Introduction", "Methods"],
            2,
            Some("Greve, H. R. 2003. Organizational learning from performance feedback."),
        )];
        let csv = render_references_csv(&references);
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(
            lines[0],
            "reference_key,sections_used_in,occurrence_count,bibliography_text"
        );
        assert_eq!(
            lines[1],
            "greve2003,Introduction;Methods,2,\"Greve, H. R. 2003. Organizational learning from performance feedback.\""
        );
    }

    #[test]
    fn test_references_csv_unresolved_key_has_empty_bibliography() {
        let references = vec![make_reference("march1991", &["Discussion"], 1, None)];
        let csv = render_references_csv(&references);
        assert!(csv.contains("march1991,Discussion,1,\n"));
    }

    #[test]
    fn test_references_csv_preserves_entry_order() {
        let references = vec![
            make_reference("cyert1963", &["Theory"], 3, None),
            make_reference("march1991", &["Theory"], 1, None),
            make_reference("greve2003", &["Methods"], 2, None),
        ];
        let csv = render_references_csv(&references);
        let keys: Vec<&str> = csv
            .lines()
            .skip(1)
            .map(|l| l.split(',').next().unwrap())
            .collect();
        assert_eq!(keys, vec!["cyert1963", "march1991", "greve2003"]);
    }

    // ── rendering stability and file output ──────────────────────────

    #[test]
    fn test_rendering_is_byte_stable() {
        let sections = vec![make_section("Introduction", 0, "text, with commas\nand lines")];
        let references = vec![make_reference(
            "greve2003",
            &["Introduction"],
            1,
            Some("Greve, H. R. 2003."),
        )];
        assert_eq!(render_sections_csv(&sections), render_sections_csv(&sections));
        assert_eq!(
            render_references_csv(&references),
            render_references_csv(&references)
        );
    }

    #[test]
    fn test_write_round_trips_through_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out_sections.csv");
        let sections = vec![make_section("Results", 2, "Findings hold.")];
        write_sections_csv(&path, &sections).unwrap();
        let written = std::fs::read_to_string(&path).unwrap();
        assert_eq!(written, render_sections_csv(&sections));
    }
}
