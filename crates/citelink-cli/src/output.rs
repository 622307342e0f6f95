use std::io::Write;
use std::path::Path;

use citelink_core::{ConversionStats, ConversionWarning};
use owo_colors::OwoColorize;

/// Whether to use colored output.
#[derive(Debug, Clone, Copy)]
pub struct ColorMode(pub bool);

impl ColorMode {
    pub fn enabled(&self) -> bool {
        self.0
    }
}

/// Print the one-line result for a converted file and where its tables went.
pub fn print_file_success(
    w: &mut dyn Write,
    name: &str,
    stats: &ConversionStats,
    sections_path: &Path,
    references_path: &Path,
    color: ColorMode,
) -> std::io::Result<()> {
    let detail = format!(
        "{} pages, {} sections, {} references",
        stats.pages, stats.sections, stats.references
    );
    if color.enabled() {
        write!(w, "{}: {}", name.bold(), detail)?;
    } else {
        write!(w, "{}: {}", name, detail)?;
    }
    if stats.unresolved_references > 0 {
        let note = format!(" ({} unresolved)", stats.unresolved_references);
        if color.enabled() {
            write!(w, "{}", note.yellow())?;
        } else {
            write!(w, "{}", note)?;
        }
    }
    writeln!(w)?;

    let files = format!(
        "  -> {}, {}",
        sections_path.display(),
        references_path.display()
    );
    if color.enabled() {
        writeln!(w, "{}", files.dimmed())?;
    } else {
        writeln!(w, "{}", files)?;
    }
    Ok(())
}

/// Print document-level conversion warnings. Per-reference unresolved
/// warnings are summarized in the stats line instead of listed here.
pub fn print_warnings(
    w: &mut dyn Write,
    warnings: &[ConversionWarning],
    color: ColorMode,
) -> std::io::Result<()> {
    for warning in warnings {
        if matches!(warning, ConversionWarning::BibliographyUnresolved { .. }) {
            continue;
        }
        if color.enabled() {
            writeln!(w, "  {} {}", "WARNING:".yellow(), warning)?;
        } else {
            writeln!(w, "  WARNING: {}", warning)?;
        }
    }
    Ok(())
}

/// Print the one-line failure for a file that produced no tables.
pub fn print_file_failure(
    w: &mut dyn Write,
    name: &str,
    error: &anyhow::Error,
    color: ColorMode,
) -> std::io::Result<()> {
    if color.enabled() {
        writeln!(w, "{}: {} ({})", name.bold(), "FAILED".red(), error)?;
    } else {
        writeln!(w, "{}: FAILED ({})", name, error)?;
    }
    Ok(())
}

pub fn print_interrupted(w: &mut dyn Write, color: ColorMode) -> std::io::Result<()> {
    if color.enabled() {
        writeln!(w, "{}", "Interrupted.".yellow())?;
    } else {
        writeln!(w, "Interrupted.")?;
    }
    Ok(())
}

/// Print the final summary for a multi-file run.
#[allow(clippy::too_many_arguments)]
pub fn print_batch_summary(
    w: &mut dyn Write,
    converted: usize,
    failed: usize,
    total: usize,
    sections: usize,
    references: usize,
    unresolved: usize,
    color: ColorMode,
) -> std::io::Result<()> {
    writeln!(w)?;
    let sep = "=".repeat(60);
    if color.enabled() {
        writeln!(w, "{}", sep.bold())?;
        writeln!(w, "{}", "SUMMARY".bold())?;
        writeln!(w, "{}", sep.bold())?;
    } else {
        writeln!(w, "{}", sep)?;
        writeln!(w, "SUMMARY")?;
        writeln!(w, "{}", sep)?;
    }

    writeln!(w, "  Files converted: {}/{}", converted, total)?;
    if failed > 0 {
        if color.enabled() {
            writeln!(w, "  {} {}", "Failed:".red(), failed)?;
        } else {
            writeln!(w, "  Failed: {}", failed)?;
        }
    }
    writeln!(w, "  Sections: {}", sections)?;
    writeln!(w, "  References: {}", references)?;
    if unresolved > 0 {
        let msg = format!("Unresolved bibliography entries: {}", unresolved);
        if color.enabled() {
            writeln!(w, "  {}", msg.dimmed())?;
        } else {
            writeln!(w, "  {}", msg)?;
        }
    }
    writeln!(w)?;
    Ok(())
}
