use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

use citelink_core::config_file::{self, ConfigFile};
use citelink_core::{ConversionStats, ConversionWarning, ProfileRegistry};
use citelink_parsing::{ConversionError, EngineConfig, EngineConfigBuilder};
use citelink_pdf::LopdfSource;

mod output;

use output::ColorMode;

/// Structure scholarly PDFs into linked section and reference tables
#[derive(Parser, Debug)]
#[command(name = "citelink", version, about, long_about = None)]
struct Cli {
    /// PDF files to convert
    #[arg(value_name = "PDF", required_unless_present = "list_journals")]
    pdfs: Vec<PathBuf>,

    /// Journal profile id
    #[arg(short, long, default_value = "generic")]
    journal: String,

    /// Output directory for the CSV tables
    #[arg(short, long, value_name = "DIR", default_value = ".")]
    out_dir: PathBuf,

    /// Extraction deadline in seconds, 0 disables (default: 60)
    #[arg(long, value_name = "N")]
    timeout_secs: Option<u64>,

    /// Explicit config file path, skipping the discovery cascade
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Print known journal profile ids and exit
    #[arg(long)]
    list_journals: bool,

    /// Disable colored output
    #[arg(long)]
    no_color: bool,

    /// Errors only
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Debug logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.quiet, cli.verbose);

    // Resolve configuration: --config > CWD file > platform file > defaults
    let config_file = match cli.config {
        Some(ref path) => {
            if !path.exists() {
                anyhow::bail!("Config file not found: {}", path.display());
            }
            config_file::load_from_path(path).ok_or_else(|| {
                anyhow::anyhow!("Cannot parse config file: {}", path.display())
            })?
        }
        None => config_file::load_config(),
    };

    let registry = ProfileRegistry::with_config(&config_file);

    if cli.list_journals {
        for id in registry.ids() {
            println!("{}", id);
        }
        return Ok(());
    }

    let color = ColorMode(!cli.no_color);
    let engine_config = build_engine_config(&config_file)?;
    let source = build_source(&config_file);

    let timeout_secs = cli
        .timeout_secs
        .or_else(|| config_file.extraction.as_ref().and_then(|e| e.timeout_secs))
        .unwrap_or(60);
    let timeout = (timeout_secs > 0).then(|| Duration::from_secs(timeout_secs));

    std::fs::create_dir_all(&cli.out_dir).map_err(|e| {
        anyhow::anyhow!(
            "Cannot create output directory {}: {}",
            cli.out_dir.display(),
            e
        )
    })?;

    let mut writer: Box<dyn Write> = Box::new(std::io::stdout());

    // Set up Ctrl+C handler
    let cancel = CancellationToken::new();
    let cancel_clone = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            cancel_clone.cancel();
        }
    });

    // Progress bar only makes sense for batches; it draws on stderr so the
    // per-file lines on stdout stay clean.
    let bar = if cli.pdfs.len() > 1 && !cli.quiet {
        let bar = ProgressBar::new(cli.pdfs.len() as u64);
        bar.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {msg} [{bar:40.cyan/dim}] {pos}/{len}")
                .unwrap()
                .progress_chars("=> "),
        );
        Some(bar)
    } else {
        None
    };

    let total = cli.pdfs.len();
    let mut converted = 0usize;
    let mut failed = 0usize;
    let mut total_sections = 0usize;
    let mut total_references = 0usize;
    let mut total_unresolved = 0usize;

    for path in &cli.pdfs {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| path.display().to_string());
        if let Some(ref bar) = bar {
            bar.set_message(name.clone());
        }

        match process_file(
            path,
            &cli.journal,
            &cli.out_dir,
            &registry,
            &engine_config,
            &source,
            timeout,
            &cancel,
        ) {
            Ok(report) => {
                converted += 1;
                total_sections += report.stats.sections;
                total_references += report.stats.references;
                total_unresolved += report.stats.unresolved_references;
                if !cli.quiet {
                    output::print_file_success(
                        &mut writer,
                        &name,
                        &report.stats,
                        &report.sections_path,
                        &report.references_path,
                        color,
                    )?;
                    output::print_warnings(&mut writer, &report.warnings, color)?;
                }
            }
            Err(err) => {
                failed += 1;
                let cancelled = err
                    .downcast_ref::<ConversionError>()
                    .is_some_and(|e| matches!(e, ConversionError::Cancelled));
                output::print_file_failure(&mut writer, &name, &err, color)?;
                if cancelled {
                    break;
                }
            }
        }

        if let Some(ref bar) = bar {
            bar.inc(1);
        }
        if cancel.is_cancelled() {
            break;
        }
    }

    if let Some(bar) = bar {
        bar.finish_and_clear();
    }

    if cancel.is_cancelled() {
        output::print_interrupted(&mut writer, color)?;
    }

    if total > 1 && !cli.quiet {
        output::print_batch_summary(
            &mut writer,
            converted,
            failed,
            total,
            total_sections,
            total_references,
            total_unresolved,
            color,
        )?;
    }

    if failed > 0 {
        writer.flush()?;
        anyhow::bail!("{}/{} files failed", failed, total);
    }
    Ok(())
}

/// Result of one successfully converted file.
struct FileReport {
    stats: ConversionStats,
    warnings: Vec<ConversionWarning>,
    sections_path: PathBuf,
    references_path: PathBuf,
}

#[allow(clippy::too_many_arguments)]
fn process_file(
    path: &Path,
    journal: &str,
    out_dir: &Path,
    registry: &ProfileRegistry,
    config: &EngineConfig,
    source: &LopdfSource,
    timeout: Option<Duration>,
    cancel: &CancellationToken,
) -> anyhow::Result<FileReport> {
    if !path.exists() {
        anyhow::bail!("File not found: {}", path.display());
    }
    let bytes = std::fs::read(path)
        .map_err(|e| anyhow::anyhow!("Cannot read {}: {}", path.display(), e))?;

    let deadline = timeout.map(|t| Instant::now() + t);
    let conversion =
        citelink_parsing::convert(&bytes, journal, registry, config, source, deadline, cancel)?;

    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "document".to_string());
    let sections_path = out_dir.join(format!("{}_sections.csv", stem));
    let references_path = out_dir.join(format!("{}_references.csv", stem));

    citelink_reporting::write_sections_csv(&sections_path, &conversion.sections)
        .map_err(|e| anyhow::anyhow!("Cannot write {}: {}", sections_path.display(), e))?;
    citelink_reporting::write_references_csv(&references_path, &conversion.references)
        .map_err(|e| anyhow::anyhow!("Cannot write {}: {}", references_path.display(), e))?;

    Ok(FileReport {
        stats: conversion.stats,
        warnings: conversion.warnings,
        sections_path,
        references_path,
    })
}

/// Engine configuration from the config file's scalar sections. CLI flags
/// have no counterpart here; the file is the only tuning surface.
fn build_engine_config(config: &ConfigFile) -> anyhow::Result<EngineConfig> {
    let mut builder = EngineConfigBuilder::new();
    if let Some(seg) = &config.segmentation {
        if let Some(delta) = seg.heading_font_delta {
            builder = builder.heading_font_delta(delta);
        }
        if let Some(n) = seg.short_heading_max_chars {
            builder = builder.short_heading_max_chars(n);
        }
        if let Some(threshold) = seg.fuzzy_heading_threshold {
            builder = builder.fuzzy_heading_threshold(threshold);
        }
    }
    if let Some(scan) = &config.scanning {
        if let Some(n) = scan.bracket_census_threshold {
            builder = builder.bracket_census_threshold(n);
        }
    }
    Ok(builder.build()?)
}

fn build_source(config: &ConfigFile) -> LopdfSource {
    let mut source = LopdfSource::new();
    if let Some(extraction) = &config.extraction {
        if let Some(ratio) = extraction.footer_exclusion_ratio {
            source = source.with_footer_exclusion(ratio);
        }
        if let Some(ratio) = extraction.header_exclusion_ratio {
            source = source.with_header_exclusion(ratio);
        }
    }
    source
}

/// Stderr logging honoring RUST_LOG over the -v/-q flags.
fn init_tracing(quiet: bool, verbose: bool) {
    let default_filter = if verbose {
        "debug"
    } else if quiet {
        "error"
    } else {
        "warn"
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
