//! `compare`: diff two stored dataset snapshots.

use crate::cli::{repo_display_name, ReportFormat};
use crate::core::DatasetMap;
use crate::report::DiffReport;
use anyhow::{Context, Result};
use colored::Colorize;
use std::fs;
use std::path::{Path, PathBuf};

pub struct CompareConfig {
    pub head_path: PathBuf,
    pub base_path: PathBuf,
    pub format: ReportFormat,
    pub output: Option<PathBuf>,
    pub repo: Option<String>,
}

/// I/O: load a stored dataset snapshot.
fn load_snapshot(path: &Path) -> Result<DatasetMap> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("failed to read snapshot {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("failed to parse snapshot JSON from {}", path.display()))
}

pub fn run(config: CompareConfig) -> Result<()> {
    let head = load_snapshot(&config.head_path)?;
    let base = load_snapshot(&config.base_path)?;

    let report = DiffReport::new(head, base);
    let repo_name = repo_display_name(config.repo.as_deref());
    super::write_report(&report, &repo_name, config.format, config.output.as_deref())?;

    if config.output.is_some() {
        print_terminal_summary(&report);
    }
    Ok(())
}

/// Short colored recap for the terminal when the report went to a file.
pub(crate) fn print_terminal_summary(report: &DiffReport) {
    if !report.has_changes() {
        println!("{}", "No change in metrics coverage".dimmed());
        return;
    }

    let summary = report.summary();
    let net = summary.net_instrumented();
    let headline = if net >= 0 {
        format!("+{net} metrics").green()
    } else {
        format!("{net} metrics").red()
    };
    println!(
        "{headline} (+{} / -{}), {} functions deleted",
        summary.instrumented_added, summary.instrumented_removed, summary.functions_deleted
    );
    if summary.added_without_instrumentation != 0 {
        println!(
            "{}",
            format!(
                "{} new functions without metrics",
                summary.added_without_instrumentation
            )
            .yellow()
        );
    }
}
