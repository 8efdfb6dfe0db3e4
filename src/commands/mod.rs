//! One module per CLI subcommand: the I/O shell around the pure diff core.

pub mod compare;
pub mod diff;
pub mod snapshot;

use crate::cli::ReportFormat;
use crate::report::{DiffReport, JsonWriter, MarkdownWriter, ReportWriter};
use anyhow::{Context, Result};
use std::fs::File;
use std::path::Path;

/// Write the report to a file or stdout in the requested format.
pub(crate) fn write_report(
    report: &DiffReport,
    repo_name: &str,
    format: ReportFormat,
    output: Option<&Path>,
) -> Result<()> {
    let mut writer: Box<dyn ReportWriter> = match (format, output) {
        (ReportFormat::Json, Some(path)) => Box::new(JsonWriter::new(create_file(path)?)),
        (ReportFormat::Json, None) => Box::new(JsonWriter::new(std::io::stdout())),
        (ReportFormat::Markdown, Some(path)) => Box::new(MarkdownWriter::new(create_file(path)?)),
        (ReportFormat::Markdown, None) => Box::new(MarkdownWriter::new(std::io::stdout())),
    };
    writer.write_report(report, repo_name)
}

fn create_file(path: &Path) -> Result<File> {
    File::create(path).with_context(|| format!("failed to create {}", path.display()))
}
