//! Rendering of a diff into the PR comment report.
//!
//! The Markdown layout is the Autometrics report: a summary bullet list, a
//! per-root "Metrics changes" section with function tables, and collapsible
//! details listing both full datasets. The footer doubles as the marker the
//! comment updater searches for when deciding whether to edit a previous
//! report or post a fresh one.

use crate::core::{Dataset, DatasetMap, FunctionId};
use crate::diff::summary::{summarize, DiffSummary};
use crate::diff::{diff_dataset_maps, DatasetDiff, DatasetDiffMap};
use serde::Serialize;
use std::collections::BTreeMap;
use std::io::Write;

const LOGO_URL: &str = "https://explorer.autometrics.dev/favicon.raw.19b993d4.svg";

/// Marker appended to every report; also used to recognize our own comment.
pub const COMMENT_FOOTER: &str = "\n\n<a href=\"https://github.com/autometrics-dev/diff-metrics\"><sub>Autometrics diff-metrics</sub></a>";

/// Above this many rows a function table is split per module into
/// collapsible sections to keep the comment scannable.
const PER_MODULE_TABLES_THRESHOLD: usize = 10;

/// Everything the renderer needs: the diff plus both source dataset maps.
#[derive(Clone, Debug, Serialize)]
pub struct DiffReport {
    pub base: DatasetMap,
    pub head: DatasetMap,
    pub diff: DatasetDiffMap,
}

impl DiffReport {
    /// Diff the two maps and bundle everything for rendering.
    pub fn new(head: DatasetMap, base: DatasetMap) -> Self {
        let diff = diff_dataset_maps(&head, &base);
        Self { base, head, diff }
    }

    pub fn summary(&self) -> DiffSummary {
        summarize(&self.diff, &self.head, &self.base)
    }

    /// True when any root carries a function-level change.
    pub fn has_changes(&self) -> bool {
        self.diff.values().any(|item| !item.is_empty())
    }
}

/// Format a ratio as a percentage with two decimals, e.g. `12.50` or
/// `+3.33` when the sign is forced. The caller appends the `%`.
pub fn format_ratio_as_percentage(ratio: f64, force_sign: bool) -> String {
    let percentage = ratio * 100.0;
    if force_sign {
        format!("{percentage:+.2}")
    } else {
        format!("{percentage:.2}")
    }
}

/// Render the full PR comment body.
pub fn render_comment(report: &DiffReport, repo_name: &str) -> String {
    let mut body = format!(
        "# ![Autometrics logo]({LOGO_URL}) Autometrics Report\n{}",
        format_summary(report)
    );

    if !report.has_changes() {
        body.push('\n');
        body.push_str(COMMENT_FOOTER);
        return body;
    }

    body.push_str("\n## Metrics changes\n");
    body.push_str(&format_diff_map(report, repo_name));
    body.push_str("\n## Details\n");
    body.push_str(&format!(
        "<details><summary>Metrics in base (old) branch</summary>\n{}</details>\n",
        format_dataset_map(&report.base, repo_name)
    ));
    body.push_str(&format!(
        "<details><summary>Metrics in head (new) branch</summary>\n{}</details>\n",
        format_dataset_map(&report.head, repo_name)
    ));
    body.push_str(COMMENT_FOOTER);
    body
}

fn format_summary(report: &DiffReport) -> String {
    if !report.has_changes() {
        return "No change\n".to_string();
    }

    let summary = report.summary();
    let mut text = String::new();

    if summary.instrumented_added >= summary.instrumented_removed {
        text.push_str(&format!(
            "  - {} metrics <b>added</b> (+{} / -{})\n",
            summary.net_instrumented(),
            summary.instrumented_added,
            summary.instrumented_removed
        ));
    } else {
        text.push_str(&format!(
            "  - {} metrics <b>removed</b> (+{} / -{})\n",
            -summary.net_instrumented(),
            summary.instrumented_added,
            summary.instrumented_removed
        ));
    }

    if summary.functions_deleted != 0 {
        text.push_str(&format!(
            "  - {} functions deleted\n",
            summary.functions_deleted
        ));
    }

    if let Some(coverage) = summary.new_function_coverage {
        text.push_str(&format!(
            "  - {}% of new functions have metrics.\n",
            format_ratio_as_percentage(coverage, false)
        ));
    }
    if summary.added_without_instrumentation != 0 {
        text.push_str(&format!(
            "  - {} new functions do _not_ have metrics.\n",
            summary.added_without_instrumentation
        ));
    }

    match (summary.head_coverage, summary.base_coverage) {
        (Some(head_coverage), Some(base_coverage)) => {
            text.push_str(&format!(
                "  - {}% change in metrics coverage (From `{}` to `{}`).\n",
                format_ratio_as_percentage(head_coverage - base_coverage, true),
                format_ratio_as_percentage(base_coverage, false),
                format_ratio_as_percentage(head_coverage, false)
            ));
        }
        (None, _) => text.push_str("  - \u{1f9f9} Removing all functions.\n"),
        (Some(head_coverage), None) => {
            text.push_str(&format!(
                "  - \u{1f4ab} New metrics coverage: {}%.\n",
                format_ratio_as_percentage(head_coverage, true)
            ));
        }
    }

    text
}

fn format_diff_map(report: &DiffReport, repo_name: &str) -> String {
    if report.diff.is_empty() {
        return "\u{1f44c} No data to report\n".to_string();
    }

    let empty = Dataset::default();
    let mut text = String::new();
    for (root, item) in &report.diff {
        let base_set = report.base.get(root).unwrap_or(&empty);
        let head_set = report.head.get(root).unwrap_or(&empty);
        text.push_str(&format!("### In `{}`\n\n", format_root(root, repo_name)));
        text.push_str(&format!(
            "{}\n\n",
            format_diff_summary(item, base_set, head_set)
        ));
        text.push_str(&format!("{}\n\n", format_diff_table(item)));
    }
    text
}

fn format_diff_summary(diff: &DatasetDiff, base: &Dataset, head: &Dataset) -> String {
    let mut text = String::new();

    if let Some(delta) = diff.coverage_ratio_delta {
        text.push_str(&format!(
            "- {}% change in metrics coverage \n  + From `{} / {}` functions with metrics to `{} / {}`.\n",
            format_ratio_as_percentage(delta, true),
            base.instrumented.len(),
            base.total(),
            head.instrumented.len(),
            head.total()
        ));
    }

    let new_total = diff.added_instrumented.len() + diff.added_uninstrumented.len();
    if new_total != 0 {
        let coverage = diff.added_instrumented.len() as f64 / new_total as f64;
        text.push_str(&format!(
            "- {}% of new functions have metrics.",
            format_ratio_as_percentage(coverage, false)
        ));
    }

    text
}

fn format_diff_table(diff: &DatasetDiff) -> String {
    let mut text = String::new();

    if !diff.newly_instrumented.is_empty() || !diff.no_longer_instrumented.is_empty() {
        text.push_str("### Existing functions\n");
        if !diff.newly_instrumented.is_empty() {
            text.push_str("\u{1f4ca} Existing functions that get metrics now\n\n");
            text.push_str(&function_table(&diff.newly_instrumented, false));
        }
        text.push_str("---\n\n");
        if !diff.no_longer_instrumented.is_empty() {
            text.push_str("\u{1f507} Existing functions that do not get metrics anymore\n\n");
            text.push_str(&function_table(&diff.no_longer_instrumented, false));
        }
        text.push_str("---\n\n");
    }

    if !diff.added_instrumented.is_empty() || !diff.added_uninstrumented.is_empty() {
        text.push_str("### Added functions\n");
        if !diff.added_instrumented.is_empty() {
            text.push_str("\u{1f4ca} <i>New</i> functions that get metrics\n\n");
            text.push_str(&function_table(&diff.added_instrumented, false));
        } else {
            text.push_str("\u{26a0}\u{fe0f} No new function has metrics.\n\n");
        }
        text.push_str("---\n\n");
        if !diff.added_uninstrumented.is_empty() {
            text.push_str("\u{1f507} <i>New</i> functions that do not get metrics\n\n");
            text.push_str(&function_table(&diff.added_uninstrumented, false));
        } else {
            text.push_str(
                "\u{1f4ab} All new functions in the Pull Request have metrics!\n\n",
            );
        }
    }

    text
}

fn format_dataset_map(map: &DatasetMap, repo_name: &str) -> String {
    if map.is_empty() {
        return "No data to report\n".to_string();
    }
    let mut text = String::new();
    for (root, dataset) in map {
        text.push_str(&format!("In `{}`\n\n", format_root(root, repo_name)));
        text.push_str(&format!("{}\n\n", format_dataset(dataset)));
    }
    text
}

fn format_dataset(dataset: &Dataset) -> String {
    let mut text = String::new();
    if !dataset.instrumented.is_empty() {
        text.push_str("\u{1f4ca} <b>Autometricized functions</b>\n");
        text.push_str(&function_table(&dataset.instrumented, false));
    }
    text
}

/// Render a function list as a Markdown table, or as per-module collapsible
/// tables once the list gets long.
fn function_table(list: &[FunctionId], force_single_table: bool) -> String {
    if list.len() < PER_MODULE_TABLES_THRESHOLD || force_single_table {
        let mut table = String::from("|Module|Function|\n|------|--------|\n");
        for id in list {
            table.push_str(&format!("|{}|{}|\n", id.module, id.function));
        }
        table.push_str("\n\n");
        return table;
    }

    let mut per_module: BTreeMap<&str, Vec<FunctionId>> = BTreeMap::new();
    for id in list {
        per_module.entry(&id.module).or_default().push(id.clone());
    }

    let mut text = String::new();
    for (module, functions) in per_module {
        text.push_str(&format!(
            "<details><summary>Module {module}</summary>\n{}\n</details>\n",
            function_table(&functions, true)
        ));
    }
    text
}

/// A root of `"."` (or any `./sub` path) is displayed relative to the
/// repository name.
fn format_root(root: &str, repo_name: &str) -> String {
    match root.strip_prefix('.') {
        Some(rest) => format!("{repo_name}{rest}"),
        None => root.to_string(),
    }
}

/// Sink for the rendered report, selected by the CLI `--format` flag.
pub trait ReportWriter {
    fn write_report(&mut self, report: &DiffReport, repo_name: &str) -> anyhow::Result<()>;
}

/// Writes the raw diff map as pretty JSON.
pub struct JsonWriter<W: Write> {
    writer: W,
}

impl<W: Write> JsonWriter<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }
}

impl<W: Write> ReportWriter for JsonWriter<W> {
    fn write_report(&mut self, report: &DiffReport, _repo_name: &str) -> anyhow::Result<()> {
        let json = serde_json::to_string_pretty(&report.diff)?;
        self.writer.write_all(json.as_bytes())?;
        writeln!(self.writer)?;
        Ok(())
    }
}

/// Writes the Markdown comment body.
pub struct MarkdownWriter<W: Write> {
    writer: W,
}

impl<W: Write> MarkdownWriter<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }
}

impl<W: Write> ReportWriter for MarkdownWriter<W> {
    fn write_report(&mut self, report: &DiffReport, repo_name: &str) -> anyhow::Result<()> {
        self.writer
            .write_all(render_comment(report, repo_name).as_bytes())?;
        writeln!(self.writer)?;
        Ok(())
    }
}
