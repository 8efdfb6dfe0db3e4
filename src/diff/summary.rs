//! Scalar statistics derived from a diff map, for report rendering.

use crate::core::DatasetMap;
use crate::diff::DatasetDiffMap;
use serde::Serialize;

/// Aggregated counts and ratios across every root of a diff.
///
/// All ratios are `None` when their denominator is zero; the renderer turns
/// a `None` into a different sentence, not into `0%`.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DiffSummary {
    /// Functions that gained instrumentation: flips plus instrumented additions.
    pub instrumented_added: usize,
    /// Existing functions that lost their instrumentation.
    pub instrumented_removed: usize,
    /// Functions deleted between base and head.
    pub functions_deleted: usize,
    /// New functions that arrived with instrumentation.
    pub added_with_instrumentation: usize,
    /// New functions that arrived without it.
    pub added_without_instrumentation: usize,
    /// Share of new functions that carry instrumentation.
    pub new_function_coverage: Option<f64>,
    /// Overall coverage of the full base dataset map.
    pub base_coverage: Option<f64>,
    /// Overall coverage of the full head dataset map.
    pub head_coverage: Option<f64>,
}

impl DiffSummary {
    /// Net change in instrumented functions, signed.
    pub fn net_instrumented(&self) -> i64 {
        self.instrumented_added as i64 - self.instrumented_removed as i64
    }
}

/// Reduce a diff map plus its two source dataset maps to scalar statistics.
///
/// Overall coverage is computed over the complete head and base maps rather
/// than the diffed roots only, so that "no coverage before, coverage
/// introduced now" is visible even when one side is entirely empty.
pub fn summarize(diff: &DatasetDiffMap, head: &DatasetMap, base: &DatasetMap) -> DiffSummary {
    let mut summary = DiffSummary::default();

    for item in diff.values() {
        summary.instrumented_added +=
            item.newly_instrumented.len() + item.added_instrumented.len();
        summary.instrumented_removed += item.no_longer_instrumented.len();
        summary.functions_deleted += item.deleted.len();
        summary.added_with_instrumentation += item.added_instrumented.len();
        summary.added_without_instrumentation += item.added_uninstrumented.len();
    }

    let new_total = summary.added_with_instrumentation + summary.added_without_instrumentation;
    if new_total != 0 {
        summary.new_function_coverage =
            Some(summary.added_with_instrumentation as f64 / new_total as f64);
    }

    summary.base_coverage = overall_coverage(base);
    summary.head_coverage = overall_coverage(head);
    summary
}

fn overall_coverage(map: &DatasetMap) -> Option<f64> {
    let instrumented: usize = map.values().map(|d| d.instrumented.len()).sum();
    let total: usize = map.values().map(|d| d.total()).sum();
    if total == 0 {
        None
    } else {
        Some(instrumented as f64 / total as f64)
    }
}
