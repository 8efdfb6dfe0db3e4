//! The dataset diff engine.
//!
//! Given two snapshots of a root's function inventory (head and base), every
//! changed function falls into exactly one of five buckets: it flipped to
//! instrumented, flipped away from it, arrived instrumented, arrived
//! uninstrumented, or was deleted. Both entry points are total: empty
//! inventories are ordinary inputs, not errors.

pub mod set_ops;
pub mod summary;

use crate::core::{Dataset, DatasetMap, FunctionId};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use set_ops::{difference, intersection};

/// Result of comparing one root's head inventory against its base.
///
/// The five buckets partition the changed functions: no id appears in more
/// than one of them.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DatasetDiff {
    /// Present in both snapshots, uninstrumented in base, instrumented in head.
    pub newly_instrumented: Vec<FunctionId>,
    /// Present in both snapshots, instrumented in base, uninstrumented in head.
    pub no_longer_instrumented: Vec<FunctionId>,
    /// Present only in head, instrumented.
    pub added_instrumented: Vec<FunctionId>,
    /// Present only in head, uninstrumented.
    pub added_uninstrumented: Vec<FunctionId>,
    /// Present only in base, whatever its instrumentation state there.
    pub deleted: Vec<FunctionId>,
    /// Head coverage ratio minus base coverage ratio; `None` whenever either
    /// side has no functions at all.
    pub coverage_ratio_delta: Option<f64>,
}

impl DatasetDiff {
    /// True when the diff carries no function-level change. The coverage
    /// delta is derived data and does not count.
    pub fn is_empty(&self) -> bool {
        self.newly_instrumented.is_empty()
            && self.no_longer_instrumented.is_empty()
            && self.added_instrumented.is_empty()
            && self.added_uninstrumented.is_empty()
            && self.deleted.is_empty()
    }
}

/// Per-root diffs covering every root present in either input map.
pub type DatasetDiffMap = BTreeMap<String, DatasetDiff>;

/// Compare one root's head inventory against its base.
pub fn diff_dataset(head: &Dataset, base: &Dataset) -> DatasetDiff {
    let all_head: Vec<FunctionId> = head
        .instrumented
        .iter()
        .chain(&head.uninstrumented)
        .cloned()
        .collect();
    let all_base: Vec<FunctionId> = base
        .instrumented
        .iter()
        .chain(&base.uninstrumented)
        .cloned()
        .collect();

    let added = difference(&all_head, &all_base);
    let deleted = difference(&all_base, &all_head);

    // The flip buckets intersect across the two snapshots, so ids that only
    // exist on one side fall out naturally.
    DatasetDiff {
        newly_instrumented: intersection(&base.uninstrumented, &head.instrumented),
        no_longer_instrumented: intersection(&head.uninstrumented, &base.instrumented),
        added_instrumented: intersection(&added, &head.instrumented),
        added_uninstrumented: intersection(&added, &head.uninstrumented),
        deleted,
        coverage_ratio_delta: match (head.coverage_ratio(), base.coverage_ratio()) {
            (Some(head_ratio), Some(base_ratio)) => Some(head_ratio - base_ratio),
            _ => None,
        },
    }
}

/// Diff two dataset maps root by root.
///
/// Walks the union of root keys once, substituting an empty inventory for
/// whichever side is missing a root: a root deleted outright still reports
/// everything in it as deleted, and a brand new root reports everything as
/// added.
pub fn diff_dataset_maps(head: &DatasetMap, base: &DatasetMap) -> DatasetDiffMap {
    let empty = Dataset::default();
    let roots: BTreeSet<&String> = head.keys().chain(base.keys()).collect();
    roots
        .into_iter()
        .map(|root| {
            let head_set = head.get(root).unwrap_or(&empty);
            let base_set = base.get(root).unwrap_or(&empty);
            (root.clone(), diff_dataset(head_set, base_set))
        })
        .collect()
}
