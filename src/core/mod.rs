//! Data model shared by the diff engine and the I/O shell.
//!
//! A [`Dataset`] is one source root's function inventory at one commit,
//! split into the functions that carry the autometrics annotation and the
//! ones that do not. Datasets are produced by the analyzer, never mutated
//! afterwards, and compared per-root.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Identity of a function as reported by the analyzer.
///
/// Two ids are the same function iff both the module path and the function
/// name match exactly. No normalization, no fuzzy matching: a renamed
/// function is a deletion plus an addition.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FunctionId {
    /// Hierarchical namespace, e.g. `"main::db"`.
    pub module: String,
    /// Function name within the module.
    pub function: String,
}

impl FunctionId {
    pub fn new(module: impl Into<String>, function: impl Into<String>) -> Self {
        Self {
            module: module.into(),
            function: function.into(),
        }
    }
}

/// One source root's function inventory at one point in time.
///
/// Invariant (upheld by the analyzer, not re-checked here): no id appears in
/// both lists. Order within each list is the analyzer's output order and is
/// carried through to keep report tables stable.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dataset {
    /// Functions carrying the autometrics annotation.
    #[serde(default)]
    pub instrumented: Vec<FunctionId>,
    /// Functions found by the analyzer but not annotated.
    #[serde(default)]
    pub uninstrumented: Vec<FunctionId>,
}

impl Dataset {
    /// Total number of functions in this inventory.
    pub fn total(&self) -> usize {
        self.instrumented.len() + self.uninstrumented.len()
    }

    /// Instrumented functions over total, or `None` for an empty inventory.
    ///
    /// The `None` is deliberate: downstream formatting must treat a ratio
    /// over zero functions as "not applicable", never as 0 or NaN.
    pub fn coverage_ratio(&self) -> Option<f64> {
        let total = self.total();
        if total == 0 {
            None
        } else {
            Some(self.instrumented.len() as f64 / total as f64)
        }
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }
}

/// Function inventories keyed by source root (`"."` for the repository
/// root). BTreeMap keeps artifacts and report sections sorted by root.
pub type DatasetMap = BTreeMap<String, Dataset>;
