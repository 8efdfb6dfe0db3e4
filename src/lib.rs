//! Compare autometrics instrumentation coverage between two states of a
//! repository and report the delta.
//!
//! The core is the pure diff engine in [`diff`]: given two function
//! inventories it classifies every change into five buckets and tracks the
//! coverage-ratio shift. Everything else — running the analyzer, moving the
//! git working tree, persisting artifacts, rendering and posting the PR
//! comment — is I/O glue around that core.

pub mod analyzer;
pub mod artifact;
pub mod cli;
pub mod commands;
pub mod core;
pub mod diff;
pub mod github;
pub mod gitops;
pub mod report;

// Re-export commonly used types
pub use crate::core::{Dataset, DatasetMap, FunctionId};
pub use crate::diff::summary::{summarize, DiffSummary};
pub use crate::diff::{diff_dataset, diff_dataset_maps, DatasetDiff, DatasetDiffMap};
pub use crate::report::DiffReport;
