//! Keyed set operations over function id sequences.
//!
//! Both operations key on structural equality of the whole [`FunctionId`]
//! (module + name) and preserve the order of their first argument,
//! deduplicating by key with the first occurrence winning. That ordering
//! contract is what lets the diff buckets come out in a stable, analyzer
//! given order.

use crate::core::FunctionId;
use std::collections::HashSet;

/// Elements of `a` whose key does not occur in `b`.
pub fn difference(a: &[FunctionId], b: &[FunctionId]) -> Vec<FunctionId> {
    let exclude: HashSet<&FunctionId> = b.iter().collect();
    let mut seen: HashSet<&FunctionId> = HashSet::new();
    a.iter()
        .filter(|id| !exclude.contains(*id) && seen.insert(*id))
        .cloned()
        .collect()
}

/// Elements of `a` whose key also occurs in `b`.
pub fn intersection(a: &[FunctionId], b: &[FunctionId]) -> Vec<FunctionId> {
    let keep: HashSet<&FunctionId> = b.iter().collect();
    let mut seen: HashSet<&FunctionId> = HashSet::new();
    a.iter()
        .filter(|id| keep.contains(*id) && seen.insert(*id))
        .cloned()
        .collect()
}
