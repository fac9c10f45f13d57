//! Failure-set extraction and greedy coverage selection.

pub mod extract;
pub mod rank;
pub mod select;

use std::collections::{BTreeMap, BTreeSet};

/// Distinct PR/branch identifiers a test failed on.
pub type FailureSet = BTreeSet<String>;

/// Test name to its failure set.
pub type FailureMap = BTreeMap<String, FailureSet>;

/// Union of every failure set in the map.
pub fn coverage_universe(failures: &FailureMap) -> BTreeSet<&str> {
    failures
        .values()
        .flat_map(|prs| prs.iter().map(String::as_str))
        .collect()
}
