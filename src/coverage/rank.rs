//! Static impact ranking.
//!
//! Tests are ranked once by failure-set size, descending, with the test name
//! ascending (raw bytes) as the tie-breaker. The rank is never recomputed
//! against the PRs still uncovered.

use std::cmp::Ordering;

use super::{FailureMap, FailureSet};

/// A test and its failure set at a fixed rank position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RankedTest<'a> {
    pub name: &'a str,
    pub failures: &'a FailureSet,
}

impl RankedTest<'_> {
    pub fn impact(&self) -> usize {
        self.failures.len()
    }
}

/// Impact desc, name asc.
pub fn compare_impact(left: &RankedTest<'_>, right: &RankedTest<'_>) -> Ordering {
    match right.impact().cmp(&left.impact()) {
        Ordering::Equal => left.name.as_bytes().cmp(right.name.as_bytes()),
        ord => ord,
    }
}

pub fn rank_tests(failures: &FailureMap) -> Vec<RankedTest<'_>> {
    let mut ranked: Vec<RankedTest<'_>> = failures
        .iter()
        .map(|(name, failures)| RankedTest { name, failures })
        .collect();
    ranked.sort_by(compare_impact);
    ranked
}
