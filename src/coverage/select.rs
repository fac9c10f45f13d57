//! Greedy coverage selection over a static rank.
//!
//! Walks [`rank_tests`] order, adding each test and its failed PRs, and stops
//! at the first prefix whose covered PRs reach `coverage_pct` percent of the
//! universe. This is not classical greedy set cover: the rank is fixed up
//! front and never re-scored by marginal gain, so the result may overshoot
//! the target or include tests that add nothing new. No minimality guarantee.

use std::collections::BTreeSet;
use std::error::Error;
use std::fmt;

use tracing::debug;

use super::rank::rank_tests;
use super::{FailureMap, coverage_universe};

pub const MAX_COVERAGE: u32 = 100;

/// One step of the walk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedTest {
    pub name: String,
    /// Size of the test's own failure set (its rank key).
    pub failed_prs: usize,
    /// PRs this test covered that no earlier pick did.
    pub newly_covered: usize,
    /// Covered PRs after this pick.
    pub cumulative_covered: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    /// Picks in walk order.
    pub tests: Vec<SelectedTest>,
    pub covered: usize,
    pub universe: usize,
    pub coverage_pct: u32,
    /// False only when every test was taken without reaching the target.
    pub reached: bool,
}

impl Selection {
    pub fn names(&self) -> Vec<&str> {
        self.tests.iter().map(|test| test.name.as_str()).collect()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.tests.iter().any(|test| test.name == name)
    }

    pub fn len(&self) -> usize {
        self.tests.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tests.is_empty()
    }

    /// Covered fraction of the universe (0..=1).
    pub fn share(&self) -> f64 {
        self.covered as f64 / self.universe as f64
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectError {
    /// Coverage of 0 percent. Values above 100 are unreachable, not invalid.
    InvalidCoverage { coverage_pct: u32 },
    /// No test has any recorded failure; the percentage is undefined.
    EmptyUniverse { tests: usize },
}

impl fmt::Display for SelectError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SelectError::InvalidCoverage { coverage_pct } => {
                write!(f, "coverage must be at least 1 percent, got {coverage_pct}")
            }
            SelectError::EmptyUniverse { tests } => {
                write!(f, "no failing PRs recorded across {tests} tests")
            }
        }
    }
}

impl Error for SelectError {}

/// Smallest number of PRs that satisfies `coverage_pct` of `universe`.
pub fn target_count(universe: usize, coverage_pct: u32) -> usize {
    (universe as u64 * coverage_pct as u64).div_ceil(MAX_COVERAGE as u64) as usize
}

/// `100 * covered / universe >= coverage_pct`, in integers.
#[inline]
pub fn meets_target(covered: usize, universe: usize, coverage_pct: u32) -> bool {
    covered as u64 * MAX_COVERAGE as u64 >= universe as u64 * coverage_pct as u64
}

/// Pick the shortest static-rank prefix whose failures cover `coverage_pct`
/// percent of all failing PRs.
///
/// A `coverage_pct` above 100 can never be met; every test is then returned
/// with `reached == false`.
pub fn select_minimal_cover(
    failures: &FailureMap,
    coverage_pct: u32,
) -> Result<Selection, SelectError> {
    if coverage_pct == 0 {
        return Err(SelectError::InvalidCoverage { coverage_pct });
    }

    let universe = coverage_universe(failures).len();
    if universe == 0 {
        return Err(SelectError::EmptyUniverse {
            tests: failures.len(),
        });
    }

    let mut covered: BTreeSet<&str> = BTreeSet::new();
    let mut tests = Vec::new();
    for ranked in rank_tests(failures) {
        let before = covered.len();
        covered.extend(ranked.failures.iter().map(String::as_str));
        tests.push(SelectedTest {
            name: ranked.name.to_string(),
            failed_prs: ranked.impact(),
            newly_covered: covered.len() - before,
            cumulative_covered: covered.len(),
        });
        debug!(
            test = ranked.name,
            failed_prs = ranked.impact(),
            covered = covered.len(),
            universe,
            "selected test"
        );

        if meets_target(covered.len(), universe, coverage_pct) {
            return Ok(Selection {
                tests,
                covered: covered.len(),
                universe,
                coverage_pct,
                reached: true,
            });
        }
    }

    Ok(Selection {
        tests,
        covered: covered.len(),
        universe,
        coverage_pct,
        reached: false,
    })
}
