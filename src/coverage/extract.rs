//! Result history to failure sets.

use std::error::Error;
use std::fmt;

use tracing::{debug, info};

use super::{FailureMap, FailureSet};
use crate::history::{ProviderError, ResultHistory, ResultStatus, TestCase};

/// Provider failure while building the failure map, tagged with its test.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractError {
    pub test: String,
    pub source: ProviderError,
}

impl fmt::Display for ExtractError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "fetching history for {}: {}", self.test, self.source)
    }
}

impl Error for ExtractError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        Some(&self.source)
    }
}

/// Distinct non-empty branches among the test's recent `ERROR` results.
pub fn extract_failures<H: ResultHistory + ?Sized>(
    history: &H,
    test: &TestCase,
    history_length: usize,
) -> Result<FailureSet, ProviderError> {
    let results = history.fetch_recent_results(test, history_length)?;
    Ok(results
        .into_iter()
        .take(history_length)
        .filter(|result| result.status == ResultStatus::Error)
        .filter_map(|result| result.branch)
        .filter(|branch| !branch.is_empty())
        .collect())
}

/// Extract every test's failure set, in order. Stops at the first provider
/// error; a failed fetch is never recorded as an empty set.
pub fn build_failure_map<H: ResultHistory + ?Sized>(
    history: &H,
    tests: &[TestCase],
    history_length: usize,
) -> Result<FailureMap, ExtractError> {
    let mut failures = FailureMap::new();
    for test in tests {
        info!(test = %test.name, "analyzing test");
        let prs = extract_failures(history, test, history_length).map_err(|source| {
            ExtractError {
                test: test.name.clone(),
                source,
            }
        })?;
        debug!(test = %test.name, failed_prs = prs.len(), "extracted failure set");
        failures.insert(test.name.clone(), prs);
    }
    Ok(failures)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::history::TestResult;
    use crate::history::memory::MemoryHistory;

    fn test_case() -> TestCase {
        TestCase::new("linux:__python_a", "core")
    }

    #[test]
    fn keeps_only_error_branches_deduplicated() {
        let history = MemoryHistory::new().with_test(
            test_case(),
            vec![
                TestResult::error("pr1"),
                TestResult::error("pr1"),
                TestResult::success("pr2"),
                TestResult::new(ResultStatus::Timeout, Some("pr3")),
                TestResult::new(ResultStatus::Error, None),
                TestResult::error(""),
                TestResult::error("pr4"),
            ],
        );
        let prs = extract_failures(&history, &test_case(), 100).unwrap();
        let prs: Vec<&str> = prs.iter().map(String::as_str).collect();
        assert_eq!(prs, vec!["pr1", "pr4"]);
    }

    #[test]
    fn history_length_bounds_the_window() {
        let history = MemoryHistory::new().with_test(
            test_case(),
            vec![
                TestResult::success("pr1"),
                TestResult::error("pr2"),
                TestResult::error("pr3"),
            ],
        );
        let prs = extract_failures(&history, &test_case(), 2).unwrap();
        assert_eq!(prs.len(), 1);
        assert!(prs.contains("pr2"));
    }

    #[test]
    fn provider_error_is_not_an_empty_set() {
        let history = MemoryHistory::new()
            .with_test(test_case(), vec![TestResult::error("pr1")])
            .with_test(TestCase::new("linux:__python_b", "core"), vec![])
            .with_broken_test("linux:__python_b");
        let tests = vec![test_case(), TestCase::new("linux:__python_b", "core")];

        let err = build_failure_map(&history, &tests, 100).unwrap_err();
        assert_eq!(err.test, "linux:__python_b");
        assert!(matches!(err.source, ProviderError::Unavailable { .. }));
        assert!(err.to_string().starts_with("fetching history for linux:__python_b"));
    }

    #[test]
    fn failure_map_includes_tests_without_failures() {
        let history = MemoryHistory::new()
            .with_test(test_case(), vec![TestResult::error("pr1")])
            .with_test(
                TestCase::new("linux:__python_b", "core"),
                vec![TestResult::success("pr1")],
            );
        let tests = vec![test_case(), TestCase::new("linux:__python_b", "core")];
        let failures = build_failure_map(&history, &tests, 100).unwrap();
        assert_eq!(failures.len(), 2);
        assert!(failures["linux:__python_b"].is_empty());
        assert_eq!(failures["linux:__python_a"].len(), 1);
    }
}
