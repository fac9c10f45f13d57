//! In-memory registry and history, used for embedding and tests.

use std::collections::{BTreeSet, HashMap};

use super::{ProviderError, ResultHistory, TestCase, TestRegistry, TestResult};

/// Tests kept in registration order, with a name index for lookups.
#[derive(Debug, Clone, Default)]
pub struct MemoryHistory {
    entries: Vec<(TestCase, Vec<TestResult>)>,
    index: HashMap<String, usize>,
    broken: BTreeSet<String>,
}

impl MemoryHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a test with its results, most recent first.
    pub fn with_test(mut self, test: TestCase, results: Vec<TestResult>) -> Self {
        self.insert(test, results);
        self
    }

    /// Make every fetch for `name` fail with [`ProviderError::Unavailable`].
    ///
    /// Fault-injection hook for embedders exercising their refusal handling;
    /// the CSV-backed history never marks a test broken.
    pub fn with_broken_test(mut self, name: &str) -> Self {
        self.broken.insert(name.to_string());
        self
    }

    pub fn insert(&mut self, test: TestCase, results: Vec<TestResult>) {
        match self.index.get(&test.name) {
            Some(&slot) => self.entries[slot] = (test, results),
            None => {
                self.index.insert(test.name.clone(), self.entries.len());
                self.entries.push((test, results));
            }
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl TestRegistry for MemoryHistory {
    fn list_tests_for_team(
        &self,
        prefix: &str,
        team: &str,
    ) -> Result<Vec<TestCase>, ProviderError> {
        Ok(self
            .entries
            .iter()
            .map(|(test, _)| test)
            .filter(|test| test.name.starts_with(prefix) && test.oncall == team)
            .cloned()
            .collect())
    }
}

impl ResultHistory for MemoryHistory {
    fn fetch_recent_results(
        &self,
        test: &TestCase,
        limit: usize,
    ) -> Result<Vec<TestResult>, ProviderError> {
        if self.broken.contains(&test.name) {
            return Err(ProviderError::Unavailable {
                message: format!("fetch for {} failed", test.name),
            });
        }
        self.index
            .get(&test.name)
            .map(|&slot| self.entries[slot].1.iter().take(limit).cloned().collect())
            .ok_or_else(|| ProviderError::UnknownTest {
                test: test.name.clone(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn history() -> MemoryHistory {
        MemoryHistory::new()
            .with_test(
                TestCase::new("linux:__python_a", "core"),
                vec![
                    TestResult::error("pr1"),
                    TestResult::success("pr2"),
                    TestResult::error("pr3"),
                ],
            )
            .with_test(TestCase::new("linux:__python_b", "data"), vec![])
            .with_test(TestCase::new("darwin:__python_c", "core"), vec![])
    }

    #[test]
    fn registry_filters_by_prefix_and_team() {
        let tests = history()
            .list_tests_for_team("linux:__python", "core")
            .unwrap();
        assert_eq!(tests, vec![TestCase::new("linux:__python_a", "core")]);
    }

    #[test]
    fn fetch_honors_limit_in_recency_order() {
        let results = history()
            .fetch_recent_results(&TestCase::new("linux:__python_a", "core"), 2)
            .unwrap();
        assert_eq!(
            results,
            vec![TestResult::error("pr1"), TestResult::success("pr2")]
        );
    }

    #[test]
    fn unknown_and_broken_tests_error() {
        let history = history().with_broken_test("linux:__python_b");
        let err = history
            .fetch_recent_results(&TestCase::new("nope", "core"), 10)
            .unwrap_err();
        assert_eq!(
            err,
            ProviderError::UnknownTest {
                test: "nope".to_string()
            }
        );
        let err = history
            .fetch_recent_results(&TestCase::new("linux:__python_b", "data"), 10)
            .unwrap_err();
        assert!(matches!(err, ProviderError::Unavailable { .. }));
    }

    #[test]
    fn insert_replaces_existing_test() {
        let mut history = history();
        history.insert(
            TestCase::new("linux:__python_a", "data"),
            vec![TestResult::error("pr9")],
        );
        assert_eq!(history.len(), 3);
        let tests = history.list_tests_for_team("linux:", "data").unwrap();
        assert_eq!(tests.len(), 2);
        let results = history
            .fetch_recent_results(&TestCase::new("linux:__python_a", "data"), 10)
            .unwrap();
        assert_eq!(results, vec![TestResult::error("pr9")]);
    }

    #[test]
    fn replacement_keeps_registration_order() {
        let mut history = history();
        history.insert(TestCase::new("linux:__python_a", "core"), vec![]);
        history.insert(TestCase::new("linux:__python_d", "core"), vec![]);
        let names: Vec<String> = history
            .list_tests_for_team("", "core")
            .unwrap()
            .into_iter()
            .map(|test| test.name)
            .collect();
        assert_eq!(
            names,
            vec!["linux:__python_a", "darwin:__python_c", "linux:__python_d"]
        );
    }
}
