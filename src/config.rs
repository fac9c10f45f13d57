//! Run configuration passed explicitly into the pipeline.

pub const DEFAULT_HISTORY_LENGTH: usize = 100;
pub const DEFAULT_TEST_PREFIX: &str = "linux:__python";
pub const DEFAULT_HISTORY_PATH: &str = "test_history.csv";

/// Everything one selection run needs; no process-wide state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionConfig {
    pub team: String,
    /// Target percentage of failing PRs to cover (1..=100).
    pub coverage: u32,
    /// Most recent results examined per test.
    pub history_length: usize,
    /// Registry namespace the tests must start with.
    pub test_prefix: String,
}

impl SelectionConfig {
    pub fn new(team: impl Into<String>, coverage: u32) -> Self {
        Self {
            team: team.into(),
            coverage,
            history_length: DEFAULT_HISTORY_LENGTH,
            test_prefix: DEFAULT_TEST_PREFIX.to_string(),
        }
    }

    pub fn with_history_length(mut self, history_length: usize) -> Self {
        self.history_length = history_length;
        self
    }

    pub fn with_test_prefix(mut self, test_prefix: impl Into<String>) -> Self {
        self.test_prefix = test_prefix.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_cli_defaults() {
        let config = SelectionConfig::new("core", 80);
        assert_eq!(config.history_length, 100);
        assert_eq!(config.test_prefix, "linux:__python");
    }

    #[test]
    fn builders_override_defaults() {
        let config = SelectionConfig::new("core", 80)
            .with_history_length(5)
            .with_test_prefix("darwin:");
        assert_eq!(config.history_length, 5);
        assert_eq!(config.test_prefix, "darwin:");
    }
}
