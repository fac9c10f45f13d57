use std::path::PathBuf;

use clap::Parser;

use crate::config::{
    DEFAULT_HISTORY_LENGTH, DEFAULT_HISTORY_PATH, DEFAULT_TEST_PREFIX, SelectionConfig,
};

/// CLI argument parsing & validation.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "microcheck",
    about = "Pick the smallest set of tests whose historical failures cover a target share of failing PRs.",
    override_usage = "microcheck <TEAM> <COVERAGE> [--history <path>] [--test-history-length <n>] [--test-prefix <prefix>] [--json]"
)]
pub struct Args {
    /// Oncall team that owns the tests.
    #[arg(value_name = "TEAM")]
    pub team: String,

    /// Percentage of failing PRs to cover: 1..=100.
    #[arg(value_name = "COVERAGE", value_parser = parse_coverage)]
    pub coverage: u32,

    /// History CSV (columns: test, team, status, branch).
    #[arg(
        long,
        value_name = "PATH",
        env = "MICROCHECK_HISTORY",
        default_value = DEFAULT_HISTORY_PATH
    )]
    pub history: PathBuf,

    /// Most recent results examined per test (default: 100).
    #[arg(
        long,
        value_name = "N",
        default_value_t = DEFAULT_HISTORY_LENGTH,
        value_parser = parse_history_length
    )]
    pub test_history_length: usize,

    /// Only consider tests whose name starts with this prefix.
    #[arg(long, value_name = "PREFIX", default_value = DEFAULT_TEST_PREFIX)]
    pub test_prefix: String,

    /// Emit JSON output (single object).
    #[arg(long)]
    pub json: bool,
}

impl Args {
    pub fn parse() -> Result<Self, clap::Error> {
        Self::try_parse()
    }

    pub fn new(
        team: String,
        coverage: u32,
        history: PathBuf,
        test_history_length: usize,
        test_prefix: String,
        json: bool,
    ) -> Self {
        Self {
            team,
            coverage,
            history,
            test_history_length,
            test_prefix,
            json,
        }
    }

    pub fn selection_config(&self) -> SelectionConfig {
        SelectionConfig::new(self.team.clone(), self.coverage)
            .with_history_length(self.test_history_length)
            .with_test_prefix(self.test_prefix.clone())
    }
}

/// Whole-number coverage percentage in 1..=100.
pub fn parse_coverage(raw: &str) -> Result<u32, String> {
    let value = raw
        .trim()
        .parse::<u32>()
        .map_err(|_| "coverage must be a whole number".to_string())?;
    if value == 0 || value > 100 {
        return Err("coverage must be 1 <= x <= 100".to_string());
    }
    Ok(value)
}

/// Whole-number result window of at least 1.
pub fn parse_history_length(raw: &str) -> Result<usize, String> {
    let value = raw
        .trim()
        .parse::<usize>()
        .map_err(|_| "test-history-length must be a whole number".to_string())?;
    if value == 0 {
        return Err("test-history-length must be >= 1".to_string());
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(argv: &[&str]) -> Result<Args, clap::Error> {
        Args::try_parse_from(std::iter::once("microcheck").chain(argv.iter().copied()))
    }

    #[test]
    fn positional_team_and_coverage() {
        let args = parse(&["core", "80"]).unwrap();
        assert_eq!(args.team, "core");
        assert_eq!(args.coverage, 80);
        assert_eq!(args.test_history_length, 100);
        assert_eq!(args.test_prefix, "linux:__python");
        assert!(!args.json);
    }

    #[test]
    fn options_override_defaults() {
        let args = parse(&[
            "core",
            "95",
            "--test-history-length",
            "20",
            "--test-prefix",
            "darwin:",
            "--history",
            "h.csv",
            "--json",
        ])
        .unwrap();
        let config = args.selection_config();
        assert_eq!(config.history_length, 20);
        assert_eq!(config.test_prefix, "darwin:");
        assert_eq!(config.coverage, 95);
        assert_eq!(args.history, PathBuf::from("h.csv"));
        assert!(args.json);
    }

    #[test]
    fn coverage_out_of_range_rejected() {
        assert!(parse(&["core", "0"]).is_err());
        assert!(parse(&["core", "101"]).is_err());
        assert!(parse(&["core", "eighty"]).is_err());
        assert!(parse(&["core", "100"]).is_ok());
    }

    #[test]
    fn zero_history_length_rejected() {
        assert!(parse(&["core", "50", "--test-history-length", "0"]).is_err());
    }

    #[test]
    fn history_length_parser_rejects_non_positive_values() {
        assert_eq!(parse_history_length(" 25 "), Ok(25));
        assert_eq!(
            parse_history_length("0"),
            Err("test-history-length must be >= 1".to_string())
        );
        for raw in ["-3", "ten", ""] {
            assert_eq!(
                parse_history_length(raw),
                Err("test-history-length must be a whole number".to_string())
            );
        }
    }

    #[test]
    fn missing_positionals_rejected() {
        assert!(parse(&["core"]).is_err());
    }
}
