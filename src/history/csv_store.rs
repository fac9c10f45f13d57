//! History CSV: one row per historical execution.
//!
//! Required columns are `test`, `team` and `status`; `branch` is optional and
//! may be empty. Rows for a given test are ordered most recent first. Tests are
//! registered in order of first appearance.

use std::collections::HashMap;
use std::error::Error;
use std::fmt;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use serde::Deserialize;

use super::memory::MemoryHistory;
use super::{ProviderError, ResultHistory, ResultStatus, TestCase, TestRegistry, TestResult};

pub const REQUIRED_COLUMNS: [&str; 3] = ["test", "team", "status"];

#[derive(Debug, Deserialize)]
struct HistoryRow {
    test: String,
    team: String,
    status: String,
    #[serde(default)]
    branch: Option<String>,
}

/// Why a history file could not be loaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HistoryError {
    Io { error: String },
    MissingColumn { column: &'static str },
    Row { line: Option<u64>, message: String },
}

impl fmt::Display for HistoryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HistoryError::Io { error } => write!(f, "cannot read history: {error}"),
            HistoryError::MissingColumn { column } => {
                write!(f, "history is missing required column {column:?}")
            }
            HistoryError::Row {
                line: Some(line),
                message,
            } => write!(f, "history line {line}: {message}"),
            HistoryError::Row {
                line: None,
                message,
            } => write!(f, "history: {message}"),
        }
    }
}

impl Error for HistoryError {}

/// Registry and result history backed by a history CSV.
#[derive(Debug, Clone)]
pub struct CsvHistory {
    inner: MemoryHistory,
    rows: u64,
}

impl CsvHistory {
    pub fn open(path: &Path) -> Result<Self, HistoryError> {
        let file = File::open(path).map_err(|err| HistoryError::Io {
            error: format!("{}: {err}", path.display()),
        })?;
        Self::from_reader(file)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, HistoryError> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let headers = reader.headers().map_err(row_error)?.clone();
        for column in REQUIRED_COLUMNS {
            if !headers.iter().any(|name| name == column) {
                return Err(HistoryError::MissingColumn { column });
            }
        }

        let mut order: Vec<(TestCase, Vec<TestResult>)> = Vec::new();
        let mut index: HashMap<String, usize> = HashMap::new();
        let mut rows = 0u64;

        for record in reader.records() {
            let record = record.map_err(row_error)?;
            let line = record.position().map(|pos| pos.line());
            let row: HistoryRow = record
                .deserialize(Some(&headers))
                .map_err(|err| HistoryError::Row {
                    line,
                    message: err.to_string(),
                })?;
            if row.test.is_empty() {
                return Err(HistoryError::Row {
                    line,
                    message: "empty test name".to_string(),
                });
            }
            let status = row
                .status
                .parse::<ResultStatus>()
                .map_err(|err| HistoryError::Row {
                    line,
                    message: err.to_string(),
                })?;
            let result = TestResult {
                status,
                branch: row.branch.filter(|branch| !branch.is_empty()),
            };

            match index.get(&row.test) {
                Some(&slot) => {
                    let (test, results) = &mut order[slot];
                    if test.oncall != row.team {
                        return Err(HistoryError::Row {
                            line,
                            message: format!(
                                "test {} owned by both {:?} and {:?}",
                                row.test, test.oncall, row.team
                            ),
                        });
                    }
                    results.push(result);
                }
                None => {
                    index.insert(row.test.clone(), order.len());
                    order.push((TestCase::new(row.test, row.team), vec![result]));
                }
            }
            rows += 1;
        }

        let inner = order
            .into_iter()
            .fold(MemoryHistory::new(), |history, (test, results)| {
                history.with_test(test, results)
            });
        Ok(Self { inner, rows })
    }

    /// Number of execution rows loaded.
    pub fn rows(&self) -> u64 {
        self.rows
    }

    /// Number of distinct tests loaded.
    pub fn tests(&self) -> usize {
        self.inner.len()
    }
}

fn row_error(err: csv::Error) -> HistoryError {
    HistoryError::Row {
        line: err.position().map(|pos| pos.line()),
        message: err.to_string(),
    }
}

impl TestRegistry for CsvHistory {
    fn list_tests_for_team(
        &self,
        prefix: &str,
        team: &str,
    ) -> Result<Vec<TestCase>, ProviderError> {
        self.inner.list_tests_for_team(prefix, team)
    }
}

impl ResultHistory for CsvHistory {
    fn fetch_recent_results(
        &self,
        test: &TestCase,
        limit: usize,
    ) -> Result<Vec<TestResult>, ProviderError> {
        self.inner.fetch_recent_results(test, limit)
    }
}
