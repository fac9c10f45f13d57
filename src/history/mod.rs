//! Test registry and result history collaborators.
//!
//! The selection core never talks to storage directly. It asks a
//! [`TestRegistry`] which tests belong to a team and a [`ResultHistory`] for
//! each test's most recent executions.

pub mod csv_store;
pub mod memory;

use std::error::Error;
use std::fmt;
use std::str::FromStr;

/// Outcome of one historical test execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResultStatus {
    Success,
    Error,
    Timeout,
    RuntimeError,
    TransientInfraError,
    InfraError,
    InfraTimeout,
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownStatus(pub String);

impl ResultStatus {
    pub const ALL: [ResultStatus; 8] = [
        ResultStatus::Success,
        ResultStatus::Error,
        ResultStatus::Timeout,
        ResultStatus::RuntimeError,
        ResultStatus::TransientInfraError,
        ResultStatus::InfraError,
        ResultStatus::InfraTimeout,
        ResultStatus::Unknown,
    ];

    #[inline]
    pub const fn as_str(self) -> &'static str {
        match self {
            ResultStatus::Success => "SUCCESS",
            ResultStatus::Error => "ERROR",
            ResultStatus::Timeout => "TIMEOUT",
            ResultStatus::RuntimeError => "RUNTIME_ERROR",
            ResultStatus::TransientInfraError => "TRANSIENT_INFRA_ERROR",
            ResultStatus::InfraError => "INFRA_ERROR",
            ResultStatus::InfraTimeout => "INFRA_TIMEOUT",
            ResultStatus::Unknown => "UNKNOWN",
        }
    }
}

impl fmt::Display for ResultStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for UnknownStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown result status {:?}", self.0)
    }
}

impl Error for UnknownStatus {}

impl FromStr for ResultStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ResultStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| UnknownStatus(s.to_string()))
    }
}

/// A test known to the registry. Results are fetched separately.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TestCase {
    pub name: String,
    pub oncall: String,
}

impl TestCase {
    pub fn new(name: impl Into<String>, oncall: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            oncall: oncall.into(),
        }
    }
}

/// One historical execution of a test.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestResult {
    pub status: ResultStatus,
    /// Originating branch or PR; `None` when the run had none recorded.
    pub branch: Option<String>,
}

impl TestResult {
    pub fn new(status: ResultStatus, branch: Option<&str>) -> Self {
        Self {
            status,
            branch: branch.map(str::to_string),
        }
    }

    pub fn error(branch: &str) -> Self {
        Self::new(ResultStatus::Error, Some(branch))
    }

    pub fn success(branch: &str) -> Self {
        Self::new(ResultStatus::Success, Some(branch))
    }
}

/// Failure to list tests or fetch results. Never interpreted as "no failures".
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderError {
    /// The provider has no record of the requested test.
    UnknownTest { test: String },
    /// The backing store could not be reached.
    Unavailable { message: String },
}

impl ProviderError {
    /// Test the error refers to, when there is one.
    pub fn test(&self) -> Option<&str> {
        match self {
            ProviderError::UnknownTest { test } => Some(test),
            ProviderError::Unavailable { .. } => None,
        }
    }
}

impl fmt::Display for ProviderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProviderError::UnknownTest { test } => write!(f, "no history recorded for {test}"),
            ProviderError::Unavailable { message } => {
                write!(f, "history provider unavailable: {message}")
            }
        }
    }
}

impl Error for ProviderError {}

/// Lists the tests a team owns under a registry namespace.
pub trait TestRegistry {
    /// Tests whose name starts with `prefix` and whose oncall equals `team`,
    /// in registry order.
    fn list_tests_for_team(&self, prefix: &str, team: &str)
    -> Result<Vec<TestCase>, ProviderError>;
}

/// Fetches recent executions of a test.
pub trait ResultHistory {
    /// At most `limit` results, most recent first.
    fn fetch_recent_results(
        &self,
        test: &TestCase,
        limit: usize,
    ) -> Result<Vec<TestResult>, ProviderError>;
}
