//! Refusal detail payloads & Next steps.
//!
//! Detail payloads carry the concrete context behind each refusal code (the
//! offending test, file line, or team) plus a deterministic "next"
//! remediation or rerun command.

use super::codes::RefusalCode;

/// Values needed to print a rerun command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RerunContext<'a> {
    pub history: &'a str,
    pub team: &'a str,
    pub coverage: u32,
    pub test_prefix: &'a str,
}

impl RerunContext<'_> {
    fn command(&self, history_length: usize) -> String {
        format!(
            "microcheck {} {} --history {} --test-history-length {} --test-prefix {}",
            self.team, self.coverage, self.history, history_length, self.test_prefix
        )
    }
}

#[derive(Debug, Clone)]
pub struct RefusalDetail {
    pub kind: RefusalKind,
    /// Next-step remediation or rerun guidance (without "Next:" prefix).
    pub next: String,
}

impl RefusalDetail {
    pub fn new(kind: RefusalKind, next: String) -> Self {
        Self { kind, next }
    }

    pub fn with_default_next(kind: RefusalKind, rerun: RerunContext<'_>) -> Self {
        let next = kind.default_next(rerun);
        Self { kind, next }
    }

    pub fn code(&self) -> RefusalCode {
        self.kind.code()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefusalKind {
    Io {
        path: String,
        error: String,
    },
    History {
        path: String,
        line: Option<u64>,
        message: String,
    },
    Provider {
        test: String,
        error: String,
    },
    NoTests {
        team: String,
        test_prefix: String,
    },
    NoFailures {
        team: String,
        tests: usize,
        history_length: usize,
    },
    Coverage {
        coverage_pct: u32,
    },
}

impl RefusalKind {
    pub fn code(&self) -> RefusalCode {
        match self {
            RefusalKind::Io { .. } => RefusalCode::Io,
            RefusalKind::History { .. } => RefusalCode::History,
            RefusalKind::Provider { .. } => RefusalCode::Provider,
            RefusalKind::NoTests { .. } => RefusalCode::NoTests,
            RefusalKind::NoFailures { .. } => RefusalCode::NoFailures,
            RefusalKind::Coverage { .. } => RefusalCode::Coverage,
        }
    }

    pub fn default_next(&self, rerun: RerunContext<'_>) -> String {
        match self {
            RefusalKind::Io { .. } => {
                "check the --history path/permissions and rerun".to_string()
            }
            RefusalKind::History { .. } => {
                "re-export the history with columns test,team,status,branch and rerun".to_string()
            }
            RefusalKind::Provider { test, .. } => {
                format!("restore history for {test} (or drop it from the registry), then rerun")
            }
            RefusalKind::NoTests { .. } => {
                "check the team name or pass --test-prefix for another namespace".to_string()
            }
            RefusalKind::NoFailures { history_length, .. } => {
                rerun.command(history_length.saturating_mul(2))
            }
            RefusalKind::Coverage { .. } => {
                "pass a coverage between 1 and 100 and rerun".to_string()
            }
        }
    }
}
