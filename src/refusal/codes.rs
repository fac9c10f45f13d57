use std::fmt;
use std::str::FromStr;

/// Canonical refusal codes (v0).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RefusalCode {
    Io,
    History,
    Provider,
    NoTests,
    NoFailures,
    Coverage,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnknownRefusalCode;

impl RefusalCode {
    pub const ALL: [RefusalCode; 6] = [
        RefusalCode::Io,
        RefusalCode::History,
        RefusalCode::Provider,
        RefusalCode::NoTests,
        RefusalCode::NoFailures,
        RefusalCode::Coverage,
    ];

    #[inline]
    pub const fn as_str(self) -> &'static str {
        match self {
            RefusalCode::Io => "E_IO",
            RefusalCode::History => "E_HISTORY",
            RefusalCode::Provider => "E_PROVIDER",
            RefusalCode::NoTests => "E_NO_TESTS",
            RefusalCode::NoFailures => "E_NO_FAILURES",
            RefusalCode::Coverage => "E_COVERAGE",
        }
    }

    /// A short, stable reason label for human output.
    #[inline]
    pub const fn reason(self) -> &'static str {
        match self {
            RefusalCode::Io => "history read error",
            RefusalCode::History => "malformed test history",
            RefusalCode::Provider => "result history unavailable for a test",
            RefusalCode::NoTests => "no tests match team and prefix",
            RefusalCode::NoFailures => "no failing PRs in the sampled history",
            RefusalCode::Coverage => "coverage target out of range",
        }
    }
}

impl fmt::Display for RefusalCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for UnknownRefusalCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("unknown refusal code")
    }
}

impl std::error::Error for UnknownRefusalCode {}

impl FromStr for RefusalCode {
    type Err = UnknownRefusalCode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        RefusalCode::ALL
            .into_iter()
            .find(|code| code.as_str() == s)
            .ok_or(UnknownRefusalCode)
    }
}
