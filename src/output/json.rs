// JSON output schema assembly

use crate::coverage::select::Selection;
use crate::refusal::codes::RefusalCode;
use crate::refusal::details::RefusalKind;
use serde::Serialize;
use serde_json::{Value, json};

pub const VERSION: &str = "microcheck.v0";

#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Outcome {
    Selected,
    Refusal,
}

#[derive(Debug, Clone, Serialize)]
pub struct Settings {
    pub team: String,
    pub coverage: u32,
    pub history: String,
    pub test_history_length: usize,
    pub test_prefix: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct Counts {
    pub tests: Option<u64>,
    pub tests_with_failures: Option<u64>,
    pub failing_prs: Option<u64>,
    pub covered_prs: Option<u64>,
    pub selected_tests: Option<u64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SelectedTest {
    pub rank: usize,
    pub name: String,
    pub failed_prs: usize,
    pub newly_covered: usize,
    pub cumulative_covered: usize,
    pub cumulative_share: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct Refusal {
    pub code: String,
    pub message: String,
    pub detail: Value,
}

impl Refusal {
    pub fn new(code: RefusalCode, message: impl Into<String>, detail: Value) -> Self {
        Self {
            code: code.as_str().to_string(),
            message: message.into(),
            detail,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct JsonOutput {
    pub version: &'static str,
    pub outcome: Outcome,
    pub settings: Settings,
    pub counts: Counts,
    pub coverage: Option<f64>,
    pub target_reached: Option<bool>,
    pub tests: Vec<SelectedTest>,
    pub refusal: Option<Refusal>,
}

impl JsonOutput {
    pub fn selected(settings: Settings, mut counts: Counts, selection: &Selection) -> Self {
        counts.covered_prs = Some(selection.covered as u64);
        counts.selected_tests = Some(selection.len() as u64);
        let tests = selection
            .tests
            .iter()
            .enumerate()
            .map(|(idx, test)| SelectedTest {
                rank: idx + 1,
                name: test.name.clone(),
                failed_prs: test.failed_prs,
                newly_covered: test.newly_covered,
                cumulative_covered: test.cumulative_covered,
                cumulative_share: test.cumulative_covered as f64 / selection.universe as f64,
            })
            .collect();
        Self {
            version: VERSION,
            outcome: Outcome::Selected,
            settings,
            counts,
            coverage: Some(selection.share()),
            target_reached: Some(selection.reached),
            tests,
            refusal: None,
        }
    }

    pub fn refusal(settings: Settings, counts: Counts, refusal: Refusal) -> Self {
        Self {
            version: VERSION,
            outcome: Outcome::Refusal,
            settings,
            counts,
            coverage: None,
            target_reached: None,
            tests: Vec::new(),
            refusal: Some(refusal),
        }
    }
}

pub fn render_json(output: &JsonOutput) -> Result<String, serde_json::Error> {
    serde_json::to_string(output)
}

/// Machine-readable detail object for a refusal.
pub fn refusal_detail_json(kind: &RefusalKind) -> Value {
    match kind {
        RefusalKind::Io { path, error } => json!({
            "path": path,
            "error": error,
        }),
        RefusalKind::History {
            path,
            line,
            message,
        } => json!({
            "path": path,
            "line": line,
            "error": message,
        }),
        RefusalKind::Provider { test, error } => json!({
            "test": test,
            "error": error,
        }),
        RefusalKind::NoTests { team, test_prefix } => json!({
            "team": team,
            "test_prefix": test_prefix,
        }),
        RefusalKind::NoFailures {
            team,
            tests,
            history_length,
        } => json!({
            "team": team,
            "tests": tests,
            "test_history_length": history_length,
        }),
        RefusalKind::Coverage { coverage_pct } => json!({
            "coverage": coverage_pct,
        }),
    }
}
