// Human output headers

use crate::format::numbers::{format_count, plural};

#[derive(Debug, Clone, Copy)]
pub struct Settings<'a> {
    pub history: &'a str,
    pub history_length: usize,
    pub test_prefix: &'a str,
}

#[derive(Debug, Clone, Copy)]
pub struct AnalyzedCounts {
    pub tests: usize,
    pub tests_with_failures: usize,
    pub failing_prs: usize,
}

pub struct HumanHeader<'a> {
    pub team: &'a str,
    pub settings: Settings<'a>,
    /// Absent when the run stopped before extraction finished.
    pub analyzed: Option<AnalyzedCounts>,
}

pub fn render_header(ctx: &HumanHeader<'_>) -> Vec<String> {
    let mut lines = vec![
        format!("Team: {}", ctx.team),
        format!(
            "History: {} (last {} results per test, prefix {})",
            ctx.settings.history,
            format_count(ctx.settings.history_length),
            ctx.settings.test_prefix
        ),
    ];
    if let Some(analyzed) = ctx.analyzed {
        lines.push(format!(
            "Analyzed: {} {}, {} with failures, {} failing {}",
            format_count(analyzed.tests),
            plural(analyzed.tests, "test"),
            format_count(analyzed.tests_with_failures),
            format_count(analyzed.failing_prs),
            plural(analyzed.failing_prs, "PR")
        ));
    }
    lines
}
