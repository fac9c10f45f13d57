// Human SELECTED body formatting

use crate::coverage::select::Selection;
use crate::format::numbers::{format_count, format_percent_one_decimal, plural};

pub fn render_selection_body(selection: &Selection) -> Vec<String> {
    let count = selection.len();
    let mut lines = Vec::with_capacity(count + 5);
    let summary = format!(
        "{} {} cover {} of failing PRs ({}/{}, target {}%)",
        format_count(count),
        plural(count, "test"),
        format_percent_one_decimal(selection.share()),
        format_count(selection.covered),
        format_count(selection.universe),
        selection.coverage_pct
    );
    if selection.reached {
        lines.push(format!("{summary}:"));
    } else {
        lines.push(format!("{summary}; target unreachable, every test selected:"));
    }
    lines.push(String::new());
    for (idx, test) in selection.tests.iter().enumerate() {
        let cumulative = test.cumulative_covered as f64 / selection.universe as f64;
        lines.push(format!(
            "{}. {}  {} failing {}  (+{}, cumulative {})",
            idx + 1,
            test.name,
            format_count(test.failed_prs),
            plural(test.failed_prs, "PR"),
            format_count(test.newly_covered),
            format_percent_one_decimal(cumulative)
        ));
    }
    lines.push(String::new());
    lines.push(format!(
        "To cover {}% of PRs, run the following tests: {}",
        selection.coverage_pct,
        selection.names().join(", ")
    ));
    lines
}
