// Human REFUSAL output formatting

use crate::refusal::details::{RefusalDetail, RefusalKind};

pub fn render_refusal_body(detail: &RefusalDetail) -> Vec<String> {
    let code = detail.code();
    vec![
        "Cannot select tests.".to_string(),
        format!("Reason ({}): {}.", code, code.reason()),
        render_example_line(&detail.kind),
        format!("Next: {}", detail.next),
    ]
}

fn render_example_line(kind: &RefusalKind) -> String {
    match kind {
        RefusalKind::Io { path, error } => format!("Example: {path}: {error}."),
        RefusalKind::History {
            path,
            line: Some(line),
            message,
        } => format!("Example: {path} line {line}: {message}."),
        RefusalKind::History {
            path,
            line: None,
            message,
        } => format!("Example: {path}: {message}."),
        RefusalKind::Provider { test, error } => {
            format!("Example: fetching results for {test} failed: {error}.")
        }
        RefusalKind::NoTests { team, test_prefix } => {
            format!("Example: no test under {test_prefix:?} is owned by team {team}.")
        }
        RefusalKind::NoFailures {
            team,
            tests,
            history_length,
        } => format!(
            "Example: no failures found for team {team} across {tests} tests in the last {history_length} results each."
        ),
        RefusalKind::Coverage { coverage_pct } => {
            format!("Example: coverage {coverage_pct} is outside 1..=100.")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_reason_example_and_next() {
        let detail = RefusalDetail::new(
            RefusalKind::History {
                path: "h.csv".to_string(),
                line: Some(4),
                message: "unknown result status \"BOOM\"".to_string(),
            },
            "fix it".to_string(),
        );
        let lines = render_refusal_body(&detail);
        assert_eq!(lines[0], "Cannot select tests.");
        assert_eq!(lines[1], "Reason (E_HISTORY): malformed test history.");
        assert_eq!(
            lines[2],
            "Example: h.csv line 4: unknown result status \"BOOM\"."
        );
        assert_eq!(lines[3], "Next: fix it");
    }

    #[test]
    fn provider_example_names_test() {
        let detail = RefusalDetail::new(
            RefusalKind::Provider {
                test: "t_a".to_string(),
                error: "down".to_string(),
            },
            "restore".to_string(),
        );
        assert_eq!(
            render_refusal_body(&detail)[2],
            "Example: fetching results for t_a failed: down."
        );
    }
}
