//! Pipeline orchestration: registry → failure sets → selection → output

use std::error::Error;

use tracing::{info, warn};

use crate::cli::args::Args;
use crate::cli::exit::Outcome;
use crate::config::SelectionConfig;
use crate::coverage::extract::build_failure_map;
use crate::coverage::select::{MAX_COVERAGE, SelectError, Selection, select_minimal_cover};
use crate::coverage::{FailureMap, coverage_universe};
use crate::history::csv_store::{CsvHistory, HistoryError};
use crate::history::{ResultHistory, TestRegistry};
use crate::output::human::header::{
    AnalyzedCounts, HumanHeader, Settings as HumanSettings, render_header,
};
use crate::output::human::refusal::render_refusal_body;
use crate::output::human::selection::render_selection_body;
use crate::output::json::{
    Counts, JsonOutput, Refusal as JsonRefusal, Settings as JsonSettings, refusal_detail_json,
    render_json,
};
use crate::refusal::details::{RefusalDetail, RefusalKind, RerunContext};

pub struct PipelineResult {
    pub outcome: Outcome,
    pub output: String,
}

/// Sizes observed once every failure set was extracted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Analysis {
    pub tests: usize,
    pub tests_with_failures: usize,
    pub failing_prs: usize,
}

impl Analysis {
    pub fn of(failures: &FailureMap) -> Self {
        Self {
            tests: failures.len(),
            tests_with_failures: failures.values().filter(|prs| !prs.is_empty()).count(),
            failing_prs: coverage_universe(failures).len(),
        }
    }
}

/// Result of one selection run, before rendering.
#[derive(Debug, Clone)]
pub struct Evaluation {
    pub analysis: Option<Analysis>,
    pub verdict: Result<Selection, RefusalKind>,
}

impl Evaluation {
    fn refused(analysis: Option<Analysis>, kind: RefusalKind) -> Self {
        Self {
            analysis,
            verdict: Err(kind),
        }
    }
}

/// Where the history came from, for report headers and rerun hints.
struct ReportContext<'a> {
    config: &'a SelectionConfig,
    history: &'a str,
    json: bool,
}

pub fn run(args: &Args) -> Result<PipelineResult, Box<dyn Error>> {
    let config = args.selection_config();
    let history_label = args.history.to_string_lossy().to_string();
    let ctx = ReportContext {
        config: &config,
        history: &history_label,
        json: args.json,
    };

    let evaluation = match CsvHistory::open(&args.history) {
        Ok(history) => {
            info!(
                path = %history_label,
                rows = history.rows(),
                tests = history.tests(),
                "loaded test history"
            );
            evaluate(&history, &history, &config)
        }
        Err(err) => Evaluation::refused(None, history_refusal(err, &history_label)),
    };

    render(&ctx, evaluation)
}

/// List the team's tests, extract their failure sets, and select the cover.
///
/// Provider failures refuse the whole run; a test whose history could not be
/// fetched is never counted as having zero failures.
pub fn evaluate<R, H>(registry: &R, history: &H, config: &SelectionConfig) -> Evaluation
where
    R: TestRegistry + ?Sized,
    H: ResultHistory + ?Sized,
{
    if config.coverage == 0 || config.coverage > MAX_COVERAGE {
        return Evaluation::refused(
            None,
            RefusalKind::Coverage {
                coverage_pct: config.coverage,
            },
        );
    }

    let tests = match registry.list_tests_for_team(&config.test_prefix, &config.team) {
        Ok(tests) => tests,
        Err(err) => {
            return Evaluation::refused(
                None,
                RefusalKind::Provider {
                    test: err.test().unwrap_or("<registry>").to_string(),
                    error: err.to_string(),
                },
            );
        }
    };
    info!("Analyzing {} tests for team {}", tests.len(), config.team);
    if tests.is_empty() {
        return Evaluation::refused(
            None,
            RefusalKind::NoTests {
                team: config.team.clone(),
                test_prefix: config.test_prefix.clone(),
            },
        );
    }

    let failures = match build_failure_map(history, &tests, config.history_length) {
        Ok(failures) => failures,
        Err(err) => {
            return Evaluation::refused(
                None,
                RefusalKind::Provider {
                    test: err.test,
                    error: err.source.to_string(),
                },
            );
        }
    };
    let analysis = Analysis::of(&failures);

    match select_minimal_cover(&failures, config.coverage) {
        Ok(selection) => {
            info!(
                "To cover {}% of PRs, run the following tests: {:?}",
                config.coverage,
                selection.names()
            );
            Evaluation {
                analysis: Some(analysis),
                verdict: Ok(selection),
            }
        }
        Err(SelectError::EmptyUniverse { tests }) => Evaluation::refused(
            Some(analysis),
            RefusalKind::NoFailures {
                team: config.team.clone(),
                tests,
                history_length: config.history_length,
            },
        ),
        Err(SelectError::InvalidCoverage { coverage_pct }) => {
            Evaluation::refused(Some(analysis), RefusalKind::Coverage { coverage_pct })
        }
    }
}

fn history_refusal(err: HistoryError, path: &str) -> RefusalKind {
    match err {
        HistoryError::Io { error } => RefusalKind::Io {
            path: path.to_string(),
            error,
        },
        HistoryError::MissingColumn { .. } => RefusalKind::History {
            path: path.to_string(),
            line: Some(1),
            message: err.to_string(),
        },
        HistoryError::Row { line, message } => RefusalKind::History {
            path: path.to_string(),
            line,
            message,
        },
    }
}

fn render(
    ctx: &ReportContext<'_>,
    evaluation: Evaluation,
) -> Result<PipelineResult, Box<dyn Error>> {
    match evaluation.verdict {
        Ok(selection) => render_selected(ctx, evaluation.analysis, &selection),
        Err(kind) => {
            let rerun = RerunContext {
                history: ctx.history,
                team: &ctx.config.team,
                coverage: ctx.config.coverage,
                test_prefix: &ctx.config.test_prefix,
            };
            let detail = RefusalDetail::with_default_next(kind, rerun);
            warn!(code = %detail.code(), "refusing: {}", detail.code().reason());
            render_refusal(ctx, evaluation.analysis, &detail)
        }
    }
}

fn render_selected(
    ctx: &ReportContext<'_>,
    analysis: Option<Analysis>,
    selection: &Selection,
) -> Result<PipelineResult, Box<dyn Error>> {
    let output = if ctx.json {
        render_json(&JsonOutput::selected(
            json_settings(ctx),
            json_counts(analysis),
            selection,
        ))?
    } else {
        let mut lines = vec![
            "MICROCHECK".to_string(),
            String::new(),
            "SELECTED".to_string(),
            String::new(),
        ];
        lines.extend(render_header(&human_header(ctx, analysis)));
        lines.push(String::new());
        lines.extend(render_selection_body(selection));
        lines.join("\n")
    };
    Ok(PipelineResult {
        outcome: Outcome::Selected,
        output,
    })
}

fn render_refusal(
    ctx: &ReportContext<'_>,
    analysis: Option<Analysis>,
    detail: &RefusalDetail,
) -> Result<PipelineResult, Box<dyn Error>> {
    let code = detail.code();
    let output = if ctx.json {
        let refusal = JsonRefusal::new(code, code.reason(), refusal_detail_json(&detail.kind));
        render_json(&JsonOutput::refusal(
            json_settings(ctx),
            json_counts(analysis),
            refusal,
        ))?
    } else {
        let mut lines = vec![format!("MICROCHECK ERROR ({code})"), String::new()];
        lines.extend(render_header(&human_header(ctx, analysis)));
        lines.push(String::new());
        lines.extend(render_refusal_body(detail));
        lines.join("\n")
    };
    Ok(PipelineResult {
        outcome: Outcome::Refusal,
        output,
    })
}

fn human_header<'a>(ctx: &'a ReportContext<'a>, analysis: Option<Analysis>) -> HumanHeader<'a> {
    HumanHeader {
        team: &ctx.config.team,
        settings: HumanSettings {
            history: ctx.history,
            history_length: ctx.config.history_length,
            test_prefix: &ctx.config.test_prefix,
        },
        analyzed: analysis.map(|analysis| AnalyzedCounts {
            tests: analysis.tests,
            tests_with_failures: analysis.tests_with_failures,
            failing_prs: analysis.failing_prs,
        }),
    }
}

fn json_settings(ctx: &ReportContext<'_>) -> JsonSettings {
    JsonSettings {
        team: ctx.config.team.clone(),
        coverage: ctx.config.coverage,
        history: ctx.history.to_string(),
        test_history_length: ctx.config.history_length,
        test_prefix: ctx.config.test_prefix.clone(),
    }
}

fn json_counts(analysis: Option<Analysis>) -> Counts {
    match analysis {
        Some(analysis) => Counts {
            tests: Some(analysis.tests as u64),
            tests_with_failures: Some(analysis.tests_with_failures as u64),
            failing_prs: Some(analysis.failing_prs as u64),
            ..Counts::default()
        },
        None => Counts::default(),
    }
}
