mod helpers;

use microcheck::cli::args::Args;
use microcheck::cli::exit::Outcome;
use microcheck::orchestrator::{self, PipelineResult};
use serde_json::Value;

fn run(fixture: &str, team: &str, coverage: u32, history_length: usize, json: bool) -> PipelineResult {
    let args = Args::new(
        team.to_string(),
        coverage,
        helpers::fixture_path(fixture),
        history_length,
        "linux:__python".to_string(),
        json,
    );
    orchestrator::run(&args).expect("pipeline should not fail at process level")
}

fn run_json(fixture: &str, team: &str, coverage: u32, history_length: usize) -> (Outcome, Value) {
    let result = run(fixture, team, coverage, history_length, true);
    let value = serde_json::from_str(&result.output).expect("output should be json");
    (result.outcome, value)
}

#[test]
fn selects_tests_from_history_file() {
    let (outcome, value) = run_json("history_basic.csv", "core", 80, 100);
    assert_eq!(outcome, Outcome::Selected);
    assert_eq!(value["outcome"], "SELECTED");
    assert_eq!(value["counts"]["tests"], 4);
    assert_eq!(value["counts"]["tests_with_failures"], 3);
    assert_eq!(value["counts"]["failing_prs"], 5);
    assert_eq!(value["counts"]["covered_prs"], 4);
    assert_eq!(value["counts"]["selected_tests"], 2);
    assert_eq!(value["tests"][0]["name"], "linux:__python_t1");
    assert_eq!(value["tests"][1]["name"], "linux:__python_t2");
    assert_eq!(value["coverage"], 0.8);
    assert_eq!(value["target_reached"], true);
}

#[test]
fn full_coverage_selects_all_failing_tests() {
    let (_, value) = run_json("history_basic.csv", "core", 100, 100);
    let names: Vec<&str> = value["tests"]
        .as_array()
        .unwrap()
        .iter()
        .map(|test| test["name"].as_str().unwrap())
        .collect();
    assert_eq!(
        names,
        vec!["linux:__python_t1", "linux:__python_t2", "linux:__python_t3"]
    );
}

#[test]
fn shorter_history_changes_the_ranking_inputs() {
    let (_, value) = run_json("history_basic.csv", "core", 80, 2);
    assert_eq!(value["counts"]["failing_prs"], 4);
    assert_eq!(value["settings"]["test_history_length"], 2);
    // t2 and t3 tie at one PR each; name order puts t2 first.
    assert_eq!(value["tests"][1]["name"], "linux:__python_t2");
    assert_eq!(value["tests"][2]["name"], "linux:__python_t3");
    assert_eq!(value["counts"]["selected_tests"], 3);
}

#[test]
fn other_team_is_scoped_separately() {
    let (outcome, value) = run_json("history_basic.csv", "data", 100, 100);
    assert_eq!(outcome, Outcome::Selected);
    assert_eq!(value["tests"][0]["name"], "linux:__python_data");
    assert_eq!(value["counts"]["tests"], 1);
}

#[test]
fn all_green_history_refuses_with_no_failures() {
    let (outcome, value) = run_json("history_all_green.csv", "core", 80, 100);
    assert_eq!(outcome, Outcome::Refusal);
    assert_eq!(value["refusal"]["code"], "E_NO_FAILURES");
    assert_eq!(value["refusal"]["detail"]["tests"], 2);
    assert_eq!(value["counts"]["failing_prs"], 0);
}

#[test]
fn unknown_team_refuses_with_no_tests() {
    let (outcome, value) = run_json("history_basic.csv", "nobody", 80, 100);
    assert_eq!(outcome, Outcome::Refusal);
    assert_eq!(value["refusal"]["code"], "E_NO_TESTS");
    assert!(value["counts"]["tests"].is_null());
}

#[test]
fn malformed_history_refuses() {
    let (outcome, value) = run_json("history_bad_status.csv", "core", 80, 100);
    assert_eq!(outcome, Outcome::Refusal);
    assert_eq!(value["refusal"]["code"], "E_HISTORY");
    assert_eq!(value["refusal"]["detail"]["line"], 3);
}

#[test]
fn missing_history_file_refuses_with_io() {
    let (outcome, value) = run_json("does_not_exist.csv", "core", 80, 100);
    assert_eq!(outcome, Outcome::Refusal);
    assert_eq!(value["refusal"]["code"], "E_IO");
}

#[test]
fn human_refusal_goes_through_refusal_outcome() {
    let result = run("history_all_green.csv", "core", 80, 100, false);
    assert_eq!(result.outcome, Outcome::Refusal);
    assert!(result.output.starts_with("MICROCHECK ERROR (E_NO_FAILURES)"));
}

#[test]
fn embedded_history_with_unreachable_test_refuses_with_provider() {
    use microcheck::config::SelectionConfig;
    use microcheck::history::memory::MemoryHistory;
    use microcheck::history::{TestCase, TestResult};
    use microcheck::refusal::codes::RefusalCode;

    let history = MemoryHistory::new()
        .with_test(
            TestCase::new("linux:__python_a", "core"),
            vec![TestResult::error("pr1")],
        )
        .with_test(
            TestCase::new("linux:__python_b", "core"),
            vec![TestResult::error("pr2")],
        )
        .with_broken_test("linux:__python_b");
    let evaluation = orchestrator::evaluate(&history, &history, &SelectionConfig::new("core", 50));
    let kind = evaluation.verdict.unwrap_err();
    assert_eq!(kind.code(), RefusalCode::Provider);
    assert!(evaluation.analysis.is_none());
}
