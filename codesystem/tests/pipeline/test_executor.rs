//! Tests for sequential plan execution
//!
//! Tests output collection, dependency context and context field threading

use super::common::*;
use codesystem::crew::{build_plan, run_plan, DependencyMode, RunContext};
use codesystem::worker::StubJournal;

#[tokio::test]
async fn test_abc_round_trip() {
    let journal = StubJournal::default();
    let registry = stub_registry(&[agent("worker")], &journal, None);
    let plan = build_plan(&abc_tasks(), &registry, DependencyMode::Legacy).unwrap();

    let outcome = run_plan(&plan, RunContext::new("abc.py", "pass")).await.unwrap();

    let outputs = outcome.outputs.to_map();
    assert_eq!(outputs.len(), 3);
    assert_eq!(outputs["A"], "A-output");
    assert_eq!(outputs["B"], "B-output");
    assert_eq!(outputs["C"], "C-output");

    let c_call = journal.call_for("C").unwrap();
    let context: Vec<(&str, &str)> = c_call
        .request
        .context
        .iter()
        .map(|o| (o.task_name.as_str(), o.text.as_str()))
        .collect();
    assert_eq!(context, vec![("A", "A-output"), ("B", "B-output")]);

    assert!(journal.call_for("A").unwrap().request.context.is_empty());
    assert_eq!(outcome.aggregate.text, "C-output");
}

#[tokio::test]
async fn test_calls_follow_plan_order() {
    let journal = StubJournal::default();
    let registry = stub_registry(&[agent("worker")], &journal, None);
    let plan = build_plan(&abc_tasks(), &registry, DependencyMode::Strict).unwrap();

    run_plan(&plan, RunContext::default()).await.unwrap();

    let order: Vec<String> = journal
        .calls()
        .into_iter()
        .map(|c| c.request.task_name)
        .collect();
    assert_eq!(order, vec!["A", "B", "C"]);
}

#[tokio::test]
async fn test_context_fields_fixed_and_overwritten() {
    let journal = StubJournal::default();
    let definitions = small_definitions();
    let registry = stub_registry(&definitions.agents, &journal, None);
    let plan = build_plan(&definitions.tasks, &registry, DependencyMode::Legacy).unwrap();

    let initial = RunContext::new("src/app.py", "print('hi')");
    let field_count = initial.len();
    let outcome = run_plan(&plan, initial).await.unwrap();

    assert_eq!(outcome.context.len(), field_count);
    assert_eq!(
        outcome.context.get("code_analysis_output"),
        Some("code_analysis_output-output")
    );
    assert_eq!(outcome.context.get("security_analysis_output"), Some(""));

    let first = journal.call_for("code_analysis_output").unwrap();
    assert_eq!(first.request.description, "Analyze src/app.py:\nprint('hi')");
    let last = journal.call_for("final_report_task").unwrap();
    assert_eq!(
        last.request.description,
        "Report on src/app.py: code_analysis_output-output"
    );
}
