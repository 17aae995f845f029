//! Tests for the workflow driver
//!
//! Tests the shipped configuration, single-unit processing, batch policies and
//! directory runs, all with stub workers

use super::common::*;
use codesystem::crew::{load_definitions, DependencyMode, OUTPUT_FIELDS};
use codesystem::report::ReportMode;
use codesystem::source::{collect_sources, SourceUnit, DEFAULT_EXTENSIONS};
use codesystem::worker::{StubJournal, StubWorker};
use codesystem::{run_workflow_with, BatchPolicy, Codesystem, PipelineError, WorkflowConfig};

fn config_for(output_dir: &std::path::Path) -> WorkflowConfig {
    WorkflowConfig {
        output_dir: output_dir.to_path_buf(),
        ..Default::default()
    }
}

fn three_units() -> Vec<SourceUnit> {
    vec![
        SourceUnit::new("one.py", "print(1)"),
        SourceUnit::new("two.py", "EXPLODE"),
        SourceUnit::new("three.py", "print(3)"),
    ]
}

fn called_for(journal: &StubJournal, identifier: &str) -> bool {
    journal
        .calls()
        .iter()
        .any(|c| c.request.description.contains(identifier))
}

// ============================================================================
// Configuration Tests
// ============================================================================

#[tokio::test]
async fn test_shipped_config_builds_in_both_modes() {
    let definitions = load_definitions(&shipped_config_dir()).await.unwrap();

    assert_eq!(definitions.agents.len(), 6);
    let task_names: Vec<&str> = definitions.tasks.iter().map(|t| t.name.as_str()).collect();
    assert_eq!(task_names, OUTPUT_FIELDS.to_vec());

    let factory = StubWorker::factory(StubJournal::default(), None);
    for mode in [DependencyMode::Legacy, DependencyMode::Strict] {
        let config = WorkflowConfig {
            dependency_mode: mode,
            ..Default::default()
        };
        let system = Codesystem::new(&definitions, &factory, &config).unwrap();
        assert_eq!(system.plan().names(), OUTPUT_FIELDS.to_vec());
        assert_eq!(
            system
                .plan()
                .get("final_report_task")
                .unwrap()
                .dependencies
                .len(),
            5
        );
    }
}

// ============================================================================
// Single Unit Tests
// ============================================================================

#[tokio::test]
async fn test_process_one_names_artifact_after_file() {
    let temp = create_temp_dir("process_one");
    let definitions = load_definitions(&shipped_config_dir()).await.unwrap();
    let factory = StubWorker::factory(StubJournal::default(), None);
    let system = Codesystem::new(&definitions, &factory, &config_for(&temp)).unwrap();

    let path = system.process_one("/tmp/x/app.py", "print('hi')").await.unwrap();

    assert_eq!(path.parent().unwrap(), temp.as_path());
    assert!(is_artifact_name(&path.file_name().unwrap().to_string_lossy(), "app"));
    let content = std::fs::read_to_string(&path).unwrap();
    assert!(content.starts_with("# Code Analysis Report\n\n## File: /tmp/x/app.py\n"));
    assert!(content.contains("final_report_task-output"));

    cleanup_temp_dir(&temp);
}

#[tokio::test]
async fn test_structured_report_from_shipped_config() {
    let temp = create_temp_dir("structured");
    let definitions = load_definitions(&shipped_config_dir()).await.unwrap();
    let factory = StubWorker::factory(StubJournal::default(), None);
    let config = WorkflowConfig {
        report_mode: ReportMode::Structured,
        ..config_for(&temp)
    };
    let system = Codesystem::new(&definitions, &factory, &config).unwrap();

    let path = system.process_one("lib.rs", "fn main() {}").await.unwrap();
    let content = std::fs::read_to_string(&path).unwrap();

    assert!(content.contains("### Security Analysis Output\n\nsecurity_analysis_output-output"));
    assert!(content.contains("### Test Coverage Output\n\ncode_test_output-output"));

    cleanup_temp_dir(&temp);
}

#[tokio::test]
async fn test_worker_failure_writes_nothing() {
    let temp = create_temp_dir("worker_failure");
    let factory = StubWorker::factory(StubJournal::default(), Some("EXPLODE".to_string()));
    let system = Codesystem::new(&small_definitions(), &factory, &config_for(&temp)).unwrap();

    let err = system.process_one("bad.py", "EXPLODE").await.unwrap_err();

    match err {
        PipelineError::WorkerInvocation { task, .. } => assert_eq!(task, "code_analysis_output"),
        other => panic!("unexpected error: {other}"),
    }
    assert!(!temp.exists() || std::fs::read_dir(&temp).unwrap().next().is_none());

    cleanup_temp_dir(&temp);
}

// ============================================================================
// Batch Policy Tests
// ============================================================================

#[tokio::test]
async fn test_batch_abort_stops_at_failing_unit() {
    let temp = create_temp_dir("batch_abort");
    let journal = StubJournal::default();
    let factory = StubWorker::factory(journal.clone(), Some("EXPLODE".to_string()));
    let system = Codesystem::new(&small_definitions(), &factory, &config_for(&temp)).unwrap();

    let err = system
        .run_batch(three_units(), BatchPolicy::Abort)
        .await
        .unwrap_err();

    assert!(matches!(err, PipelineError::WorkerInvocation { .. }));
    let written: Vec<String> = std::fs::read_dir(&temp)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
        .collect();
    assert_eq!(written.len(), 1);
    assert!(is_artifact_name(&written[0], "one"));
    assert!(called_for(&journal, "two.py"));
    assert!(!called_for(&journal, "three.py"));

    cleanup_temp_dir(&temp);
}

#[tokio::test]
async fn test_batch_skip_continues_after_failing_unit() {
    let temp = create_temp_dir("batch_skip");
    let journal = StubJournal::default();
    let factory = StubWorker::factory(journal.clone(), Some("EXPLODE".to_string()));
    let system = Codesystem::new(&small_definitions(), &factory, &config_for(&temp)).unwrap();

    let summary = system
        .run_batch(three_units(), BatchPolicy::Skip)
        .await
        .unwrap();

    assert_eq!(summary.artifacts.len(), 2);
    assert!(is_artifact_name(
        &summary.artifacts[0].file_name().unwrap().to_string_lossy(),
        "one"
    ));
    assert!(is_artifact_name(
        &summary.artifacts[1].file_name().unwrap().to_string_lossy(),
        "three"
    ));
    assert_eq!(summary.failed.len(), 1);
    assert_eq!(summary.failed[0].0, "two.py");
    assert!(called_for(&journal, "three.py"));

    cleanup_temp_dir(&temp);
}

// ============================================================================
// Driver Tests
// ============================================================================

#[tokio::test]
async fn test_directory_run_skips_unreadable_files() {
    let temp = create_temp_dir("directory_run");
    let tree = temp.join("tree");
    let out = temp.join("reports");
    std::fs::create_dir_all(tree.join("pkg")).unwrap();
    std::fs::write(tree.join("main.py"), "print('main')").unwrap();
    std::fs::write(tree.join("pkg/util.go"), "package pkg").unwrap();
    std::fs::write(tree.join("notes.txt"), "ignored").unwrap();
    std::fs::write(tree.join("broken.c"), [0xc3, 0x28]).unwrap();

    let config = WorkflowConfig {
        input: tree.display().to_string(),
        ..config_for(&out)
    };
    let factory = StubWorker::factory(StubJournal::default(), None);
    let summary = run_workflow_with(&config, &factory).await.unwrap();

    assert_eq!(summary.artifacts.len(), 2);
    assert_eq!(summary.skipped, vec!["broken.c".to_string()]);
    assert!(summary.failed.is_empty());
    let names: Vec<String> = summary
        .artifacts
        .iter()
        .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
        .collect();
    assert!(is_artifact_name(&names[0], "main"));
    assert!(is_artifact_name(&names[1], "util"));

    cleanup_temp_dir(&temp);
}

#[tokio::test]
async fn test_directory_files_are_read_one_at_a_time() {
    let temp = create_temp_dir("directory_lazy");
    let tree = temp.join("tree");
    std::fs::create_dir_all(&tree).unwrap();
    std::fs::write(tree.join("a_one.py"), "print(1)").unwrap();
    std::fs::write(tree.join("b_two.py"), "EXPLODE").unwrap();
    std::fs::write(tree.join("c_three.c"), [0xc3, 0x28]).unwrap();
    std::fs::write(tree.join("d_four.py"), "print(4)").unwrap();
    let extensions: Vec<String> = DEFAULT_EXTENSIONS.iter().map(|e| e.to_string()).collect();

    // Abort: the failing unit stops the batch before the unreadable file is reached
    let journal = StubJournal::default();
    let factory = StubWorker::factory(journal.clone(), Some("EXPLODE".to_string()));
    let abort_out = temp.join("abort");
    let system = Codesystem::new(&small_definitions(), &factory, &config_for(&abort_out)).unwrap();
    let files = collect_sources(&tree, &extensions).await.unwrap();

    let err = system.run_files(files, BatchPolicy::Abort).await.unwrap_err();

    assert!(matches!(err, PipelineError::WorkerInvocation { .. }));
    assert_eq!(std::fs::read_dir(&abort_out).unwrap().count(), 1);
    assert!(called_for(&journal, "b_two.py"));
    assert!(!called_for(&journal, "d_four.py"));

    // Skip: the unreadable file is skipped, the failing one recorded, the rest processed
    let journal = StubJournal::default();
    let factory = StubWorker::factory(journal.clone(), Some("EXPLODE".to_string()));
    let skip_out = temp.join("skip");
    let system = Codesystem::new(&small_definitions(), &factory, &config_for(&skip_out)).unwrap();
    let files = collect_sources(&tree, &extensions).await.unwrap();

    let summary = system.run_files(files, BatchPolicy::Skip).await.unwrap();

    assert_eq!(summary.artifacts.len(), 2);
    assert_eq!(summary.skipped, vec!["c_three.c".to_string()]);
    assert_eq!(summary.failed.len(), 1);
    assert_eq!(summary.failed[0].0, "b_two.py");
    assert!(called_for(&journal, "d_four.py"));

    cleanup_temp_dir(&temp);
}

#[tokio::test]
async fn test_single_file_run_and_missing_file() {
    let temp = create_temp_dir("single_file_run");
    let source = temp.join("app.py");
    std::fs::write(&source, "print('hi')").unwrap();
    let factory = StubWorker::factory(StubJournal::default(), None);

    let config = WorkflowConfig {
        input: source.display().to_string(),
        ..config_for(&temp.join("reports"))
    };
    let summary = run_workflow_with(&config, &factory).await.unwrap();
    assert_eq!(summary.artifacts.len(), 1);
    assert!(is_artifact_name(
        &summary.artifacts[0].file_name().unwrap().to_string_lossy(),
        "app"
    ));

    let missing = WorkflowConfig {
        input: temp.join("missing.py").display().to_string(),
        ..config_for(&temp.join("reports"))
    };
    let err = run_workflow_with(&missing, &factory).await.unwrap_err();
    assert!(err.to_string().contains("missing.py"));

    cleanup_temp_dir(&temp);
}

#[tokio::test]
async fn test_bad_config_dir_fails_before_any_work() {
    let temp = create_temp_dir("bad_config");
    let source = temp.join("app.py");
    std::fs::write(&source, "print('hi')").unwrap();
    let journal = StubJournal::default();
    let factory = StubWorker::factory(journal.clone(), None);

    let config = WorkflowConfig {
        input: source.display().to_string(),
        config_dir: temp.join("no_config_here"),
        ..config_for(&temp.join("reports"))
    };
    let err = run_workflow_with(&config, &factory).await.unwrap_err();

    assert!(format!("{:#}", err).contains("agents.yaml"));
    assert!(journal.is_empty());
    assert!(!temp.join("reports").exists());

    cleanup_temp_dir(&temp);
}
