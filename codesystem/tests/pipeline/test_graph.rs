//! Tests for execution plan construction
//!
//! Tests declaration-order resolution, the forward-reference degradation and
//! strict graph resolution

use super::common::*;
use codesystem::crew::{build_plan, DependencyMode, TaskDefinition};
use codesystem::worker::StubJournal;
use codesystem::PipelineError;

// ============================================================================
// Legacy Mode Tests
// ============================================================================

#[test]
fn test_plan_follows_declaration_order() {
    let registry = stub_registry(&[agent("worker")], &StubJournal::default(), None);

    let plan = build_plan(&abc_tasks(), &registry, DependencyMode::Legacy).unwrap();

    assert_eq!(plan.len(), 3);
    assert_eq!(plan.names(), vec!["A", "B", "C"]);
    assert_eq!(plan.get("C").unwrap().dependency_names(), vec!["A", "B"]);
}

#[test]
fn test_forward_reference_is_dropped() {
    let registry = stub_registry(&[agent("worker")], &StubJournal::default(), None);
    let tasks = vec![
        TaskDefinition::new("early", "needs later", "worker").with_dependencies(["late"]),
        TaskDefinition::new("late", "declared second", "worker"),
    ];

    let plan = build_plan(&tasks, &registry, DependencyMode::Legacy).unwrap();

    assert_eq!(plan.names(), vec!["early", "late"]);
    assert!(plan.get("early").unwrap().dependencies.is_empty());
}

#[test]
fn test_unknown_dependency_is_dropped() {
    let registry = stub_registry(&[agent("worker")], &StubJournal::default(), None);
    let tasks = vec![TaskDefinition::new("only", "d", "worker").with_dependencies(["ghost"])];

    let plan = build_plan(&tasks, &registry, DependencyMode::Legacy).unwrap();
    assert!(plan.get("only").unwrap().dependencies.is_empty());
}

#[test]
fn test_unresolved_agent_is_fatal() {
    let registry = stub_registry(&[agent("worker")], &StubJournal::default(), None);
    let tasks = vec![TaskDefinition::new("t", "d", "nobody")];

    for mode in [DependencyMode::Legacy, DependencyMode::Strict] {
        match build_plan(&tasks, &registry, mode).unwrap_err() {
            PipelineError::UnresolvedAgent { task, agent } => {
                assert_eq!(task, "t");
                assert_eq!(agent, "nobody");
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}

// ============================================================================
// Strict Mode Tests
// ============================================================================

#[test]
fn test_strict_matches_legacy_for_ordered_declarations() {
    let registry = stub_registry(&[agent("worker")], &StubJournal::default(), None);

    let legacy = build_plan(&abc_tasks(), &registry, DependencyMode::Legacy).unwrap();
    let strict = build_plan(&abc_tasks(), &registry, DependencyMode::Strict).unwrap();

    assert_eq!(legacy.names(), strict.names());
}

#[test]
fn test_strict_reorders_forward_reference() {
    let registry = stub_registry(&[agent("worker")], &StubJournal::default(), None);
    let tasks = vec![
        TaskDefinition::new("report", "r", "worker").with_dependencies(["scan"]),
        TaskDefinition::new("scan", "s", "worker"),
    ];

    let plan = build_plan(&tasks, &registry, DependencyMode::Strict).unwrap();

    assert_eq!(plan.names(), vec!["scan", "report"]);
    assert_eq!(plan.get("report").unwrap().dependency_names(), vec!["scan"]);
}

#[test]
fn test_strict_rejects_cycles_and_unknown_names() {
    let registry = stub_registry(&[agent("worker")], &StubJournal::default(), None);

    let cyclic = vec![
        TaskDefinition::new("x", "d", "worker").with_dependencies(["y"]),
        TaskDefinition::new("y", "d", "worker").with_dependencies(["x"]),
        TaskDefinition::new("z", "d", "worker"),
    ];
    match build_plan(&cyclic, &registry, DependencyMode::Strict).unwrap_err() {
        PipelineError::DependencyCycle(names) => assert_eq!(names, vec!["x", "y"]),
        other => panic!("unexpected error: {other}"),
    }

    let unknown = vec![TaskDefinition::new("x", "d", "worker").with_dependencies(["ghost"])];
    assert!(matches!(
        build_plan(&unknown, &registry, DependencyMode::Strict).unwrap_err(),
        PipelineError::UnresolvedDependency { .. }
    ));
}
