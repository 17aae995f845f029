//! Task graph construction
//!
//! Turns task definitions into an [`ExecutionPlan`]: each [`ExecutionUnit`] is
//! bound to its worker and holds the already-built units it depends on.
//!
//! Two resolution modes exist:
//! - [`DependencyMode::Legacy`] walks definitions in declaration order and drops
//!   any dependency name not built yet (unknown names and forward references).
//! - [`DependencyMode::Strict`] resolves the whole graph, rejects unknown names
//!   and cycles, and orders units topologically (declaration order breaks ties).

use std::collections::{BTreeSet, HashMap, HashSet};
use std::sync::Arc;

use codesystem_sdk::log_warning;

use crate::crew::registry::WorkerRegistry;
use crate::crew::types::TaskDefinition;
use crate::error::{PipelineError, PipelineResult};
use crate::worker::Worker;

/// How dependency names are resolved
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DependencyMode {
    /// Declaration-order resolution; unresolvable names are dropped
    #[default]
    Legacy,
    /// Full graph resolution; unknown names and cycles are errors
    Strict,
}

impl std::str::FromStr for DependencyMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "legacy" => Ok(Self::Legacy),
            "strict" => Ok(Self::Strict),
            other => Err(format!("unknown dependency mode '{}' (legacy|strict)", other)),
        }
    }
}

/// A task bound to its worker and to its resolved dependency units
pub struct ExecutionUnit {
    pub task: TaskDefinition,
    pub worker: Arc<dyn Worker>,
    pub dependencies: Vec<Arc<ExecutionUnit>>,
}

impl ExecutionUnit {
    pub fn name(&self) -> &str {
        &self.task.name
    }

    pub fn dependency_names(&self) -> Vec<&str> {
        self.dependencies.iter().map(|d| d.name()).collect()
    }
}

impl std::fmt::Debug for ExecutionUnit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExecutionUnit")
            .field("task", &self.task.name)
            .field("agent", &self.worker.agent().name)
            .field("dependencies", &self.dependency_names())
            .finish()
    }
}

/// Units in the order they run
#[derive(Debug, Default)]
pub struct ExecutionPlan {
    units: Vec<Arc<ExecutionUnit>>,
}

impl ExecutionPlan {
    pub fn units(&self) -> &[Arc<ExecutionUnit>] {
        &self.units
    }

    pub fn names(&self) -> Vec<&str> {
        self.units.iter().map(|u| u.name()).collect()
    }

    pub fn get(&self, name: &str) -> Option<&Arc<ExecutionUnit>> {
        self.units.iter().find(|u| u.name() == name)
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }
}

/// Build the execution plan for `tasks` against the workers in `registry`
pub fn build_plan(
    tasks: &[TaskDefinition],
    registry: &WorkerRegistry,
    mode: DependencyMode,
) -> PipelineResult<ExecutionPlan> {
    ensure_unique_names(tasks)?;

    match mode {
        DependencyMode::Legacy => build_in_declaration_order(tasks, registry),
        DependencyMode::Strict => build_topological(tasks, registry),
    }
}

fn ensure_unique_names(tasks: &[TaskDefinition]) -> PipelineResult<()> {
    let mut seen = HashSet::new();
    for task in tasks {
        if !seen.insert(task.name.as_str()) {
            return Err(PipelineError::config(format!(
                "task '{}' is defined more than once",
                task.name
            )));
        }
    }
    Ok(())
}

fn resolve_worker(task: &TaskDefinition, registry: &WorkerRegistry) -> PipelineResult<Arc<dyn Worker>> {
    registry
        .get(&task.agent_name)
        .ok_or_else(|| PipelineError::UnresolvedAgent {
            task: task.name.clone(),
            agent: task.agent_name.clone(),
        })
}

fn build_in_declaration_order(
    tasks: &[TaskDefinition],
    registry: &WorkerRegistry,
) -> PipelineResult<ExecutionPlan> {
    let mut built: HashMap<&str, Arc<ExecutionUnit>> = HashMap::new();
    let mut plan = ExecutionPlan::default();

    for task in tasks {
        let worker = resolve_worker(task, registry)?;

        let mut dependencies = Vec::new();
        let mut seen = HashSet::new();
        for dep in &task.dependency_names {
            if !seen.insert(dep.as_str()) {
                continue;
            }
            match built.get(dep.as_str()) {
                Some(unit) => dependencies.push(unit.clone()),
                None => log_warning!(
                    "task '{}' depends on '{}', which is not declared before it; dependency ignored",
                    task.name,
                    dep
                ),
            }
        }

        let unit = Arc::new(ExecutionUnit {
            task: task.clone(),
            worker,
            dependencies,
        });
        built.insert(task.name.as_str(), unit.clone());
        plan.units.push(unit);
    }

    Ok(plan)
}

fn build_topological(
    tasks: &[TaskDefinition],
    registry: &WorkerRegistry,
) -> PipelineResult<ExecutionPlan> {
    let index: HashMap<&str, usize> = tasks
        .iter()
        .enumerate()
        .map(|(i, t)| (t.name.as_str(), i))
        .collect();

    let mut workers = Vec::with_capacity(tasks.len());
    let mut in_degree = vec![0usize; tasks.len()];
    let mut dependents: Vec<Vec<usize>> = vec![Vec::new(); tasks.len()];

    for (i, task) in tasks.iter().enumerate() {
        workers.push(resolve_worker(task, registry)?);

        let mut unique = HashSet::new();
        for dep in &task.dependency_names {
            let dep_idx = *index
                .get(dep.as_str())
                .ok_or_else(|| PipelineError::UnresolvedDependency {
                    task: task.name.clone(),
                    dependency: dep.clone(),
                })?;
            if unique.insert(dep_idx) {
                in_degree[i] += 1;
                dependents[dep_idx].push(i);
            }
        }
    }

    // Lowest declaration index first keeps the order stable
    let mut ready: BTreeSet<usize> = (0..tasks.len()).filter(|&i| in_degree[i] == 0).collect();
    let mut order = Vec::with_capacity(tasks.len());

    while let Some(next) = ready.pop_first() {
        order.push(next);
        for &dependent in &dependents[next] {
            in_degree[dependent] -= 1;
            if in_degree[dependent] == 0 {
                ready.insert(dependent);
            }
        }
    }

    if order.len() < tasks.len() {
        let scheduled: HashSet<usize> = order.iter().copied().collect();
        let stuck: HashSet<usize> = (0..tasks.len()).filter(|i| !scheduled.contains(i)).collect();
        // Tasks merely waiting on a cycle are left out
        let members = (0..tasks.len())
            .filter(|&i| stuck.contains(&i) && reaches_itself(i, &dependents, &stuck))
            .map(|i| tasks[i].name.clone())
            .collect();
        return Err(PipelineError::DependencyCycle(members));
    }

    let mut built: HashMap<&str, Arc<ExecutionUnit>> = HashMap::new();
    let mut plan = ExecutionPlan::default();

    for i in order {
        let task = &tasks[i];
        let mut seen = HashSet::new();
        let dependencies = task
            .dependency_names
            .iter()
            .filter(|dep| seen.insert(dep.as_str()))
            .filter_map(|dep| built.get(dep.as_str()).cloned())
            .collect();

        let unit = Arc::new(ExecutionUnit {
            task: task.clone(),
            worker: workers[i].clone(),
            dependencies,
        });
        built.insert(task.name.as_str(), unit.clone());
        plan.units.push(unit);
    }

    Ok(plan)
}

/// Whether `start` lies on a cycle made only of `within` nodes
fn reaches_itself(start: usize, dependents: &[Vec<usize>], within: &HashSet<usize>) -> bool {
    let mut visited = HashSet::new();
    let mut stack: Vec<usize> = dependents[start].clone();

    while let Some(node) = stack.pop() {
        if node == start {
            return true;
        }
        if within.contains(&node) && visited.insert(node) {
            stack.extend(dependents[node].iter().copied());
        }
    }
    false
}
