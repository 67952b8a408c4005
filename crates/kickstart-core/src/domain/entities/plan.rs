//! Execution ordering.
//!
//! Scripts are ordered by Kahn's algorithm over their `depends` edges. Among
//! scripts that are ready at the same time, the lower phase goes first, then
//! the one registered earlier, so the same inputs always give the same plan.

use std::collections::{BTreeSet, HashMap};

use serde::Serialize;

use crate::domain::{
    entities::manifest::ScriptManifest, error::DomainError, value_objects::Phase,
};

/// One entry of an [`ExecutionPlan`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlannedScript {
    pub name: String,
    pub phase: Phase,
}

/// Scripts in the order they will run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ExecutionPlan {
    steps: Vec<PlannedScript>,
}

impl ExecutionPlan {
    pub fn steps(&self) -> &[PlannedScript] {
        &self.steps
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.steps.iter().map(|s| s.name.as_str())
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.steps.iter().any(|s| s.name == name)
    }
}

/// Order the selected manifests.
///
/// `selected` must be in registration order. Dependencies on scripts outside
/// the selection do not create edges; the dependency validator deals with
/// them at run time.
///
/// # Errors
///
/// - [`DomainError::ConflictingScripts`] if two selected scripts conflict
/// - [`DomainError::PhaseInversion`] if a script depends on a later phase
/// - [`DomainError::DependencyCycle`] naming the scripts of one cycle
pub fn order_scripts(selected: &[&ScriptManifest]) -> Result<ExecutionPlan, DomainError> {
    let index: HashMap<&str, usize> = selected
        .iter()
        .enumerate()
        .map(|(i, m)| (m.name.as_str(), i))
        .collect();

    for (i, manifest) in selected.iter().enumerate() {
        for other in &manifest.conflicts {
            if let Some(&j) = index.get(other.as_str()) {
                let (first, second) = if i < j { (i, j) } else { (j, i) };
                return Err(DomainError::ConflictingScripts {
                    first: selected[first].name.clone(),
                    second: selected[second].name.clone(),
                });
            }
        }
    }

    // dependents[d] lists the scripts waiting on d.
    let mut dependents: Vec<Vec<usize>> = vec![Vec::new(); selected.len()];
    let mut in_degree: Vec<usize> = vec![0; selected.len()];

    for (i, manifest) in selected.iter().enumerate() {
        for dep in &manifest.requires.scripts {
            let Some(&d) = index.get(dep.as_str()) else {
                continue;
            };
            if selected[d].phase > manifest.phase {
                return Err(DomainError::PhaseInversion {
                    script: manifest.name.clone(),
                    phase: manifest.phase.value(),
                    dependency: dep.clone(),
                    dependency_phase: selected[d].phase.value(),
                });
            }
            dependents[d].push(i);
            in_degree[i] += 1;
        }
    }

    let mut ready: BTreeSet<(Phase, usize)> = in_degree
        .iter()
        .enumerate()
        .filter(|(_, deg)| **deg == 0)
        .map(|(i, _)| (selected[i].phase, i))
        .collect();

    let mut steps = Vec::with_capacity(selected.len());
    while let Some((phase, i)) = ready.pop_first() {
        steps.push(PlannedScript {
            name: selected[i].name.clone(),
            phase,
        });
        for &next in &dependents[i] {
            in_degree[next] -= 1;
            if in_degree[next] == 0 {
                ready.insert((selected[next].phase, next));
            }
        }
    }

    if steps.len() != selected.len() {
        return Err(DomainError::DependencyCycle {
            members: cycle_members(selected, &index, &in_degree),
        });
    }

    Ok(ExecutionPlan { steps })
}

/// Walk unresolved dependency edges until a script repeats.
///
/// Every script left with a non-zero in-degree still waits on another such
/// script, so the walk always closes a loop.
fn cycle_members(
    selected: &[&ScriptManifest],
    index: &HashMap<&str, usize>,
    in_degree: &[usize],
) -> Vec<String> {
    let Some(start) = in_degree.iter().position(|&d| d > 0) else {
        return Vec::new();
    };

    let mut path: Vec<usize> = vec![start];
    let mut current = start;
    loop {
        let next = selected[current]
            .requires
            .scripts
            .iter()
            .filter_map(|dep| index.get(dep.as_str()).copied())
            .find(|&d| in_degree[d] > 0);
        let Some(next) = next else {
            break;
        };
        if let Some(pos) = path.iter().position(|&p| p == next) {
            let mut members: Vec<String> = path[pos..]
                .iter()
                .map(|&p| selected[p].name.clone())
                .collect();
            members.push(selected[next].name.clone());
            return members;
        }
        path.push(next);
        current = next;
    }

    path.iter().map(|&p| selected[p].name.clone()).collect()
}
