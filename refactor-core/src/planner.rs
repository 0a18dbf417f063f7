//! Batch rename planner.
//!
//! Orders a set of renames so that running the resulting steps strictly in
//! sequence never lets one rename pick up another's freshly written names.
//!
//! Mapping `i` depends on mapping `j` when `new_i == old_j`: `j` must run
//! first, otherwise the occurrences `i` just produced would be swept into
//! `j`'s rename. Each mapping has at most one dependency (the first match in
//! input order), so the dependency graph is a set of chains that either end
//! or close into a cycle. Cycles are broken with two passes through unique
//! temporary names.

use crate::capture::is_valid_identifier;
use crate::error::{RefactorError, Result};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::{HashMap, HashSet};
use std::fmt;

pub const TEMP_PREFIX: &str = "__refactor_tmp_";

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RenameMapping {
    pub old: String,
    pub new: String,
}

impl RenameMapping {
    pub fn new(old: impl Into<String>, new: impl Into<String>) -> Self {
        Self {
            old: old.into(),
            new: new.into(),
        }
    }
}

impl fmt::Display for RenameMapping {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.old, self.new)
    }
}

/// One atomic rename the orchestrator runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionStep {
    pub old: String,
    pub new: String,
    pub origin_mapping_index: usize,
    /// Part of a cycle resolved through a temporary name.
    pub is_temp: bool,
}

/// A mapping whose new name is the old name of more than one other mapping.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AmbiguousDependency {
    pub mapping: usize,
    pub candidates: Vec<usize>,
    pub chosen: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchPlan {
    pub steps: Vec<ExecutionStep>,
    pub depends_on: Vec<Option<usize>>,
    /// Cycle groups, members in cycle order starting from the lowest index.
    pub cycles: Vec<Vec<usize>>,
    pub ambiguities: Vec<AmbiguousDependency>,
}

impl BatchPlan {
    /// Number of mappings resolved through temporary names.
    pub fn circular_renames(&self) -> usize {
        self.cycles.iter().map(Vec::len).sum()
    }

    pub fn cycle_of(&self, mapping: usize) -> Option<usize> {
        self.cycles.iter().position(|c| c.contains(&mapping))
    }

    pub fn temp_names(&self) -> Vec<&str> {
        self.steps
            .iter()
            .filter(|s| s.is_temp && s.new.starts_with(TEMP_PREFIX))
            .map(|s| s.new.as_str())
            .collect()
    }
}

pub fn validate_mappings(mappings: &[RenameMapping]) -> Result<()> {
    if mappings.is_empty() {
        return Err(RefactorError::invalid("mapping set is empty"));
    }
    for (index, mapping) in mappings.iter().enumerate() {
        for name in [&mapping.old, &mapping.new] {
            if !is_valid_identifier(name) {
                return Err(RefactorError::invalid(format!(
                    "mapping {} ({}): '{}' is not a valid identifier",
                    index + 1,
                    mapping,
                    name
                )));
            }
        }
        if mapping.old == mapping.new {
            return Err(RefactorError::invalid(format!(
                "mapping {} renames '{}' to itself",
                index + 1,
                mapping.old
            )));
        }
    }
    Ok(())
}

/// For each mapping, the first other mapping whose old name is its new name.
fn detect_dependencies(
    mappings: &[RenameMapping],
) -> (Vec<Option<usize>>, Vec<AmbiguousDependency>) {
    let mut by_old: HashMap<&str, Vec<usize>> = HashMap::new();
    for (index, mapping) in mappings.iter().enumerate() {
        by_old.entry(mapping.old.as_str()).or_default().push(index);
    }

    let mut depends_on = Vec::with_capacity(mappings.len());
    let mut ambiguities = Vec::new();
    for (index, mapping) in mappings.iter().enumerate() {
        let candidates: Vec<usize> = by_old
            .get(mapping.new.as_str())
            .map(|found| found.iter().copied().filter(|&j| j != index).collect())
            .unwrap_or_default();

        let chosen = candidates.first().copied();
        if let Some(chosen) = chosen {
            if candidates.len() > 1 {
                ambiguities.push(AmbiguousDependency {
                    mapping: index,
                    candidates,
                    chosen,
                });
            }
        }
        depends_on.push(chosen);
    }
    (depends_on, ambiguities)
}

/// Walk dependency chains and collect every closed loop.
fn detect_cycles(depends_on: &[Option<usize>]) -> Vec<Vec<usize>> {
    let mut visited = vec![false; depends_on.len()];
    let mut cycles = Vec::new();

    for start in 0..depends_on.len() {
        if visited[start] {
            continue;
        }

        let mut path = Vec::new();
        let mut position: HashMap<usize, usize> = HashMap::new();
        let mut node = Some(start);

        while let Some(current) = node {
            if let Some(&at) = position.get(&current) {
                let mut cycle = path[at..].to_vec();
                let lowest = (0..cycle.len()).min_by_key(|&k| cycle[k]).unwrap_or(0);
                cycle.rotate_left(lowest);
                cycles.push(cycle);
                break;
            }
            if visited[current] {
                break;
            }
            visited[current] = true;
            position.insert(current, path.len());
            path.push(current);
            node = depends_on[current];
        }
    }

    cycles.sort_by_key(|c| c[0]);
    cycles
}

/// Hex SHA-256 of the mapping set, order sensitive.
pub fn mapping_set_hash(mappings: &[RenameMapping]) -> String {
    let mut hasher = Sha256::new();
    for mapping in mappings {
        hasher.update(mapping.old.as_bytes());
        hasher.update([0u8]);
        hasher.update(mapping.new.as_bytes());
        hasher.update(b"\n");
    }
    format!("{:x}", hasher.finalize())
}

fn temp_seed(mappings: &[RenameMapping]) -> String {
    mapping_set_hash(mappings)[..8].to_string()
}

struct TempNames<'a> {
    seed: String,
    reserved: HashSet<String>,
    is_taken: &'a dyn Fn(&str) -> bool,
}

impl TempNames<'_> {
    fn allocate(&mut self, mapping: usize) -> String {
        let base = format!("{}{}_{}", TEMP_PREFIX, self.seed, mapping);
        let mut candidate = base.clone();
        let mut suffix = 1;
        while self.reserved.contains(&candidate) || (self.is_taken)(&candidate) {
            candidate = format!("{}_{}", base, suffix);
            suffix += 1;
        }
        self.reserved.insert(candidate.clone());
        candidate
    }
}

/// Plan a batch, with no knowledge of which names the project already uses.
pub fn plan_batch(mappings: &[RenameMapping]) -> Result<BatchPlan> {
    plan_batch_with(mappings, &|_| false)
}

/// Plan a batch. `is_taken` reports names already present in the project so
/// temporary names never collide with them.
pub fn plan_batch_with(
    mappings: &[RenameMapping],
    is_taken: &dyn Fn(&str) -> bool,
) -> Result<BatchPlan> {
    validate_mappings(mappings)?;

    let (depends_on, ambiguities) = detect_dependencies(mappings);
    let cycles = detect_cycles(&depends_on);

    let mut cycle_of = vec![None; mappings.len()];
    for (id, cycle) in cycles.iter().enumerate() {
        for &member in cycle {
            cycle_of[member] = Some(id);
        }
    }

    let mut temps = TempNames {
        seed: temp_seed(mappings),
        reserved: mappings
            .iter()
            .flat_map(|m| [m.old.clone(), m.new.clone()])
            .collect(),
        is_taken,
    };

    let mut steps = Vec::new();
    let mut emitted = vec![false; mappings.len()];
    let mut cycle_emitted = vec![false; cycles.len()];

    for start in 0..mappings.len() {
        // Collect the chain of unemitted prerequisites, then emit it back to front
        let mut chain = Vec::new();
        let mut node = Some(start);
        while let Some(current) = node {
            if emitted[current] {
                break;
            }
            if let Some(id) = cycle_of[current] {
                if !cycle_emitted[id] {
                    chain.push(Pending::Cycle(id));
                }
                break;
            }
            chain.push(Pending::Mapping(current));
            node = depends_on[current];
        }

        for pending in chain.into_iter().rev() {
            match pending {
                Pending::Mapping(index) => {
                    let mapping = &mappings[index];
                    steps.push(ExecutionStep {
                        old: mapping.old.clone(),
                        new: mapping.new.clone(),
                        origin_mapping_index: index,
                        is_temp: false,
                    });
                    emitted[index] = true;
                },
                Pending::Cycle(id) => {
                    let members = &cycles[id];
                    let names: Vec<String> =
                        members.iter().map(|&m| temps.allocate(m)).collect();

                    for (&member, temp) in members.iter().zip(&names) {
                        steps.push(ExecutionStep {
                            old: mappings[member].old.clone(),
                            new: temp.clone(),
                            origin_mapping_index: member,
                            is_temp: true,
                        });
                    }
                    for (&member, temp) in members.iter().zip(&names) {
                        steps.push(ExecutionStep {
                            old: temp.clone(),
                            new: mappings[member].new.clone(),
                            origin_mapping_index: member,
                            is_temp: true,
                        });
                        emitted[member] = true;
                    }
                    cycle_emitted[id] = true;
                },
            }
        }
    }

    Ok(BatchPlan {
        steps,
        depends_on,
        cycles,
        ambiguities,
    })
}

enum Pending {
    Mapping(usize),
    Cycle(usize),
}
