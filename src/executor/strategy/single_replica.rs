//! Expansion of multi-replica reassignments into single-replica steps.
//!
//! A proposal that adds several replicas at once is rewritten as a chain of
//! proposals that each add at most one replica and remove at most one, so the
//! replica count never swings by more than one node while data is copied.
//! Every step's `old_replicas` is the previous step's `new_replicas`; the
//! executor must therefore run the steps in `execution_id` order, waiting for
//! each one to finish.
//!
//! ```text
//! {1,2,3} -> {4,5,6}, new leader 4
//!
//!   step 0: [1,2,3] -> [4,3,2]   remove 1, add 4 (leader moved to front)
//!   step 1: [4,3,2] -> [4,3,5]   remove 2, add 5
//!   step 2: [4,3,5] -> [4,5,6]   remove 3, add 6
//! ```

use crate::error::Result;
use crate::executor::proposal::ExecutionProposal;
use crate::executor::task::{ExecutionIdGenerator, ExecutionTask, TaskType};
use crate::types::ReplicaPlacement;
use std::collections::BTreeSet;
use tracing::debug;

/// Terminal strategy that expands every reassignment into single-replica steps.
///
/// Its output order is the safety-relevant order, so it cannot be chained
/// with other strategies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SingleReplicaMovementStrategy {
    first_execution_id: u64,
}

impl SingleReplicaMovementStrategy {
    /// Create a strategy whose output ids start at 0.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the first execution id handed out by `apply`.
    pub fn with_first_execution_id(mut self, first_execution_id: u64) -> Self {
        self.first_execution_id = first_execution_id;
        self
    }

    /// The first execution id handed out by `apply`.
    pub fn first_execution_id(&self) -> u64 {
        self.first_execution_id
    }

    /// Expand and order the given tasks.
    pub fn apply(&self, tasks: &BTreeSet<ExecutionTask>) -> Result<Vec<ExecutionTask>> {
        expand_execution_tasks(tasks, self.first_execution_id)
    }
}

/// Expand `tasks` into single-replica steps with fresh, gap-free execution
/// ids starting at `first_execution_id`.
///
/// Tasks are processed in ascending execution id; the steps of one task are
/// contiguous in the output. All proposals are validated before anything is
/// emitted.
pub fn expand_execution_tasks(
    tasks: &BTreeSet<ExecutionTask>,
    first_execution_id: u64,
) -> Result<Vec<ExecutionTask>> {
    for task in tasks {
        task.proposal().validate()?;
    }
    let needed: usize = tasks.iter().map(step_count).sum();
    ExecutionIdGenerator::reserve(first_execution_id, needed)?;

    let mut ids = ExecutionIdGenerator::new(first_execution_id);
    let mut expanded = Vec::with_capacity(needed);
    for task in tasks {
        expand_task(task, &mut ids, &mut expanded)?;
    }

    debug!(
        input_tasks = tasks.len(),
        output_tasks = expanded.len(),
        next_execution_id = ?ids.peek(),
        "Expanded execution tasks"
    );
    Ok(expanded)
}

/// Number of tasks `expand_task` emits for `task`.
pub(crate) fn step_count(task: &ExecutionTask) -> usize {
    if task.task_type() != TaskType::InterBrokerReplicaAction {
        return 1;
    }
    let adds = task.proposal().replicas_to_add().len();
    let removes = task.proposal().replicas_to_remove().len();
    match adds {
        0 | 1 => 1,
        _ if removes > adds => adds + 1,
        _ => adds,
    }
}

fn expand_task(
    task: &ExecutionTask,
    ids: &mut ExecutionIdGenerator,
    out: &mut Vec<ExecutionTask>,
) -> Result<()> {
    let proposal = task.proposal();
    if task.task_type() != TaskType::InterBrokerReplicaAction {
        out.push(task.derive(ids.take()?, proposal.clone()));
        return Ok(());
    }

    let new_leader = proposal.new_leader();
    let to_add = leader_first(proposal.replicas_to_add(), new_leader);
    if to_add.len() <= 1 {
        out.push(task.derive(ids.take()?, proposal.clone()));
        return Ok(());
    }
    let to_remove = leader_first(proposal.replicas_to_remove(), proposal.old_leader());

    let first_step = out.len();
    let mut current = proposal.old_replicas().to_vec();
    for (i, added) in to_add.iter().enumerate() {
        let before = current.clone();
        if let Some(removed) = to_remove.get(i) {
            current.retain(|r| r != removed);
        }
        current.push(*added);
        if *added == new_leader {
            let last = current.len() - 1;
            current.swap(0, last);
        }
        out.push(emit_step(task, proposal, before, &current, ids)?);
    }

    // Leadership is settled during the add phase; the rest is one removal step.
    if to_remove.len() > to_add.len() {
        let before = current.clone();
        let remaining = &to_remove[to_add.len()..];
        current.retain(|r| !remaining.contains(r));
        out.push(emit_step(task, proposal, before, &current, ids)?);
    }

    debug!(
        partition = %proposal.partition(),
        steps = out.len() - first_step,
        to_add = to_add.len(),
        to_remove = to_remove.len(),
        "Expanded reassignment into single-replica steps"
    );
    Ok(())
}

fn emit_step(
    task: &ExecutionTask,
    proposal: &ExecutionProposal,
    before: Vec<ReplicaPlacement>,
    after: &[ReplicaPlacement],
    ids: &mut ExecutionIdGenerator,
) -> Result<ExecutionTask> {
    Ok(task.derive(ids.take()?, proposal.step(before, after.to_vec())))
}

/// Sort so `leader` (if present) comes first, the rest by ascending node id.
fn leader_first(
    mut replicas: Vec<ReplicaPlacement>,
    leader: ReplicaPlacement,
) -> Vec<ReplicaPlacement> {
    replicas.sort_by_key(|r| (*r != leader, r.node_id()));
    replicas
}
