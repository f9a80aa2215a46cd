//! Execution tasks wrap a proposal with an identity and scheduling metadata.

use super::proposal::ExecutionProposal;
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// Kind of action a task performs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TaskType {
    /// Moving replicas between nodes.
    InterBrokerReplicaAction,
    /// Moving replicas between disks of the same node.
    IntraBrokerReplicaAction,
    /// Changing leadership without moving data.
    LeaderAction,
}

impl fmt::Display for TaskType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TaskType::InterBrokerReplicaAction => write!(f, "inter_broker_replica_action"),
            TaskType::IntraBrokerReplicaAction => write!(f, "intra_broker_replica_action"),
            TaskType::LeaderAction => write!(f, "leader_action"),
        }
    }
}

/// One schedulable unit of work.
///
/// Tasks are identified, compared and ordered by `execution_id` alone.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionTask {
    execution_id: u64,
    proposal: ExecutionProposal,
    task_type: TaskType,
    alert_time_ms: u64,
}

impl ExecutionTask {
    /// Create a new task.
    pub fn new(
        execution_id: u64,
        proposal: ExecutionProposal,
        task_type: TaskType,
        alert_time_ms: u64,
    ) -> Self {
        Self {
            execution_id,
            proposal,
            task_type,
            alert_time_ms,
        }
    }

    /// Replace the proposal and identity, keeping type and alert time.
    pub(crate) fn derive(&self, execution_id: u64, proposal: ExecutionProposal) -> Self {
        Self {
            execution_id,
            proposal,
            task_type: self.task_type,
            alert_time_ms: self.alert_time_ms,
        }
    }

    /// Position of this task in the execution order.
    pub fn execution_id(&self) -> u64 {
        self.execution_id
    }

    /// The proposal this task enacts.
    pub fn proposal(&self) -> &ExecutionProposal {
        &self.proposal
    }

    /// Kind of action.
    pub fn task_type(&self) -> TaskType {
        self.task_type
    }

    /// Timestamp after which the executor should alert on a slow task.
    pub fn alert_time_ms(&self) -> u64 {
        self.alert_time_ms
    }
}

impl PartialEq for ExecutionTask {
    fn eq(&self, other: &Self) -> bool {
        self.execution_id == other.execution_id
    }
}

impl Eq for ExecutionTask {}

impl PartialOrd for ExecutionTask {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ExecutionTask {
    fn cmp(&self, other: &Self) -> Ordering {
        self.execution_id.cmp(&other.execution_id)
    }
}

impl fmt::Display for ExecutionTask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{{EXE_ID: {}, {}, {}}}",
            self.execution_id, self.task_type, self.proposal
        )
    }
}

/// Hands out execution ids for a single planning call.
///
/// Seeded by the caller so ids stay unique across calls without any
/// process-wide counter. Once `u64::MAX` has been handed out the generator
/// is exhausted.
#[derive(Debug, Clone)]
pub struct ExecutionIdGenerator {
    first: u64,
    next: Option<u64>,
    issued: usize,
}

impl ExecutionIdGenerator {
    /// Start handing out ids from `first`.
    pub fn new(first: u64) -> Self {
        Self {
            first,
            next: Some(first),
            issued: 0,
        }
    }

    /// Continue after an id that was already handed out.
    pub fn after(last: u64) -> Self {
        Self {
            first: last,
            next: last.checked_add(1),
            issued: 0,
        }
    }

    /// Take the next id, or `None` when the id space is used up.
    pub fn next_id(&mut self) -> Option<u64> {
        let id = self.next?;
        self.next = id.checked_add(1);
        self.issued += 1;
        Some(id)
    }

    /// Take the next id, failing once the id space is used up.
    pub fn take(&mut self) -> Result<u64> {
        self.next_id().ok_or(Error::ExecutionIdsExhausted {
            first: self.first,
            needed: self.issued + 1,
        })
    }

    /// The id the next call to `next_id` will return.
    pub fn peek(&self) -> Option<u64> {
        self.next
    }

    /// Check that `count` more ids are available starting at `first`.
    pub fn reserve(first: u64, count: usize) -> Result<()> {
        let fits = match (count as u64).checked_sub(1) {
            None => true,
            Some(last_offset) => first.checked_add(last_offset).is_some(),
        };
        if fits {
            Ok(())
        } else {
            Err(Error::ExecutionIdsExhausted {
                first,
                needed: count,
            })
        }
    }
}
