//! Replica movement strategies decide the order in which tasks execute.
//!
//! Comparator strategies can be chained: each member breaks ties left by the
//! previous one, and the execution id ordering always closes the chain so the
//! result is total. The single-replica strategy is terminal: it rewrites the
//! tasks themselves and its order is authoritative, so it neither accepts a
//! follower nor joins a chain.

mod single_replica;

pub use single_replica::{expand_execution_tasks, SingleReplicaMovementStrategy};

use crate::error::{Error, Result};
use crate::executor::task::ExecutionTask;
use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

/// Names accepted in configuration for building strategies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StrategyKind {
    /// Execution id order.
    Base,
    /// Smallest partitions first.
    PrioritizeSmallReplicas,
    /// Largest partitions first.
    PrioritizeLargeReplicas,
    /// Single-replica expansion.
    SingleReplica,
}

impl StrategyKind {
    /// Configuration name of this kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            StrategyKind::Base => "base",
            StrategyKind::PrioritizeSmallReplicas => "prioritize-small-replicas",
            StrategyKind::PrioritizeLargeReplicas => "prioritize-large-replicas",
            StrategyKind::SingleReplica => "single-replica",
        }
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StrategyKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "base" => Ok(StrategyKind::Base),
            "prioritize-small-replicas" => Ok(StrategyKind::PrioritizeSmallReplicas),
            "prioritize-large-replicas" => Ok(StrategyKind::PrioritizeLargeReplicas),
            "single-replica" => Ok(StrategyKind::SingleReplica),
            other => Err(Error::Config(format!(
                "unknown replica movement strategy: {other:?}"
            ))),
        }
    }
}

/// Policy producing the order in which replica tasks are applied.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ReplicaMovementStrategy {
    /// Ascending execution id.
    #[default]
    Base,
    /// Ascending partition size.
    PrioritizeSmallReplicas,
    /// Descending partition size.
    PrioritizeLargeReplicas,
    /// Members applied in turn as tie-breakers, closed by execution id.
    Chained(Vec<ReplicaMovementStrategy>),
    /// Terminal single-replica expansion.
    SingleReplica(SingleReplicaMovementStrategy),
}

impl ReplicaMovementStrategy {
    /// Build the strategy for a configuration name.
    pub fn from_kind(kind: StrategyKind, first_execution_id: u64) -> Self {
        match kind {
            StrategyKind::Base => ReplicaMovementStrategy::Base,
            StrategyKind::PrioritizeSmallReplicas => {
                ReplicaMovementStrategy::PrioritizeSmallReplicas
            }
            StrategyKind::PrioritizeLargeReplicas => {
                ReplicaMovementStrategy::PrioritizeLargeReplicas
            }
            StrategyKind::SingleReplica => ReplicaMovementStrategy::SingleReplica(
                SingleReplicaMovementStrategy::new().with_first_execution_id(first_execution_id),
            ),
        }
    }

    /// Human readable name; chains join member names with `,`.
    pub fn name(&self) -> String {
        match self {
            ReplicaMovementStrategy::Base => StrategyKind::Base.to_string(),
            ReplicaMovementStrategy::PrioritizeSmallReplicas => {
                StrategyKind::PrioritizeSmallReplicas.to_string()
            }
            ReplicaMovementStrategy::PrioritizeLargeReplicas => {
                StrategyKind::PrioritizeLargeReplicas.to_string()
            }
            ReplicaMovementStrategy::Chained(members) => members
                .iter()
                .map(ReplicaMovementStrategy::name)
                .collect::<Vec<_>>()
                .join(","),
            ReplicaMovementStrategy::SingleReplica(_) => StrategyKind::SingleReplica.to_string(),
        }
    }

    /// Whether this strategy must be the only one in effect.
    pub fn is_terminal(&self) -> bool {
        matches!(self, ReplicaMovementStrategy::SingleReplica(_))
    }

    /// Append `next` as a tie-breaker after this strategy.
    ///
    /// Fails with [`Error::IllegalChaining`] when either side is terminal.
    pub fn chain(self, next: ReplicaMovementStrategy) -> Result<Self> {
        if self.is_terminal() {
            return Err(Error::IllegalChaining {
                strategy: self.name(),
            });
        }
        if next.is_terminal() {
            return Err(Error::IllegalChaining {
                strategy: next.name(),
            });
        }

        let mut members = match self {
            ReplicaMovementStrategy::Chained(members) => members,
            other => vec![other],
        };
        match next {
            ReplicaMovementStrategy::Chained(more) => members.extend(more),
            other => members.push(other),
        }
        Ok(ReplicaMovementStrategy::Chained(members))
    }

    /// First terminal strategy nested anywhere inside a chain.
    fn chained_terminal(&self) -> Option<&ReplicaMovementStrategy> {
        match self {
            ReplicaMovementStrategy::Chained(members) => members
                .iter()
                .find_map(|m| if m.is_terminal() { Some(m) } else { m.chained_terminal() }),
            _ => None,
        }
    }

    /// Produce the ordered tasks the executor should apply.
    ///
    /// A chain built by hand that contains a terminal strategy fails with
    /// [`Error::IllegalChaining`], same as [`ReplicaMovementStrategy::chain`].
    pub fn apply(&self, tasks: &BTreeSet<ExecutionTask>) -> Result<Vec<ExecutionTask>> {
        if let ReplicaMovementStrategy::SingleReplica(strategy) = self {
            return strategy.apply(tasks);
        }
        if let Some(terminal) = self.chained_terminal() {
            return Err(Error::IllegalChaining {
                strategy: terminal.name(),
            });
        }
        for task in tasks {
            task.proposal().validate()?;
        }
        let mut ordered: Vec<ExecutionTask> = tasks.iter().cloned().collect();
        ordered.sort_by(|a, b| self.compare(a, b).then_with(|| a.cmp(b)));
        Ok(ordered)
    }

    /// Compare two tasks; `Equal` means this strategy has no preference.
    fn compare(&self, a: &ExecutionTask, b: &ExecutionTask) -> Ordering {
        let size = |t: &ExecutionTask| t.proposal().partition_size();
        match self {
            ReplicaMovementStrategy::Base => a.cmp(b),
            ReplicaMovementStrategy::PrioritizeSmallReplicas => size(a).cmp(&size(b)),
            ReplicaMovementStrategy::PrioritizeLargeReplicas => size(b).cmp(&size(a)),
            ReplicaMovementStrategy::Chained(members) => members
                .iter()
                .map(|m| m.compare(a, b))
                .find(|o| o.is_ne())
                .unwrap_or(Ordering::Equal),
            ReplicaMovementStrategy::SingleReplica(_) => Ordering::Equal,
        }
    }
}

impl fmt::Display for ReplicaMovementStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name())
    }
}
