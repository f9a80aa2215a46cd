//! Turns proposals into an ordered execution plan.

use crate::config::PlannerConfig;
use crate::error::Result;
use crate::executor::proposal::ExecutionProposal;
use crate::executor::strategy::ReplicaMovementStrategy;
use crate::executor::task::{ExecutionIdGenerator, ExecutionTask, TaskType};
use std::collections::BTreeSet;
use tracing::{debug, info};

/// Ordered tasks produced by one planning call.
#[derive(Debug, Clone, Default)]
pub struct ExecutionPlan {
    /// Replica movements, in the order they must run.
    pub replica_tasks: Vec<ExecutionTask>,
    /// Leadership changes, run after all replica movements.
    pub leader_tasks: Vec<ExecutionTask>,
    /// First id not used by this plan; seed for the next call. `None` once
    /// the plan has used the id space up to `u64::MAX`.
    pub next_execution_id: Option<u64>,
}

impl ExecutionPlan {
    /// Check if the plan has no work.
    pub fn is_empty(&self) -> bool {
        self.replica_tasks.is_empty() && self.leader_tasks.is_empty()
    }

    /// Total number of tasks.
    pub fn len(&self) -> usize {
        self.replica_tasks.len() + self.leader_tasks.len()
    }

    /// All tasks in execution order.
    pub fn tasks(&self) -> impl Iterator<Item = &ExecutionTask> {
        self.replica_tasks.iter().chain(self.leader_tasks.iter())
    }
}

/// Builds execution plans with a configured movement strategy.
#[derive(Debug, Clone)]
pub struct ExecutionTaskPlanner {
    config: PlannerConfig,
    strategy: ReplicaMovementStrategy,
}

impl ExecutionTaskPlanner {
    /// Create a planner, building the strategy chain from `config`.
    pub fn new(config: PlannerConfig) -> Result<Self> {
        let strategy = config.build_strategy()?;
        info!(strategy = %strategy, "Created execution task planner");
        Ok(Self { config, strategy })
    }

    /// Create with default config.
    pub fn with_defaults() -> Result<Self> {
        Self::new(PlannerConfig::default())
    }

    /// Get the configuration.
    pub fn config(&self) -> &PlannerConfig {
        &self.config
    }

    /// Get the movement strategy.
    pub fn strategy(&self) -> &ReplicaMovementStrategy {
        &self.strategy
    }

    /// Plan the given proposals.
    ///
    /// Proposals that change the replica set become replica tasks; proposals
    /// that only move leadership become leader tasks; proposals that change
    /// nothing are dropped. Every proposal is validated before any task is
    /// created.
    pub fn plan(
        &self,
        proposals: impl IntoIterator<Item = ExecutionProposal>,
        alert_time_ms: u64,
    ) -> Result<ExecutionPlan> {
        let proposals: Vec<ExecutionProposal> = proposals.into_iter().collect();
        for proposal in &proposals {
            proposal.validate()?;
        }

        let mut replica_tasks = BTreeSet::new();
        let mut leader_proposals = Vec::new();
        for (idx, proposal) in proposals.into_iter().enumerate() {
            if proposal.has_replica_action() {
                replica_tasks.insert(ExecutionTask::new(
                    idx as u64,
                    proposal,
                    TaskType::InterBrokerReplicaAction,
                    alert_time_ms,
                ));
            } else if proposal.has_leader_action() {
                leader_proposals.push(proposal);
            } else {
                debug!(partition = %proposal.partition(), "Skipping no-op proposal");
            }
        }

        let ordered = self.strategy.apply(&replica_tasks)?;
        let first = self.config.first_execution_id;
        ExecutionIdGenerator::reserve(first, ordered.len() + leader_proposals.len())?;

        // A terminal strategy already numbers its output from
        // `first_execution_id`; only comparator orders are renumbered.
        let (replica_tasks, mut ids) = if self.strategy.is_terminal() {
            let ids = match ordered.last() {
                Some(last) => ExecutionIdGenerator::after(last.execution_id()),
                None => ExecutionIdGenerator::new(first),
            };
            (ordered, ids)
        } else {
            let mut ids = ExecutionIdGenerator::new(first);
            let renumbered = ordered
                .iter()
                .map(|task| -> Result<ExecutionTask> {
                    Ok(task.derive(ids.take()?, task.proposal().clone()))
                })
                .collect::<Result<Vec<_>>>()?;
            (renumbered, ids)
        };
        let leader_tasks = leader_proposals
            .into_iter()
            .map(|proposal| -> Result<ExecutionTask> {
                Ok(ExecutionTask::new(
                    ids.take()?,
                    proposal,
                    TaskType::LeaderAction,
                    alert_time_ms,
                ))
            })
            .collect::<Result<Vec<_>>>()?;

        info!(
            strategy = %self.strategy,
            replica_tasks = replica_tasks.len(),
            leader_tasks = leader_tasks.len(),
            next_execution_id = ?ids.peek(),
            "Planned execution tasks"
        );

        Ok(ExecutionPlan {
            replica_tasks,
            leader_tasks,
            next_execution_id: ids.peek(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::executor::strategy::StrategyKind;
    use crate::types::{replica_set, NodeId, ReplicaPlacement, TopicPartition};
    use test_log::test;

    fn proposal(partition: u32, size: u64, old: &[NodeId], new: &[NodeId]) -> ExecutionProposal {
        ExecutionProposal::new(
            TopicPartition::new("foobar", partition),
            size,
            ReplicaPlacement::new(old[0]),
            replica_set(old.iter().copied()),
            replica_set(new.iter().copied()),
        )
        .unwrap()
    }

    fn ids(tasks: &[ExecutionTask]) -> Vec<u64> {
        tasks.iter().map(ExecutionTask::execution_id).collect()
    }

    #[test]
    fn test_plan_expands_and_splits_leader_tasks() {
        let planner = ExecutionTaskPlanner::new(
            PlannerConfig::default().with_first_execution_id(100),
        )
        .unwrap();
        let plan = planner
            .plan(
                vec![
                    proposal(0, 20, &[1, 2, 3], &[4, 5, 6]),
                    proposal(1, 20, &[1, 2, 3], &[2, 1, 3]),
                    proposal(2, 20, &[1, 2], &[1, 2]),
                    proposal(3, 20, &[1], &[1, 2]),
                ],
                1000,
            )
            .unwrap();

        assert_eq!(ids(&plan.replica_tasks), vec![100, 101, 102, 103]);
        assert_eq!(ids(&plan.leader_tasks), vec![104]);
        assert_eq!(plan.next_execution_id, Some(105));
        assert_eq!(plan.len(), 5);
        assert!(!plan.is_empty());

        let partitions: Vec<u32> = plan
            .replica_tasks
            .iter()
            .map(|t| t.proposal().partition().partition)
            .collect();
        assert_eq!(partitions, vec![0, 0, 0, 3]);
        assert_eq!(plan.leader_tasks[0].task_type(), TaskType::LeaderAction);
        assert!(plan.tasks().all(|t| t.alert_time_ms() == 1000));
    }

    #[test]
    fn test_plan_with_size_strategy_renumbers_in_order() {
        let config = PlannerConfig::new()
            .with_strategies(vec![StrategyKind::PrioritizeSmallReplicas])
            .with_first_execution_id(1);
        let planner = ExecutionTaskPlanner::new(config).unwrap();
        let plan = planner
            .plan(
                vec![
                    proposal(0, 300, &[1, 2], &[1, 3]),
                    proposal(1, 100, &[1, 2], &[1, 4]),
                    proposal(2, 200, &[1, 2], &[1, 5]),
                ],
                0,
            )
            .unwrap();

        let sizes: Vec<u64> = plan
            .replica_tasks
            .iter()
            .map(|t| t.proposal().partition_size())
            .collect();
        assert_eq!(sizes, vec![100, 200, 300]);
        assert_eq!(ids(&plan.replica_tasks), vec![1, 2, 3]);
        assert_eq!(plan.next_execution_id, Some(4));
    }

    #[test]
    fn test_plan_rejects_invalid_proposal() {
        let bad = ExecutionProposal::new_unchecked(
            TopicPartition::new("foobar", 1),
            20,
            ReplicaPlacement::new(1),
            replica_set([1]),
            Vec::new(),
        );
        let planner = ExecutionTaskPlanner::with_defaults().unwrap();
        let err = planner
            .plan(vec![proposal(0, 20, &[1], &[1, 2, 3]), bad], 0)
            .unwrap_err();
        assert!(matches!(err, Error::InvalidProposal { .. }));
    }

    #[test]
    fn test_planner_rejects_bad_config() {
        let config = PlannerConfig::new()
            .with_strategies(vec![StrategyKind::SingleReplica, StrategyKind::Base]);
        assert!(matches!(
            ExecutionTaskPlanner::new(config),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn test_single_replica_ids_are_kept() {
        let config = PlannerConfig::new()
            .with_strategies(vec![StrategyKind::SingleReplica])
            .with_first_execution_id(7);
        let planner = ExecutionTaskPlanner::new(config).unwrap();
        let plan = planner
            .plan(
                vec![
                    proposal(0, 20, &[1], &[1, 2, 3]),
                    proposal(1, 20, &[1, 2], &[2, 1]),
                ],
                0,
            )
            .unwrap();

        assert_eq!(ids(&plan.replica_tasks), vec![7, 8]);
        assert_eq!(ids(&plan.leader_tasks), vec![9]);
        assert_eq!(plan.next_execution_id, Some(10));
    }

    #[test]
    fn test_plan_up_to_max_id() {
        let planner = ExecutionTaskPlanner::new(
            PlannerConfig::default().with_first_execution_id(u64::MAX - 1),
        )
        .unwrap();
        let plan = planner
            .plan(vec![proposal(0, 20, &[1], &[1, 2, 3])], 0)
            .unwrap();
        assert_eq!(ids(&plan.replica_tasks), vec![u64::MAX - 1, u64::MAX]);
        assert_eq!(plan.next_execution_id, None);
    }

    #[test]
    fn test_plan_fails_when_ids_run_out() {
        for strategies in [vec![StrategyKind::SingleReplica], vec![StrategyKind::Base]] {
            let config = PlannerConfig::new()
                .with_strategies(strategies)
                .with_first_execution_id(u64::MAX);
            let planner = ExecutionTaskPlanner::new(config).unwrap();
            let err = planner
                .plan(
                    vec![
                        proposal(0, 20, &[1, 2], &[1, 3]),
                        proposal(1, 20, &[1, 2], &[2, 1]),
                    ],
                    0,
                )
                .unwrap_err();
            assert_eq!(
                err,
                Error::ExecutionIdsExhausted {
                    first: u64::MAX,
                    needed: 2
                }
            );
        }
    }

    #[test]
    fn test_empty_plan() {
        let planner = ExecutionTaskPlanner::with_defaults().unwrap();
        let plan = planner.plan(Vec::new(), 0).unwrap();
        assert!(plan.is_empty());
        assert_eq!(plan.next_execution_id, Some(0));
    }
}
