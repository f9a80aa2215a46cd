//! Replica reassignment planner.
//!
//! This crate turns proposed partition replica-set changes into a strictly
//! ordered list of execution tasks that an executor can apply one at a time:
//! - **Proposals** describe one partition's move from an old to a new replica list
//! - **Tasks** wrap proposals with an execution id and scheduling metadata
//! - **Strategies** order tasks; the single-replica strategy also expands
//!   multi-replica moves into single-replica steps
//!
//! # Features
//!
//! - At most one replica added and one removed per step
//! - The new leader is kept at the front of every replica list once it is added
//! - Gap-free execution ids seeded by the caller, no global state
//! - All proposals validated before anything is emitted
//!
//! # Example
//!
//! ```rust
//! use replica_planner::executor::{
//!     expand_execution_tasks, ExecutionProposal, ExecutionTask, TaskType,
//! };
//! use replica_planner::types::{replica_set, ReplicaPlacement, TopicPartition};
//! use std::collections::BTreeSet;
//!
//! let proposal = ExecutionProposal::new(
//!     TopicPartition::new("orders", 0),
//!     1024,
//!     ReplicaPlacement::new(1),
//!     replica_set([1]),
//!     replica_set([1, 2, 3]),
//! )?;
//! let tasks: BTreeSet<_> =
//!     [ExecutionTask::new(0, proposal, TaskType::InterBrokerReplicaAction, 0)]
//!         .into_iter()
//!         .collect();
//!
//! let steps = expand_execution_tasks(&tasks, 10)?;
//! assert_eq!(steps.len(), 2);
//! assert_eq!(steps[0].execution_id(), 10);
//! assert_eq!(steps[1].proposal().new_replicas(), &replica_set([1, 2, 3])[..]);
//! # Ok::<(), replica_planner::Error>(())
//! ```
//!
//! # Execution Contract
//!
//! Each step assumes the replica list produced by the previous step of the
//! same partition. Tasks must be applied in ascending execution id, waiting
//! for each to complete before issuing the next.

pub mod config;
pub mod error;
pub mod executor;
pub mod types;

// Re-export main types for convenience
pub use config::PlannerConfig;
pub use error::{Error, ProposalError, Result};
pub use executor::{
    expand_execution_tasks, ExecutionPlan, ExecutionProposal, ExecutionTask,
    ExecutionTaskPlanner, ReplicaMovementStrategy, SingleReplicaMovementStrategy, StrategyKind,
    TaskType,
};
pub use types::{NodeId, ReplicaPlacement, TopicPartition};
