//! Execution planning for partition replica reassignments.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                   ExecutionTaskPlanner                       │
//! │  ┌──────────────────────────────────────────────────────┐  │
//! │  │  ExecutionProposal  (old replicas -> new replicas)    │  │
//! │  └──────────────────────────────────────────────────────┘  │
//! │                          ↓                                   │
//! │  ┌──────────────────────────────────────────────────────┐  │
//! │  │  ExecutionTask      (execution id, type, alert time)  │  │
//! │  └──────────────────────────────────────────────────────┘  │
//! │                          ↓                                   │
//! │  ┌──────────────────────────────────────────────────────┐  │
//! │  │  ReplicaMovementStrategy                              │  │
//! │  │  - base / size ordering, chainable                    │  │
//! │  │  - single-replica expansion (terminal)                │  │
//! │  └──────────────────────────────────────────────────────┘  │
//! │                          ↓                                   │
//! │                    ExecutionPlan                             │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```rust
//! use replica_planner::executor::{ExecutionProposal, ExecutionTaskPlanner};
//! use replica_planner::types::{replica_set, ReplicaPlacement, TopicPartition};
//!
//! let proposal = ExecutionProposal::new(
//!     TopicPartition::new("orders", 0),
//!     1024,
//!     ReplicaPlacement::new(1),
//!     replica_set([1, 2, 3]),
//!     replica_set([4, 5, 6]),
//! )?;
//!
//! let planner = ExecutionTaskPlanner::with_defaults()?;
//! let plan = planner.plan(vec![proposal], 0)?;
//!
//! // One replica moves per step.
//! assert_eq!(plan.replica_tasks.len(), 3);
//! # Ok::<(), replica_planner::Error>(())
//! ```

mod planner;
mod proposal;
pub mod strategy;
mod task;

pub use planner::{ExecutionPlan, ExecutionTaskPlanner};
pub use proposal::ExecutionProposal;
pub use strategy::{
    expand_execution_tasks, ReplicaMovementStrategy, SingleReplicaMovementStrategy, StrategyKind,
};
pub use task::{ExecutionIdGenerator, ExecutionTask, TaskType};
