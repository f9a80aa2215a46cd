//! Error types for the replica planner.

use crate::types::{ReplicaPlacement, TopicPartition};
use thiserror::Error;

/// Result type alias for planner operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the replica planner.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// A proposal failed validation. Nothing was emitted.
    #[error("invalid proposal for {partition}: {source}")]
    InvalidProposal {
        partition: TopicPartition,
        #[source]
        source: ProposalError,
    },

    /// A strategy was chained onto, or after, a terminal strategy.
    #[error("strategy {strategy} does not support chaining")]
    IllegalChaining { strategy: String },

    /// The plan needs more execution ids than remain after the base.
    #[error("execution ids exhausted: base {first} cannot number {needed} tasks")]
    ExecutionIdsExhausted { first: u64, needed: usize },

    /// Configuration errors.
    #[error("config error: {0}")]
    Config(String),
}

impl Error {
    /// Check if this error should be retried.
    ///
    /// Planner errors are caused by bad input or bad wiring; replaying the
    /// same call cannot succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            Error::InvalidProposal { .. }
            | Error::IllegalChaining { .. }
            | Error::ExecutionIdsExhausted { .. }
            | Error::Config(_) => false,
        }
    }
}

/// Reasons a proposal is rejected.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProposalError {
    /// The current replica list is empty.
    #[error("old replica set is empty")]
    EmptyOldReplicas,

    /// The target replica list is empty.
    #[error("new replica set is empty")]
    EmptyNewReplicas,

    /// The declared leader is not part of the current replica list.
    #[error("leader {leader} is not in the old replica set")]
    LeaderNotInOldReplicas { leader: ReplicaPlacement },

    /// A node appears more than once in a replica list.
    #[error("replica {replica} appears more than once")]
    DuplicateReplica { replica: ReplicaPlacement },
}
