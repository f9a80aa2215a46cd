//! Execution proposals: one partition's transition between replica sets.

use crate::error::{Error, ProposalError, Result};
use crate::types::{ReplicaPlacement, TopicPartition};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

/// A proposed change of a partition's replica set.
///
/// The first replica of each list is the leader of that list. Replicas present
/// in both lists are left untouched; the set differences fully determine what
/// has to move.
///
/// Deserialization goes through [`ExecutionProposal::new`], so a decoded
/// proposal is always valid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawExecutionProposal")]
pub struct ExecutionProposal {
    partition: TopicPartition,
    partition_size: u64,
    leader_before: ReplicaPlacement,
    old_replicas: Vec<ReplicaPlacement>,
    new_replicas: Vec<ReplicaPlacement>,
}

impl ExecutionProposal {
    /// Create a validated proposal.
    pub fn new(
        partition: TopicPartition,
        partition_size: u64,
        leader_before: ReplicaPlacement,
        old_replicas: Vec<ReplicaPlacement>,
        new_replicas: Vec<ReplicaPlacement>,
    ) -> Result<Self> {
        let proposal = Self {
            partition,
            partition_size,
            leader_before,
            old_replicas,
            new_replicas,
        };
        proposal.validate()?;
        Ok(proposal)
    }

    /// Build a proposal without checking it.
    #[cfg(test)]
    pub(crate) fn new_unchecked(
        partition: TopicPartition,
        partition_size: u64,
        leader_before: ReplicaPlacement,
        old_replicas: Vec<ReplicaPlacement>,
        new_replicas: Vec<ReplicaPlacement>,
    ) -> Self {
        Self {
            partition,
            partition_size,
            leader_before,
            old_replicas,
            new_replicas,
        }
    }

    /// Build one step of an expanded proposal. The caller guarantees both
    /// lists are non-empty and duplicate free.
    pub(crate) fn step(
        &self,
        old_replicas: Vec<ReplicaPlacement>,
        new_replicas: Vec<ReplicaPlacement>,
    ) -> Self {
        let leader_before = old_replicas[0];
        Self {
            partition: self.partition.clone(),
            partition_size: self.partition_size,
            leader_before,
            old_replicas,
            new_replicas,
        }
    }

    /// Check the proposal's structural invariants.
    pub fn validate(&self) -> Result<()> {
        self.check().map_err(|source| Error::InvalidProposal {
            partition: self.partition.clone(),
            source,
        })
    }

    fn check(&self) -> std::result::Result<(), ProposalError> {
        if self.old_replicas.is_empty() {
            return Err(ProposalError::EmptyOldReplicas);
        }
        if self.new_replicas.is_empty() {
            return Err(ProposalError::EmptyNewReplicas);
        }
        for replicas in [&self.old_replicas, &self.new_replicas] {
            let mut seen = HashSet::with_capacity(replicas.len());
            if let Some(dup) = replicas.iter().find(|r| !seen.insert(**r)) {
                return Err(ProposalError::DuplicateReplica { replica: *dup });
            }
        }
        if !self.old_replicas.contains(&self.leader_before) {
            return Err(ProposalError::LeaderNotInOldReplicas {
                leader: self.leader_before,
            });
        }
        Ok(())
    }

    /// The partition being reassigned.
    pub fn partition(&self) -> &TopicPartition {
        &self.partition
    }

    /// Partition size in bytes.
    pub fn partition_size(&self) -> u64 {
        self.partition_size
    }

    /// The leader as declared by the proposer.
    pub fn leader_before(&self) -> ReplicaPlacement {
        self.leader_before
    }

    /// Current replica list, leader first.
    pub fn old_replicas(&self) -> &[ReplicaPlacement] {
        &self.old_replicas
    }

    /// Target replica list, leader first.
    pub fn new_replicas(&self) -> &[ReplicaPlacement] {
        &self.new_replicas
    }

    /// First replica of the current list.
    pub fn old_leader(&self) -> ReplicaPlacement {
        self.old_replicas[0]
    }

    /// First replica of the target list.
    pub fn new_leader(&self) -> ReplicaPlacement {
        self.new_replicas[0]
    }

    /// Replicas in the target list but not in the current one, in target order.
    pub fn replicas_to_add(&self) -> Vec<ReplicaPlacement> {
        self.new_replicas
            .iter()
            .filter(|r| !self.old_replicas.contains(r))
            .copied()
            .collect()
    }

    /// Replicas in the current list but not in the target one, in current order.
    pub fn replicas_to_remove(&self) -> Vec<ReplicaPlacement> {
        self.old_replicas
            .iter()
            .filter(|r| !self.new_replicas.contains(r))
            .copied()
            .collect()
    }

    /// Number of replicas that must be created on new nodes.
    pub fn replicas_to_move(&self) -> usize {
        self.replicas_to_add().len()
    }

    /// Bytes that must be copied to complete the proposal.
    pub fn data_to_move_bytes(&self) -> u64 {
        self.partition_size
            .saturating_mul(self.replicas_to_move() as u64)
    }

    /// Whether the replica set changes (ignoring order).
    pub fn has_replica_action(&self) -> bool {
        let old: HashSet<_> = self.old_replicas.iter().collect();
        let new: HashSet<_> = self.new_replicas.iter().collect();
        old != new
    }

    /// Whether leadership moves to another node.
    pub fn has_leader_action(&self) -> bool {
        self.old_leader() != self.new_leader()
    }
}

/// Wire form of [`ExecutionProposal`] before validation.
#[derive(Deserialize)]
struct RawExecutionProposal {
    partition: TopicPartition,
    partition_size: u64,
    leader_before: ReplicaPlacement,
    old_replicas: Vec<ReplicaPlacement>,
    new_replicas: Vec<ReplicaPlacement>,
}

impl TryFrom<RawExecutionProposal> for ExecutionProposal {
    type Error = Error;

    fn try_from(raw: RawExecutionProposal) -> Result<Self> {
        Self::new(
            raw.partition,
            raw.partition_size,
            raw.leader_before,
            raw.old_replicas,
            raw.new_replicas,
        )
    }
}

impl fmt::Display for ExecutionProposal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{{{}, oldLeader: {}, [{}] -> [{}]}}",
            self.partition,
            self.leader_before,
            join_replicas(&self.old_replicas),
            join_replicas(&self.new_replicas)
        )
    }
}

fn join_replicas(replicas: &[ReplicaPlacement]) -> String {
    replicas
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(",")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::replica_set;

    fn proposal(old: &[u64], new: &[u64]) -> ExecutionProposal {
        ExecutionProposal::new(
            TopicPartition::new("foobar", 0),
            20,
            ReplicaPlacement::new(old[0]),
            replica_set(old.iter().copied()),
            replica_set(new.iter().copied()),
        )
        .unwrap()
    }

    #[test]
    fn test_set_differences() {
        let p = proposal(&[1, 2, 3], &[4, 2, 5]);
        assert_eq!(p.replicas_to_add(), replica_set([4, 5]));
        assert_eq!(p.replicas_to_remove(), replica_set([1, 3]));
        assert_eq!(p.old_leader(), ReplicaPlacement::new(1));
        assert_eq!(p.new_leader(), ReplicaPlacement::new(4));
        assert_eq!(p.replicas_to_move(), 2);
        assert_eq!(p.data_to_move_bytes(), 40);
    }

    #[test]
    fn test_replica_and_leader_actions() {
        let reorder = proposal(&[1, 2, 3], &[2, 1, 3]);
        assert!(!reorder.has_replica_action());
        assert!(reorder.has_leader_action());

        let follower = proposal(&[1, 2, 3], &[1, 2, 4]);
        assert!(follower.has_replica_action());
        assert!(!follower.has_leader_action());
    }

    #[test]
    fn test_rejects_empty_lists() {
        let err = ExecutionProposal::new(
            TopicPartition::new("foobar", 1),
            0,
            ReplicaPlacement::new(1),
            Vec::new(),
            replica_set([1]),
        )
        .unwrap_err();
        assert!(matches!(
            err,
            Error::InvalidProposal {
                source: ProposalError::EmptyOldReplicas,
                ..
            }
        ));

        let err = ExecutionProposal::new(
            TopicPartition::new("foobar", 1),
            0,
            ReplicaPlacement::new(1),
            replica_set([1]),
            Vec::new(),
        )
        .unwrap_err();
        assert!(matches!(
            err,
            Error::InvalidProposal {
                source: ProposalError::EmptyNewReplicas,
                ..
            }
        ));
    }

    #[test]
    fn test_rejects_leader_outside_old_replicas() {
        let err = ExecutionProposal::new(
            TopicPartition::new("foobar", 1),
            0,
            ReplicaPlacement::new(7),
            replica_set([1, 2]),
            replica_set([1, 3]),
        )
        .unwrap_err();
        assert_eq!(
            err,
            Error::InvalidProposal {
                partition: TopicPartition::new("foobar", 1),
                source: ProposalError::LeaderNotInOldReplicas {
                    leader: ReplicaPlacement::new(7)
                },
            }
        );
    }

    #[test]
    fn test_rejects_duplicates() {
        let err = ExecutionProposal::new(
            TopicPartition::new("foobar", 1),
            0,
            ReplicaPlacement::new(1),
            replica_set([1, 2]),
            replica_set([3, 4, 3]),
        )
        .unwrap_err();
        assert!(matches!(
            err,
            Error::InvalidProposal {
                source: ProposalError::DuplicateReplica { replica },
                ..
            } if replica == ReplicaPlacement::new(3)
        ));
    }

    #[test]
    fn test_deserialize_rejects_invalid_proposal() {
        let json = r#"{
            "partition": {"topic": "foobar", "partition": 3},
            "partition_size": 10,
            "leader_before": {"node_id": 1},
            "old_replicas": [],
            "new_replicas": [{"node_id": 2}]
        }"#;
        let err = serde_json::from_str::<ExecutionProposal>(json).unwrap_err();
        assert!(err.to_string().contains("old replica set is empty"));
    }

    #[test]
    fn test_serde_round_trip() {
        let p = proposal(&[1, 2, 3], &[4, 2, 3]);
        let json = serde_json::to_string(&p).unwrap();
        let decoded: ExecutionProposal = serde_json::from_str(&json).unwrap();
        assert_eq!(decoded, p);
        assert_eq!(decoded.old_leader(), ReplicaPlacement::new(1));
    }

    #[test]
    fn test_display() {
        let p = proposal(&[1, 2], &[3, 2]);
        assert_eq!(p.to_string(), "{foobar-0, oldLeader: 1, [1,2] -> [3,2]}");
    }
}
