//! Core types used throughout the planner.

use serde::{Deserialize, Serialize};
use smol_str::SmolStr;
use std::fmt;

/// Storage node identifier in the cluster.
pub type NodeId = u64;

/// Identifies a single partition of a topic.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TopicPartition {
    /// Topic name.
    pub topic: SmolStr,
    /// Partition index within the topic.
    pub partition: u32,
}

impl TopicPartition {
    /// Create a new topic partition.
    pub fn new(topic: impl Into<SmolStr>, partition: u32) -> Self {
        Self {
            topic: topic.into(),
            partition,
        }
    }
}

impl fmt::Display for TopicPartition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.topic, self.partition)
    }
}

/// A replica of a partition hosted on a storage node.
///
/// Placements compare and order by node id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ReplicaPlacement {
    node_id: NodeId,
}

impl ReplicaPlacement {
    /// Create a placement on the given node.
    pub fn new(node_id: NodeId) -> Self {
        Self { node_id }
    }

    /// The node hosting this replica.
    pub fn node_id(&self) -> NodeId {
        self.node_id
    }
}

impl From<NodeId> for ReplicaPlacement {
    fn from(node_id: NodeId) -> Self {
        Self::new(node_id)
    }
}

impl fmt::Display for ReplicaPlacement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.node_id)
    }
}

/// Build an ordered replica list from node ids.
pub fn replica_set(node_ids: impl IntoIterator<Item = NodeId>) -> Vec<ReplicaPlacement> {
    node_ids.into_iter().map(ReplicaPlacement::new).collect()
}
