// SPDX-License-Identifier: MIT OR Apache-2.0
//! Node definitions for the dependency graph.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of a node inside a [`Graph`](crate::Graph).
///
/// Ids are dense indices handed out in insertion order, so comparing two ids
/// compares their insertion order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct NodeId(pub usize);

impl NodeId {
    /// Position of the node in insertion order
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A node in the graph together with its adjacency.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Node<K> {
    /// Node id
    pub id: NodeId,
    /// Caller-defined key
    pub key: K,
    /// Nodes this node waits for, in the order they were declared
    pub(crate) prerequisites: Vec<NodeId>,
    /// Nodes waiting for this node, in the order they were declared
    pub(crate) dependents: Vec<NodeId>,
}

impl<K> Node<K> {
    pub(crate) fn new(id: NodeId, key: K) -> Self {
        Self {
            id,
            key,
            prerequisites: Vec::new(),
            dependents: Vec::new(),
        }
    }

    /// Nodes that must be evaluated before this one
    pub fn prerequisites(&self) -> &[NodeId] {
        &self.prerequisites
    }

    /// Nodes that depend on this one
    pub fn dependents(&self) -> &[NodeId] {
        &self.dependents
    }

    /// Whether this node has no prerequisites
    pub fn is_root(&self) -> bool {
        self.prerequisites.is_empty()
    }
}
