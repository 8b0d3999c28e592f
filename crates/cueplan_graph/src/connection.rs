// SPDX-License-Identifier: MIT OR Apache-2.0
//! Dependency (edge) definitions for the graph.

use crate::node::NodeId;
use serde::{Deserialize, Serialize};

/// A directed "waits for" edge: `dependent` can only be evaluated once
/// `prerequisite` has been.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Dependency {
    /// The node that waits
    pub dependent: NodeId,
    /// The node being waited for
    pub prerequisite: NodeId,
}

impl Dependency {
    /// Create a new dependency
    pub fn new(dependent: NodeId, prerequisite: NodeId) -> Self {
        Self {
            dependent,
            prerequisite,
        }
    }

    /// Check if this dependency involves a specific node
    pub fn involves_node(&self, node_id: NodeId) -> bool {
        self.dependent == node_id || self.prerequisite == node_id
    }

    /// A node waiting for itself
    pub fn is_self_loop(&self) -> bool {
        self.dependent == self.prerequisite
    }
}
