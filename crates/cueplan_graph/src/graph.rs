// SPDX-License-Identifier: MIT OR Apache-2.0
//! Graph data structure containing nodes and dependencies.

use crate::connection::Dependency;
use crate::node::{Node, NodeId};
use indexmap::IndexMap;
use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap};
use std::hash::Hash;

/// A dependency graph keyed by `K`
#[derive(Debug, Clone)]
pub struct Graph<K> {
    /// Nodes in insertion order; a node's id is its index here
    nodes: IndexMap<K, Node<K>>,
    /// Dependencies in the order they were declared
    dependencies: Vec<Dependency>,
}

impl<K: Hash + Eq + Clone> Graph<K> {
    /// Create a new empty graph
    pub fn new() -> Self {
        Self {
            nodes: IndexMap::new(),
            dependencies: Vec::new(),
        }
    }

    /// Create an empty graph with room for `capacity` nodes
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            nodes: IndexMap::with_capacity(capacity),
            dependencies: Vec::new(),
        }
    }

    /// Add a node, returning the existing id if the key is already present
    pub fn add_node(&mut self, key: K) -> NodeId {
        if let Some(index) = self.nodes.get_index_of(&key) {
            return NodeId(index);
        }
        let id = NodeId(self.nodes.len());
        self.nodes.insert(key.clone(), Node::new(id, key));
        id
    }

    /// Look up a node id by key
    pub fn node_id(&self, key: &K) -> Option<NodeId> {
        self.nodes.get_index_of(key).map(NodeId)
    }

    /// Get a node by ID
    pub fn node(&self, node_id: NodeId) -> Option<&Node<K>> {
        self.nodes.get_index(node_id.0).map(|(_, node)| node)
    }

    /// Get the key of a node
    pub fn key(&self, node_id: NodeId) -> Option<&K> {
        self.node(node_id).map(|node| &node.key)
    }

    /// Get all nodes in insertion order
    pub fn nodes(&self) -> impl Iterator<Item = &Node<K>> {
        self.nodes.values()
    }

    /// Get all node IDs in insertion order
    pub fn node_ids(&self) -> impl Iterator<Item = NodeId> {
        (0..self.nodes.len()).map(NodeId)
    }

    /// Get the number of nodes
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Declare that `dependent` waits for `prerequisite`.
    ///
    /// Declaring the same dependency twice is a no-op. A node may depend on
    /// itself; that shows up as a one-node cycle when ordering.
    pub fn add_dependency(
        &mut self,
        dependent: NodeId,
        prerequisite: NodeId,
    ) -> Result<(), ConnectionError> {
        if dependent.0 >= self.nodes.len() {
            return Err(ConnectionError::NodeNotFound(dependent));
        }
        if prerequisite.0 >= self.nodes.len() {
            return Err(ConnectionError::NodeNotFound(prerequisite));
        }

        let already_declared = self
            .nodes
            .get_index(dependent.0)
            .is_some_and(|(_, node)| node.prerequisites.contains(&prerequisite));
        if already_declared {
            return Ok(());
        }

        if let Some((_, node)) = self.nodes.get_index_mut(dependent.0) {
            node.prerequisites.push(prerequisite);
        }
        if let Some((_, node)) = self.nodes.get_index_mut(prerequisite.0) {
            node.dependents.push(dependent);
        }
        self.dependencies.push(Dependency::new(dependent, prerequisite));
        Ok(())
    }

    /// Get all dependencies
    pub fn dependencies(&self) -> impl Iterator<Item = &Dependency> {
        self.dependencies.iter()
    }

    /// Get dependencies involving a node
    pub fn dependencies_for_node(&self, node_id: NodeId) -> impl Iterator<Item = &Dependency> {
        self.dependencies.iter().filter(move |d| d.involves_node(node_id))
    }

    /// Get the number of dependencies
    pub fn dependency_count(&self) -> usize {
        self.dependencies.len()
    }

    /// Prerequisites of a node, empty for unknown ids
    pub fn prerequisites(&self, node_id: NodeId) -> &[NodeId] {
        match self.node(node_id) {
            Some(node) => node.prerequisites(),
            None => &[],
        }
    }

    /// Every node reachable from `roots` by following prerequisites,
    /// roots included, in ascending id order.
    pub fn dependency_closure(&self, roots: &[NodeId]) -> Vec<NodeId> {
        let mut included = vec![false; self.nodes.len()];
        let mut stack: Vec<NodeId> = Vec::new();

        for &root in roots {
            if root.0 < included.len() && !included[root.0] {
                included[root.0] = true;
                stack.push(root);
            }
        }

        while let Some(node_id) = stack.pop() {
            for &prerequisite in self.prerequisites(node_id) {
                if !included[prerequisite.0] {
                    included[prerequisite.0] = true;
                    stack.push(prerequisite);
                }
            }
        }

        included
            .iter()
            .enumerate()
            .filter_map(|(index, &inside)| inside.then_some(NodeId(index)))
            .collect()
    }

    /// Get all nodes in topological order (prerequisites first).
    ///
    /// Independent nodes come out in insertion order.
    pub fn topological_order(&self) -> Result<Vec<NodeId>, CycleError> {
        let all: Vec<NodeId> = self.node_ids().collect();
        self.order_subset(&all)
    }

    /// Topological order of the dependency closure of `roots`
    pub fn topological_order_of(&self, roots: &[NodeId]) -> Result<Vec<NodeId>, CycleError> {
        let closure = self.dependency_closure(roots);
        self.order_subset(&closure)
    }

    /// Kahn's algorithm over a prerequisite-closed subset of the nodes.
    fn order_subset(&self, subset: &[NodeId]) -> Result<Vec<NodeId>, CycleError> {
        let mut inside = vec![false; self.nodes.len()];
        for node_id in subset {
            inside[node_id.0] = true;
        }

        let mut in_degree: HashMap<NodeId, usize> = HashMap::with_capacity(subset.len());
        let mut ready = BinaryHeap::new();
        for &node_id in subset {
            let degree = self.prerequisites(node_id).len();
            if degree == 0 {
                ready.push(Reverse(node_id));
            }
            in_degree.insert(node_id, degree);
        }

        let mut order = Vec::with_capacity(subset.len());
        while let Some(Reverse(node_id)) = ready.pop() {
            order.push(node_id);
            let Some(node) = self.node(node_id) else {
                continue;
            };
            for &dependent in node.dependents() {
                if !inside[dependent.0] {
                    continue;
                }
                if let Some(degree) = in_degree.get_mut(&dependent) {
                    *degree -= 1;
                    if *degree == 0 {
                        ready.push(Reverse(dependent));
                    }
                }
            }
        }

        if order.len() < subset.len() {
            let blocked = |node_id: &NodeId| in_degree.get(node_id).is_some_and(|&d| d > 0);
            let path = self.find_cycle(subset, blocked);
            tracing::debug!(cycle_len = path.len(), "dependency cycle detected");
            return Err(CycleError { path });
        }

        Ok(order)
    }

    /// Extract one cycle from the nodes Kahn's algorithm could not release.
    ///
    /// Every blocked node still has at least one blocked prerequisite, so
    /// walking prerequisites from any blocked node must revisit a node. The
    /// returned path lists each node followed by its prerequisite, rotated so
    /// the smallest id comes first.
    fn find_cycle(&self, subset: &[NodeId], blocked: impl Fn(&NodeId) -> bool) -> Vec<NodeId> {
        let Some(&start) = subset.iter().find(|id| blocked(*id)) else {
            return Vec::new();
        };

        let mut position: HashMap<NodeId, usize> = HashMap::new();
        let mut walk: Vec<NodeId> = Vec::new();
        let mut current = start;

        loop {
            if let Some(&at) = position.get(&current) {
                let mut cycle = walk.split_off(at);
                if let Some(min_at) = cycle
                    .iter()
                    .enumerate()
                    .min_by_key(|(_, id)| **id)
                    .map(|(index, _)| index)
                {
                    cycle.rotate_left(min_at);
                }
                return cycle;
            }
            position.insert(current, walk.len());
            walk.push(current);

            match self
                .prerequisites(current)
                .iter()
                .copied()
                .find(|id| blocked(id))
            {
                Some(next) => current = next,
                None => return walk,
            }
        }
    }
}

impl<K: Hash + Eq + Clone> Default for Graph<K> {
    fn default() -> Self {
        Self::new()
    }
}

/// Error when declaring a dependency
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConnectionError {
    /// Node not found
    #[error("Node not found: {0}")]
    NodeNotFound(NodeId),
}

/// Error when the graph contains a cycle.
///
/// `path` holds the nodes of one cycle; each node waits for the next and the
/// last waits for the first.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Graph contains a cycle through {} node(s)", .path.len())]
pub struct CycleError {
    /// Nodes on the cycle
    pub path: Vec<NodeId>,
}
