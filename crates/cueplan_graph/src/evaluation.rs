// SPDX-License-Identifier: MIT OR Apache-2.0
//! Graph evaluation in dependency order.

use crate::graph::{CycleError, Graph};
use crate::node::NodeId;
use indexmap::IndexMap;
use std::hash::Hash;

/// Outputs of an evaluation pass, in evaluation order
#[derive(Debug, Clone)]
pub struct Evaluation<V> {
    outputs: IndexMap<NodeId, V>,
}

impl<V> Evaluation<V> {
    /// Get the output of a node
    pub fn get(&self, node_id: NodeId) -> Option<&V> {
        self.outputs.get(&node_id)
    }

    /// Iterate outputs in evaluation order
    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &V)> {
        self.outputs.iter().map(|(id, value)| (*id, value))
    }

    /// Number of evaluated nodes
    pub fn len(&self) -> usize {
        self.outputs.len()
    }

    /// Whether nothing was evaluated
    pub fn is_empty(&self) -> bool {
        self.outputs.is_empty()
    }
}

/// Context for graph evaluation
pub struct EvaluationContext<'a, K> {
    /// The graph being evaluated
    pub graph: &'a Graph<K>,
    /// Evaluation order
    order: Vec<NodeId>,
}

impl<'a, K: Hash + Eq + Clone> EvaluationContext<'a, K> {
    /// Prepare to evaluate every node of the graph
    pub fn new(graph: &'a Graph<K>) -> Result<Self, EvaluationError> {
        let order = graph.topological_order()?;
        Ok(Self { graph, order })
    }

    /// Prepare to evaluate only what `roots` depend on (roots included)
    pub fn for_roots(graph: &'a Graph<K>, roots: &[NodeId]) -> Result<Self, EvaluationError> {
        let order = graph.topological_order_of(roots)?;
        Ok(Self { graph, order })
    }

    /// Get the evaluation order
    pub fn order(&self) -> &[NodeId] {
        &self.order
    }

    /// Evaluate every node in order, feeding each node its prerequisites'
    /// outputs in declaration order.
    pub fn run<E: NodeEvaluator<K>>(
        self,
        evaluator: &E,
    ) -> Result<Evaluation<E::Output>, EvaluationError> {
        let mut outputs: IndexMap<NodeId, E::Output> = IndexMap::with_capacity(self.order.len());

        for &node_id in &self.order {
            let node = self
                .graph
                .node(node_id)
                .ok_or(EvaluationError::NodeNotFound(node_id))?;

            let mut inputs = Vec::with_capacity(node.prerequisites().len());
            for &prerequisite in node.prerequisites() {
                let value = outputs.get(&prerequisite).ok_or(EvaluationError::MissingInput {
                    node: node_id,
                    prerequisite,
                })?;
                inputs.push(value);
            }

            let output = evaluator.evaluate(&node.key, &inputs)?;
            outputs.insert(node_id, output);
        }

        tracing::trace!(nodes = outputs.len(), "graph evaluated");
        Ok(Evaluation { outputs })
    }
}

/// Trait for evaluating nodes
pub trait NodeEvaluator<K> {
    /// Value produced per node
    type Output;

    /// Evaluate a node from its prerequisites' outputs
    fn evaluate(&self, key: &K, inputs: &[&Self::Output]) -> Result<Self::Output, EvaluationError>;
}

/// Error during evaluation
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EvaluationError {
    /// Graph contains a cycle
    #[error(transparent)]
    CycleDetected(#[from] CycleError),

    /// Node not found
    #[error("Node not found: {0}")]
    NodeNotFound(NodeId),

    /// A prerequisite was not evaluated before its dependent
    #[error("Missing input for {node}: {prerequisite} was not evaluated")]
    MissingInput {
        /// Node being evaluated
        node: NodeId,
        /// Prerequisite without output
        prerequisite: NodeId,
    },

    /// Custom error
    #[error("{0}")]
    Custom(String),
}
