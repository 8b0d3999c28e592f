// SPDX-License-Identifier: MIT OR Apache-2.0
//! Dependency graph framework for the cue planner.
//!
//! This crate provides the graph the timeline engine resolves against:
//! - Nodes keyed by caller-defined identifiers, indexed in insertion order
//! - Prerequisite edges ("this node starts after that one")
//! - Deterministic topological ordering (Kahn's algorithm)
//! - Full-path cycle reporting
//!
//! ## Architecture
//!
//! Insertion order is significant: whenever two nodes are independent of
//! each other, the one inserted first is ordered first. Callers that insert
//! nodes in a stable declaration order therefore get stable results across
//! runs, regardless of hashing.

pub mod node;
pub mod connection;
pub mod graph;
pub mod evaluation;

pub use node::{Node, NodeId};
pub use connection::Dependency;
pub use graph::{ConnectionError, CycleError, Graph};
pub use evaluation::{Evaluation, EvaluationContext, EvaluationError, NodeEvaluator};
