//! Directed Multigraph Engine
//!
//! Arena storage for typed nodes and labelled directed edges, built on petgraph.
//! Nodes and edges live in flat vectors and are addressed by integer handles.
//!
//! The engine has no schema semantics. Callers pick their own node payload and
//! edge label types; the aggregate builder uses it with [`crate::schema::Relation`].
//!
//! Edge order is insertion order everywhere. Member order in the built schema
//! depends on it.

pub mod traverse;

pub use traverse::{Ancestors, Descendants};

use petgraph::graph::{DiGraph, EdgeIndex, NodeIndex};
use petgraph::visit::EdgeRef;
use petgraph::Direction;
use std::collections::HashMap;
use std::fmt;
use thiserror::Error;

/// Handle to a node stored in a [`DirectedGraph`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeHandle(NodeIndex);

impl NodeHandle {
    /// Position of the node in insertion order
    pub fn index(self) -> usize {
        self.0.index()
    }
}

impl fmt::Display for NodeHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0.index())
    }
}

/// Graph engine errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GraphError {
    #[error("Duplicate node id: {0}")]
    DuplicateNodeId(String),
}

#[derive(Debug)]
struct NodeEntry<N> {
    id: String,
    weight: N,
}

/// Directed multigraph with string-identified nodes and labelled edges
#[derive(Debug)]
pub struct DirectedGraph<N, L> {
    inner: DiGraph<NodeEntry<N>, L>,
    by_id: HashMap<String, NodeHandle>,
    /// Labels whose edges were proven acyclic by [`DirectedGraph::seal_acyclic`]
    sealed: Vec<L>,
}

impl<N, L> Default for DirectedGraph<N, L> {
    fn default() -> Self {
        Self {
            inner: DiGraph::default(),
            by_id: HashMap::new(),
            sealed: Vec::new(),
        }
    }
}

impl<N, L: Copy + PartialEq> DirectedGraph<N, L> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(nodes: usize, edges: usize) -> Self {
        Self {
            inner: DiGraph::with_capacity(nodes, edges),
            by_id: HashMap::with_capacity(nodes),
            sealed: Vec::new(),
        }
    }

    /// Add a node under a unique id
    pub fn add_node(&mut self, id: impl Into<String>, weight: N) -> Result<NodeHandle, GraphError> {
        let id = id.into();
        if self.by_id.contains_key(&id) {
            return Err(GraphError::DuplicateNodeId(id));
        }
        let handle = NodeHandle(self.inner.add_node(NodeEntry {
            id: id.clone(),
            weight,
        }));
        self.by_id.insert(id, handle);
        Ok(handle)
    }

    /// Add a labelled edge. Parallel edges are allowed.
    pub fn add_edge(&mut self, from: NodeHandle, to: NodeHandle, label: L) {
        self.inner.add_edge(from.0, to.0, label);
    }

    pub fn node_count(&self) -> usize {
        self.inner.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.inner.edge_count()
    }

    /// Resolve a node id to its handle
    pub fn lookup(&self, id: &str) -> Option<NodeHandle> {
        self.by_id.get(id).copied()
    }

    pub fn node(&self, handle: NodeHandle) -> Option<&N> {
        self.inner.node_weight(handle.0).map(|entry| &entry.weight)
    }

    pub fn id(&self, handle: NodeHandle) -> Option<&str> {
        self.inner.node_weight(handle.0).map(|entry| entry.id.as_str())
    }

    /// All node handles in insertion order
    pub fn handles(&self) -> impl Iterator<Item = NodeHandle> + '_ {
        self.inner.node_indices().map(NodeHandle)
    }

    /// All edges as (from, to, label) in insertion order
    pub fn edges(&self) -> impl Iterator<Item = (NodeHandle, NodeHandle, L)> + '_ {
        self.inner
            .edge_references()
            .map(|e| (NodeHandle(e.source()), NodeHandle(e.target()), *e.weight()))
    }

    /// Targets of outgoing edges carrying one of `labels`, in insertion order
    pub fn edges_from(&self, node: NodeHandle, labels: &[L]) -> Vec<NodeHandle> {
        self.neighbors(node, labels, Direction::Outgoing)
            .into_iter()
            .map(|(_, handle, _)| handle)
            .collect()
    }

    /// Sources of incoming edges carrying one of `labels`, in insertion order
    pub fn edges_to(&self, node: NodeHandle, labels: &[L]) -> Vec<NodeHandle> {
        self.neighbors(node, labels, Direction::Incoming)
            .into_iter()
            .map(|(_, handle, _)| handle)
            .collect()
    }

    /// Owners/parents first: walks incoming edges of `labels` backwards, nearest first
    pub fn ancestors(&self, node: NodeHandle, labels: &[L]) -> Ancestors<'_, N, L> {
        Ancestors::new(self, node, labels)
    }

    /// Depth-first pre-order walk along outgoing edges of `labels`.
    ///
    /// # Panics
    ///
    /// Panics when any of `labels` has not been sealed with
    /// [`DirectedGraph::seal_acyclic`]. Walking an unvalidated label set is a
    /// contract violation of the caller, not a data error.
    pub fn descendants(&self, node: NodeHandle, labels: &[L]) -> Descendants<'_, N, L> {
        assert!(
            labels.iter().all(|label| self.sealed.contains(label)),
            "descendants() called on edge labels that were never sealed as acyclic"
        );
        Descendants::new(self, node, labels)
    }

    /// Whether every label in `labels` has been proven acyclic
    pub fn is_sealed(&self, labels: &[L]) -> bool {
        labels.iter().all(|label| self.sealed.contains(label))
    }

    /// Every cycle formed by edges of `labels`, each reported once as the node path
    /// from the first node reached on the cycle back to its predecessor.
    pub fn find_cycles(&self, labels: &[L]) -> Vec<Vec<NodeHandle>> {
        traverse::find_cycles(self, labels)
    }

    /// Prove that `labels` form no cycle and unlock [`DirectedGraph::descendants`] for them.
    ///
    /// Returns the offending cycles when the proof fails; the graph stays unsealed.
    pub fn seal_acyclic(&mut self, labels: &[L]) -> Result<(), Vec<Vec<NodeHandle>>> {
        let cycles = self.find_cycles(labels);
        if !cycles.is_empty() {
            return Err(cycles);
        }
        for label in labels {
            if !self.sealed.contains(label) {
                self.sealed.push(*label);
            }
        }
        Ok(())
    }

    fn neighbors(
        &self,
        node: NodeHandle,
        labels: &[L],
        direction: Direction,
    ) -> Vec<(EdgeIndex, NodeHandle, L)> {
        let mut found: Vec<(EdgeIndex, NodeHandle, L)> = self
            .inner
            .edges_directed(node.0, direction)
            .filter(|e| labels.contains(e.weight()))
            .map(|e| {
                let other = match direction {
                    Direction::Outgoing => e.target(),
                    Direction::Incoming => e.source(),
                };
                (e.id(), NodeHandle(other), *e.weight())
            })
            .collect();
        // petgraph hands out adjacency lists newest-first
        found.sort_by_key(|(edge, _, _)| *edge);
        found
    }
}
