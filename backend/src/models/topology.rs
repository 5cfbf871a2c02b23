//! Network topology
//!
//! The engine only needs two questions answered about the network: which
//! nodes exist, and who is adjacent to whom. Anything that can answer them
//! implements [`Topology`]. [`Graph`] is the in-crate undirected adjacency
//! structure; the engine copies every topology it is given into a `Graph` so
//! later changes to the caller's graph cannot reach a running simulation.
//!
//! # Determinism
//!
//! - All maps and sets are BTree-based for sorted iteration
//! - Node order is lexicographic by `AgentId`

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use thiserror::Error;

/// Stable identifier of an agent (a node of the topology)
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AgentId(String);

impl AgentId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AgentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for AgentId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for AgentId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Errors raised when an id does not fit the topology
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TopologyError {
    #[error("Agent not found in topology: {0}")]
    UnknownAgent(AgentId),

    #[error("Agent {0} cannot address a message to itself")]
    SelfAddressed(AgentId),

    #[error("Topology has no nodes")]
    EmptyTopology,

    #[error("Agent {node} lists neighbor {neighbor} which is not a node")]
    DanglingNeighbor { node: AgentId, neighbor: AgentId },
}

/// Read-only neighbor lookup over a network
pub trait Topology {
    /// All nodes of the network
    fn nodes(&self) -> BTreeSet<AgentId>;

    /// Nodes adjacent to `id` (empty for unknown or isolated nodes)
    fn neighbors(&self, id: &AgentId) -> BTreeSet<AgentId>;
}

/// Undirected graph stored as a sorted adjacency map
///
/// # Example
/// ```
/// use flood_simulator_core_rs::{AgentId, Graph, Topology};
///
/// let graph = Graph::from_edges([("A", "B"), ("B", "C")]);
/// assert_eq!(graph.node_count(), 3);
/// assert!(graph.has_edge(&AgentId::from("C"), &AgentId::from("B")));
/// assert_eq!(graph.neighbors(&AgentId::from("B")).len(), 2);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Graph {
    adjacency: BTreeMap<AgentId, BTreeSet<AgentId>>,
}

impl Graph {
    /// Create empty graph
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a graph from an edge list; endpoints become nodes
    pub fn from_edges<I, A>(edges: I) -> Self
    where
        I: IntoIterator<Item = (A, A)>,
        A: Into<AgentId>,
    {
        let mut graph = Self::new();
        for (a, b) in edges {
            graph.add_edge(a.into(), b.into());
        }
        graph
    }

    /// Copy any topology into an owned graph
    ///
    /// # Errors
    /// Returns [`TopologyError::DanglingNeighbor`] if a node lists a neighbor
    /// that is not itself one of the topology's nodes.
    pub fn snapshot_of<T: Topology + ?Sized>(topology: &T) -> Result<Self, TopologyError> {
        let nodes = topology.nodes();
        let mut adjacency = BTreeMap::new();

        for node in &nodes {
            let neighbors = topology.neighbors(node);
            if let Some(neighbor) = neighbors.iter().find(|n| !nodes.contains(*n)) {
                return Err(TopologyError::DanglingNeighbor {
                    node: node.clone(),
                    neighbor: neighbor.clone(),
                });
            }
            adjacency.insert(node.clone(), neighbors);
        }

        Ok(Self { adjacency })
    }

    /// Add an isolated node (no-op if it already exists)
    pub fn add_node(&mut self, id: AgentId) {
        self.adjacency.entry(id).or_default();
    }

    /// Add an undirected edge; self-loops are ignored
    pub fn add_edge(&mut self, a: AgentId, b: AgentId) {
        if a == b {
            self.add_node(a);
            return;
        }
        self.adjacency.entry(a.clone()).or_default().insert(b.clone());
        self.adjacency.entry(b).or_default().insert(a);
    }

    pub fn contains(&self, id: &AgentId) -> bool {
        self.adjacency.contains_key(id)
    }

    pub fn has_edge(&self, a: &AgentId, b: &AgentId) -> bool {
        self.adjacency
            .get(a)
            .map(|neighbors| neighbors.contains(b))
            .unwrap_or(false)
    }

    pub fn node_count(&self) -> usize {
        self.adjacency.len()
    }

    /// Number of undirected edges
    pub fn edge_count(&self) -> usize {
        self.adjacency.values().map(BTreeSet::len).sum::<usize>() / 2
    }

    /// Fail with [`TopologyError::UnknownAgent`] unless `id` is a node
    pub fn require(&self, id: &AgentId) -> Result<(), TopologyError> {
        if self.contains(id) {
            Ok(())
        } else {
            Err(TopologyError::UnknownAgent(id.clone()))
        }
    }
}

impl Topology for Graph {
    fn nodes(&self) -> BTreeSet<AgentId> {
        self.adjacency.keys().cloned().collect()
    }

    fn neighbors(&self, id: &AgentId) -> BTreeSet<AgentId> {
        self.adjacency.get(id).cloned().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_edges_are_symmetric() {
        let graph = Graph::from_edges([("A", "B")]);
        assert!(graph.has_edge(&"A".into(), &"B".into()));
        assert!(graph.has_edge(&"B".into(), &"A".into()));
        assert_eq!(graph.edge_count(), 1);
    }

    #[test]
    fn test_self_loop_ignored() {
        let graph = Graph::from_edges([("A", "A")]);
        assert_eq!(graph.node_count(), 1);
        assert_eq!(graph.edge_count(), 0);
        assert!(graph.neighbors(&"A".into()).is_empty());
    }

    #[test]
    fn test_snapshot_is_detached() {
        let mut source = Graph::from_edges([("A", "B")]);
        let copy = Graph::snapshot_of(&source).unwrap();
        source.add_edge("B".into(), "C".into());

        assert_eq!(copy.node_count(), 2);
        assert!(!copy.contains(&"C".into()));
    }

    struct LeakyNetwork;

    impl Topology for LeakyNetwork {
        fn nodes(&self) -> BTreeSet<AgentId> {
            ["A", "B"].into_iter().map(AgentId::from).collect()
        }

        fn neighbors(&self, id: &AgentId) -> BTreeSet<AgentId> {
            match id.as_str() {
                "A" => ["B", "Ghost"].into_iter().map(AgentId::from).collect(),
                "B" => ["A"].into_iter().map(AgentId::from).collect(),
                _ => BTreeSet::new(),
            }
        }
    }

    #[test]
    fn test_snapshot_rejects_neighbor_outside_nodes() {
        assert_eq!(
            Graph::snapshot_of(&LeakyNetwork),
            Err(TopologyError::DanglingNeighbor {
                node: "A".into(),
                neighbor: "Ghost".into(),
            })
        );
    }

    #[test]
    fn test_require_unknown_agent() {
        let graph = Graph::from_edges([("A", "B")]);
        assert_eq!(
            graph.require(&"Z".into()),
            Err(TopologyError::UnknownAgent("Z".into()))
        );
        assert!(graph.require(&"A".into()).is_ok());
    }
}
