//! Node-level dependency graph analysis backed by petgraph.
//!
//! Neither phase enforces acyclicity. These helpers collapse socket links
//! into node-to-node edges so callers that need a DAG can check for one or
//! get an evaluation order.

use petgraph::algo::toposort;
use petgraph::graph::{DiGraph, NodeIndex};

use crate::error::NetworkError;
use crate::id::NodeId;

/// Builds a graph with one petgraph node per graph node (index == id) and one
/// edge per link, from origin node to target node.
pub(crate) fn dependency_graph(
    node_count: usize,
    links: impl IntoIterator<Item = (NodeId, NodeId)>,
) -> DiGraph<NodeId, (), u32> {
    let mut graph = DiGraph::with_capacity(node_count, 0);
    for id in 0..node_count {
        graph.add_node(NodeId(id as u32));
    }
    for (from, to) in links {
        graph.add_edge(NodeIndex::new(from.index()), NodeIndex::new(to.index()), ());
    }
    graph
}

/// Returns the node ids in an order where every node follows all nodes it
/// depends on, or [`NetworkError::Cycle`] naming a node on a cycle.
pub(crate) fn topological_order(
    node_count: usize,
    links: impl IntoIterator<Item = (NodeId, NodeId)>,
) -> Result<Vec<NodeId>, NetworkError> {
    let graph = dependency_graph(node_count, links);
    toposort(&graph, None)
        .map(|order| order.into_iter().map(|idx| graph[idx]).collect())
        .map_err(|cycle| NetworkError::Cycle {
            node: graph[cycle.node_id()],
        })
}
