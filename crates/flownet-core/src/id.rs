//! Dense ID newtypes and graph-scoped handles.
//!
//! [`NodeId`] and [`SocketId`] are dense, zero-based indices assigned in
//! creation order. They are only meaningful together with the graph that
//! assigned them, so the public construction and query API passes typed
//! handles ([`NodeRef`], [`InputRef`], [`OutputRef`]) that also carry the
//! [`GraphId`] of their owner. A handle from one graph is rejected by every
//! other graph.

use std::fmt;
use std::sync::atomic::{AtomicU32, Ordering};

use serde::{Deserialize, Serialize};

/// Identity of one graph instance.
///
/// A finalized network keeps the id of the builder it was produced from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GraphId(pub u32);

/// Dense node identifier, unique across operation and dummy nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct NodeId(pub u32);

/// Dense socket identifier. Inputs and outputs share one id space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SocketId(pub u32);

static NEXT_GRAPH_ID: AtomicU32 = AtomicU32::new(0);

impl GraphId {
    /// Returns a process-unique graph id.
    pub(crate) fn fresh() -> Self {
        GraphId(NEXT_GRAPH_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl NodeId {
    /// The id as a vector index.
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl SocketId {
    /// The id as a vector index.
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for GraphId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for SocketId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Graph-scoped handles
// ---------------------------------------------------------------------------

/// Handle to a node of a specific graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NodeRef {
    graph: GraphId,
    id: NodeId,
}

/// Handle to an input socket of a specific graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct InputRef {
    graph: GraphId,
    id: SocketId,
}

/// Handle to an output socket of a specific graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OutputRef {
    graph: GraphId,
    id: SocketId,
}

impl NodeRef {
    pub(crate) fn new(graph: GraphId, id: NodeId) -> Self {
        NodeRef { graph, id }
    }

    /// The graph this node belongs to.
    pub fn graph(&self) -> GraphId {
        self.graph
    }

    /// The node's dense id.
    pub fn id(&self) -> NodeId {
        self.id
    }
}

impl InputRef {
    pub(crate) fn new(graph: GraphId, id: SocketId) -> Self {
        InputRef { graph, id }
    }

    /// The graph this socket belongs to.
    pub fn graph(&self) -> GraphId {
        self.graph
    }

    /// The socket's dense id.
    pub fn id(&self) -> SocketId {
        self.id
    }
}

impl OutputRef {
    pub(crate) fn new(graph: GraphId, id: SocketId) -> Self {
        OutputRef { graph, id }
    }

    /// The graph this socket belongs to.
    pub fn graph(&self) -> GraphId {
        self.graph
    }

    /// The socket's dense id.
    pub fn id(&self) -> SocketId {
        self.id
    }
}
