//! Data-flow network construction and finalization.
//!
//! A network is a bipartite graph of nodes and typed sockets. Nodes either
//! wrap an [`OperationDescriptor`] or are dummy interface stubs; links run
//! from an output socket to any number of input sockets, and every input has
//! at most one origin.
//!
//! Networks are built incrementally in a [`BuilderGraph`] and then
//! [finalized](BuilderGraph::finalize) into an immutable [`Network`] with the
//! same dense node and socket ids, ready to be walked by an execution engine.

pub(crate) mod analysis;
pub mod arena;
pub mod builder;
pub mod descriptor;
pub(crate) mod dot;
pub mod error;
pub mod finalize;
pub mod id;
pub mod network;
pub mod node;
pub mod types;

// Re-export commonly used types
pub use builder::BuilderGraph;
pub use descriptor::{natural_param_indices, OperationDescriptor, ParamKind, ParamType, Signature};
pub use error::NetworkError;
pub use finalize::FinalizeConfig;
pub use id::{GraphId, InputRef, NodeId, NodeRef, OutputRef, SocketId};
pub use network::{InputView, Network, NodeView, OutputView};
pub use node::{DummyNode, NodeKind, OperationNode};
pub use types::{DataType, ScalarType, SocketDirection};
