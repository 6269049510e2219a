//! Error types for flownet-core.
//!
//! Every variant is a precondition violation by the (trusted) caller rather
//! than a runtime condition an end user could fix. They are reported through
//! `Result` so callers can stop at the first one with `?`.

use thiserror::Error;

use crate::descriptor::ParamKind;
use crate::id::{GraphId, NodeId, SocketId};
use crate::types::SocketDirection;

/// Errors produced while building, finalizing or querying a graph.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NetworkError {
    /// A parameter index appears twice in one socket mapping.
    #[error("parameter {param} appears twice in the {direction} mapping")]
    DuplicateParam {
        param: usize,
        direction: SocketDirection,
    },

    /// A parameter index is beyond the descriptor's parameter count.
    #[error("parameter {param} out of range (descriptor has {count} parameters)")]
    ParamOutOfRange { param: usize, count: usize },

    /// A parameter is mapped to a socket side its kind does not allow.
    #[error("{kind} parameter {param} cannot be mapped to an {direction} socket")]
    ParamDirectionMismatch {
        param: usize,
        kind: ParamKind,
        direction: SocketDirection,
    },

    /// A parameter is missing from the mapping its kind requires.
    #[error("{kind} parameter {param} is missing from the {direction} mapping")]
    MissingParam {
        param: usize,
        kind: ParamKind,
        direction: SocketDirection,
    },

    /// The input socket already has an origin.
    #[error("input socket {input} is already linked to output socket {origin}")]
    InputAlreadyLinked { input: SocketId, origin: SocketId },

    /// A handle from a different graph instance was passed in.
    #[error("handle belongs to graph {found}, expected graph {expected}")]
    ForeignHandle { expected: GraphId, found: GraphId },

    /// Finalization found an input socket without origin.
    #[error("input socket {input} of node {node} has no origin")]
    UnlinkedInput { input: SocketId, node: NodeId },

    /// The graph contains a cycle through this node.
    #[error("graph contains a cycle through node {node}")]
    Cycle { node: NodeId },

    /// An internal invariant was violated.
    #[error("graph inconsistency: {reason}")]
    GraphInconsistency { reason: String },
}
