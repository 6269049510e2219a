//! Node payloads shared by the builder graph and the finalized network.
//!
//! Every node is either an [`OperationNode`], which wraps an
//! [`OperationDescriptor`] and maps each of its sockets to a descriptor
//! parameter, or a [`DummyNode`], an interface stub whose socket types were
//! declared directly. Socket lists and ids live in the owning container; this
//! module only holds what differs between the two kinds.

use std::sync::Arc;

use crate::descriptor::OperationDescriptor;
use crate::types::{DataType, SocketDirection};

/// Payload of a node.
#[derive(Debug, Clone)]
pub enum NodeKind {
    Operation(OperationNode),
    Dummy(DummyNode),
}

/// A node wrapping an external operation.
#[derive(Debug, Clone)]
pub struct OperationNode {
    /// The wrapped operation. Shared, never mutated.
    pub descriptor: Arc<dyn OperationDescriptor>,
    /// `input_param_indices[i]` is the parameter behind input socket `i`.
    pub input_param_indices: Vec<usize>,
    /// `output_param_indices[i]` is the parameter behind output socket `i`.
    pub output_param_indices: Vec<usize>,
}

/// An external interface stub.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DummyNode {
    pub name: String,
    pub input_names: Vec<String>,
    pub output_names: Vec<String>,
}

impl DummyNode {
    /// Name used when the caller gives none.
    pub const DEFAULT_NAME: &'static str = "Dummy";

    /// Dummy with the default name and sockets named after their types.
    pub fn unnamed(input_types: &[DataType], output_types: &[DataType]) -> Self {
        DummyNode {
            name: Self::DEFAULT_NAME.to_string(),
            input_names: input_types.iter().map(ToString::to_string).collect(),
            output_names: output_types.iter().map(ToString::to_string).collect(),
        }
    }
}

impl NodeKind {
    pub fn is_dummy(&self) -> bool {
        matches!(self, NodeKind::Dummy(_))
    }

    pub fn is_operation(&self) -> bool {
        matches!(self, NodeKind::Operation(_))
    }

    /// Operation name or dummy name.
    pub fn name(&self) -> &str {
        match self {
            NodeKind::Operation(op) => op.descriptor.name(),
            NodeKind::Dummy(dummy) => &dummy.name,
        }
    }

    /// The wrapped descriptor, for operation nodes.
    pub fn descriptor(&self) -> Option<&Arc<dyn OperationDescriptor>> {
        match self {
            NodeKind::Operation(op) => Some(&op.descriptor),
            NodeKind::Dummy(_) => None,
        }
    }

    /// The descriptor parameter behind socket `index` on `direction`.
    pub fn param_index(&self, direction: SocketDirection, index: usize) -> Option<usize> {
        match self {
            NodeKind::Operation(op) => match direction {
                SocketDirection::Input => op.input_param_indices.get(index).copied(),
                SocketDirection::Output => op.output_param_indices.get(index).copied(),
            },
            NodeKind::Dummy(_) => None,
        }
    }

    /// Display name of socket `index` on `direction`.
    ///
    /// Operation sockets are named after their descriptor parameter.
    pub fn socket_name(&self, direction: SocketDirection, index: usize) -> &str {
        match self {
            NodeKind::Operation(op) => match self.param_index(direction, index) {
                Some(param) => op.descriptor.param_name(param),
                None => "",
            },
            NodeKind::Dummy(dummy) => {
                let names = match direction {
                    SocketDirection::Input => &dummy.input_names,
                    SocketDirection::Output => &dummy.output_names,
                };
                names.get(index).map(String::as_str).unwrap_or("")
            }
        }
    }
}
