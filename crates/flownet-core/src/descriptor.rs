//! Operation descriptors: the external description an operation node wraps.
//!
//! The graph never looks inside an operation. It only needs to enumerate the
//! parameters of an [`OperationDescriptor`], know whether each one is read,
//! written, or both, and know the data type it carries. [`Signature`] is a
//! plain implementation for callers that have no richer descriptor type.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::types::{DataType, SocketDirection};

/// How an operation uses one of its parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ParamKind {
    /// Read only. Becomes an input socket.
    Input,
    /// Written only. Becomes an output socket.
    Output,
    /// Read and written in place. Becomes one input and one output socket.
    Mutable,
}

impl ParamKind {
    pub fn is_input_or_mutable(&self) -> bool {
        matches!(self, ParamKind::Input | ParamKind::Mutable)
    }

    pub fn is_output_or_mutable(&self) -> bool {
        matches!(self, ParamKind::Output | ParamKind::Mutable)
    }

    /// Returns `true` if a parameter of this kind gets a socket on `direction`.
    pub fn has_socket(&self, direction: SocketDirection) -> bool {
        match direction {
            SocketDirection::Input => self.is_input_or_mutable(),
            SocketDirection::Output => self.is_output_or_mutable(),
        }
    }
}

impl fmt::Display for ParamKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamKind::Input => f.write_str("input"),
            ParamKind::Output => f.write_str("output"),
            ParamKind::Mutable => f.write_str("mutable"),
        }
    }
}

/// Kind and data type of one parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ParamType {
    pub kind: ParamKind,
    pub data_type: DataType,
}

impl ParamType {
    pub fn input(data_type: DataType) -> Self {
        ParamType {
            kind: ParamKind::Input,
            data_type,
        }
    }

    pub fn output(data_type: DataType) -> Self {
        ParamType {
            kind: ParamKind::Output,
            data_type,
        }
    }

    pub fn mutable(data_type: DataType) -> Self {
        ParamType {
            kind: ParamKind::Mutable,
            data_type,
        }
    }
}

/// Capability an operation node needs from the operation it wraps.
///
/// Descriptors are shared between the builder and the finalized network
/// (and possibly across threads), so they must be immutable and
/// `Send + Sync`. Parameter indices run from `0` to `param_count() - 1`;
/// callers never pass an index outside that range.
pub trait OperationDescriptor: fmt::Debug + Send + Sync {
    /// Human readable operation name.
    fn name(&self) -> &str;

    /// Number of parameters.
    fn param_count(&self) -> usize;

    /// Kind and data type of parameter `index`.
    fn param_type(&self, index: usize) -> ParamType;

    /// Display name of parameter `index`.
    fn param_name(&self, index: usize) -> &str;
}

/// Returns the canonical socket mappings for `descriptor`: every
/// input-or-mutable parameter in order as inputs, every output-or-mutable
/// parameter in order as outputs.
pub fn natural_param_indices(descriptor: &dyn OperationDescriptor) -> (Vec<usize>, Vec<usize>) {
    let mut inputs = Vec::new();
    let mut outputs = Vec::new();
    for index in 0..descriptor.param_count() {
        let kind = descriptor.param_type(index).kind;
        if kind.is_input_or_mutable() {
            inputs.push(index);
        }
        if kind.is_output_or_mutable() {
            outputs.push(index);
        }
    }
    (inputs, outputs)
}

// ---------------------------------------------------------------------------
// Signature
// ---------------------------------------------------------------------------

/// One named parameter of a [`Signature`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Param {
    pub name: String,
    pub param_type: ParamType,
}

/// A named, ordered parameter list implementing [`OperationDescriptor`].
///
/// ```
/// use flownet_core::descriptor::{OperationDescriptor, Signature};
/// use flownet_core::types::{DataType, ScalarType};
///
/// let float = DataType::Single(ScalarType::F32);
/// let add = Signature::new("add")
///     .input("a", float)
///     .input("b", float)
///     .output("sum", float);
/// assert_eq!(add.param_count(), 3);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Signature {
    name: String,
    params: Vec<Param>,
}

impl Signature {
    pub fn new(name: impl Into<String>) -> Self {
        Signature {
            name: name.into(),
            params: Vec::new(),
        }
    }

    /// Appends a parameter.
    pub fn param(mut self, name: impl Into<String>, param_type: ParamType) -> Self {
        self.params.push(Param {
            name: name.into(),
            param_type,
        });
        self
    }

    pub fn input(self, name: impl Into<String>, data_type: DataType) -> Self {
        self.param(name, ParamType::input(data_type))
    }

    pub fn output(self, name: impl Into<String>, data_type: DataType) -> Self {
        self.param(name, ParamType::output(data_type))
    }

    pub fn mutable(self, name: impl Into<String>, data_type: DataType) -> Self {
        self.param(name, ParamType::mutable(data_type))
    }

    pub fn params(&self) -> &[Param] {
        &self.params
    }
}

impl OperationDescriptor for Signature {
    fn name(&self) -> &str {
        &self.name
    }

    fn param_count(&self) -> usize {
        self.params.len()
    }

    fn param_type(&self, index: usize) -> ParamType {
        self.params[index].param_type
    }

    fn param_name(&self, index: usize) -> &str {
        &self.params[index].name
    }
}
