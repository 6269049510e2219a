//! Data types carried by sockets.
//!
//! A socket carries either a single value or a vector of values of one
//! [`ScalarType`]. The type is fixed when the socket is created and is never
//! checked across links; matching types is the caller's job.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Element types a socket can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ScalarType {
    Bool,
    I32,
    I64,
    F32,
    F64,
    /// Three packed `f32` components (positions, normals, colors).
    Float3,
    String,
}

/// Socket data type: one value, or a vector of values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DataType {
    Single(ScalarType),
    Vector(ScalarType),
}

impl DataType {
    /// Returns `true` for [`DataType::Single`].
    pub fn is_single(&self) -> bool {
        matches!(self, DataType::Single(_))
    }

    /// Returns `true` for [`DataType::Vector`].
    pub fn is_vector(&self) -> bool {
        matches!(self, DataType::Vector(_))
    }

    /// The element type, regardless of category.
    pub fn scalar(&self) -> ScalarType {
        match self {
            DataType::Single(scalar) | DataType::Vector(scalar) => *scalar,
        }
    }
}

impl fmt::Display for ScalarType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ScalarType::Bool => "bool",
            ScalarType::I32 => "i32",
            ScalarType::I64 => "i64",
            ScalarType::F32 => "f32",
            ScalarType::F64 => "f64",
            ScalarType::Float3 => "float3",
            ScalarType::String => "string",
        };
        f.write_str(name)
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataType::Single(scalar) => write!(f, "{scalar}"),
            DataType::Vector(scalar) => write!(f, "[{scalar}]"),
        }
    }
}

/// Which side of a node a socket sits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SocketDirection {
    Input,
    Output,
}

impl fmt::Display for SocketDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SocketDirection::Input => f.write_str("input"),
            SocketDirection::Output => f.write_str("output"),
        }
    }
}
