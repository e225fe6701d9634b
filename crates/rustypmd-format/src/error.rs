//! Error types for datatype, attribute and dataset handling.

use std::fmt;

use crate::datatype::Datatype;

/// Errors raised by the pure data types of this crate.
#[derive(Debug, Clone, PartialEq)]
pub enum FormatError {
    /// A datatype name could not be parsed.
    UnknownDatatype(String),
    /// An attribute could not be converted to the requested Rust type.
    AttributeConversion {
        /// Datatype stored in the attribute.
        from: Datatype,
        /// Name of the requested Rust type.
        to: &'static str,
    },
    /// A dataset could not be extended to the requested extent.
    DatasetExtend(String),
    /// A chunk size does not fit the dataset.
    InvalidChunkSize(String),
    /// Unknown compression format or out-of-range level.
    InvalidCompression(String),
    /// A buffer holds a different element type than requested.
    BufferType {
        /// Datatype of the buffer.
        found: Datatype,
        /// Requested datatype.
        expected: Datatype,
    },
}

impl fmt::Display for FormatError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FormatError::UnknownDatatype(name) => write!(f, "unknown datatype: {name}"),
            FormatError::AttributeConversion { from, to } => {
                write!(f, "cannot convert attribute of type {from} to {to}")
            }
            FormatError::DatasetExtend(msg) => write!(f, "cannot extend dataset: {msg}"),
            FormatError::InvalidChunkSize(msg) => write!(f, "invalid chunk size: {msg}"),
            FormatError::InvalidCompression(msg) => write!(f, "invalid compression: {msg}"),
            FormatError::BufferType { found, expected } => {
                write!(f, "buffer holds {found}, expected {expected}")
            }
        }
    }
}

impl std::error::Error for FormatError {}
