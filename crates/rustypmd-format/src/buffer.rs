//! Typed, contiguous payloads of dataset chunks.

use std::fmt;

use crate::attribute::{Attribute, AttributeType};
use crate::datatype::Datatype;
use crate::error::FormatError;

/// A row-major buffer of dataset elements.
#[derive(Debug, Clone, PartialEq)]
pub enum DataBuffer {
    Char(Vec<i8>),
    UChar(Vec<u8>),
    Int16(Vec<i16>),
    Int32(Vec<i32>),
    Int64(Vec<i64>),
    UInt16(Vec<u16>),
    UInt32(Vec<u32>),
    UInt64(Vec<u64>),
    Float(Vec<f32>),
    Double(Vec<f64>),
    Bool(Vec<bool>),
}

/// Apply `$body` to the vector inside any [`DataBuffer`] variant.
#[macro_export]
macro_rules! with_buffer {
    ($buf:expr, $v:ident => $body:expr) => {
        match $buf {
            $crate::DataBuffer::Char($v) => $body,
            $crate::DataBuffer::UChar($v) => $body,
            $crate::DataBuffer::Int16($v) => $body,
            $crate::DataBuffer::Int32($v) => $body,
            $crate::DataBuffer::Int64($v) => $body,
            $crate::DataBuffer::UInt16($v) => $body,
            $crate::DataBuffer::UInt32($v) => $body,
            $crate::DataBuffer::UInt64($v) => $body,
            $crate::DataBuffer::Float($v) => $body,
            $crate::DataBuffer::Double($v) => $body,
            $crate::DataBuffer::Bool($v) => $body,
        }
    };
}

impl DataBuffer {
    pub fn dtype(&self) -> Datatype {
        match self {
            DataBuffer::Char(_) => Datatype::Char,
            DataBuffer::UChar(_) => Datatype::UChar,
            DataBuffer::Int16(_) => Datatype::Int16,
            DataBuffer::Int32(_) => Datatype::Int32,
            DataBuffer::Int64(_) => Datatype::Int64,
            DataBuffer::UInt16(_) => Datatype::UInt16,
            DataBuffer::UInt32(_) => Datatype::UInt32,
            DataBuffer::UInt64(_) => Datatype::UInt64,
            DataBuffer::Float(_) => Datatype::Float,
            DataBuffer::Double(_) => Datatype::Double,
            DataBuffer::Bool(_) => Datatype::Bool,
        }
    }

    pub fn len(&self) -> usize {
        with_buffer!(self, v => v.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// A buffer of `n` default (zero/false) elements of type `dtype`.
    ///
    /// Returns `None` if `dtype` cannot be stored in a dataset.
    pub fn filled(dtype: Datatype, n: usize) -> Option<DataBuffer> {
        Some(match dtype {
            Datatype::Char => DataBuffer::Char(vec![0; n]),
            Datatype::UChar => DataBuffer::UChar(vec![0; n]),
            Datatype::Int16 => DataBuffer::Int16(vec![0; n]),
            Datatype::Int32 => DataBuffer::Int32(vec![0; n]),
            Datatype::Int64 => DataBuffer::Int64(vec![0; n]),
            Datatype::UInt16 => DataBuffer::UInt16(vec![0; n]),
            Datatype::UInt32 => DataBuffer::UInt32(vec![0; n]),
            Datatype::UInt64 => DataBuffer::UInt64(vec![0; n]),
            Datatype::Float => DataBuffer::Float(vec![0.0; n]),
            Datatype::Double => DataBuffer::Double(vec![0.0; n]),
            Datatype::Bool => DataBuffer::Bool(vec![false; n]),
            _ => return None,
        })
    }

    /// Move the elements out as `Vec<T>`; the buffer type must match `T` exactly.
    pub fn into_vec<T: Element>(self) -> Result<Vec<T>, FormatError> {
        T::from_buffer(self).map_err(|found| FormatError::BufferType {
            found: found.dtype(),
            expected: T::DATATYPE,
        })
    }
}

impl fmt::Display for DataBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[{}]", self.dtype(), self.len())
    }
}

/// Rust primitives that can be stored in datasets.
pub trait Element:
    Copy + Default + PartialEq + fmt::Debug + Send + Sync + Into<Attribute> + AttributeType + 'static
{
    const DATATYPE: Datatype;

    fn into_buffer(data: Vec<Self>) -> DataBuffer;

    /// Unwrap a buffer of this type, handing it back unchanged on mismatch.
    fn from_buffer(buffer: DataBuffer) -> Result<Vec<Self>, DataBuffer>;
}

macro_rules! impl_element {
    ($($t:ty => $variant:ident;)*) => {
        $(
            impl Element for $t {
                const DATATYPE: Datatype = Datatype::$variant;

                fn into_buffer(data: Vec<Self>) -> DataBuffer {
                    DataBuffer::$variant(data)
                }

                fn from_buffer(buffer: DataBuffer) -> Result<Vec<Self>, DataBuffer> {
                    match buffer {
                        DataBuffer::$variant(v) => Ok(v),
                        other => Err(other),
                    }
                }
            }

            impl From<Vec<$t>> for DataBuffer {
                fn from(v: Vec<$t>) -> Self {
                    DataBuffer::$variant(v)
                }
            }
        )*
    };
}

impl_element! {
    i8 => Char;
    u8 => UChar;
    i16 => Int16;
    i32 => Int32;
    i64 => Int64;
    u16 => UInt16;
    u32 => UInt32;
    u64 => UInt64;
    f32 => Float;
    f64 => Double;
    bool => Bool;
}
