//! The datatype enumeration shared by attributes and datasets.
//!
//! Names follow the openPMD spelling (`"DOUBLE"`, `"VEC_STRING"`, ...). Parsing
//! also understands the C type names other writers emit (`"INT"`, `"ULONG"`, ...),
//! interpreted with LP64 widths.

use std::fmt;
use std::str::FromStr;

use crate::error::FormatError;

/// Element type of an attribute or a dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Datatype {
    Char,
    UChar,
    Int16,
    Int32,
    Int64,
    UInt16,
    UInt32,
    UInt64,
    Float,
    Double,
    String,
    VecChar,
    VecUChar,
    VecInt16,
    VecInt32,
    VecInt64,
    VecUInt16,
    VecUInt32,
    VecUInt64,
    VecFloat,
    VecDouble,
    VecString,
    /// Fixed array of seven doubles, used for unit dimensions.
    ArrDbl7,
    Bool,
    Undefined,
}

impl Datatype {
    /// All defined datatypes, in declaration order.
    pub const ALL: [Datatype; 24] = [
        Datatype::Char,
        Datatype::UChar,
        Datatype::Int16,
        Datatype::Int32,
        Datatype::Int64,
        Datatype::UInt16,
        Datatype::UInt32,
        Datatype::UInt64,
        Datatype::Float,
        Datatype::Double,
        Datatype::String,
        Datatype::VecChar,
        Datatype::VecUChar,
        Datatype::VecInt16,
        Datatype::VecInt32,
        Datatype::VecInt64,
        Datatype::VecUInt16,
        Datatype::VecUInt32,
        Datatype::VecUInt64,
        Datatype::VecFloat,
        Datatype::VecDouble,
        Datatype::VecString,
        Datatype::ArrDbl7,
        Datatype::Bool,
    ];

    /// Canonical upper-case name.
    pub fn name(self) -> &'static str {
        match self {
            Datatype::Char => "CHAR",
            Datatype::UChar => "UCHAR",
            Datatype::Int16 => "INT16",
            Datatype::Int32 => "INT32",
            Datatype::Int64 => "INT64",
            Datatype::UInt16 => "UINT16",
            Datatype::UInt32 => "UINT32",
            Datatype::UInt64 => "UINT64",
            Datatype::Float => "FLOAT",
            Datatype::Double => "DOUBLE",
            Datatype::String => "STRING",
            Datatype::VecChar => "VEC_CHAR",
            Datatype::VecUChar => "VEC_UCHAR",
            Datatype::VecInt16 => "VEC_INT16",
            Datatype::VecInt32 => "VEC_INT32",
            Datatype::VecInt64 => "VEC_INT64",
            Datatype::VecUInt16 => "VEC_UINT16",
            Datatype::VecUInt32 => "VEC_UINT32",
            Datatype::VecUInt64 => "VEC_UINT64",
            Datatype::VecFloat => "VEC_FLOAT",
            Datatype::VecDouble => "VEC_DOUBLE",
            Datatype::VecString => "VEC_STRING",
            Datatype::ArrDbl7 => "ARR_DBL_7",
            Datatype::Bool => "BOOL",
            Datatype::Undefined => "UNDEFINED",
        }
    }

    /// Whether this is one of the `VEC_*` types.
    pub fn is_vector(self) -> bool {
        matches!(
            self,
            Datatype::VecChar
                | Datatype::VecUChar
                | Datatype::VecInt16
                | Datatype::VecInt32
                | Datatype::VecInt64
                | Datatype::VecUInt16
                | Datatype::VecUInt32
                | Datatype::VecUInt64
                | Datatype::VecFloat
                | Datatype::VecDouble
                | Datatype::VecString
        )
    }

    /// Element type of a vector or array type; identity for scalars.
    pub fn basic_datatype(self) -> Datatype {
        match self {
            Datatype::VecChar => Datatype::Char,
            Datatype::VecUChar => Datatype::UChar,
            Datatype::VecInt16 => Datatype::Int16,
            Datatype::VecInt32 => Datatype::Int32,
            Datatype::VecInt64 => Datatype::Int64,
            Datatype::VecUInt16 => Datatype::UInt16,
            Datatype::VecUInt32 => Datatype::UInt32,
            Datatype::VecUInt64 => Datatype::UInt64,
            Datatype::VecFloat => Datatype::Float,
            Datatype::VecDouble => Datatype::Double,
            Datatype::VecString => Datatype::String,
            Datatype::ArrDbl7 => Datatype::Double,
            other => other,
        }
    }

    /// Vector type holding elements of `self`.
    ///
    /// Returns `Undefined` for types without a vector counterpart.
    pub fn to_vector_type(self) -> Datatype {
        match self {
            Datatype::Char => Datatype::VecChar,
            Datatype::UChar => Datatype::VecUChar,
            Datatype::Int16 => Datatype::VecInt16,
            Datatype::Int32 => Datatype::VecInt32,
            Datatype::Int64 => Datatype::VecInt64,
            Datatype::UInt16 => Datatype::VecUInt16,
            Datatype::UInt32 => Datatype::VecUInt32,
            Datatype::UInt64 => Datatype::VecUInt64,
            Datatype::Float => Datatype::VecFloat,
            Datatype::Double => Datatype::VecDouble,
            Datatype::String => Datatype::VecString,
            v if v.is_vector() => v,
            _ => Datatype::Undefined,
        }
    }

    /// Size in bytes of one basic element. Strings report the size of one byte.
    pub fn size(self) -> usize {
        match self.basic_datatype() {
            Datatype::Char | Datatype::UChar | Datatype::String | Datatype::Bool => 1,
            Datatype::Int16 | Datatype::UInt16 => 2,
            Datatype::Int32 | Datatype::UInt32 | Datatype::Float => 4,
            Datatype::Int64 | Datatype::UInt64 | Datatype::Double => 8,
            _ => 0,
        }
    }

    pub fn is_integer(self) -> bool {
        matches!(
            self.basic_datatype(),
            Datatype::Int16
                | Datatype::Int32
                | Datatype::Int64
                | Datatype::UInt16
                | Datatype::UInt32
                | Datatype::UInt64
        )
    }

    pub fn is_signed(self) -> bool {
        matches!(
            self.basic_datatype(),
            Datatype::Char
                | Datatype::Int16
                | Datatype::Int32
                | Datatype::Int64
                | Datatype::Float
                | Datatype::Double
        )
    }

    pub fn is_floating_point(self) -> bool {
        matches!(self.basic_datatype(), Datatype::Float | Datatype::Double)
    }

    /// Whether datasets may hold this type (scalars only, no strings).
    pub fn is_dataset_type(self) -> bool {
        !self.is_vector()
            && !matches!(
                self,
                Datatype::String | Datatype::ArrDbl7 | Datatype::Undefined
            )
    }
}

impl fmt::Display for Datatype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Datatype {
    type Err = FormatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Some(dt) = Datatype::ALL.iter().find(|d| d.name() == s) {
            return Ok(*dt);
        }
        if s == "UNDEFINED" {
            return Ok(Datatype::Undefined);
        }
        let (vector, base) = match s.strip_prefix("VEC_") {
            Some(rest) => (true, rest),
            None => (false, s),
        };
        let basic = match base {
            "SCHAR" => Datatype::Char,
            "SHORT" => Datatype::Int16,
            "INT" => Datatype::Int32,
            "LONG" | "LONGLONG" => Datatype::Int64,
            "USHORT" => Datatype::UInt16,
            "UINT" => Datatype::UInt32,
            "ULONG" | "ULONGLONG" => Datatype::UInt64,
            _ => return Err(FormatError::UnknownDatatype(s.to_string())),
        };
        Ok(if vector { basic.to_vector_type() } else { basic })
    }
}
