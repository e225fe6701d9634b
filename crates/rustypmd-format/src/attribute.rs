//! Typed attribute values and conversion into Rust types.
//!
//! An [`Attribute`] stores exactly one of the supported [`Datatype`]s. Reading it
//! back goes through [`AttributeType`], which applies the lenient numeric
//! conversions scientific files rely on: a `FLOAT` attribute can be read as
//! `f64`, an `INT32` as `u64`, a scalar as a one-element vector.

use crate::datatype::Datatype;
use crate::error::FormatError;

/// A single attribute value.
#[derive(Debug, Clone, PartialEq)]
pub enum Attribute {
    Char(i8),
    UChar(u8),
    Int16(i16),
    Int32(i32),
    Int64(i64),
    UInt16(u16),
    UInt32(u32),
    UInt64(u64),
    Float(f32),
    Double(f64),
    String(String),
    VecChar(Vec<i8>),
    VecUChar(Vec<u8>),
    VecInt16(Vec<i16>),
    VecInt32(Vec<i32>),
    VecInt64(Vec<i64>),
    VecUInt16(Vec<u16>),
    VecUInt32(Vec<u32>),
    VecUInt64(Vec<u64>),
    VecFloat(Vec<f32>),
    VecDouble(Vec<f64>),
    VecString(Vec<String>),
    ArrDbl7([f64; 7]),
    Bool(bool),
}

impl Attribute {
    /// Datatype tag of the stored value.
    pub fn dtype(&self) -> Datatype {
        match self {
            Attribute::Char(_) => Datatype::Char,
            Attribute::UChar(_) => Datatype::UChar,
            Attribute::Int16(_) => Datatype::Int16,
            Attribute::Int32(_) => Datatype::Int32,
            Attribute::Int64(_) => Datatype::Int64,
            Attribute::UInt16(_) => Datatype::UInt16,
            Attribute::UInt32(_) => Datatype::UInt32,
            Attribute::UInt64(_) => Datatype::UInt64,
            Attribute::Float(_) => Datatype::Float,
            Attribute::Double(_) => Datatype::Double,
            Attribute::String(_) => Datatype::String,
            Attribute::VecChar(_) => Datatype::VecChar,
            Attribute::VecUChar(_) => Datatype::VecUChar,
            Attribute::VecInt16(_) => Datatype::VecInt16,
            Attribute::VecInt32(_) => Datatype::VecInt32,
            Attribute::VecInt64(_) => Datatype::VecInt64,
            Attribute::VecUInt16(_) => Datatype::VecUInt16,
            Attribute::VecUInt32(_) => Datatype::VecUInt32,
            Attribute::VecUInt64(_) => Datatype::VecUInt64,
            Attribute::VecFloat(_) => Datatype::VecFloat,
            Attribute::VecDouble(_) => Datatype::VecDouble,
            Attribute::VecString(_) => Datatype::VecString,
            Attribute::ArrDbl7(_) => Datatype::ArrDbl7,
            Attribute::Bool(_) => Datatype::Bool,
        }
    }

    /// Convert the value into `T`.
    pub fn get<T: AttributeType>(&self) -> Result<T, FormatError> {
        T::from_attribute(self)
    }

    /// Borrow the value as a string slice if it is a `STRING`.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Attribute::String(s) => Some(s),
            _ => None,
        }
    }
}

/// Rust types an [`Attribute`] can be read into.
pub trait AttributeType: Sized {
    fn from_attribute(attr: &Attribute) -> Result<Self, FormatError>;
}

fn conversion_error(attr: &Attribute, to: &'static str) -> FormatError {
    FormatError::AttributeConversion {
        from: attr.dtype(),
        to,
    }
}

macro_rules! numeric_scalar {
    ($attr:expr, $t:ty) => {
        match $attr {
            Attribute::Char(v) => Some(*v as $t),
            Attribute::UChar(v) => Some(*v as $t),
            Attribute::Int16(v) => Some(*v as $t),
            Attribute::Int32(v) => Some(*v as $t),
            Attribute::Int64(v) => Some(*v as $t),
            Attribute::UInt16(v) => Some(*v as $t),
            Attribute::UInt32(v) => Some(*v as $t),
            Attribute::UInt64(v) => Some(*v as $t),
            Attribute::Float(v) => Some(*v as $t),
            Attribute::Double(v) => Some(*v as $t),
            _ => None,
        }
    };
}

macro_rules! numeric_vector {
    ($attr:expr, $t:ty) => {
        match $attr {
            Attribute::VecChar(v) => Some(v.iter().map(|x| *x as $t).collect()),
            Attribute::VecUChar(v) => Some(v.iter().map(|x| *x as $t).collect()),
            Attribute::VecInt16(v) => Some(v.iter().map(|x| *x as $t).collect()),
            Attribute::VecInt32(v) => Some(v.iter().map(|x| *x as $t).collect()),
            Attribute::VecInt64(v) => Some(v.iter().map(|x| *x as $t).collect()),
            Attribute::VecUInt16(v) => Some(v.iter().map(|x| *x as $t).collect()),
            Attribute::VecUInt32(v) => Some(v.iter().map(|x| *x as $t).collect()),
            Attribute::VecUInt64(v) => Some(v.iter().map(|x| *x as $t).collect()),
            Attribute::VecFloat(v) => Some(v.iter().map(|x| *x as $t).collect()),
            Attribute::VecDouble(v) => Some(v.iter().map(|x| *x as $t).collect()),
            Attribute::ArrDbl7(v) => Some(v.iter().map(|x| *x as $t).collect()),
            other => numeric_scalar!(other, $t).map(|x| vec![x]),
        }
    };
}

macro_rules! impl_numeric {
    ($($t:ty => $scalar:ident, $vector:ident;)*) => {
        $(
            impl AttributeType for $t {
                fn from_attribute(attr: &Attribute) -> Result<Self, FormatError> {
                    numeric_scalar!(attr, $t).ok_or_else(|| conversion_error(attr, stringify!($t)))
                }
            }

            impl AttributeType for Vec<$t> {
                fn from_attribute(attr: &Attribute) -> Result<Self, FormatError> {
                    numeric_vector!(attr, $t)
                        .ok_or_else(|| conversion_error(attr, concat!("Vec<", stringify!($t), ">")))
                }
            }

            impl From<$t> for Attribute {
                fn from(v: $t) -> Self {
                    Attribute::$scalar(v)
                }
            }

            impl From<Vec<$t>> for Attribute {
                fn from(v: Vec<$t>) -> Self {
                    Attribute::$vector(v)
                }
            }

            impl From<&[$t]> for Attribute {
                fn from(v: &[$t]) -> Self {
                    Attribute::$vector(v.to_vec())
                }
            }
        )*
    };
}

impl_numeric! {
    i8 => Char, VecChar;
    u8 => UChar, VecUChar;
    i16 => Int16, VecInt16;
    i32 => Int32, VecInt32;
    i64 => Int64, VecInt64;
    u16 => UInt16, VecUInt16;
    u32 => UInt32, VecUInt32;
    u64 => UInt64, VecUInt64;
    f32 => Float, VecFloat;
    f64 => Double, VecDouble;
}

impl AttributeType for bool {
    fn from_attribute(attr: &Attribute) -> Result<Self, FormatError> {
        match attr {
            Attribute::Bool(b) => Ok(*b),
            _ => Err(conversion_error(attr, "bool")),
        }
    }
}

impl AttributeType for String {
    fn from_attribute(attr: &Attribute) -> Result<Self, FormatError> {
        match attr {
            Attribute::String(s) => Ok(s.clone()),
            Attribute::Char(c) => Ok(char::from(*c as u8).to_string()),
            Attribute::UChar(c) => Ok(char::from(*c).to_string()),
            Attribute::VecChar(chars) => Ok(chars.iter().map(|c| char::from(*c as u8)).collect()),
            _ => Err(conversion_error(attr, "String")),
        }
    }
}

impl AttributeType for Vec<String> {
    fn from_attribute(attr: &Attribute) -> Result<Self, FormatError> {
        match attr {
            Attribute::VecString(v) => Ok(v.clone()),
            Attribute::String(s) => Ok(vec![s.clone()]),
            _ => Err(conversion_error(attr, "Vec<String>")),
        }
    }
}

impl AttributeType for [f64; 7] {
    fn from_attribute(attr: &Attribute) -> Result<Self, FormatError> {
        if let Attribute::ArrDbl7(a) = attr {
            return Ok(*a);
        }
        let values: Vec<f64> = numeric_vector!(attr, f64)
            .ok_or_else(|| conversion_error(attr, "[f64; 7]"))?;
        values
            .try_into()
            .map_err(|_| conversion_error(attr, "[f64; 7]"))
    }
}

impl AttributeType for Attribute {
    fn from_attribute(attr: &Attribute) -> Result<Self, FormatError> {
        Ok(attr.clone())
    }
}

impl From<bool> for Attribute {
    fn from(v: bool) -> Self {
        Attribute::Bool(v)
    }
}

impl From<String> for Attribute {
    fn from(v: String) -> Self {
        Attribute::String(v)
    }
}

impl From<&str> for Attribute {
    fn from(v: &str) -> Self {
        Attribute::String(v.to_string())
    }
}

impl From<Vec<String>> for Attribute {
    fn from(v: Vec<String>) -> Self {
        Attribute::VecString(v)
    }
}

impl From<Vec<&str>> for Attribute {
    fn from(v: Vec<&str>) -> Self {
        Attribute::VecString(v.into_iter().map(str::to_string).collect())
    }
}

impl From<[f64; 7]> for Attribute {
    fn from(v: [f64; 7]) -> Self {
        Attribute::ArrDbl7(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // -----------------------------------------------------------------------
    // Scalars
    // -----------------------------------------------------------------------

    #[test]
    fn numeric_widening_and_narrowing() {
        let a = Attribute::from(2.5f32);
        assert_eq!(a.dtype(), Datatype::Float);
        assert_eq!(a.get::<f64>().unwrap(), 2.5);
        assert_eq!(Attribute::from(7i32).get::<u64>().unwrap(), 7);
        assert_eq!(Attribute::from(300u16).get::<f32>().unwrap(), 300.0);
    }

    #[test]
    fn string_rejects_numeric_target() {
        let err = Attribute::from("cartesian").get::<f64>().unwrap_err();
        assert_eq!(
            err,
            FormatError::AttributeConversion {
                from: Datatype::String,
                to: "f64"
            }
        );
    }

    #[test]
    fn char_reads_as_string() {
        let a = Attribute::Char(b'C' as i8);
        assert_eq!(a.get::<String>().unwrap(), "C");
    }

    // -----------------------------------------------------------------------
    // Vectors and arrays
    // -----------------------------------------------------------------------

    #[test]
    fn scalar_promotes_to_vector() {
        assert_eq!(Attribute::from(1.0f64).get::<Vec<f32>>().unwrap(), vec![1.0f32]);
        assert_eq!(
            Attribute::from("x").get::<Vec<String>>().unwrap(),
            vec!["x".to_string()]
        );
    }

    #[test]
    fn vector_to_array() {
        let a = Attribute::from(vec![1.0f64, 0.0, -2.0, 0.0, 0.0, 0.0, 0.0]);
        assert_eq!(
            a.get::<[f64; 7]>().unwrap(),
            [1.0, 0.0, -2.0, 0.0, 0.0, 0.0, 0.0]
        );
        assert!(Attribute::from(vec![1.0f64; 3]).get::<[f64; 7]>().is_err());
    }

    #[test]
    fn bool_is_strict() {
        assert!(Attribute::from(true).get::<bool>().unwrap());
        assert!(Attribute::from(1u8).get::<bool>().is_err());
        assert!(Attribute::from(true).get::<i32>().is_err());
    }
}
