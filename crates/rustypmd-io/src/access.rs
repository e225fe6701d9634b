//! File access modes.

use std::fmt;

/// How a series and its files are opened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Access {
    /// Open existing data, no modification.
    ReadOnly,
    /// Open existing data and allow modification and extension.
    ReadWrite,
    /// Create new data, overwriting existing files.
    Create,
}

impl Access {
    pub fn is_read_only(self) -> bool {
        self == Access::ReadOnly
    }
}

impl fmt::Display for Access {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Access::ReadOnly => write!(f, "READ_ONLY"),
            Access::ReadWrite => write!(f, "READ_WRITE"),
            Access::Create => write!(f, "CREATE"),
        }
    }
}
