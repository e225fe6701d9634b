//! Error type of the data model.

use std::fmt;

use rustypmd_format::FormatError;

/// Errors raised by series, iterations, records and their components.
#[derive(Debug)]
pub enum Error {
    /// A task failed in the I/O layer or backend.
    Io(rustypmd_io::Error),
    /// Datatype or attribute conversion error.
    Format(FormatError),
    /// Requested attribute does not exist.
    NoSuchAttribute(String),
    /// The API was called in an order or mode that is not allowed.
    WrongApiUsage(String),
    /// Valid API use that the selected openPMD standard version forbids.
    IllegalInOpenPmdStandard(String),
    /// Data read from a file does not form a valid series.
    ReadError(String),
    /// Inconsistent internal state.
    Internal(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Io(e) => write!(f, "{e}"),
            Error::Format(e) => write!(f, "{e}"),
            Error::NoSuchAttribute(key) => write!(f, "no such attribute: {key}"),
            Error::WrongApiUsage(msg) => write!(f, "wrong API usage: {msg}"),
            Error::IllegalInOpenPmdStandard(msg) => {
                write!(f, "illegal in the selected openPMD standard: {msg}")
            }
            Error::ReadError(msg) => write!(f, "read error: {msg}"),
            Error::Internal(msg) => write!(f, "internal error: {msg}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(e) => Some(e),
            Error::Format(e) => Some(e),
            _ => None,
        }
    }
}

impl From<rustypmd_io::Error> for Error {
    fn from(e: rustypmd_io::Error) -> Self {
        match e {
            rustypmd_io::Error::NoSuchAttribute(key) => Error::NoSuchAttribute(key),
            other => Error::Io(other),
        }
    }
}

impl From<FormatError> for Error {
    fn from(e: FormatError) -> Self {
        Error::Format(e)
    }
}

/// Result alias for the data model.
pub type Result<T> = std::result::Result<T, Error>;
