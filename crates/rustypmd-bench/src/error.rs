//! Error type of the benchmark.

use std::fmt;

use rustypmd_format::FormatError;

#[derive(Debug)]
pub enum Error {
    /// Writing or reading the benchmark series failed.
    Series(rustypmd::Error),
    /// Invalid dataset settings, e.g. an unknown compression.
    Format(FormatError),
    InvalidConfig(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Series(e) => write!(f, "series error: {e}"),
            Error::Format(e) => write!(f, "{e}"),
            Error::InvalidConfig(msg) => write!(f, "invalid benchmark configuration: {msg}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Series(e) => Some(e),
            Error::Format(e) => Some(e),
            Error::InvalidConfig(_) => None,
        }
    }
}

impl From<rustypmd::Error> for Error {
    fn from(e: rustypmd::Error) -> Self {
        Error::Series(e)
    }
}

impl From<FormatError> for Error {
    fn from(e: FormatError) -> Self {
        Error::Format(e)
    }
}

pub type Result<T> = std::result::Result<T, Error>;
