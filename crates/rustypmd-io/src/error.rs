//! Error types for the I/O layer.

use std::fmt;

use rustypmd_format::FormatError;

/// Errors raised while executing I/O tasks.
#[derive(Debug)]
pub enum Error {
    /// I/O error from the filesystem.
    Io(std::io::Error),
    /// JSON (de)serialization error.
    Json(serde_json::Error),
    /// TOML parse error.
    TomlDe(toml::de::Error),
    /// TOML serialization error.
    TomlSer(toml::ser::Error),
    /// Datatype, attribute or dataset description error.
    Format(FormatError),
    /// The backend does not implement the requested operation.
    OperationUnsupportedInBackend {
        backend: String,
        operation: String,
    },
    /// The API was used in a way the backend cannot honor.
    WrongUsage(String),
    /// A file or directory does not exist.
    NoSuchFile(String),
    /// An attribute does not exist.
    NoSuchAttribute(String),
    /// A group or dataset does not exist at the requested location.
    NotFound(String),
    /// A modifying operation was requested in read-only mode.
    ReadOnly(String),
    /// A read or write request does not fit the dataset.
    DatasetMismatch(String),
    /// Invalid backend configuration.
    Config(String),
    /// Inconsistent internal state.
    Internal(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Io(e) => write!(f, "I/O error: {e}"),
            Error::Json(e) => write!(f, "JSON error: {e}"),
            Error::TomlDe(e) => write!(f, "TOML parse error: {e}"),
            Error::TomlSer(e) => write!(f, "TOML write error: {e}"),
            Error::Format(e) => write!(f, "format error: {e}"),
            Error::OperationUnsupportedInBackend { backend, operation } => {
                write!(f, "operation unsupported in backend {backend}: {operation}")
            }
            Error::WrongUsage(msg) => write!(f, "wrong usage: {msg}"),
            Error::NoSuchFile(msg) => write!(f, "no such file: {msg}"),
            Error::NoSuchAttribute(name) => write!(f, "no such attribute: {name}"),
            Error::NotFound(msg) => write!(f, "object not found: {msg}"),
            Error::ReadOnly(msg) => write!(f, "read-only: {msg}"),
            Error::DatasetMismatch(msg) => write!(f, "dataset mismatch: {msg}"),
            Error::Config(msg) => write!(f, "invalid backend configuration: {msg}"),
            Error::Internal(msg) => write!(f, "internal error: {msg}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(e) => Some(e),
            Error::Json(e) => Some(e),
            Error::TomlDe(e) => Some(e),
            Error::TomlSer(e) => Some(e),
            Error::Format(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::Io(e)
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Json(e)
    }
}

impl From<toml::de::Error> for Error {
    fn from(e: toml::de::Error) -> Self {
        Error::TomlDe(e)
    }
}

impl From<toml::ser::Error> for Error {
    fn from(e: toml::ser::Error) -> Self {
        Error::TomlSer(e)
    }
}

impl From<FormatError> for Error {
    fn from(e: FormatError) -> Self {
        Error::Format(e)
    }
}

/// Result alias for the I/O layer.
pub type Result<T> = std::result::Result<T, Error>;
