//! Backend implementations and the factory selecting one per format.

pub mod dummy;
pub mod json;

use std::path::PathBuf;

pub use dummy::DummyIoHandlerImpl;
pub use json::{Dialect, JsonFilePosition, JsonIoHandlerImpl};

use crate::access::Access;
use crate::config::BackendConfig;
use crate::error::{Error, Result};
use crate::format::Format;
use crate::handler::AbstractIoHandler;

/// Build the handler for `format`, rooted at `directory`.
///
/// HDF5 and ADIOS2 formats are recognized but have no backend in this build.
pub fn create_io_handler(
    directory: impl Into<PathBuf>,
    access: Access,
    format: Format,
    config: &BackendConfig,
) -> Result<AbstractIoHandler> {
    let directory = directory.into();
    let backend: Box<dyn crate::handler::AbstractIoHandlerImpl> = match format {
        Format::Json => Box::new(
            JsonIoHandlerImpl::new(&directory, access, Dialect::Json)
                .with_indent(config.json.indent),
        ),
        Format::Toml => Box::new(JsonIoHandlerImpl::new(&directory, access, Dialect::Toml)),
        Format::Dummy => Box::new(DummyIoHandlerImpl),
        Format::Hdf5 => return Err(unavailable("HDF5")),
        f if f.is_adios2() => return Err(unavailable("ADIOS2")),
        f => return Err(Error::Internal(format!("no backend for format {f}"))),
    };
    log::debug!("created {} handler in {}", backend.backend_name(), directory.display());
    Ok(AbstractIoHandler::new(directory, access, format, backend))
}

fn unavailable(backend: &str) -> Error {
    Error::OperationUnsupportedInBackend {
        backend: backend.to_string(),
        operation: "backend not available in this build".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unavailable_backends() {
        let cfg = BackendConfig::default();
        for format in [Format::Hdf5, Format::Adios2Bp4, Format::Adios2Sst] {
            match create_io_handler("out", Access::Create, format, &cfg) {
                Err(Error::OperationUnsupportedInBackend { .. }) => {}
                Err(e) => panic!("unexpected error for {format}: {e}"),
                Ok(_) => panic!("{format} should not be available"),
            }
        }
    }

    #[test]
    fn json_and_dummy_available() {
        let cfg = BackendConfig::default();
        let h = create_io_handler("out", Access::ReadOnly, Format::Json, &cfg).unwrap();
        assert_eq!(h.backend_name(), "JSON");
        assert_eq!(h.access(), Access::ReadOnly);
        let h = create_io_handler("out", Access::Create, Format::Dummy, &cfg).unwrap();
        assert_eq!(h.backend_name(), "DUMMY");
    }
}
