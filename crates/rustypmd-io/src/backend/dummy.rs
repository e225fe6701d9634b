//! A backend that accepts every modifying task and stores nothing.

use rustypmd_format::{Attribute, DataBuffer, Dataset, Extent, Offset};

use crate::error::Result;
use crate::handler::AbstractIoHandlerImpl;
use crate::writable::Writable;

/// No-op backend, used when no storage is wanted.
///
/// Reads are unsupported since there is nothing to read back.
#[derive(Debug, Default, Clone, Copy)]
pub struct DummyIoHandlerImpl;

impl AbstractIoHandlerImpl for DummyIoHandlerImpl {
    fn backend_name(&self) -> &'static str {
        "DUMMY"
    }

    fn create_file(&mut self, writable: &Writable, _name: &str) -> Result<()> {
        writable.set_written(true);
        Ok(())
    }

    fn open_file(&mut self, writable: &Writable, _name: &str) -> Result<()> {
        writable.set_written(true);
        Ok(())
    }

    fn close_file(&mut self, _writable: &Writable) -> Result<()> {
        Ok(())
    }

    fn delete_file(&mut self, writable: &Writable, _name: &str) -> Result<()> {
        writable.set_written(false);
        Ok(())
    }

    fn create_path(&mut self, writable: &Writable, _path: &str) -> Result<()> {
        writable.set_written(true);
        Ok(())
    }

    fn open_path(&mut self, writable: &Writable, _path: &str) -> Result<()> {
        writable.set_written(true);
        Ok(())
    }

    fn delete_path(&mut self, writable: &Writable, _path: &str) -> Result<()> {
        writable.set_written(false);
        Ok(())
    }

    fn create_dataset(&mut self, writable: &Writable, _name: &str, _dataset: &Dataset) -> Result<()> {
        writable.set_written(true);
        Ok(())
    }

    fn extend_dataset(&mut self, _writable: &Writable, _extent: &Extent) -> Result<()> {
        Ok(())
    }

    fn delete_dataset(&mut self, writable: &Writable, _name: &str) -> Result<()> {
        writable.set_written(false);
        Ok(())
    }

    fn write_dataset(
        &mut self,
        _writable: &Writable,
        _offset: &Offset,
        _extent: &Extent,
        _data: &DataBuffer,
    ) -> Result<()> {
        Ok(())
    }

    fn delete_attribute(&mut self, _writable: &Writable, _name: &str) -> Result<()> {
        Ok(())
    }

    fn write_attribute(&mut self, _writable: &Writable, _name: &str, _value: &Attribute) -> Result<()> {
        Ok(())
    }
}
