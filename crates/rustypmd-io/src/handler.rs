//! The task queue and the backend interface it dispatches to.
//!
//! ```text
//! ┌───────────────────────────┐
//! │ Series / Iteration / ...  │  enqueue(IoTask)
//! ├───────────────────────────┤
//! │   AbstractIoHandler       │  FIFO queue, flush(), run()
//! ├───────────────────────────┤
//! │   AbstractIoHandlerImpl   │  ← trait defined here
//! ├─────────┬────────┬────────┤
//! │  JSON   │  TOML  │ Dummy  │  ← backends
//! └─────────┴────────┴────────┘
//! ```
//!
//! Writing operations are deferred: the data model enqueues tasks and they run
//! on [`AbstractIoHandler::flush`]. Reads go through [`AbstractIoHandler::run`],
//! which drains the queue first so that a read always observes earlier writes.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::fmt;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use rustypmd_format::{Attribute, ChunkTable, DataBuffer, Dataset, Datatype, Extent, Offset};

use crate::access::Access;
use crate::error::{Error, Result};
use crate::format::Format;
use crate::task::{IoTask, Operation, Parameter, TaskOutput};
use crate::writable::Writable;

/// The handler as shared by every writable of one series.
pub type SharedIoHandler = Rc<RefCell<AbstractIoHandler>>;

/// Backend interface with one method per [`Operation`].
///
/// Every method has a default implementation returning
/// [`Error::OperationUnsupportedInBackend`], so backends only implement what
/// they support.
pub trait AbstractIoHandlerImpl {
    /// Backend name used in error messages, e.g. `"JSON"`.
    fn backend_name(&self) -> &'static str;

    /// Called after the queue has been drained.
    fn flush(&mut self) -> Result<()> {
        Ok(())
    }

    fn create_file(&mut self, writable: &Writable, name: &str) -> Result<()> {
        let _ = (writable, name);
        Err(self.unsupported(Operation::CreateFile))
    }

    fn check_file(&mut self, writable: &Writable, name: &str) -> Result<bool> {
        let _ = (writable, name);
        Err(self.unsupported(Operation::CheckFile))
    }

    fn open_file(&mut self, writable: &Writable, name: &str) -> Result<()> {
        let _ = (writable, name);
        Err(self.unsupported(Operation::OpenFile))
    }

    fn close_file(&mut self, writable: &Writable) -> Result<()> {
        let _ = writable;
        Err(self.unsupported(Operation::CloseFile))
    }

    fn delete_file(&mut self, writable: &Writable, name: &str) -> Result<()> {
        let _ = (writable, name);
        Err(self.unsupported(Operation::DeleteFile))
    }

    fn create_path(&mut self, writable: &Writable, path: &str) -> Result<()> {
        let _ = (writable, path);
        Err(self.unsupported(Operation::CreatePath))
    }

    /// Closing a group is a no-op unless a backend needs it.
    fn close_path(&mut self, writable: &Writable) -> Result<()> {
        let _ = writable;
        Ok(())
    }

    fn open_path(&mut self, writable: &Writable, path: &str) -> Result<()> {
        let _ = (writable, path);
        Err(self.unsupported(Operation::OpenPath))
    }

    fn delete_path(&mut self, writable: &Writable, path: &str) -> Result<()> {
        let _ = (writable, path);
        Err(self.unsupported(Operation::DeletePath))
    }

    fn list_paths(&mut self, writable: &Writable) -> Result<Vec<String>> {
        let _ = writable;
        Err(self.unsupported(Operation::ListPaths))
    }

    fn create_dataset(&mut self, writable: &Writable, name: &str, dataset: &Dataset) -> Result<()> {
        let _ = (writable, name, dataset);
        Err(self.unsupported(Operation::CreateDataset))
    }

    fn extend_dataset(&mut self, writable: &Writable, extent: &Extent) -> Result<()> {
        let _ = (writable, extent);
        Err(self.unsupported(Operation::ExtendDataset))
    }

    fn open_dataset(&mut self, writable: &Writable, name: &str) -> Result<(Datatype, Extent)> {
        let _ = (writable, name);
        Err(self.unsupported(Operation::OpenDataset))
    }

    fn delete_dataset(&mut self, writable: &Writable, name: &str) -> Result<()> {
        let _ = (writable, name);
        Err(self.unsupported(Operation::DeleteDataset))
    }

    fn write_dataset(
        &mut self,
        writable: &Writable,
        offset: &Offset,
        extent: &Extent,
        data: &DataBuffer,
    ) -> Result<()> {
        let _ = (writable, offset, extent, data);
        Err(self.unsupported(Operation::WriteDataset))
    }

    fn read_dataset(
        &mut self,
        writable: &Writable,
        offset: &Offset,
        extent: &Extent,
        dtype: Datatype,
    ) -> Result<DataBuffer> {
        let _ = (writable, offset, extent, dtype);
        Err(self.unsupported(Operation::ReadDataset))
    }

    fn list_datasets(&mut self, writable: &Writable) -> Result<Vec<String>> {
        let _ = writable;
        Err(self.unsupported(Operation::ListDatasets))
    }

    fn delete_attribute(&mut self, writable: &Writable, name: &str) -> Result<()> {
        let _ = (writable, name);
        Err(self.unsupported(Operation::DeleteAtt))
    }

    fn write_attribute(&mut self, writable: &Writable, name: &str, value: &Attribute) -> Result<()> {
        let _ = (writable, name, value);
        Err(self.unsupported(Operation::WriteAtt))
    }

    fn read_attribute(&mut self, writable: &Writable, name: &str) -> Result<Attribute> {
        let _ = (writable, name);
        Err(self.unsupported(Operation::ReadAtt))
    }

    fn list_attributes(&mut self, writable: &Writable) -> Result<Vec<String>> {
        let _ = writable;
        Err(self.unsupported(Operation::ListAtts))
    }

    fn available_chunks(&mut self, writable: &Writable) -> Result<ChunkTable> {
        let _ = writable;
        Err(self.unsupported(Operation::AvailableChunks))
    }

    /// The error returned by the default method implementations.
    fn unsupported(&self, operation: Operation) -> Error {
        Error::OperationUnsupportedInBackend {
            backend: self.backend_name().to_string(),
            operation: operation.to_string(),
        }
    }
}

/// Execute one task on `backend`.
pub fn dispatch(backend: &mut dyn AbstractIoHandlerImpl, task: IoTask) -> Result<TaskOutput> {
    let w = &task.writable;
    log::trace!("{}: {} on writable {}", backend.backend_name(), task.operation(), w.id());
    Ok(match &task.parameter {
        Parameter::CreateFile { name } => {
            backend.create_file(w, name)?;
            TaskOutput::None
        }
        Parameter::CheckFile { name } => TaskOutput::FileExists(backend.check_file(w, name)?),
        Parameter::OpenFile { name } => {
            backend.open_file(w, name)?;
            TaskOutput::None
        }
        Parameter::CloseFile => {
            backend.close_file(w)?;
            TaskOutput::None
        }
        Parameter::DeleteFile { name } => {
            backend.delete_file(w, name)?;
            TaskOutput::None
        }
        Parameter::CreatePath { path } => {
            backend.create_path(w, path)?;
            TaskOutput::None
        }
        Parameter::ClosePath => {
            backend.close_path(w)?;
            TaskOutput::None
        }
        Parameter::OpenPath { path } => {
            backend.open_path(w, path)?;
            TaskOutput::None
        }
        Parameter::DeletePath { path } => {
            backend.delete_path(w, path)?;
            TaskOutput::None
        }
        Parameter::ListPaths => TaskOutput::Paths(backend.list_paths(w)?),
        Parameter::CreateDataset { name, dataset } => {
            backend.create_dataset(w, name, dataset)?;
            TaskOutput::None
        }
        Parameter::ExtendDataset { extent } => {
            backend.extend_dataset(w, extent)?;
            TaskOutput::None
        }
        Parameter::OpenDataset { name } => {
            let (dtype, extent) = backend.open_dataset(w, name)?;
            TaskOutput::DatasetInfo { dtype, extent }
        }
        Parameter::DeleteDataset { name } => {
            backend.delete_dataset(w, name)?;
            TaskOutput::None
        }
        Parameter::WriteDataset {
            offset,
            extent,
            data,
        } => {
            backend.write_dataset(w, offset, extent, data)?;
            TaskOutput::None
        }
        Parameter::ReadDataset {
            offset,
            extent,
            dtype,
        } => TaskOutput::Buffer(backend.read_dataset(w, offset, extent, *dtype)?),
        Parameter::ListDatasets => TaskOutput::Datasets(backend.list_datasets(w)?),
        Parameter::DeleteAtt { name } => {
            backend.delete_attribute(w, name)?;
            TaskOutput::None
        }
        Parameter::WriteAtt { name, value } => {
            backend.write_attribute(w, name, value)?;
            TaskOutput::None
        }
        Parameter::ReadAtt { name } => TaskOutput::Attribute(backend.read_attribute(w, name)?),
        Parameter::ListAtts => TaskOutput::Attributes(backend.list_attributes(w)?),
        Parameter::AvailableChunks => TaskOutput::Chunks(backend.available_chunks(w)?),
    })
}

/// Front of the I/O stack: a FIFO of pending tasks plus the backend running them.
pub struct AbstractIoHandler {
    directory: PathBuf,
    access: Access,
    format: Format,
    work: VecDeque<IoTask>,
    backend: Box<dyn AbstractIoHandlerImpl>,
}

impl fmt::Debug for AbstractIoHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AbstractIoHandler")
            .field("backend", &self.backend.backend_name())
            .field("directory", &self.directory)
            .field("access", &self.access)
            .field("pending", &self.work.len())
            .finish()
    }
}

impl AbstractIoHandler {
    pub fn new(
        directory: impl Into<PathBuf>,
        access: Access,
        format: Format,
        backend: Box<dyn AbstractIoHandlerImpl>,
    ) -> Self {
        Self {
            directory: directory.into(),
            access,
            format,
            work: VecDeque::new(),
            backend,
        }
    }

    /// Wrap into the shared form handed to writables.
    pub fn into_shared(self) -> SharedIoHandler {
        Rc::new(RefCell::new(self))
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    pub fn access(&self) -> Access {
        self.access
    }

    pub fn format(&self) -> Format {
        self.format
    }

    pub fn backend_name(&self) -> &'static str {
        self.backend.backend_name()
    }

    /// Number of tasks waiting for the next flush.
    pub fn pending(&self) -> usize {
        self.work.len()
    }

    pub fn enqueue(&mut self, task: IoTask) {
        self.work.push_back(task);
    }

    /// Execute all queued tasks in FIFO order, then flush the backend.
    ///
    /// Stops at the first failing task. That task is dropped; the tasks behind
    /// it stay queued.
    pub fn flush(&mut self) -> Result<()> {
        while let Some(task) = self.work.pop_front() {
            dispatch(self.backend.as_mut(), task)?;
        }
        self.backend.flush()
    }

    /// Flush, then execute `task` immediately and return its output.
    pub fn run(&mut self, task: IoTask) -> Result<TaskOutput> {
        self.flush()?;
        dispatch(self.backend.as_mut(), task)
    }

    /// Drop all pending tasks without executing them.
    pub fn clear(&mut self) {
        self.work.clear();
    }
}
