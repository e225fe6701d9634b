//! I/O tasks: an operation plus its parameters, bound to a writable.

use std::fmt;

use rustypmd_format::{Attribute, ChunkTable, DataBuffer, Dataset, Datatype, Extent, Offset};

use crate::error::{Error, Result};
use crate::writable::Writable;

/// Kind of an I/O task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    CreateFile,
    CheckFile,
    OpenFile,
    CloseFile,
    DeleteFile,
    CreatePath,
    ClosePath,
    OpenPath,
    DeletePath,
    ListPaths,
    CreateDataset,
    ExtendDataset,
    OpenDataset,
    DeleteDataset,
    WriteDataset,
    ReadDataset,
    ListDatasets,
    DeleteAtt,
    WriteAtt,
    ReadAtt,
    ListAtts,
    AvailableChunks,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Operation::CreateFile => "CREATE_FILE",
            Operation::CheckFile => "CHECK_FILE",
            Operation::OpenFile => "OPEN_FILE",
            Operation::CloseFile => "CLOSE_FILE",
            Operation::DeleteFile => "DELETE_FILE",
            Operation::CreatePath => "CREATE_PATH",
            Operation::ClosePath => "CLOSE_PATH",
            Operation::OpenPath => "OPEN_PATH",
            Operation::DeletePath => "DELETE_PATH",
            Operation::ListPaths => "LIST_PATHS",
            Operation::CreateDataset => "CREATE_DATASET",
            Operation::ExtendDataset => "EXTEND_DATASET",
            Operation::OpenDataset => "OPEN_DATASET",
            Operation::DeleteDataset => "DELETE_DATASET",
            Operation::WriteDataset => "WRITE_DATASET",
            Operation::ReadDataset => "READ_DATASET",
            Operation::ListDatasets => "LIST_DATASETS",
            Operation::DeleteAtt => "DELETE_ATT",
            Operation::WriteAtt => "WRITE_ATT",
            Operation::ReadAtt => "READ_ATT",
            Operation::ListAtts => "LIST_ATTS",
            Operation::AvailableChunks => "AVAILABLE_CHUNKS",
        };
        f.write_str(name)
    }
}

/// Inputs of a task. Each variant belongs to exactly one [`Operation`].
#[derive(Debug, Clone, PartialEq)]
pub enum Parameter {
    CreateFile { name: String },
    CheckFile { name: String },
    OpenFile { name: String },
    CloseFile,
    DeleteFile { name: String },
    /// Relative to the parent's position unless it starts with `/`.
    CreatePath { path: String },
    ClosePath,
    /// An empty path opens the parent's group itself.
    OpenPath { path: String },
    /// `"."` deletes the group of the task's own writable.
    DeletePath { path: String },
    ListPaths,
    CreateDataset { name: String, dataset: Dataset },
    ExtendDataset { extent: Extent },
    OpenDataset { name: String },
    /// `"."` deletes the dataset of the task's own writable.
    DeleteDataset { name: String },
    WriteDataset { offset: Offset, extent: Extent, data: DataBuffer },
    ReadDataset { offset: Offset, extent: Extent, dtype: Datatype },
    ListDatasets,
    DeleteAtt { name: String },
    WriteAtt { name: String, value: Attribute },
    ReadAtt { name: String },
    ListAtts,
    AvailableChunks,
}

impl Parameter {
    pub fn operation(&self) -> Operation {
        match self {
            Parameter::CreateFile { .. } => Operation::CreateFile,
            Parameter::CheckFile { .. } => Operation::CheckFile,
            Parameter::OpenFile { .. } => Operation::OpenFile,
            Parameter::CloseFile => Operation::CloseFile,
            Parameter::DeleteFile { .. } => Operation::DeleteFile,
            Parameter::CreatePath { .. } => Operation::CreatePath,
            Parameter::ClosePath => Operation::ClosePath,
            Parameter::OpenPath { .. } => Operation::OpenPath,
            Parameter::DeletePath { .. } => Operation::DeletePath,
            Parameter::ListPaths => Operation::ListPaths,
            Parameter::CreateDataset { .. } => Operation::CreateDataset,
            Parameter::ExtendDataset { .. } => Operation::ExtendDataset,
            Parameter::OpenDataset { .. } => Operation::OpenDataset,
            Parameter::DeleteDataset { .. } => Operation::DeleteDataset,
            Parameter::WriteDataset { .. } => Operation::WriteDataset,
            Parameter::ReadDataset { .. } => Operation::ReadDataset,
            Parameter::ListDatasets => Operation::ListDatasets,
            Parameter::DeleteAtt { .. } => Operation::DeleteAtt,
            Parameter::WriteAtt { .. } => Operation::WriteAtt,
            Parameter::ReadAtt { .. } => Operation::ReadAtt,
            Parameter::ListAtts => Operation::ListAtts,
            Parameter::AvailableChunks => Operation::AvailableChunks,
        }
    }
}

/// Result of an executed task.
#[derive(Debug, Clone, PartialEq)]
pub enum TaskOutput {
    None,
    FileExists(bool),
    Paths(Vec<String>),
    Datasets(Vec<String>),
    Attributes(Vec<String>),
    Attribute(Attribute),
    Buffer(DataBuffer),
    DatasetInfo { dtype: Datatype, extent: Extent },
    Chunks(ChunkTable),
}

fn unexpected(expected: &str, got: &TaskOutput) -> Error {
    Error::Internal(format!("expected {expected} task output, got {got:?}"))
}

impl TaskOutput {
    pub fn into_names(self) -> Result<Vec<String>> {
        match self {
            TaskOutput::Paths(v) | TaskOutput::Datasets(v) | TaskOutput::Attributes(v) => Ok(v),
            other => Err(unexpected("name list", &other)),
        }
    }

    pub fn into_attribute(self) -> Result<Attribute> {
        match self {
            TaskOutput::Attribute(a) => Ok(a),
            other => Err(unexpected("attribute", &other)),
        }
    }

    pub fn into_buffer(self) -> Result<DataBuffer> {
        match self {
            TaskOutput::Buffer(b) => Ok(b),
            other => Err(unexpected("buffer", &other)),
        }
    }

    pub fn into_dataset_info(self) -> Result<(Datatype, Extent)> {
        match self {
            TaskOutput::DatasetInfo { dtype, extent } => Ok((dtype, extent)),
            other => Err(unexpected("dataset info", &other)),
        }
    }

    pub fn into_chunks(self) -> Result<ChunkTable> {
        match self {
            TaskOutput::Chunks(c) => Ok(c),
            other => Err(unexpected("chunk table", &other)),
        }
    }

    pub fn into_file_exists(self) -> Result<bool> {
        match self {
            TaskOutput::FileExists(b) => Ok(b),
            other => Err(unexpected("file check", &other)),
        }
    }
}

/// A unit of work for the backend.
#[derive(Debug, Clone)]
pub struct IoTask {
    pub writable: Writable,
    pub parameter: Parameter,
}

impl IoTask {
    pub fn new(writable: &Writable, parameter: Parameter) -> Self {
        Self {
            writable: writable.clone(),
            parameter,
        }
    }

    pub fn operation(&self) -> Operation {
        self.parameter.operation()
    }
}
