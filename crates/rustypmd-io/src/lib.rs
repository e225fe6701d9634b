//! I/O layer of rustypmd: task queue, backend interface and backends.
//!
//! The data model never touches files directly. It describes what should
//! happen as [`IoTask`]s, bound to the [`Writable`] of the object concerned,
//! and hands them to an [`AbstractIoHandler`]. The handler runs them through a
//! backend implementing [`AbstractIoHandlerImpl`].
//!
//! # Example
//!
//! ```
//! use rustypmd_io::{create_io_handler, Access, BackendConfig, Format, IoTask, Parameter, Writable};
//! use rustypmd_format::Attribute;
//!
//! let dir = std::env::temp_dir().join("rustypmd_io_doc");
//! let handler = create_io_handler(&dir, Access::Create, Format::Json, &BackendConfig::default())
//!     .unwrap()
//!     .into_shared();
//! let root = Writable::root(&handler);
//! let mut h = handler.borrow_mut();
//! h.enqueue(IoTask::new(&root, Parameter::CreateFile { name: "doc".into() }));
//! h.enqueue(IoTask::new(
//!     &root,
//!     Parameter::WriteAtt { name: "author".into(), value: Attribute::from("me") },
//! ));
//! h.flush().unwrap();
//! assert!(dir.join("doc.json").exists());
//! ```

pub mod access;
pub mod backend;
pub mod common;
pub mod config;
pub mod error;
pub mod format;
pub mod handler;
pub mod task;
pub mod writable;

pub use access::Access;
pub use backend::{create_io_handler, Dialect, DummyIoHandlerImpl, JsonIoHandlerImpl};
pub use common::{AbstractIoHandlerImplCommon, FilePosition, InvalidatableFile};
pub use config::{BackendConfig, IterationEncoding, SeriesOptions};
pub use error::{Error, Result};
pub use format::{determine_format, suffix, Format};
pub use handler::{dispatch, AbstractIoHandler, AbstractIoHandlerImpl, SharedIoHandler};
pub use task::{IoTask, Operation, Parameter, TaskOutput};
pub use writable::{Writable, WritableId};
