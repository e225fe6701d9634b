//! Bookkeeping shared by file-based backends.
//!
//! [`AbstractIoHandlerImplCommon`] tracks which file each writable lives in and
//! where inside that file it is located. The location type is backend specific
//! (a JSON pointer for the JSON backend), hence the [`FilePosition`] parameter.

use std::cell::Cell;
use std::collections::HashMap;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::path::{Path, PathBuf};
use std::rc::Rc;

use crate::error::{Error, Result};
use crate::writable::{Writable, WritableId};

/// Location of a writable inside its file.
pub trait FilePosition: Clone + fmt::Debug {
    /// Position of the file's root group.
    fn root() -> Self;

    /// Position of `segment` below `self`; `segment` may contain `/`.
    fn extend(&self, segment: &str) -> Self;
}

struct FileState {
    name: String,
    valid: Cell<bool>,
}

/// A file name that can be invalidated once the file is closed or deleted.
///
/// Handles compare by identity: two handles to files of the same name are
/// different files if one of them was invalidated in between.
#[derive(Clone)]
pub struct InvalidatableFile(Rc<FileState>);

impl InvalidatableFile {
    pub fn new(name: impl Into<String>) -> Self {
        Self(Rc::new(FileState {
            name: name.into(),
            valid: Cell::new(true),
        }))
    }

    pub fn name(&self) -> &str {
        &self.0.name
    }

    pub fn valid(&self) -> bool {
        self.0.valid.get()
    }

    pub fn invalidate(&self) {
        self.0.valid.set(false);
    }
}

impl PartialEq for InvalidatableFile {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl Eq for InvalidatableFile {}

impl Hash for InvalidatableFile {
    fn hash<H: Hasher>(&self, state: &mut H) {
        (Rc::as_ptr(&self.0) as usize).hash(state);
    }
}

impl fmt::Debug for InvalidatableFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InvalidatableFile")
            .field("name", &self.0.name)
            .field("valid", &self.valid())
            .finish()
    }
}

/// File association and file position tracking for one backend instance.
#[derive(Debug)]
pub struct AbstractIoHandlerImplCommon<P: FilePosition> {
    directory: PathBuf,
    files: HashMap<WritableId, InvalidatableFile>,
    positions: HashMap<WritableId, P>,
}

impl<P: FilePosition> AbstractIoHandlerImplCommon<P> {
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
            files: HashMap::new(),
            positions: HashMap::new(),
        }
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// A valid handle for the file `name`, and whether it was newly created.
    pub fn get_possibly_existing(&self, name: &str) -> (InvalidatableFile, bool) {
        match self
            .files
            .values()
            .find(|f| f.valid() && f.name() == name)
        {
            Some(file) => (file.clone(), false),
            None => (InvalidatableFile::new(name), true),
        }
    }

    pub fn associate_with_file(&mut self, writable: &Writable, file: InvalidatableFile) {
        self.files.insert(writable.id(), file);
    }

    /// The file currently associated with `writable`, if any.
    pub fn file_of(&self, writable: &Writable) -> Option<&InvalidatableFile> {
        self.files.get(&writable.id())
    }

    /// Absolute path of `file` inside the handler's directory.
    pub fn full_path(&self, file: &InvalidatableFile) -> PathBuf {
        self.directory.join(file.name())
    }

    /// Associate `writable` with its parent's file and return it.
    ///
    /// Root writables keep their own association, which must have been set
    /// up by opening or creating a file.
    pub fn refresh_file_from_parent(&mut self, writable: &Writable) -> Result<InvalidatableFile> {
        match writable.parent() {
            Some(parent) => {
                let file = match self.files.get(&parent.id()) {
                    Some(f) => f.clone(),
                    None => self.refresh_file_from_parent(parent)?,
                };
                self.associate_with_file(writable, file.clone());
                Ok(file)
            }
            None => self.files.get(&writable.id()).cloned().ok_or_else(|| {
                Error::Internal("Root object must be opened explicitly".to_string())
            }),
        }
    }

    /// The writable's own position, else its parent's, else the root.
    ///
    /// With `write`, the result is stored as the writable's position.
    pub fn set_and_get_file_position(&mut self, writable: &Writable, write: bool) -> P {
        let pos = match self.positions.get(&writable.id()) {
            Some(p) => p.clone(),
            None => writable
                .parent()
                .and_then(|p| self.positions.get(&p.id()))
                .cloned()
                .unwrap_or_else(P::root),
        };
        if write {
            self.positions.insert(writable.id(), pos.clone());
        }
        pos
    }

    /// Set the writable's position to its parent's position extended by `name`.
    pub fn extend_file_position(&mut self, writable: &Writable, name: &str) -> P {
        let base = writable
            .parent()
            .and_then(|p| self.positions.get(&p.id()))
            .cloned()
            .unwrap_or_else(P::root);
        let pos = base.extend(name.trim_start_matches('/'));
        self.positions.insert(writable.id(), pos.clone());
        pos
    }

    pub fn position(&self, writable: &Writable) -> Option<&P> {
        self.positions.get(&writable.id())
    }

    pub fn set_position(&mut self, writable: &Writable, position: P) {
        self.positions.insert(writable.id(), position);
    }

    /// Drop position and file association of `writable`.
    pub fn forget(&mut self, writable: &Writable) {
        self.positions.remove(&writable.id());
        self.files.remove(&writable.id());
    }

    /// Drop every association with `file`.
    pub fn forget_file(&mut self, file: &InvalidatableFile) {
        self.files.retain(|_, f| f != file);
    }
}
