//! Backend-visible nodes of the object hierarchy.
//!
//! Every persisted object (series, iteration, mesh, record component, ...) owns
//! a [`Writable`]. Backends never see the objects themselves, only writables:
//! they key file associations and file positions by [`Writable::id`] and walk
//! up through [`Writable::parent`].

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};
use std::sync::atomic::{AtomicU64, Ordering};

use crate::error::{Error, Result};
use crate::handler::{AbstractIoHandler, SharedIoHandler};

/// Unique identifier of a writable for the lifetime of the process.
pub type WritableId = u64;

static NEXT_ID: AtomicU64 = AtomicU64::new(1);

struct WritableInner {
    id: WritableId,
    parent: Option<Writable>,
    written: Cell<bool>,
    closed: Cell<bool>,
    handler: Weak<RefCell<AbstractIoHandler>>,
}

/// Shared handle to a node in the persisted hierarchy.
///
/// Cloning a `Writable` yields another handle to the same node.
#[derive(Clone)]
pub struct Writable {
    inner: Rc<WritableInner>,
}

impl Writable {
    /// A root node without parent.
    pub fn root(handler: &SharedIoHandler) -> Self {
        Self {
            inner: Rc::new(WritableInner {
                id: NEXT_ID.fetch_add(1, Ordering::Relaxed),
                parent: None,
                written: Cell::new(false),
                closed: Cell::new(false),
                handler: Rc::downgrade(handler),
            }),
        }
    }

    /// A child node of `parent`, sharing its handler.
    pub fn child(parent: &Writable) -> Self {
        Self {
            inner: Rc::new(WritableInner {
                id: NEXT_ID.fetch_add(1, Ordering::Relaxed),
                parent: Some(parent.clone()),
                written: Cell::new(false),
                closed: Cell::new(false),
                handler: parent.inner.handler.clone(),
            }),
        }
    }

    pub fn id(&self) -> WritableId {
        self.inner.id
    }

    pub fn parent(&self) -> Option<&Writable> {
        self.inner.parent.as_ref()
    }

    /// Whether the node exists in the backend.
    pub fn written(&self) -> bool {
        self.inner.written.get()
    }

    pub fn set_written(&self, written: bool) {
        self.inner.written.set(written);
    }

    /// Whether this node or one of its ancestors has been closed. Closed
    /// subtrees accept no further modification.
    pub fn closed(&self) -> bool {
        let mut node = Some(self);
        while let Some(w) = node {
            if w.inner.closed.get() {
                return true;
            }
            node = w.parent();
        }
        false
    }

    pub fn set_closed(&self, closed: bool) {
        self.inner.closed.set(closed);
    }

    /// The handler executing tasks for this node.
    pub fn handler(&self) -> Result<SharedIoHandler> {
        self.inner
            .handler
            .upgrade()
            .ok_or_else(|| Error::Internal("I/O handler has already been dropped".to_string()))
    }

    /// Whether both handles refer to the same node.
    pub fn ptr_eq(&self, other: &Writable) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl fmt::Debug for Writable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Writable")
            .field("id", &self.id())
            .field("parent", &self.parent().map(Writable::id))
            .field("written", &self.written())
            .field("closed", &self.inner.closed.get())
            .finish()
    }
}
