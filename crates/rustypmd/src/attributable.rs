//! Attribute storage shared by every persisted object.

use std::collections::{BTreeMap, BTreeSet};

use rustypmd_format::{Attribute, AttributeType};
use rustypmd_io::{Access, IoTask, Parameter, TaskOutput, Writable};

use crate::error::{Error, Result};

/// How [`Attributable::read_attributes`] treats attributes already in memory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadMode {
    /// Keep attributes that are already known.
    IgnoreExisting,
    /// Overwrite every attribute with the value from the backend.
    FullyReread,
}

/// A node of the hierarchy carrying attributes.
///
/// Attribute changes are kept in memory and written on the next flush of the
/// owning series.
#[derive(Debug)]
pub struct Attributable {
    writable: Writable,
    attributes: BTreeMap<String, Attribute>,
    dirty: bool,
    deleted: BTreeSet<String>,
}

impl Attributable {
    pub(crate) fn new(writable: Writable) -> Self {
        Self {
            writable,
            attributes: BTreeMap::new(),
            dirty: true,
            deleted: BTreeSet::new(),
        }
    }

    pub fn writable(&self) -> &Writable {
        &self.writable
    }

    /// Whether the object exists in the backend.
    pub fn written(&self) -> bool {
        self.writable.written()
    }

    /// Whether attribute changes are waiting for a flush.
    pub fn dirty(&self) -> bool {
        self.dirty
    }

    pub(crate) fn set_dirty(&mut self, dirty: bool) {
        self.dirty = dirty;
    }

    /// Access mode of the series this object belongs to.
    pub fn access(&self) -> Result<Access> {
        Ok(self.writable.handler()?.borrow().access())
    }

    pub(crate) fn ensure_writable(&self, what: &str) -> Result<()> {
        if self.access()?.is_read_only() {
            return Err(Error::WrongApiUsage(format!(
                "{what} is not possible in read-only mode"
            )));
        }
        if self.writable.closed() {
            return Err(Error::WrongApiUsage(format!(
                "{what} is not possible in a closed iteration"
            )));
        }
        Ok(())
    }

    /// Set `key` to `value`. Returns `true` if an existing value was replaced.
    pub fn set_attribute(&mut self, key: &str, value: impl Into<Attribute>) -> Result<bool> {
        self.ensure_writable("Setting an attribute")?;
        Ok(self.set_attribute_unchecked(key, value.into()))
    }

    /// Set without the access check, for defaults and values read from disk.
    pub(crate) fn set_attribute_unchecked(&mut self, key: &str, value: Attribute) -> bool {
        self.dirty = true;
        self.deleted.remove(key);
        self.attributes.insert(key.to_string(), value).is_some()
    }

    pub fn get_attribute(&self, key: &str) -> Result<&Attribute> {
        self.attributes
            .get(key)
            .ok_or_else(|| Error::NoSuchAttribute(key.to_string()))
    }

    /// Read `key` converted to `T`.
    pub fn attribute_as<T: AttributeType>(&self, key: &str) -> Result<T> {
        Ok(self.get_attribute(key)?.get::<T>()?)
    }

    /// Read a `FLOAT` or `DOUBLE` attribute converted to `T`.
    pub fn read_floating_point<T: AttributeType>(&self, key: &str) -> Result<T> {
        let attr = self.get_attribute(key)?;
        if !attr.dtype().is_floating_point() {
            return Err(Error::WrongApiUsage(format!(
                "attribute '{key}' is of type {}, not a floating point type",
                attr.dtype()
            )));
        }
        Ok(attr.get::<T>()?)
    }

    /// Remove `key`. Returns whether it existed.
    pub fn delete_attribute(&mut self, key: &str) -> Result<bool> {
        self.ensure_writable("Deleting an attribute")?;
        if self.attributes.remove(key).is_none() {
            return Ok(false);
        }
        if self.written() {
            self.deleted.insert(key.to_string());
            self.dirty = true;
        }
        Ok(true)
    }

    /// Names of all attributes, sorted.
    pub fn attributes(&self) -> Vec<String> {
        self.attributes.keys().cloned().collect()
    }

    pub fn num_attributes(&self) -> usize {
        self.attributes.len()
    }

    pub fn contains_attribute(&self, key: &str) -> bool {
        self.attributes.contains_key(key)
    }

    pub fn comment(&self) -> Result<String> {
        self.attribute_as("comment")
    }

    pub fn set_comment(&mut self, comment: &str) -> Result<&mut Self> {
        self.set_attribute("comment", comment)?;
        Ok(self)
    }

    // -----------------------------------------------------------------------
    // Task plumbing
    // -----------------------------------------------------------------------

    pub(crate) fn enqueue(&self, parameter: Parameter) -> Result<()> {
        self.writable
            .handler()?
            .borrow_mut()
            .enqueue(IoTask::new(&self.writable, parameter));
        Ok(())
    }

    pub(crate) fn run(&self, parameter: Parameter) -> Result<TaskOutput> {
        Ok(self.run_raw(parameter)?)
    }

    fn run_raw(&self, parameter: Parameter) -> rustypmd_io::Result<TaskOutput> {
        self.writable
            .handler()?
            .borrow_mut()
            .run(IoTask::new(&self.writable, parameter))
    }

    /// Flush the whole handler queue.
    pub(crate) fn flush_handler(&self) -> Result<()> {
        self.writable.handler()?.borrow_mut().flush()?;
        Ok(())
    }

    /// Queue pending deletions and, if anything changed, all attributes.
    pub(crate) fn flush_attributes(&mut self) -> Result<()> {
        if !self.dirty {
            return Ok(());
        }
        for name in std::mem::take(&mut self.deleted) {
            self.enqueue(Parameter::DeleteAtt { name })?;
        }
        for (name, value) in &self.attributes {
            self.enqueue(Parameter::WriteAtt {
                name: name.clone(),
                value: value.clone(),
            })?;
        }
        self.dirty = false;
        Ok(())
    }

    /// Read one attribute from the backend into memory.
    pub(crate) fn read_attribute(&mut self, name: &str) -> Result<&Attribute> {
        let value = self
            .run(Parameter::ReadAtt {
                name: name.to_string(),
            })?
            .into_attribute()?;
        self.attributes.insert(name.to_string(), value);
        self.get_attribute(name)
    }

    /// List the backend's attributes of this object and read them.
    ///
    /// Attributes the backend cannot decode are skipped with a warning.
    pub(crate) fn read_attributes(&mut self, mode: ReadMode) -> Result<()> {
        let names = self.run(Parameter::ListAtts)?.into_names()?;
        for name in names {
            if mode == ReadMode::IgnoreExisting && self.attributes.contains_key(&name) {
                continue;
            }
            match self.run_raw(Parameter::ReadAtt { name: name.clone() }) {
                Ok(out) => {
                    self.attributes.insert(name, out.into_attribute()?);
                }
                Err(rustypmd_io::Error::NoSuchAttribute(_)) => {
                    log::warn!("attribute '{name}' is listed but cannot be read, skipping it");
                }
                Err(rustypmd_io::Error::Format(e)) => {
                    log::warn!("skipping non-standard attribute '{name}': {e}");
                }
                Err(e) => return Err(e.into()),
            }
        }
        self.dirty = false;
        Ok(())
    }
}

/// Objects that expose an [`Attributable`].
pub trait HasAttributable {
    fn attributable(&self) -> &Attributable;
    fn attributable_mut(&mut self) -> &mut Attributable;
}

/// Implement `Deref<Target = Attributable>` and [`HasAttributable`] for a type
/// with an `attributable` field.
macro_rules! impl_attributable {
    ($t:ty) => {
        impl std::ops::Deref for $t {
            type Target = $crate::attributable::Attributable;

            fn deref(&self) -> &Self::Target {
                &self.attributable
            }
        }

        impl std::ops::DerefMut for $t {
            fn deref_mut(&mut self) -> &mut Self::Target {
                &mut self.attributable
            }
        }

        impl $crate::attributable::HasAttributable for $t {
            fn attributable(&self) -> &$crate::attributable::Attributable {
                &self.attributable
            }

            fn attributable_mut(&mut self) -> &mut $crate::attributable::Attributable {
                &mut self.attributable
            }
        }
    };
}

pub(crate) use impl_attributable;

#[cfg(test)]
mod tests {
    use super::*;
    use rustypmd_io::{create_io_handler, BackendConfig, Format, SharedIoHandler};

    fn handler(access: Access) -> SharedIoHandler {
        create_io_handler("unused", access, Format::Dummy, &BackendConfig::default())
            .unwrap()
            .into_shared()
    }

    // -----------------------------------------------------------------------
    // In-memory behavior
    // -----------------------------------------------------------------------

    #[test]
    fn set_get_overwrite() {
        let h = handler(Access::Create);
        let mut a = Attributable::new(Writable::root(&h));
        assert!(!a.set_attribute("answer", 42i32).unwrap());
        assert!(a.set_attribute("answer", 43i64).unwrap());
        assert_eq!(a.attribute_as::<i64>("answer").unwrap(), 43);
        assert_eq!(a.attribute_as::<f64>("answer").unwrap(), 43.0);
        assert_eq!(a.attributes(), vec!["answer".to_string()]);
        assert!(matches!(a.get_attribute("missing"), Err(Error::NoSuchAttribute(_))));
    }

    #[test]
    fn floating_point_only() {
        let h = handler(Access::Create);
        let mut a = Attributable::new(Writable::root(&h));
        a.set_attribute("f", 0.5f32).unwrap();
        a.set_attribute("i", 1u8).unwrap();
        assert_eq!(a.read_floating_point::<f64>("f").unwrap(), 0.5);
        assert!(matches!(
            a.read_floating_point::<f64>("i"),
            Err(Error::WrongApiUsage(_))
        ));
    }

    #[test]
    fn comment_helpers() {
        let h = handler(Access::Create);
        let mut a = Attributable::new(Writable::root(&h));
        a.set_comment("hello").unwrap();
        assert_eq!(a.comment().unwrap(), "hello");
        assert_eq!(a.num_attributes(), 1);
    }

    #[test]
    fn read_only_rejects_changes() {
        let h = handler(Access::ReadOnly);
        let mut a = Attributable::new(Writable::root(&h));
        assert!(matches!(a.set_attribute("x", 1i32), Err(Error::WrongApiUsage(_))));
        assert!(matches!(a.delete_attribute("x"), Err(Error::WrongApiUsage(_))));
    }

    // -----------------------------------------------------------------------
    // Flushing
    // -----------------------------------------------------------------------

    #[test]
    fn flush_enqueues_writes_and_deletions() {
        let h = handler(Access::Create);
        let mut a = Attributable::new(Writable::root(&h));
        a.set_attribute("a", 1i32).unwrap();
        a.set_attribute("b", 2i32).unwrap();
        a.writable().set_written(true);
        assert!(a.delete_attribute("b").unwrap());
        assert!(!a.delete_attribute("b").unwrap());
        a.flush_attributes().unwrap();
        // one DELETE_ATT, one WRITE_ATT
        assert_eq!(h.borrow().pending(), 2);
        assert!(!a.dirty());
        a.flush_attributes().unwrap();
        assert_eq!(h.borrow().pending(), 2);
    }
}
