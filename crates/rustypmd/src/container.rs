//! Keyed collections of child objects.

use std::borrow::Borrow;
use std::collections::BTreeMap;
use std::fmt;
use std::ops::{Deref, DerefMut};

use rustypmd_io::{Parameter, Writable};

use crate::attributable::{Attributable, HasAttributable};
use crate::error::{Error, Result};

/// Objects that can live in a [`Container`].
pub trait ContainerElement: HasAttributable {
    /// A new, unwritten object below `parent`.
    fn create(parent: &Writable) -> Self;
}

/// An ordered map of children that is itself a group with attributes.
///
/// ```no_run
/// # use rustypmd::{Access, Series};
/// let mut series = Series::new("out/data.json", Access::Create)?;
/// let it = series.iterations.get_or_create(100u64)?;
/// it.meshes.get_or_create("E")?;
/// assert!(it.meshes.contains("E"));
/// # Ok::<(), rustypmd::Error>(())
/// ```
#[derive(Debug)]
pub struct Container<K, T> {
    attributable: Attributable,
    entries: BTreeMap<K, T>,
    closed: bool,
}

impl<K, T> Deref for Container<K, T> {
    type Target = Attributable;

    fn deref(&self) -> &Attributable {
        &self.attributable
    }
}

impl<K, T> DerefMut for Container<K, T> {
    fn deref_mut(&mut self) -> &mut Attributable {
        &mut self.attributable
    }
}

impl<K, T> HasAttributable for Container<K, T> {
    fn attributable(&self) -> &Attributable {
        &self.attributable
    }

    fn attributable_mut(&mut self) -> &mut Attributable {
        &mut self.attributable
    }
}

impl<K: Ord + Clone + fmt::Display, T: ContainerElement> Container<K, T> {
    pub(crate) fn new(parent: &Writable) -> Self {
        Self {
            attributable: Attributable::new(Writable::child(parent)),
            entries: BTreeMap::new(),
            closed: false,
        }
    }

    /// The entry for `key`, created if missing.
    ///
    /// Creating entries fails in read-only mode and after the owning
    /// iteration was closed.
    pub fn get_or_create(&mut self, key: impl Into<K>) -> Result<&mut T> {
        let key = key.into();
        if !self.entries.contains_key(&key) {
            if self.closed {
                return Err(Error::WrongApiUsage(format!(
                    "Cannot create '{key}': the iteration has been closed"
                )));
            }
            self.attributable.ensure_writable("Creating a new entry")?;
            let child = T::create(self.attributable.writable());
            self.entries.insert(key.clone(), child);
        }
        self.entries
            .get_mut(&key)
            .ok_or_else(|| Error::Internal(format!("entry '{key}' vanished after insertion")))
    }

    /// Insert or fetch an entry while reading, bypassing the access checks.
    pub(crate) fn entry_for_read(&mut self, key: K) -> &mut T {
        let parent = self.attributable.writable().clone();
        self.entries.entry(key).or_insert_with(|| T::create(&parent))
    }

    pub fn get<Q>(&self, key: &Q) -> Option<&T>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.entries.get(key)
    }

    pub fn get_mut<Q>(&mut self, key: &Q) -> Option<&mut T>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.entries.get_mut(key)
    }

    pub fn contains<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &K> {
        self.entries.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&K, &T)> {
        self.entries.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (&K, &mut T)> {
        self.entries.iter_mut()
    }

    /// Remove an entry, deleting it from the backend right away if it was
    /// written. Returns whether the key existed.
    pub fn erase<Q>(&mut self, key: &Q) -> Result<bool>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.attributable.ensure_writable("Erasing an entry")?;
        let Some(child) = self.entries.remove(key) else {
            return Ok(false);
        };
        let child = child.attributable();
        if child.written() {
            child.enqueue(Parameter::DeletePath {
                path: ".".to_string(),
            })?;
            child.flush_handler()?;
        }
        Ok(true)
    }

    pub(crate) fn set_closed(&mut self) {
        self.closed = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attributable::impl_attributable;
    use rustypmd_io::{create_io_handler, Access, BackendConfig, Format, SharedIoHandler};

    #[derive(Debug)]
    struct Leaf {
        attributable: Attributable,
    }

    impl_attributable!(Leaf);

    impl ContainerElement for Leaf {
        fn create(parent: &Writable) -> Self {
            Leaf {
                attributable: Attributable::new(Writable::child(parent)),
            }
        }
    }

    fn setup(access: Access) -> (SharedIoHandler, Writable) {
        let h = create_io_handler("unused", access, Format::Dummy, &BackendConfig::default())
            .unwrap()
            .into_shared();
        let root = Writable::root(&h);
        (h, root)
    }

    #[test]
    fn create_lookup_iterate() {
        let (_h, root) = setup(Access::Create);
        let mut c: Container<String, Leaf> = Container::new(&root);
        c.get_or_create("b").unwrap();
        c.get_or_create("a").unwrap().set_attribute("x", 1i32).unwrap();
        assert_eq!(c.len(), 2);
        assert!(c.contains("a"));
        assert_eq!(c.keys().cloned().collect::<Vec<_>>(), vec!["a", "b"]);
        let leaf = c.get("a").unwrap();
        assert_eq!(leaf.attribute_as::<i32>("x").unwrap(), 1);
        assert!(leaf.writable().parent().unwrap().ptr_eq(c.writable()));
    }

    #[test]
    fn erase_written_child() {
        let (h, root) = setup(Access::Create);
        let mut c: Container<u64, Leaf> = Container::new(&root);
        c.get_or_create(1u64).unwrap().writable().set_written(true);
        c.get_or_create(2u64).unwrap();
        assert!(c.erase(&1u64).unwrap());
        assert!(!c.erase(&1u64).unwrap());
        assert!(c.erase(&2u64).unwrap());
        assert!(c.is_empty());
        assert_eq!(std::cell::RefCell::borrow(&h).pending(), 0);
    }

    #[test]
    fn read_only_and_closed() {
        let (_h, root) = setup(Access::ReadOnly);
        let mut c: Container<String, Leaf> = Container::new(&root);
        assert!(matches!(c.get_or_create("x"), Err(Error::WrongApiUsage(_))));
        c.entry_for_read("x".to_string());
        assert!(c.get_or_create("x").is_ok());

        let (_h, root) = setup(Access::Create);
        let mut c: Container<String, Leaf> = Container::new(&root);
        c.set_closed();
        assert!(matches!(c.get_or_create("y"), Err(Error::WrongApiUsage(_))));
    }
}
