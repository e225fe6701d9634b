//! Records: named quantities made of one or more components.

use std::collections::BTreeMap;
use std::ops::{Deref, DerefMut};

use rustypmd_format::{unit_dimension, Attribute, AttributeType, UnitDimension};
use rustypmd_io::{Parameter, Writable};

use crate::attributable::{Attributable, HasAttributable, ReadMode};
use crate::container::ContainerElement;
use crate::error::{Error, Result};
use crate::record_component::{Component, PatchRecordComponent, RecordComponent};

/// Component name of records with a single component.
pub const SCALAR: &str = "\u{b}Scalar";

/// A record of particle data, e.g. `position` with components `x`, `y`, `z`.
pub type Record = BaseRecord<RecordComponent>;

/// A record of a particle patch, e.g. `offset` or `numParticles`.
pub type PatchRecord = BaseRecord<PatchRecordComponent>;

/// Components plus the attributes shared by all of them.
///
/// A record is either scalar, holding only the [`SCALAR`] component stored at
/// the record's own path, or has any number of named components.
#[derive(Debug)]
pub struct BaseRecord<T> {
    attributable: Attributable,
    components: BTreeMap<String, T>,
}

impl<T> Deref for BaseRecord<T> {
    type Target = Attributable;

    fn deref(&self) -> &Attributable {
        &self.attributable
    }
}

impl<T> DerefMut for BaseRecord<T> {
    fn deref_mut(&mut self) -> &mut Attributable {
        &mut self.attributable
    }
}

impl<T> HasAttributable for BaseRecord<T> {
    fn attributable(&self) -> &Attributable {
        &self.attributable
    }

    fn attributable_mut(&mut self) -> &mut Attributable {
        &mut self.attributable
    }
}

impl<T: Component> ContainerElement for BaseRecord<T> {
    fn create(parent: &Writable) -> Self {
        Self::with_parent(parent)
    }
}

impl<T: Component> BaseRecord<T> {
    pub(crate) fn with_parent(parent: &Writable) -> Self {
        let mut attributable = Attributable::new(Writable::child(parent));
        attributable.set_attribute_unchecked("unitDimension", Attribute::ArrDbl7([0.0; 7]));
        attributable.set_attribute_unchecked("timeOffset", Attribute::Float(0.0));
        Self {
            attributable,
            components: BTreeMap::new(),
        }
    }

    /// The component `key`, created if missing.
    pub fn get_or_create(&mut self, key: &str) -> Result<&mut T> {
        if !self.components.contains_key(key) {
            self.attributable.ensure_writable("Creating a record component")?;
            let scalar = key == SCALAR;
            if (scalar && !self.components.is_empty())
                || (!scalar && self.components.contains_key(SCALAR))
            {
                return Err(Error::WrongApiUsage(
                    "A scalar component can not be contained at the same time as one or more regular components."
                        .to_string(),
                ));
            }
        }
        Ok(self.component_entry(key))
    }

    fn component_entry(&mut self, key: &str) -> &mut T {
        let writable = self.attributable.writable();
        let writable = if key == SCALAR {
            writable.clone()
        } else {
            Writable::child(writable)
        };
        self.components
            .entry(key.to_string())
            .or_insert_with(|| T::with_writable(writable))
    }

    /// The single component of a scalar record, created if missing.
    pub fn scalar_mut(&mut self) -> Result<&mut T> {
        self.get_or_create(SCALAR)
    }

    pub fn scalar(&self) -> Option<&T> {
        self.components.get(SCALAR)
    }

    pub fn is_scalar(&self) -> bool {
        self.components.contains_key(SCALAR)
    }

    pub fn get(&self, key: &str) -> Option<&T> {
        self.components.get(key)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut T> {
        self.components.get_mut(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.components.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.components.len()
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.components.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &T)> {
        self.components.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (&String, &mut T)> {
        self.components.iter_mut()
    }

    /// Remove a component, deleting it from the backend right away if it was
    /// written.
    pub fn erase(&mut self, key: &str) -> Result<bool> {
        self.attributable.ensure_writable("Erasing a record component")?;
        let Some(component) = self.components.remove(key) else {
            return Ok(false);
        };
        let rc = component.component();
        if rc.written() {
            let parameter = if rc.is_constant() {
                Parameter::DeletePath {
                    path: ".".to_string(),
                }
            } else {
                Parameter::DeleteDataset {
                    name: ".".to_string(),
                }
            };
            rc.enqueue(parameter)?;
            rc.flush_handler()?;
        }
        Ok(true)
    }

    /// Powers of the SI base units of this quantity.
    pub fn unit_dimension(&self) -> Result<BTreeMap<UnitDimension, f64>> {
        let array: [f64; 7] = self.attribute_as("unitDimension")?;
        Ok(unit_dimension::as_map(&array))
    }

    /// Set the powers of the given base units, keeping the others.
    pub fn set_unit_dimension(&mut self, dims: &BTreeMap<UnitDimension, f64>) -> Result<&mut Self> {
        let base: [f64; 7] = self.attribute_as("unitDimension").unwrap_or([0.0; 7]);
        self.set_attribute("unitDimension", unit_dimension::as_array(dims, base))?;
        Ok(self)
    }

    pub fn time_offset<F: AttributeType>(&self) -> Result<F> {
        self.read_floating_point("timeOffset")
    }

    pub fn set_time_offset<F: Into<Attribute>>(&mut self, offset: F) -> Result<&mut Self> {
        self.set_attribute("timeOffset", offset)?;
        Ok(self)
    }

    pub(crate) fn flush(&mut self, name: &str) -> Result<()> {
        if let Some(scalar) = self.components.get_mut(SCALAR) {
            scalar.component_mut().flush(name)?;
        } else {
            if !self.attributable.written() {
                self.attributable.enqueue(Parameter::CreatePath {
                    path: name.to_string(),
                })?;
            }
            for (key, component) in self.components.iter_mut() {
                component.component_mut().flush(key)?;
            }
        }
        self.attributable.flush_attributes()
    }

    /// Read a scalar record stored as the dataset `name`.
    pub(crate) fn read_from_dataset(&mut self, name: &str) -> Result<()> {
        self.component_entry(SCALAR)
            .component_mut()
            .read_dataset(name)?;
        self.attributable.read_attributes(ReadMode::FullyReread)
    }

    /// Read a record stored as the group `name`: either a constant scalar
    /// record or a group of components.
    pub(crate) fn read_from_group(&mut self, name: &str) -> Result<()> {
        self.attributable.run(Parameter::OpenPath {
            path: name.to_string(),
        })?;
        let attributes = self.attributable.run(Parameter::ListAtts)?.into_names()?;
        if attributes.iter().any(|a| a == "value") {
            self.component_entry(SCALAR)
                .component_mut()
                .read_constant(None)?;
        } else {
            let paths = self.attributable.run(Parameter::ListPaths)?.into_names()?;
            for path in paths {
                self.component_entry(&path)
                    .component_mut()
                    .read_constant(Some(&path))?;
            }
            let datasets = self.attributable.run(Parameter::ListDatasets)?.into_names()?;
            for dataset in datasets {
                self.component_entry(&dataset)
                    .component_mut()
                    .read_dataset(&dataset)?;
            }
        }
        self.attributable.read_attributes(ReadMode::FullyReread)
    }
}
