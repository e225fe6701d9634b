//! Record components: the datasets (or constants) holding the actual data.

use std::collections::VecDeque;
use std::ops::{Deref, DerefMut};

use rustypmd_format::{
    num_elements, Attribute, AttributeType, ChunkTable, DataBuffer, Dataset, Datatype, Element,
    Extent, Offset, WrittenChunkInfo,
};
use rustypmd_io::{Parameter, Writable};

use crate::attributable::{impl_attributable, Attributable, HasAttributable, ReadMode};
use crate::error::{Error, Result};

#[derive(Debug)]
struct PendingChunk {
    offset: Offset,
    extent: Extent,
    data: DataBuffer,
}

/// One component of a record, e.g. `x` of the electric field `E`.
///
/// A component is either backed by a dataset, written chunk-wise with
/// [`store_chunk`](Self::store_chunk), or constant, in which case only its
/// value and shape are stored.
#[derive(Debug)]
pub struct RecordComponent {
    attributable: Attributable,
    dataset: Dataset,
    constant: bool,
    extent_changed: bool,
    chunks: VecDeque<PendingChunk>,
}

impl_attributable!(RecordComponent);

impl RecordComponent {
    pub(crate) fn with_writable(writable: Writable) -> Self {
        let mut attributable = Attributable::new(writable);
        attributable.set_attribute_unchecked("unitSI", Attribute::Double(1.0));
        Self {
            attributable,
            dataset: Dataset::new(Datatype::Undefined, vec![1]),
            constant: false,
            extent_changed: false,
            chunks: VecDeque::new(),
        }
    }

    /// Conversion factor to SI units.
    pub fn unit_si(&self) -> Result<f64> {
        self.read_floating_point("unitSI")
    }

    pub fn set_unit_si(&mut self, unit_si: f64) -> Result<&mut Self> {
        self.set_attribute("unitSI", unit_si)?;
        Ok(self)
    }

    /// Declare type and extent of the data.
    ///
    /// Once the component has been written only the extent may change, and
    /// only grow.
    pub fn reset_dataset(&mut self, dataset: Dataset) -> Result<&mut Self> {
        self.ensure_writable("Resetting a dataset")?;
        if self.written() {
            if !self.constant && dataset.dtype != self.dataset.dtype {
                return Err(Error::WrongApiUsage(format!(
                    "Cannot change the datatype of a written dataset from {} to {}",
                    self.dataset.dtype, dataset.dtype
                )));
            }
            self.dataset.extend(dataset.extent)?;
            self.extent_changed = true;
            return Ok(self);
        }
        if dataset.dtype == Datatype::Undefined {
            return Err(Error::WrongApiUsage(
                "Cannot reset a dataset to the UNDEFINED datatype".to_string(),
            ));
        }
        if dataset.extent.is_empty() {
            return Err(Error::WrongApiUsage(
                "Dataset extent must be at least 1D".to_string(),
            ));
        }
        if self.constant {
            self.dataset.extent = dataset.extent;
            self.dataset.rank = self.dataset.extent.len() as u8;
        } else {
            self.dataset = dataset;
        }
        Ok(self)
    }

    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    pub fn dtype(&self) -> Datatype {
        self.dataset.dtype
    }

    pub fn extent(&self) -> &Extent {
        &self.dataset.extent
    }

    pub fn dimensionality(&self) -> usize {
        self.dataset.extent.len()
    }

    pub fn is_constant(&self) -> bool {
        self.constant
    }

    /// Store a single value for every element instead of a dataset.
    pub fn make_constant<T: Element>(&mut self, value: T) -> Result<&mut Self> {
        if self.written() && !self.constant {
            return Err(Error::WrongApiUsage(
                "A record component can not (yet) be made constant after it has been written."
                    .to_string(),
            ));
        }
        self.ensure_writable("Making a component constant")?;
        self.constant = true;
        self.dataset.dtype = T::DATATYPE;
        self.attributable.set_attribute_unchecked("value", value.into());
        Ok(self)
    }

    fn verify_chunk(&self, offset: &[u64], extent: &[u64]) -> Result<()> {
        let ds = &self.dataset.extent;
        if offset.len() != ds.len() || extent.len() != ds.len() {
            return Err(Error::WrongApiUsage(
                "Dimensionality of chunk and dataset do not match.".to_string(),
            ));
        }
        for (i, ((o, e), d)) in offset.iter().zip(extent).zip(ds).enumerate() {
            let end = o.checked_add(*e);
            if end.map_or(true, |end| end > *d) {
                let chunk = end.map_or_else(|| format!("{o} + {e}"), |end| end.to_string());
                return Err(Error::WrongApiUsage(format!(
                    "Chunk does not reside inside dataset (Dimension on index {i} - DS: {d} - Chunk: {chunk})"
                )));
            }
        }
        Ok(())
    }

    /// Queue `data` for writing at `offset`. Written on the next flush.
    pub fn store_chunk<T: Element>(
        &mut self,
        data: Vec<T>,
        offset: Offset,
        extent: Extent,
    ) -> Result<()> {
        self.ensure_writable("Storing a chunk")?;
        if self.constant {
            return Err(Error::WrongApiUsage(
                "Chunks cannot be written for a constant record component".to_string(),
            ));
        }
        if T::DATATYPE != self.dataset.dtype {
            return Err(Error::WrongApiUsage(format!(
                "Datatypes of chunk data ({}) and record component ({}) do not match.",
                T::DATATYPE,
                self.dataset.dtype
            )));
        }
        self.verify_chunk(&offset, &extent)?;
        if data.len() as u64 != num_elements(&extent) {
            return Err(Error::WrongApiUsage(format!(
                "Chunk of {} elements does not fill its extent {:?}",
                data.len(),
                extent
            )));
        }
        self.chunks.push_back(PendingChunk {
            offset,
            extent,
            data: T::into_buffer(data),
        });
        Ok(())
    }

    /// Read a chunk right away. An empty offset and extent select the whole
    /// dataset.
    ///
    /// Pending chunks of this component are written first, so the result
    /// reflects every earlier [`store_chunk`](Self::store_chunk).
    pub fn load_chunk<T: Element>(&mut self, offset: Offset, extent: Extent) -> Result<Vec<T>> {
        let (offset, extent) = if offset.is_empty() && extent.is_empty() {
            (vec![0; self.dimensionality()], self.dataset.extent.clone())
        } else {
            (offset, extent)
        };
        self.verify_chunk(&offset, &extent)?;
        if T::DATATYPE != self.dataset.dtype {
            return Err(Error::WrongApiUsage(
                "Type conversion during chunk loading not yet implemented".to_string(),
            ));
        }
        let n = num_elements(&extent) as usize;
        if self.constant {
            let value: T = self.attribute_as("value")?;
            return Ok(vec![value; n]);
        }
        if !self.written() {
            return Err(Error::WrongApiUsage(
                "Cannot load a chunk of a dataset that has not been flushed yet".to_string(),
            ));
        }
        self.flush_pending()?;
        let buffer = self
            .run(Parameter::ReadDataset {
                offset,
                extent,
                dtype: T::DATATYPE,
            })?
            .into_buffer()?;
        Ok(buffer.into_vec::<T>()?)
    }

    /// Regions of the dataset that hold data.
    pub fn available_chunks(&mut self) -> Result<ChunkTable> {
        if self.constant || !self.written() {
            return Ok(vec![WrittenChunkInfo::new(
                vec![0; self.dimensionality()],
                self.dataset.extent.clone(),
            )]);
        }
        self.flush_pending()?;
        Ok(self.run(Parameter::AvailableChunks)?.into_chunks()?)
    }

    fn flush_pending(&mut self) -> Result<()> {
        if self.extent_changed {
            self.enqueue(Parameter::ExtendDataset {
                extent: self.dataset.extent.clone(),
            })?;
            self.extent_changed = false;
        }
        while let Some(chunk) = self.chunks.pop_front() {
            self.enqueue(Parameter::WriteDataset {
                offset: chunk.offset,
                extent: chunk.extent,
                data: chunk.data,
            })?;
        }
        Ok(())
    }

    /// Queue creation, pending chunks and attributes, `name` being the
    /// dataset or group name below the parent.
    pub(crate) fn flush(&mut self, name: &str) -> Result<()> {
        if self.constant {
            if !self.written() {
                self.enqueue(Parameter::CreatePath {
                    path: name.to_string(),
                })?;
            }
            let shape = Attribute::VecUInt64(self.dataset.extent.clone());
            if self.get_attribute("shape").ok() != Some(&shape) {
                self.attributable.set_attribute_unchecked("shape", shape);
            }
            self.extent_changed = false;
        } else {
            if !self.written() {
                if self.dataset.dtype == Datatype::Undefined {
                    return Err(Error::WrongApiUsage(format!(
                        "Record component '{name}' has no dataset, call reset_dataset first"
                    )));
                }
                self.enqueue(Parameter::CreateDataset {
                    name: name.to_string(),
                    dataset: self.dataset.clone(),
                })?;
                self.extent_changed = false;
            }
            self.flush_pending()?;
        }
        self.attributable.flush_attributes()
    }

    /// Read a component stored as a dataset called `name`.
    pub(crate) fn read_dataset(&mut self, name: &str) -> Result<()> {
        let (dtype, extent) = self
            .run(Parameter::OpenDataset {
                name: name.to_string(),
            })?
            .into_dataset_info()?;
        self.dataset = Dataset::new(dtype, extent);
        self.constant = false;
        self.attributable.read_attributes(ReadMode::FullyReread)
    }

    /// Read a constant component. With `open`, the group of that name is
    /// opened first; otherwise the writable is expected to be open already.
    pub(crate) fn read_constant(&mut self, open: Option<&str>) -> Result<()> {
        if let Some(path) = open {
            self.run(Parameter::OpenPath {
                path: path.to_string(),
            })?;
        }
        self.attributable.read_attributes(ReadMode::FullyReread)?;
        let value = self
            .get_attribute("value")
            .map_err(|_| Error::ReadError("constant component without 'value'".to_string()))?;
        let dtype = value.dtype();
        let shape: Vec<u64> = self
            .attribute_as("shape")
            .map_err(|_| Error::ReadError("constant component without 'shape'".to_string()))?;
        self.dataset = Dataset::new(dtype, shape);
        self.constant = true;
        Ok(())
    }
}

/// A component of a mesh, adding the position of the values within a cell.
#[derive(Debug)]
pub struct MeshRecordComponent {
    component: RecordComponent,
}

impl MeshRecordComponent {
    pub(crate) fn with_writable(writable: Writable) -> Self {
        let mut component = RecordComponent::with_writable(writable);
        component
            .attributable
            .set_attribute_unchecked("position", Attribute::VecDouble(vec![0.0]));
        Self { component }
    }

    /// Relative position of the component within a grid cell.
    pub fn position<T>(&self) -> Result<Vec<T>>
    where
        Vec<T>: AttributeType,
    {
        self.component.attribute_as("position")
    }

    pub fn set_position<T>(&mut self, position: Vec<T>) -> Result<&mut Self>
    where
        Vec<T>: Into<Attribute>,
    {
        self.component.set_attribute("position", position)?;
        Ok(self)
    }
}

impl Deref for MeshRecordComponent {
    type Target = RecordComponent;

    fn deref(&self) -> &RecordComponent {
        &self.component
    }
}

impl DerefMut for MeshRecordComponent {
    fn deref_mut(&mut self) -> &mut RecordComponent {
        &mut self.component
    }
}

/// A component of a particle patch record: one value per patch.
#[derive(Debug)]
pub struct PatchRecordComponent {
    component: RecordComponent,
}

impl PatchRecordComponent {
    pub(crate) fn with_writable(writable: Writable) -> Self {
        Self {
            component: RecordComponent::with_writable(writable),
        }
    }

    /// Queue the value of patch `index`.
    pub fn store<T: Element>(&mut self, index: u64, value: T) -> Result<()> {
        if self.component.dimensionality() != 1 {
            return Err(Error::WrongApiUsage(
                "Patch record components must be one-dimensional".to_string(),
            ));
        }
        self.component.store_chunk(vec![value], vec![index], vec![1])
    }

    /// Read the values of all patches.
    pub fn load<T: Element>(&mut self) -> Result<Vec<T>> {
        self.component.load_chunk(Vec::new(), Vec::new())
    }
}

impl Deref for PatchRecordComponent {
    type Target = RecordComponent;

    fn deref(&self) -> &RecordComponent {
        &self.component
    }
}

impl DerefMut for PatchRecordComponent {
    fn deref_mut(&mut self) -> &mut RecordComponent {
        &mut self.component
    }
}

/// Component types a record can hold.
pub trait Component: HasAttributable {
    /// A component bound to `writable`, which is the record's own writable for
    /// scalar records.
    fn with_writable(writable: Writable) -> Self;
    fn component(&self) -> &RecordComponent;
    fn component_mut(&mut self) -> &mut RecordComponent;
}

impl Component for RecordComponent {
    fn with_writable(writable: Writable) -> Self {
        RecordComponent::with_writable(writable)
    }

    fn component(&self) -> &RecordComponent {
        self
    }

    fn component_mut(&mut self) -> &mut RecordComponent {
        self
    }
}

macro_rules! impl_component {
    ($t:ty, $field:ident) => {
        impl Component for $t {
            fn with_writable(writable: Writable) -> Self {
                <$t>::with_writable(writable)
            }

            fn component(&self) -> &RecordComponent {
                &self.$field
            }

            fn component_mut(&mut self) -> &mut RecordComponent {
                &mut self.$field
            }
        }
    };
}

impl_component!(MeshRecordComponent, component);
impl_component!(PatchRecordComponent, component);

impl HasAttributable for MeshRecordComponent {
    fn attributable(&self) -> &Attributable {
        &self.component.attributable
    }

    fn attributable_mut(&mut self) -> &mut Attributable {
        &mut self.component.attributable
    }
}

impl HasAttributable for PatchRecordComponent {
    fn attributable(&self) -> &Attributable {
        &self.component.attributable
    }

    fn attributable_mut(&mut self) -> &mut Attributable {
        &mut self.component.attributable
    }
}
