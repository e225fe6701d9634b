//! JSON and TOML backend.
//!
//! Each open file is held in memory as one [`serde_json::Value`] and written
//! back on flush if it was modified. Groups are JSON objects, datasets are
//! objects of the form
//!
//! ```text
//! { "datatype": "DOUBLE", "data": [[1.0, 2.0], [null, null]] }
//! ```
//!
//! and attributes live below an `"attributes"` key of their group or dataset:
//!
//! ```text
//! "attributes": { "unitSI": { "datatype": "DOUBLE", "value": 1.0 } }
//! ```
//!
//! Unwritten dataset cells are `null` in JSON. TOML has no null, so TOML
//! datasets start out zero-filled and non-finite floats are kept as `nan`.

use std::collections::hash_map::Entry;
use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};

use rustypmd_format::{
    num_elements, with_buffer, Attribute, ChunkTable, DataBuffer, Dataset, Datatype, Extent,
    Offset, WrittenChunkInfo,
};
use serde::Serialize;
use serde_json::{json, Map, Value};

use crate::access::Access;
use crate::common::{AbstractIoHandlerImplCommon, FilePosition, InvalidatableFile};
use crate::error::{Error, Result};
use crate::handler::AbstractIoHandlerImpl;
use crate::writable::Writable;

/// On-disk syntax of the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dialect {
    Json,
    Toml,
}

impl Dialect {
    pub fn suffix(self) -> &'static str {
        match self {
            Dialect::Json => ".json",
            Dialect::Toml => ".toml",
        }
    }

    fn backend_name(self) -> &'static str {
        match self {
            Dialect::Json => "JSON",
            Dialect::Toml => "TOML",
        }
    }
}

/// A JSON pointer into the file, e.g. `/data/100/meshes/E`. The root is empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JsonFilePosition(String);

impl JsonFilePosition {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Split into the parent pointer and the last key. `None` for the root.
    fn split_last(&self) -> Option<(&str, &str)> {
        let i = self.0.rfind('/')?;
        Some((&self.0[..i], &self.0[i + 1..]))
    }
}

impl FilePosition for JsonFilePosition {
    fn root() -> Self {
        JsonFilePosition(String::new())
    }

    fn extend(&self, segment: &str) -> Self {
        let mut s = self.0.clone();
        for part in segment.split('/').filter(|p| !p.is_empty()) {
            s.push('/');
            s.push_str(part);
        }
        JsonFilePosition(s)
    }
}

/// Backend storing series as JSON or TOML documents.
pub struct JsonIoHandlerImpl {
    common: AbstractIoHandlerImplCommon<JsonFilePosition>,
    access: Access,
    dialect: Dialect,
    indent: Option<usize>,
    json_values: HashMap<InvalidatableFile, Value>,
    dirty: HashSet<InvalidatableFile>,
}

impl JsonIoHandlerImpl {
    pub fn new(directory: impl Into<PathBuf>, access: Access, dialect: Dialect) -> Self {
        Self {
            common: AbstractIoHandlerImplCommon::new(directory),
            access,
            dialect,
            indent: None,
            json_values: HashMap::new(),
            dirty: HashSet::new(),
        }
    }

    /// Pretty-print JSON output with `indent` spaces.
    pub fn with_indent(mut self, indent: Option<usize>) -> Self {
        self.indent = indent;
        self
    }

    fn with_suffix(&self, name: &str) -> String {
        let suffix = self.dialect.suffix();
        if name.ends_with(suffix) {
            name.to_string()
        } else {
            format!("{name}{suffix}")
        }
    }

    fn check_writable(&self, what: &str) -> Result<()> {
        if self.access.is_read_only() {
            return Err(Error::ReadOnly(format!(
                "[{}] {what} in read-only mode is not possible.",
                self.dialect.backend_name()
            )));
        }
        Ok(())
    }

    /// The cached document of `file`, loaded from disk on first access.
    fn contents(&mut self, file: &InvalidatableFile) -> Result<&mut Value> {
        let path = self.common.full_path(file);
        let dialect = self.dialect;
        match self.json_values.entry(file.clone()) {
            Entry::Occupied(e) => Ok(e.into_mut()),
            Entry::Vacant(e) => Ok(e.insert(read_file(&path, dialect)?)),
        }
    }

    /// Write `file` to disk if it was modified.
    fn put_json_contents(&mut self, file: &InvalidatableFile) -> Result<()> {
        if !self.dirty.remove(file) {
            return Ok(());
        }
        let Some(value) = self.json_values.get_mut(file) else {
            return Ok(());
        };
        if let Some(obj) = value.as_object_mut() {
            obj.insert("platform_byte_widths".to_string(), platform_byte_widths());
        }
        let text = serialize(value, self.dialect, self.indent)?;
        let path = self.common.full_path(file);
        fs::write(&path, text)?;
        log::debug!("[{}] wrote {}", self.dialect.backend_name(), path.display());
        Ok(())
    }

    /// Resolve file and position of an existing object for a modifying task.
    fn locate_for_write(&mut self, writable: &Writable) -> Result<(InvalidatableFile, JsonFilePosition)> {
        let file = self.common.refresh_file_from_parent(writable)?;
        let pos = self.common.set_and_get_file_position(writable, false);
        self.dirty.insert(file.clone());
        Ok((file, pos))
    }

    fn locate(&mut self, writable: &Writable) -> Result<(InvalidatableFile, JsonFilePosition)> {
        let file = self.common.refresh_file_from_parent(writable)?;
        let pos = self.common.set_and_get_file_position(writable, false);
        Ok((file, pos))
    }

    /// Shared implementation of DELETE_PATH and DELETE_DATASET.
    fn delete_object(&mut self, writable: &Writable, path: &str, what: &str) -> Result<()> {
        self.check_writable(&format!("Deleting a {what}"))?;
        if !writable.written() {
            return Ok(());
        }
        if path.starts_with('/') {
            return Err(Error::WrongUsage(format!(
                "[{}] Paths passed for deletion should be relative, the given path is absolute (starts with '/')",
                self.dialect.backend_name()
            )));
        }
        let (file, pos) = self.locate_for_write(writable)?;
        let path = path.trim_matches('/');
        let own = path == ".";
        let target = if own { pos } else { pos.extend(path) };
        let Some((parent, key)) = target.split_last() else {
            return Err(Error::WrongUsage(format!(
                "[{}] Cannot delete the root group",
                self.dialect.backend_name()
            )));
        };
        let (parent, key) = (parent.to_string(), key.to_string());
        let root = self.contents(&file)?;
        let removed = root
            .pointer_mut(&parent)
            .and_then(Value::as_object_mut)
            .and_then(|obj| obj.remove(&key));
        if removed.is_none() {
            return Err(Error::NotFound(format!("no {what} at {}", target.as_str())));
        }
        if own {
            self.common.forget(writable);
            writable.set_written(false);
        }
        Ok(())
    }
}

impl Drop for JsonIoHandlerImpl {
    fn drop(&mut self) {
        if let Err(e) = AbstractIoHandlerImpl::flush(self) {
            log::error!("[{}] failed to write files on close: {e}", self.dialect.backend_name());
        }
    }
}

impl AbstractIoHandlerImpl for JsonIoHandlerImpl {
    fn backend_name(&self) -> &'static str {
        self.dialect.backend_name()
    }

    fn flush(&mut self) -> Result<()> {
        let dirty: Vec<InvalidatableFile> = self.dirty.iter().cloned().collect();
        for file in dirty {
            self.put_json_contents(&file)?;
        }
        Ok(())
    }

    fn create_file(&mut self, writable: &Writable, name: &str) -> Result<()> {
        self.check_writable("Creating a file")?;
        if writable.written() {
            return Ok(());
        }
        let name = self.with_suffix(name);
        let (existing, is_new) = self.common.get_possibly_existing(&name);
        let path = self.common.full_path(&existing);
        if self.access == Access::ReadWrite && (!is_new || path.exists()) {
            return Err(Error::WrongUsage(
                "Can only overwrite existing file in CREATE mode.".to_string(),
            ));
        }
        if !is_new {
            self.dirty.remove(&existing);
            self.json_values.remove(&existing);
            existing.invalidate();
        }
        fs::create_dir_all(self.common.directory())?;
        log::info!("[{}] creating {}", self.dialect.backend_name(), path.display());

        let file = InvalidatableFile::new(name);
        self.common.associate_with_file(writable, file.clone());
        self.common.set_position(writable, JsonFilePosition::root());
        self.json_values.insert(file.clone(), json!({}));
        self.dirty.insert(file);
        writable.set_written(true);
        Ok(())
    }

    fn check_file(&mut self, _writable: &Writable, name: &str) -> Result<bool> {
        let name = self.with_suffix(name);
        let (file, is_new) = self.common.get_possibly_existing(&name);
        Ok((!is_new && self.json_values.contains_key(&file)) || self.common.full_path(&file).exists())
    }

    fn open_file(&mut self, writable: &Writable, name: &str) -> Result<()> {
        let dir = self.common.directory();
        if !dir.is_dir() {
            return Err(Error::NoSuchFile(format!(
                "Supplied directory is not valid: {}",
                dir.display()
            )));
        }
        let name = self.with_suffix(name);
        let (file, _) = self.common.get_possibly_existing(&name);
        self.contents(&file)?;
        self.common.associate_with_file(writable, file);
        self.common.set_position(writable, JsonFilePosition::root());
        writable.set_written(true);
        Ok(())
    }

    fn close_file(&mut self, writable: &Writable) -> Result<()> {
        if let Some(file) = self.common.file_of(writable).cloned() {
            self.put_json_contents(&file)?;
            self.json_values.remove(&file);
            file.invalidate();
            self.common.forget_file(&file);
        }
        Ok(())
    }

    fn delete_file(&mut self, writable: &Writable, name: &str) -> Result<()> {
        self.check_writable("Deleting a file")?;
        if !writable.written() {
            return Ok(());
        }
        let name = self.with_suffix(name);
        let (file, _) = self.common.get_possibly_existing(&name);
        let path = self.common.full_path(&file);
        self.dirty.remove(&file);
        self.json_values.remove(&file);
        file.invalidate();
        self.common.forget_file(&file);
        if path.exists() {
            fs::remove_file(&path)?;
        }
        writable.set_written(false);
        Ok(())
    }

    fn create_path(&mut self, writable: &Writable, path: &str) -> Result<()> {
        self.check_writable("Creating a path")?;
        if writable.written() {
            return Ok(());
        }
        let path = path.trim_end_matches('/');
        let (file, base) = self.locate_for_write(writable)?;
        let pos = if path.starts_with('/') {
            JsonFilePosition::root().extend(path)
        } else {
            base.extend(path)
        };
        let root = self.contents(&file)?;
        ensure_path(root, &pos)?;
        self.common.set_position(writable, pos);
        writable.set_written(true);
        Ok(())
    }

    fn open_path(&mut self, writable: &Writable, path: &str) -> Result<()> {
        let file = self.common.refresh_file_from_parent(writable)?;
        let pos = if path.starts_with('/') {
            let pos = JsonFilePosition::root().extend(path);
            self.common.set_position(writable, pos.clone());
            pos
        } else {
            self.common.extend_file_position(writable, path)
        };
        let root = self.contents(&file)?;
        match root.pointer(pos.as_str()) {
            Some(v) if v.is_object() && !is_dataset(v) => {}
            _ => return Err(Error::NotFound(format!("no group at '{}'", pos.as_str()))),
        }
        writable.set_written(true);
        Ok(())
    }

    fn delete_path(&mut self, writable: &Writable, path: &str) -> Result<()> {
        self.delete_object(writable, path, "group")
    }

    fn list_paths(&mut self, writable: &Writable) -> Result<Vec<String>> {
        let (file, pos) = self.locate(writable)?;
        let root = self.contents(&file)?;
        let obj = object_at(root, &pos)?;
        Ok(obj
            .iter()
            .filter(|(k, v)| is_group(k, v))
            .map(|(k, _)| k.clone())
            .collect())
    }

    fn create_dataset(&mut self, writable: &Writable, name: &str, dataset: &Dataset) -> Result<()> {
        self.check_writable("Creating a dataset")?;
        if writable.written() {
            return Ok(());
        }
        if !dataset.dtype.is_dataset_type() {
            return Err(Error::WrongUsage(format!(
                "datasets cannot hold elements of type {}",
                dataset.dtype
            )));
        }
        if !dataset.compression.is_empty() {
            log::warn!(
                "[{}] Compression not supported by this backend, ignoring '{}'",
                self.dialect.backend_name(),
                dataset.compression
            );
        }
        if !dataset.transform.is_empty() {
            log::warn!(
                "[{}] Custom transforms not supported by this backend, ignoring '{}'",
                self.dialect.backend_name(),
                dataset.transform
            );
        }
        let file = self.common.refresh_file_from_parent(writable)?;
        let pos = self.common.extend_file_position(writable, name);
        self.dirty.insert(file.clone());
        let fill = fill_value(self.dialect, dataset.dtype);
        let root = self.contents(&file)?;
        let node = ensure_path(root, &pos)?;
        node.insert("datatype".to_string(), Value::from(dataset.dtype.name()));
        node.insert("data".to_string(), initialize_nd_array(&dataset.extent, &fill));
        writable.set_written(true);
        Ok(())
    }

    fn extend_dataset(&mut self, writable: &Writable, extent: &Extent) -> Result<()> {
        self.check_writable("Extending a dataset")?;
        let (file, pos) = self.locate_for_write(writable)?;
        let dialect = self.dialect;
        let root = self.contents(&file)?;
        let node = dataset_at(root, &pos)?;
        let dtype = stored_dtype(node)?;
        let old_extent = get_extent(&node["data"]);
        if old_extent.len() != extent.len() {
            return Err(Error::WrongUsage(
                "Cannot change dimensionality of a dataset".to_string(),
            ));
        }
        if old_extent.iter().zip(extent).any(|(old, new)| new < old) {
            return Err(Error::WrongUsage(
                "Cannot shrink the extent of a dataset".to_string(),
            ));
        }
        let mut data = initialize_nd_array(extent, &fill_value(dialect, dtype));
        merge_into(&mut data, &node["data"]);
        node["data"] = data;
        Ok(())
    }

    fn open_dataset(&mut self, writable: &Writable, name: &str) -> Result<(Datatype, Extent)> {
        let file = self.common.refresh_file_from_parent(writable)?;
        let pos = self.common.extend_file_position(writable, name);
        let root = self.contents(&file)?;
        let node = dataset_at(root, &pos)?;
        let dtype = stored_dtype(node)?;
        let extent = get_extent(&node["data"]);
        writable.set_written(true);
        Ok((dtype, extent))
    }

    fn delete_dataset(&mut self, writable: &Writable, name: &str) -> Result<()> {
        self.delete_object(writable, name, "dataset")
    }

    fn write_dataset(
        &mut self,
        writable: &Writable,
        offset: &Offset,
        extent: &Extent,
        data: &DataBuffer,
    ) -> Result<()> {
        self.check_writable("Writing a dataset")?;
        if data.len() as u64 != num_elements(extent) {
            return Err(Error::DatasetMismatch(format!(
                "buffer holds {} elements, write request covers {}",
                data.len(),
                num_elements(extent)
            )));
        }
        let (file, pos) = self.locate_for_write(writable)?;
        let backend_name = self.dialect.backend_name();
        let root = self.contents(&file)?;
        let node = dataset_at(root, &pos)?;
        verify_dataset(backend_name, node, offset, extent, data.dtype())?;
        let mult = multiplicators(extent);
        with_buffer!(data, v => sync_multidimensional(
            &mut node["data"],
            offset,
            extent,
            &mult,
            0,
            0,
            &mut |cell: &mut Value, idx: usize| {
                *cell = Value::from(v[idx]);
                Ok(())
            },
        ))
    }

    fn read_dataset(
        &mut self,
        writable: &Writable,
        offset: &Offset,
        extent: &Extent,
        dtype: Datatype,
    ) -> Result<DataBuffer> {
        let (file, pos) = self.locate(writable)?;
        let backend_name = self.dialect.backend_name();
        let root = self.contents(&file)?;
        let node = dataset_at(root, &pos)?;
        verify_dataset(backend_name, node, offset, extent, dtype)?;
        let n = num_elements(extent) as usize;
        let mut buffer = DataBuffer::filled(dtype, n)
            .ok_or_else(|| Error::WrongUsage(format!("cannot read datasets of type {dtype}")))?;
        let mult = multiplicators(extent);
        with_buffer!(&mut buffer, v => sync_multidimensional(
            &mut node["data"],
            offset,
            extent,
            &mult,
            0,
            0,
            &mut |cell: &mut Value, idx: usize| {
                v[idx] = FromJson::from_json(cell)?;
                Ok(())
            },
        ))?;
        Ok(buffer)
    }

    fn list_datasets(&mut self, writable: &Writable) -> Result<Vec<String>> {
        let (file, pos) = self.locate(writable)?;
        let root = self.contents(&file)?;
        let obj = object_at(root, &pos)?;
        Ok(obj
            .iter()
            .filter(|(_, v)| is_dataset(v))
            .map(|(k, _)| k.clone())
            .collect())
    }

    fn delete_attribute(&mut self, writable: &Writable, name: &str) -> Result<()> {
        self.check_writable("Deleting an attribute")?;
        if !writable.written() {
            return Ok(());
        }
        let (file, pos) = self.locate_for_write(writable)?;
        let root = self.contents(&file)?;
        let obj = object_at(root, &pos)?;
        if let Some(attrs) = obj.get_mut("attributes").and_then(Value::as_object_mut) {
            attrs.remove(name);
        }
        Ok(())
    }

    fn write_attribute(&mut self, writable: &Writable, name: &str, value: &Attribute) -> Result<()> {
        self.check_writable("Creating/modifying an attribute")?;
        let (file, pos) = self.locate_for_write(writable)?;
        let root = self.contents(&file)?;
        let node = ensure_path(root, &pos)?;
        let attrs = node
            .entry("attributes")
            .or_insert_with(|| json!({}))
            .as_object_mut()
            .ok_or_else(|| Error::Internal("'attributes' is not an object".to_string()))?;
        attrs.insert(
            name.to_string(),
            json!({
                "datatype": value.dtype().name(),
                "value": attribute_to_json(value),
            }),
        );
        Ok(())
    }

    fn read_attribute(&mut self, writable: &Writable, name: &str) -> Result<Attribute> {
        let (file, pos) = self.locate(writable)?;
        let root = self.contents(&file)?;
        let obj = object_at(root, &pos)?;
        let entry = obj
            .get("attributes")
            .and_then(|a| a.get(name))
            .ok_or_else(|| Error::NoSuchAttribute(name.to_string()))?;
        let dtype: Datatype = entry
            .get("datatype")
            .and_then(Value::as_str)
            .ok_or_else(|| Error::Internal(format!("attribute '{name}' has no datatype")))?
            .parse()?;
        attribute_from_json(dtype, entry.get("value").unwrap_or(&Value::Null))
    }

    fn list_attributes(&mut self, writable: &Writable) -> Result<Vec<String>> {
        let (file, pos) = self.locate(writable)?;
        let root = self.contents(&file)?;
        let obj = object_at(root, &pos)?;
        Ok(obj
            .get("attributes")
            .and_then(Value::as_object)
            .map(|a| a.keys().cloned().collect())
            .unwrap_or_default())
    }

    fn available_chunks(&mut self, writable: &Writable) -> Result<ChunkTable> {
        let (file, pos) = self.locate(writable)?;
        let root = self.contents(&file)?;
        let node = dataset_at(root, &pos)?;
        let mut table = ChunkTable::new();
        chunks_in(&node["data"], &mut Vec::new(), &mut table);
        Ok(table)
    }
}

// ---------------------------------------------------------------------------
// Document navigation
// ---------------------------------------------------------------------------

fn is_dataset(v: &Value) -> bool {
    v.get("data").map_or(false, Value::is_array)
}

fn is_group(key: &str, v: &Value) -> bool {
    key != "attributes" && key != "platform_byte_widths" && v.is_object() && !is_dataset(v)
}

/// The object at `pos`, creating missing groups on the way.
fn ensure_path<'a>(root: &'a mut Value, pos: &JsonFilePosition) -> Result<&'a mut Map<String, Value>> {
    let mut node = root;
    for segment in pos.as_str().split('/').filter(|s| !s.is_empty()) {
        node = node
            .as_object_mut()
            .ok_or_else(|| Error::WrongUsage(format!("'{}' passes through a non-group", pos.as_str())))?
            .entry(segment)
            .or_insert_with(|| json!({}));
    }
    node.as_object_mut()
        .ok_or_else(|| Error::WrongUsage(format!("'{}' is not a group", pos.as_str())))
}

fn object_at<'a>(root: &'a mut Value, pos: &JsonFilePosition) -> Result<&'a mut Map<String, Value>> {
    root.pointer_mut(pos.as_str())
        .and_then(Value::as_object_mut)
        .ok_or_else(|| Error::NotFound(format!("no object at '{}'", pos.as_str())))
}

fn dataset_at<'a>(root: &'a mut Value, pos: &JsonFilePosition) -> Result<&'a mut Value> {
    match root.pointer_mut(pos.as_str()) {
        Some(v) if is_dataset(v) => Ok(v),
        _ => Err(Error::NotFound(format!(
            "Specified dataset '{}' does not exist or is not a dataset.",
            pos.as_str()
        ))),
    }
}

fn stored_dtype(node: &Value) -> Result<Datatype> {
    Ok(node
        .get("datatype")
        .and_then(Value::as_str)
        .ok_or_else(|| Error::Internal("dataset has no datatype".to_string()))?
        .parse()?)
}

// ---------------------------------------------------------------------------
// Datasets
// ---------------------------------------------------------------------------

fn fill_value(dialect: Dialect, dtype: Datatype) -> Value {
    match dialect {
        Dialect::Json => Value::Null,
        Dialect::Toml if dtype.is_floating_point() => json!(0.0),
        Dialect::Toml if dtype == Datatype::Bool => json!(false),
        Dialect::Toml => json!(0),
    }
}

fn initialize_nd_array(extent: &[u64], fill: &Value) -> Value {
    extent.iter().rev().fold(fill.clone(), |inner, &n| {
        Value::Array(vec![inner; n as usize])
    })
}

fn get_extent(data: &Value) -> Extent {
    let mut extent = Extent::new();
    let mut current = data;
    while let Value::Array(items) = current {
        extent.push(items.len() as u64);
        match items.first() {
            Some(first) => current = first,
            None => break,
        }
    }
    extent
}

/// Copy `source` into the same indices of the (larger) `target`.
fn merge_into(target: &mut Value, source: &Value) {
    match (target, source) {
        (Value::Array(t), Value::Array(s)) => {
            for (ti, si) in t.iter_mut().zip(s) {
                merge_into(ti, si);
            }
        }
        (t, s) => *t = s.clone(),
    }
}

fn verify_dataset(
    backend: &str,
    node: &Value,
    offset: &[u64],
    extent: &[u64],
    dtype: Datatype,
) -> Result<()> {
    let ds_extent = get_extent(&node["data"]);
    if offset.len() != extent.len() || extent.len() != ds_extent.len() {
        return Err(Error::DatasetMismatch(format!(
            "[{backend}] Read/Write request does not fit the dataset's dimension"
        )));
    }
    for ((o, e), d) in offset.iter().zip(extent).zip(&ds_extent) {
        if o.checked_add(*e).map_or(true, |end| end > *d) {
            return Err(Error::DatasetMismatch(format!(
                "[{backend}] Read/Write request exceeds the dataset's size"
            )));
        }
    }
    if stored_dtype(node)? != dtype {
        return Err(Error::DatasetMismatch(format!(
            "[{backend}] Read/Write request does not fit the dataset's type"
        )));
    }
    Ok(())
}

/// Row-major strides of a chunk of shape `extent`.
fn multiplicators(extent: &[u64]) -> Vec<u64> {
    let mut mult = vec![1u64; extent.len()];
    for i in (0..extent.len().saturating_sub(1)).rev() {
        mult[i] = mult[i + 1] * extent[i + 1];
    }
    mult
}

/// Visit every cell of the hyperslab `offset`/`extent` together with its
/// row-major index inside the chunk.
fn sync_multidimensional<F>(
    data: &mut Value,
    offset: &[u64],
    extent: &[u64],
    mult: &[u64],
    dim: usize,
    base: usize,
    visit: &mut F,
) -> Result<()>
where
    F: FnMut(&mut Value, usize) -> Result<()>,
{
    let rows = data
        .as_array_mut()
        .ok_or_else(|| Error::DatasetMismatch("Malformed dataset".to_string()))?;
    let start = offset[dim] as usize;
    for i in 0..extent[dim] as usize {
        let cell = rows
            .get_mut(start + i)
            .ok_or_else(|| Error::DatasetMismatch("Malformed dataset".to_string()))?;
        let idx = base + i * mult[dim] as usize;
        if dim + 1 == extent.len() {
            visit(cell, idx)?;
        } else {
            sync_multidimensional(cell, offset, extent, mult, dim + 1, idx, visit)?;
        }
    }
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Coverage {
    Full,
    Empty,
    Partial,
}

fn coverage(v: &Value) -> Coverage {
    match v {
        Value::Null => Coverage::Empty,
        Value::Array(items) => {
            let mut seen_full = false;
            let mut seen_empty = false;
            for item in items {
                match coverage(item) {
                    Coverage::Full => seen_full = true,
                    Coverage::Empty => seen_empty = true,
                    Coverage::Partial => return Coverage::Partial,
                }
            }
            match (seen_full, seen_empty) {
                (true, true) => Coverage::Partial,
                (false, true) | (false, false) => Coverage::Empty,
                (true, false) => Coverage::Full,
            }
        }
        _ => Coverage::Full,
    }
}

/// Collect written regions: runs of fully written rows become one chunk,
/// partially written rows are split further.
fn chunks_in(data: &Value, prefix: &mut Vec<u64>, out: &mut ChunkTable) {
    let Value::Array(rows) = data else {
        return;
    };
    let mut i = 0;
    while i < rows.len() {
        match coverage(&rows[i]) {
            Coverage::Full => {
                let start = i;
                while i < rows.len() && coverage(&rows[i]) == Coverage::Full {
                    i += 1;
                }
                let sub = get_extent(&rows[start]);
                let mut offset = prefix.clone();
                offset.push(start as u64);
                offset.extend(std::iter::repeat(0).take(sub.len()));
                let mut extent = vec![1u64; prefix.len()];
                extent.push((i - start) as u64);
                extent.extend(sub);
                out.push(WrittenChunkInfo::new(offset, extent));
                continue;
            }
            Coverage::Partial => {
                prefix.push(i as u64);
                chunks_in(&rows[i], prefix, out);
                prefix.pop();
            }
            Coverage::Empty => {}
        }
        i += 1;
    }
}

// ---------------------------------------------------------------------------
// Element and attribute conversion
// ---------------------------------------------------------------------------

trait FromJson: Sized {
    fn from_json(v: &Value) -> Result<Self>;
}

macro_rules! impl_from_json_int {
    ($($t:ty),*) => {
        $(
            impl FromJson for $t {
                fn from_json(v: &Value) -> Result<Self> {
                    if v.is_null() {
                        return Err(Error::DatasetMismatch(
                            "Read request covers unwritten integer data".to_string(),
                        ));
                    }
                    v.as_i64()
                        .and_then(|x| <$t>::try_from(x).ok())
                        .or_else(|| v.as_u64().and_then(|x| <$t>::try_from(x).ok()))
                        .ok_or_else(|| {
                            Error::DatasetMismatch(format!("cannot read {v} as {}", stringify!($t)))
                        })
                }
            }
        )*
    };
}

impl_from_json_int!(i8, u8, i16, i32, i64, u16, u32, u64);

impl FromJson for f64 {
    fn from_json(v: &Value) -> Result<Self> {
        match v {
            Value::Number(n) => n
                .as_f64()
                .ok_or_else(|| Error::DatasetMismatch(format!("cannot read {v} as f64"))),
            // non-finite values are stored as null
            _ => Ok(f64::NAN),
        }
    }
}

impl FromJson for f32 {
    fn from_json(v: &Value) -> Result<Self> {
        f64::from_json(v).map(|x| x as f32)
    }
}

impl FromJson for bool {
    fn from_json(v: &Value) -> Result<Self> {
        v.as_bool()
            .ok_or_else(|| Error::DatasetMismatch(format!("cannot read {v} as bool")))
    }
}

impl FromJson for String {
    fn from_json(v: &Value) -> Result<Self> {
        v.as_str()
            .map(str::to_string)
            .ok_or_else(|| Error::DatasetMismatch(format!("cannot read {v} as string")))
    }
}

fn json_vec<T: FromJson>(v: &Value) -> Result<Vec<T>> {
    v.as_array()
        .ok_or_else(|| Error::DatasetMismatch(format!("expected an array, found {v}")))?
        .iter()
        .map(T::from_json)
        .collect()
}

fn attribute_to_json(attr: &Attribute) -> Value {
    match attr {
        Attribute::Char(v) => Value::from(*v),
        Attribute::UChar(v) => Value::from(*v),
        Attribute::Int16(v) => Value::from(*v),
        Attribute::Int32(v) => Value::from(*v),
        Attribute::Int64(v) => Value::from(*v),
        Attribute::UInt16(v) => Value::from(*v),
        Attribute::UInt32(v) => Value::from(*v),
        Attribute::UInt64(v) => Value::from(*v),
        Attribute::Float(v) => Value::from(*v),
        Attribute::Double(v) => Value::from(*v),
        Attribute::String(v) => Value::from(v.as_str()),
        Attribute::VecChar(v) => Value::from(v.clone()),
        Attribute::VecUChar(v) => Value::from(v.clone()),
        Attribute::VecInt16(v) => Value::from(v.clone()),
        Attribute::VecInt32(v) => Value::from(v.clone()),
        Attribute::VecInt64(v) => Value::from(v.clone()),
        Attribute::VecUInt16(v) => Value::from(v.clone()),
        Attribute::VecUInt32(v) => Value::from(v.clone()),
        Attribute::VecUInt64(v) => Value::from(v.clone()),
        Attribute::VecFloat(v) => Value::from(v.clone()),
        Attribute::VecDouble(v) => Value::from(v.clone()),
        Attribute::VecString(v) => Value::from(v.clone()),
        Attribute::ArrDbl7(v) => Value::from(v.to_vec()),
        Attribute::Bool(v) => Value::from(*v),
    }
}

fn attribute_from_json(dtype: Datatype, v: &Value) -> Result<Attribute> {
    Ok(match dtype {
        Datatype::Char => Attribute::Char(FromJson::from_json(v)?),
        Datatype::UChar => Attribute::UChar(FromJson::from_json(v)?),
        Datatype::Int16 => Attribute::Int16(FromJson::from_json(v)?),
        Datatype::Int32 => Attribute::Int32(FromJson::from_json(v)?),
        Datatype::Int64 => Attribute::Int64(FromJson::from_json(v)?),
        Datatype::UInt16 => Attribute::UInt16(FromJson::from_json(v)?),
        Datatype::UInt32 => Attribute::UInt32(FromJson::from_json(v)?),
        Datatype::UInt64 => Attribute::UInt64(FromJson::from_json(v)?),
        Datatype::Float => Attribute::Float(FromJson::from_json(v)?),
        Datatype::Double => Attribute::Double(FromJson::from_json(v)?),
        Datatype::String => Attribute::String(FromJson::from_json(v)?),
        Datatype::VecChar => Attribute::VecChar(json_vec(v)?),
        Datatype::VecUChar => Attribute::VecUChar(json_vec(v)?),
        Datatype::VecInt16 => Attribute::VecInt16(json_vec(v)?),
        Datatype::VecInt32 => Attribute::VecInt32(json_vec(v)?),
        Datatype::VecInt64 => Attribute::VecInt64(json_vec(v)?),
        Datatype::VecUInt16 => Attribute::VecUInt16(json_vec(v)?),
        Datatype::VecUInt32 => Attribute::VecUInt32(json_vec(v)?),
        Datatype::VecUInt64 => Attribute::VecUInt64(json_vec(v)?),
        Datatype::VecFloat => Attribute::VecFloat(json_vec(v)?),
        Datatype::VecDouble => Attribute::VecDouble(json_vec(v)?),
        Datatype::VecString => Attribute::VecString(json_vec(v)?),
        Datatype::ArrDbl7 => {
            let values: Vec<f64> = json_vec(v)?;
            Attribute::ArrDbl7(values.try_into().map_err(|_| {
                Error::DatasetMismatch("ARR_DBL_7 attribute must have 7 entries".to_string())
            })?)
        }
        Datatype::Bool => Attribute::Bool(FromJson::from_json(v)?),
        Datatype::Undefined => {
            return Err(Error::Internal("attribute of undefined datatype".to_string()))
        }
    })
}

fn platform_byte_widths() -> Value {
    let widths: Map<String, Value> = Datatype::ALL
        .iter()
        .filter(|d| d.is_dataset_type())
        .map(|d| (d.name().to_string(), Value::from(d.size())))
        .collect();
    Value::Object(widths)
}

// ---------------------------------------------------------------------------
// Files
// ---------------------------------------------------------------------------

fn read_file(path: &Path, dialect: Dialect) -> Result<Value> {
    let text = match fs::read_to_string(path) {
        Ok(t) => t,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(Error::NoSuchFile(path.display().to_string()))
        }
        Err(e) => return Err(e.into()),
    };
    parse_document(&text, dialect)
}

/// Parse a document in either dialect into the JSON data model.
pub(crate) fn parse_document(text: &str, dialect: Dialect) -> Result<Value> {
    match dialect {
        Dialect::Json => Ok(serde_json::from_str(text)?),
        Dialect::Toml => {
            let table: toml::Table = toml::from_str(text)?;
            Ok(toml_to_json(toml::Value::Table(table)))
        }
    }
}

fn serialize(value: &Value, dialect: Dialect, indent: Option<usize>) -> Result<String> {
    match (dialect, indent) {
        (Dialect::Json, None) => Ok(serde_json::to_string(value)?),
        (Dialect::Json, Some(n)) => {
            let indent = " ".repeat(n);
            let mut buf = Vec::new();
            let formatter = serde_json::ser::PrettyFormatter::with_indent(indent.as_bytes());
            let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
            value.serialize(&mut ser)?;
            String::from_utf8(buf).map_err(|e| Error::Internal(e.to_string()))
        }
        (Dialect::Toml, _) => Ok(toml::to_string(&json_to_toml(value)?)?),
    }
}

pub(crate) fn toml_to_json(v: toml::Value) -> Value {
    match v {
        toml::Value::String(s) => Value::String(s),
        toml::Value::Integer(i) => Value::from(i),
        toml::Value::Float(f) => serde_json::Number::from_f64(f)
            .map(Value::Number)
            .unwrap_or(Value::Null),
        toml::Value::Boolean(b) => Value::Bool(b),
        toml::Value::Datetime(d) => Value::String(d.to_string()),
        toml::Value::Array(items) => Value::Array(items.into_iter().map(toml_to_json).collect()),
        toml::Value::Table(t) => {
            Value::Object(t.into_iter().map(|(k, v)| (k, toml_to_json(v))).collect())
        }
    }
}

fn json_to_toml(v: &Value) -> Result<toml::Value> {
    Ok(match v {
        Value::Null => toml::Value::Float(f64::NAN),
        Value::Bool(b) => toml::Value::Boolean(*b),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                toml::Value::Integer(i)
            } else if let Some(u) = n.as_u64() {
                return Err(Error::WrongUsage(format!(
                    "TOML cannot represent the integer {u}"
                )));
            } else {
                toml::Value::Float(n.as_f64().unwrap_or(f64::NAN))
            }
        }
        Value::String(s) => toml::Value::String(s.clone()),
        Value::Array(items) => {
            toml::Value::Array(items.iter().map(json_to_toml).collect::<Result<_>>()?)
        }
        Value::Object(obj) => toml::Value::Table(
            obj.iter()
                .map(|(k, v)| Ok((k.clone(), json_to_toml(v)?)))
                .collect::<Result<_>>()?,
        ),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    // -----------------------------------------------------------------------
    // Helpers
    // -----------------------------------------------------------------------

    #[test]
    fn positions_extend_segment_wise() {
        let p = JsonFilePosition::root().extend("/data/100/").extend("meshes");
        assert_eq!(p.as_str(), "/data/100/meshes");
        assert_eq!(p.split_last(), Some(("/data/100", "meshes")));
        assert_eq!(JsonFilePosition::root().split_last(), None);
    }

    #[test]
    fn nd_array_shape() {
        let a = initialize_nd_array(&[2, 3], &Value::Null);
        assert_eq!(a, json!([[null, null, null], [null, null, null]]));
        assert_eq!(get_extent(&a), vec![2, 3]);
        assert_eq!(multiplicators(&[2, 3, 4]), vec![12, 4, 1]);
    }

    #[test]
    fn merge_keeps_old_values() {
        let mut target = initialize_nd_array(&[3], &Value::Null);
        merge_into(&mut target, &json!([1, 2]));
        assert_eq!(target, json!([1, 2, null]));
    }

    // -----------------------------------------------------------------------
    // Chunk detection
    // -----------------------------------------------------------------------

    #[test]
    fn chunks_of_partially_written_2d() {
        let data = json!([
            [1, 2, 3],
            [4, 5, 6],
            [null, null, null],
            [7, null, null]
        ]);
        let mut table = ChunkTable::new();
        chunks_in(&data, &mut Vec::new(), &mut table);
        assert_eq!(
            table,
            vec![
                WrittenChunkInfo::new(vec![0, 0], vec![2, 3]),
                WrittenChunkInfo::new(vec![3, 0], vec![1, 1]),
            ]
        );
    }

    #[test]
    fn chunks_of_empty_dataset() {
        let mut table = ChunkTable::new();
        chunks_in(&json!([null, null]), &mut Vec::new(), &mut table);
        assert!(table.is_empty());
    }

    // -----------------------------------------------------------------------
    // Conversion
    // -----------------------------------------------------------------------

    #[test]
    fn null_float_reads_as_nan() {
        assert!(f64::from_json(&Value::Null).unwrap().is_nan());
        assert!(i32::from_json(&Value::Null).is_err());
        assert!(u8::from_json(&json!(300)).is_err());
    }

    #[test]
    fn attribute_json_shapes() {
        let a = Attribute::ArrDbl7([1.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0]);
        let v = attribute_to_json(&a);
        assert_eq!(attribute_from_json(Datatype::ArrDbl7, &v).unwrap(), a);
        let s = Attribute::from(vec!["x", "y"]);
        assert_eq!(attribute_to_json(&s), json!(["x", "y"]));
    }

    #[test]
    fn toml_translation_keeps_nan() {
        let v = json!({"a": {"b": [1.5, null]}, "n": 3});
        let t = json_to_toml(&v).unwrap();
        let text = toml::to_string(&t).unwrap();
        let back = parse_document(&text, Dialect::Toml).unwrap();
        assert_eq!(back["n"], json!(3));
        assert_eq!(back["a"]["b"][0], json!(1.5));
        assert!(back["a"]["b"][1].is_null());
        assert!(json_to_toml(&json!(u64::MAX)).is_err());
    }
}
