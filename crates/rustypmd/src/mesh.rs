//! Meshes: records of field data on a regular grid.

use std::fmt;
use std::ops::{Deref, DerefMut};
use std::str::FromStr;

use rustypmd_format::{Attribute, AttributeType};
use rustypmd_io::Writable;

use crate::attributable::{Attributable, HasAttributable};
use crate::container::ContainerElement;
use crate::error::{Error, Result};
use crate::record::BaseRecord;
use crate::record_component::MeshRecordComponent;

/// Geometry of the grid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Geometry {
    Cartesian,
    ThetaMode,
    Cylindrical,
    Spherical,
    /// A geometry outside the standard, stored as `other:<name>`.
    Other(String),
}

impl fmt::Display for Geometry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Geometry::Cartesian => f.write_str("cartesian"),
            Geometry::ThetaMode => f.write_str("thetaMode"),
            Geometry::Cylindrical => f.write_str("cylindrical"),
            Geometry::Spherical => f.write_str("spherical"),
            Geometry::Other(name) => write!(f, "other:{name}"),
        }
    }
}

impl FromStr for Geometry {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Ok(match s {
            "cartesian" => Geometry::Cartesian,
            "thetaMode" => Geometry::ThetaMode,
            "cylindrical" => Geometry::Cylindrical,
            "spherical" => Geometry::Spherical,
            other => Geometry::Other(other.strip_prefix("other:").unwrap_or(other).to_string()),
        })
    }
}

/// Memory layout of the mesh data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataOrder {
    /// Row-major, last index fastest.
    C,
    /// Column-major, first index fastest.
    F,
}

impl DataOrder {
    fn as_str(self) -> &'static str {
        match self {
            DataOrder::C => "C",
            DataOrder::F => "F",
        }
    }
}

impl FromStr for DataOrder {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "C" => Ok(DataOrder::C),
            "F" => Ok(DataOrder::F),
            other => Err(Error::ReadError(format!("Unknown data order '{other}'"))),
        }
    }
}

/// A field on a grid, e.g. the electric field `E` with components `x`, `y`, `z`.
///
/// Grid attributes are kept as attributes of the record; the accessors below
/// convert them.
#[derive(Debug)]
pub struct Mesh {
    record: BaseRecord<MeshRecordComponent>,
}

impl Deref for Mesh {
    type Target = BaseRecord<MeshRecordComponent>;

    fn deref(&self) -> &Self::Target {
        &self.record
    }
}

impl DerefMut for Mesh {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.record
    }
}

impl HasAttributable for Mesh {
    fn attributable(&self) -> &Attributable {
        self.record.attributable()
    }

    fn attributable_mut(&mut self) -> &mut Attributable {
        self.record.attributable_mut()
    }
}

impl ContainerElement for Mesh {
    fn create(parent: &Writable) -> Self {
        let mut record = BaseRecord::with_parent(parent);
        let a = record.attributable_mut();
        a.set_attribute_unchecked("geometry", Attribute::from(Geometry::Cartesian.to_string()));
        a.set_attribute_unchecked("dataOrder", Attribute::from(DataOrder::C.as_str()));
        a.set_attribute_unchecked("axisLabels", Attribute::from(vec!["x"]));
        a.set_attribute_unchecked("gridSpacing", Attribute::VecDouble(vec![1.0]));
        a.set_attribute_unchecked("gridGlobalOffset", Attribute::VecDouble(vec![0.0]));
        a.set_attribute_unchecked("gridUnitSI", Attribute::Double(1.0));
        Mesh { record }
    }
}

impl Mesh {
    pub fn geometry(&self) -> Result<Geometry> {
        self.attribute_as::<String>("geometry")?.parse()
    }

    pub fn set_geometry(&mut self, geometry: Geometry) -> Result<&mut Self> {
        self.set_attribute("geometry", geometry.to_string())?;
        Ok(self)
    }

    pub fn geometry_parameters(&self) -> Result<String> {
        self.attribute_as("geometryParameters")
    }

    pub fn set_geometry_parameters(&mut self, parameters: &str) -> Result<&mut Self> {
        self.set_attribute("geometryParameters", parameters)?;
        Ok(self)
    }

    pub fn data_order(&self) -> Result<DataOrder> {
        self.attribute_as::<String>("dataOrder")?.parse()
    }

    pub fn set_data_order(&mut self, order: DataOrder) -> Result<&mut Self> {
        self.set_attribute("dataOrder", order.as_str())?;
        Ok(self)
    }

    /// Axis names, slowest varying index first for [`DataOrder::C`].
    pub fn axis_labels(&self) -> Result<Vec<String>> {
        self.attribute_as("axisLabels")
    }

    pub fn set_axis_labels(&mut self, labels: &[&str]) -> Result<&mut Self> {
        self.set_attribute("axisLabels", labels.to_vec())?;
        Ok(self)
    }

    pub fn grid_spacing<T>(&self) -> Result<Vec<T>>
    where
        Vec<T>: AttributeType,
    {
        self.attribute_as("gridSpacing")
    }

    pub fn set_grid_spacing<T>(&mut self, spacing: Vec<T>) -> Result<&mut Self>
    where
        Vec<T>: Into<Attribute>,
    {
        self.set_attribute("gridSpacing", spacing)?;
        Ok(self)
    }

    pub fn grid_global_offset(&self) -> Result<Vec<f64>> {
        self.attribute_as("gridGlobalOffset")
    }

    pub fn set_grid_global_offset(&mut self, offset: Vec<f64>) -> Result<&mut Self> {
        self.set_attribute("gridGlobalOffset", offset)?;
        Ok(self)
    }

    pub fn grid_unit_si(&self) -> Result<f64> {
        self.read_floating_point("gridUnitSI")
    }

    pub fn set_grid_unit_si(&mut self, unit_si: f64) -> Result<&mut Self> {
        self.set_attribute("gridUnitSI", unit_si)?;
        Ok(self)
    }

    pub(crate) fn flush(&mut self, name: &str) -> Result<()> {
        self.record.flush(name)
    }

    pub(crate) fn read_from_group(&mut self, name: &str) -> Result<()> {
        self.record.read_from_group(name)
    }

    pub(crate) fn read_from_dataset(&mut self, name: &str) -> Result<()> {
        self.record.read_from_dataset(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rustypmd_io::{create_io_handler, Access, BackendConfig, Format, SharedIoHandler};

    fn mesh() -> (SharedIoHandler, Mesh) {
        let h = create_io_handler("unused", Access::Create, Format::Dummy, &BackendConfig::default())
            .unwrap()
            .into_shared();
        let root = Writable::root(&h);
        let m = Mesh::create(&root);
        (h, m)
    }

    #[test]
    fn defaults() {
        let (_h, m) = mesh();
        assert_eq!(m.geometry().unwrap(), Geometry::Cartesian);
        assert_eq!(m.data_order().unwrap(), DataOrder::C);
        assert_eq!(m.axis_labels().unwrap(), vec!["x".to_string()]);
        assert_eq!(m.grid_spacing::<f64>().unwrap(), vec![1.0]);
        assert_eq!(m.grid_global_offset().unwrap(), vec![0.0]);
        assert_eq!(m.grid_unit_si().unwrap(), 1.0);
        assert!(m.unit_dimension().unwrap().is_empty());
        assert_eq!(m.time_offset::<f32>().unwrap(), 0.0);
    }

    #[test]
    fn geometry_names() {
        let (_h, mut m) = mesh();
        m.set_geometry(Geometry::ThetaMode).unwrap();
        assert_eq!(m.get_attribute("geometry").unwrap().as_str(), Some("thetaMode"));
        m.set_geometry(Geometry::Other("hexagonal".into())).unwrap();
        assert_eq!(m.get_attribute("geometry").unwrap().as_str(), Some("other:hexagonal"));
        assert_eq!(m.geometry().unwrap(), Geometry::Other("hexagonal".into()));
    }

    #[test]
    fn grid_setters() {
        let (_h, mut m) = mesh();
        m.set_axis_labels(&["z", "y", "x"])
            .unwrap()
            .set_grid_spacing(vec![0.5f32, 0.5, 1.0])
            .unwrap()
            .set_data_order(DataOrder::F)
            .unwrap();
        assert_eq!(m.axis_labels().unwrap().len(), 3);
        assert_eq!(m.grid_spacing::<f32>().unwrap(), vec![0.5, 0.5, 1.0]);
        assert_eq!(m.data_order().unwrap(), DataOrder::F);
    }

    #[test]
    fn components_carry_position() {
        let (_h, mut m) = mesh();
        let x = m.get_or_create("x").unwrap();
        assert_eq!(x.position::<f64>().unwrap(), vec![0.0]);
        x.set_position(vec![0.5f64]).unwrap();
        assert_eq!(x.position::<f64>().unwrap(), vec![0.5]);
    }
}
