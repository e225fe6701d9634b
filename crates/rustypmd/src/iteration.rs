//! Iterations: the state of the simulation at one point in time.

use rustypmd_format::{Attribute, AttributeType};
use rustypmd_io::{Parameter, Writable};

use crate::attributable::{impl_attributable, Attributable, ReadMode};
use crate::container::{Container, ContainerElement};
use crate::error::{Error, Result};
use crate::mesh::Mesh;
use crate::particle::ParticleSpecies;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum CloseStatus {
    Open,
    /// Closed by the user, the next flush of the series finishes the job.
    ClosePending,
    Closed,
}

/// Meshes and particle species belonging to one iteration.
#[derive(Debug)]
pub struct Iteration {
    attributable: Attributable,
    pub meshes: Container<String, Mesh>,
    pub particles: Container<String, ParticleSpecies>,
    close_status: CloseStatus,
}

impl_attributable!(Iteration);

impl ContainerElement for Iteration {
    fn create(parent: &Writable) -> Self {
        let mut attributable = Attributable::new(Writable::child(parent));
        attributable.set_attribute_unchecked("time", Attribute::Double(0.0));
        attributable.set_attribute_unchecked("dt", Attribute::Double(1.0));
        attributable.set_attribute_unchecked("timeUnitSI", Attribute::Double(1.0));
        let meshes = Container::new(attributable.writable());
        let particles = Container::new(attributable.writable());
        Self {
            attributable,
            meshes,
            particles,
            close_status: CloseStatus::Open,
        }
    }
}

impl Iteration {
    /// Simulation time, in units of [`time_unit_si`](Self::time_unit_si).
    pub fn time<F: AttributeType>(&self) -> Result<F> {
        self.read_floating_point("time")
    }

    pub fn set_time<F: Into<Attribute>>(&mut self, time: F) -> Result<&mut Self> {
        self.set_attribute("time", time)?;
        Ok(self)
    }

    /// Time step leading to this iteration.
    pub fn dt<F: AttributeType>(&self) -> Result<F> {
        self.read_floating_point("dt")
    }

    pub fn set_dt<F: Into<Attribute>>(&mut self, dt: F) -> Result<&mut Self> {
        self.set_attribute("dt", dt)?;
        Ok(self)
    }

    pub fn time_unit_si(&self) -> Result<f64> {
        self.read_floating_point("timeUnitSI")
    }

    pub fn set_time_unit_si(&mut self, unit_si: f64) -> Result<&mut Self> {
        self.set_attribute("timeUnitSI", unit_si)?;
        Ok(self)
    }

    /// Close the iteration.
    ///
    /// The data is written by the next flush of the series, which also closes
    /// the iteration's file for file-based series. No new meshes or species can
    /// be added afterwards.
    pub fn close(&mut self) -> &mut Self {
        if self.close_status == CloseStatus::Open {
            self.close_status = CloseStatus::ClosePending;
        }
        self.meshes.set_closed();
        self.particles.set_closed();
        self
    }

    pub fn closed(&self) -> bool {
        self.close_status != CloseStatus::Open
    }

    pub(crate) fn close_status(&self) -> CloseStatus {
        self.close_status
    }

    pub(crate) fn set_close_status(&mut self, status: CloseStatus) {
        self.close_status = status;
        self.attributable
            .writable()
            .set_closed(status == CloseStatus::Closed);
    }

    /// Queue everything below this iteration. `name` is the group name of the
    /// iteration, the paths are the series' `meshesPath` and `particlesPath`.
    pub(crate) fn flush(&mut self, name: &str, meshes_path: &str, particles_path: &str) -> Result<()> {
        let path = name.to_string();
        if self.written() {
            self.attributable.enqueue(Parameter::OpenPath { path })?;
        } else {
            self.attributable.enqueue(Parameter::CreatePath { path })?;
        }

        if !self.meshes.is_empty() {
            if !self.meshes.written() {
                self.meshes.enqueue(Parameter::CreatePath {
                    path: group_name(meshes_path),
                })?;
            }
            for (key, mesh) in self.meshes.iter_mut() {
                mesh.flush(key)?;
            }
            self.meshes.flush_attributes()?;
        }

        if !self.particles.is_empty() {
            if !self.particles.written() {
                self.particles.enqueue(Parameter::CreatePath {
                    path: group_name(particles_path),
                })?;
            }
            for (key, species) in self.particles.iter_mut() {
                species.flush(key)?;
            }
            self.particles.flush_attributes()?;
        }

        self.attributable.flush_attributes()
    }

    pub(crate) fn read(&mut self, name: &str, meshes_path: &str, particles_path: &str) -> Result<()> {
        self.attributable.run(Parameter::OpenPath {
            path: name.to_string(),
        })?;
        self.attributable.read_attributes(ReadMode::FullyReread)?;
        for key in ["time", "dt", "timeUnitSI"] {
            let dtype = self
                .get_attribute(key)
                .map_err(|_| Error::ReadError(format!("iteration {name} has no '{key}' attribute")))?
                .dtype();
            if !dtype.is_floating_point() {
                return Err(Error::ReadError(format!(
                    "Unexpected Attribute datatype for '{key}' ({dtype})"
                )));
            }
        }

        let groups = self.attributable.run(Parameter::ListPaths)?.into_names()?;
        let meshes_group = group_name(meshes_path);
        if groups.contains(&meshes_group) {
            self.read_meshes(&meshes_group)?;
        }
        let particles_group = group_name(particles_path);
        if groups.contains(&particles_group) {
            self.read_particles(&particles_group)?;
        }
        Ok(())
    }

    fn read_meshes(&mut self, group: &str) -> Result<()> {
        let meshes = &mut self.meshes;
        meshes.run(Parameter::OpenPath {
            path: group.to_string(),
        })?;
        for path in meshes.run(Parameter::ListPaths)?.into_names()? {
            meshes.entry_for_read(path.clone()).read_from_group(&path)?;
        }
        for dataset in meshes.run(Parameter::ListDatasets)?.into_names()? {
            meshes
                .entry_for_read(dataset.clone())
                .read_from_dataset(&dataset)?;
        }
        meshes.read_attributes(ReadMode::FullyReread)
    }

    fn read_particles(&mut self, group: &str) -> Result<()> {
        let particles = &mut self.particles;
        particles.run(Parameter::OpenPath {
            path: group.to_string(),
        })?;
        for path in particles.run(Parameter::ListPaths)?.into_names()? {
            particles.entry_for_read(path.clone()).read(&path)?;
        }
        particles.read_attributes(ReadMode::FullyReread)
    }
}

fn group_name(path: &str) -> String {
    path.trim_matches('/').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rustypmd_format::{Dataset, Datatype};
    use rustypmd_io::{create_io_handler, Access, BackendConfig, Format, SharedIoHandler};

    fn iteration() -> (SharedIoHandler, Iteration) {
        let h = create_io_handler("unused", Access::Create, Format::Dummy, &BackendConfig::default())
            .unwrap()
            .into_shared();
        let root = Writable::root(&h);
        let it = Iteration::create(&root);
        (h, it)
    }

    #[test]
    fn time_defaults_and_setters() {
        let (_h, mut it) = iteration();
        assert_eq!(it.time::<f64>().unwrap(), 0.0);
        assert_eq!(it.dt::<f64>().unwrap(), 1.0);
        assert_eq!(it.time_unit_si().unwrap(), 1.0);
        it.set_time(42.5f32).unwrap().set_dt(0.5f64).unwrap();
        assert_eq!(it.time::<f32>().unwrap(), 42.5);
        assert_eq!(it.get_attribute("time").unwrap().dtype(), Datatype::Float);
        assert_eq!(it.dt::<f64>().unwrap(), 0.5);
    }

    #[test]
    fn closing_blocks_new_entries() {
        let (_h, mut it) = iteration();
        it.meshes.get_or_create("E").unwrap();
        it.close();
        assert!(it.closed());
        assert_eq!(it.close_status(), CloseStatus::ClosePending);
        assert!(matches!(it.meshes.get_or_create("B"), Err(Error::WrongApiUsage(_))));
        assert!(matches!(it.particles.get_or_create("e"), Err(Error::WrongApiUsage(_))));
        // existing entries stay reachable
        assert!(it.meshes.get_or_create("E").is_ok());
    }

    #[test]
    fn only_finished_close_freezes_contents() {
        let (_h, mut it) = iteration();
        it.meshes.get_or_create("E").unwrap();
        it.close();
        // still writable until the series has flushed it
        it.set_time(1.0f64).unwrap();
        it.set_close_status(CloseStatus::Closed);
        assert!(matches!(it.set_time(2.0f64), Err(Error::WrongApiUsage(_))));
        let e = it.meshes.get_mut("E").unwrap();
        assert!(matches!(e.set_axis_labels(&["x"]), Err(Error::WrongApiUsage(_))));
    }

    #[test]
    fn empty_groups_are_skipped() {
        let (h, mut it) = iteration();
        it.flush("100", "meshes/", "particles/").unwrap();
        // CREATE_PATH plus the three time attributes
        assert_eq!(h.borrow().pending(), 4);
        h.borrow_mut().flush().unwrap();
        assert!(it.written());
        assert!(!it.meshes.written());
        assert!(!it.particles.written());
    }

    #[test]
    fn flush_creates_mesh_group() {
        let (h, mut it) = iteration();
        it.meshes
            .get_or_create("rho")
            .unwrap()
            .scalar_mut()
            .unwrap()
            .reset_dataset(Dataset::new(Datatype::Float, vec![2, 2]))
            .unwrap();
        it.flush("0", "fields/", "particles/").unwrap();
        h.borrow_mut().flush().unwrap();
        assert!(it.meshes.written());
        assert!(it.meshes.get("rho").unwrap().written());
    }

    #[test]
    fn group_names_are_trimmed() {
        assert_eq!(group_name("meshes/"), "meshes");
        assert_eq!(group_name("/fields/"), "fields");
    }
}
