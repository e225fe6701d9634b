//! Particle species and their patches.

use std::ops::{Deref, DerefMut};

use rustypmd_io::{Parameter, Writable};

use crate::attributable::{Attributable, HasAttributable, ReadMode};
use crate::container::{Container, ContainerElement};
use crate::error::Result;
use crate::record::{PatchRecord, Record};

const PARTICLE_PATCHES: &str = "particlePatches";

/// Records describing subsets of the particles of a species, e.g. the
/// particles of one domain of a parallel simulation.
pub type ParticlePatches = Container<String, PatchRecord>;

/// All records of one kind of particle, e.g. `electrons`.
#[derive(Debug)]
pub struct ParticleSpecies {
    container: Container<String, Record>,
    pub particle_patches: ParticlePatches,
}

impl Deref for ParticleSpecies {
    type Target = Container<String, Record>;

    fn deref(&self) -> &Self::Target {
        &self.container
    }
}

impl DerefMut for ParticleSpecies {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.container
    }
}

impl HasAttributable for ParticleSpecies {
    fn attributable(&self) -> &Attributable {
        self.container.attributable()
    }

    fn attributable_mut(&mut self) -> &mut Attributable {
        self.container.attributable_mut()
    }
}

impl ContainerElement for ParticleSpecies {
    fn create(parent: &Writable) -> Self {
        let container: Container<String, Record> = Container::new(parent);
        let particle_patches = Container::new(container.writable());
        Self {
            container,
            particle_patches,
        }
    }
}

impl ParticleSpecies {
    pub(crate) fn flush(&mut self, name: &str) -> Result<()> {
        if !self.container.written() {
            if !self.container.contains("position") || !self.container.contains("positionOffset") {
                log::warn!(
                    "particle species '{name}' is missing the standard records 'position' and 'positionOffset'"
                );
            }
            self.container.enqueue(Parameter::CreatePath {
                path: name.to_string(),
            })?;
        }
        for (key, record) in self.container.iter_mut() {
            record.flush(key)?;
        }

        if !self.particle_patches.is_empty() {
            if !self.particle_patches.written() {
                self.particle_patches.enqueue(Parameter::CreatePath {
                    path: PARTICLE_PATCHES.to_string(),
                })?;
            }
            for (key, record) in self.particle_patches.iter_mut() {
                record.flush(key)?;
            }
            self.particle_patches.flush_attributes()?;
        }

        self.container.flush_attributes()
    }

    pub(crate) fn read(&mut self, name: &str) -> Result<()> {
        self.container.run(Parameter::OpenPath {
            path: name.to_string(),
        })?;

        let paths = self.container.run(Parameter::ListPaths)?.into_names()?;
        for path in paths {
            if path == PARTICLE_PATCHES {
                self.read_patches()?;
            } else {
                self.container
                    .entry_for_read(path.clone())
                    .read_from_group(&path)?;
            }
        }
        let datasets = self.container.run(Parameter::ListDatasets)?.into_names()?;
        for dataset in datasets {
            self.container
                .entry_for_read(dataset.clone())
                .read_from_dataset(&dataset)?;
        }

        self.container.read_attributes(ReadMode::FullyReread)
    }

    fn read_patches(&mut self) -> Result<()> {
        let patches = &mut self.particle_patches;
        patches.run(Parameter::OpenPath {
            path: PARTICLE_PATCHES.to_string(),
        })?;
        let paths = patches.run(Parameter::ListPaths)?.into_names()?;
        for path in paths {
            patches.entry_for_read(path.clone()).read_from_group(&path)?;
        }
        let datasets = patches.run(Parameter::ListDatasets)?.into_names()?;
        for dataset in datasets {
            patches
                .entry_for_read(dataset.clone())
                .read_from_dataset(&dataset)?;
        }
        patches.read_attributes(ReadMode::FullyReread)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rustypmd_format::{Dataset, Datatype};
    use rustypmd_io::{create_io_handler, Access, BackendConfig, Format, SharedIoHandler};

    fn species() -> (SharedIoHandler, ParticleSpecies) {
        let h = create_io_handler("unused", Access::Create, Format::Dummy, &BackendConfig::default())
            .unwrap()
            .into_shared();
        let root = Writable::root(&h);
        let s = ParticleSpecies::create(&root);
        (h, s)
    }

    #[test]
    fn patches_live_below_species() {
        let (_h, s) = species();
        let parent = s.particle_patches.writable().parent().unwrap();
        assert!(parent.ptr_eq(s.writable()));
    }

    #[test]
    fn flush_writes_records_and_patches() {
        let (h, mut s) = species();
        s.get_or_create("position")
            .unwrap()
            .get_or_create("x")
            .unwrap()
            .reset_dataset(Dataset::new(Datatype::Double, vec![4]))
            .unwrap();
        let num = s
            .particle_patches
            .get_or_create("numParticles")
            .unwrap()
            .scalar_mut()
            .unwrap();
        num.reset_dataset(Dataset::new(Datatype::UInt64, vec![2]))
            .unwrap();
        num.store(0, 3u64).unwrap();

        s.flush("electrons").unwrap();
        h.borrow_mut().flush().unwrap();
        assert!(s.written());
        assert!(s.particle_patches.written());
        assert!(s.particle_patches.get("numParticles").unwrap().written());
        assert!(s.get("position").unwrap().get("x").unwrap().written());
    }

    #[test]
    fn empty_patches_are_not_created() {
        let (h, mut s) = species();
        s.flush("ions").unwrap();
        h.borrow_mut().flush().unwrap();
        assert!(s.written());
        assert!(!s.particle_patches.written());
    }
}
