//! The series: root of the hierarchy and owner of the I/O handler.

use std::fs;
use std::path::{Path, PathBuf};

use rustypmd_format::Attribute;
use rustypmd_io::{
    create_io_handler, determine_format, suffix, Access, BackendConfig, Format, IterationEncoding,
    Parameter, SharedIoHandler, Writable,
};

use crate::attributable::{impl_attributable, Attributable, ReadMode};
use crate::container::Container;
use crate::error::{Error, Result};
use crate::iteration::{CloseStatus, Iteration};
use crate::series_iterator::{ReadIterations, WriteIterations};

/// openPMD standard version written by default.
pub const OPENPMD_VERSION: &str = "1.1.0";

const BASE_PATH: &str = "/data/%T/";
const MESHES_PATH: &str = "meshes/";
const PARTICLES_PATH: &str = "particles/";
const KNOWN_VERSIONS: [&str; 3] = ["1.0.0", "1.0.1", "1.1.0"];

/// Iteration expansion pattern of a file-based series name, e.g. `data_%06T`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct FilePattern {
    prefix: String,
    padding: usize,
    postfix: String,
}

impl FilePattern {
    /// Find `%T` or `%0<N>T` in `name`. Returns `None` without a pattern.
    pub(crate) fn parse(name: &str) -> Option<Self> {
        let bytes = name.as_bytes();
        for (start, _) in name.match_indices('%') {
            let rest = &bytes[start + 1..];
            if rest.first() == Some(&b'T') {
                return Some(Self::split(name, start, start + 2, 0));
            }
            if rest.first() == Some(&b'0') {
                let digits = rest.iter().take_while(|b| b.is_ascii_digit()).count();
                if rest.get(digits) == Some(&b'T') {
                    let padding = name[start + 1..start + 1 + digits].parse().ok()?;
                    return Some(Self::split(name, start, start + 2 + digits, padding));
                }
            }
        }
        None
    }

    fn split(name: &str, start: usize, end: usize, padding: usize) -> Self {
        Self {
            prefix: name[..start].to_string(),
            padding,
            postfix: name[end..].to_string(),
        }
    }

    /// File name, without suffix, of iteration `index`.
    pub(crate) fn filename(&self, index: u64) -> String {
        format!(
            "{}{:0width$}{}",
            self.prefix,
            index,
            self.postfix,
            width = self.padding
        )
    }

    /// The iteration index if `filename` belongs to this pattern.
    pub(crate) fn match_filename(&self, filename: &str, suffix: &str) -> Option<u64> {
        let digits = filename
            .strip_prefix(&self.prefix)?
            .strip_suffix(suffix)?
            .strip_suffix(&self.postfix)?;
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        if self.padding > 0 && digits.len() != self.padding {
            return None;
        }
        digits.parse().ok()
    }
}

/// A time series of iterations stored through one backend.
///
/// Data is kept in memory until [`flush`](Self::flush) is called or the
/// series is dropped.
///
/// ```no_run
/// use rustypmd::{Access, Dataset, Datatype, Series};
///
/// let mut series = Series::new("out/data_%T.json", Access::Create)?;
/// series.set_author("Jane Doe <jane@example.com>")?;
/// let rho = series
///     .iterations
///     .get_or_create(1u64)?
///     .meshes
///     .get_or_create("rho")?
///     .scalar_mut()?;
/// rho.reset_dataset(Dataset::new(Datatype::Double, vec![2, 2]))?;
/// rho.store_chunk(vec![1.0f64, 2.0, 3.0, 4.0], vec![0, 0], vec![2, 2])?;
/// series.flush()?;
/// # Ok::<(), rustypmd::Error>(())
/// ```
#[derive(Debug)]
pub struct Series {
    attributable: Attributable,
    pub iterations: Container<u64, Iteration>,
    handler: SharedIoHandler,
    name: String,
    format: Format,
    encoding: IterationEncoding,
    pattern: Option<FilePattern>,
    flushed_once: bool,
    initialized: bool,
}

impl_attributable!(Series);

impl Series {
    /// Open or create the series at `filepath`. The backend is chosen from
    /// the file extension; a `%T` in the file name selects file-based
    /// iteration encoding.
    pub fn new(filepath: impl AsRef<Path>, access: Access) -> Result<Self> {
        Self::with_config(filepath, access, BackendConfig::default())
    }

    /// Like [`new`](Self::new), with backend options as JSON or TOML text.
    pub fn with_options(filepath: impl AsRef<Path>, access: Access, options: &str) -> Result<Self> {
        Self::with_config(filepath, access, BackendConfig::parse(options)?)
    }

    pub fn with_config(filepath: impl AsRef<Path>, access: Access, config: BackendConfig) -> Result<Self> {
        let filepath = filepath.as_ref();
        let filename = filepath
            .file_name()
            .and_then(|f| f.to_str())
            .ok_or_else(|| {
                Error::WrongApiUsage(format!("Invalid file path '{}'", filepath.display()))
            })?;
        let directory = match filepath.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
            _ => PathBuf::from("."),
        };

        let detected = determine_format(filename);
        let format = match config.format() {
            Some(format) => format,
            None if detected == Format::Dummy => {
                return Err(Error::WrongApiUsage(format!(
                    "Unknown file format! Did you specify a file ending? Specified file name was '{filename}'."
                )))
            }
            None => detected,
        };
        let name = filename
            .strip_suffix(suffix(detected))
            .filter(|_| detected != Format::Dummy)
            .unwrap_or(filename)
            .to_string();

        let pattern = FilePattern::parse(&name);
        let encoding = match (&pattern, config.iteration_encoding) {
            (Some(_), Some(IterationEncoding::GroupBased)) => {
                log::warn!(
                    "file name '{name}' contains an iteration pattern, ignoring the configured groupBased encoding"
                );
                IterationEncoding::FileBased
            }
            (Some(_), _) => IterationEncoding::FileBased,
            (None, Some(IterationEncoding::FileBased)) => {
                return Err(Error::WrongApiUsage(format!(
                    "fileBased iteration encoding requires the pattern %T in the file name '{name}'"
                )))
            }
            (None, _) => IterationEncoding::GroupBased,
        };

        let handler = create_io_handler(&directory, access, format, &config)?.into_shared();
        let attributable = Attributable::new(Writable::root(&handler));
        let iterations = Container::new(attributable.writable());
        let mut series = Series {
            attributable,
            iterations,
            handler,
            name,
            format,
            encoding,
            pattern,
            flushed_once: false,
            initialized: false,
        };

        match access {
            Access::Create => series.init_defaults(),
            Access::ReadOnly | Access::ReadWrite => match series.encoding {
                IterationEncoding::GroupBased => series.read_group_based(access)?,
                IterationEncoding::FileBased => series.read_file_based(access)?,
            },
        }
        series.initialized = true;
        Ok(series)
    }

    fn init_defaults(&mut self) {
        let iteration_format = match self.encoding {
            IterationEncoding::FileBased => self.name.clone(),
            IterationEncoding::GroupBased => BASE_PATH.to_string(),
        };
        let date = chrono::Local::now().format("%Y-%m-%d %H:%M:%S %z").to_string();
        let defaults = [
            ("openPMD", Attribute::from(OPENPMD_VERSION)),
            ("openPMDextension", Attribute::UInt32(0)),
            ("basePath", Attribute::from(BASE_PATH)),
            ("meshesPath", Attribute::from(MESHES_PATH)),
            ("particlesPath", Attribute::from(PARTICLES_PATH)),
            ("iterationEncoding", Attribute::from(self.encoding.attribute_name())),
            ("iterationFormat", Attribute::from(iteration_format)),
            ("date", Attribute::from(date)),
            ("software", Attribute::from("rustypmd")),
            ("softwareVersion", Attribute::from(env!("CARGO_PKG_VERSION"))),
        ];
        for (key, value) in defaults {
            self.attributable.set_attribute_unchecked(key, value);
        }
    }

    // -----------------------------------------------------------------------
    // Standard attributes
    // -----------------------------------------------------------------------

    /// Version of the openPMD standard the series follows.
    pub fn open_pmd(&self) -> Result<String> {
        self.attribute_as("openPMD")
    }

    pub fn set_open_pmd(&mut self, version: &str) -> Result<&mut Self> {
        self.set_attribute("openPMD", version)?;
        Ok(self)
    }

    /// Bit mask of the applied openPMD extensions.
    pub fn open_pmd_extension(&self) -> Result<u32> {
        self.attribute_as("openPMDextension")
    }

    pub fn set_open_pmd_extension(&mut self, extension: u32) -> Result<&mut Self> {
        self.set_attribute("openPMDextension", extension)?;
        Ok(self)
    }

    pub fn base_path(&self) -> Result<String> {
        self.attribute_as("basePath")
    }

    pub fn set_base_path(&mut self, base_path: &str) -> Result<&mut Self> {
        let version = self.open_pmd()?;
        if version == "1.0.0" || version == "1.0.1" {
            return Err(Error::IllegalInOpenPmdStandard(
                "Custom basePath not allowed in openPMD <=1.0.1".to_string(),
            ));
        }
        self.set_attribute("basePath", base_path)?;
        Ok(self)
    }

    pub fn meshes_path(&self) -> Result<String> {
        self.attribute_as("meshesPath")
    }

    /// Group holding the meshes of each iteration. A trailing `/` is added if
    /// missing.
    pub fn set_meshes_path(&mut self, path: &str) -> Result<&mut Self> {
        self.set_attribute("meshesPath", with_trailing_slash(path))?;
        Ok(self)
    }

    pub fn particles_path(&self) -> Result<String> {
        self.attribute_as("particlesPath")
    }

    /// Group holding the particle species of each iteration. A trailing `/`
    /// is added if missing.
    pub fn set_particles_path(&mut self, path: &str) -> Result<&mut Self> {
        self.set_attribute("particlesPath", with_trailing_slash(path))?;
        Ok(self)
    }

    pub fn author(&self) -> Result<String> {
        self.attribute_as("author")
    }

    pub fn set_author(&mut self, author: &str) -> Result<&mut Self> {
        self.set_attribute("author", author)?;
        Ok(self)
    }

    pub fn software(&self) -> Result<String> {
        self.attribute_as("software")
    }

    pub fn set_software(&mut self, software: &str) -> Result<&mut Self> {
        self.set_attribute("software", software)?;
        Ok(self)
    }

    pub fn software_version(&self) -> Result<String> {
        self.attribute_as("softwareVersion")
    }

    pub fn set_software_version(&mut self, version: &str) -> Result<&mut Self> {
        self.set_attribute("softwareVersion", version)?;
        Ok(self)
    }

    pub fn date(&self) -> Result<String> {
        self.attribute_as("date")
    }

    pub fn set_date(&mut self, date: &str) -> Result<&mut Self> {
        self.set_attribute("date", date)?;
        Ok(self)
    }

    pub fn software_dependencies(&self) -> Result<String> {
        self.attribute_as("softwareDependencies")
    }

    pub fn set_software_dependencies(&mut self, dependencies: &str) -> Result<&mut Self> {
        self.set_attribute("softwareDependencies", dependencies)?;
        Ok(self)
    }

    pub fn machine(&self) -> Result<String> {
        self.attribute_as("machine")
    }

    pub fn set_machine(&mut self, machine: &str) -> Result<&mut Self> {
        self.set_attribute("machine", machine)?;
        Ok(self)
    }

    pub fn iteration_encoding(&self) -> IterationEncoding {
        self.encoding
    }

    pub fn set_iteration_encoding(&mut self, encoding: IterationEncoding) -> Result<&mut Self> {
        self.ensure_not_flushed("iterationEncoding")?;
        self.ensure_writable("Changing the iteration encoding")?;
        let iteration_format = match encoding {
            IterationEncoding::FileBased => {
                if self.pattern.is_none() {
                    return Err(Error::WrongApiUsage(
                        "For fileBased formats the iteration pattern %T must be included in the file name"
                            .to_string(),
                    ));
                }
                self.name.clone()
            }
            IterationEncoding::GroupBased => BASE_PATH.to_string(),
        };
        self.encoding = encoding;
        self.attributable
            .set_attribute_unchecked("iterationEncoding", Attribute::from(encoding.attribute_name()));
        self.attributable
            .set_attribute_unchecked("iterationFormat", Attribute::from(iteration_format));
        Ok(self)
    }

    pub fn iteration_format(&self) -> Result<String> {
        self.attribute_as("iterationFormat")
    }

    pub fn set_iteration_format(&mut self, format: &str) -> Result<&mut Self> {
        self.ensure_not_flushed("iterationFormat")?;
        if self.encoding == IterationEncoding::GroupBased {
            let base_path = self.base_path()?;
            let version = self.open_pmd()?;
            if base_path != format && (version == "1.0.0" || version == "1.0.1") {
                return Err(Error::WrongApiUsage(format!(
                    "iterationFormat must not differ from basePath {base_path} for groupBased data"
                )));
            }
        }
        self.set_attribute("iterationFormat", format)?;
        Ok(self)
    }

    /// File name of the series without extension, including the iteration
    /// pattern for file-based series.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: &str) -> Result<&mut Self> {
        self.ensure_not_flushed("name")?;
        self.ensure_writable("Renaming a series")?;
        let pattern = FilePattern::parse(name);
        if self.encoding == IterationEncoding::FileBased && pattern.is_none() {
            return Err(Error::WrongApiUsage(
                "For fileBased formats the iteration pattern %T must be included in the file name"
                    .to_string(),
            ));
        }
        self.name = name.to_string();
        self.pattern = pattern;
        if self.encoding == IterationEncoding::FileBased {
            self.attributable
                .set_attribute_unchecked("iterationFormat", Attribute::from(name));
        }
        Ok(self)
    }

    /// Backend format of the series.
    pub fn format(&self) -> Format {
        self.format
    }

    /// Display name of the backend, e.g. `JSON`.
    pub fn backend(&self) -> &'static str {
        self.handler.borrow().backend_name()
    }

    fn ensure_not_flushed(&self, what: &str) -> Result<()> {
        if self.flushed_once {
            return Err(Error::WrongApiUsage(format!(
                "A files {what} can not (yet) be changed after it has been written."
            )));
        }
        Ok(())
    }

    /// Group of the iterations plus the mesh and particle group names.
    fn hierarchy_paths(&self) -> (String, String, String) {
        let base = self.base_path().unwrap_or_else(|_| BASE_PATH.to_string());
        (
            base.replacen("%T/", "", 1),
            self.meshes_path().unwrap_or_else(|_| MESHES_PATH.to_string()),
            self.particles_path().unwrap_or_else(|_| PARTICLES_PATH.to_string()),
        )
    }

    // -----------------------------------------------------------------------
    // Writing
    // -----------------------------------------------------------------------

    /// Write everything modified since the last flush.
    pub fn flush(&mut self) -> Result<()> {
        if self.access()?.is_read_only() {
            self.flush_read_only()?;
        } else {
            match self.encoding {
                IterationEncoding::GroupBased => self.flush_group_based()?,
                IterationEncoding::FileBased => self.flush_file_based()?,
            }
            self.flushed_once = true;
        }
        Ok(())
    }

    /// Close iteration `index` and flush, so its data is written and, for
    /// file-based series, its file is closed.
    pub fn close_iteration(&mut self, index: u64) -> Result<()> {
        let iteration = self.iterations.get_mut(&index).ok_or_else(|| {
            Error::WrongApiUsage(format!("Iteration {index} does not exist"))
        })?;
        iteration.close();
        self.flush()
    }

    /// Write the series one iteration at a time. Switching to another
    /// iteration closes the previous one.
    ///
    /// ```no_run
    /// # use rustypmd::{Access, Series};
    /// let mut series = Series::new("out/steps_%T.json", Access::Create)?;
    /// let mut steps = series.write_iterations();
    /// for index in 0..3u64 {
    ///     steps.get_or_create(index)?.set_time(index as f64)?;
    /// }
    /// # Ok::<(), rustypmd::Error>(())
    /// ```
    pub fn write_iterations(&mut self) -> WriteIterations<'_> {
        WriteIterations::new(self)
    }

    /// Visit the iterations in ascending order, closing each one before the
    /// next is handed out.
    pub fn read_iterations(&mut self) -> ReadIterations<'_> {
        ReadIterations::new(self)
    }

    fn flush_read_only(&mut self) -> Result<()> {
        self.attributable.flush_handler()?;
        let file_based = self.encoding == IterationEncoding::FileBased;
        for (_, iteration) in self.iterations.iter_mut() {
            if iteration.close_status() != CloseStatus::ClosePending {
                continue;
            }
            if file_based && iteration.written() {
                iteration.run(Parameter::CloseFile)?;
            }
            iteration.set_close_status(CloseStatus::Closed);
        }
        Ok(())
    }

    fn flush_group_based(&mut self) -> Result<()> {
        let (iterations_path, meshes_path, particles_path) = self.hierarchy_paths();
        if !self.attributable.written() {
            self.attributable.enqueue(Parameter::CreateFile {
                name: self.name.clone(),
            })?;
        }
        if !self.iterations.written() {
            self.iterations.enqueue(Parameter::CreatePath {
                path: iterations_path,
            })?;
        }
        for (index, iteration) in self.iterations.iter_mut() {
            if iteration.close_status() == CloseStatus::Closed {
                continue;
            }
            iteration.flush(&index.to_string(), &meshes_path, &particles_path)?;
        }
        self.iterations.flush_attributes()?;
        self.attributable.flush_attributes()?;
        self.attributable.flush_handler()?;

        for (_, iteration) in self.iterations.iter_mut() {
            if iteration.close_status() == CloseStatus::ClosePending {
                iteration.set_close_status(CloseStatus::Closed);
            }
        }
        Ok(())
    }

    /// Each iteration goes to its own file. The series attributes and the
    /// iterations group are repeated in every file.
    fn flush_file_based(&mut self) -> Result<()> {
        let pattern = self
            .pattern
            .clone()
            .ok_or_else(|| Error::Internal("fileBased series without file name pattern".to_string()))?;
        if self.iterations.is_empty() {
            return Err(Error::WrongApiUsage(
                "fileBased output can not be written with no iterations.".to_string(),
            ));
        }
        let (iterations_path, meshes_path, particles_path) = self.hierarchy_paths();
        let indices: Vec<u64> = self.iterations.keys().copied().collect();

        for index in indices {
            let Some(iteration) = self.iterations.get(&index) else {
                continue;
            };
            let status = iteration.close_status();
            if status == CloseStatus::Closed {
                continue;
            }
            let name = pattern.filename(index);
            let parameter = if iteration.written() {
                Parameter::OpenFile { name }
            } else {
                Parameter::CreateFile { name }
            };

            // Pretend series and iterations group are new so they get
            // associated with this iteration's file.
            self.attributable.writable().set_written(false);
            self.iterations.writable().set_written(false);
            self.attributable.enqueue(parameter)?;
            self.iterations.enqueue(Parameter::CreatePath {
                path: iterations_path.clone(),
            })?;

            let iteration = self
                .iterations
                .get_mut(&index)
                .ok_or_else(|| Error::Internal(format!("iteration {index} vanished during flush")))?;
            iteration.flush(&index.to_string(), &meshes_path, &particles_path)?;

            self.iterations.set_dirty(true);
            self.iterations.flush_attributes()?;
            self.attributable.set_dirty(true);
            self.attributable.flush_attributes()?;

            // The file is closed only after the series attributes reached it.
            if status == CloseStatus::ClosePending {
                if let Some(iteration) = self.iterations.get(&index) {
                    iteration.enqueue(Parameter::CloseFile)?;
                }
            }
            self.attributable.flush_handler()?;

            if status == CloseStatus::ClosePending {
                if let Some(iteration) = self.iterations.get_mut(&index) {
                    iteration.set_close_status(CloseStatus::Closed);
                }
            }
        }
        self.attributable.set_dirty(false);
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Reading
    // -----------------------------------------------------------------------

    fn read_group_based(&mut self, access: Access) -> Result<()> {
        if access == Access::ReadWrite {
            let exists = self
                .attributable
                .run(Parameter::CheckFile {
                    name: self.name.clone(),
                })?
                .into_file_exists()?;
            if !exists {
                self.init_defaults();
                return Ok(());
            }
        }
        self.attributable.run(Parameter::OpenFile {
            name: self.name.clone(),
        })?;
        self.read_file()?;
        self.flushed_once = true;
        Ok(())
    }

    fn read_file_based(&mut self, access: Access) -> Result<()> {
        let pattern = self
            .pattern
            .clone()
            .ok_or_else(|| Error::Internal("fileBased series without file name pattern".to_string()))?;
        let directory = self.handler.borrow().directory().to_path_buf();
        let suffix = suffix(self.format);

        let mut files: Vec<(u64, String)> = match fs::read_dir(&directory) {
            Ok(entries) => entries
                .filter_map(|entry| entry.ok())
                .filter_map(|entry| entry.file_name().into_string().ok())
                .filter_map(|file| pattern.match_filename(&file, suffix).map(|i| (i, file)))
                .collect(),
            Err(e) => {
                log::debug!("cannot list {}: {e}", directory.display());
                Vec::new()
            }
        };
        files.sort();

        if files.is_empty() {
            if access == Access::ReadWrite {
                self.init_defaults();
                return Ok(());
            }
            return Err(Error::Io(rustypmd_io::Error::NoSuchFile(format!(
                "No file matching '{}{suffix}' found in {}",
                self.name,
                directory.display()
            ))));
        }

        for (index, file) in files {
            log::debug!("reading iteration {index} from {file}");
            self.attributable.run(Parameter::OpenFile { name: file })?;
            self.read_file()?;
        }
        self.flushed_once = true;
        Ok(())
    }

    /// Read the series attributes and all iterations of the open file.
    fn read_file(&mut self) -> Result<()> {
        let encoding = self.read_string("iterationEncoding")?;
        match IterationEncoding::from_attribute_name(&encoding) {
            Some(found) if found == self.encoding => {}
            Some(found) => {
                log::warn!(
                    "series '{}' is opened as {} but the file declares {found}, following the file name",
                    self.name,
                    self.encoding
                );
                self.attributable.set_attribute_unchecked(
                    "iterationEncoding",
                    Attribute::from(self.encoding.attribute_name()),
                );
            }
            None => {
                return Err(Error::ReadError(format!("Unknown iterationEncoding: {encoding}")));
            }
        }
        self.read_string("iterationFormat")?;

        let version = self.read_string("openPMD")?;
        let extension = self.attributable.read_attribute("openPMDextension")?.dtype();
        if !extension.is_integer() {
            return Err(Error::ReadError(format!(
                "Unexpected Attribute datatype for 'openPMDextension' ({extension})"
            )));
        }
        self.read_string("basePath")?;
        for optional in ["meshesPath", "particlesPath"] {
            match self.read_string(optional) {
                Ok(_) | Err(Error::NoSuchAttribute(_)) => {}
                Err(e) => return Err(e),
            }
        }
        if !KNOWN_VERSIONS.contains(&version.as_str()) {
            return Err(Error::ReadError(format!("Unknown openPMD version - {version}")));
        }

        let (iterations_path, meshes_path, particles_path) = self.hierarchy_paths();
        self.iterations.run(Parameter::OpenPath {
            path: iterations_path,
        })?;
        self.iterations.read_attributes(ReadMode::FullyReread)?;
        for name in self.iterations.run(Parameter::ListPaths)?.into_names()? {
            let Ok(index) = name.parse::<u64>() else {
                log::warn!("ignoring group '{name}' in the iterations group, it is not an iteration index");
                continue;
            };
            self.iterations
                .entry_for_read(index)
                .read(&name, &meshes_path, &particles_path)?;
        }

        self.attributable.read_attributes(ReadMode::IgnoreExisting)
    }

    fn read_string(&mut self, key: &str) -> Result<String> {
        match self.attributable.read_attribute(key)? {
            Attribute::String(s) => Ok(s.clone()),
            other => Err(Error::ReadError(format!(
                "Unexpected Attribute datatype for '{key}' ({})",
                other.dtype()
            ))),
        }
    }
}

impl Drop for Series {
    fn drop(&mut self) {
        if !self.initialized {
            return;
        }
        match self.access() {
            Ok(access) if !access.is_read_only() => {}
            _ => return,
        }
        if self.encoding == IterationEncoding::FileBased && self.iterations.is_empty() {
            return;
        }
        if let Err(e) = self.flush() {
            log::error!("flushing series '{}' on drop failed: {e}", self.name);
        }
    }
}

fn with_trailing_slash(path: &str) -> String {
    if path.ends_with('/') {
        path.to_string()
    } else {
        format!("{path}/")
    }
}
