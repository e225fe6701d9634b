//! Backend configuration passed as JSON or TOML text.
//!
//! ```text
//! {"backend": "json", "iteration_encoding": "file_based", "json": {"indent": 2}}
//! ```
//!
//! The same options may be given as TOML, or read from a file by prefixing its
//! path with `@`. Keys are matched case-insensitively.

use std::fmt;
use std::fs;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::backend::json::{parse_document, Dialect};
use crate::error::{Error, Result};
use crate::format::Format;

const KNOWN_KEYS: [&str; 4] = ["backend", "iteration_encoding", "json", "toml"];

/// How iterations are laid out in files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IterationEncoding {
    /// One file per iteration.
    FileBased,
    /// All iterations in one file, one group each.
    GroupBased,
}

impl IterationEncoding {
    /// Name as stored in the `iterationEncoding` attribute.
    pub fn attribute_name(self) -> &'static str {
        match self {
            IterationEncoding::FileBased => "fileBased",
            IterationEncoding::GroupBased => "groupBased",
        }
    }

    pub fn from_attribute_name(name: &str) -> Option<Self> {
        match name {
            "fileBased" => Some(IterationEncoding::FileBased),
            "groupBased" => Some(IterationEncoding::GroupBased),
            _ => None,
        }
    }
}

impl fmt::Display for IterationEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.attribute_name())
    }
}

/// Options of the JSON backend.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct JsonConfig {
    /// Pretty-print with this many spaces; compact output if unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub indent: Option<usize>,
}

/// Options of the TOML backend.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TomlConfig {
    /// Accepted for symmetry with JSON; TOML output layout is fixed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub indent: Option<usize>,
}

/// Parsed backend configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendConfig {
    /// Backend name overriding the file extension, e.g. `"json"`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub backend: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub iteration_encoding: Option<IterationEncoding>,
    pub json: JsonConfig,
    pub toml: TomlConfig,
}

impl BackendConfig {
    /// Parse an options string. Empty input yields the defaults.
    pub fn parse(options: &str) -> Result<Self> {
        let trimmed = options.trim();
        if trimmed.is_empty() {
            return Ok(Self::default());
        }
        if let Some(path) = trimmed.strip_prefix('@') {
            let path = path.trim();
            let text = fs::read_to_string(path)
                .map_err(|e| Error::Config(format!("cannot read options file {path}: {e}")))?;
            if path.ends_with(".toml") {
                return Self::from_value(parse_document(&text, Dialect::Toml)?);
            }
            return Self::parse(&text);
        }
        let value = if trimmed.starts_with('{') {
            parse_document(trimmed, Dialect::Json)?
        } else {
            parse_document(trimmed, Dialect::Toml)?
        };
        Self::from_value(value)
    }

    fn from_value(value: Value) -> Result<Self> {
        let value = lowercase_keys(value);
        let Value::Object(obj) = &value else {
            return Err(Error::Config("options must be a JSON object or TOML table".to_string()));
        };
        for key in obj.keys().filter(|k| !KNOWN_KEYS.contains(&k.as_str())) {
            log::warn!("backend configuration key '{key}' is not used");
        }
        let config: BackendConfig =
            serde_json::from_value(value).map_err(|e| Error::Config(e.to_string()))?;
        if let Some(name) = &config.backend {
            if Format::from_backend_name(name).is_none() {
                return Err(Error::Config(format!("unknown backend '{name}'")));
            }
        }
        Ok(config)
    }

    /// The format selected by the `backend` key, if any.
    pub fn format(&self) -> Option<Format> {
        self.backend.as_deref().and_then(Format::from_backend_name)
    }

    /// Serialize back to the JSON options form.
    pub fn to_options_string(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

fn lowercase_keys(value: Value) -> Value {
    match value {
        Value::Object(obj) => Value::Object(
            obj.into_iter()
                .map(|(k, v)| (k.to_lowercase(), lowercase_keys(v)))
                .collect(),
        ),
        other => other,
    }
}

/// Builder for series options.
///
/// ```
/// use rustypmd_io::{Format, IterationEncoding, SeriesOptions};
///
/// let opts = SeriesOptions::new()
///     .backend(Format::Json)
///     .iteration_encoding(IterationEncoding::FileBased)
///     .json_indent(2);
/// assert_eq!(opts.config().json.indent, Some(2));
/// ```
#[derive(Debug, Clone, Default)]
pub struct SeriesOptions {
    config: BackendConfig,
}

impl SeriesOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Select the backend regardless of the file extension.
    pub fn backend(mut self, format: Format) -> Self {
        self.config.backend = Some(
            match format {
                Format::Hdf5 => "hdf5",
                Format::Json => "json",
                Format::Toml => "toml",
                Format::Dummy => "dummy",
                Format::Adios2Bp4 => "bp4",
                Format::Adios2Bp5 => "bp5",
                Format::Adios2Sst => "sst",
                Format::Adios2Ssc => "ssc",
                Format::Adios2Bp => "adios2",
            }
            .to_string(),
        );
        self
    }

    pub fn iteration_encoding(mut self, encoding: IterationEncoding) -> Self {
        self.config.iteration_encoding = Some(encoding);
        self
    }

    /// Pretty-print JSON files.
    pub fn json_indent(mut self, spaces: usize) -> Self {
        self.config.json.indent = Some(spaces);
        self
    }

    pub fn config(&self) -> &BackendConfig {
        &self.config
    }

    pub fn into_config(self) -> BackendConfig {
        self.config
    }

    pub fn to_options_string(&self) -> Result<String> {
        self.config.to_options_string()
    }
}
