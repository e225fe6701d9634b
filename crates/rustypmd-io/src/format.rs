//! Mapping between file name extensions and storage formats.

use std::fmt;
use std::path::Path;

/// Storage format of a series, one per backend engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Format {
    Hdf5,
    Adios2Bp,
    Adios2Bp4,
    Adios2Bp5,
    Adios2Sst,
    Adios2Ssc,
    Json,
    Toml,
    /// No recognized extension; backed by the no-op handler.
    Dummy,
}

impl Format {
    /// Format selected by a `backend` configuration key.
    ///
    /// `"adios2"` maps to the default BP engine.
    pub fn from_backend_name(name: &str) -> Option<Format> {
        match name.to_ascii_lowercase().as_str() {
            "hdf5" => Some(Format::Hdf5),
            "adios2" | "bp" => Some(Format::Adios2Bp),
            "bp4" => Some(Format::Adios2Bp4),
            "bp5" => Some(Format::Adios2Bp5),
            "sst" => Some(Format::Adios2Sst),
            "ssc" => Some(Format::Adios2Ssc),
            "json" => Some(Format::Json),
            "toml" => Some(Format::Toml),
            "dummy" => Some(Format::Dummy),
            _ => None,
        }
    }

    pub fn is_adios2(self) -> bool {
        matches!(
            self,
            Format::Adios2Bp
                | Format::Adios2Bp4
                | Format::Adios2Bp5
                | Format::Adios2Sst
                | Format::Adios2Ssc
        )
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Format::Hdf5 => "HDF5",
            Format::Adios2Bp => "ADIOS2_BP",
            Format::Adios2Bp4 => "ADIOS2_BP4",
            Format::Adios2Bp5 => "ADIOS2_BP5",
            Format::Adios2Sst => "ADIOS2_SST",
            Format::Adios2Ssc => "ADIOS2_SSC",
            Format::Json => "JSON",
            Format::Toml => "TOML",
            Format::Dummy => "DUMMY",
        };
        f.write_str(name)
    }
}

/// Detect the format from the extension of `filename`.
pub fn determine_format(filename: &str) -> Format {
    let ext = Path::new(filename)
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("");
    match ext {
        "h5" => Format::Hdf5,
        "bp" => Format::Adios2Bp,
        "bp4" => Format::Adios2Bp4,
        "bp5" => Format::Adios2Bp5,
        "sst" => Format::Adios2Sst,
        "ssc" => Format::Adios2Ssc,
        "json" => Format::Json,
        "toml" => Format::Toml,
        _ => Format::Dummy,
    }
}

/// File name extension, including the dot, for `format`.
pub fn suffix(format: Format) -> &'static str {
    match format {
        Format::Hdf5 => ".h5",
        Format::Adios2Bp => ".bp",
        Format::Adios2Bp4 => ".bp4",
        Format::Adios2Bp5 => ".bp5",
        Format::Adios2Sst => ".sst",
        Format::Adios2Ssc => ".ssc",
        Format::Json => ".json",
        Format::Toml => ".toml",
        Format::Dummy => "",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extensions() {
        assert_eq!(determine_format("data_%T.h5"), Format::Hdf5);
        assert_eq!(determine_format("a/b/c.bp5"), Format::Adios2Bp5);
        assert_eq!(determine_format("run.json"), Format::Json);
        assert_eq!(determine_format("run.toml"), Format::Toml);
        assert_eq!(determine_format("run"), Format::Dummy);
        assert_eq!(determine_format("run.txt"), Format::Dummy);
    }

    #[test]
    fn suffix_inverts_detection() {
        for f in [Format::Hdf5, Format::Adios2Sst, Format::Json, Format::Toml] {
            assert_eq!(determine_format(&format!("x{}", suffix(f))), f);
        }
        assert_eq!(suffix(Format::Dummy), "");
    }

    #[test]
    fn backend_names() {
        assert_eq!(Format::from_backend_name("JSON"), Some(Format::Json));
        assert_eq!(Format::from_backend_name("adios2"), Some(Format::Adios2Bp));
        assert!(Format::Adios2Ssc.is_adios2());
        assert_eq!(Format::from_backend_name("netcdf"), None);
    }
}
