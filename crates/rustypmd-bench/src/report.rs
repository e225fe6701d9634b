//! Timing results of a benchmark run.

use std::collections::BTreeMap;
use std::time::Duration;

use rustypmd::Datatype;
use serde::ser::Serializer;
use serde::Serialize;

/// One benchmarked setup.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct BenchmarkConfig {
    /// Compression name, empty for none.
    pub compression: String,
    pub compression_level: u8,
    /// Backend file extension, e.g. `json`.
    pub backend: String,
    /// Number of simulated ranks.
    pub ranks: usize,
    #[serde(serialize_with = "serialize_dtype")]
    pub dtype: Datatype,
    pub iterations: u64,
}

fn serialize_dtype<S: Serializer>(dtype: &Datatype, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(dtype.name())
}

/// Write and read time per configuration.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BenchmarkReport {
    results: BTreeMap<BenchmarkConfig, (Duration, Duration)>,
}

#[derive(Serialize)]
struct ReportEntry<'a> {
    #[serde(flatten)]
    config: &'a BenchmarkConfig,
    write_seconds: f64,
    read_seconds: f64,
}

impl BenchmarkReport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the timings of `config`, replacing earlier ones.
    pub fn add_report(&mut self, config: BenchmarkConfig, write: Duration, read: Duration) {
        self.results.insert(config, (write, read));
    }

    /// `(write, read)` durations of `config`.
    pub fn get_report(&self, config: &BenchmarkConfig) -> Option<(Duration, Duration)> {
        self.results.get(config).copied()
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&BenchmarkConfig, &(Duration, Duration))> {
        self.results.iter()
    }
}

impl Serialize for BenchmarkReport {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.results.iter().map(|(config, (write, read))| ReportEntry {
            config,
            write_seconds: write.as_secs_f64(),
            read_seconds: read.as_secs_f64(),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(backend: &str, ranks: usize) -> BenchmarkConfig {
        BenchmarkConfig {
            compression: String::new(),
            compression_level: 0,
            backend: backend.to_string(),
            ranks,
            dtype: Datatype::Double,
            iterations: 2,
        }
    }

    #[test]
    fn lookup_and_replace() {
        let mut report = BenchmarkReport::new();
        assert!(report.is_empty());
        report.add_report(config("json", 2), Duration::from_millis(5), Duration::from_millis(3));
        report.add_report(config("json", 2), Duration::from_millis(7), Duration::from_millis(1));
        assert_eq!(report.len(), 1);
        assert_eq!(
            report.get_report(&config("json", 2)),
            Some((Duration::from_millis(7), Duration::from_millis(1)))
        );
        assert_eq!(report.get_report(&config("toml", 2)), None);
    }

    #[test]
    fn serializes_seconds() {
        let mut report = BenchmarkReport::new();
        report.add_report(config("json", 4), Duration::from_millis(1500), Duration::from_millis(250));
        let v = serde_json::to_value(&report).unwrap();
        assert_eq!(
            v,
            serde_json::json!([{
                "compression": "",
                "compression_level": 0,
                "backend": "json",
                "ranks": 4,
                "dtype": "DOUBLE",
                "iterations": 2,
                "write_seconds": 1.5,
                "read_seconds": 0.25
            }])
        );
    }
}
