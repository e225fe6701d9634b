//! Human-readable listing of a series.

use std::collections::BTreeSet;
use std::io::{self, Write};

use crate::error::Result;
use crate::series::Series;

/// Write a summary of `series` to `out`: standard version, iterations, and
/// the mesh and particle species names found in any iteration. `verbose`
/// adds the descriptive attributes and all names.
pub fn list_series<W: Write>(series: &Series, verbose: bool, out: &mut W) -> io::Result<()> {
    writeln!(out, "openPMD series: {}", series.name())?;
    writeln!(out, "openPMD standard: {}", or_unknown(series.open_pmd()))?;
    writeln!(
        out,
        "openPMD extensions: {}\n",
        or_unknown(series.open_pmd_extension())
    )?;

    if verbose {
        writeln!(out, "data author: {}", or_unknown(series.author()))?;
        writeln!(out, "data created: {}", or_unknown(series.date()))?;
        writeln!(out, "data backend: {}", series.backend())?;
        writeln!(out, "generating machine: {}", or_unknown(series.machine()))?;
        writeln!(
            out,
            "generating software: {} (version: {})",
            or_unknown(series.software()),
            or_unknown(series.software_version())
        )?;
        writeln!(
            out,
            "generating software dependencies: {}\n",
            or_unknown(series.software_dependencies())
        )?;
    }

    let mut meshes = BTreeSet::new();
    let mut particles = BTreeSet::new();

    write!(out, "number of iterations: {}", series.iterations.len())?;
    if verbose {
        write!(out, " ({})", series.iteration_encoding())?;
    }
    writeln!(out)?;
    if !series.iterations.is_empty() {
        if verbose {
            write!(out, "  all iterations: ")?;
        }
        for (index, iteration) in series.iterations.iter() {
            if verbose {
                write!(out, "{index} ")?;
            }
            meshes.extend(iteration.meshes.keys().cloned());
            particles.extend(iteration.particles.keys().cloned());
        }
        if verbose {
            writeln!(out)?;
        }
    }

    writeln!(out, "\nnumber of meshes: {}", meshes.len())?;
    if verbose && !meshes.is_empty() {
        writeln!(out, "  all meshes:")?;
        for name in &meshes {
            writeln!(out, "    {name}")?;
        }
    }

    writeln!(out, "\nnumber of particle species: {}", particles.len())?;
    if verbose && !particles.is_empty() {
        writeln!(out, "  all particle species:")?;
        for name in &particles {
            writeln!(out, "    {name}")?;
        }
    }
    Ok(())
}

fn or_unknown<T: ToString>(value: Result<T>) -> String {
    value.map_or_else(|_| "unknown".to_string(), |v| v.to_string())
}
