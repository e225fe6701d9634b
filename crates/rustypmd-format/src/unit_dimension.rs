//! Powers of the seven SI base quantities.

use std::collections::BTreeMap;

/// One SI base quantity. The discriminant is its index in the 7-array.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum UnitDimension {
    /// length
    L = 0,
    /// mass
    M,
    /// time
    T,
    /// electric current
    I,
    /// thermodynamic temperature
    Theta,
    /// amount of substance
    N,
    /// luminous intensity
    J,
}

impl UnitDimension {
    pub const ALL: [UnitDimension; 7] = [
        UnitDimension::L,
        UnitDimension::M,
        UnitDimension::T,
        UnitDimension::I,
        UnitDimension::Theta,
        UnitDimension::N,
        UnitDimension::J,
    ];
}

/// Write the exponents of `dims` into an array; missing quantities keep `base`.
pub fn as_array(dims: &BTreeMap<UnitDimension, f64>, base: [f64; 7]) -> [f64; 7] {
    let mut out = base;
    for (dim, power) in dims {
        out[*dim as usize] = *power;
    }
    out
}

/// Non-zero exponents of `array` as a map.
pub fn as_map(array: &[f64; 7]) -> BTreeMap<UnitDimension, f64> {
    UnitDimension::ALL
        .iter()
        .zip(array)
        .filter(|(_, p)| **p != 0.0)
        .map(|(d, p)| (*d, *p))
        .collect()
}
