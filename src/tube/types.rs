//! Tube types and their fixed parameter table.

use std::fmt;
use std::str::FromStr;

use crate::error::{Result, TriodeError};

/// Triode type. Each type has a parameter set in [`TUBE_MAP`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TubeType {
    /// ECC82 / 12AU7, medium gain
    #[default]
    Ecc82,
    /// ECC83 / 12AX7, high gain
    Ecc83,
}

impl TubeType {
    /// Every tube type in table order.
    pub const ALL: [TubeType; 2] = [TubeType::Ecc82, TubeType::Ecc83];

    /// Index of this type's entry in [`TUBE_MAP`].
    pub const fn index(self) -> usize {
        match self {
            TubeType::Ecc82 => 0,
            TubeType::Ecc83 => 1,
        }
    }

    /// The European designation of the tube.
    pub const fn name(self) -> &'static str {
        match self {
            TubeType::Ecc82 => "ECC82",
            TubeType::Ecc83 => "ECC83",
        }
    }

    /// The parameter set of this tube type.
    pub fn params(self) -> &'static TubeParams {
        lookup(self)
    }
}

impl fmt::Display for TubeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for TubeType {
    type Err = TriodeError;

    /// Parse a tube name. Accepts European and American designations.
    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "ecc82" | "12au7" => Ok(TubeType::Ecc82),
            "ecc83" | "12ax7" => Ok(TubeType::Ecc83),
            _ => Err(TriodeError::unknown_tube(s)),
        }
    }
}

/// Physical parameters of a triode plus its reference circuit.
///
/// The model has the smallest error to the real tube at the listed anode
/// resistor. `rk` and `ck` form the cathode low-pass with a 2 Hz corner and
/// set the bias point together with `vk`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TubeParams {
    // Tube model
    /// Perveance at zero grid-cathode voltage
    pub g0: f64,
    /// Perveance limit for strongly negative grid-cathode voltage
    pub g_inf: f64,
    /// Grid sensitivity of the perveance
    pub d: f64,
    /// Anode voltage scale of the transfer curve
    pub h: f64,

    // Circuit parameters
    /// Supply voltage
    pub vb: f64,
    /// Anode resistor
    pub ra: f64,
    /// Cathode voltage for setting the bias point
    pub vk: f64,
    /// Cathode resistor
    pub rk: f64,
    /// Cathode bypass capacitor
    pub ck: f64,
}

/// Tube models, indexed by [`TubeType::index`].
pub static TUBE_MAP: [TubeParams; 2] = [
    // ECC82
    TubeParams {
        g0: 9.888576e-15,
        g_inf: 6.415385e-24,
        d: 2.95290,
        h: 1.021711e-02,
        vb: 250.0,
        ra: 10e3,
        vk: 6.0,
        rk: 861.652929,
        ck: 9.235444e-05,
    },
    // ECC83
    TubeParams {
        g0: 1.609683e-15,
        g_inf: 2.140844e-23,
        d: 0.61750,
        h: 1.000794e-02,
        vb: 250.0,
        ra: 50e3,
        vk: 1.5,
        rk: 1430.037044,
        ck: 5.564714e-05,
    },
];

/// Look up the parameter set of a tube type.
pub fn lookup(tube: TubeType) -> &'static TubeParams {
    &TUBE_MAP[tube.index()]
}
