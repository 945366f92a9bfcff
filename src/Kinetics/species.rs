//! Species of the N2/H2 plasma mechanism and the fixed ordering of the state vector.
//!
//! The order `[N, H, H2, NH, NH2, NH3, N2]` is shared by the concentration vector, the
//! trajectory columns and every printed table.
use crate::Kinetics::plasma_errors::{KineticsError, KineticsResult};
use nalgebra::DVector;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub const N_SPECIES: usize = 7;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Species {
    N,
    H,
    H2,
    NH,
    NH2,
    NH3,
    N2,
}

impl Species {
    pub const ALL: [Species; N_SPECIES] = [
        Species::N,
        Species::H,
        Species::H2,
        Species::NH,
        Species::NH2,
        Species::NH3,
        Species::N2,
    ];

    /// position of the species in the state vector
    pub fn index(&self) -> usize {
        match self {
            Species::N => 0,
            Species::H => 1,
            Species::H2 => 2,
            Species::NH => 3,
            Species::NH2 => 4,
            Species::NH3 => 5,
            Species::N2 => 6,
        }
    }

    pub fn formula(&self) -> &'static str {
        match self {
            Species::N => "N",
            Species::H => "H",
            Species::H2 => "H2",
            Species::NH => "NH",
            Species::NH2 => "NH2",
            Species::NH3 => "NH3",
            Species::N2 => "N2",
        }
    }

    /// (nitrogen atoms, hydrogen atoms)
    pub fn atoms(&self) -> (u32, u32) {
        match self {
            Species::N => (1, 0),
            Species::H => (0, 1),
            Species::H2 => (0, 2),
            Species::NH => (1, 1),
            Species::NH2 => (1, 2),
            Species::NH3 => (1, 3),
            Species::N2 => (2, 0),
        }
    }

    pub fn names() -> Vec<String> {
        Species::ALL.iter().map(|s| s.formula().to_string()).collect()
    }
}

impl fmt::Display for Species {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.formula())
    }
}

impl FromStr for Species {
    type Err = KineticsError;
    /// accepts the plain formula and the vibrationally excited form, "H2(v)" -> H2
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let formula = trimmed
            .strip_suffix("(v)")
            .unwrap_or(trimmed)
            .trim();
        Species::ALL
            .iter()
            .find(|sp| sp.formula() == formula)
            .copied()
            .ok_or_else(|| KineticsError::configuration(format!("unknown species '{}'", s)))
    }
}

/// Empty state vector in species order
pub fn zero_state() -> DVector<f64> {
    DVector::zeros(N_SPECIES)
}

/// Checks a state vector has the right length and only finite, non-negative entries
pub fn validate_state(state: &DVector<f64>) -> KineticsResult<()> {
    if state.len() != N_SPECIES {
        return Err(KineticsError::domain(format!(
            "state vector must have {} components, got {}",
            N_SPECIES,
            state.len()
        )));
    }
    for (i, c) in state.iter().enumerate() {
        if !c.is_finite() || *c < 0.0 {
            return Err(KineticsError::domain(format!(
                "concentration of {} must be finite and >= 0, got {}",
                Species::ALL[i],
                c
            )));
        }
    }
    Ok(())
}

/// Total nitrogen and hydrogen atom densities (cm^-3) held in a state
pub fn atom_inventory(state: &DVector<f64>) -> (f64, f64) {
    Species::ALL
        .iter()
        .fold((0.0, 0.0), |(n_atoms, h_atoms), sp| {
            let (n, h) = sp.atoms();
            let c = state[sp.index()];
            (n_atoms + n as f64 * c, h_atoms + h as f64 * c)
        })
}
