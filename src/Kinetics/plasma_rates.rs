//! # Plasma rate coefficients
//!
//! Pure functions of the plasma state:
//! - electron density from a Saha-type estimate, `n_e(T_e)`
//! - electron-impact dissociation of N2 and H2, `k_N2(T_e)`, `k_H2(T_e)`
//! - vibrationally enhanced `N + H2(v) -> H + NH`, `k1(T_g, E_v)`
//! - the tabulated channels `k2 .. k7`, looked up in a [`RateTable`]
//!
//! [`RateSet`] evaluates all of them once for a given [`PlasmaParameters`].
//!
//! ## Units
//! Saha bracket is computed in SI: `k*T_e` is T_e (eV) times the elementary charge (J),
//! giving m^-3, converted to cm^-3 at the end. The exponent `I/(2kT_e)` is formed in eV.
//! Bimolecular coefficients are cm^3/s, `k2` is an effective first-order coefficient in s^-1.
use crate::Kinetics::plasma_errors::{KineticsResult, require_non_negative, require_positive};
use crate::Kinetics::plasma_parameters::PlasmaParameters;
use crate::Kinetics::rate_table::RateTable;
use log::debug;
use serde::Serialize;
use std::f64::consts::PI;

/// electron mass, kg
pub const ELECTRON_MASS: f64 = 9.109_383_701_5e-31;
/// Planck constant, J*s
pub const PLANCK: f64 = 6.626_070_15e-34;
/// elementary charge, J/eV
pub const ELEMENTARY_CHARGE: f64 = 1.602_176_634e-19;
/// ionisation energy of N2, eV
pub const IONIZATION_ENERGY_N2: f64 = 15.58;
/// m^-3 -> cm^-3
const PER_M3_TO_PER_CM3: f64 = 1e-6;
/// background electron density of the discharge, cm^-3
pub const ELECTRON_DENSITY_FLOOR: f64 = 1e10;

pub const K_N2: &str = "k_N2";
pub const K_H2: &str = "k_H2";
pub const K1: &str = "k1";
pub const K2: &str = "k2";
pub const K3: &str = "k3";
pub const K4: &str = "k4";
pub const K5: &str = "k5";
pub const K6: &str = "k6";
pub const K7: &str = "k7";

/// Tabulated coefficients: (name, reaction equation used as rate-table key)
pub const TABULATED_RATES: [(&str, &str); 6] = [
    (K2, "NH3 + M -> NH2 + H + M"),
    (K3, "NH2 + H -> NH3"),
    (K4, "N + NH2 -> NH + NH"),
    (K5, "N + H -> NH"),
    (K6, "NH + H -> NH2"),
    (K7, "H + NH2 -> H2 + NH"),
];

/// All coefficient names in the order of every coefficient table
pub const COEFFICIENT_NAMES: [&str; 9] = [K_N2, K_H2, K1, K2, K3, K4, K5, K6, K7];

/// Saha-type electron density, cm^-3.
///
/// n_e = (2π m_e k T_e / h²)^1.5 · exp(−I / (2 k T_e)), floored at
/// [`ELECTRON_DENSITY_FLOOR`] where the exponential underflows.
pub fn electron_density(t_e: f64) -> KineticsResult<f64> {
    require_positive("electron temperature T_e (eV)", t_e)?;
    let kt = t_e * ELEMENTARY_CHARGE;
    let thermal = (2.0 * PI * ELECTRON_MASS * kt / (PLANCK * PLANCK)).powf(1.5);
    let boltzmann = (-IONIZATION_ENERGY_N2 / (2.0 * t_e)).exp();
    let n_e = thermal * boltzmann * PER_M3_TO_PER_CM3;
    Ok(n_e.max(ELECTRON_DENSITY_FLOOR))
}

/// e + N2 -> 2N + e, cm^3/s
pub fn k_n2_dissociation(t_e: f64) -> KineticsResult<f64> {
    require_positive("electron temperature T_e (eV)", t_e)?;
    Ok(1e-9 * (-9.0 / t_e).exp())
}

/// e + H2 -> 2H + e, cm^3/s
pub fn k_h2_dissociation(t_e: f64) -> KineticsResult<f64> {
    require_positive("electron temperature T_e (eV)", t_e)?;
    Ok(1e-9 * (-8.0 / t_e).exp())
}

/// N + H2(v) -> H + NH, cm^3/s; T_g and E_v in K
pub fn k1_vibrational(t_g: f64, e_v: f64) -> KineticsResult<f64> {
    require_positive("gas temperature T_g (K)", t_g)?;
    require_non_negative("vibrational energy E_v (K)", e_v)?;
    Ok(4e-10 * (t_g / 300.0).sqrt() * (-16600.0 / t_g + 0.3 * e_v / t_g).exp())
}

/// Electron density and every coefficient evaluated for one plasma state
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RateSet {
    pub electron_temperature: f64,
    /// cm^-3
    pub electron_density: f64,
    values: Vec<(&'static str, f64)>,
}

impl RateSet {
    pub fn evaluate(params: &PlasmaParameters, table: &RateTable) -> KineticsResult<Self> {
        let t_e = params.electron_temperature();
        let n_e = electron_density(t_e)?;
        let mut values = Vec::with_capacity(COEFFICIENT_NAMES.len());
        values.push((K_N2, k_n2_dissociation(t_e)?));
        values.push((K_H2, k_h2_dissociation(t_e)?));
        values.push((
            K1,
            k1_vibrational(params.gas_temperature(), params.vibrational_energy())?,
        ));
        for (name, equation) in TABULATED_RATES.iter() {
            let mut k = table.evaluate(equation, params)?;
            if *name == K3 {
                k *= params.catalyst_factor();
            }
            values.push((*name, k));
        }
        debug!("rates at T_e = {} eV: n_e = {:e}, {:?}", t_e, n_e, values);
        Ok(Self {
            electron_temperature: t_e,
            electron_density: n_e,
            values,
        })
    }

    pub fn get(&self, name: &str) -> Option<f64> {
        self.values
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, v)| *v)
    }

    pub fn values(&self) -> Vec<f64> {
        self.values.iter().map(|(_, v)| *v).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, f64)> + '_ {
        self.values.iter().copied()
    }

    pub fn pretty_print(&self) {
        use prettytable::{Table, row};
        let mut table = Table::new();
        table.add_row(row!["Coefficient", "Value"]);
        table.add_row(row!["n_e (cm^-3)", format!("{:.4e}", self.electron_density)]);
        for (name, value) in self.iter() {
            table.add_row(row![name, format!("{:.4e}", value)]);
        }
        table.printstd();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_electron_density_reference_value() {
        // 1 eV: (2π m_e e / h²)^1.5 = 3.0183e27 m^-3, exp(-7.79) = 4.1389e-4
        let n_e = electron_density(1.0).unwrap();
        assert_relative_eq!(n_e, 1.2492e18, max_relative = 1e-3);
        let n_e = electron_density(2.0).unwrap();
        assert_relative_eq!(n_e, 1.7369e20, max_relative = 1e-3);
    }

    #[test]
    fn test_electron_density_positive_and_finite() {
        let mut t_e = 1e-3;
        while t_e <= 100.0 {
            let n_e = electron_density(t_e).unwrap();
            assert!(n_e > 0.0 && n_e.is_finite(), "n_e({}) = {}", t_e, n_e);
            t_e *= 1.1;
        }
        let n_e = electron_density(100.0).unwrap();
        assert!(n_e > 0.0 && n_e.is_finite());
        // exponential underflows here, the floor takes over
        assert_eq!(electron_density(0.01).unwrap(), ELECTRON_DENSITY_FLOOR);
    }

    #[test]
    fn test_electron_density_rejects_non_positive() {
        assert!(electron_density(0.0).unwrap_err().is_domain());
        assert!(electron_density(-2.0).unwrap_err().is_domain());
        assert!(electron_density(f64::NAN).unwrap_err().is_domain());
    }

    #[test]
    fn test_dissociation_monotone_and_bounded() {
        let mut prev_n2 = 0.0;
        let mut prev_h2 = 0.0;
        for i in 1..=400 {
            let t_e = 0.25 * i as f64;
            let kn2 = k_n2_dissociation(t_e).unwrap();
            let kh2 = k_h2_dissociation(t_e).unwrap();
            assert!(kn2 > prev_n2 && kh2 > prev_h2);
            assert!(kn2 < 1e-9 && kh2 < 1e-9);
            prev_n2 = kn2;
            prev_h2 = kh2;
        }
        assert_relative_eq!(
            k_n2_dissociation(9.0).unwrap(),
            1e-9 / std::f64::consts::E,
            max_relative = 1e-12
        );
        assert!(k_n2_dissociation(0.0).unwrap_err().is_domain());
        assert!(k_h2_dissociation(-1.0).unwrap_err().is_domain());
    }

    #[test]
    fn test_k1() {
        assert_relative_eq!(
            k1_vibrational(300.0, 0.0).unwrap(),
            4e-10 * (-16600.0f64 / 300.0).exp(),
            max_relative = 1e-12
        );
        // vibrational energy speeds the channel up
        assert!(k1_vibrational(600.0, 5000.0).unwrap() > k1_vibrational(600.0, 0.0).unwrap());
        assert!(k1_vibrational(0.0, 0.0).unwrap_err().is_domain());
        assert!(k1_vibrational(300.0, -1.0).unwrap_err().is_domain());
    }

    #[test]
    fn test_rate_set() {
        let params = PlasmaParameters::new(2.0, 300.0, 2.5e19, 0.33, 5.0).unwrap();
        let table = RateTable::reference().unwrap();
        let rates = RateSet::evaluate(&params, &table).unwrap();
        assert_eq!(rates.values().len(), COEFFICIENT_NAMES.len());
        let names: Vec<&str> = rates.iter().map(|(n, _)| n).collect();
        assert_eq!(names, COEFFICIENT_NAMES.to_vec());
        assert_eq!(rates.get(K_N2).unwrap(), k_n2_dissociation(2.0).unwrap());
        assert_eq!(
            rates.get(K3).unwrap(),
            table.evaluate("NH2 + H -> NH3", &params).unwrap()
        );
        assert!(rates.get("k99").is_none());

        let catalysed = params.with_catalyst_factor(4.0).unwrap();
        let rates_cat = RateSet::evaluate(&catalysed, &table).unwrap();
        assert_relative_eq!(rates_cat.get(K3).unwrap(), 4.0 * rates.get(K3).unwrap());
        assert_eq!(rates_cat.get(K2), rates.get(K2));
    }

    #[test]
    fn test_rate_set_missing_table_entry() {
        let params = PlasmaParameters::new(2.0, 300.0, 2.5e19, 0.33, 5.0).unwrap();
        let err = RateSet::evaluate(&params, &RateTable::default()).unwrap_err();
        assert!(err.is_configuration());
    }
}
