//! # Plasma parameters
//!
//! [`PlasmaParameters`] is the only input threaded through the rate model, the kinetic
//! system and the integrator. It is created once per request through a validating
//! constructor and never mutated; changing a value means building a new instance.
//!
//! [`ParameterRanges`] holds the slider ranges and defaults of the interactive front end
//! and turns slider values into parameters.
//!
//! Units: T_e in eV, T_g in K, densities in cm^-3, power density in W/cm^3, E_v in K.
use crate::Kinetics::plasma_errors::{
    KineticsError, KineticsResult, require_non_negative, require_positive,
};
use crate::Kinetics::species::{Species, zero_state};
use nalgebra::DVector;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PlasmaParameters {
    electron_temperature: f64,
    gas_temperature: f64,
    total_density: f64,
    feed_ratio: f64,
    power_density: f64,
    vibrational_energy: f64,
    catalyst_factor: f64,
}

impl PlasmaParameters {
    /// Validating constructor. E_v defaults to 0 K and the catalyst factor to 1.
    pub fn new(
        electron_temperature: f64,
        gas_temperature: f64,
        total_density: f64,
        feed_ratio: f64,
        power_density: f64,
    ) -> KineticsResult<Self> {
        let params = Self {
            electron_temperature,
            gas_temperature,
            total_density,
            feed_ratio,
            power_density,
            vibrational_energy: 0.0,
            catalyst_factor: 1.0,
        };
        params.validate()?;
        Ok(params)
    }

    fn validate(&self) -> KineticsResult<()> {
        require_positive("electron temperature T_e (eV)", self.electron_temperature)?;
        require_positive("gas temperature T_g (K)", self.gas_temperature)?;
        require_positive("total density (cm^-3)", self.total_density)?;
        require_positive("power density (W/cm^3)", self.power_density)?;
        require_non_negative("vibrational energy E_v (K)", self.vibrational_energy)?;
        require_positive("catalyst factor", self.catalyst_factor)?;
        if !self.feed_ratio.is_finite() || self.feed_ratio <= 0.0 || self.feed_ratio > 1.0 {
            return Err(KineticsError::domain(format!(
                "N2:H2 feed ratio must lie in (0, 1], got {}",
                self.feed_ratio
            )));
        }
        Ok(())
    }

    pub fn with_electron_temperature(&self, electron_temperature: f64) -> KineticsResult<Self> {
        let params = Self {
            electron_temperature,
            ..*self
        };
        params.validate()?;
        Ok(params)
    }

    pub fn with_vibrational_energy(&self, vibrational_energy: f64) -> KineticsResult<Self> {
        let params = Self {
            vibrational_energy,
            ..*self
        };
        params.validate()?;
        Ok(params)
    }

    pub fn with_catalyst_factor(&self, catalyst_factor: f64) -> KineticsResult<Self> {
        let params = Self {
            catalyst_factor,
            ..*self
        };
        params.validate()?;
        Ok(params)
    }

    pub fn electron_temperature(&self) -> f64 {
        self.electron_temperature
    }
    pub fn gas_temperature(&self) -> f64 {
        self.gas_temperature
    }
    pub fn total_density(&self) -> f64 {
        self.total_density
    }
    pub fn feed_ratio(&self) -> f64 {
        self.feed_ratio
    }
    /// not consumed by the rate laws
    pub fn power_density(&self) -> f64 {
        self.power_density
    }
    pub fn vibrational_energy(&self) -> f64 {
        self.vibrational_energy
    }
    pub fn catalyst_factor(&self) -> f64 {
        self.catalyst_factor
    }

    /// Feed composition: N2 = n/(1+3r), H2 = n*3r/(1+3r), everything else zero.
    pub fn feed_composition(&self) -> DVector<f64> {
        let r = self.feed_ratio;
        let mut y0 = zero_state();
        y0[Species::N2.index()] = self.total_density / (1.0 + 3.0 * r);
        y0[Species::H2.index()] = self.total_density * 3.0 * r / (1.0 + 3.0 * r);
        y0
    }

    /// Feed composition with N and H atoms seeded at `radical_density`
    pub fn seeded_composition(&self, radical_density: f64) -> KineticsResult<DVector<f64>> {
        require_non_negative("radical seed density (cm^-3)", radical_density)?;
        let mut y0 = self.feed_composition();
        y0[Species::N.index()] = radical_density;
        y0[Species::H.index()] = radical_density;
        Ok(y0)
    }

    pub fn pretty_print(&self) {
        use prettytable::{Table, row};
        let mut table = Table::new();
        table.add_row(row!["Parameter", "Value", "Units"]);
        table.add_row(row![
            "Electron temperature (T_e)",
            format!("{:.3}", self.electron_temperature),
            "eV"
        ]);
        table.add_row(row![
            "Gas temperature (T_g)",
            format!("{:.1}", self.gas_temperature),
            "K"
        ]);
        table.add_row(row![
            "Total density",
            format!("{:.3e}", self.total_density),
            "cm^-3"
        ]);
        table.add_row(row!["N2:H2 ratio", format!("{:.3}", self.feed_ratio), "-"]);
        table.add_row(row![
            "Power density",
            format!("{:.2}", self.power_density),
            "W/cm^3"
        ]);
        table.add_row(row![
            "Vibrational energy (E_v)",
            format!("{:.1}", self.vibrational_energy),
            "K"
        ]);
        table.add_row(row![
            "Catalyst factor",
            format!("{:.2}", self.catalyst_factor),
            "-"
        ]);
        table.printstd();
    }
}

/// Raw plasma section of a task document; every field falls back to the slider default.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PlasmaSettings {
    pub electron_temperature: Option<f64>,
    pub gas_temperature: Option<f64>,
    pub total_density: Option<f64>,
    pub feed_ratio: Option<f64>,
    pub power_density: Option<f64>,
    pub vibrational_energy: Option<f64>,
    pub catalyst_factor: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SliderRange {
    pub min: f64,
    pub max: f64,
    pub default: f64,
}

impl SliderRange {
    pub fn new(min: f64, max: f64, default: f64) -> Self {
        Self { min, max, default }
    }

    fn check(&self, name: &str, value: f64) -> KineticsResult<f64> {
        if !value.is_finite() || value < self.min || value > self.max {
            return Err(KineticsError::domain(format!(
                "{} = {} lies outside the configured range [{}, {}]",
                name, value, self.min, self.max
            )));
        }
        Ok(value)
    }
}

/// Slider ranges and defaults of the front end
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterRanges {
    pub electron_temperature: SliderRange,
    pub feed_ratio: SliderRange,
    pub power_density: SliderRange,
    pub gas_temperature: SliderRange,
    /// cm^-3
    pub total_density: f64,
}

impl Default for ParameterRanges {
    fn default() -> Self {
        Self {
            electron_temperature: SliderRange::new(0.5, 5.0, 2.0),
            feed_ratio: SliderRange::new(0.1, 1.0, 0.33),
            power_density: SliderRange::new(0.1, 20.0, 5.0),
            gas_temperature: SliderRange::new(300.0, 1000.0, 300.0),
            total_density: 2.5e19,
        }
    }
}

impl ParameterRanges {
    /// Builds parameters from slider positions, rejecting values outside the ranges
    pub fn parameters_from_sliders(
        &self,
        electron_temperature: f64,
        feed_ratio: f64,
        power_density: f64,
        gas_temperature: f64,
    ) -> KineticsResult<PlasmaParameters> {
        PlasmaParameters::new(
            self.electron_temperature
                .check("electron temperature", electron_temperature)?,
            self.gas_temperature
                .check("gas temperature", gas_temperature)?,
            self.total_density,
            self.feed_ratio.check("feed ratio", feed_ratio)?,
            self.power_density.check("power density", power_density)?,
        )
    }

    pub fn default_parameters(&self) -> KineticsResult<PlasmaParameters> {
        self.parameters_from_sliders(
            self.electron_temperature.default,
            self.feed_ratio.default,
            self.power_density.default,
            self.gas_temperature.default,
        )
    }

    /// Merges a task-document plasma section over the slider defaults.
    /// Explicit values are only checked for physical validity, not against slider ranges.
    pub fn parameters_from_settings(
        &self,
        settings: &PlasmaSettings,
    ) -> KineticsResult<PlasmaParameters> {
        let params = PlasmaParameters::new(
            settings
                .electron_temperature
                .unwrap_or(self.electron_temperature.default),
            settings
                .gas_temperature
                .unwrap_or(self.gas_temperature.default),
            settings.total_density.unwrap_or(self.total_density),
            settings.feed_ratio.unwrap_or(self.feed_ratio.default),
            settings.power_density.unwrap_or(self.power_density.default),
        )?;
        let params = params.with_vibrational_energy(settings.vibrational_energy.unwrap_or(0.0))?;
        params.with_catalyst_factor(settings.catalyst_factor.unwrap_or(1.0))
    }
}
