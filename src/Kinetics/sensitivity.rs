//! Sensitivity of the rate coefficients to the electron temperature.
//!
//! Every row is an independent [`RateSet::evaluate`] at one T_e with all other plasma
//! parameters held fixed. The grid is validated as a whole before the first row is
//! computed, so a malformed grid never yields a partial table.
use crate::Kinetics::plasma_errors::{KineticsError, KineticsResult};
use crate::Kinetics::plasma_parameters::PlasmaParameters;
use crate::Kinetics::plasma_rates::{COEFFICIENT_NAMES, RateSet};
use crate::Kinetics::rate_table::RateTable;
use log::info;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SensitivityRow {
    /// eV
    pub electron_temperature: f64,
    /// cm^-3
    pub electron_density: f64,
    /// coefficient values in the order of [`COEFFICIENT_NAMES`]
    pub values: Vec<f64>,
}

impl SensitivityRow {
    pub fn get(&self, name: &str) -> Option<f64> {
        COEFFICIENT_NAMES
            .iter()
            .position(|n| *n == name)
            .and_then(|i| self.values.get(i).copied())
    }
}

impl From<RateSet> for SensitivityRow {
    fn from(rates: RateSet) -> Self {
        Self {
            electron_temperature: rates.electron_temperature,
            electron_density: rates.electron_density,
            values: rates.values(),
        }
    }
}

/// Coefficient-vs-T_e table, rows in grid order
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SensitivityTable {
    rows: Vec<SensitivityRow>,
}

impl SensitivityTable {
    pub fn rows(&self) -> &[SensitivityRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn electron_temperatures(&self) -> Vec<f64> {
        self.rows.iter().map(|r| r.electron_temperature).collect()
    }

    /// Values of one coefficient over the grid; `None` for an unknown name
    pub fn column(&self, name: &str) -> Option<Vec<f64>> {
        let i = COEFFICIENT_NAMES.iter().position(|n| *n == name)?;
        Some(self.rows.iter().map(|r| r.values[i]).collect())
    }

    pub fn pretty_print(&self) {
        use prettytable::{Cell, Row, Table};
        let mut table = Table::new();
        let mut header = vec![Cell::new("T_e, eV"), Cell::new("n_e, cm^-3")];
        header.extend(COEFFICIENT_NAMES.iter().map(|n| Cell::new(n)));
        table.add_row(Row::new(header));
        for row in &self.rows {
            let mut cells = vec![
                Cell::new(&format!("{:.3}", row.electron_temperature)),
                Cell::new(&format!("{:.3e}", row.electron_density)),
            ];
            cells.extend(row.values.iter().map(|v| Cell::new(&format!("{:.3e}", v))));
            table.add_row(Row::new(cells));
        }
        table.printstd();
    }
}

/// Sensitivity section of a task document, defaults span the T_e slider
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SweepSettings {
    pub te_min: f64,
    pub te_max: f64,
    pub points: usize,
}

impl Default for SweepSettings {
    fn default() -> Self {
        Self {
            te_min: 0.5,
            te_max: 5.0,
            points: 10,
        }
    }
}

impl SweepSettings {
    pub fn grid(&self) -> KineticsResult<Vec<f64>> {
        uniform_grid(self.te_min, self.te_max, self.points)
    }
}

/// `n` evenly spaced temperatures on `[min, max]`
pub fn uniform_grid(min: f64, max: f64, n: usize) -> KineticsResult<Vec<f64>> {
    if n == 0 {
        return Err(KineticsError::domain("T_e grid needs at least one point"));
    }
    if !(min.is_finite() && max.is_finite()) || min <= 0.0 || (n > 1 && max <= min) {
        return Err(KineticsError::domain(format!(
            "invalid T_e grid bounds [{}, {}] for {} points",
            min, max, n
        )));
    }
    if n == 1 {
        return Ok(vec![min]);
    }
    let step = (max - min) / (n - 1) as f64;
    let mut grid: Vec<f64> = (0..n).map(|i| min + step * i as f64).collect();
    grid[n - 1] = max;
    Ok(grid)
}

fn validate_grid(grid: &[f64]) -> KineticsResult<()> {
    if grid.is_empty() {
        return Err(KineticsError::domain("T_e grid is empty"));
    }
    if let Some(t_e) = grid.iter().find(|t| !t.is_finite() || **t <= 0.0) {
        return Err(KineticsError::domain(format!(
            "T_e grid values must be finite and > 0, got {}",
            t_e
        )));
    }
    if let Some(w) = grid.windows(2).find(|w| w[1] <= w[0]) {
        return Err(KineticsError::domain(format!(
            "T_e grid must be strictly increasing, got {} then {}",
            w[0], w[1]
        )));
    }
    Ok(())
}

pub struct SensitivityAnalyzer<'a> {
    pub params: PlasmaParameters,
    pub rate_table: &'a RateTable,
}

impl<'a> SensitivityAnalyzer<'a> {
    pub fn new(params: PlasmaParameters, rate_table: &'a RateTable) -> Self {
        Self { params, rate_table }
    }

    /// One row per grid temperature, in grid order
    pub fn sweep(&self, grid: &[f64]) -> KineticsResult<SensitivityTable> {
        validate_grid(grid)?;
        let rows = grid
            .iter()
            .map(|&t_e| {
                let params = self.params.with_electron_temperature(t_e)?;
                RateSet::evaluate(&params, self.rate_table).map(SensitivityRow::from)
            })
            .collect::<KineticsResult<Vec<_>>>()?;
        info!(
            "sensitivity sweep over T_e in [{}, {}] eV: {} rows",
            grid[0],
            grid[grid.len() - 1],
            rows.len()
        );
        Ok(SensitivityTable { rows })
    }
}

/// Sweeps every coefficient over `grid` at otherwise fixed `params`
pub fn sensitivity_sweep(
    grid: &[f64],
    params: &PlasmaParameters,
    rate_table: &RateTable,
) -> KineticsResult<SensitivityTable> {
    SensitivityAnalyzer::new(*params, rate_table).sweep(grid)
}
