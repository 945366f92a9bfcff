//! # Plasma reactor IVP
//!
//! Time evolution of the seven species of the N2/H2 discharge over `[0, TimeMax]`.
//!
//! ## Workflow
//! 1. [`PlasmaReactorIVP::new`] takes plasma parameters and a rate table
//! 2. optional: simulation config (horizon, sample count, grid kind, radical seed),
//!    solver settings, cancellation/deadline, custom initial state
//! 3. [`PlasmaReactorIVP::solve`] builds the [`KineticsSystem`], integrates its symbolic
//!    form with the stiff solver (BDF unless the settings ask for Radau) and returns a
//!    [`Trajectory`]
//!
//! When the solver stops early the error is [`KineticsError::Integration`] holding the
//! samples reached so far.
//!
//! ## Example
//! ```rust, ignore
//! let params = PlasmaParameters::new(2.0, 300.0, 2.5e19, 0.33, 5.0)?;
//! let mut reactor = PlasmaReactorIVP::new(params, RateTable::reference()?);
//! let trajectory = reactor.solve()?;
//! trajectory.pretty_print(10);
//! ```
use crate::Kinetics::mechanism::KineticsSystem;
use crate::Kinetics::plasma_errors::{IntegrationError, KineticsError, KineticsResult};
use crate::Kinetics::plasma_parameters::PlasmaParameters;
use crate::Kinetics::rate_table::RateTable;
use crate::Kinetics::species::{Species, atom_inventory, validate_state};
use crate::ReactorsIVP::stiff_solver::{RunControl, SolverSettings, SolverStats, StiffIntegrator};
use crate::ReactorsIVP::trajectory::Trajectory;
use log::{error, info};
use nalgebra::DVector;
use serde::{Deserialize, Serialize};

/// first nonzero sample of a logarithmic grid, as a fraction of TimeMax
pub const LOG_GRID_START: f64 = 1e-9;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeGrid {
    #[default]
    Linear,
    Logarithmic,
}

/// Simulation section of a task document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SimulationConfig {
    /// s
    pub time_max: f64,
    pub time_points: usize,
    pub grid: TimeGrid,
    /// initial N and H density, cm^-3
    pub radical_seed: f64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            time_max: 1000.0,
            time_points: 100,
            grid: TimeGrid::Linear,
            radical_seed: 0.0,
        }
    }
}

impl SimulationConfig {
    pub fn new(time_max: f64, time_points: usize) -> Self {
        Self {
            time_max,
            time_points,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> KineticsResult<()> {
        if !self.time_max.is_finite() || self.time_max <= 0.0 {
            return Err(KineticsError::domain(format!(
                "TimeMax must be finite and > 0, got {}",
                self.time_max
            )));
        }
        if self.time_points < 2 {
            return Err(KineticsError::domain(format!(
                "TimePoints must be >= 2, got {}",
                self.time_points
            )));
        }
        if !self.radical_seed.is_finite() || self.radical_seed < 0.0 {
            return Err(KineticsError::domain(format!(
                "radical seed density must be finite and >= 0, got {}",
                self.radical_seed
            )));
        }
        Ok(())
    }

    /// Sample instants, first at 0 and last exactly at TimeMax
    pub fn sample_times(&self) -> KineticsResult<Vec<f64>> {
        self.validate()?;
        let n = self.time_points;
        let last = (n - 1) as f64;
        let mut times: Vec<f64> = match self.grid {
            TimeGrid::Linear => (0..n).map(|i| self.time_max * i as f64 / last).collect(),
            TimeGrid::Logarithmic => {
                let start = (self.time_max * LOG_GRID_START).ln();
                let end = self.time_max.ln();
                let mut times = vec![0.0];
                let steps = (n - 2).max(1) as f64;
                times.extend((0..n - 1).map(|i| (start + (end - start) * i as f64 / steps).exp()));
                times
            }
        };
        times[n - 1] = self.time_max;
        Ok(times)
    }
}

pub struct PlasmaReactorIVP {
    pub params: PlasmaParameters,
    pub rate_table: RateTable,
    pub config: SimulationConfig,
    pub solver_settings: SolverSettings,
    pub control: RunControl,
    /// overrides the feed composition when set
    pub initial_state: Option<DVector<f64>>,
    /// statistics of the last run
    pub stats: Option<SolverStats>,
}

impl PlasmaReactorIVP {
    pub fn new(params: PlasmaParameters, rate_table: RateTable) -> Self {
        Self {
            params,
            rate_table,
            config: SimulationConfig::default(),
            solver_settings: SolverSettings::default(),
            control: RunControl::default(),
            initial_state: None,
            stats: None,
        }
    }

    pub fn with_config(mut self, config: SimulationConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_solver_settings(mut self, settings: SolverSettings) -> Self {
        self.solver_settings = settings;
        self
    }

    pub fn with_control(mut self, control: RunControl) -> Self {
        self.control = control;
        self
    }

    pub fn with_initial_state(mut self, y0: DVector<f64>) -> KineticsResult<Self> {
        validate_state(&y0)?;
        self.initial_state = Some(y0);
        Ok(self)
    }

    /// Initial concentrations: the explicit state if one was given, the seeded feed otherwise
    pub fn initial_concentrations(&self) -> KineticsResult<DVector<f64>> {
        match &self.initial_state {
            Some(y0) => Ok(y0.clone()),
            None => self.params.seeded_composition(self.config.radical_seed),
        }
    }

    pub fn solve(&mut self) -> KineticsResult<Trajectory> {
        let times = self.config.sample_times()?;
        let y0 = self.initial_concentrations()?;
        validate_state(&y0)?;
        let solver = StiffIntegrator::new(self.solver_settings.clone())?;
        let system = KineticsSystem::new(&self.params, &self.rate_table)?.symbolic_system()?;
        info!(
            "integrating plasma kinetics: T_e = {} eV, T_g = {} K, TimeMax = {} s, {} samples",
            self.params.electron_temperature(),
            self.params.gas_temperature(),
            self.config.time_max,
            times.len()
        );
        let outcome = solver.integrate(&system, &y0, &times, &self.control);
        self.stats = Some(outcome.stats);
        let partial = Trajectory::from_solver(outcome.times, outcome.states);
        match outcome.failure {
            None => Ok(partial),
            Some((reason, t_reached)) => {
                error!("plasma integration failed: {}", reason);
                Err(KineticsError::from(IntegrationError {
                    partial,
                    reason,
                    t_reached,
                }))
            }
        }
    }

    pub fn pretty_print_stats(&self) {
        use prettytable::{Table, row};
        let Some(stats) = self.stats else {
            println!("no integration has been run yet");
            return;
        };
        let mut table = Table::new();
        table.add_row(row!["Method", "Intervals", "Steps"]);
        table.add_row(row![
            self.solver_settings.method.name(),
            stats.intervals,
            stats.steps
        ]);
        table.printstd();
    }
}

/// Integrates from `initial` over `[0, time_max]` sampled at `time_points` even instants
pub fn simulate(
    initial: &DVector<f64>,
    time_max: f64,
    time_points: usize,
    params: &PlasmaParameters,
    rate_table: &RateTable,
) -> KineticsResult<Trajectory> {
    let mut reactor = PlasmaReactorIVP::new(*params, rate_table.clone())
        .with_config(SimulationConfig::new(time_max, time_points))
        .with_initial_state(initial.clone())?;
    reactor.solve()
}

/// NH3 yield of a trajectory: final NH3 density over the N atoms fed in
pub fn ammonia_yield(trajectory: &Trajectory) -> Option<f64> {
    let (_, first) = trajectory.sample(0)?;
    let (_, last) = trajectory.last()?;
    let (n_atoms, _) = atom_inventory(first);
    if n_atoms > 0.0 {
        Some(last[Species::NH3.index()] / n_atoms)
    } else {
        None
    }
}
