//! # Stiff integrator
//!
//! Drives the stiff solvers of RustedSciThe (`UniversalODESolver`: BDF by default,
//! Radau IIA of order 3 or 7 on request). The system is handed over as symbolic
//! right-hand sides ([`SymbolicSystem`]); the solver forms the Jacobian itself.
//!
//! `UniversalODESolver::solve` runs to the end of its interval without reporting
//! failure, so the requested span is integrated one sample interval at a time. Each
//! interval restarts the solver from the last recorded sample. Between intervals the
//! driver checks the new state, the step budget, cancellation and the deadline; a run
//! that stops keeps every sample recorded before it.
//!
//! Cancellation and deadlines are only polled between intervals and never change the
//! numerical path, so a completed run is bit-identical for identical inputs.
use crate::Kinetics::plasma_errors::{IntegrationFailure, KineticsError, KineticsResult};
use RustedSciThe::numerical::ODE_api2::{SolverParam, SolverType, UniversalODESolver};
use RustedSciThe::numerical::Radau::Radau_main::RadauOrder;
use RustedSciThe::symbolic::symbolic_engine::Expr;
use log::{debug, info, warn};
use nalgebra::DVector;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

/// dy/dt = f(t, y) with one symbolic expression per named state variable
#[derive(Debug, Clone)]
pub struct SymbolicSystem {
    pub equations: Vec<Expr>,
    /// state variable names, in the order of the state vector
    pub variables: Vec<String>,
    /// name of the independent variable
    pub argument: String,
}

impl SymbolicSystem {
    pub fn new(equations: Vec<Expr>, variables: Vec<String>, argument: &str) -> KineticsResult<Self> {
        if equations.is_empty() || equations.len() != variables.len() {
            return Err(KineticsError::configuration(format!(
                "ODE system needs one equation per variable, got {} equations for {} variables",
                equations.len(),
                variables.len()
            )));
        }
        Ok(Self {
            equations,
            variables,
            argument: argument.to_string(),
        })
    }

    pub fn dimension(&self) -> usize {
        self.variables.len()
    }
}

/// Which RustedSciThe stiff method integrates each interval
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StiffMethod {
    #[default]
    Bdf,
    Radau3,
    Radau7,
}

impl StiffMethod {
    pub fn solver_type(&self) -> SolverType {
        match self {
            StiffMethod::Bdf => SolverType::BDF,
            StiffMethod::Radau3 => SolverType::Radau(RadauOrder::Order3),
            StiffMethod::Radau7 => SolverType::Radau(RadauOrder::Order7),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            StiffMethod::Bdf => "BDF",
            StiffMethod::Radau3 => "Radau (order 3)",
            StiffMethod::Radau7 => "Radau (order 7)",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SolverSettings {
    pub method: StiffMethod,
    pub rtol: f64,
    /// absolute tolerance in state units (cm^-3 for concentrations)
    pub atol: f64,
    /// first trial step; chosen by the solver when absent
    pub first_step: Option<f64>,
    /// defaults to the length of the sample interval
    pub max_step: Option<f64>,
    /// steps over the whole run, checked after each sample interval
    pub max_steps: usize,
}

impl Default for SolverSettings {
    fn default() -> Self {
        Self {
            method: StiffMethod::Bdf,
            rtol: 1e-6,
            atol: 1e2,
            first_step: None,
            max_step: None,
            max_steps: 100_000,
        }
    }
}

impl SolverSettings {
    pub fn validate(&self) -> KineticsResult<()> {
        let positive = |name: &str, v: f64| {
            if v.is_finite() && v > 0.0 {
                Ok(())
            } else {
                Err(KineticsError::configuration(format!(
                    "solver setting {} must be finite and > 0, got {}",
                    name, v
                )))
            }
        };
        positive("rtol", self.rtol)?;
        positive("atol", self.atol)?;
        if let Some(h0) = self.first_step {
            positive("first_step", h0)?;
        }
        if let Some(h_max) = self.max_step {
            positive("max_step", h_max)?;
        }
        if self.max_steps == 0 {
            return Err(KineticsError::configuration(
                "solver setting max_steps must be > 0",
            ));
        }
        Ok(())
    }

    /// Parameter map of `UniversalODESolver` for one interval of length `span`
    pub fn solver_params(&self, span: f64) -> HashMap<String, SolverParam> {
        let max_step = self.max_step.map_or(span, |h| h.min(span));
        let first_step = self.first_step.map(|h| h.min(span));
        HashMap::from([
            ("step_size".to_owned(), SolverParam::Float(max_step * 1e-3)),
            ("tolerance".to_owned(), SolverParam::Float(self.rtol)),
            ("max_iterations".to_owned(), SolverParam::Int(100000)),
            ("rtol".to_owned(), SolverParam::Float(self.rtol)),
            ("atol".to_owned(), SolverParam::Float(self.atol)),
            ("max_step".to_owned(), SolverParam::Float(max_step)),
            ("first_step".to_owned(), SolverParam::OptionalFloat(first_step)),
            ("vectorized".to_owned(), SolverParam::Bool(false)),
            ("jac_sparsity".to_owned(), SolverParam::OptionalMatrix(None)),
            // sequential Jacobian keeps runs reproducible
            ("parallel".to_owned(), SolverParam::Bool(false)),
        ])
    }
}

/// Shared flag a caller flips to stop a running integration
#[derive(Debug, Clone, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// External stop conditions of one run
#[derive(Debug, Clone, Default)]
pub struct RunControl {
    pub token: Option<CancellationToken>,
    pub deadline: Option<Instant>,
}

impl RunControl {
    pub fn with_token(mut self, token: CancellationToken) -> Self {
        self.token = Some(token);
        self
    }

    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    pub fn with_timeout(self, timeout: Duration) -> Self {
        self.with_deadline(Instant::now() + timeout)
    }

    fn interrupted(&self) -> Option<IntegrationFailure> {
        if self.token.as_ref().is_some_and(|t| t.is_cancelled()) {
            return Some(IntegrationFailure::Cancelled);
        }
        if self.deadline.is_some_and(|d| Instant::now() >= d) {
            return Some(IntegrationFailure::DeadlineExceeded);
        }
        None
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SolverStats {
    /// sample intervals integrated to their end
    pub intervals: usize,
    /// steps reported by the solver over those intervals
    pub steps: usize,
}

/// Samples reached so far and, when the run stopped early, why and where
#[derive(Debug, Clone)]
pub struct SolverOutcome {
    pub times: Vec<f64>,
    pub states: Vec<DVector<f64>>,
    pub stats: SolverStats,
    pub failure: Option<(IntegrationFailure, f64)>,
}

impl SolverOutcome {
    pub fn is_complete(&self) -> bool {
        self.failure.is_none()
    }
}

/// End of one solved interval
struct IntervalEnd {
    t: f64,
    y: DVector<f64>,
    steps: usize,
}

#[derive(Debug, Clone, Default)]
pub struct StiffIntegrator {
    pub settings: SolverSettings,
}

impl StiffIntegrator {
    pub fn new(settings: SolverSettings) -> KineticsResult<Self> {
        settings.validate()?;
        Ok(Self { settings })
    }

    /// Integrates from `sample_times[0]` through every later sample time. The first
    /// sample records `y0`. Sample times must be strictly increasing.
    pub fn integrate(
        &self,
        system: &SymbolicSystem,
        y0: &DVector<f64>,
        sample_times: &[f64],
        control: &RunControl,
    ) -> SolverOutcome {
        let mut outcome = SolverOutcome {
            times: Vec::with_capacity(sample_times.len()),
            states: Vec::with_capacity(sample_times.len()),
            stats: SolverStats::default(),
            failure: None,
        };
        let Some(&t0) = sample_times.first() else {
            return outcome;
        };
        outcome.times.push(t0);
        outcome.states.push(y0.clone());
        if y0.len() != system.dimension() || !y0.iter().all(|v| v.is_finite()) {
            return stop(outcome, IntegrationFailure::NonFiniteState, t0);
        }
        info!(
            "integrating {} equations with {} over {} sample intervals",
            system.dimension(),
            self.settings.method.name(),
            sample_times.len() - 1
        );

        let mut t = t0;
        let mut y = y0.clone();
        for &target in &sample_times[1..] {
            if let Some(reason) = control.interrupted() {
                return stop(outcome, reason, t);
            }
            if outcome.stats.steps >= self.settings.max_steps {
                let reason = IntegrationFailure::StepBudgetExceeded {
                    max_steps: self.settings.max_steps,
                };
                return stop(outcome, reason, t);
            }
            let end = match self.solve_interval(system, t, target, &y) {
                Ok(end) => end,
                Err(reason) => return stop(outcome, reason, t),
            };
            outcome.stats.steps += end.steps;
            if end.t < target - 1e-12 * target.abs().max(1.0) {
                let reason = IntegrationFailure::IntervalNotCompleted {
                    t_stop: end.t,
                    target,
                };
                return stop(outcome, reason, end.t);
            }
            let y_new = match self.accept_state(system, end.y) {
                Ok(y_new) => y_new,
                Err(reason) => return stop(outcome, reason, target),
            };
            debug!("t = {:e}: {} steps", target, end.steps);
            outcome.stats.intervals += 1;
            t = target;
            y = y_new;
            outcome.times.push(t);
            outcome.states.push(y.clone());
        }
        info!(
            "integration finished: {} intervals, {} steps",
            outcome.stats.intervals, outcome.stats.steps
        );
        outcome
    }

    /// Runs `UniversalODESolver` from `(t0, y0)` to `t1` and returns its last point
    fn solve_interval(
        &self,
        system: &SymbolicSystem,
        t0: f64,
        t1: f64,
        y0: &DVector<f64>,
    ) -> Result<IntervalEnd, IntegrationFailure> {
        let mut ode = UniversalODESolver::new(
            system.equations.clone(),
            system.variables.clone(),
            system.argument.clone(),
            self.settings.method.solver_type(),
            t0,
            y0.clone(),
            t1,
        );
        ode.set_parameters(self.settings.solver_params(t1 - t0));
        ode.initialize();
        ode.solve();
        let (t_result, y_result) = ode.get_result();
        let (Some(t_result), Some(y_result)) = (t_result, y_result) else {
            return Err(IntegrationFailure::NoSolution);
        };
        let n_points = t_result.len();
        if n_points == 0 {
            return Err(IntegrationFailure::NoSolution);
        }
        let last = n_points - 1;
        // one row per time point; a transposed layout is accepted as well
        let y_last: DVector<f64> = if y_result.nrows() == n_points && y_result.ncols() == y0.len() {
            y_result.row(last).transpose()
        } else if y_result.ncols() == n_points && y_result.nrows() == y0.len() {
            y_result.column(last).into_owned()
        } else {
            return Err(IntegrationFailure::NoSolution);
        };
        Ok(IntervalEnd {
            t: t_result[last],
            y: y_last,
            steps: last,
        })
    }

    /// Rejects non-finite states; negatives within tolerance are set to zero
    fn accept_state(
        &self,
        system: &SymbolicSystem,
        mut y: DVector<f64>,
    ) -> Result<DVector<f64>, IntegrationFailure> {
        if !y.iter().all(|v| v.is_finite()) {
            return Err(IntegrationFailure::NonFiniteState);
        }
        let y_scale = y.iter().fold(0.0f64, |m, v| m.max(v.abs()));
        let negative_tol = self.settings.atol + self.settings.rtol * y_scale;
        for (i, value) in y.iter_mut().enumerate() {
            if *value < -negative_tol {
                return Err(IntegrationFailure::NegativeConcentration {
                    species: system.variables[i].clone(),
                    value: *value,
                });
            }
            if *value < 0.0 {
                *value = 0.0;
            }
        }
        Ok(y)
    }
}

fn stop(mut outcome: SolverOutcome, reason: IntegrationFailure, t: f64) -> SolverOutcome {
    warn!("integration stopped at t = {:e}: {}", t, reason);
    outcome.failure = Some((reason, t));
    outcome
}
