//! Error taxonomy of the plasma kinetics engine.
//!
//! - [`KineticsError::Domain`]: a physical input is outside its valid range
//!   (T_e ≤ 0, T_g ≤ 0, negative vibrational energy, malformed T_e grid ...)
//! - [`KineticsError::Configuration`]: the rate table or the task document cannot supply
//!   what the model needs
//! - [`KineticsError::Integration`]: the stiff solver gave up; the error carries the
//!   prefix of the trajectory computed before the failure
//!
//! Domain and configuration errors are always raised before any computation starts.
use crate::ReactorsIVP::trajectory::Trajectory;
use thiserror::Error;

/// Why the integrator stopped before reaching the end of the time grid
#[derive(Debug, Clone, PartialEq, Error)]
pub enum IntegrationFailure {
    #[error("step budget of {max_steps} steps exhausted")]
    StepBudgetExceeded { max_steps: usize },
    #[error("stiff solver returned no solution for the interval")]
    NoSolution,
    #[error("stiff solver stopped at t = {t_stop:e} before the sample time {target:e}")]
    IntervalNotCompleted { t_stop: f64, target: f64 },
    #[error("state or derivative became non-finite")]
    NonFiniteState,
    #[error("concentration of {species} went negative ({value:e} cm^-3) beyond tolerance")]
    NegativeConcentration { species: String, value: f64 },
    #[error("integration cancelled by caller")]
    Cancelled,
    #[error("deadline exceeded")]
    DeadlineExceeded,
}

/// Solver failure together with everything that was computed before it
#[derive(Debug, Clone, Error)]
#[error("integration stopped at t = {t_reached:e} s after {} samples: {reason}", .partial.len())]
pub struct IntegrationError {
    /// samples of the requested time grid that were reached successfully
    pub partial: Trajectory,
    pub reason: IntegrationFailure,
    /// time the solver reached before stopping
    pub t_reached: f64,
}

#[derive(Debug, Error)]
pub enum KineticsError {
    #[error("domain error: {0}")]
    Domain(String),
    #[error("configuration error: {0}")]
    Configuration(String),
    #[error(transparent)]
    Integration(#[from] Box<IntegrationError>),
}

impl KineticsError {
    pub fn domain(msg: impl Into<String>) -> Self {
        KineticsError::Domain(msg.into())
    }

    pub fn configuration(msg: impl Into<String>) -> Self {
        KineticsError::Configuration(msg.into())
    }

    pub fn is_domain(&self) -> bool {
        matches!(self, KineticsError::Domain(_))
    }

    pub fn is_configuration(&self) -> bool {
        matches!(self, KineticsError::Configuration(_))
    }

    /// Partial trajectory of a failed integration, if this is an integration error
    pub fn partial_trajectory(&self) -> Option<&Trajectory> {
        match self {
            KineticsError::Integration(err) => Some(&err.partial),
            _ => None,
        }
    }
}

impl From<IntegrationError> for KineticsError {
    fn from(err: IntegrationError) -> Self {
        KineticsError::Integration(Box::new(err))
    }
}

pub type KineticsResult<T> = Result<T, KineticsError>;

/// Checks `value` is finite and strictly positive, naming it in the error
pub(crate) fn require_positive(name: &str, value: f64) -> KineticsResult<f64> {
    if !value.is_finite() || value <= 0.0 {
        return Err(KineticsError::domain(format!(
            "{} must be finite and > 0, got {}",
            name, value
        )));
    }
    Ok(value)
}

/// Checks `value` is finite and non-negative, naming it in the error
pub(crate) fn require_non_negative(name: &str, value: f64) -> KineticsResult<f64> {
    if !value.is_finite() || value < 0.0 {
        return Err(KineticsError::domain(format!(
            "{} must be finite and >= 0, got {}",
            name, value
        )));
    }
    Ok(value)
}
