//! # Reactor Initial Value Problem (IVP) Module
//!
//! Time-dependent kinetics of a non-thermal N2/H2 plasma reactor.
//!
//! ## Model
//!
//! Seven species `[N, H, H2, NH, NH2, NH3, N2]` evolve under mass-action kinetics:
//!
//! ```text
//! dc_i/dt = Σ_j ν_ij · k_j · Π_l c_l^ν'_lj
//! ```
//!
//! with electron-impact channels scaled by the Saha electron density n_e(T_e).
//! Coefficients are frozen for the run; T_e, T_g and the feed do not change in time.
//!
//! The system is very stiff (electron-impact dissociation at T_e = 2 eV runs at
//! ~1e9 s^-1 while the horizon is 1e3 s), so it is handed to the implicit solvers of
//! RustedSciThe (BDF, or Radau on request) as symbolic right-hand sides.
//!
//! ## Modules
//! - `stiff_solver`: interval-wise driver of `UniversalODESolver`, settings, cancellation
//! - `trajectory`: sampled solution, CSV rendering, terminal table
//! - `plasma_reactor_IVP`: plasma reactor task tying parameters, rate table and solver
pub mod plasma_reactor_IVP;
mod plasma_reactor_IVP_tests;
pub mod stiff_solver;
pub mod trajectory;
