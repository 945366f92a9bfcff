/// eng
/// Error taxonomy shared by the whole engine: domain errors (physical input out of range),
/// configuration errors (rate table or task document incomplete) and integration errors
/// carrying the partial trajectory computed before the solver stopped.
pub mod plasma_errors;
/// The seven species of the N2/H2 plasma, their fixed order in the state vector and their
/// N/H atom content.
pub mod species;
/// Immutable plasma state (T_e, T_g, density, N2:H2 ratio, power, E_v, catalyst factor),
/// slider ranges with defaults and the initial feed composition.
pub mod plasma_parameters;
/// Externally supplied coefficients keyed by reaction equation. Entries are constants,
/// modified Arrhenius expressions or symbolic formulas in Te, Tg, Ev evaluated with the
/// RustedSciThe symbolic engine.
/// # Examples
/// ```
/// use PlasmaNH3::Kinetics::rate_table::{RateTable, RateTableEntry};
/// use PlasmaNH3::Kinetics::plasma_parameters::PlasmaParameters;
/// let table = RateTable::from_entries(vec![
///     RateTableEntry::arrhenius("NH2 + H -> NH3", 3e-11, 0.0, 0.0).with_multiplier(1e3),
/// ]).unwrap();
/// let params = PlasmaParameters::new(2.0, 300.0, 2.5e19, 0.33, 5.0).unwrap();
/// let k = table.evaluate("NH2 + H -> NH3", &params).unwrap();
/// assert!((k - 3e-8).abs() < 1e-20);
/// ```
pub mod rate_table;
/// Rate coefficient model: Saha electron density, electron-impact dissociation of N2 and
/// H2, the vibrationally enhanced N + H2(v) channel and the tabulated channels.
pub mod plasma_rates;
/// Mass-action reaction network parsed from equation strings; numeric and symbolic
/// right-hand side and stoichiometric matrix of the ODE system.
pub mod mechanism;
/// Coefficient-vs-electron-temperature sweeps.
pub mod sensitivity;
