//! # Mass-action reaction network of the N2/H2 plasma
//!
//! The mechanism is a fixed table of reaction equations, each bound to one rate
//! coefficient. Equations are parsed into stoichiometry once; the right-hand side of the
//! ODE system is then assembled generically by folding over the table, either numerically
//! ([`KineticsSystem::derivative`]) or as symbolic expressions for the stiff solver
//! ([`KineticsSystem::symbolic_system`]).
//!
//! Markers inside equations:
//! - `e`: electron-impact channel, the rate is multiplied by the electron density
//! - `M`: third body, its density is already folded into the effective coefficient
//! - `(v)`: vibrationally excited partner, same species for stoichiometry
//!
//! Every reaction of the table conserves N and H atoms, so the assembled derivative
//! conserves both atom inventories exactly (up to round-off). No closure term is used.
//!
//! The numeric form reads negative concentrations as zero when rates are formed; the
//! symbolic form is plain mass action and leaves negatives to the integrator.
use crate::Kinetics::plasma_errors::{KineticsError, KineticsResult};
use crate::Kinetics::plasma_parameters::PlasmaParameters;
use crate::Kinetics::plasma_rates::{K_H2, K_N2, K1, K2, K3, K4, K5, K6, K7, RateSet};
use crate::Kinetics::rate_table::RateTable;
use crate::Kinetics::species::{N_SPECIES, Species};
use crate::ReactorsIVP::stiff_solver::SymbolicSystem;
use RustedSciThe::symbolic::symbolic_engine::Expr;
use log::info;
use nalgebra::{DMatrix, DVector};

/// (coefficient name, equation) of every channel, in reaction order
pub const MECHANISM: [(&str, &str); 9] = [
    (K_N2, "e + N2 -> 2N + e"),
    (K_H2, "e + H2 -> 2H + e"),
    (K1, "N + H2(v) -> H + NH"),
    (K2, "NH3 + M -> NH2 + H + M"),
    (K3, "NH2 + H -> NH3"),
    (K4, "N + NH2 -> NH + NH"),
    (K5, "N + H -> NH"),
    (K6, "NH + H -> NH2"),
    (K7, "H + NH2 -> H2 + NH"),
];

#[derive(Debug, Clone, PartialEq)]
pub struct Reaction {
    pub equation: String,
    pub coefficient: &'static str,
    /// (species, stoichiometric coefficient); same species listed once
    pub reactants: Vec<(Species, u32)>,
    pub products: Vec<(Species, u32)>,
    pub electron_impact: bool,
}

impl Reaction {
    pub fn parse(coefficient: &'static str, equation: &str) -> KineticsResult<Self> {
        let (lhs, rhs) = equation.split_once("->").ok_or_else(|| {
            KineticsError::configuration(format!("reaction '{}' has no '->'", equation))
        })?;
        let (reactants, e_left) = parse_side(lhs, equation)?;
        let (products, e_right) = parse_side(rhs, equation)?;
        if e_left != e_right {
            return Err(KineticsError::configuration(format!(
                "electron marker must appear on both sides of '{}'",
                equation
            )));
        }
        if reactants.is_empty() || products.is_empty() {
            return Err(KineticsError::configuration(format!(
                "reaction '{}' needs at least one reactant and one product",
                equation
            )));
        }
        Ok(Self {
            equation: equation.to_string(),
            coefficient,
            reactants,
            products,
            electron_impact: e_left,
        })
    }

    /// change of N and H atoms across the reaction; zero for a balanced equation
    pub fn atom_imbalance(&self) -> (i64, i64) {
        let count = |side: &[(Species, u32)]| {
            side.iter().fold((0i64, 0i64), |(n, h), (sp, nu)| {
                let (an, ah) = sp.atoms();
                (n + (an * nu) as i64, h + (ah * nu) as i64)
            })
        };
        let (rn, rh) = count(&self.reactants);
        let (pn, ph) = count(&self.products);
        (pn - rn, ph - rh)
    }
}

/// Parses one side of an equation. Returns merged (species, coefficient) and whether
/// the electron marker is present.
fn parse_side(side: &str, equation: &str) -> KineticsResult<(Vec<(Species, u32)>, bool)> {
    let mut terms: Vec<(Species, u32)> = Vec::new();
    let mut electron = false;
    for raw in side.split('+') {
        let term = raw.trim();
        if term.is_empty() {
            return Err(KineticsError::configuration(format!(
                "empty term in reaction '{}'",
                equation
            )));
        }
        match term {
            "e" => {
                electron = true;
                continue;
            }
            "M" => continue,
            _ => {}
        }
        let digits: String = term.chars().take_while(|c| c.is_ascii_digit()).collect();
        let nu: u32 = if digits.is_empty() {
            1
        } else {
            digits.parse().map_err(|_| {
                KineticsError::configuration(format!(
                    "bad coefficient '{}' in reaction '{}'",
                    term, equation
                ))
            })?
        };
        let species: Species = term[digits.len()..].parse()?;
        match terms.iter_mut().find(|(sp, _)| *sp == species) {
            Some((_, existing)) => *existing += nu,
            None => terms.push((species, nu)),
        }
    }
    Ok((terms, electron))
}

/// The ODE right-hand side for one plasma state.
///
/// Coefficients and n_e are evaluated once at construction; every call to
/// [`KineticsSystem::derivative`] reuses them, so the system must be rebuilt when the
/// plasma parameters change.
#[derive(Debug, Clone)]
pub struct KineticsSystem {
    params: PlasmaParameters,
    rates: RateSet,
    reactions: Vec<Reaction>,
    /// effective first-/second-order coefficient of each reaction (n_e folded in)
    effective: Vec<f64>,
}

impl KineticsSystem {
    pub fn new(params: &PlasmaParameters, table: &RateTable) -> KineticsResult<Self> {
        let rates = RateSet::evaluate(params, table)?;
        let reactions = MECHANISM
            .iter()
            .map(|&(name, eq)| Reaction::parse(name, eq))
            .collect::<KineticsResult<Vec<_>>>()?;
        let mut effective = Vec::with_capacity(reactions.len());
        for reaction in &reactions {
            let k = rates.get(reaction.coefficient).ok_or_else(|| {
                KineticsError::configuration(format!(
                    "coefficient {} of '{}' was not evaluated",
                    reaction.coefficient, reaction.equation
                ))
            })?;
            effective.push(if reaction.electron_impact {
                k * rates.electron_density
            } else {
                k
            });
        }
        info!(
            "kinetic system built: {} reactions, n_e = {:e} cm^-3",
            reactions.len(),
            rates.electron_density
        );
        Ok(Self {
            params: *params,
            rates,
            reactions,
            effective,
        })
    }

    pub fn parameters(&self) -> &PlasmaParameters {
        &self.params
    }

    pub fn rates(&self) -> &RateSet {
        &self.rates
    }

    pub fn reactions(&self) -> &[Reaction] {
        &self.reactions
    }

    /// Reaction rates (cm^-3 s^-1) of every channel for state `y`, negatives read as zero
    pub fn reaction_rates(&self, y: &DVector<f64>) -> KineticsResult<Vec<f64>> {
        check_state_length(y)?;
        Ok(self.rates_of(y))
    }

    fn rates_of(&self, y: &DVector<f64>) -> Vec<f64> {
        self.reactions
            .iter()
            .zip(self.effective.iter())
            .map(|(reaction, k)| {
                reaction
                    .reactants
                    .iter()
                    .fold(*k, |acc, (sp, nu)| acc * y[sp.index()].max(0.0).powi(*nu as i32))
            })
            .collect()
    }

    /// d[species]/dt for state `y`
    pub fn derivative(&self, y: &DVector<f64>) -> KineticsResult<DVector<f64>> {
        check_state_length(y)?;
        let mut dy = DVector::zeros(N_SPECIES);
        for (reaction, rate) in self.reactions.iter().zip(self.rates_of(y)) {
            for (sp, nu) in &reaction.reactants {
                dy[sp.index()] -= *nu as f64 * rate;
            }
            for (sp, nu) in &reaction.products {
                dy[sp.index()] += *nu as f64 * rate;
            }
        }
        Ok(dy)
    }

    /// Right-hand side as one expression per species in the variables
    /// [`Species::names`]: every reaction contributes `±nu * k_eff * prod(c_j^nu_j)`.
    pub fn symbolic_rhs(&self) -> Vec<Expr> {
        let mut terms: Vec<Vec<Expr>> = vec![Vec::new(); N_SPECIES];
        for (reaction, k) in self.reactions.iter().zip(self.effective.iter()) {
            let rate = reaction
                .reactants
                .iter()
                .fold(Expr::Const(*k), |acc, (sp, nu)| {
                    (0..*nu).fold(acc, |acc, _| acc * Expr::Var(sp.formula().to_string()))
                });
            for (sp, nu) in &reaction.reactants {
                terms[sp.index()].push(Expr::Const(-(*nu as f64)) * rate.clone());
            }
            for (sp, nu) in &reaction.products {
                terms[sp.index()].push(Expr::Const(*nu as f64) * rate.clone());
            }
        }
        terms
            .into_iter()
            .map(|t| t.into_iter().reduce(|a, b| a + b).unwrap_or(Expr::Const(0.0)))
            .collect()
    }

    /// The system in the form the stiff integrator takes, time variable `t`
    pub fn symbolic_system(&self) -> KineticsResult<SymbolicSystem> {
        SymbolicSystem::new(self.symbolic_rhs(), Species::names(), "t")
    }

    /// Net stoichiometric matrix, reactions x species
    pub fn stoichiometric_matrix(&self) -> DMatrix<f64> {
        let mut matrix = DMatrix::zeros(self.reactions.len(), N_SPECIES);
        for (r, reaction) in self.reactions.iter().enumerate() {
            for (sp, nu) in &reaction.reactants {
                matrix[(r, sp.index())] -= *nu as f64;
            }
            for (sp, nu) in &reaction.products {
                matrix[(r, sp.index())] += *nu as f64;
            }
        }
        matrix
    }

    pub fn pretty_print_reactions(&self) {
        use prettytable::{Table, row};
        let mut table = Table::new();
        table.add_row(row!["Coefficient", "Reaction", "k", "k_eff"]);
        for (reaction, k_eff) in self.reactions.iter().zip(self.effective.iter()) {
            let k = self.rates.get(reaction.coefficient).unwrap_or(f64::NAN);
            table.add_row(row![
                reaction.coefficient,
                reaction.equation,
                format!("{:.4e}", k),
                format!("{:.4e}", k_eff)
            ]);
        }
        table.printstd();
    }
}

fn check_state_length(y: &DVector<f64>) -> KineticsResult<()> {
    if y.len() != N_SPECIES {
        return Err(KineticsError::domain(format!(
            "state vector must have {} components, got {}",
            N_SPECIES,
            y.len()
        )));
    }
    Ok(())
}
