use crate::Kinetics::plasma_errors::KineticsResult;
use crate::Kinetics::plasma_parameters::ParameterRanges;
use crate::Kinetics::rate_table::RateTable;
use log::error;

pub fn plasma_examples(task: usize) {
    if let Err(e) = run_plasma_example(task) {
        error!("example {} failed: {}", task, e);
        println!("Error: {}", e);
    }
}

fn run_plasma_example(task: usize) -> KineticsResult<()> {
    let ranges = ParameterRanges::default();
    match task {
        0 => {
            // RATE COEFFICIENTS AT THE DEFAULT SLIDER POSITIONS
            use crate::Kinetics::mechanism::KineticsSystem;
            use crate::Kinetics::plasma_rates::RateSet;
            let params = ranges.default_parameters()?;
            params.pretty_print();
            let rates = RateSet::evaluate(&params, &RateTable::reference()?)?;
            rates.pretty_print();
            let system = KineticsSystem::new(&params, &RateTable::reference()?)?;
            system.pretty_print_reactions();
            println!("stoichiometric matrix {}", system.stoichiometric_matrix());
        }
        1 => {
            // REFERENCE SIMULATION: T_e = 2 eV, T_g = 300 K, N2:H2 = 0.33, 1000 s
            use crate::ReactorsIVP::plasma_reactor_IVP::{
                PlasmaReactorIVP, SimulationConfig, ammonia_yield,
            };
            let params = ranges.parameters_from_sliders(2.0, 0.33, 5.0, 300.0)?;
            let mut reactor = PlasmaReactorIVP::new(params, RateTable::reference()?)
                .with_config(SimulationConfig::new(1000.0, 100));
            let trajectory = reactor.solve()?;
            trajectory.pretty_print(12);
            reactor.pretty_print_stats();
            if let Some(y) = ammonia_yield(&trajectory) {
                println!("NH3 yield (per N atom fed): {:.4}", y);
            }
        }
        2 => {
            // SENSITIVITY OF THE COEFFICIENTS TO T_e OVER THE SLIDER RANGE
            use crate::Kinetics::sensitivity::{SensitivityAnalyzer, uniform_grid};
            let params = ranges.default_parameters()?;
            let te = ranges.electron_temperature;
            let grid = uniform_grid(te.min, te.max, 10)?;
            let table = RateTable::reference()?;
            let sweep = SensitivityAnalyzer::new(params, &table).sweep(&grid)?;
            sweep.pretty_print();
        }
        3 => {
            // CATALYST ENHANCEMENT OF NH2 + H -> NH3
            use crate::Kinetics::species::Species;
            use crate::ReactorsIVP::plasma_reactor_IVP::{PlasmaReactorIVP, SimulationConfig};
            let base = ranges.default_parameters()?;
            for factor in [1.0, 10.0, 100.0] {
                let params = base.with_catalyst_factor(factor)?;
                let mut reactor = PlasmaReactorIVP::new(params, RateTable::reference()?)
                    .with_config(SimulationConfig::new(100.0, 20));
                let trajectory = reactor.solve()?;
                let nh3 = trajectory.species_series(Species::NH3);
                println!(
                    "catalyst factor {:>6}: final NH3 = {:.4e} cm^-3",
                    factor,
                    nh3.last().copied().unwrap_or(0.0)
                );
            }
        }
        4 => {
            // USER RATE TABLE: SYMBOLIC FORMULAS, MULTIPLIERS, LOGARITHMIC GRID, CSV
            use crate::Kinetics::rate_table::RateTableEntry;
            use crate::ReactorsIVP::plasma_reactor_IVP::{
                PlasmaReactorIVP, SimulationConfig, TimeGrid,
            };
            let table = RateTable::from_entries(vec![
                RateTableEntry::arrhenius("NH3 + M -> NH2 + H + M", 1e12, 0.0, 47000.0),
                RateTableEntry::formula("NH2 + H -> NH3", "(Tg/300.0)^0.5").with_multiplier(3e-11),
                RateTableEntry::constant("N + NH2 -> NH + NH", 1.2e-10),
                RateTableEntry::constant("N + H -> NH", 5e-12).with_multiplier(1e-2),
                RateTableEntry::formula("NH + H -> NH2", "1.0 + 0.1*Te").with_multiplier(5e-11),
                RateTableEntry::arrhenius("H + NH2 -> H2 + NH", 1e-11, 0.0, 2000.0),
            ])?;
            let params = ranges
                .parameters_from_sliders(3.0, 0.5, 10.0, 600.0)?
                .with_vibrational_energy(3000.0)?;
            let config = SimulationConfig {
                grid: TimeGrid::Logarithmic,
                ..SimulationConfig::new(10.0, 12)
            };
            let mut reactor = PlasmaReactorIVP::new(params, table).with_config(config);
            let trajectory = reactor.solve()?;
            println!("{}", trajectory.to_csv_string());
        }
        _ => println!("no plasma example with number {}", task),
    }
    Ok(())
}
