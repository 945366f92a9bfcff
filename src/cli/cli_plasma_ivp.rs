use crate::Kinetics::plasma_errors::{KineticsError, KineticsResult};
use crate::Kinetics::plasma_parameters::{ParameterRanges, PlasmaParameters, SliderRange};
use crate::Kinetics::rate_table::RateTable;
use crate::Kinetics::sensitivity::SensitivityAnalyzer;
use crate::ReactorsIVP::plasma_reactor_IVP::{PlasmaReactorIVP, SimulationConfig, ammonia_yield};
use crate::ReactorsIVP::stiff_solver::{SolverSettings, StiffMethod};
use crate::Utils::load_from_file::load_task_from_file;
use log::info;
use std::io::{self, Write};

pub fn plasma_ivp_menu() {
    loop {
        println!("\n=== Plasma NH3 Kinetics ===");
        println!("1. Simulate species evolution");
        println!("2. Rate coefficient sensitivity to T_e");
        println!("0. Back to main menu");
        let choice = prompt("Choose option: ");
        let result = match choice.trim() {
            "1" => run_simulation(),
            "2" => run_sensitivity(),
            "0" => break,
            _ => {
                println!("Invalid option");
                Ok(())
            }
        };
        if let Err(e) = result {
            println!("\x1b[31mError: {}\x1b[0m", e);
        }
    }
}

/// Loads a task document, integrates it and sweeps the coefficients
pub fn run_task_file(file_name: &str) -> KineticsResult<()> {
    let task = load_task_from_file(file_name)?;
    let ranges = ParameterRanges::default();
    let mut reactor = task.reactor(&ranges)?;
    reactor.params.pretty_print();
    let trajectory = reactor.solve()?;
    trajectory.pretty_print(12);
    reactor.pretty_print_stats();
    if let Some(y) = ammonia_yield(&trajectory) {
        println!("NH3 yield (per N atom fed): {:.4}", y);
    }
    task.sensitivity_table(&ranges)?.pretty_print();
    info!("task '{}' finished", file_name);
    Ok(())
}

fn run_simulation() -> KineticsResult<()> {
    let params = read_parameters()?;
    let defaults = SimulationConfig::default();
    let time_max = read_number("TimeMax, s", defaults.time_max)?;
    let time_points = read_number("TimePoints", defaults.time_points as f64)?;
    if time_points.fract() != 0.0 || time_points < 0.0 {
        return Err(KineticsError::domain(format!(
            "TimePoints must be a whole number, got {}",
            time_points
        )));
    }
    let method = read_method()?;
    let mut reactor = PlasmaReactorIVP::new(params, RateTable::reference()?)
        .with_config(SimulationConfig::new(time_max, time_points as usize))
        .with_solver_settings(SolverSettings {
            method,
            ..SolverSettings::default()
        });
    println!("Solving...");
    let trajectory = reactor.solve()?;
    trajectory.pretty_print(12);
    reactor.pretty_print_stats();
    if let Some(y) = ammonia_yield(&trajectory) {
        println!("NH3 yield (per N atom fed): {:.4}", y);
    }
    if prompt("Print CSV (y/N)? ").trim().eq_ignore_ascii_case("y") {
        println!("{}", trajectory.to_csv_string());
    }
    Ok(())
}

fn run_sensitivity() -> KineticsResult<()> {
    let ranges = ParameterRanges::default();
    let params = ranges.default_parameters()?;
    let te = ranges.electron_temperature;
    let points = read_number("number of T_e points", 10.0)?;
    if points.fract() != 0.0 || points < 1.0 {
        return Err(KineticsError::domain(format!(
            "number of points must be a positive whole number, got {}",
            points
        )));
    }
    let grid = crate::Kinetics::sensitivity::uniform_grid(te.min, te.max, points as usize)?;
    let table = RateTable::reference()?;
    SensitivityAnalyzer::new(params, &table)
        .sweep(&grid)?
        .pretty_print();
    Ok(())
}

fn read_parameters() -> KineticsResult<PlasmaParameters> {
    let ranges = ParameterRanges::default();
    let te = read_slider("Electron temperature T_e, eV", &ranges.electron_temperature)?;
    let ratio = read_slider("N2:H2 ratio", &ranges.feed_ratio)?;
    let power = read_slider("Power density, W/cm^3", &ranges.power_density)?;
    let tg = read_slider("Gas temperature T_g, K", &ranges.gas_temperature)?;
    ranges.parameters_from_sliders(te, ratio, power, tg)
}

fn read_method() -> KineticsResult<StiffMethod> {
    println!("Select solver:");
    println!("1. BDF (default)");
    println!("2. Radau (order 3)");
    println!("3. Radau (order 7)");
    match prompt("Choose solver: ").trim() {
        "" | "1" => Ok(StiffMethod::Bdf),
        "2" => Ok(StiffMethod::Radau3),
        "3" => Ok(StiffMethod::Radau7),
        other => Err(KineticsError::domain(format!("'{}' is not a solver option", other))),
    }
}

fn read_slider(label: &str, range: &SliderRange) -> KineticsResult<f64> {
    read_number(
        &format!("{} [{} .. {}]", label, range.min, range.max),
        range.default,
    )
}

/// Empty input keeps the default
fn read_number(label: &str, default: f64) -> KineticsResult<f64> {
    let input = prompt(&format!("{} (default {}): ", label, default));
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Ok(default);
    }
    trimmed
        .parse::<f64>()
        .map_err(|_| KineticsError::domain(format!("'{}' is not a number", trimmed)))
}

fn prompt(text: &str) -> String {
    print!("{}", text);
    let _ = io::stdout().flush();
    let mut input = String::new();
    if io::stdin().read_line(&mut input).is_err() {
        input.clear();
    }
    input
}
