//! Task documents for the plasma kinetics engine.
//!
//! A document is plain text split by upper-case header lines. Every header is followed
//! by a JSON body that runs until the next header or the end of the file:
//!
//! ```text
//! PLASMA
//! { "electron_temperature": 2.0, "feed_ratio": 0.33 }
//! SIMULATION
//! { "time_max": 1000.0, "time_points": 100 }
//! SOLVER
//! { "rtol": 1e-6, "method": "radau7" }
//! RATES
//! [ { "reaction": "NH2 + H -> NH3", "type": "Arrhenius", "a": 3e-11, "n": 0.0, "ea": 0.0 } ]
//! SENSITIVITY
//! { "te_min": 0.5, "te_max": 5.0, "points": 10 }
//! ```
//!
//! All sections are optional; a missing section falls back to its defaults (the
//! built-in reference rate table for RATES). Text before the first header is ignored.
use crate::Kinetics::plasma_errors::{KineticsError, KineticsResult};
use crate::Kinetics::plasma_parameters::{ParameterRanges, PlasmaParameters, PlasmaSettings};
use crate::Kinetics::rate_table::{RateTable, RateTableEntry};
use crate::Kinetics::sensitivity::{SensitivityAnalyzer, SensitivityTable, SweepSettings};
use crate::ReactorsIVP::plasma_reactor_IVP::{PlasmaReactorIVP, SimulationConfig};
use crate::ReactorsIVP::stiff_solver::SolverSettings;
use log::{error, info, warn};
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::fs;
use std::path::Path;

pub const PLASMA: &str = "PLASMA";
pub const SIMULATION: &str = "SIMULATION";
pub const SOLVER: &str = "SOLVER";
pub const RATES: &str = "RATES";
pub const SENSITIVITY: &str = "SENSITIVITY";
pub const SECTION_HEADERS: [&str; 5] = [PLASMA, SIMULATION, SOLVER, RATES, SENSITIVITY];

/// Everything a run needs, as read from a task document
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlasmaTask {
    pub plasma: PlasmaSettings,
    pub simulation: SimulationConfig,
    pub solver: SolverSettings,
    /// `None` selects the built-in reference table
    pub rates: Option<Vec<RateTableEntry>>,
    pub sensitivity: SweepSettings,
}

impl PlasmaTask {
    pub fn parameters(&self, ranges: &ParameterRanges) -> KineticsResult<PlasmaParameters> {
        ranges.parameters_from_settings(&self.plasma)
    }

    pub fn rate_table(&self) -> KineticsResult<RateTable> {
        match &self.rates {
            Some(entries) => RateTable::from_entries(entries.clone()),
            None => RateTable::reference(),
        }
    }

    pub fn reactor(&self, ranges: &ParameterRanges) -> KineticsResult<PlasmaReactorIVP> {
        Ok(PlasmaReactorIVP::new(self.parameters(ranges)?, self.rate_table()?)
            .with_config(self.simulation.clone())
            .with_solver_settings(self.solver.clone()))
    }

    pub fn sensitivity_table(&self, ranges: &ParameterRanges) -> KineticsResult<SensitivityTable> {
        let grid = self.sensitivity.grid()?;
        let table = self.rate_table()?;
        SensitivityAnalyzer::new(self.parameters(ranges)?, &table).sweep(&grid)
    }
}

pub struct LoadData {
    pub file_name: String,
}

impl LoadData {
    pub fn new(file_name: String) -> Self {
        LoadData { file_name }
    }

    pub fn load_task(&self) -> KineticsResult<PlasmaTask> {
        load_task_from_file(&self.file_name)
    }
}

fn is_header(line: &str) -> bool {
    let trimmed = line.trim();
    !trimmed.is_empty() && trimmed.chars().all(|c| c.is_uppercase() || c == '_')
}

/// Section name -> (index of the first body line, body text)
fn split_sections(lines: &[&str]) -> KineticsResult<HashMap<String, (usize, String)>> {
    let headers: Vec<(usize, String)> = lines
        .iter()
        .enumerate()
        .filter(|(_, line)| is_header(line))
        .map(|(i, line)| (i, line.trim().to_string()))
        .collect();
    let mut sections = HashMap::new();
    for (k, (i, name)) in headers.iter().enumerate() {
        if !SECTION_HEADERS.contains(&name.as_str()) {
            return Err(KineticsError::configuration(format!(
                "unknown section '{}' at line {} (expected one of {:?})",
                name,
                i + 1,
                SECTION_HEADERS
            )));
        }
        let end = headers.get(k + 1).map(|(j, _)| *j).unwrap_or(lines.len());
        let body = lines[i + 1..end].join("\n");
        if sections.insert(name.clone(), (i + 1, body)).is_some() {
            return Err(KineticsError::configuration(format!(
                "section '{}' appears more than once",
                name
            )));
        }
    }
    Ok(sections)
}

/// Deserialises one section body, reporting the failing line of the whole document
fn parse_section<T: DeserializeOwned>(
    name: &str,
    start_index: usize,
    body: &str,
    lines: &[&str],
) -> KineticsResult<T> {
    serde_json::from_str(body).map_err(|e| {
        let error_line = e.line();
        let error_column = e.column();
        // serde reports 1-based lines inside the body
        let actual_line = start_index + error_line.max(1) - 1;
        let error_msg = format!(
            "error parsing section {} at line {}, column {} (line {} in file): {}",
            name,
            error_line,
            error_column,
            actual_line + 1,
            e
        );
        error!("{}", error_msg);
        if let Some(problem_line) = lines.get(actual_line) {
            error!("Problematic line: {}", problem_line);
            if error_column >= 1 && error_column <= problem_line.len() {
                error!("{}", " ".repeat(error_column - 1) + "^");
            }
        }
        KineticsError::configuration(error_msg)
    })
}

fn optional_section<T: DeserializeOwned + Default>(
    sections: &HashMap<String, (usize, String)>,
    name: &str,
    lines: &[&str],
) -> KineticsResult<T> {
    match sections.get(name) {
        Some((start, body)) if !body.trim().is_empty() => parse_section(name, *start, body, lines),
        Some(_) => {
            warn!("section {} is empty, using defaults", name);
            Ok(T::default())
        }
        None => Ok(T::default()),
    }
}

pub fn load_task_from_str(document: &str) -> KineticsResult<PlasmaTask> {
    let lines: Vec<&str> = document.lines().collect();
    let sections = split_sections(&lines)?;
    if sections.is_empty() {
        warn!("task document has no sections, every setting takes its default");
    }
    let rates = match sections.get(RATES) {
        Some((start, body)) if !body.trim().is_empty() => {
            let entries: Vec<RateTableEntry> = parse_section(RATES, *start, body, &lines)?;
            Some(entries)
        }
        _ => None,
    };
    let task = PlasmaTask {
        plasma: optional_section(&sections, PLASMA, &lines)?,
        simulation: optional_section(&sections, SIMULATION, &lines)?,
        solver: optional_section(&sections, SOLVER, &lines)?,
        rates,
        sensitivity: optional_section(&sections, SENSITIVITY, &lines)?,
    };
    Ok(task)
}

pub fn load_task_from_file(file_name: &str) -> KineticsResult<PlasmaTask> {
    let path = Path::new(file_name);
    if !path.exists() {
        return Err(KineticsError::configuration(format!(
            "File '{}' does not exist",
            file_name
        )));
    }
    let document = fs::read_to_string(path).map_err(|e| {
        KineticsError::configuration(format!("Failed to open file '{}': {}", file_name, e))
    })?;
    let task = load_task_from_str(&document)?;
    info!("Successfully parsed plasma task from file '{}'", file_name);
    Ok(task)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Kinetics::rate_table::RateExpression;
    use crate::ReactorsIVP::plasma_reactor_IVP::TimeGrid;
    use crate::ReactorsIVP::stiff_solver::StiffMethod;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const FULL_TASK: &str = r#"Plasma NH3 synthesis, reference case
PLASMA
{
  "electron_temperature": 2.0,
  "gas_temperature": 300.0,
  "feed_ratio": 0.33,
  "catalyst_factor": 2.0
}
SIMULATION
{ "time_max": 500.0, "time_points": 20, "grid": "logarithmic" }
SOLVER
{ "rtol": 1e-5, "atol": 10.0, "method": "radau3" }
RATES
[
  { "reaction": "NH3 + M -> NH2 + H + M", "type": "Arrhenius", "a": 1e12, "n": 0.0, "ea": 47000.0 },
  { "reaction": "NH2 + H -> NH3", "type": "Constant", "value": 3e-11 },
  { "reaction": "N + NH2 -> NH + NH", "type": "Constant", "value": 1.2e-10 },
  { "reaction": "N + H -> NH", "type": "Constant", "value": 5e-12, "multiplier": 0.01 },
  { "reaction": "NH + H -> NH2", "type": "Constant", "value": 5e-11 },
  { "reaction": "H + NH2 -> H2 + NH", "type": "Arrhenius", "a": 1e-11, "n": 0.0, "ea": 2000.0 }
]
SENSITIVITY
{ "te_min": 1.0, "te_max": 3.0, "points": 5 }
"#;

    #[test]
    fn test_load_full_task_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        write!(temp_file, "{}", FULL_TASK).unwrap();
        let file_path = temp_file.path().to_str().unwrap();

        let task = LoadData::new(file_path.to_owned()).load_task().unwrap();
        assert_eq!(task.plasma.electron_temperature, Some(2.0));
        assert_eq!(task.plasma.catalyst_factor, Some(2.0));
        assert_eq!(task.plasma.power_density, None);
        assert_eq!(task.simulation.time_points, 20);
        assert_eq!(task.simulation.grid, TimeGrid::Logarithmic);
        assert_eq!(task.solver.rtol, 1e-5);
        assert_eq!(task.solver.max_steps, SolverSettings::default().max_steps);
        assert_eq!(task.solver.method, StiffMethod::Radau3);
        assert_eq!(task.sensitivity.points, 5);

        let entries = task.rates.as_ref().unwrap();
        assert_eq!(entries.len(), 6);
        assert_eq!(entries[3].multiplier, 0.01);
        assert!(matches!(entries[1].expression, RateExpression::Constant { .. }));

        let ranges = ParameterRanges::default();
        let params = task.parameters(&ranges).unwrap();
        assert_eq!(params.catalyst_factor(), 2.0);
        assert_eq!(params.power_density(), ranges.power_density.default);
        assert_eq!(task.rate_table().unwrap().len(), 6);
        assert_eq!(task.sensitivity_table(&ranges).unwrap().len(), 5);
        let reactor = task.reactor(&ranges).unwrap();
        assert_eq!(reactor.config.time_max, 500.0);
    }

    #[test]
    fn test_missing_sections_take_defaults() {
        let task = load_task_from_str("PLASMA\n{ \"electron_temperature\": 3.0 }\n").unwrap();
        assert_eq!(task.plasma.electron_temperature, Some(3.0));
        assert_eq!(task.simulation, SimulationConfig::default());
        assert_eq!(task.solver, SolverSettings::default());
        assert!(task.rates.is_none());
        assert_eq!(task.rate_table().unwrap().len(), RateTable::reference().unwrap().len());

        let empty = load_task_from_str("just a comment line\n").unwrap();
        assert_eq!(empty, PlasmaTask::default());
    }

    #[test]
    fn test_empty_section_body() {
        let task = load_task_from_str("SOLVER\n\nSIMULATION\n{ \"time_points\": 7 }").unwrap();
        assert_eq!(task.solver, SolverSettings::default());
        assert_eq!(task.simulation.time_points, 7);
    }

    #[test]
    fn test_invalid_json_reports_location() {
        let document = "PLASMA\n{\n  \"electron_temperature\": 2.0,\n  \"gas_temperature\": ,\n}\n";
        let err = load_task_from_str(document).unwrap_err();
        assert!(err.is_configuration());
        let msg = err.to_string();
        assert!(msg.contains("section PLASMA"), "{}", msg);
        assert!(msg.contains("line 4 in file"), "{}", msg);
    }

    #[test]
    fn test_unknown_field_rejected() {
        let err = load_task_from_str("SIMULATION\n{ \"time_maximum\": 10.0 }").unwrap_err();
        assert!(err.is_configuration());
    }

    #[test]
    fn test_unknown_and_duplicate_sections() {
        let err = load_task_from_str("THERMO\n{}\n").unwrap_err();
        assert!(err.to_string().contains("unknown section 'THERMO'"));
        let err = load_task_from_str("SOLVER\n{}\nSOLVER\n{}\n").unwrap_err();
        assert!(err.to_string().contains("more than once"));
    }

    #[test]
    fn test_file_not_found() {
        let err = load_task_from_file("non_existent_task_file.txt").unwrap_err();
        assert!(err.is_configuration());
        assert!(err.to_string().contains("does not exist"));
    }

    #[test]
    fn test_bad_rate_table_surfaces_on_use() {
        let document = r#"RATES
[ { "reaction": "NH2 + H -> NH3", "type": "Expression", "formula": "Tg*Pressure" } ]
"#;
        let task = load_task_from_str(document).unwrap();
        assert!(task.rate_table().unwrap_err().is_configuration());
        assert!(task.reactor(&ParameterRanges::default()).is_err());
    }
}
