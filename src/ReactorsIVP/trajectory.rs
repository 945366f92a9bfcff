//! Time series of species concentrations produced by the plasma reactor integration.
use crate::Kinetics::plasma_errors::{KineticsError, KineticsResult};
use crate::Kinetics::species::{N_SPECIES, Species};
use nalgebra::{DMatrix, DVector};
use std::fmt::Write;

/// Ordered (time, concentrations) samples, time strictly increasing.
/// Times are in s, concentrations in cm^-3 in species order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Trajectory {
    times: Vec<f64>,
    states: Vec<DVector<f64>>,
}

impl Trajectory {
    pub fn new(times: Vec<f64>, states: Vec<DVector<f64>>) -> KineticsResult<Self> {
        if times.len() != states.len() {
            return Err(KineticsError::domain(format!(
                "{} time samples but {} states",
                times.len(),
                states.len()
            )));
        }
        if let Some(w) = times.windows(2).find(|w| !(w[1] > w[0])) {
            return Err(KineticsError::domain(format!(
                "trajectory times must be strictly increasing, got {} then {}",
                w[0], w[1]
            )));
        }
        if let Some(state) = states.iter().find(|s| s.len() != N_SPECIES) {
            return Err(KineticsError::domain(format!(
                "trajectory state must have {} components, got {}",
                N_SPECIES,
                state.len()
            )));
        }
        Ok(Self { times, states })
    }

    /// solver output is already ordered
    pub(crate) fn from_solver(times: Vec<f64>, states: Vec<DVector<f64>>) -> Self {
        Self { times, states }
    }

    pub fn len(&self) -> usize {
        self.times.len()
    }

    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }

    pub fn times(&self) -> &[f64] {
        &self.times
    }

    pub fn states(&self) -> &[DVector<f64>] {
        &self.states
    }

    pub fn sample(&self, i: usize) -> Option<(f64, &DVector<f64>)> {
        Some((*self.times.get(i)?, self.states.get(i)?))
    }

    pub fn last(&self) -> Option<(f64, &DVector<f64>)> {
        self.sample(self.len().checked_sub(1)?)
    }

    pub fn species_series(&self, species: Species) -> Vec<f64> {
        self.states.iter().map(|s| s[species.index()]).collect()
    }

    /// samples x species
    pub fn to_matrix(&self) -> DMatrix<f64> {
        DMatrix::from_fn(self.len(), N_SPECIES, |i, j| self.states[i][j])
    }

    /// CSV with a `Time (ms)` column followed by one column per species
    pub fn to_csv_string(&self) -> String {
        let mut csv = String::from("Time (ms)");
        for name in Species::names() {
            csv.push(',');
            csv.push_str(&name);
        }
        csv.push('\n');
        for (t, state) in self.times.iter().zip(self.states.iter()) {
            // writing into a String never fails
            let _ = write!(csv, "{}", t * 1e3);
            for c in state.iter() {
                let _ = write!(csv, ",{:e}", c);
            }
            csv.push('\n');
        }
        csv
    }

    /// prints at most `max_rows` evenly picked samples, always including the last one
    pub fn pretty_print(&self, max_rows: usize) {
        use prettytable::{Cell, Row, Table};
        let mut table = Table::new();
        let mut header = vec![Cell::new("t, s")];
        header.extend(Species::ALL.iter().map(|sp| Cell::new(sp.formula())));
        table.add_row(Row::new(header));
        let n = self.len();
        if n == 0 {
            table.printstd();
            return;
        }
        let stride = n.div_ceil(max_rows.max(1)).max(1);
        let mut rows: Vec<usize> = (0..n).step_by(stride).collect();
        if rows.last() != Some(&(n - 1)) {
            rows.push(n - 1);
        }
        for i in rows {
            let mut cells = vec![Cell::new(&format!("{:.3e}", self.times[i]))];
            cells.extend(self.states[i].iter().map(|c| Cell::new(&format!("{:.3e}", c))));
            table.add_row(Row::new(cells));
        }
        table.printstd();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Kinetics::species::zero_state;

    fn state(v: f64) -> DVector<f64> {
        DVector::from_element(N_SPECIES, v)
    }

    #[test]
    fn test_new_validates() {
        assert!(Trajectory::new(vec![0.0, 1.0], vec![state(1.0), state(2.0)]).is_ok());
        assert!(Trajectory::new(vec![0.0, 0.0], vec![state(1.0), state(2.0)])
            .unwrap_err()
            .is_domain());
        assert!(Trajectory::new(vec![0.0], vec![]).unwrap_err().is_domain());
        assert!(Trajectory::new(vec![0.0], vec![DVector::zeros(2)])
            .unwrap_err()
            .is_domain());
    }

    #[test]
    fn test_accessors() {
        let mut s1 = zero_state();
        s1[Species::NH3.index()] = 5.0;
        let traj = Trajectory::new(vec![0.0, 0.5], vec![zero_state(), s1]).unwrap();
        assert_eq!(traj.len(), 2);
        assert_eq!(traj.species_series(Species::NH3), vec![0.0, 5.0]);
        let (t, last) = traj.last().unwrap();
        assert_eq!(t, 0.5);
        assert_eq!(last[Species::NH3.index()], 5.0);
        let m = traj.to_matrix();
        assert_eq!(m.shape(), (2, N_SPECIES));
        assert_eq!(m[(1, Species::NH3.index())], 5.0);
        assert!(Trajectory::default().last().is_none());
    }

    #[test]
    fn test_csv() {
        let traj = Trajectory::new(vec![0.0, 0.002], vec![state(0.0), state(1.5e10)]).unwrap();
        let csv = traj.to_csv_string();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "Time (ms),N,H,H2,NH,NH2,NH3,N2");
        assert!(lines[2].starts_with("2,1.5e10"));
        assert_eq!(lines[2].split(',').count(), N_SPECIES + 1);
    }
}
