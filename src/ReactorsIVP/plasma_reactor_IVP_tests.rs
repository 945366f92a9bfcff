#[cfg(test)]
mod tests {
    use super::super::plasma_reactor_IVP::*;
    use crate::Kinetics::plasma_errors::{IntegrationFailure, KineticsError};
    use crate::Kinetics::plasma_parameters::PlasmaParameters;
    use crate::Kinetics::rate_table::RateTable;
    use crate::Kinetics::species::{N_SPECIES, Species, atom_inventory, zero_state};
    use crate::ReactorsIVP::stiff_solver::{CancellationToken, RunControl, SolverSettings, StiffMethod};
    use crate::ReactorsIVP::trajectory::Trajectory;
    use approx::assert_relative_eq;
    use std::time::{Duration, Instant};

    fn reference_params() -> PlasmaParameters {
        PlasmaParameters::new(2.0, 300.0, 2.5e19, 0.33, 5.0).unwrap()
    }

    fn reference_reactor() -> PlasmaReactorIVP {
        PlasmaReactorIVP::new(reference_params(), RateTable::reference().unwrap())
    }

    fn integration_failure(err: KineticsError) -> (IntegrationFailure, Trajectory, f64) {
        match err {
            KineticsError::Integration(e) => {
                let e = *e;
                (e.reason, e.partial, e.t_reached)
            }
            other => panic!("expected an integration error, got {}", other),
        }
    }

    #[test]
    fn test_linear_sample_times() {
        let times = SimulationConfig::new(1000.0, 100).sample_times().unwrap();
        assert_eq!(times.len(), 100);
        assert_eq!(times[0], 0.0);
        assert_eq!(times[99], 1000.0);
        assert_relative_eq!(times[1], 1000.0 / 99.0, max_relative = 1e-12);
        assert!(times.windows(2).all(|w| w[1] > w[0]));
    }

    #[test]
    fn test_logarithmic_sample_times() {
        let config = SimulationConfig {
            grid: TimeGrid::Logarithmic,
            ..SimulationConfig::new(1000.0, 50)
        };
        let times = config.sample_times().unwrap();
        assert_eq!(times.len(), 50);
        assert_eq!(times[0], 0.0);
        assert_relative_eq!(times[1], 1000.0 * LOG_GRID_START, max_relative = 1e-9);
        assert_eq!(times[49], 1000.0);
        assert!(times.windows(2).all(|w| w[1] > w[0]));
        // two-point log grid degenerates to [0, TimeMax]
        let two = SimulationConfig {
            grid: TimeGrid::Logarithmic,
            ..SimulationConfig::new(5.0, 2)
        };
        assert_eq!(two.sample_times().unwrap(), vec![0.0, 5.0]);
    }

    #[test]
    fn test_invalid_simulation_config() {
        assert!(SimulationConfig::new(0.0, 100).sample_times().unwrap_err().is_domain());
        assert!(SimulationConfig::new(-1.0, 100).sample_times().unwrap_err().is_domain());
        assert!(SimulationConfig::new(10.0, 1).sample_times().unwrap_err().is_domain());
        let mut reactor = reference_reactor().with_config(SimulationConfig::new(f64::NAN, 10));
        assert!(reactor.solve().unwrap_err().is_domain());
    }

    #[test]
    fn test_invalid_solver_settings() {
        let settings = SolverSettings {
            rtol: 0.0,
            ..SolverSettings::default()
        };
        let mut reactor = reference_reactor().with_solver_settings(settings);
        assert!(reactor.solve().unwrap_err().is_configuration());
    }

    #[test]
    fn test_zero_electron_temperature_rejected() {
        assert!(PlasmaParameters::new(0.0, 300.0, 2.5e19, 0.33, 5.0).unwrap_err().is_domain());
    }

    #[test]
    fn test_initial_state_validation() {
        let mut bad = zero_state();
        bad[Species::H.index()] = -5.0;
        assert!(reference_reactor().with_initial_state(bad).is_err());
    }

    #[test]
    fn test_reference_scenario_reaches_steady_state() {
        let mut reactor = reference_reactor().with_config(SimulationConfig::new(1000.0, 100));
        let trajectory = reactor.solve().unwrap();
        assert_eq!(trajectory.len(), 100);
        assert_eq!(trajectory.times()[99], 1000.0);

        let nh3 = trajectory.species_series(Species::NH3);
        assert!(nh3.iter().all(|c| *c >= 0.0));
        assert!(nh3[99] > 0.0);
        // late-time NH3 does not fall back
        let late = &nh3[90..];
        for w in late.windows(2) {
            assert!(w[1] >= w[0] * (1.0 - 1e-6), "NH3 dropped from {} to {}", w[0], w[1]);
        }

        let settings = SolverSettings::default();
        let last = &trajectory.states()[99];
        let tenth_from_last = &trajectory.states()[90];
        for i in 0..N_SPECIES {
            let change = (last[i] - tenth_from_last[i]).abs();
            assert!(
                change <= 1e-3 * last[i].abs() + settings.atol,
                "{} still changing: {} -> {}",
                Species::ALL[i],
                tenth_from_last[i],
                last[i]
            );
        }
        let stats = reactor.stats.unwrap();
        assert_eq!(stats.intervals, 99);
        assert!(stats.steps >= stats.intervals);
        assert!(ammonia_yield(&trajectory).unwrap() > 0.0);
    }

    #[test]
    fn test_atoms_conserved_along_trajectory() {
        let config = SimulationConfig {
            grid: TimeGrid::Logarithmic,
            ..SimulationConfig::new(1000.0, 40)
        };
        let mut reactor = reference_reactor().with_config(config);
        let trajectory = reactor.solve().unwrap();
        let (n0, h0) = atom_inventory(&trajectory.states()[0]);
        for state in trajectory.states() {
            assert!(state.iter().all(|c| *c >= 0.0));
            let (n, h) = atom_inventory(state);
            assert_relative_eq!(n, n0, max_relative = 1e-6);
            assert_relative_eq!(h, h0, max_relative = 1e-6);
        }
    }

    #[test]
    fn test_deterministic() {
        let run = || {
            let mut reactor =
                reference_reactor().with_config(SimulationConfig::new(1000.0, 100));
            reactor.solve().unwrap()
        };
        let first = run();
        let second = run();
        assert_eq!(first, second);
        assert_eq!(first.to_csv_string(), second.to_csv_string());
    }

    #[test]
    fn test_simulate_matches_reactor() {
        let params = reference_params();
        let table = RateTable::reference().unwrap();
        let y0 = params.feed_composition();
        let direct = simulate(&y0, 50.0, 11, &params, &table).unwrap();
        let mut reactor = PlasmaReactorIVP::new(params, table)
            .with_config(SimulationConfig::new(50.0, 11));
        assert_eq!(direct, reactor.solve().unwrap());
    }

    #[test]
    fn test_zero_state_stays_zero() {
        let params = reference_params();
        let trajectory =
            simulate(&zero_state(), 10.0, 5, &params, &RateTable::reference().unwrap()).unwrap();
        assert_eq!(trajectory.len(), 5);
        assert!(trajectory.states().iter().all(|s| s.iter().all(|c| *c == 0.0)));
        assert!(ammonia_yield(&trajectory).is_none());
    }

    #[test]
    fn test_radical_seed() {
        let config = SimulationConfig {
            radical_seed: 1e10,
            ..SimulationConfig::new(1.0, 3)
        };
        let reactor = reference_reactor().with_config(config);
        let y0 = reactor.initial_concentrations().unwrap();
        assert_eq!(y0[Species::N.index()], 1e10);
        assert_eq!(y0[Species::H.index()], 1e10);
    }

    #[test]
    fn test_cancelled_before_start() {
        let token = CancellationToken::new();
        token.cancel();
        let mut reactor = reference_reactor().with_control(RunControl::default().with_token(token));
        let (reason, partial, t_reached) = integration_failure(reactor.solve().unwrap_err());
        assert_eq!(reason, IntegrationFailure::Cancelled);
        assert_eq!(partial.len(), 1);
        assert_eq!(t_reached, 0.0);
    }

    #[test]
    fn test_deadline_in_the_past() {
        let control = RunControl::default().with_deadline(Instant::now() - Duration::from_millis(1));
        let mut reactor = reference_reactor().with_control(control);
        let (reason, _, _) = integration_failure(reactor.solve().unwrap_err());
        assert_eq!(reason, IntegrationFailure::DeadlineExceeded);
    }

    #[test]
    fn test_step_budget_returns_partial_trajectory() {
        // the budget is checked between sample intervals, so one step stops the run
        // after the first interval
        let settings = SolverSettings {
            max_steps: 1,
            ..SolverSettings::default()
        };
        let mut reactor = reference_reactor()
            .with_config(SimulationConfig::new(1000.0, 100))
            .with_solver_settings(settings);
        let err = reactor.solve().unwrap_err();
        assert!(err.partial_trajectory().is_some());
        let (reason, partial, t_reached) = integration_failure(err);
        assert_eq!(reason, IntegrationFailure::StepBudgetExceeded { max_steps: 1 });
        assert_eq!(partial.len(), 2);
        assert_relative_eq!(t_reached, 1000.0 / 99.0, max_relative = 1e-12);
        assert_eq!(partial.times()[1], t_reached);
        assert_eq!(partial.states()[0], reference_params().feed_composition());
    }

    #[test]
    fn test_generous_timeout_completes() {
        let control = RunControl::default().with_timeout(Duration::from_secs(600));
        let mut reactor = reference_reactor()
            .with_config(SimulationConfig::new(1.0, 5))
            .with_control(control);
        assert_eq!(reactor.solve().unwrap().len(), 5);
    }

    #[test]
    fn test_radau_agrees_with_bdf() {
        let run = |method: StiffMethod| {
            let settings = SolverSettings {
                method,
                rtol: 1e-8,
                ..SolverSettings::default()
            };
            let mut reactor = reference_reactor()
                .with_config(SimulationConfig::new(1.0, 5))
                .with_solver_settings(settings);
            reactor.solve().unwrap()
        };
        let bdf = run(StiffMethod::Bdf);
        let radau = run(StiffMethod::Radau7);
        assert_eq!(radau.len(), 5);
        let (a, b) = (bdf.last().unwrap().1, radau.last().unwrap().1);
        for sp in [Species::N2, Species::H2] {
            assert_relative_eq!(a[sp.index()], b[sp.index()], max_relative = 1e-4);
        }
        assert!(b.iter().all(|c| *c >= 0.0));
    }
}
