use crate::ReactorsIVP::CSTR::{ParametersUpdate, ReactorModel, ReactorParameters, ReactorState};
use crate::ReactorsIVP::CSTR_simulation::{
    CSTRSimulation, ScheduledUpdate, SimulationSettings, SimulationSpeed,
};
use crate::ReactorsIVP::reactor_error::ReactorError;
use crate::ReactorsIVP::task_parser_CSTR::CSTRTask;
use crate::ReactorsIVP::validation::PhysicalLimits;
use prettytable::{Table, row};
use std::sync::Arc;
use std::thread;

fn reference_parameters() -> ReactorParameters {
    CSTRTask::template().parameters
}

fn reference_state() -> ReactorState {
    CSTRTask::template().initial_state
}

pub fn cstr_examples(task: usize) {
    match task {
        0 => {
            // REFERENCE SCENARIO: single stepping and diagnostics
            let mut reactor = ReactorModel::new(reference_state(), reference_parameters());
            reactor.pretty_print_parameters();
            reactor.pretty_print_state();
            let after_one_step = reactor.step();
            println!("after one step: {}", after_one_step);
            for _ in 0..99 {
                reactor.step();
            }
            reactor.pretty_print_state();
            // change of the coolant flow, the state is kept
            reactor.update_parameters(&ParametersUpdate {
                FJ: Some(0.5),
                ..Default::default()
            });
            for _ in 0..100 {
                reactor.step();
            }
            println!("20 s, FJ = 0.5 m3/s");
            reactor.pretty_print_state();
        }
        1 => {
            // WEAK COOLING: temperature alarm while the run continues
            let mut params = reference_parameters();
            params.U = 10.0;
            params.FJ = 0.01;
            params.lambda = -5.0e4;
            let mut reactor = ReactorModel::new(reference_state(), params);
            reactor.set_validator(Some(Arc::new(
                PhysicalLimits::default().with_max_temperature(450.0),
            )));
            let settings = SimulationSettings {
                t_end: 50.0,
                speed: SimulationSpeed::X10,
                history_len: None,
                stop_on_alarm: false,
            };
            let mut simulation = CSTRSimulation::new(reactor, settings);
            // cooling is restored at t = 25 s
            simulation.set_schedule(vec![ScheduledUpdate {
                at: 25.0,
                update: ParametersUpdate {
                    U: Some(500.0),
                    FJ: Some(1.0),
                    ..Default::default()
                },
            }]);
            match simulation.run() {
                Ok(state) => println!("finished: {}", state),
                Err(e) => println!("halted: {}", e),
            }
            simulation.pretty_print_history(5);
            simulation.pretty_print_summary();
            simulation.plot_in_terminal();
        }
        2 => {
            // PARAMETER SWEEP: independent reactors on separate threads
            let coolant_temperatures = [280.0, 290.0, 300.0, 310.0, 320.0];
            let feed_temperatures = [330.0, 350.0];
            let mut cases = Vec::new();
            for &T0 in &feed_temperatures {
                for &TJ0 in &coolant_temperatures {
                    cases.push((T0, TJ0));
                }
            }
            let results: Vec<(f64, f64, ReactorState, f64)> = thread::scope(|s| {
                let handles: Vec<_> = cases
                    .iter()
                    .map(|&(T0, TJ0)| {
                        s.spawn(move || {
                            let mut params = reference_parameters();
                            params.T0 = T0;
                            params.TJ0 = TJ0;
                            let mut reactor = ReactorModel::new(reference_state(), params);
                            for _ in 0..300 {
                                reactor.step();
                            }
                            (T0, TJ0, reactor.get_state(), reactor.conversion())
                        })
                    })
                    .collect();
                handles
                    .into_iter()
                    .filter_map(|h| h.join().ok())
                    .collect()
            });
            let mut table = Table::new();
            table.add_row(row!["T0, K", "TJ0, K", "T(30 s), K", "TJ(30 s), K", "X, %"]);
            for (T0, TJ0, state, conversion) in results {
                table.add_row(row![
                    T0,
                    TJ0,
                    format!("{:.2}", state.temperature),
                    format!("{:.2}", state.jacket_temperature),
                    format!("{:.3}", conversion)
                ]);
            }
            table.printstd();
        }
        3 => {
            // VOLUME COLLAPSE: no feed and the outlet keeps pumping below the bottom of the tank
            let mut params = reference_parameters();
            params.F0 = 0.0;
            params.KV = 0.5;
            params.Vmin = -0.2;
            let mut reactor = ReactorModel::new(reference_state(), params);
            reactor.set_validator(Some(Arc::new(PhysicalLimits::default())));
            let mut result: Result<ReactorState, ReactorError> = Ok(reactor.get_state());
            for _ in 0..1000 {
                result = reactor.try_step();
                if result.is_err() {
                    break;
                }
            }
            match result {
                Err(e) => {
                    println!("rejected step: {}", e);
                    println!("last accepted state: {}", reactor.get_state());
                }
                Ok(state) => println!("no alarm, final state: {}", state),
            }
            // the same configuration stepped without validation
            let mut unchecked = ReactorModel::new(reference_state(), params);
            for _ in 0..50 {
                unchecked.step();
            }
            println!("unchecked state after 5 s: {}", unchecked.get_state());
        }
        _ => println!("no such example: {}", task),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_examples_without_plots_run() {
        for task in [0, 2, 3, 7] {
            cstr_examples(task);
        }
    }
}
