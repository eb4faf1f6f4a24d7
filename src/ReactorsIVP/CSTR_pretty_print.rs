//! # Pretty Printing Module for the CSTR
//!
//! Formatted tables of parameters, current state, diagnostics and simulation history.
use super::CSTR::ReactorModel;
use super::CSTR_simulation::CSTRSimulation;
use prettytable::{Table, row};

impl ReactorModel {
    /// Table of all 19 parameters with units
    pub fn pretty_print_parameters(&self) {
        let mut table = Table::new();
        table.add_row(row!["Parameter", "Value", "Units"]);
        for (name, value, units) in self.get_parameters().as_table_rows() {
            table.add_row(row![name, format!("{:.6e}", value), units]);
        }
        println!("\nReactor Parameters:");
        table.printstd();
    }

    /// Current state and derived diagnostics
    pub fn pretty_print_state(&self) {
        let state = self.get_state();
        let mut table = Table::new();
        table.add_row(row!["Quantity", "Value", "Units"]);
        table.add_row(row!["Time", format!("{:.2}", state.time), "s"]);
        table.add_row(row!["Volume (V)", format!("{:.6}", state.volume), "m3"]);
        table.add_row(row![
            "Concentration (CA)",
            format!("{:.6}", state.concentration),
            "mol/m3"
        ]);
        table.add_row(row!["Temperature (T)", format!("{:.3}", state.temperature), "K"]);
        table.add_row(row![
            "Jacket temperature (TJ)",
            format!("{:.3}", state.jacket_temperature),
            "K"
        ]);
        table.add_row(row!["Conversion", format!("{:.3}", self.conversion()), "%"]);
        table.add_row(row![
            "Residence time",
            format!("{:.3}", self.residence_time()),
            "s"
        ]);
        table.add_row(row![
            "Heat removal rate",
            format!("{:.4}", self.heat_removal_rate()),
            "kW"
        ]);
        table.add_row(row![
            "Reaction rate",
            format!("{:.4e}", self.reaction_rate()),
            "mol/m3/s"
        ]);
        table.add_row(row!["Outlet flow (F)", format!("{:.5}", self.outlet_flow()), "m3/s"]);
        println!("\nReactor State:");
        table.printstd();
    }
}

impl CSTRSimulation {
    /// Prints every `every`-th history record, always including the last one.
    pub fn pretty_print_history(&self, every: usize) {
        let every = every.max(1);
        let history = self.history();
        let mut table = Table::new();
        table.add_row(row![
            "t, s", "V, m3", "CA, mol/m3", "T, K", "TJ, K", "X, %", "Q, kW"
        ]);
        for (i, r) in history.iter().enumerate() {
            if i % every != 0 && i + 1 != history.len() {
                continue;
            }
            table.add_row(row![
                format!("{:.1}", r.time),
                format!("{:.5}", r.volume),
                format!("{:.5}", r.concentration),
                format!("{:.2}", r.temperature),
                format!("{:.2}", r.jacket_temperature),
                format!("{:.2}", r.conversion),
                format!("{:.3}", r.heat_removal_rate)
            ]);
        }
        println!("\nSimulation History:");
        table.printstd();
    }

    /// Run summary: final state, peak temperature and alarms
    pub fn pretty_print_summary(&self) {
        println!("\n=== CSTR SIMULATION SUMMARY ===");
        println!(
            "Steps: {} of {} (dt = {} s)",
            self.steps_done(),
            self.total_steps(),
            self.model.dt()
        );
        println!("Final state: {}", self.state());
        if let Some(peak) = self.peak_temperature() {
            println!("Peak temperature: {:.3} K at t = {:.2} s", peak.temperature, peak.time);
        }
        if self.alarms().is_empty() {
            println!("No alarms");
        } else {
            let mut table = Table::new();
            table.add_row(row!["t, s", "Alarm"]);
            for alarm in self.alarms() {
                table.add_row(row![format!("{:.2}", alarm.time), alarm.message]);
            }
            println!("Alarms ({}):", self.alarms().len());
            table.printstd();
        }
        println!("=== END SUMMARY ===\n");
    }
}
