use super::cli_main::{get_user_input, is_yes, prompt};
use super::cstr_help::{CSTR_HELP, INTERACTIVE_HELP};
use crate::ReactorsIVP::CSTR::ParametersUpdate;
use crate::ReactorsIVP::CSTR_simulation::{CSTRSimulation, SimulationSpeed};
use crate::ReactorsIVP::reactor_error::ReactorError;
use crate::ReactorsIVP::task_parser_CSTR::{CSTRTask, TEMPLATE_FILE, create_template};
use crate::settings::AppSettings;
use log::{error, info};
use std::path::{Path, PathBuf};
use std::{env, fs};

pub fn cstr_menu(settings: &AppSettings) {
    loop {
        println!("\n=== CSTR Simulations ===");
        println!("\x1b[33m1. Solve from file\x1b[0m");
        println!("\x1b[33m2. Auto-discover task files\x1b[0m");
        println!("\x1b[33m3. Generate template\x1b[0m");
        println!("\x1b[33m4. Interactive run\x1b[0m");
        println!("\x1b[33m5. Read help\x1b[0m");
        println!("\x1b[33m0. Back to main menu\x1b[0m");
        prompt("Enter your choice: ");

        let choice = get_user_input();
        match choice.trim() {
            "1" => solve_from_file(),
            "2" => auto_solve_tasks(&settings.task_prefix),
            "3" => match create_template() {
                Ok(()) => println!("Template {} generated successfully!", TEMPLATE_FILE),
                Err(e) => println!("Failed to write template: {}", e),
            },
            "4" => interactive_dialog(),
            "5" => show_help(),
            "0" => break,
            _ => println!("Invalid choice. Please try again."),
        }
    }
}

fn solve_from_file() {
    prompt("Enter file path: ");
    let file_path = get_user_input();
    let path = PathBuf::from(file_path.trim());

    if path.exists() {
        solve_from_file_dialog(&path);
    } else {
        println!("File not found: {}", file_path.trim());
    }
}

/// Task files in `dir` whose names start with `prefix` and end with `.json`, sorted by name
pub fn discover_task_files(dir: &Path, prefix: &str) -> Vec<PathBuf> {
    let mut found = Vec::new();
    if let Ok(entries) = fs::read_dir(dir) {
        for entry in entries.flatten() {
            let path = entry.path();
            let matches = path
                .file_name()
                .map(|name| name.to_string_lossy())
                .map(|name| name.starts_with(prefix) && name.ends_with(".json"))
                .unwrap_or(false);
            if matches && path.is_file() {
                found.push(path);
            }
        }
    }
    found.sort();
    found
}

fn auto_solve_tasks(prefix: &str) {
    let current_dir = match env::current_dir() {
        Ok(dir) => dir,
        Err(e) => {
            println!("Failed to get current directory: {}", e);
            return;
        }
    };
    println!("Searching for task files in: {:?}", current_dir);
    let files = discover_task_files(&current_dir, prefix);
    if files.is_empty() {
        println!(
            "No files starting with '{}' found in current directory.",
            prefix
        );
    }
    for path in files {
        println!("Found task file: {:?}", path);
        solve_from_file_dialog(&path);
    }
}

pub fn solve_from_file_dialog(path: &Path) {
    match CSTRTask::from_file(path) {
        Ok(task) => {
            println!("Task parsed successfully");
            if let Some(name) = &task.problem_name {
                println!("problem: {}", name);
            }
            task.build_model().pretty_print_parameters();
            prompt("Start calculation? (y/n): ");
            let choice = get_user_input();
            if is_yes(&choice) {
                if let Err(e) = task.solve() {
                    println!("Calculation stopped: {}", e);
                }
            } else {
                println!("Calculation cancelled. Returning to menu.");
            }
        }
        Err(e) => println!("Error parsing task: {}", e),
    }
}

/// Non-interactive run used when a task file is given on the command line.
pub fn run_task_file(path: &Path) -> Result<(), ReactorError> {
    info!("running task file {}", path.display());
    let task = CSTRTask::from_file(path)?;
    match task.solve() {
        Ok(_) => Ok(()),
        Err(e) => {
            error!("{}", e);
            Err(e)
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum InteractiveCommand {
    Tick,
    RunToEnd,
    Speed(SimulationSpeed),
    Update(ParametersUpdate),
    ShowState,
    ShowParameters,
    History,
    Help,
    Quit,
}

pub fn parse_command(line: &str) -> Result<InteractiveCommand, String> {
    let words: Vec<&str> = line.split_whitespace().collect();
    match words.as_slice() {
        [] | ["t"] => Ok(InteractiveCommand::Tick),
        ["r"] => Ok(InteractiveCommand::RunToEnd),
        ["s", speed] => {
            let value: u32 = speed
                .parse()
                .map_err(|_| format!("not a number: {}", speed))?;
            SimulationSpeed::try_from(value)
                .map(InteractiveCommand::Speed)
                .map_err(|e| e.to_string())
        }
        ["p", rest @ ..] if !rest.is_empty() && rest.len() % 2 == 0 => {
            let mut update = ParametersUpdate::default();
            for pair in rest.chunks(2) {
                let value: f64 = pair[1]
                    .parse()
                    .map_err(|_| format!("not a number: {}", pair[1]))?;
                update.set(pair[0], value).map_err(|e| e.to_string())?;
            }
            Ok(InteractiveCommand::Update(update))
        }
        ["v"] => Ok(InteractiveCommand::ShowState),
        ["params"] => Ok(InteractiveCommand::ShowParameters),
        ["h"] => Ok(InteractiveCommand::History),
        ["?"] | ["help"] => Ok(InteractiveCommand::Help),
        ["q"] => Ok(InteractiveCommand::Quit),
        _ => Err(format!("unknown command: {}", line.trim())),
    }
}

fn interactive_dialog() {
    prompt("Task file (empty - reference scenario): ");
    let answer = get_user_input();
    let task = if answer.trim().is_empty() {
        CSTRTask::template()
    } else {
        match CSTRTask::from_file(Path::new(answer.trim())) {
            Ok(task) => task,
            Err(e) => {
                println!("Error parsing task: {}", e);
                return;
            }
        }
    };
    match task.build_simulation() {
        Ok(simulation) => interactive_run(simulation),
        Err(e) => println!("Invalid task: {}", e),
    }
}

fn interactive_run(mut simulation: CSTRSimulation) {
    println!("{}", INTERACTIVE_HELP);
    loop {
        let state = simulation.state();
        prompt(&format!(
            "[t = {:.1} s, x{}] > ",
            state.time,
            u32::from(simulation.settings.speed)
        ));
        let line = get_user_input();
        match parse_command(&line) {
            Ok(InteractiveCommand::Tick) => {
                if simulation.is_finished() {
                    println!("t_end reached");
                } else {
                    println!("{}", simulation.tick());
                }
            }
            Ok(InteractiveCommand::RunToEnd) => match simulation.run() {
                Ok(state) => println!("{}", state),
                Err(e) => println!("Simulation halted: {}", e),
            },
            Ok(InteractiveCommand::Speed(speed)) => simulation.set_speed(speed),
            Ok(InteractiveCommand::Update(update)) => {
                simulation.update_parameters(&update);
                println!("parameters updated");
            }
            Ok(InteractiveCommand::ShowState) => simulation.model.pretty_print_state(),
            Ok(InteractiveCommand::ShowParameters) => simulation.model.pretty_print_parameters(),
            Ok(InteractiveCommand::History) => simulation.pretty_print_history(10),
            Ok(InteractiveCommand::Help) => println!("{}", INTERACTIVE_HELP),
            Ok(InteractiveCommand::Quit) => {
                simulation.pretty_print_summary();
                break;
            }
            Err(message) => println!("{}", message),
        }
    }
}

fn show_help() {
    println!("\n=== CSTR Help ===");
    println!("{}", CSTR_HELP);
    println!("\nPress Enter to return to menu...");
    let _ = get_user_input();
}
