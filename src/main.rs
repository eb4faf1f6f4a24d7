use cstr_sim::Utils::logger::init_logger;
use cstr_sim::cli::cli_cstr::run_task_file;
use cstr_sim::cli::cli_main::run_interactive_menu;
use cstr_sim::settings::AppSettings;
use std::env;
use std::path::Path;
use std::process::ExitCode;

fn main() -> ExitCode {
    let settings = AppSettings::new();
    if let Err(e) = init_logger(settings.level_filter(), settings.log_file.as_deref()) {
        eprintln!("failed to initialize logger: {}", e);
    }
    match env::args().nth(1) {
        Some(path) => match run_task_file(Path::new(&path)) {
            Ok(()) => ExitCode::SUCCESS,
            Err(_) => ExitCode::FAILURE,
        },
        None => {
            run_interactive_menu(&settings);
            ExitCode::SUCCESS
        }
    }
}
