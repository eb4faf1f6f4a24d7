use super::cli_cstr::cstr_menu;
use crate::Examples::cstr_examples::cstr_examples;
use crate::settings::{AppSettings, CONFIG_FILE};
use std::io::{self, Write};
use std::path::Path;

pub fn run_interactive_menu(settings: &AppSettings) {
    loop {
        show_main_menu();
        let choice = get_user_input();

        match choice.trim() {
            "1" => cstr_menu(settings),
            "2" => examples_menu(),
            "3" => settings_menu(settings),
            "0" => {
                println!("Goodbye!");
                break;
            }
            _ => println!("Invalid choice. Please try again."),
        }
    }
}
/* colors
Blue (\x1b[34m) - Welcome header text

Yellow (\x1b[33m) - Menu options

Cyan (\x1b[36m) - prompts

Reset (\x1b[0m) - Returns to normal color after each colored section
*/
fn show_main_menu() {
    println!(
        "\x1b[34m\n Welcome to cstr-sim: dynamic simulation of a jacketed CSTR\n
    with variable volume and an exothermic n-th order reaction \n \x1b[0m"
    );
    println!("\x1b[33m1. CSTR simulations\x1b[0m");
    println!("\x1b[33m2. Examples\x1b[0m");
    println!("\x1b[33m3. Settings\x1b[0m");
    println!("\x1b[33m0. Exit\x1b[0m");
    prompt("Enter your choice: ");
}

fn examples_menu() {
    loop {
        println!("\n=== Examples ===");
        println!("\x1b[33m1. Reference scenario\x1b[0m");
        println!("\x1b[33m2. Weak cooling and temperature alarm\x1b[0m");
        println!("\x1b[33m3. Parallel sweep of feed and coolant temperatures\x1b[0m");
        println!("\x1b[33m4. Volume collapse caught by the validator\x1b[0m");
        println!("\x1b[33m0. Back to main menu\x1b[0m");
        prompt("Enter your choice: ");

        let choice = get_user_input();
        match choice.trim() {
            "1" => cstr_examples(0),
            "2" => cstr_examples(1),
            "3" => cstr_examples(2),
            "4" => cstr_examples(3),
            "0" => break,
            _ => println!("Invalid choice. Please try again."),
        }
    }
}

fn settings_menu(settings: &AppSettings) {
    println!("\n=== Settings ({}) ===", CONFIG_FILE);
    println!("log level:   {}", settings.log_level);
    println!(
        "log file:    {}",
        settings.log_file.as_deref().unwrap_or("none")
    );
    println!("task prefix: {}", settings.task_prefix);
    prompt("Write these settings to the config file? (y/n): ");
    let choice = get_user_input();
    if is_yes(&choice) {
        match settings.save(Path::new(CONFIG_FILE)) {
            Ok(()) => println!("Settings saved to {}", CONFIG_FILE),
            Err(e) => println!("Failed to save settings: {}", e),
        }
    }
}

pub(crate) fn prompt(text: &str) {
    print!("\x1b[36m{}\x1b[0m", text);
    let _ = io::stdout().flush();
}

pub(crate) fn get_user_input() -> String {
    let mut input = String::new();
    if io::stdin().read_line(&mut input).is_err() {
        return String::new();
    }
    input
}

pub(crate) fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_lowercase().as_str(), "y" | "yes")
}
