//! Terminal output helpers

use owo_colors::OwoColorize;

pub fn log(message: &str) {
    println!("{}", message);
}

pub fn warn(message: &str) {
    eprintln!("{} {}", "warning:".yellow().bold(), message);
}

pub fn error(message: &str) {
    eprintln!("{} {}", "error:".red().bold(), message);
}
