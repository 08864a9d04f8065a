use std::fmt;

use colored::Colorize;

/// Print an informational message.
pub fn info(message: impl fmt::Display) {
    println!("{} {}", "INFO:".cyan(), message);
}

/// Print a success message.
pub fn success(message: impl fmt::Display) {
    println!("{} {}", "SUCCESS:".green(), message);
}

/// Print a warning message.
pub fn warning(message: impl fmt::Display) {
    println!("{} {}", "WARNING:".yellow(), message);
}

/// Print an error message to stderr.
pub fn error(message: impl fmt::Display) {
    eprintln!("{} {}", "ERROR:".red(), message);
}

/// Print a section heading.
pub fn section(title: impl fmt::Display) {
    println!("{}", format!("=== {} ===", title).bold());
}
