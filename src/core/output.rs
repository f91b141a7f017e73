//! Output formatting helpers shared by every subcommand.
//!
//! Errors are red, success marks green, warnings yellow, and secondary detail
//! (hashes, dates, paths) bright black. Each message is surrounded by a blank
//! line so consecutive command outputs stay readable.

use colored::*;

/// Prints `✕ Error: <message>` in red
pub fn print_error(message: &str) {
    println!("\n{} {}\n", "✕ Error:".red(), message.white());
}

/// Prints an error followed by a hint on how to proceed
pub fn print_error_with_hint(message: &str, hint: &str) {
    println!("\n{} {}", "✕ Error:".red(), message.white());
    println!("  {}\n", hint.bright_black());
}

/// Prints `✓ <message>` with a green checkmark
pub fn print_success(message: &str) {
    println!("\n{} {}", "✓".green(), message.white());
}

pub fn print_warning(message: &str) {
    println!("\n{} {}", "!".yellow(), message.yellow());
}

pub fn print_info(message: &str) {
    println!("\n{}\n", message.white());
}

pub fn print_section_header(header: &str) {
    println!("\n{}:\n", header.white());
}

/// Prints an indented `label: value` line with a muted label
pub fn print_field(label: &str, value: &str) {
    println!("  {} {}", format!("{label}:").bright_black(), value.white());
}

/// A short hash in the color used for commit ids
pub fn format_hash(short_hash: &str) -> ColoredString {
    short_hash.yellow()
}
