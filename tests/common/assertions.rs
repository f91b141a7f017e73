//! Predicates for CLI output

#![allow(dead_code)]

use predicates::prelude::*;

pub fn not_initialized() -> impl Predicate<str> {
    predicates::str::contains("Repository is not initialized")
}

pub fn has_success(message: &str) -> impl Predicate<str> {
    predicates::str::contains("✓").and(predicates::str::contains(message.to_string()))
}

pub fn needs_confirmation() -> impl Predicate<str> {
    predicates::str::contains("pass --yes to confirm")
}

pub fn nothing_to_snapshot() -> impl Predicate<str> {
    predicates::str::contains("Nothing to snapshot")
}
