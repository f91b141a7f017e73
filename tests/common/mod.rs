//! Shared helpers for deck-snapshot integration tests
//!
//! Every test works on a real project directory inside a `TempDir` and a real
//! git repository created through the library itself.

pub mod assertions;
pub mod fixtures;
pub mod repository;
