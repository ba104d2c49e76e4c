//! Shared test helpers.

pub mod factories;
