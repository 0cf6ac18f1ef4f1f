//! Command-line interface for wodharvest.

mod commands;
pub mod icons;

pub use commands::{is_verbose, run};
