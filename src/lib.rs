//! wodharvest - workout listing harvester.
//!
//! Pages through the wodwell AJAX listing, filters promotional entries,
//! classifies each workout's score types and writes typed records as
//! JSON lines.

pub mod cli;
pub mod config;
pub mod models;
pub mod output;
pub mod scrapers;
pub mod utils;
