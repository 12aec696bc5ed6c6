//! Core of the threat dashboard: dataset loading, validation, caching,
//! summaries and export. The egui front end and the command line tools are
//! thin consumers of this crate.

pub mod config;
pub mod data;
