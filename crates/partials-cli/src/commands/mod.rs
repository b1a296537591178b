//! CLI command implementations.

pub mod analyze;
pub mod band;
pub mod common;
pub mod config;
pub mod info;
pub mod resynth;
