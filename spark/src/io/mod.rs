//! I/O helpers for the generation pipeline.

pub mod config;
pub mod generator;
pub mod prompt;
