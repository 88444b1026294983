// src/config/mod.rs

//! Execution configuration for taskdag.
//!
//! Responsibilities:
//! - Define the TOML-backed data model and [`ExecuteOptions`] (`model.rs`).
//! - Load a config file from disk or a string (`loader.rs`).
//! - Validate basic invariants like a positive worker count (`validate.rs`).

pub mod loader;
pub mod model;
pub mod validate;

pub use loader::{load_and_validate, load_from_path, load_from_str};
pub use model::{
    ConfigFile, DEFAULT_WORKER_COUNT, ExecuteOptions, LoggingSection, RawConfigFile,
};
