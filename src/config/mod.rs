// src/config/mod.rs

//! Configuration loading and validation for assetpipe.
//!
//! Responsibilities:
//! - Define the TOML-backed data model (`model.rs`).
//! - Load a config file from disk and apply CLI overrides (`loader.rs`).
//! - Validate invariants like disjoint source/build roots (`validate.rs`).

pub mod loader;
pub mod model;
pub mod validate;

pub use loader::{
    ConfigOverrides, default_config_path, load_and_validate, load_from_path, load_with_overrides,
};
pub use model::{
    ConfigFile, FilesSection, PathsSection, RawConfigFile, StylesheetsSection, WatchSection,
};
