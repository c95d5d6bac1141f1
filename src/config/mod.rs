// src/config/mod.rs

//! Configuration for fanexec.
//!
//! Responsibilities:
//! - Define the TOML-backed data model (`model.rs`).
//! - Load a config file through the `FileSystem` abstraction (`loader.rs`).
//! - Validate values (`validate.rs`).
//! - Merge CLI flags, config and defaults into `RunSettings` (`settings.rs`).

pub mod loader;
pub mod model;
pub mod settings;
pub mod validate;

pub use loader::{default_config_path, discover_config, load_and_validate, load_from_path};
pub use model::{ConfigFile, RawConfigFile, RunSection};
pub use settings::{DEFAULT_INPUT, DEFAULT_TEMPLATE, RunSettings};
