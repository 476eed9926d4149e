//! Configuration management for melodyq.
//!
//! Loads and saves the TOML configuration that tells the client where the
//! analysis service lives.

pub mod file;

pub use file::{get_config_path, MelodyqConfig, ServerConfig};
