//! Storage infrastructure: configuration file persistence.
//!
//! The `config` sub-module reads the TOML display setup from the
//! platform-appropriate directory, writes it back when the user reconfigures
//! displays, and falls back to defaults when no file exists yet.

pub mod config;
