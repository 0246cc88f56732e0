//! Configuration loading (figment: defaults → YAML → env).

pub mod loader;

pub use loader::{ConfigError, ConfigLoader};
