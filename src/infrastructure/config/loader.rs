use anyhow::{Context, Result};
use figment::providers::{Env, Format, Serialized, Yaml};
use figment::Figment;
use thiserror::Error;

use crate::domain::models::Config;

/// Configuration error types
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("GitLab token cannot be empty")]
    EmptyToken,

    #[error("GitLab base_url cannot be empty")]
    EmptyBaseUrl,

    #[error("project_full_path cannot be empty (the date query is scoped to it)")]
    EmptyProjectPath,

    #[error("run.project_ids cannot be empty")]
    NoProjects,

    #[error("Warehouse URL cannot be empty")]
    EmptyWarehouseUrl,

    #[error("Invalid warehouse schema name: {0}. Use letters, digits and underscores only")]
    InvalidSchemaName(String),

    #[error("Invalid max_connections: {0}. Must be at least 1")]
    InvalidMaxConnections(u32),

    #[error("Invalid timeout_secs: {0}. Must be at least 1")]
    InvalidTimeout(u64),

    #[error(
        "Invalid backoff configuration: initial_backoff_ms ({0}) must not exceed max_backoff_ms ({1})"
    )]
    InvalidBackoff(u64, u64),

    #[error("Invalid log level: {0}. Must be one of: trace, debug, info, warn, error")]
    InvalidLogLevel(String),

    #[error("Invalid log format: {0}. Must be one of: json, pretty")]
    InvalidLogFormat(String),
}

/// Configuration loader with hierarchical merging
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration with hierarchical merging
    ///
    /// Precedence (lowest to highest):
    /// 1. Programmatic defaults (Serialized)
    /// 2. issuestar.yaml in the working directory
    /// 3. Environment variables (`ISSUESTAR_*` prefix, highest priority)
    pub fn load() -> Result<Config> {
        let config: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Yaml::file("issuestar.yaml"))
            .merge(Env::prefixed("ISSUESTAR_").split("__"))
            .extract()
            .context("Failed to extract configuration from figment")?;

        Self::validate(&config)?;
        Ok(config)
    }

    /// Load configuration from a specific file
    pub fn load_from_file(path: impl AsRef<std::path::Path>) -> Result<Config> {
        let config: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Yaml::file(path.as_ref()))
            .merge(Env::prefixed("ISSUESTAR_").split("__"))
            .extract()
            .context(format!(
                "Failed to load config from {}",
                path.as_ref().display()
            ))?;

        Self::validate(&config)?;
        Ok(config)
    }

    /// Validate configuration after loading
    pub fn validate(config: &Config) -> Result<(), ConfigError> {
        if config.gitlab.base_url.is_empty() {
            return Err(ConfigError::EmptyBaseUrl);
        }
        if config.gitlab.token.is_empty() {
            return Err(ConfigError::EmptyToken);
        }
        if config.gitlab.project_full_path.is_empty() {
            return Err(ConfigError::EmptyProjectPath);
        }

        if config.run.project_ids.is_empty() {
            return Err(ConfigError::NoProjects);
        }

        if config.warehouse.url.is_empty() {
            return Err(ConfigError::EmptyWarehouseUrl);
        }

        // The schema name is interpolated into SQL, so it must stay a
        // plain identifier.
        let schema = &config.warehouse.schema;
        let valid_ident = !schema.is_empty()
            && !schema.starts_with(|c: char| c.is_ascii_digit())
            && schema.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');
        if !valid_ident {
            return Err(ConfigError::InvalidSchemaName(schema.clone()));
        }

        if config.warehouse.max_connections == 0 {
            return Err(ConfigError::InvalidMaxConnections(
                config.warehouse.max_connections,
            ));
        }

        if config.http.timeout_secs == 0 {
            return Err(ConfigError::InvalidTimeout(config.http.timeout_secs));
        }

        if config.http.initial_backoff_ms > config.http.max_backoff_ms {
            return Err(ConfigError::InvalidBackoff(
                config.http.initial_backoff_ms,
                config.http.max_backoff_ms,
            ));
        }

        let valid_log_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_log_levels.contains(&config.logging.level.as_str()) {
            return Err(ConfigError::InvalidLogLevel(config.logging.level.clone()));
        }

        let valid_log_formats = ["json", "pretty"];
        if !valid_log_formats.contains(&config.logging.format.as_str()) {
            return Err(ConfigError::InvalidLogFormat(config.logging.format.clone()));
        }

        Ok(())
    }
}
