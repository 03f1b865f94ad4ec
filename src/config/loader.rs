//! Configuration loading from disk.

use std::fs;
use std::io;
use std::path::Path;
use thiserror::Error;

use crate::config::schema::BalancerConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Command-line values that take precedence over the file.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct ConfigOverrides {
    /// Port the balancer accepts clients on.
    #[arg(long)]
    pub listen_port: Option<u16>,

    /// Host shared by all backends.
    #[arg(long)]
    pub backend_host: Option<String>,

    /// Comma-separated backend ports, in selection order.
    #[arg(long, value_delimiter = ',')]
    pub backends: Option<Vec<u16>>,

    /// Period between health sweeps.
    #[arg(long)]
    pub health_interval_ms: Option<u64>,

    /// Period between status reports.
    #[arg(long)]
    pub stats_interval_ms: Option<u64>,
}

impl ConfigOverrides {
    /// Overwrite every field that was given on the command line.
    pub fn apply(&self, config: &mut BalancerConfig) {
        if let Some(port) = self.listen_port {
            config.listener.port = port;
        }
        if let Some(host) = &self.backend_host {
            config.backends.host = host.clone();
        }
        if let Some(ports) = &self.backends {
            config.backends.ports = ports.clone();
        }
        if let Some(ms) = self.health_interval_ms {
            config.health_check.interval_ms = ms;
        }
        if let Some(ms) = self.stats_interval_ms {
            config.stats.interval_ms = ms;
        }
    }
}

/// Parse a configuration document without validating it.
pub fn parse_config(content: &str) -> Result<BalancerConfig, ConfigError> {
    Ok(toml::from_str(content)?)
}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<BalancerConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    let config = parse_config(&content)?;

    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

/// Load the file if it exists, fall back to defaults if it does not, then
/// apply overrides and validate the result.
///
/// Runs before logging is up, so a missing file is reported by the caller.
pub fn resolve_config(
    path: &Path,
    overrides: &ConfigOverrides,
) -> Result<BalancerConfig, ConfigError> {
    let mut config = match fs::read_to_string(path) {
        Ok(content) => parse_config(&content)?,
        Err(e) if e.kind() == io::ErrorKind::NotFound => BalancerConfig::default(),
        Err(e) => return Err(ConfigError::Io(e)),
    };

    overrides.apply(&mut config);
    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}
