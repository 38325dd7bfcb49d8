//! Configuration loading from disk and environment.

use std::env;
use std::fs;
use std::path::Path;

use crate::config::schema::AppConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Environment variable naming the TOML config file.
pub const CONFIG_ENV: &str = "PARAGLIDING_CONFIG";

/// Environment variable overriding the listener port.
pub const PORT_ENV: &str = "PORT";

/// Error type for configuration loading.
#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
    InvalidPort(String),
    Validation(Vec<ValidationError>),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "IO error: {}", e),
            ConfigError::Parse(e) => write!(f, "Parse error: {}", e),
            ConfigError::InvalidPort(p) => write!(f, "Invalid {} value: {:?}", PORT_ENV, p),
            ConfigError::Validation(errors) => {
                write!(f, "Validation failed: ")?;
                for (i, err) in errors.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", err)?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// Parse configuration from TOML text without validating it.
pub fn parse_config(content: &str) -> Result<AppConfig, ConfigError> {
    toml::from_str(content).map_err(ConfigError::Parse)
}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<AppConfig, ConfigError> {
    let content = fs::read_to_string(path).map_err(ConfigError::Io)?;
    let config = parse_config(&content)?;

    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

/// Load the file named by `PARAGLIDING_CONFIG` (or defaults), then apply `PORT`.
pub fn from_env() -> Result<AppConfig, ConfigError> {
    let mut config = match env::var_os(CONFIG_ENV) {
        Some(path) => load_config(Path::new(&path))?,
        None => AppConfig::default(),
    };

    if let Ok(port) = env::var(PORT_ENV) {
        if !port.is_empty() {
            apply_port(&mut config, &port)?;
        }
    }

    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

/// Replace the port of `listener.bind_address`, keeping its host.
pub fn apply_port(config: &mut AppConfig, port: &str) -> Result<(), ConfigError> {
    let port: u16 = port
        .parse()
        .map_err(|_| ConfigError::InvalidPort(port.to_string()))?;

    let host = config
        .listener
        .bind_address
        .rsplit_once(':')
        .map(|(host, _)| host)
        .unwrap_or("0.0.0.0");
    config.listener.bind_address = format!("{}:{}", host, port);
    Ok(())
}
