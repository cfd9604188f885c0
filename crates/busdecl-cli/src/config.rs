//! Configuration file loading for the CLI
//!
//! This module finds and loads the [`IntrospectorConfig`] TOML file from the
//! usual locations (explicit path, local directory, platform directory).

use std::{
    fs,
    path::{Path, PathBuf},
};

use directories::ProjectDirs;
use log::{debug, info};
use thiserror::Error;

use busdecl::config::IntrospectorConfig;

/// Configuration-related errors for CLI
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to parse TOML configuration `{path}`: {message}")]
    Parse { path: PathBuf, message: String },

    #[error("Missing configuration file: {0}")]
    MissingFile(PathBuf),

    #[error("Failed to read configuration `{path}`: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Find and load configuration from various locations
///
/// Search order:
/// 1. Explicit path if provided
/// 2. Local project directory (busdecl/config.toml)
/// 3. Platform-specific config directory
/// 4. Default config if none found
///
/// # Errors
///
/// Returns error if:
/// - Explicit path is provided but file doesn't exist
/// - Config file exists but cannot be read or parsed
pub fn load_config(explicit_path: Option<impl AsRef<Path>>) -> Result<IntrospectorConfig, ConfigError> {
    if let Some(path) = explicit_path {
        let path = path.as_ref();
        info!(path = path.display().to_string(); "Loading configuration from explicit path");
        return load_config_file(path);
    }

    let local_config = Path::new("busdecl/config.toml");
    if local_config.exists() {
        info!(path = local_config.display().to_string(); "Loading configuration from local path");
        return load_config_file(local_config);
    }

    if let Some(proj_dirs) = ProjectDirs::from("com", "busdecl", "busdecl") {
        let system_config = proj_dirs.config_dir().join("config.toml");

        if system_config.exists() {
            info!(path = system_config.display().to_string(); "Loading configuration from system path");
            return load_config_file(system_config);
        }

        debug!(path = system_config.display().to_string(); "System configuration file not found");
    } else {
        debug!("Could not determine platform-specific config directory");
    }

    debug!("No configuration file found, using default configuration");
    Ok(IntrospectorConfig::default())
}

fn load_config_file(path: impl AsRef<Path>) -> Result<IntrospectorConfig, ConfigError> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(ConfigError::MissingFile(path.to_path_buf()));
    }

    let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    toml::from_str(&content).map_err(|err| ConfigError::Parse {
        path: path.to_path_buf(),
        message: err.message().to_string(),
    })
}
