//! Configuration file resolution and TOML loading
//!
//! Config file lookup follows this priority order:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable (`<MODULE>_CONFIG`, e.g. `TAIS_RELAY_CONFIG`)
//! 3. User config directory (`~/.config/<module>/config.toml` on Linux)
//! 4. System config (`/etc/<module>/config.toml`)
//!
//! An explicitly named file (CLI or environment) must exist. When nothing
//! is named and no default location has a file, callers fall back to
//! compiled defaults.

use crate::{Error, Result};
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};

/// Locates the TOML bootstrap file for one module
#[derive(Debug, Clone)]
pub struct ConfigFileResolver {
    module_name: String,
    env_var_name: String,
}

impl ConfigFileResolver {
    /// Create a resolver for `module_name` (e.g. "tais-relay")
    pub fn new(module_name: &str) -> Self {
        let env_var_name = format!(
            "{}_CONFIG",
            module_name.to_ascii_uppercase().replace('-', "_")
        );
        Self {
            module_name: module_name.to_string(),
            env_var_name,
        }
    }

    /// Name of the environment variable consulted at priority 2
    pub fn env_var_name(&self) -> &str {
        &self.env_var_name
    }

    /// Resolve the config file path, or `None` when no file is available
    pub fn resolve(&self, cli_arg: Option<&Path>) -> Result<Option<PathBuf>> {
        // Priority 1: Command-line argument
        if let Some(path) = cli_arg {
            return Self::require_existing(path.to_path_buf(), "command line");
        }

        // Priority 2: Environment variable
        if let Ok(path) = std::env::var(&self.env_var_name) {
            if !path.is_empty() {
                return Self::require_existing(PathBuf::from(path), &self.env_var_name);
            }
        }

        // Priority 3 and 4: platform locations
        Ok(self.default_locations().into_iter().find(|p| p.exists()))
    }

    /// Platform config locations, most specific first
    pub fn default_locations(&self) -> Vec<PathBuf> {
        let mut locations = Vec::new();
        if let Some(dir) = dirs::config_dir() {
            locations.push(dir.join(&self.module_name).join("config.toml"));
        }
        if cfg!(unix) {
            locations.push(
                PathBuf::from("/etc")
                    .join(&self.module_name)
                    .join("config.toml"),
            );
        }
        locations
    }

    fn require_existing(path: PathBuf, source: &str) -> Result<Option<PathBuf>> {
        if path.exists() {
            Ok(Some(path))
        } else {
            Err(Error::Config(format!(
                "Config file from {} not found: {}",
                source,
                path.display()
            )))
        }
    }
}

/// Parse a TOML document into `T`
pub fn parse_toml<T: DeserializeOwned>(content: &str) -> Result<T> {
    toml::from_str(content).map_err(|e| Error::Config(format!("Failed to parse TOML: {}", e)))
}

/// Load `T` from the TOML file at `path`, or `T::default()` when `path` is `None`
///
/// A missing config file is not fatal: the service starts on compiled defaults.
pub fn load_toml_or_default<T>(path: Option<&Path>) -> Result<T>
where
    T: DeserializeOwned + Default,
{
    match path {
        Some(path) => {
            let content = std::fs::read_to_string(path).map_err(|e| {
                Error::Config(format!("Failed to read config file {}: {}", path.display(), e))
            })?;
            parse_toml(&content)
        }
        None => Ok(T::default()),
    }
}
