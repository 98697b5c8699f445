//! Configuration path resolution.

use std::path::PathBuf;

use gatehouse_core::error::{GatehouseError, Result};

/// Centralized path resolution for Gatehouse configuration files.
pub struct GatehousePaths;

impl GatehousePaths {
    /// The configuration directory (`~/.config/gatehouse` on Linux).
    pub fn config_dir() -> Result<PathBuf> {
        dirs::config_dir()
            .map(|dir| dir.join("gatehouse"))
            .ok_or_else(|| GatehouseError::config("could not determine config directory"))
    }

    /// The configuration file path (`config.toml` inside the config dir).
    pub fn config_file() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.toml"))
    }
}
