//! Pool capacity configuration
//!
//! Loaded once at startup, from RON or JSON.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

/// Capacity limits applied when entities are recycled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PoolConfig {
    /// Maximum number of available entities kept per type key
    pub max_per_type: usize,
    /// Maximum number of available entities kept across all keys
    pub max_total: usize,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            max_per_type: 20,
            max_total: 100,
        }
    }
}

impl PoolConfig {
    /// Set the per-type cap
    #[must_use]
    pub const fn with_max_per_type(mut self, max: usize) -> Self {
        self.max_per_type = max;
        self
    }

    /// Set the global cap
    #[must_use]
    pub const fn with_max_total(mut self, max: usize) -> Self {
        self.max_total = max;
        self
    }
}

/// Read and deserialize a RON file.
///
/// # Errors
///
/// Returns an error if the file cannot be read or deserialization fails
pub fn load_ron<T: for<'de> Deserialize<'de>>(path: impl AsRef<Path>) -> Result<T, ConfigError> {
    let content = fs::read_to_string(path).map_err(|e| ConfigError::IoError(e.to_string()))?;
    ron::from_str(&content).map_err(|e| ConfigError::DeserializeError(e.to_string()))
}

/// Read and deserialize a JSON file.
///
/// # Errors
///
/// Returns an error if the file cannot be read or deserialization fails
pub fn load_json<T: for<'de> Deserialize<'de>>(path: impl AsRef<Path>) -> Result<T, ConfigError> {
    let content = fs::read_to_string(path).map_err(|e| ConfigError::IoError(e.to_string()))?;
    serde_json::from_str(&content).map_err(|e| ConfigError::DeserializeError(e.to_string()))
}

/// Load a config file, choosing the format from the extension.
///
/// `.json` files are parsed as JSON, everything else as RON.
///
/// # Errors
///
/// Returns an error if the file cannot be read or deserialization fails
pub fn load<T: for<'de> Deserialize<'de>>(path: impl AsRef<Path>) -> Result<T, ConfigError> {
    let path = path.as_ref();
    match path.extension().and_then(|ext| ext.to_str()) {
        Some("json") => load_json(path),
        _ => load_ron(path),
    }
}

/// Errors that can occur while loading configuration
#[derive(Debug, Clone)]
pub enum ConfigError {
    /// IO error
    IoError(String),
    /// Deserialization error
    DeserializeError(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::IoError(e) => write!(f, "IO error: {e}"),
            Self::DeserializeError(e) => write!(f, "Deserialization error: {e}"),
        }
    }
}

impl std::error::Error for ConfigError {}
