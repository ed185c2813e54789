use poetxt::ValuableMod;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Invalid config {path}: {source}")]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },
}

/// Simulation configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Modifiers worth keeping through a recombination.
    pub valuable_mods: Vec<ValuableMod>,

    /// Largest prefix or suffix pool the simulator will enumerate.
    ///
    /// Enumeration is exponential in pool size; real pools have at most
    /// six entries (three per input item).
    pub max_pool_size: usize,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            valuable_mods: Vec::new(),
            max_pool_size: 12,
        }
    }
}

impl SimConfig {
    /// Load from a JSON file; absent fields take their defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: SimConfig = serde_json::from_str(&text).map_err(|source| ConfigError::Json {
            path: path.to_path_buf(),
            source,
        })?;
        log::debug!(
            "Loaded config {}: {} valuable mods, max pool {}",
            path.display(),
            config.valuable_mods.len(),
            config.max_pool_size
        );
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = SimConfig::default();
        assert!(config.valuable_mods.is_empty());
        assert_eq!(config.max_pool_size, 12);
    }

    #[test]
    fn test_load_partial_config() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"valuable_mods": [{{"description": "X% increased Attack Speed", "max_tier": 4}}]}}"#
        )
        .unwrap();

        let config = SimConfig::load(file.path()).unwrap();
        assert_eq!(
            config.valuable_mods,
            vec![ValuableMod::new("X% increased Attack Speed", 4)]
        );
        assert_eq!(config.max_pool_size, 12);
    }

    #[test]
    fn test_load_missing_file() {
        let err = SimConfig::load(Path::new("/nonexistent/poesim.json")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
        assert!(err.to_string().contains("/nonexistent/poesim.json"));
    }

    #[test]
    fn test_load_invalid_json() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();
        let err = SimConfig::load(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Json { .. }));
    }
}
