use std::path::Path;

use tracing::warn;

use crate::engine::EngineConfig;
use crate::error::ConfigError;
use crate::simulation::SimulationConfig;
use crate::snapshot::SnapshotConfig;

/// Top-level application configuration, loadable from TOML.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub engine: EngineConfig,
    pub simulation: SimulationConfig,
    pub snapshot: SnapshotConfig,
}

impl AppConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::FileRead {
            path: path.to_path_buf(),
            source: e,
        })?;
        let config: AppConfig = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file, falling back to defaults if the file
    /// does not exist.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            Self::load(path)
        } else {
            warn!(path = %path.display(), "config file not found, using defaults");
            Ok(Self::default())
        }
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.engine.vote_quorum == 0 {
            return Err(ConfigError::Validation(
                "engine.vote_quorum must be >= 1".into(),
            ));
        }
        if self.simulation.participants == 0 {
            return Err(ConfigError::Validation(
                "simulation.participants must be >= 1".into(),
            ));
        }
        if self.simulation.max_votes == 0 {
            return Err(ConfigError::Validation(
                "simulation.max_votes must be > 0".into(),
            ));
        }
        if self.engine.vote_quorum > self.simulation.participants {
            return Err(ConfigError::Validation(
                "engine.vote_quorum must be <= simulation.participants".into(),
            ));
        }
        for (i, stake) in self.simulation.opening_stakes.iter().enumerate() {
            if stake.amount == 0 {
                return Err(ConfigError::Validation(format!(
                    "simulation.opening_stakes[{i}].amount must be > 0"
                )));
            }
            if stake.side > 1 {
                return Err(ConfigError::Validation(format!(
                    "simulation.opening_stakes[{i}].side must be 0 or 1"
                )));
            }
            if stake.participant >= self.simulation.participants {
                return Err(ConfigError::Validation(format!(
                    "simulation.opening_stakes[{i}].participant must be < simulation.participants"
                )));
            }
        }
        if self.snapshot.path.as_os_str().is_empty() {
            return Err(ConfigError::Validation(
                "snapshot.path must not be empty".into(),
            ));
        }

        Ok(())
    }

    /// Generate a TOML string with all default values (useful for creating
    /// example config files).
    pub fn default_toml() -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(&AppConfig::default())
    }
}
