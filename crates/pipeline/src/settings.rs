//! TOML overlay for a [`Config`].
//!
//! Every field is optional. Fields that are present replace the matching value
//! of a preset; absent fields leave the preset untouched.
//!
//! ```toml
//! trajectories = 50
//! split = 0.75
//! seed = 42
//! bounds = [[0.0, 1.0], [0.0, 0.5]]
//!
//! [grid]
//! start = 0.0
//! end = 500.0
//! points = 500
//!
//! [train]
//! epochs = 5
//! patience = 2
//! ```

use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use flowmap_core::TimeGrid;
use flowmap_surrogate::{Architecture, TrainConfig};

use crate::config::{Bounds, Config, ConfigError};

/// Optional overrides for a [`Config`].
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Settings {
    pub bounds: Option<Vec<[f64; 2]>>,
    pub grid: Option<GridSettings>,
    pub trajectories: Option<usize>,
    pub split: Option<f64>,
    pub seed: Option<u64>,
    #[serde(default)]
    pub train: TrainSettings,
    #[serde(default)]
    pub architecture: ArchitectureSettings,
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GridSettings {
    pub start: f64,
    pub end: f64,
    pub points: usize,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TrainSettings {
    pub epochs: Option<usize>,
    pub batch_size: Option<usize>,
    pub validation_fraction: Option<f64>,
    pub learning_rate: Option<f64>,
    pub patience: Option<usize>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ArchitectureSettings {
    pub hidden_layers: Option<usize>,
    pub width: Option<usize>,
}

/// Errors that can occur when loading settings.
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to read {}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

impl Settings {
    /// Reads settings from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not valid settings TOML.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| SettingsError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&text).map_err(|source| SettingsError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Applies the overrides on top of `config`.
    ///
    /// # Errors
    ///
    /// Returns an error if an override is invalid or `bounds` does not have
    /// one entry per state variable.
    pub fn apply<const N: usize>(&self, config: Config<N>) -> Result<Config<N>, ConfigError> {
        let mut config = config;

        if let Some(bounds) = &self.bounds {
            let bounds = bounds
                .iter()
                .map(|&[low, high]| Bounds::new(low, high))
                .collect::<Result<Vec<_>, _>>()?;
            config = config.with_bounds(&bounds)?;
        }
        if let Some(grid) = self.grid {
            config = config.with_grid(TimeGrid::new(grid.start, grid.end, grid.points)?);
        }
        if let Some(trajectories) = self.trajectories {
            config = config.with_trajectories(trajectories)?;
        }
        if let Some(split) = self.split {
            config = config.with_split(split)?;
        }
        if self.seed.is_some() {
            config = config.with_seed(self.seed);
        }

        let train = *config.train();
        let train = TrainConfig::new(
            self.train.epochs.unwrap_or(train.epochs()),
            self.train.batch_size.unwrap_or(train.batch_size()),
            self.train.validation_fraction.unwrap_or(train.validation_fraction()),
            self.train.learning_rate.unwrap_or(train.learning_rate()),
        )?;
        config = config.with_train(train);
        if self.train.patience.is_some() {
            config = config.with_patience(self.train.patience);
        }

        let architecture = *config.architecture();
        let architecture = Architecture::new(
            self.architecture.hidden_layers.unwrap_or(architecture.hidden_layers()),
            self.architecture.width.unwrap_or(architecture.width()),
        )?;

        Ok(config.with_architecture(architecture))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::presets;

    #[test]
    fn empty_settings_keep_the_preset() {
        let settings: Settings = toml::from_str("").unwrap();

        assert_eq!(settings.apply(presets::lorenz()), Ok(presets::lorenz()));
    }

    #[test]
    fn overrides_replace_preset_values() {
        let settings: Settings = toml::from_str(
            r"
            trajectories = 12
            seed = 3
            bounds = [[0.0, 1.0], [0.0, 0.5]]

            [grid]
            start = 0.0
            end = 10.0
            points = 11

            [train]
            epochs = 2
            patience = 1

            [architecture]
            width = 8
            ",
        )
        .unwrap();

        let config = settings.apply(presets::population()).unwrap();

        assert_eq!(config.trajectories(), 12);
        assert_eq!(config.seed(), Some(3));
        assert_eq!(config.bounds()[1].high(), 0.5);
        assert_eq!(config.grid().len(), 11);
        assert_eq!(config.train().epochs(), 2);
        assert_eq!(config.train().batch_size(), 16);
        assert_eq!(config.patience(), Some(1));
        assert_eq!(config.architecture().width(), 8);
        assert_eq!(config.architecture().hidden_layers(), 4);
    }

    #[test]
    fn bounds_must_match_dimension() {
        let settings: Settings = toml::from_str("bounds = [[0.0, 1.0]]").unwrap();

        assert_eq!(
            settings.apply(presets::lorenz()),
            Err(ConfigError::Dimension {
                expected: 3,
                found: 1
            })
        );
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(toml::from_str::<Settings>("trajectory = 3").is_err());
    }
}
