//! Validated run configuration.
//!
//! A [`Config`] carries every knob the pipeline stages read: sampling bounds,
//! the time grid, the trajectory count and split, the seed, and the surrogate's
//! architecture and training settings. Stages receive it explicitly.

use rand::{Rng, SeedableRng, rngs::StdRng};
use thiserror::Error;

use flowmap_core::{GridError, TimeGrid};
use flowmap_surrogate::{Architecture, ArchitectureError, TrainConfig, train};

/// Closed interval an initial-condition component is drawn from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    low: f64,
    high: f64,
}

impl Bounds {
    /// Creates bounds `[low, high]`.
    ///
    /// # Errors
    ///
    /// Returns an error if either end is not finite or `low > high`.
    pub fn new(low: f64, high: f64) -> Result<Self, ConfigError> {
        if !low.is_finite() || !high.is_finite() || low > high {
            return Err(ConfigError::Bounds { low, high });
        }
        Ok(Self { low, high })
    }

    #[must_use]
    pub fn low(&self) -> f64 {
        self.low
    }

    #[must_use]
    pub fn high(&self) -> f64 {
        self.high
    }

    /// Returns `true` if `value` lies within the bounds.
    #[must_use]
    pub fn contains(&self, value: f64) -> bool {
        (self.low..=self.high).contains(&value)
    }

    /// Draws a value uniformly from the bounds.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        rng.gen_range(self.low..=self.high)
    }
}

/// Errors that can occur when building a [`Config`].
#[derive(Debug, Error, Clone, Copy, PartialEq)]
pub enum ConfigError {
    #[error("bounds [{low}, {high}] must be finite with low <= high")]
    Bounds { low: f64, high: f64 },

    #[error("expected bounds for {expected} variables, found {found}")]
    Dimension { expected: usize, found: usize },

    #[error("trajectories must be at least one")]
    Trajectories,

    #[error("split fraction must be in (0, 1], got {0}")]
    Split(f64),

    #[error("invalid time grid: {0}")]
    Grid(#[from] GridError),

    #[error("invalid training config: {0}")]
    Train(#[from] train::ConfigError),

    #[error("invalid architecture: {0}")]
    Architecture(#[from] ArchitectureError),
}

/// Configuration of one pipeline run over an `N`-variable system.
#[derive(Debug, Clone, PartialEq)]
pub struct Config<const N: usize> {
    bounds: [Bounds; N],
    grid: TimeGrid,
    trajectories: usize,
    split: f64,
    seed: Option<u64>,
    train: TrainConfig,
    architecture: Architecture,
    patience: Option<usize>,
}

impl<const N: usize> Config<N> {
    /// Creates a config with the given sampling region and time grid.
    ///
    /// Everything else starts at its default: 100 trajectories, an 80/20
    /// split, no seed, default training and architecture, no early stopping.
    #[must_use]
    pub fn new(bounds: [Bounds; N], grid: TimeGrid) -> Self {
        Self {
            bounds,
            grid,
            trajectories: 100,
            split: 0.8,
            seed: None,
            train: TrainConfig::default(),
            architecture: Architecture::default(),
            patience: None,
        }
    }

    /// Sets the sampling bounds from a slice, one entry per state variable.
    ///
    /// # Errors
    ///
    /// Returns an error unless exactly `N` bounds are given.
    pub fn with_bounds(mut self, bounds: &[Bounds]) -> Result<Self, ConfigError> {
        self.bounds = <[Bounds; N]>::try_from(bounds).map_err(|_| ConfigError::Dimension {
            expected: N,
            found: bounds.len(),
        })?;
        Ok(self)
    }

    #[must_use]
    pub fn with_grid(mut self, grid: TimeGrid) -> Self {
        self.grid = grid;
        self
    }

    /// Sets the number of sampled trajectories.
    ///
    /// # Errors
    ///
    /// Returns an error if `trajectories` is zero.
    pub fn with_trajectories(mut self, trajectories: usize) -> Result<Self, ConfigError> {
        if trajectories == 0 {
            return Err(ConfigError::Trajectories);
        }
        self.trajectories = trajectories;
        Ok(self)
    }

    /// Sets the fraction of trajectories assigned to training.
    ///
    /// # Errors
    ///
    /// Returns an error unless `split` is in `(0, 1]`.
    pub fn with_split(mut self, split: f64) -> Result<Self, ConfigError> {
        if !(split > 0.0 && split <= 1.0) {
            return Err(ConfigError::Split(split));
        }
        self.split = split;
        Ok(self)
    }

    #[must_use]
    pub fn with_seed(mut self, seed: Option<u64>) -> Self {
        self.seed = seed;
        self
    }

    #[must_use]
    pub fn with_train(mut self, train: TrainConfig) -> Self {
        self.train = train;
        self
    }

    #[must_use]
    pub fn with_architecture(mut self, architecture: Architecture) -> Self {
        self.architecture = architecture;
        self
    }

    /// Enables early stopping after `patience` epochs without improvement.
    #[must_use]
    pub fn with_patience(mut self, patience: Option<usize>) -> Self {
        self.patience = patience;
        self
    }

    #[must_use]
    pub fn bounds(&self) -> &[Bounds; N] {
        &self.bounds
    }

    #[must_use]
    pub fn grid(&self) -> &TimeGrid {
        &self.grid
    }

    #[must_use]
    pub fn trajectories(&self) -> usize {
        self.trajectories
    }

    #[must_use]
    pub fn split(&self) -> f64 {
        self.split
    }

    #[must_use]
    pub fn seed(&self) -> Option<u64> {
        self.seed
    }

    #[must_use]
    pub fn train(&self) -> &TrainConfig {
        &self.train
    }

    #[must_use]
    pub fn architecture(&self) -> &Architecture {
        &self.architecture
    }

    #[must_use]
    pub fn patience(&self) -> Option<usize> {
        self.patience
    }

    /// Returns the random source for a run: seeded if a seed is set,
    /// otherwise drawn from the operating system.
    #[must_use]
    pub fn rng(&self) -> StdRng {
        match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        }
    }
}

/// Ready-made configurations for the bundled systems.
pub mod presets {
    use super::{Bounds, Config, TimeGrid};

    /// Lorenz sampling: x in [-20, 20], y in [-30, 30], z in [0, 50],
    /// 10000 points over [0, 25].
    #[must_use]
    pub fn lorenz() -> Config<3> {
        // Known-good values, unwrap is safe
        Config::new(
            [
                Bounds::new(-20.0, 20.0).unwrap(),
                Bounds::new(-30.0, 30.0).unwrap(),
                Bounds::new(0.0, 50.0).unwrap(),
            ],
            TimeGrid::new(0.0, 25.0, 10_000).unwrap(),
        )
    }

    /// Population sampling: P in [0, 1.6], F in [0, 1], 1000 points over [0, 1000].
    #[must_use]
    pub fn population() -> Config<2> {
        // Known-good values, unwrap is safe
        Config::new(
            [Bounds::new(0.0, 1.6).unwrap(), Bounds::new(0.0, 1.0).unwrap()],
            TimeGrid::new(0.0, 1000.0, 1000).unwrap(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn presets_carry_defaults() {
        let lorenz = presets::lorenz();
        assert_eq!(lorenz.trajectories(), 100);
        assert_eq!(lorenz.split(), 0.8);
        assert_eq!(lorenz.grid().len(), 10_000);
        assert_eq!(lorenz.bounds()[2].high(), 50.0);
        assert_eq!(lorenz.train().epochs(), 20);
        assert_eq!(lorenz.architecture().width(), 10);

        let population = presets::population();
        assert_eq!(population.grid().len(), 1000);
        assert_eq!(population.bounds()[0].high(), 1.6);
    }

    #[test]
    fn rejects_invalid_values() {
        assert!(Bounds::new(1.0, 0.0).is_err());
        assert!(Bounds::new(f64::NAN, 0.0).is_err());
        assert_eq!(
            presets::lorenz().with_trajectories(0),
            Err(ConfigError::Trajectories)
        );
        assert_eq!(presets::lorenz().with_split(0.0), Err(ConfigError::Split(0.0)));
        assert_eq!(presets::lorenz().with_split(1.5), Err(ConfigError::Split(1.5)));
        assert_eq!(
            presets::population().with_bounds(&[Bounds::new(0.0, 1.0).unwrap()]),
            Err(ConfigError::Dimension {
                expected: 2,
                found: 1
            })
        );
    }

    #[test]
    fn seeded_rngs_repeat() {
        let config = presets::population().with_seed(Some(7));

        let a: Vec<f64> = (0..4).map(|_| config.bounds()[0].sample(&mut config.rng())).collect();
        let mut rng = config.rng();
        let b = config.bounds()[0].sample(&mut rng);

        assert!(a.iter().all(|&v| v == b));
        assert!(config.bounds()[0].contains(b));
    }
}
