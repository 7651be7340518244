//! The flowmap pipeline: learn an ODE's one-step flow map and roll it out.
//!
//! Stages, in the order data flows through them:
//!
//! - [`sampler`]: uniform initial conditions integrated into trajectories
//! - [`pairs`]: trajectories sliced into per-trajectory transition pairs
//! - [`split`]: trajectory-level train/test split, then flattening
//! - surrogate training, from `flowmap-surrogate`
//! - [`rollout`]: autoregressive rollout of the trained surrogate
//! - [`evaluate`]: one-step metrics and rollout comparison
//!
//! [`Experiment`] wires the stages together around a [`Config`] and a
//! [`Storage`] backend that caches the dataset, its split and the trained model.

pub mod config;
mod error;
pub mod evaluate;
pub mod experiment;
pub mod pairs;
pub mod persist;
pub mod rollout;
pub mod sampler;
pub mod settings;
pub mod split;
pub mod storage;

pub use config::{Bounds, Config, ConfigError, presets};
pub use error::Error;
pub use evaluate::{Metrics, RolloutComparison};
pub use experiment::{Experiment, Report, RolloutReport, Source, Trained};
pub use pairs::{PairGroup, PairGroups};
pub use rollout::{Phase, Rollout, RolloutHook};
pub use settings::Settings;
pub use split::Split;
pub use storage::{Directory, Memory, Storage};
