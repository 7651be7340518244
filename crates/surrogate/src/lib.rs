//! Feed-forward surrogates of one-step ODE transition maps.
//!
//! A [`Surrogate`] maps the current state of an `N`-variable system to its
//! predicted state one grid step later. The default topology is four hidden
//! layers of width 10 with ReLU activation and an identity output layer, so
//! predictions are unbounded real vectors.
//!
//! # Modules
//!
//! - [`network`]: dense layers, activations and backpropagation
//! - [`train`]: mini-batch Adam training on mean squared error

mod adam;
pub mod network;
mod surrogate;
pub mod train;

pub use network::{Activation, Dense, Network, ShapeError};
pub use surrogate::{Architecture, ArchitectureError, Surrogate};
pub use train::{History, TrainConfig, TrainError};
