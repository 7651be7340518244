//! Core traits and types for learning the flow map of an ODE.
//!
//! This crate defines the shared abstractions that integrators, surrogates,
//! and the dataset pipeline build on:
//!
//! - [`State`]: a fixed-length state vector of a dynamical system
//! - [`TimeGrid`]: a uniformly spaced grid of sample times
//! - [`Trajectory`]: states sampled on a time grid from one initial condition
//! - [`TransitionPair`] and [`Dataset`]: `(state[k], state[k + 1])` training
//!   examples, tagged with the trajectory they came from
//! - [`VectorField`]: the right-hand side of an ODE system
//! - [`Integrator`]: turns a vector field and initial state into a trajectory
//! - [`Predict`]: a one-step map from state to next state
//! - [`Observer`]: receives solver events and optionally returns control actions

mod dataset;
mod field;
mod grid;
mod integrator;
mod observer;
mod predict;
mod state;
mod step;
mod trajectory;

pub use dataset::{Dataset, TransitionPair};
pub use field::VectorField;
pub use grid::{GridError, TimeGrid};
pub use integrator::Integrator;
pub use observer::Observer;
pub use predict::Predict;
pub use state::State;
pub use step::{DerivativeOf, StepIntegrable};
pub use trajectory::{Trajectory, TrajectoryError};
