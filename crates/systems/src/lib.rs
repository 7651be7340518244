//! Reference dynamical systems.
//!
//! - [`Lorenz`]: the three-variable chaotic Lorenz system
//! - [`Population`]: a two-variable system of saturating growth coupled to
//!   logistic competition

mod lorenz;
mod population;

pub use lorenz::{Lorenz, LorenzError};
pub use population::Population;
