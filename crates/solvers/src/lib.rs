//! Numerical integrators for the flowmap framework.
//!
//! - [`transient`]: fixed-grid explicit integrators (forward Euler and
//!   classic Runge-Kutta) that produce one state per grid point

pub mod transient;
