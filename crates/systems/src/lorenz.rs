use flowmap_core::{State, VectorField};
use thiserror::Error;

/// The Lorenz system.
///
/// ```text
/// dx/dt = σ (y − x)
/// dy/dt = x (ρ − z) − y
/// dz/dt = x y − β z
/// ```
///
/// With the classic parameters `σ = 10`, `ρ = 28`, `β = 8/3` trajectories are
/// bounded but chaotic: nearby initial conditions diverge exponentially.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Lorenz {
    sigma: f64,
    rho: f64,
    beta: f64,
}

/// Errors that can occur when constructing a [`Lorenz`] system.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum LorenzError {
    #[error("sigma must be finite and positive")]
    Sigma,

    #[error("rho must be finite and positive")]
    Rho,

    #[error("beta must be finite and positive")]
    Beta,
}

impl Default for Lorenz {
    fn default() -> Self {
        // Known-good values, unwrap is safe
        Self::new(10.0, 28.0, 8.0 / 3.0).unwrap()
    }
}

impl Lorenz {
    /// Creates a Lorenz system with validated parameters.
    ///
    /// # Errors
    ///
    /// Returns an error if any parameter is non-finite or not positive.
    pub fn new(sigma: f64, rho: f64, beta: f64) -> Result<Self, LorenzError> {
        let positive = |v: f64| v.is_finite() && v > 0.0;

        if !positive(sigma) {
            return Err(LorenzError::Sigma);
        }
        if !positive(rho) {
            return Err(LorenzError::Rho);
        }
        if !positive(beta) {
            return Err(LorenzError::Beta);
        }

        Ok(Self { sigma, rho, beta })
    }

    #[must_use]
    pub fn sigma(&self) -> f64 {
        self.sigma
    }

    #[must_use]
    pub fn rho(&self) -> f64 {
        self.rho
    }

    #[must_use]
    pub fn beta(&self) -> f64 {
        self.beta
    }
}

impl VectorField<3> for Lorenz {
    fn derivative(&self, state: &State<3>, _time: f64) -> [f64; 3] {
        let [x, y, z] = *state.as_array();

        [
            self.sigma * (y - x),
            x * (self.rho - z) - y,
            x * y - self.beta * z,
        ]
    }

    fn variables(&self) -> [&'static str; 3] {
        ["x", "y", "z"]
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    #[test]
    fn origin_is_a_fixed_point() {
        let derivative = Lorenz::default().derivative(&State::new([0.0, 0.0, 0.0]), 0.0);

        assert_eq!(derivative, [0.0, 0.0, 0.0]);
    }

    #[test]
    fn evaluates_classic_parameters() {
        let lorenz = Lorenz::default();
        let [dx, dy, dz] = lorenz.derivative(&State::new([1.0, 2.0, 3.0]), 7.0);

        assert_relative_eq!(dx, 10.0);
        assert_relative_eq!(dy, 1.0 * (28.0 - 3.0) - 2.0);
        assert_relative_eq!(dz, 2.0 - 8.0);
    }

    #[test]
    fn nontrivial_equilibria_have_zero_derivative() {
        let lorenz = Lorenz::default();
        let c = (lorenz.beta() * (lorenz.rho() - 1.0)).sqrt();
        let derivative = lorenz.derivative(&State::new([c, c, lorenz.rho() - 1.0]), 0.0);

        for d in derivative {
            assert_relative_eq!(d, 0.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn rejects_invalid_parameters() {
        assert_eq!(Lorenz::new(0.0, 28.0, 1.0), Err(LorenzError::Sigma));
        assert_eq!(Lorenz::new(10.0, f64::NAN, 1.0), Err(LorenzError::Rho));
        assert_eq!(Lorenz::new(10.0, 28.0, -1.0), Err(LorenzError::Beta));
    }
}
