use std::ops::Index;

use crate::StepIntegrable;

/// The state of an `N`-variable dynamical system at one instant.
///
/// A state is a plain value: once produced it is never mutated in place.
/// Stepping or predicting always yields a new `State`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct State<const N: usize>([f64; N]);

impl<const N: usize> State<N> {
    /// Creates a state from its components.
    #[must_use]
    pub const fn new(values: [f64; N]) -> Self {
        Self(values)
    }

    /// Creates a state from a slice, returning `None` unless it has exactly `N` values.
    #[must_use]
    pub fn from_slice(values: &[f64]) -> Option<Self> {
        <[f64; N]>::try_from(values).ok().map(Self)
    }

    /// Returns the number of state variables.
    #[must_use]
    pub const fn dim(&self) -> usize {
        N
    }

    /// Returns the components as an array reference.
    #[must_use]
    pub const fn as_array(&self) -> &[f64; N] {
        &self.0
    }

    /// Consumes the state and returns its components.
    #[must_use]
    pub const fn into_array(self) -> [f64; N] {
        self.0
    }

    /// Returns an iterator over the components.
    pub fn iter(&self) -> std::slice::Iter<'_, f64> {
        self.0.iter()
    }

    /// Returns `true` if every component is finite.
    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.0.iter().all(|v| v.is_finite())
    }
}

impl<const N: usize> From<[f64; N]> for State<N> {
    fn from(values: [f64; N]) -> Self {
        Self(values)
    }
}

impl<const N: usize> Index<usize> for State<N> {
    type Output = f64;

    fn index(&self, index: usize) -> &f64 {
        &self.0[index]
    }
}

impl<const N: usize> StepIntegrable<f64> for State<N> {
    type Derivative = [f64; N];

    fn step(&self, derivative: [f64; N], delta: f64) -> Self {
        Self(std::array::from_fn(|i| self.0[i] + derivative[i] * delta))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_slice_checks_length() {
        assert_eq!(
            State::<2>::from_slice(&[1.0, 2.0]),
            Some(State::new([1.0, 2.0]))
        );
        assert_eq!(State::<2>::from_slice(&[1.0]), None);
        assert_eq!(State::<2>::from_slice(&[1.0, 2.0, 3.0]), None);
    }

    #[test]
    fn detects_non_finite_components() {
        assert!(State::new([0.0, -1.5, 1e300]).is_finite());
        assert!(!State::new([0.0, f64::NAN]).is_finite());
        assert!(!State::new([f64::INFINITY]).is_finite());
    }

    #[test]
    fn steps_each_component() {
        let state = State::new([1.0, 2.0, 3.0]);
        let next = state.step([0.1, 0.2, 0.3], 10.0);

        assert_eq!(next, State::new([2.0, 4.0, 6.0]));
        assert_eq!(state, State::new([1.0, 2.0, 3.0]));
    }
}
