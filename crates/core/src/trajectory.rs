use thiserror::Error;

use crate::State;

/// An ordered sequence of states sampled on a time grid.
///
/// The first state is the initial condition the trajectory was integrated
/// from, so a trajectory is never empty.
#[derive(Debug, Clone, PartialEq)]
pub struct Trajectory<const N: usize> {
    states: Vec<State<N>>,
}

/// Errors that can occur when constructing a [`Trajectory`].
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum TrajectoryError {
    #[error("a trajectory needs at least its initial state")]
    Empty,
}

impl<const N: usize> Trajectory<N> {
    /// Creates a trajectory from its states, the first being the initial condition.
    ///
    /// # Errors
    ///
    /// Returns [`TrajectoryError::Empty`] if `states` is empty.
    pub fn new(states: Vec<State<N>>) -> Result<Self, TrajectoryError> {
        if states.is_empty() {
            return Err(TrajectoryError::Empty);
        }
        Ok(Self { states })
    }

    /// Returns the initial condition that produced this trajectory.
    #[must_use]
    pub fn initial(&self) -> &State<N> {
        &self.states[0]
    }

    /// Returns all states in time order.
    #[must_use]
    pub fn states(&self) -> &[State<N>] {
        &self.states
    }

    /// Returns the number of states.
    #[must_use]
    pub fn len(&self) -> usize {
        self.states.len()
    }

    /// Always `false`: a trajectory holds at least its initial state.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Consumes the trajectory and returns its states.
    #[must_use]
    pub fn into_states(self) -> Vec<State<N>> {
        self.states
    }
}
