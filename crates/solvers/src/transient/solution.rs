use flowmap_core::{State, Trajectory, TrajectoryError};

/// Indicates how the solver terminated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    /// Produced a state for every grid point.
    Complete,

    /// Stopped early due to an observer action.
    StoppedByObserver,
}

/// The result of a fixed-grid integration.
#[derive(Debug, Clone, PartialEq)]
pub struct Solution<const N: usize> {
    /// How the solver terminated.
    pub status: Status,

    /// States at each grid point reached, starting with the initial state.
    pub states: Vec<State<N>>,

    /// Number of integration steps completed.
    pub steps: usize,
}

impl<const N: usize> Solution<N> {
    /// Converts the solution into a [`Trajectory`].
    ///
    /// # Errors
    ///
    /// Returns an error if the solution holds no states.
    pub fn into_trajectory(self) -> Result<Trajectory<N>, TrajectoryError> {
        Trajectory::new(self.states)
    }
}
