//! Fixed-grid integrators for ODE problems.
//!
//! These integrators step a [`VectorField`] across every interval of a
//! [`TimeGrid`] with an explicit method, producing exactly one state per grid
//! point:
//!
//! - [`Method::Euler`]: forward Euler, first order
//! - [`Method::Rk4`]: classic Runge-Kutta, fourth order (default)
//!
//! Step sizes come from the grid, so the output lines up with the grid by
//! construction. There is no error control: a state that becomes non-finite
//! ends the integration with [`Error::NonFinite`].
//!
//! # Example
//!
//! ```ignore
//! use flowmap_solvers::transient::{self, Method};
//!
//! let solution = transient::solve_unobserved(&field, initial, &grid, Method::Rk4)?;
//!
//! for (time, state) in grid.times().zip(&solution.states) {
//!     println!("t={time}: {state:?}");
//! }
//! ```

mod action;
mod error;
mod euler;
mod event;
mod rk4;
mod solution;
mod steps;


pub use action::Action;
pub use error::Error;
pub use event::Event;
pub use solution::{Solution, Status};
pub use steps::Steps;

use flowmap_core::{Integrator, Observer, State, TimeGrid, Trajectory, VectorField};

/// Explicit stepping methods supported by the transient solvers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Method {
    /// Forward Euler: one derivative evaluation per step, first-order accurate.
    Euler,

    /// Classic Runge-Kutta: four derivative evaluations per step,
    /// fourth-order accurate.
    #[default]
    Rk4,
}

impl Method {
    fn advance<F, const N: usize>(self, field: &F, state: &State<N>, time: f64, dt: f64) -> State<N>
    where
        F: VectorField<N>,
    {
        match self {
            Method::Euler => euler::advance(field, state, time, dt),
            Method::Rk4 => rk4::advance(field, state, time, dt),
        }
    }
}

/// Returns a lazy iterator over the integrated states on `grid`.
///
/// No work is done until the iterator is polled.
pub fn steps<'a, F, const N: usize>(
    field: &'a F,
    initial: State<N>,
    grid: &TimeGrid,
    method: Method,
) -> Steps<'a, F, N>
where
    F: VectorField<N>,
{
    Steps::new(field, initial, grid, method)
}

/// Integrates a vector field across a time grid.
///
/// # Algorithm
///
/// 1. Emit the initial state as step 0.
/// 2. For each following grid point:
///    - Advance the previous state by the grid interval with `method`.
///    - Check that the new state is finite.
///    - Emit an [`Event`] to the observer.
///    - If the observer returns `StopEarly`, terminate.
/// 3. Return the solution with every state produced.
///
/// # Errors
///
/// Returns [`Error::NonFinite`] if any state, including the initial one,
/// has a non-finite component.
pub fn solve<F, Obs, const N: usize>(
    field: &F,
    initial: State<N>,
    grid: &TimeGrid,
    method: Method,
    mut observer: Obs,
) -> Result<Solution<N>, Error>
where
    F: VectorField<N>,
    Obs: Observer<Event<N>, Action>,
{
    let mut states = Vec::with_capacity(grid.len());

    for (step, state) in steps(field, initial, grid, method).enumerate() {
        let state = state?;
        states.push(state);

        let event = Event {
            step,
            time: grid.time(step),
            state,
        };

        if let Some(Action::StopEarly) = observer.observe(&event) {
            return Ok(Solution {
                status: Status::StoppedByObserver,
                states,
                steps: step,
            });
        }
    }

    Ok(Solution {
        status: Status::Complete,
        steps: states.len() - 1,
        states,
    })
}

/// Integrates a vector field across a time grid without observation.
///
/// This is a convenience wrapper around [`solve`] that discards events.
///
/// # Errors
///
/// Returns [`Error::NonFinite`] if any state has a non-finite component.
pub fn solve_unobserved<F, const N: usize>(
    field: &F,
    initial: State<N>,
    grid: &TimeGrid,
    method: Method,
) -> Result<Solution<N>, Error>
where
    F: VectorField<N>,
{
    solve(field, initial, grid, method, ())
}

/// An [`Integrator`] backed by a fixed-grid [`Method`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Solver {
    method: Method,
}

impl Solver {
    /// Creates a solver that steps with `method`.
    #[must_use]
    pub fn new(method: Method) -> Self {
        Self { method }
    }

    /// Returns the stepping method.
    #[must_use]
    pub fn method(&self) -> Method {
        self.method
    }
}

impl<const N: usize> Integrator<N> for Solver {
    type Error = Error;

    fn integrate<F: VectorField<N>>(
        &self,
        field: &F,
        initial: State<N>,
        grid: &TimeGrid,
    ) -> Result<Trajectory<N>, Self::Error> {
        let solution = solve_unobserved(field, initial, grid, self.method)?;
        Ok(solution.into_trajectory()?)
    }
}
