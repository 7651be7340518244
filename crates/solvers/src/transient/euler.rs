//! Forward Euler step.
//!
//! ```text
//! state_{n+1} = state_n + f(state_n, t_n) * dt
//! ```

use flowmap_core::{State, StepIntegrable, VectorField};

/// Advances `state` from `time` by `dt` with one forward Euler step.
pub(super) fn advance<F, const N: usize>(field: &F, state: &State<N>, time: f64, dt: f64) -> State<N>
where
    F: VectorField<N>,
{
    state.step(field.derivative(state, time), dt)
}
