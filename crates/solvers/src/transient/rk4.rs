//! Classic fourth-order Runge-Kutta step.
//!
//! ```text
//! k₁ = f(yₙ, tₙ)
//! k₂ = f(yₙ + dt/2 · k₁, tₙ + dt/2)
//! k₃ = f(yₙ + dt/2 · k₂, tₙ + dt/2)
//! k₄ = f(yₙ + dt · k₃, tₙ + dt)
//!
//! yₙ₊₁ = yₙ + dt/6 · (k₁ + 2k₂ + 2k₃ + k₄)
//! ```

use flowmap_core::{State, StepIntegrable, VectorField};

/// Advances `state` from `time` by `dt` with one RK4 step.
pub(super) fn advance<F, const N: usize>(field: &F, state: &State<N>, time: f64, dt: f64) -> State<N>
where
    F: VectorField<N>,
{
    let half = dt / 2.0;

    let k1 = field.derivative(state, time);
    let k2 = field.derivative(&state.step(k1, half), time + half);
    let k3 = field.derivative(&state.step(k2, half), time + half);
    let k4 = field.derivative(&state.step(k3, dt), time + dt);

    let slope = std::array::from_fn(|i| (k1[i] + 2.0 * k2[i] + 2.0 * k3[i] + k4[i]) / 6.0);

    state.step(slope, dt)
}
