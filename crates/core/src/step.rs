/// A value that can be advanced along a derivative.
///
/// `step(derivative, delta)` returns `self + derivative * delta`. The explicit
/// integrators only ever combine states through this method, so an RK4 stage
/// is a `step` with a partial interval and the final update is a `step` with
/// the weighted slope.
pub trait StepIntegrable<Delta> {
    /// Rate of change with respect to `Delta`.
    type Derivative;

    /// Returns the value advanced by `derivative * delta`.
    #[must_use]
    fn step(&self, derivative: Self::Derivative, delta: Delta) -> Self;
}

/// Shorthand for `<T as StepIntegrable<Delta>>::Derivative`.
pub type DerivativeOf<T, Delta> = <T as StepIntegrable<Delta>>::Derivative;

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;
    use crate::State;

    fn midpoint<const N: usize>(
        state: &State<N>,
        slope: DerivativeOf<State<N>, f64>,
        dt: f64,
    ) -> State<N> {
        state.step(slope, dt / 2.0)
    }

    #[test]
    fn state_steps_componentwise() {
        let next = State::new([1.0, -2.0, 0.5]).step([2.0, 4.0, -1.0], 0.25);

        assert_eq!(next, State::new([1.5, -1.0, 0.25]));
    }

    #[test]
    fn zero_interval_is_identity() {
        let state = State::new([3.0, 7.0]);

        assert_eq!(state.step([1e6, -1e6], 0.0), state);
    }

    #[test]
    fn derivative_alias_names_the_state_slope() {
        let next = midpoint(&State::new([0.0, 1.0]), [0.2, -0.4], 0.1);

        assert_relative_eq!(next[0], 0.01, epsilon = 1e-12);
        assert_relative_eq!(next[1], 0.98, epsilon = 1e-12);
    }
}
