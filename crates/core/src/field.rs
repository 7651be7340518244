use crate::State;

/// The right-hand side of an autonomous or time-dependent ODE system.
///
/// A vector field maps `(state, time)` to the time derivative of the state.
/// Parameters live on the implementing type, so evaluation is a pure function
/// with no side effects and no internal state.
pub trait VectorField<const N: usize> {
    /// Returns `d(state)/dt` at the given state and time.
    fn derivative(&self, state: &State<N>, time: f64) -> [f64; N];

    /// Returns a short name for each state variable, in component order.
    fn variables(&self) -> [&'static str; N];
}

impl<T: VectorField<N> + ?Sized, const N: usize> VectorField<N> for &T {
    fn derivative(&self, state: &State<N>, time: f64) -> [f64; N] {
        (**self).derivative(state, time)
    }

    fn variables(&self) -> [&'static str; N] {
        (**self).variables()
    }
}
