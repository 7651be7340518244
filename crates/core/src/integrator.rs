use crate::{State, TimeGrid, Trajectory, VectorField};

/// Numerically integrates a [`VectorField`] over a [`TimeGrid`].
///
/// An integrator returns exactly one state per grid point, the first being
/// `initial` itself. Integration failures (for example a state that blows up
/// to a non-finite value) are reported through [`Integrator::Error`].
pub trait Integrator<const N: usize> {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Integrates `field` from `initial` across every point of `grid`.
    ///
    /// # Errors
    ///
    /// Returns [`Self::Error`] if a finite trajectory cannot be produced.
    fn integrate<F: VectorField<N>>(
        &self,
        field: &F,
        initial: State<N>,
        grid: &TimeGrid,
    ) -> Result<Trajectory<N>, Self::Error>;
}

impl<T: Integrator<N> + ?Sized, const N: usize> Integrator<N> for &T {
    type Error = T::Error;

    fn integrate<F: VectorField<N>>(
        &self,
        field: &F,
        initial: State<N>,
        grid: &TimeGrid,
    ) -> Result<Trajectory<N>, Self::Error> {
        (**self).integrate(field, initial, grid)
    }
}
