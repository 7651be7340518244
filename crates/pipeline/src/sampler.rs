//! Ground-truth trajectory sampling.

use rand::Rng;
use thiserror::Error;

use flowmap_core::{Integrator, State, TimeGrid, Trajectory, VectorField};

use crate::config::Bounds;

/// Errors that can occur while sampling trajectories.
#[derive(Debug, Error)]
pub enum SampleError {
    /// The integrator failed for a sampled initial condition.
    ///
    /// Sampling stops at the first failure. No other initial condition is
    /// drawn in its place.
    #[error("integration failed for trajectory {trajectory} from {initial:?}")]
    Integration {
        trajectory: usize,
        initial: Vec<f64>,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("trajectory {trajectory} has {found} states but the grid has {expected} points")]
    Length {
        trajectory: usize,
        expected: usize,
        found: usize,
    },
}

/// Draws an initial state with each component uniform within its bounds.
pub fn initial_state<R: Rng + ?Sized, const N: usize>(bounds: &[Bounds; N], rng: &mut R) -> State<N> {
    State::new(std::array::from_fn(|i| bounds[i].sample(rng)))
}

/// Samples `count` trajectories of `field` on `grid`.
///
/// # Algorithm
///
/// For each trajectory in turn:
///
/// 1. Draw an initial state uniformly within `bounds`.
/// 2. Integrate `field` from that state across `grid`.
/// 3. Check that one state was produced per grid point.
///
/// # Errors
///
/// Returns an error on the first trajectory the integrator fails for, or
/// whose length does not match the grid.
pub fn sample<F, I, R, const N: usize>(
    field: &F,
    integrator: &I,
    bounds: &[Bounds; N],
    grid: &TimeGrid,
    count: usize,
    rng: &mut R,
) -> Result<Vec<Trajectory<N>>, SampleError>
where
    F: VectorField<N>,
    I: Integrator<N>,
    R: Rng + ?Sized,
{
    let mut trajectories = Vec::with_capacity(count);

    for trajectory in 0..count {
        let initial = initial_state(bounds, rng);

        let states = integrator
            .integrate(field, initial, grid)
            .map_err(|source| SampleError::Integration {
                trajectory,
                initial: initial.iter().copied().collect(),
                source: Box::new(source),
            })?;

        if states.len() != grid.len() {
            return Err(SampleError::Length {
                trajectory,
                expected: grid.len(),
                found: states.len(),
            });
        }

        log::debug!("sampled trajectory {trajectory} from {:?}", initial.as_array());
        trajectories.push(states);
    }

    Ok(trajectories)
}
