#![allow(dead_code)]

use std::cell::Cell;

use flowmap_core::{Integrator, State, TimeGrid, Trajectory, VectorField};
use flowmap_solvers::transient::{Error, Solver};

/// An RK4 integrator that counts how often it is asked to integrate.
#[derive(Debug, Default)]
pub struct Counting {
    inner: Solver,
    calls: Cell<usize>,
}

impl Counting {
    pub fn calls(&self) -> usize {
        self.calls.get()
    }
}

impl<const N: usize> Integrator<N> for Counting {
    type Error = Error;

    fn integrate<F: VectorField<N>>(
        &self,
        field: &F,
        initial: State<N>,
        grid: &TimeGrid,
    ) -> Result<Trajectory<N>, Self::Error> {
        self.calls.set(self.calls.get() + 1);
        self.inner.integrate(field, initial, grid)
    }
}

/// dy/dt = y², which blows up within the grids used here.
pub struct Blowup;

impl VectorField<1> for Blowup {
    fn derivative(&self, state: &State<1>, _time: f64) -> [f64; 1] {
        [state[0] * state[0]]
    }

    fn variables(&self) -> [&'static str; 1] {
        ["y"]
    }
}
