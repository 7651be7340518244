use std::iter::FusedIterator;

use flowmap_core::{State, TimeGrid, VectorField};

use super::{Error, Method};

/// A lazy sequence of integrated states, one per grid point.
///
/// The first item is the initial state. Each following item advances the
/// previous state by one grid interval. After an error the iterator is
/// exhausted.
#[derive(Debug, Clone)]
pub struct Steps<'a, F, const N: usize> {
    field: &'a F,
    grid: TimeGrid,
    method: Method,
    current: State<N>,
    next: usize,
    failed: bool,
}

impl<'a, F, const N: usize> Steps<'a, F, N>
where
    F: VectorField<N>,
{
    pub(super) fn new(field: &'a F, initial: State<N>, grid: &TimeGrid, method: Method) -> Self {
        Self {
            field,
            grid: *grid,
            method,
            current: initial,
            next: 0,
            failed: false,
        }
    }

    fn fail(&mut self, step: usize) -> Error {
        self.failed = true;
        Error::NonFinite {
            step,
            time: self.grid.time(step),
        }
    }
}

impl<F, const N: usize> Iterator for Steps<'_, F, N>
where
    F: VectorField<N>,
{
    type Item = Result<State<N>, Error>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed || self.next >= self.grid.len() {
            return None;
        }

        let step = self.next;

        if step > 0 {
            let time = self.grid.time(step - 1);
            let dt = self.grid.time(step) - time;
            self.current = self.method.advance(self.field, &self.current, time, dt);
        }

        if !self.current.is_finite() {
            return Some(Err(self.fail(step)));
        }

        self.next += 1;
        Some(Ok(self.current))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        if self.failed {
            return (0, Some(0));
        }
        let remaining = self.grid.len() - self.next;
        (0, Some(remaining))
    }
}

impl<F, const N: usize> FusedIterator for Steps<'_, F, N> where F: VectorField<N> {}
