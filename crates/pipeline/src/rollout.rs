//! Autoregressive rollout of a one-step predictor.
//!
//! A [`Rollout`] starts from a real seed state and repeatedly feeds the
//! predictor its own previous output. Ground truth is never consulted after
//! the seed. A rollout of `steps` predictions yields `steps + 1` states, the
//! first being the seed itself.
//!
//! Non-finite predictions are not detected: once a component becomes NaN or
//! infinite it keeps flowing through the model. A [`RolloutHook`] is the
//! place to clip or inspect states without changing the rollout itself.

use std::iter::FusedIterator;

use flowmap_core::{Predict, State, TimeGrid};

/// Where a rollout is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Holding the seed state, no predictions made yet.
    Seeded,

    /// At least one prediction made, more remain.
    Advancing,

    /// Every prediction has been made.
    Finished,
}

/// Post-processes each predicted state before it is fed back.
pub trait RolloutHook<const N: usize> {
    /// Returns the state to record and feed back for prediction `step`,
    /// counting from 1.
    fn after_step(&mut self, step: usize, predicted: State<N>) -> State<N>;
}

/// The identity hook.
impl<const N: usize> RolloutHook<N> for () {
    fn after_step(&mut self, _step: usize, predicted: State<N>) -> State<N> {
        predicted
    }
}

impl<F, const N: usize> RolloutHook<N> for F
where
    F: FnMut(usize, State<N>) -> State<N>,
{
    fn after_step(&mut self, step: usize, predicted: State<N>) -> State<N> {
        self(step, predicted)
    }
}

/// A lazy, restartable autoregressive rollout.
///
/// Iterating yields the seed followed by each prediction. The iterator knows
/// its exact length up front.
#[derive(Debug, Clone)]
pub struct Rollout<'a, M, H, const N: usize> {
    model: &'a M,
    hook: H,
    seed: State<N>,
    current: State<N>,
    step: usize,
    steps: usize,
    seed_emitted: bool,
}

impl<'a, M, const N: usize> Rollout<'a, M, (), N>
where
    M: Predict<N>,
{
    /// Creates a rollout of `steps` predictions starting from `seed`.
    pub fn new(model: &'a M, seed: State<N>, steps: usize) -> Self {
        Self {
            model,
            hook: (),
            seed,
            current: seed,
            step: 0,
            steps,
            seed_emitted: false,
        }
    }

    /// Creates a rollout with one prediction per point of `grid`.
    pub fn over(model: &'a M, seed: State<N>, grid: &TimeGrid) -> Self {
        Self::new(model, seed, grid.len())
    }
}

impl<'a, M, H, const N: usize> Rollout<'a, M, H, N>
where
    M: Predict<N>,
    H: RolloutHook<N>,
{
    /// Replaces the hook applied to each prediction.
    pub fn with_hook<G: RolloutHook<N>>(self, hook: G) -> Rollout<'a, M, G, N> {
        Rollout {
            model: self.model,
            hook,
            seed: self.seed,
            current: self.current,
            step: self.step,
            steps: self.steps,
            seed_emitted: self.seed_emitted,
        }
    }

    #[must_use]
    pub fn phase(&self) -> Phase {
        if self.step >= self.steps {
            Phase::Finished
        } else if self.step == 0 {
            Phase::Seeded
        } else {
            Phase::Advancing
        }
    }

    #[must_use]
    pub fn seed(&self) -> &State<N> {
        &self.seed
    }

    /// Returns the state the next prediction will be made from.
    #[must_use]
    pub fn current(&self) -> &State<N> {
        &self.current
    }

    /// Returns the number of predictions made so far.
    #[must_use]
    pub fn step(&self) -> usize {
        self.step
    }

    /// Returns the total number of predictions.
    #[must_use]
    pub fn steps(&self) -> usize {
        self.steps
    }

    /// Makes one prediction from the current state and makes it current.
    ///
    /// Returns `None` once every prediction has been made.
    pub fn advance(&mut self) -> Option<State<N>> {
        if self.step >= self.steps {
            return None;
        }

        self.step += 1;
        let predicted = self.model.predict(&self.current);
        self.current = self.hook.after_step(self.step, predicted);
        Some(self.current)
    }

    /// Rewinds to the seed so the rollout can be replayed.
    pub fn restart(&mut self) {
        self.current = self.seed;
        self.step = 0;
        self.seed_emitted = false;
    }
}

impl<M, H, const N: usize> Iterator for Rollout<'_, M, H, N>
where
    M: Predict<N>,
    H: RolloutHook<N>,
{
    type Item = State<N>;

    fn next(&mut self) -> Option<Self::Item> {
        if !self.seed_emitted {
            self.seed_emitted = true;
            return Some(self.seed);
        }
        self.advance()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = usize::from(!self.seed_emitted) + (self.steps - self.step);
        (remaining, Some(remaining))
    }
}

impl<M, H, const N: usize> ExactSizeIterator for Rollout<'_, M, H, N>
where
    M: Predict<N>,
    H: RolloutHook<N>,
{
}

impl<M, H, const N: usize> FusedIterator for Rollout<'_, M, H, N>
where
    M: Predict<N>,
    H: RolloutHook<N>,
{
}

/// Rolls `model` out from `seed` with one prediction per point of `grid`.
///
/// The result has `grid.len() + 1` states.
pub fn rollout<M: Predict<N>, const N: usize>(model: &M, seed: State<N>, grid: &TimeGrid) -> Vec<State<N>> {
    Rollout::over(model, seed, grid).collect()
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;

    fn halve(state: &State<2>) -> State<2> {
        State::new([state[0] / 2.0, state[1] / 2.0])
    }

    #[test]
    fn yields_seed_then_one_state_per_grid_point() {
        let grid = TimeGrid::new(0.0, 1.0, 5).unwrap();
        let seed = State::new([16.0, -32.0]);

        let states = rollout(&halve, seed, &grid);

        assert_eq!(states.len(), grid.len() + 1);
        assert_eq!(states[0], seed);
        assert_eq!(states[5], State::new([0.5, -1.0]));
    }

    #[test]
    fn feeds_predictions_back_without_correction() {
        let calls = Cell::new(0);
        let model = |state: &State<2>| {
            calls.set(calls.get() + 1);
            State::new([state[0] + 1.0, state[1]])
        };

        let states: Vec<_> = Rollout::new(&model, State::new([0.0, 7.0]), 3).collect();

        assert_eq!(calls.get(), 3);
        let firsts: Vec<f64> = states.iter().map(|s| s[0]).collect();
        assert_eq!(firsts, vec![0.0, 1.0, 2.0, 3.0]);
        assert!(states.iter().all(|s| s[1] == 7.0));
    }

    #[test]
    fn phases_follow_the_step_count() {
        let mut rollout = Rollout::new(&halve, State::new([1.0, 1.0]), 2);

        assert_eq!(rollout.phase(), Phase::Seeded);
        rollout.advance();
        assert_eq!(rollout.phase(), Phase::Advancing);
        rollout.advance();
        assert_eq!(rollout.phase(), Phase::Finished);
        assert_eq!(rollout.advance(), None);
        assert_eq!(rollout.current(), &State::new([0.25, 0.25]));
    }

    #[test]
    fn is_exact_size_and_restartable() {
        let mut rollout = Rollout::new(&halve, State::new([8.0, 8.0]), 4);
        assert_eq!(rollout.len(), 5);

        let first: Vec<_> = rollout.by_ref().collect();
        assert_eq!(rollout.len(), 0);
        assert_eq!(rollout.next(), None);

        rollout.restart();
        assert_eq!(rollout.phase(), Phase::Seeded);
        let second: Vec<_> = rollout.collect();
        assert_eq!(first, second);
    }

    #[test]
    fn non_finite_values_propagate_unchanged() {
        let model = |state: &State<2>| State::new([state[0] * 1e300, state[1] + f64::NAN]);

        let states = rollout(&model, State::new([1e10, 0.0]), &TimeGrid::new(0.0, 1.0, 4).unwrap());

        assert_eq!(states.len(), 5);
        assert!(states[1][0].is_infinite());
        assert!(states[4][0].is_infinite());
        assert!(states[1..].iter().all(|s| s[1].is_nan()));
    }

    #[test]
    fn hook_sees_every_prediction() {
        let mut seen = Vec::new();
        let clip = |step: usize, state: State<2>| {
            seen.push(step);
            State::new([state[0].min(3.0), state[1]])
        };
        let grow = |state: &State<2>| State::new([state[0] * 4.0, state[1]]);

        let states: Vec<_> = Rollout::new(&grow, State::new([1.0, 0.0]), 3)
            .with_hook(clip)
            .collect();

        assert_eq!(states.iter().map(|s| s[0]).collect::<Vec<_>>(), vec![1.0, 3.0, 3.0, 3.0]);
        assert_eq!(seen, vec![1, 2, 3]);
    }
}
