use std::collections::BTreeSet;

use ndarray::Array2;

use crate::State;

/// A `(current state, next state)` training example.
///
/// Both states come from the same trajectory and are temporally adjacent:
/// `input` is the state at grid index `k` and `target` the state at `k + 1`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransitionPair<const N: usize> {
    /// Index of the trajectory this pair was sliced from.
    pub trajectory: usize,

    /// Grid index of `input` within its trajectory.
    pub step: usize,

    pub input: State<N>,
    pub target: State<N>,
}

/// A flat table of transition pairs, ready for training or evaluation.
///
/// Row order carries no meaning once a dataset has been flattened.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset<const N: usize> {
    pairs: Vec<TransitionPair<N>>,
}

impl<const N: usize> Dataset<N> {
    /// Creates a dataset from its pairs.
    #[must_use]
    pub fn new(pairs: Vec<TransitionPair<N>>) -> Self {
        Self { pairs }
    }

    /// Returns the pairs in the dataset.
    #[must_use]
    pub fn pairs(&self) -> &[TransitionPair<N>] {
        &self.pairs
    }

    /// Returns the number of pairs.
    #[must_use]
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    /// Returns `true` if the dataset holds no pairs.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Returns the set of trajectory indices that contributed pairs.
    #[must_use]
    pub fn trajectories(&self) -> BTreeSet<usize> {
        self.pairs.iter().map(|pair| pair.trajectory).collect()
    }

    /// Returns the inputs as a `[len, N]` matrix.
    #[must_use]
    pub fn inputs(&self) -> Array2<f64> {
        Array2::from_shape_fn((self.pairs.len(), N), |(i, j)| self.pairs[i].input[j])
    }

    /// Returns the targets as a `[len, N]` matrix.
    #[must_use]
    pub fn targets(&self) -> Array2<f64> {
        Array2::from_shape_fn((self.pairs.len(), N), |(i, j)| self.pairs[i].target[j])
    }
}

impl<const N: usize> FromIterator<TransitionPair<N>> for Dataset<N> {
    fn from_iter<T: IntoIterator<Item = TransitionPair<N>>>(iter: T) -> Self {
        Self::new(iter.into_iter().collect())
    }
}
