//! Trajectory-level train/test splitting.
//!
//! Whole trajectories are assigned to one side of the split before any pairs
//! are flattened, so temporally adjacent pairs never straddle train and test.

use rand::{Rng, seq::SliceRandom};
use thiserror::Error;

use flowmap_core::Dataset;

use crate::pairs::PairGroups;

/// Disjoint train and test trajectory indices that together cover `0..n`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Split {
    train: Vec<usize>,
    test: Vec<usize>,
}

/// Errors that can occur when splitting.
#[derive(Debug, Error, Clone, Copy, PartialEq)]
pub enum SplitError {
    #[error("split fraction must be in (0, 1], got {0}")]
    Fraction(f64),

    #[error("trajectory {index} is outside 0..{trajectories}")]
    OutOfRange { index: usize, trajectories: usize },

    #[error("trajectory {index} is assigned more than once")]
    Duplicate { index: usize },

    #[error("trajectory {index} is not assigned to either side")]
    Unassigned { index: usize },
}

/// Returns how many of `n` trajectories a `fraction` split trains on.
///
/// # Errors
///
/// Returns [`SplitError::Fraction`] unless `fraction` is in `(0, 1]`.
pub fn train_count(n: usize, fraction: f64) -> Result<usize, SplitError> {
    if !(fraction > 0.0 && fraction <= 1.0) {
        return Err(SplitError::Fraction(fraction));
    }
    Ok(((fraction * n as f64).floor() as usize).min(n))
}

/// Shuffles the indices `0..n` and cuts them at `floor(fraction * n)`.
///
/// The first slice is the training set and the remainder the test set. The
/// floor cut leaves the test set empty only when `fraction * n` reaches `n`.
///
/// # Errors
///
/// Returns [`SplitError::Fraction`] unless `fraction` is in `(0, 1]`.
pub fn split<R: Rng + ?Sized>(n: usize, fraction: f64, rng: &mut R) -> Result<Split, SplitError> {
    let cut = train_count(n, fraction)?;

    let mut indices: Vec<usize> = (0..n).collect();
    indices.shuffle(rng);

    let test = indices.split_off(cut);

    Ok(Split {
        train: indices,
        test,
    })
}

impl Split {
    /// Creates a split from explicit index lists.
    ///
    /// # Errors
    ///
    /// Returns an error unless the lists are disjoint and together hold every
    /// index in `0..n` exactly once.
    pub fn new(n: usize, train: Vec<usize>, test: Vec<usize>) -> Result<Self, SplitError> {
        let mut seen = vec![false; n];
        for &index in train.iter().chain(&test) {
            let slot = seen.get_mut(index).ok_or(SplitError::OutOfRange {
                index,
                trajectories: n,
            })?;
            if *slot {
                return Err(SplitError::Duplicate { index });
            }
            *slot = true;
        }
        if let Some(index) = seen.iter().position(|&s| !s) {
            return Err(SplitError::Unassigned { index });
        }

        Ok(Self { train, test })
    }

    /// Returns the training trajectory indices, in shuffled order.
    #[must_use]
    pub fn train(&self) -> &[usize] {
        &self.train
    }

    /// Returns the test trajectory indices, in shuffled order.
    #[must_use]
    pub fn test(&self) -> &[usize] {
        &self.test
    }

    /// Returns the number of trajectories covered.
    #[must_use]
    pub fn len(&self) -> usize {
        self.train.len() + self.test.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<const N: usize> PairGroups<N> {
    /// Flattens the groups into train and test datasets according to `split`.
    ///
    /// Each dataset lists the pairs of its trajectories in split order, and
    /// within a trajectory in time order.
    ///
    /// # Errors
    ///
    /// Returns [`SplitError::Unassigned`] or [`SplitError::OutOfRange`] if
    /// `split` does not cover exactly these groups.
    pub fn partition(self, split: &Split) -> Result<(Dataset<N>, Dataset<N>), SplitError> {
        let n = self.len();
        if split.len() != n {
            let index = split.len().min(n);
            return Err(if split.len() < n {
                SplitError::Unassigned { index }
            } else {
                SplitError::OutOfRange {
                    index,
                    trajectories: n,
                }
            });
        }

        let mut groups: Vec<_> = self.into_groups().into_iter().map(Some).collect();
        let mut take = |indices: &[usize]| -> Result<Dataset<N>, SplitError> {
            let mut pairs = Vec::new();
            for &index in indices {
                let group = groups
                    .get_mut(index)
                    .ok_or(SplitError::OutOfRange {
                        index,
                        trajectories: n,
                    })?
                    .take()
                    .ok_or(SplitError::Duplicate { index })?;
                pairs.extend(group.into_pairs());
            }
            Ok(Dataset::new(pairs))
        };

        let train = take(split.train())?;
        let test = take(split.test())?;
        Ok((train, test))
    }
}
