//! Slicing trajectories into transition pairs.
//!
//! Pairs stay grouped by the trajectory they came from until the trajectories
//! have been split into train and test sets. Only a [`Split`] can flatten the
//! groups into [`Dataset`]s, so pairs cannot be shuffled across the boundary.
//!
//! [`Split`]: crate::split::Split
//! [`Dataset`]: flowmap_core::Dataset

use flowmap_core::{Trajectory, TransitionPair};

/// The transition pairs of one trajectory, in time order.
#[derive(Debug, Clone, PartialEq)]
pub struct PairGroup<const N: usize> {
    trajectory: usize,
    pairs: Vec<TransitionPair<N>>,
}

impl<const N: usize> PairGroup<N> {
    /// Slices a trajectory of length `L` into its `L - 1` adjacent pairs.
    #[must_use]
    pub fn from_trajectory(index: usize, trajectory: &Trajectory<N>) -> Self {
        let pairs = trajectory
            .states()
            .windows(2)
            .enumerate()
            .map(|(step, w)| TransitionPair {
                trajectory: index,
                step,
                input: w[0],
                target: w[1],
            })
            .collect();

        Self {
            trajectory: index,
            pairs,
        }
    }

    /// Returns the index of the source trajectory.
    #[must_use]
    pub fn trajectory(&self) -> usize {
        self.trajectory
    }

    #[must_use]
    pub fn pairs(&self) -> &[TransitionPair<N>] {
        &self.pairs
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub(crate) fn into_pairs(self) -> Vec<TransitionPair<N>> {
        self.pairs
    }
}

/// Per-trajectory pair groups, indexed by trajectory.
///
/// The group at position `i` always holds the pairs of trajectory `i`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PairGroups<const N: usize> {
    groups: Vec<PairGroup<N>>,
}

impl<const N: usize> PairGroups<N> {
    /// Builds the groups of a trajectory collection, numbering trajectories
    /// by their position.
    pub fn from_trajectories<'a>(trajectories: impl IntoIterator<Item = &'a Trajectory<N>>) -> Self {
        let groups = trajectories
            .into_iter()
            .enumerate()
            .map(|(index, trajectory)| PairGroup::from_trajectory(index, trajectory))
            .collect();
        Self { groups }
    }

    /// Builds groups from already sliced pair lists, numbering them by position.
    pub(crate) fn from_pair_lists(lists: impl IntoIterator<Item = Vec<TransitionPair<N>>>) -> Self {
        let groups = lists
            .into_iter()
            .enumerate()
            .map(|(trajectory, pairs)| PairGroup { trajectory, pairs })
            .collect();
        Self { groups }
    }

    #[must_use]
    pub fn groups(&self) -> &[PairGroup<N>] {
        &self.groups
    }

    /// Returns the group of trajectory `index`, if there is one.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&PairGroup<N>> {
        self.groups.get(index)
    }

    /// Returns the number of trajectories.
    #[must_use]
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Returns the total number of pairs across all groups.
    #[must_use]
    pub fn pair_count(&self) -> usize {
        self.groups.iter().map(PairGroup::len).sum()
    }

    pub(crate) fn into_groups(self) -> Vec<PairGroup<N>> {
        self.groups
    }
}
