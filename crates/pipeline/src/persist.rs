//! Persisted forms of the pair dataset and the trained network.
//!
//! The dataset is stored before the train/test split as one container of
//! named arrays: `<variable>_inputs` and `<variable>_outputs` for each state
//! variable, each shaped `[trajectories, trajectory length - 1]`. Row `i`
//! holds the pairs of trajectory `i` in time order. The train/test split is
//! stored beside it as the two lists of trajectory indices, so a restored
//! dataset is split the way the stored model saw it. The network is stored as
//! its list of layers. All three are JSON.

use std::{collections::BTreeMap, io};

use ndarray::Array2;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use flowmap_core::{State, TransitionPair};
use flowmap_surrogate::Network;

use crate::{
    pairs::PairGroups,
    split::{Split, SplitError},
    storage::Storage,
};

/// Storage key of the persisted dataset.
pub const DATASET_KEY: &str = "dataset.json";

/// Storage key of the persisted train/test split.
pub const SPLIT_KEY: &str = "split.json";

/// Storage key of the persisted network.
pub const MODEL_KEY: &str = "model.json";

/// Errors that can occur when saving or restoring artifacts.
#[derive(Debug, Error)]
pub enum PersistError {
    #[error("storage failed for {key}")]
    Storage {
        key: &'static str,
        #[source]
        source: io::Error,
    },

    #[error("malformed artifact {key}")]
    Json {
        key: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("dataset has no array named {name}")]
    MissingArray { name: String },

    #[error("array {name} has shape {found:?}, expected {expected:?}")]
    Shape {
        name: String,
        expected: (usize, usize),
        found: (usize, usize),
    },

    #[error("stored split does not cover the dataset")]
    Split {
        #[source]
        source: SplitError,
    },

    #[error("trajectory {trajectory} has {found} pairs, expected {expected}")]
    Ragged {
        trajectory: usize,
        expected: usize,
        found: usize,
    },
}

/// A pair dataset as named `[trajectories, pairs per trajectory]` arrays.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PairArrays {
    arrays: BTreeMap<String, Array2<f64>>,
}

fn inputs_name(variable: &str) -> String {
    format!("{variable}_inputs")
}

fn outputs_name(variable: &str) -> String {
    format!("{variable}_outputs")
}

impl PairArrays {
    /// Lays out pair groups as named arrays.
    ///
    /// # Errors
    ///
    /// Returns [`PersistError::Ragged`] unless every group has the same
    /// number of pairs.
    pub fn from_groups<const N: usize>(
        groups: &PairGroups<N>,
        variables: [&str; N],
    ) -> Result<Self, PersistError> {
        let rows = groups.len();
        let cols = groups.get(0).map_or(0, |group| group.len());

        for group in groups.groups() {
            if group.len() != cols {
                return Err(PersistError::Ragged {
                    trajectory: group.trajectory(),
                    expected: cols,
                    found: group.len(),
                });
            }
        }

        let groups = groups.groups();
        let mut arrays = BTreeMap::new();
        for (d, variable) in variables.into_iter().enumerate() {
            let inputs = Array2::from_shape_fn((rows, cols), |(i, k)| groups[i].pairs()[k].input[d]);
            let outputs =
                Array2::from_shape_fn((rows, cols), |(i, k)| groups[i].pairs()[k].target[d]);
            arrays.insert(inputs_name(variable), inputs);
            arrays.insert(outputs_name(variable), outputs);
        }

        Ok(Self { arrays })
    }

    /// Returns the array stored under `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Array2<f64>> {
        self.arrays.get(name)
    }

    /// Returns the array names in order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.arrays.keys().map(String::as_str)
    }

    /// Rebuilds pair groups, checking every array has the `expected` shape.
    ///
    /// # Errors
    ///
    /// Returns an error if an array is missing or has another shape.
    pub fn into_groups<const N: usize>(
        self,
        variables: [&str; N],
        expected: (usize, usize),
    ) -> Result<PairGroups<N>, PersistError> {
        let lookup = |name: String| -> Result<&Array2<f64>, PersistError> {
            let array = self
                .arrays
                .get(&name)
                .ok_or_else(|| PersistError::MissingArray { name: name.clone() })?;
            if array.dim() != expected {
                return Err(PersistError::Shape {
                    name,
                    expected,
                    found: array.dim(),
                });
            }
            Ok(array)
        };

        let mut inputs = Vec::with_capacity(N);
        let mut outputs = Vec::with_capacity(N);
        for variable in variables {
            inputs.push(lookup(inputs_name(variable))?);
            outputs.push(lookup(outputs_name(variable))?);
        }

        let (rows, cols) = expected;
        let lists = (0..rows).map(|i| {
            (0..cols)
                .map(|k| TransitionPair {
                    trajectory: i,
                    step: k,
                    input: State::new(std::array::from_fn(|d| inputs[d][[i, k]])),
                    target: State::new(std::array::from_fn(|d| outputs[d][[i, k]])),
                })
                .collect()
        });

        Ok(PairGroups::from_pair_lists(lists))
    }
}

/// Writes the dataset arrays under [`DATASET_KEY`].
///
/// # Errors
///
/// Returns an error if the arrays cannot be encoded or written.
pub fn save_dataset<S: Storage + ?Sized>(storage: &mut S, arrays: &PairArrays) -> Result<(), PersistError> {
    save(storage, DATASET_KEY, arrays)
}

/// Reads the dataset arrays stored under [`DATASET_KEY`].
///
/// # Errors
///
/// Returns an error if the artifact cannot be read or decoded.
pub fn load_dataset<S: Storage + ?Sized>(storage: &S) -> Result<PairArrays, PersistError> {
    load(storage, DATASET_KEY)
}

#[derive(Serialize, Deserialize)]
struct SplitIndices {
    train: Vec<usize>,
    test: Vec<usize>,
}

/// Writes the train and test trajectory indices under [`SPLIT_KEY`].
///
/// # Errors
///
/// Returns an error if the indices cannot be encoded or written.
pub fn save_split<S: Storage + ?Sized>(storage: &mut S, split: &Split) -> Result<(), PersistError> {
    let indices = SplitIndices {
        train: split.train().to_vec(),
        test: split.test().to_vec(),
    };
    save(storage, SPLIT_KEY, &indices)
}

/// Reads the split stored under [`SPLIT_KEY`] for a dataset of `trajectories`.
///
/// # Errors
///
/// Returns an error if the artifact cannot be read or decoded, or if its
/// indices do not assign each of `0..trajectories` to exactly one side.
pub fn load_split<S: Storage + ?Sized>(storage: &S, trajectories: usize) -> Result<Split, PersistError> {
    let SplitIndices { train, test } = load(storage, SPLIT_KEY)?;
    Split::new(trajectories, train, test).map_err(|source| PersistError::Split { source })
}

/// Writes a network under [`MODEL_KEY`].
///
/// # Errors
///
/// Returns an error if the network cannot be encoded or written.
pub fn save_model<S: Storage + ?Sized>(storage: &mut S, network: &Network) -> Result<(), PersistError> {
    save(storage, MODEL_KEY, network)
}

/// Reads the network stored under [`MODEL_KEY`].
///
/// Layer shapes are validated while decoding.
///
/// # Errors
///
/// Returns an error if the artifact cannot be read or is not a valid network.
pub fn load_model<S: Storage + ?Sized>(storage: &S) -> Result<Network, PersistError> {
    load(storage, MODEL_KEY)
}

fn save<S, T>(storage: &mut S, key: &'static str, value: &T) -> Result<(), PersistError>
where
    S: Storage + ?Sized,
    T: Serialize,
{
    let bytes = serde_json::to_vec(value).map_err(|source| PersistError::Json { key, source })?;
    storage
        .write(key, &bytes)
        .map_err(|source| PersistError::Storage { key, source })
}

fn load<S, T>(storage: &S, key: &'static str) -> Result<T, PersistError>
where
    S: Storage + ?Sized,
    T: for<'de> Deserialize<'de>,
{
    let bytes = storage
        .read(key)
        .map_err(|source| PersistError::Storage { key, source })?;
    serde_json::from_slice(&bytes).map_err(|source| PersistError::Json { key, source })
}

#[cfg(test)]
mod tests {
    use flowmap_core::Trajectory;
    use flowmap_surrogate::{Architecture, Surrogate};
    use rand::{SeedableRng, rngs::StdRng};

    use super::*;
    use crate::storage::Memory;

    fn groups() -> PairGroups<2> {
        let trajectories: Vec<_> = (0..3)
            .map(|i| {
                Trajectory::new(
                    (0..4)
                        .map(|k| State::new([i as f64, k as f64 * 0.5]))
                        .collect(),
                )
                .unwrap()
            })
            .collect();
        PairGroups::from_trajectories(&trajectories)
    }

    #[test]
    fn arrays_are_named_by_variable_and_shaped_by_trajectory() {
        let arrays = PairArrays::from_groups(&groups(), ["P", "F"]).unwrap();

        assert_eq!(
            arrays.names().collect::<Vec<_>>(),
            vec!["F_inputs", "F_outputs", "P_inputs", "P_outputs"]
        );
        let f_outputs = arrays.get("F_outputs").unwrap();
        assert_eq!(f_outputs.dim(), (3, 3));
        assert_eq!(f_outputs[[1, 2]], 1.5);
        assert_eq!(arrays.get("P_inputs").unwrap()[[2, 0]], 2.0);
    }

    #[test]
    fn stored_dataset_restores_the_same_groups() {
        let mut storage = Memory::new();
        let arrays = PairArrays::from_groups(&groups(), ["P", "F"]).unwrap();

        save_dataset(&mut storage, &arrays).unwrap();
        let restored = load_dataset(&storage)
            .unwrap()
            .into_groups(["P", "F"], (3, 3))
            .unwrap();

        assert_eq!(restored, groups());
    }

    #[test]
    fn restoring_with_another_shape_fails() {
        let arrays = PairArrays::from_groups(&groups(), ["P", "F"]).unwrap();

        match arrays.clone().into_groups(["P", "F"], (100, 999)) {
            Err(PersistError::Shape {
                expected, found, ..
            }) => {
                assert_eq!(expected, (100, 999));
                assert_eq!(found, (3, 3));
            }
            other => panic!("expected a shape error, got {other:?}"),
        }
        assert!(matches!(
            arrays.into_groups(["x", "y"], (3, 3)),
            Err(PersistError::MissingArray { name }) if name == "x_inputs"
        ));
    }

    #[test]
    fn ragged_groups_cannot_be_stored() {
        let trajectories = [
            Trajectory::new(vec![State::new([0.0]); 3]).unwrap(),
            Trajectory::new(vec![State::new([0.0]); 2]).unwrap(),
        ];
        let groups = PairGroups::from_trajectories(&trajectories);

        assert!(matches!(
            PairArrays::from_groups(&groups, ["y"]),
            Err(PersistError::Ragged {
                trajectory: 1,
                expected: 2,
                found: 1
            })
        ));
    }

    #[test]
    fn stored_split_restores_the_same_indices() {
        let mut storage = Memory::new();
        let split = Split::new(5, vec![3, 0, 4], vec![2, 1]).unwrap();

        save_split(&mut storage, &split).unwrap();

        assert_eq!(load_split(&storage, 5).unwrap(), split);
    }

    #[test]
    fn stored_split_must_cover_the_dataset() {
        let mut storage = Memory::new();
        save_split(&mut storage, &Split::new(3, vec![0, 2], vec![1]).unwrap()).unwrap();

        assert!(matches!(
            load_split(&storage, 4),
            Err(PersistError::Split {
                source: SplitError::Unassigned { index: 3 }
            })
        ));
        assert!(matches!(
            load_split(&storage, 2),
            Err(PersistError::Split {
                source: SplitError::OutOfRange { index: 2, .. }
            })
        ));
    }

    #[test]
    fn stored_model_restores_the_same_network() {
        let mut storage = Memory::new();
        let surrogate =
            Surrogate::<2>::new(&Architecture::default(), &mut StdRng::seed_from_u64(4)).unwrap();

        save_model(&mut storage, surrogate.network()).unwrap();

        assert_eq!(&load_model(&storage).unwrap(), surrogate.network());
    }

    #[test]
    fn missing_artifact_is_a_storage_error() {
        assert!(matches!(
            load_model(&Memory::new()),
            Err(PersistError::Storage { key: MODEL_KEY, .. })
        ));
    }
}
