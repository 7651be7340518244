use thiserror::Error;

use flowmap_surrogate::{ShapeError, TrainError};

use crate::{persist::PersistError, sampler::SampleError, split::SplitError};

/// Errors that can end a pipeline run.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Sample(#[from] SampleError),

    #[error(transparent)]
    Split(#[from] SplitError),

    #[error(transparent)]
    Persist(#[from] PersistError),

    #[error("surrogate does not fit the state: {0}")]
    Shape(#[from] ShapeError),

    #[error("stored model has layer widths {found:?}, expected {expected:?}")]
    ModelMismatch {
        expected: Vec<usize>,
        found: Vec<usize>,
    },

    #[error("stored split trains on {found} trajectories, expected {expected}")]
    SplitMismatch { expected: usize, found: usize },

    #[error("training failed: {0}")]
    Train(#[from] TrainError),
}
