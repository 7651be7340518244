//! Mini-batch training on mean squared error.
//!
//! # Algorithm
//!
//! 1. Hold out the last `validation_fraction` of the rows for monitoring.
//!    The hold-out never contributes gradients.
//! 2. For each epoch:
//!    - Shuffle the remaining training rows.
//!    - For each mini-batch, backpropagate the MSE and apply one Adam update.
//!    - Report the mean training loss over the epoch and the validation loss
//!      at the end of the epoch as an [`Event`].
//!    - If the observer returns [`Action::StopEarly`], terminate.
//!
//! Training is stochastic through weight initialization and shuffling, both
//! drawn from the caller's RNG. Seeding that RNG makes a run reproducible.

use ndarray::{Array2, Axis};
use rand::{Rng, seq::SliceRandom};
use thiserror::Error;

use flowmap_core::Observer;

use crate::{
    adam::Adam,
    network::{Network, mse},
};

/// Configuration for surrogate training.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrainConfig {
    epochs: usize,
    batch_size: usize,
    validation_fraction: f64,
    learning_rate: f64,
}

/// Errors that can occur when validating a training config.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    #[error("epochs must be at least one")]
    Epochs,

    #[error("batch_size must be at least one")]
    BatchSize,

    #[error("validation_fraction must be in [0, 1)")]
    ValidationFraction,

    #[error("learning_rate must be finite and positive")]
    LearningRate,
}

impl Default for TrainConfig {
    fn default() -> Self {
        // Known-good values, unwrap is safe
        Self::new(20, 16, 0.1, 1e-3).unwrap()
    }
}

impl TrainConfig {
    /// Creates a new config with validated values.
    ///
    /// # Errors
    ///
    /// Returns an error if `epochs` or `batch_size` is zero, if
    /// `validation_fraction` is outside `[0, 1)`, or if `learning_rate` is not
    /// finite and positive.
    pub fn new(
        epochs: usize,
        batch_size: usize,
        validation_fraction: f64,
        learning_rate: f64,
    ) -> Result<Self, ConfigError> {
        if epochs == 0 {
            return Err(ConfigError::Epochs);
        }
        if batch_size == 0 {
            return Err(ConfigError::BatchSize);
        }
        if !(0.0..1.0).contains(&validation_fraction) {
            return Err(ConfigError::ValidationFraction);
        }
        if !learning_rate.is_finite() || learning_rate <= 0.0 {
            return Err(ConfigError::LearningRate);
        }

        Ok(Self {
            epochs,
            batch_size,
            validation_fraction,
            learning_rate,
        })
    }

    /// Returns the number of passes over the training rows.
    #[must_use]
    pub fn epochs(&self) -> usize {
        self.epochs
    }

    /// Returns the mini-batch size.
    #[must_use]
    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    /// Returns the fraction of rows held out for validation.
    #[must_use]
    pub fn validation_fraction(&self) -> f64 {
        self.validation_fraction
    }

    /// Returns the Adam learning rate.
    #[must_use]
    pub fn learning_rate(&self) -> f64 {
        self.learning_rate
    }
}

/// Control actions supported during training.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Stop after the current epoch and keep the parameters reached so far.
    StopEarly,
}

/// Event emitted at the end of every epoch.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Event {
    /// The epoch number, starting at 1.
    pub epoch: usize,

    /// Mean squared error over the epoch's training batches.
    pub loss: f64,

    /// Mean squared error on the validation hold-out, if there is one.
    pub val_loss: Option<f64>,
}

/// Indicates how training terminated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    /// Ran every configured epoch.
    Complete,

    /// Stopped early due to an observer action.
    StoppedByObserver,
}

/// Per-epoch record of a training run.
#[derive(Debug, Clone, PartialEq)]
pub struct History {
    pub status: Status,
    pub epochs: Vec<Event>,
}

impl History {
    /// Returns the event of the last completed epoch.
    #[must_use]
    pub fn last(&self) -> Option<&Event> {
        self.epochs.last()
    }
}

/// Errors that can occur during training.
#[derive(Debug, Error, Clone, Copy, PartialEq)]
pub enum TrainError {
    #[error("training set is empty")]
    EmptyDataset,

    #[error("validation hold-out leaves no training rows out of {rows}")]
    NoTrainingRows { rows: usize },

    #[error("training loss became non-finite in epoch {epoch}")]
    NonFiniteLoss { epoch: usize },
}

/// Trains `network` in place on `(inputs, targets)` rows.
pub(crate) fn fit<R, Obs>(
    network: &mut Network,
    inputs: &Array2<f64>,
    targets: &Array2<f64>,
    config: &TrainConfig,
    rng: &mut R,
    mut observer: Obs,
) -> Result<History, TrainError>
where
    R: Rng + ?Sized,
    Obs: Observer<Event, Action>,
{
    let rows = inputs.nrows();
    if rows == 0 {
        return Err(TrainError::EmptyDataset);
    }

    let train_rows = (rows as f64 * (1.0 - config.validation_fraction())).floor() as usize;
    if train_rows == 0 {
        return Err(TrainError::NoTrainingRows { rows });
    }

    let (train_x, val_x) = inputs.view().split_at(Axis(0), train_rows);
    let (train_y, val_y) = targets.view().split_at(Axis(0), train_rows);

    let mut adam = Adam::new(config.learning_rate(), network);
    let mut order: Vec<usize> = (0..train_rows).collect();
    let mut epochs = Vec::with_capacity(config.epochs());

    for epoch in 1..=config.epochs() {
        order.shuffle(rng);

        let mut total = 0.0;
        for batch in order.chunks(config.batch_size()) {
            let x = train_x.select(Axis(0), batch);
            let y = train_y.select(Axis(0), batch);

            let (loss, gradients) = network.loss_and_gradients(&x, &y);
            adam.step(network, &gradients);

            total += loss * batch.len() as f64;
        }

        let loss = total / train_rows as f64;
        if !loss.is_finite() {
            return Err(TrainError::NonFiniteLoss { epoch });
        }

        let val_loss = (val_x.nrows() > 0).then(|| mse(&network.forward(&val_x), &val_y));

        let event = Event {
            epoch,
            loss,
            val_loss,
        };
        epochs.push(event);

        if let Some(Action::StopEarly) = observer.observe(&event) {
            return Ok(History {
                status: Status::StoppedByObserver,
                epochs,
            });
        }
    }

    Ok(History {
        status: Status::Complete,
        epochs,
    })
}
