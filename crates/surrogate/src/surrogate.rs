use ndarray::{Array2, ArrayView1};
use rand::Rng;
use thiserror::Error;

use flowmap_core::{Dataset, Observer, Predict, State};

use crate::{
    network::{Activation, Network, ShapeError},
    train::{self, Action, Event, History, TrainConfig, TrainError},
};

/// Hidden-layer topology of a surrogate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Architecture {
    hidden_layers: usize,
    width: usize,
}

/// Errors that can occur when validating an architecture.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum ArchitectureError {
    #[error("hidden_layers must be at least one")]
    HiddenLayers,

    #[error("width must be at least one")]
    Width,
}

impl Default for Architecture {
    fn default() -> Self {
        // Known-good values, unwrap is safe
        Self::new(4, 10).unwrap()
    }
}

impl Architecture {
    /// Creates a new architecture with `hidden_layers` layers of `width` units.
    ///
    /// # Errors
    ///
    /// Returns an error if either value is zero.
    pub fn new(hidden_layers: usize, width: usize) -> Result<Self, ArchitectureError> {
        if hidden_layers == 0 {
            return Err(ArchitectureError::HiddenLayers);
        }
        if width == 0 {
            return Err(ArchitectureError::Width);
        }

        Ok(Self {
            hidden_layers,
            width,
        })
    }

    #[must_use]
    pub fn hidden_layers(&self) -> usize {
        self.hidden_layers
    }

    #[must_use]
    pub fn width(&self) -> usize {
        self.width
    }

    /// Returns the layer widths of a network mapping `dim` values to `dim` values,
    /// input width first.
    #[must_use]
    pub fn widths(&self, dim: usize) -> Vec<usize> {
        std::iter::once(dim)
            .chain(std::iter::repeat_n(self.width, self.hidden_layers))
            .chain(std::iter::once(dim))
            .collect()
    }
}

/// A learned one-step map over `N`-variable states.
///
/// Hidden layers use ReLU and the output layer is the identity, so the
/// surrogate can predict any real-valued state.
#[derive(Debug, Clone, PartialEq)]
pub struct Surrogate<const N: usize> {
    network: Network,
}

impl<const N: usize> Surrogate<N> {
    /// Creates an untrained surrogate with freshly initialized weights.
    ///
    /// # Errors
    ///
    /// Returns an error if `N` is zero.
    pub fn new<R: Rng + ?Sized>(architecture: &Architecture, rng: &mut R) -> Result<Self, ShapeError> {
        let network = Network::mlp(
            &architecture.widths(N),
            Activation::Relu,
            Activation::Identity,
            rng,
        )?;
        Ok(Self { network })
    }

    /// Wraps an existing network, such as one restored from storage.
    ///
    /// # Errors
    ///
    /// Returns [`ShapeError::StateDimension`] unless the network maps `N`
    /// values to `N` values.
    pub fn from_network(network: Network) -> Result<Self, ShapeError> {
        if network.inputs() != N || network.outputs() != N {
            return Err(ShapeError::StateDimension {
                inputs: network.inputs(),
                outputs: network.outputs(),
                state: N,
            });
        }
        Ok(Self { network })
    }

    #[must_use]
    pub fn network(&self) -> &Network {
        &self.network
    }

    #[must_use]
    pub fn into_network(self) -> Network {
        self.network
    }

    /// Fits the surrogate to the pairs of `dataset`.
    ///
    /// The observer sees an [`Event`] after every epoch and may stop training
    /// early. Parameters reached before stopping are kept.
    ///
    /// # Errors
    ///
    /// Returns an error if the dataset is empty, if the validation hold-out
    /// leaves no training rows, or if the loss stops being finite.
    pub fn train<R, Obs>(
        &mut self,
        dataset: &Dataset<N>,
        config: &TrainConfig,
        rng: &mut R,
        observer: Obs,
    ) -> Result<History, TrainError>
    where
        R: Rng + ?Sized,
        Obs: Observer<Event, Action>,
    {
        train::fit(
            &mut self.network,
            &dataset.inputs(),
            &dataset.targets(),
            config,
            rng,
            observer,
        )
    }

    /// Fits the surrogate without observation.
    ///
    /// # Errors
    ///
    /// See [`Surrogate::train`].
    pub fn train_unobserved<R: Rng + ?Sized>(
        &mut self,
        dataset: &Dataset<N>,
        config: &TrainConfig,
        rng: &mut R,
    ) -> Result<History, TrainError> {
        self.train(dataset, config, rng, ())
    }
}

fn to_state<const N: usize>(row: ArrayView1<'_, f64>) -> State<N> {
    State::new(std::array::from_fn(|i| row[i]))
}

impl<const N: usize> Predict<N> for Surrogate<N> {
    fn predict(&self, state: &State<N>) -> State<N> {
        let x = Array2::from_shape_fn((1, N), |(_, j)| state[j]);
        to_state(self.network.forward(&x).row(0))
    }

    fn predict_many(&self, states: &[State<N>]) -> Vec<State<N>> {
        let x = Array2::from_shape_fn((states.len(), N), |(i, j)| states[i][j]);
        self.network.forward(&x).rows().into_iter().map(to_state).collect()
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use flowmap_core::TransitionPair;
    use rand::{SeedableRng, rngs::StdRng};

    use super::*;
    use crate::{Dense, train::Status};

    /// Pairs of the linear map `(a, b) -> (0.5 a + 0.1, -0.3 b)` on a grid.
    fn linear_map() -> Dataset<2> {
        (0..400)
            .map(|k| {
                let a = (k % 20) as f64 / 10.0 - 1.0;
                let b = (k / 20) as f64 / 10.0 - 1.0;
                TransitionPair {
                    trajectory: k / 20,
                    step: k % 20,
                    input: State::new([a, b]),
                    target: State::new([0.5 * a + 0.1, -0.3 * b]),
                }
            })
            .collect()
    }

    #[test]
    fn default_architecture_is_four_by_ten() {
        let mut rng = StdRng::seed_from_u64(0);
        let surrogate = Surrogate::<3>::new(&Architecture::default(), &mut rng).unwrap();

        let widths: Vec<_> = surrogate
            .network()
            .layers()
            .iter()
            .map(Dense::outputs)
            .collect();
        assert_eq!(widths, vec![10, 10, 10, 10, 3]);
        assert_eq!(surrogate.network().inputs(), 3);
    }

    #[test]
    fn training_reduces_loss() {
        let mut rng = StdRng::seed_from_u64(42);
        let mut surrogate = Surrogate::<2>::new(&Architecture::default(), &mut rng).unwrap();

        let history = surrogate
            .train_unobserved(&linear_map(), &TrainConfig::default(), &mut rng)
            .unwrap();

        assert_eq!(history.status, Status::Complete);
        assert_eq!(history.epochs.len(), 20);
        let first = history.epochs[0].loss;
        let last = history.last().unwrap().loss;
        assert!(last < first, "loss went from {first} to {last}");
        assert!(history.epochs.iter().all(|e| e.val_loss.is_some()));
    }

    #[test]
    fn observer_can_stop_training() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut surrogate = Surrogate::<2>::new(&Architecture::default(), &mut rng).unwrap();

        let history = surrogate
            .train(
                &linear_map(),
                &TrainConfig::default(),
                &mut rng,
                |event: &Event| (event.epoch == 2).then_some(Action::StopEarly),
            )
            .unwrap();

        assert_eq!(history.status, Status::StoppedByObserver);
        assert_eq!(history.epochs.len(), 2);
    }

    #[test]
    fn empty_dataset_is_rejected() {
        let mut rng = StdRng::seed_from_u64(0);
        let mut surrogate = Surrogate::<2>::new(&Architecture::default(), &mut rng).unwrap();

        let result = surrogate.train_unobserved(&Dataset::default(), &TrainConfig::default(), &mut rng);

        assert_eq!(result, Err(TrainError::EmptyDataset));
    }

    #[test]
    fn batched_and_single_predictions_agree() {
        let mut rng = StdRng::seed_from_u64(9);
        let surrogate = Surrogate::<3>::new(&Architecture::default(), &mut rng).unwrap();
        let states = [State::new([1.0, -2.0, 20.0]), State::new([0.0, 0.5, 3.0])];

        let batched = surrogate.predict_many(&states);

        assert_eq!(batched.len(), 2);
        for (state, predicted) in states.iter().zip(&batched) {
            let single = surrogate.predict(state);
            for j in 0..3 {
                assert_relative_eq!(single[j], predicted[j], epsilon = 1e-12);
            }
        }
    }

    #[test]
    fn restored_network_must_match_state_dimension() {
        let mut rng = StdRng::seed_from_u64(0);
        let lorenz = Surrogate::<3>::new(&Architecture::default(), &mut rng).unwrap();

        let result = Surrogate::<2>::from_network(lorenz.into_network());

        assert_eq!(
            result,
            Err(ShapeError::StateDimension {
                inputs: 3,
                outputs: 3,
                state: 2
            })
        );
    }

    #[test]
    fn architecture_rejects_zero_sizes() {
        assert_eq!(Architecture::new(0, 10), Err(ArchitectureError::HiddenLayers));
        assert_eq!(Architecture::new(4, 0), Err(ArchitectureError::Width));
    }
}
