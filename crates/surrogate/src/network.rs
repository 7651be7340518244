//! Dense feed-forward networks.
//!
//! A [`Network`] is a chain of [`Dense`] layers. Each layer computes
//! `activation(x · W + b)` for a batch `x` of row vectors, with `W` shaped
//! `[inputs, outputs]`. Networks serialize as a list of layers, which records
//! both the topology and the trained parameters.

use ndarray::{Array1, Array2, ArrayBase, Axis, Data, Ix2};
use ndarray_rand::{RandomExt, rand_distr::Uniform};
use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Element-wise activation applied after a layer's affine map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Activation {
    /// Rectified linear unit, `max(z, 0)`. NaN passes through unchanged.
    Relu,

    /// Identity, for unbounded real outputs.
    Identity,
}

impl Activation {
    fn apply(self, z: &Array2<f64>) -> Array2<f64> {
        match self {
            Activation::Relu => z.mapv(|v| if v < 0.0 { 0.0 } else { v }),
            Activation::Identity => z.clone(),
        }
    }

    fn derivative(self, z: &Array2<f64>) -> Array2<f64> {
        match self {
            Activation::Relu => z.mapv(|v| if v > 0.0 { 1.0 } else { 0.0 }),
            Activation::Identity => Array2::ones(z.raw_dim()),
        }
    }
}

/// Errors describing a network whose shapes do not fit together.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum ShapeError {
    #[error("network needs at least one layer")]
    Empty,

    #[error("layer {layer} has a zero-sized dimension")]
    ZeroWidth { layer: usize },

    #[error("layer {layer} has {outputs} outputs but {biases} biases")]
    Bias {
        layer: usize,
        outputs: usize,
        biases: usize,
    },

    #[error("layer {layer} expects {expected} inputs but receives {found}")]
    Chain {
        layer: usize,
        expected: usize,
        found: usize,
    },

    #[error("network maps {inputs} -> {outputs} values but the state has {state} variables")]
    StateDimension {
        inputs: usize,
        outputs: usize,
        state: usize,
    },
}

/// A fully connected layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dense {
    pub(crate) weights: Array2<f64>,
    pub(crate) bias: Array1<f64>,
    pub(crate) activation: Activation,
}

impl Dense {
    /// Creates a layer from explicit parameters.
    ///
    /// Shapes are checked when the layer is placed in a [`Network`].
    #[must_use]
    pub fn new(weights: Array2<f64>, bias: Array1<f64>, activation: Activation) -> Self {
        Self {
            weights,
            bias,
            activation,
        }
    }

    /// Creates a layer with Glorot-uniform weights and zero biases.
    ///
    /// Weights are drawn from `U(-l, l)` with `l = sqrt(6 / (inputs + outputs))`.
    ///
    /// # Panics
    ///
    /// Panics if `inputs + outputs` is zero.
    pub fn glorot<R: Rng + ?Sized>(
        inputs: usize,
        outputs: usize,
        activation: Activation,
        rng: &mut R,
    ) -> Self {
        let limit = (6.0 / (inputs + outputs) as f64).sqrt();
        Self {
            weights: Array2::random_using((inputs, outputs), Uniform::new(-limit, limit), rng),
            bias: Array1::zeros(outputs),
            activation,
        }
    }

    #[must_use]
    pub fn inputs(&self) -> usize {
        self.weights.nrows()
    }

    #[must_use]
    pub fn outputs(&self) -> usize {
        self.weights.ncols()
    }

    #[must_use]
    pub fn activation(&self) -> Activation {
        self.activation
    }

    #[must_use]
    pub fn weights(&self) -> &Array2<f64> {
        &self.weights
    }

    #[must_use]
    pub fn bias(&self) -> &Array1<f64> {
        &self.bias
    }

    fn pre_activation<S: Data<Elem = f64>>(&self, x: &ArrayBase<S, Ix2>) -> Array2<f64> {
        x.dot(&self.weights) + &self.bias
    }
}

/// Parameter gradients for one [`Dense`] layer.
#[derive(Debug, Clone)]
pub(crate) struct Gradient {
    pub(crate) weights: Array2<f64>,
    pub(crate) bias: Array1<f64>,
}

/// A chain of dense layers with validated shapes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Dense>", into = "Vec<Dense>")]
pub struct Network {
    layers: Vec<Dense>,
}

impl Network {
    /// Creates a network from its layers, in forward order.
    ///
    /// # Errors
    ///
    /// Returns an error if there are no layers, a layer has a zero-sized
    /// dimension, a bias does not match its layer's width, or consecutive
    /// layers do not chain.
    pub fn new(layers: Vec<Dense>) -> Result<Self, ShapeError> {
        if layers.is_empty() {
            return Err(ShapeError::Empty);
        }

        for (layer, dense) in layers.iter().enumerate() {
            if dense.inputs() == 0 || dense.outputs() == 0 {
                return Err(ShapeError::ZeroWidth { layer });
            }
            if dense.bias.len() != dense.outputs() {
                return Err(ShapeError::Bias {
                    layer,
                    outputs: dense.outputs(),
                    biases: dense.bias.len(),
                });
            }
        }

        for (layer, pair) in layers.windows(2).enumerate() {
            if pair[0].outputs() != pair[1].inputs() {
                return Err(ShapeError::Chain {
                    layer: layer + 1,
                    expected: pair[1].inputs(),
                    found: pair[0].outputs(),
                });
            }
        }

        Ok(Self { layers })
    }

    /// Creates a multilayer perceptron through the given widths.
    ///
    /// `widths` lists the input width, each hidden width, and the output width.
    /// Hidden layers use `hidden`; the last layer uses `output`.
    ///
    /// # Errors
    ///
    /// Returns an error if fewer than two widths are given or any width is zero.
    pub fn mlp<R: Rng + ?Sized>(
        widths: &[usize],
        hidden: Activation,
        output: Activation,
        rng: &mut R,
    ) -> Result<Self, ShapeError> {
        if widths.len() < 2 {
            return Err(ShapeError::Empty);
        }
        if let Some(layer) = widths.iter().position(|&w| w == 0) {
            return Err(ShapeError::ZeroWidth {
                layer: layer.saturating_sub(1),
            });
        }

        let last = widths.len() - 2;
        let layers = widths
            .windows(2)
            .enumerate()
            .map(|(i, w)| {
                let activation = if i == last { output } else { hidden };
                Dense::glorot(w[0], w[1], activation, rng)
            })
            .collect();

        Self::new(layers)
    }

    /// Returns the layers in forward order.
    #[must_use]
    pub fn layers(&self) -> &[Dense] {
        &self.layers
    }

    pub(crate) fn layers_mut(&mut self) -> &mut [Dense] {
        &mut self.layers
    }

    /// Returns the input width.
    #[must_use]
    pub fn inputs(&self) -> usize {
        self.layers[0].inputs()
    }

    /// Returns the output width.
    #[must_use]
    pub fn outputs(&self) -> usize {
        self.layers[self.layers.len() - 1].outputs()
    }

    /// Runs a batch of row vectors through the network.
    ///
    /// # Panics
    ///
    /// Panics if `x` does not have [`Network::inputs`] columns.
    pub fn forward<S: Data<Elem = f64>>(&self, x: &ArrayBase<S, Ix2>) -> Array2<f64> {
        let (first, rest) = self.layers.split_at(1);
        let a = first[0].activation.apply(&first[0].pre_activation(x));
        rest.iter()
            .fold(a, |a, layer| layer.activation.apply(&layer.pre_activation(&a)))
    }

    /// Returns the mean squared error of a batch and the gradient of every layer.
    pub(crate) fn loss_and_gradients<S, T>(
        &self,
        x: &ArrayBase<S, Ix2>,
        y: &ArrayBase<T, Ix2>,
    ) -> (f64, Vec<Gradient>)
    where
        S: Data<Elem = f64>,
        T: Data<Elem = f64>,
    {
        let depth = self.layers.len();
        let mut inputs = Vec::with_capacity(depth);
        let mut pre_activations = Vec::with_capacity(depth);

        let mut a = x.to_owned();
        for layer in &self.layers {
            let z = layer.pre_activation(&a);
            let next = layer.activation.apply(&z);
            inputs.push(a);
            pre_activations.push(z);
            a = next;
        }

        let diff = a - y;
        let count = diff.len() as f64;
        let loss = diff.mapv(|d| d * d).sum() / count;

        let mut grad_a = diff * (2.0 / count);
        let mut gradients = Vec::with_capacity(depth);

        for ((layer, input), z) in self.layers.iter().zip(&inputs).zip(&pre_activations).rev() {
            let grad_z = grad_a * &layer.activation.derivative(z);
            gradients.push(Gradient {
                weights: input.t().dot(&grad_z),
                bias: grad_z.sum_axis(Axis(0)),
            });
            grad_a = grad_z.dot(&layer.weights.t());
        }

        gradients.reverse();
        (loss, gradients)
    }
}

impl TryFrom<Vec<Dense>> for Network {
    type Error = ShapeError;

    fn try_from(layers: Vec<Dense>) -> Result<Self, Self::Error> {
        Self::new(layers)
    }
}

impl From<Network> for Vec<Dense> {
    fn from(network: Network) -> Self {
        network.layers
    }
}

/// Returns the mean squared error between two equally shaped matrices.
///
/// # Panics
///
/// Panics if the shapes differ.
pub fn mse<S, T>(predicted: &ArrayBase<S, Ix2>, target: &ArrayBase<T, Ix2>) -> f64
where
    S: Data<Elem = f64>,
    T: Data<Elem = f64>,
{
    let diff = predicted - target;
    diff.mapv(|d| d * d).mean().unwrap_or(f64::NAN)
}
