use ndarray::{Array, Array1, Array2, Dimension, Zip};

use crate::network::{Gradient, Network};

const BETA1: f64 = 0.9;
const BETA2: f64 = 0.999;
const EPSILON: f64 = 1e-7;

/// First and second moment estimates for one layer.
#[derive(Debug, Clone)]
struct Moments {
    m_w: Array2<f64>,
    v_w: Array2<f64>,
    m_b: Array1<f64>,
    v_b: Array1<f64>,
}

/// Adam optimizer state for a [`Network`].
#[derive(Debug, Clone)]
pub(crate) struct Adam {
    learning_rate: f64,
    t: i32,
    moments: Vec<Moments>,
}

/// Bias-corrected hyperparameters for a single update.
#[derive(Debug, Clone, Copy)]
struct Step {
    learning_rate: f64,
    correction1: f64,
    correction2: f64,
}

impl Adam {
    /// Creates zeroed moment estimates shaped like `network`.
    pub(crate) fn new(learning_rate: f64, network: &Network) -> Self {
        let moments = network
            .layers()
            .iter()
            .map(|layer| Moments {
                m_w: Array2::zeros(layer.weights().raw_dim()),
                v_w: Array2::zeros(layer.weights().raw_dim()),
                m_b: Array1::zeros(layer.bias().raw_dim()),
                v_b: Array1::zeros(layer.bias().raw_dim()),
            })
            .collect();

        Self {
            learning_rate,
            t: 0,
            moments,
        }
    }

    /// Applies one update to every layer of `network`.
    pub(crate) fn step(&mut self, network: &mut Network, gradients: &[Gradient]) {
        self.t += 1;
        let step = Step {
            learning_rate: self.learning_rate,
            correction1: 1.0 - BETA1.powi(self.t),
            correction2: 1.0 - BETA2.powi(self.t),
        };

        for ((layer, gradient), moments) in network
            .layers_mut()
            .iter_mut()
            .zip(gradients)
            .zip(&mut self.moments)
        {
            update(
                &mut layer.weights,
                &gradient.weights,
                &mut moments.m_w,
                &mut moments.v_w,
                step,
            );
            update(
                &mut layer.bias,
                &gradient.bias,
                &mut moments.m_b,
                &mut moments.v_b,
                step,
            );
        }
    }
}

fn update<D: Dimension>(
    param: &mut Array<f64, D>,
    grad: &Array<f64, D>,
    m: &mut Array<f64, D>,
    v: &mut Array<f64, D>,
    step: Step,
) {
    Zip::from(param)
        .and(grad)
        .and(m)
        .and(v)
        .for_each(|p, &g, m, v| {
            *m = BETA1 * *m + (1.0 - BETA1) * g;
            *v = BETA2 * *v + (1.0 - BETA2) * g * g;

            let m_hat = *m / step.correction1;
            let v_hat = *v / step.correction2;

            *p -= step.learning_rate * m_hat / (v_hat.sqrt() + EPSILON);
        });
}
