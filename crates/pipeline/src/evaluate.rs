//! Error metrics for one-step predictions and rollouts.

use ndarray::{Array2, ArrayBase, Axis, Data, Ix2, Zip};

use flowmap_core::{Dataset, Predict, State};

/// One-step prediction error over a dataset.
///
/// Each metric averages uniformly over the state variables.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Metrics {
    /// Mean squared error.
    pub mse: f64,

    /// Mean absolute error.
    pub mae: f64,

    /// Coefficient of determination, averaged over variables.
    pub r2: f64,
}

/// Scores `model`'s one-step predictions on `dataset`.
///
/// Returns `None` if the dataset is empty.
pub fn score<M: Predict<N>, const N: usize>(dataset: &Dataset<N>, model: &M) -> Option<Metrics> {
    let inputs: Vec<State<N>> = dataset.pairs().iter().map(|pair| pair.input).collect();
    let predicted = model.predict_many(&inputs);

    let predicted = Array2::from_shape_fn((predicted.len(), N), |(i, j)| predicted[i][j]);
    metrics(&predicted, &dataset.targets())
}

/// Computes [`Metrics`] between equally shaped prediction and target tables.
///
/// When a target column is constant its R² is 1 for a perfect prediction and
/// 0 otherwise. Returns `None` if there are no rows or no columns.
///
/// # Panics
///
/// Panics if the shapes differ.
pub fn metrics<S, T>(predicted: &ArrayBase<S, Ix2>, target: &ArrayBase<T, Ix2>) -> Option<Metrics>
where
    S: Data<Elem = f64>,
    T: Data<Elem = f64>,
{
    assert_eq!(predicted.dim(), target.dim(), "prediction and target shapes differ");
    if predicted.is_empty() {
        return None;
    }

    let residual = predicted - target;
    let mse = residual.mapv(|r| r * r).mean()?;
    let mae = residual.mapv(f64::abs).mean()?;

    let ss_res = residual.mapv(|r| r * r).sum_axis(Axis(0));
    let means = target.mean_axis(Axis(0))?;
    let ss_tot = (target - &means).mapv(|d| d * d).sum_axis(Axis(0));

    let mut r2 = 0.0;
    Zip::from(&ss_res).and(&ss_tot).for_each(|&res, &tot| {
        r2 += if tot == 0.0 {
            if res == 0.0 { 1.0 } else { 0.0 }
        } else {
            1.0 - res / tot
        };
    });

    Some(Metrics {
        mse,
        mae,
        r2: r2 / ss_res.len() as f64,
    })
}

/// How far a rollout drifted from a reference trajectory.
#[derive(Debug, Clone, PartialEq)]
pub struct RolloutComparison<const N: usize> {
    /// Mean absolute error across variables at each compared step.
    pub per_step: Vec<f64>,

    /// Absolute error of each variable at the last compared step.
    pub final_error: [f64; N],

    /// Index of the first rollout state with a non-finite component.
    pub first_non_finite: Option<usize>,
}

impl<const N: usize> RolloutComparison<N> {
    /// Returns the mean of the per-step errors.
    #[must_use]
    pub fn mean_error(&self) -> f64 {
        self.per_step.iter().sum::<f64>() / self.per_step.len() as f64
    }
}

/// Compares a rollout with a reference trajectory over their common length.
///
/// Returns `None` if either sequence is empty.
pub fn compare_rollout<const N: usize>(
    rollout: &[State<N>],
    reference: &[State<N>],
) -> Option<RolloutComparison<N>> {
    let (last_rollout, last_reference) = rollout.iter().zip(reference).last()?;

    let per_step = rollout
        .iter()
        .zip(reference)
        .map(|(r, t)| r.iter().zip(t.iter()).map(|(a, b)| (a - b).abs()).sum::<f64>() / N as f64)
        .collect();

    Some(RolloutComparison {
        per_step,
        final_error: std::array::from_fn(|i| (last_rollout[i] - last_reference[i]).abs()),
        first_non_finite: rollout.iter().position(|s| !s.is_finite()),
    })
}
