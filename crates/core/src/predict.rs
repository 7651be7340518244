use crate::State;

/// A one-step map from the current state to a predicted next state.
///
/// Prediction is side-effect free: the same state always maps to the same
/// prediction for a fixed predictor.
pub trait Predict<const N: usize> {
    /// Predicts the state one grid step after `state`.
    fn predict(&self, state: &State<N>) -> State<N>;

    /// Predicts the next state for each of `states`, preserving order.
    ///
    /// Implementations may override this to batch the work.
    fn predict_many(&self, states: &[State<N>]) -> Vec<State<N>> {
        states.iter().map(|state| self.predict(state)).collect()
    }
}

impl<F, const N: usize> Predict<N> for F
where
    F: Fn(&State<N>) -> State<N>,
{
    fn predict(&self, state: &State<N>) -> State<N> {
        self(state)
    }
}
