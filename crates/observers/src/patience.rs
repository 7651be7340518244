use flowmap_core::Observer;

use crate::traits::{CanStopEarly, HasLoss};

/// Stops training once the monitored loss has not improved for a number of
/// consecutive epochs.
///
/// The monitored loss is the validation loss when the event carries one and
/// the training loss otherwise. An epoch counts as an improvement when its
/// loss beats the best seen so far by more than `min_delta`.
#[derive(Debug, Clone, PartialEq)]
pub struct Patience {
    patience: usize,
    min_delta: f64,
    best: f64,
    stale: usize,
}

impl Patience {
    /// Creates an observer that tolerates `patience` epochs without improvement.
    #[must_use]
    pub fn new(patience: usize) -> Self {
        Self::with_min_delta(patience, 0.0)
    }

    /// Creates an observer that only counts improvements larger than `min_delta`.
    #[must_use]
    pub fn with_min_delta(patience: usize, min_delta: f64) -> Self {
        Self {
            patience,
            min_delta: min_delta.abs(),
            best: f64::INFINITY,
            stale: 0,
        }
    }

    /// Returns the best monitored loss seen so far.
    #[must_use]
    pub fn best(&self) -> f64 {
        self.best
    }
}

impl<E: HasLoss, A: CanStopEarly> Observer<E, A> for Patience {
    fn observe(&mut self, event: &E) -> Option<A> {
        let loss = event.monitored_loss();

        if loss < self.best - self.min_delta {
            self.best = loss;
            self.stale = 0;
            return None;
        }

        self.stale += 1;
        (self.stale > self.patience).then(A::stop_early)
    }
}

#[cfg(test)]
mod tests {
    use flowmap_surrogate::train::{Action, Event};

    use super::*;

    fn event(epoch: usize, loss: f64, val_loss: Option<f64>) -> Event {
        Event {
            epoch,
            loss,
            val_loss,
        }
    }

    #[test]
    fn stops_after_patience_runs_out() {
        let mut patience = Patience::new(2);
        let losses = [1.0, 0.5, 0.6, 0.55, 0.7];

        let actions: Vec<Option<Action>> = losses
            .iter()
            .enumerate()
            .map(|(i, &loss)| patience.observe(&event(i + 1, loss, None)))
            .collect();

        assert_eq!(actions, vec![None, None, None, None, Some(Action::StopEarly)]);
        assert_eq!(patience.best(), 0.5);
    }

    #[test]
    fn prefers_validation_loss() {
        let mut patience = Patience::new(0);

        let first: Option<Action> = patience.observe(&event(1, 1.0, Some(0.2)));
        let second: Option<Action> = patience.observe(&event(2, 0.1, Some(0.3)));

        assert_eq!(first, None);
        assert_eq!(second, Some(Action::StopEarly));
    }

    #[test]
    fn small_improvements_are_stale_under_min_delta() {
        let mut patience = Patience::with_min_delta(1, 0.1);

        let _: Option<Action> = patience.observe(&event(1, 1.0, None));
        let second: Option<Action> = patience.observe(&event(2, 0.95, None));
        let third: Option<Action> = patience.observe(&event(3, 0.93, None));

        assert_eq!(second, None);
        assert_eq!(third, Some(Action::StopEarly));
    }
}
