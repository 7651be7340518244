use log::{Level, log, log_enabled};

use flowmap_core::Observer;

use crate::traits::HasLoss;

/// Logs training progress through the `log` facade.
///
/// Every `every`-th epoch is reported at the configured level, and so is the
/// first epoch. The observer never returns an action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LogProgress {
    every: usize,
    level: Level,
}

impl Default for LogProgress {
    fn default() -> Self {
        Self::new(1)
    }
}

impl LogProgress {
    /// Creates an observer that logs every `every` epochs at info level.
    ///
    /// An interval of zero is treated as one.
    #[must_use]
    pub fn new(every: usize) -> Self {
        Self {
            every: every.max(1),
            level: Level::Info,
        }
    }

    /// Sets the level records are emitted at.
    #[must_use]
    pub fn level(mut self, level: Level) -> Self {
        self.level = level;
        self
    }

    fn due(&self, epoch: usize) -> bool {
        epoch == 1 || epoch % self.every == 0
    }
}

impl<E: HasLoss, A> Observer<E, A> for LogProgress {
    fn observe(&mut self, event: &E) -> Option<A> {
        if !self.due(event.epoch()) || !log_enabled!(self.level) {
            return None;
        }

        match event.val_loss() {
            Some(val_loss) => log!(
                self.level,
                "epoch {}: loss={:.6e} val_loss={:.6e}",
                event.epoch(),
                event.loss(),
                val_loss
            ),
            None => log!(self.level, "epoch {}: loss={:.6e}", event.epoch(), event.loss()),
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reports_first_and_every_nth_epoch() {
        let progress = LogProgress::new(5);

        let due: Vec<usize> = (1..=12).filter(|&epoch| progress.due(epoch)).collect();

        assert_eq!(due, vec![1, 5, 10]);
    }

    #[test]
    fn zero_interval_logs_every_epoch() {
        let progress = LogProgress::new(0).level(Level::Debug);

        assert!((1..=4).all(|epoch| progress.due(epoch)));
    }
}
