//! Capability traits for cross-solver observers.
//!
//! These traits abstract over concrete event and action types, so observers
//! can be written once and reused by any loop that reports the same data.
//!
//! # Event traits
//!
//! - [`HasLoss`]: events that report a training loss
//!
//! # Action traits
//!
//! - [`CanStopEarly`]: actions that can signal early termination
//!
//! # Example
//!
//! ```rust
//! use flowmap_core::Observer;
//! use flowmap_observers::traits::{CanStopEarly, HasLoss};
//!
//! struct GoodEnough {
//!     tolerance: f64,
//! }
//!
//! impl<E: HasLoss, A: CanStopEarly> Observer<E, A> for GoodEnough {
//!     fn observe(&mut self, event: &E) -> Option<A> {
//!         (event.monitored_loss() < self.tolerance).then(A::stop_early)
//!     }
//! }
//! ```

use flowmap_surrogate::train;

/// An event that reports a loss at the end of a training epoch.
pub trait HasLoss {
    /// Returns the epoch number, starting at 1.
    fn epoch(&self) -> usize;

    /// Returns the training loss.
    fn loss(&self) -> f64;

    /// Returns the validation loss, if one was computed.
    fn val_loss(&self) -> Option<f64>;

    /// Returns the validation loss when available, otherwise the training loss.
    fn monitored_loss(&self) -> f64 {
        self.val_loss().unwrap_or_else(|| self.loss())
    }
}

/// An action type that can signal early termination.
pub trait CanStopEarly {
    /// Returns the action that stops the run early.
    fn stop_early() -> Self;
}

// --- HasLoss for train::Event ---

impl HasLoss for train::Event {
    fn epoch(&self) -> usize {
        self.epoch
    }

    fn loss(&self) -> f64 {
        self.loss
    }

    fn val_loss(&self) -> Option<f64> {
        self.val_loss
    }
}

// --- CanStopEarly for train::Action ---

impl CanStopEarly for train::Action {
    fn stop_early() -> Self {
        Self::StopEarly
    }
}
