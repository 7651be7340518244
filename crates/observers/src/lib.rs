//! Reusable observers for flowmap training loops.
//!
//! This crate provides [`Observer`] implementations and the capability traits
//! they are written against, so one observer can serve any event type that
//! carries the data it needs.
//!
//! # Modules
//!
//! - [`traits`]: capability traits ([`HasLoss`], [`CanStopEarly`])
//!
//! # Observers
//!
//! - [`Patience`]: stops training once the monitored loss stops improving
//! - [`LogProgress`]: reports every n-th event through the `log` facade
//!
//! [`Observer`]: flowmap_core::Observer
//! [`HasLoss`]: traits::HasLoss
//! [`CanStopEarly`]: traits::CanStopEarly

mod log_progress;
mod patience;
pub mod traits;

pub use log_progress::LogProgress;
pub use patience::Patience;
