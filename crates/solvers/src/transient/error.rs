use flowmap_core::TrajectoryError;

/// Errors that can occur during fixed-grid integration.
#[derive(Debug, Clone, Copy, PartialEq, thiserror::Error)]
pub enum Error {
    /// The integrated state left the finite range, typically because the
    /// system is stiff or divergent at the requested step size.
    #[error("state became non-finite at step {step} (t = {time})")]
    NonFinite { step: usize, time: f64 },

    #[error(transparent)]
    Trajectory(#[from] TrajectoryError),
}
