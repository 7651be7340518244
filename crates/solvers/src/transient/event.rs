use flowmap_core::State;

/// Event emitted by the transient solvers for each grid point.
///
/// Step 0 is the initial state before any integration.
/// Steps 1..N are emitted after each integration step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Event<const N: usize> {
    /// The grid index (0 for the initial state).
    pub step: usize,

    /// The grid time at this step.
    pub time: f64,

    /// The state at this step.
    pub state: State<N>,
}
