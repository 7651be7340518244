use thiserror::Error;

/// A uniformly spaced grid of sample times, including both endpoints.
///
/// The grid behaves like a linspace: `points` times from `start` to `end`
/// inclusive, so the spacing is `(end - start) / (points - 1)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeGrid {
    start: f64,
    end: f64,
    points: usize,
}

/// Errors that can occur when constructing a [`TimeGrid`].
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum GridError {
    #[error("grid endpoints must be finite")]
    NonFinite,

    #[error("grid end must be greater than its start")]
    Reversed,

    #[error("grid needs at least two points")]
    TooFewPoints,
}

impl TimeGrid {
    /// Creates a grid of `points` times spanning `[start, end]`.
    ///
    /// # Errors
    ///
    /// Returns an error if an endpoint is non-finite, if `end <= start`, or if
    /// fewer than two points are requested.
    pub fn new(start: f64, end: f64, points: usize) -> Result<Self, GridError> {
        if !start.is_finite() || !end.is_finite() {
            return Err(GridError::NonFinite);
        }
        if end <= start {
            return Err(GridError::Reversed);
        }
        if points < 2 {
            return Err(GridError::TooFewPoints);
        }

        Ok(Self { start, end, points })
    }

    /// Returns the first time on the grid.
    #[must_use]
    pub fn start(&self) -> f64 {
        self.start
    }

    /// Returns the last time on the grid.
    #[must_use]
    pub fn end(&self) -> f64 {
        self.end
    }

    /// Returns the number of grid points.
    #[must_use]
    pub fn len(&self) -> usize {
        self.points
    }

    /// Always `false`: a valid grid has at least two points.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Returns the nominal spacing between consecutive grid points.
    #[must_use]
    pub fn step(&self) -> f64 {
        (self.end - self.start) / (self.points - 1) as f64
    }

    /// Returns the time at grid index `index`.
    ///
    /// The last index maps exactly onto `end`.
    #[must_use]
    pub fn time(&self, index: usize) -> f64 {
        if index + 1 == self.points {
            return self.end;
        }
        self.start + (self.end - self.start) * index as f64 / (self.points - 1) as f64
    }

    /// Returns an iterator over every time on the grid.
    pub fn times(&self) -> impl ExactSizeIterator<Item = f64> + '_ {
        (0..self.points).map(|i| self.time(i))
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    #[test]
    fn matches_linspace() {
        let grid = TimeGrid::new(0.0, 25.0, 10_000).unwrap();

        assert_eq!(grid.len(), 10_000);
        assert_relative_eq!(grid.step(), 25.0 / 9_999.0);
        assert_relative_eq!(grid.time(0), 0.0);
        assert_relative_eq!(grid.time(1), 25.0 / 9_999.0);
        assert_eq!(grid.time(9_999), 25.0);
    }

    #[test]
    fn times_cover_both_endpoints() {
        let grid = TimeGrid::new(1.0, 2.0, 5).unwrap();
        let times: Vec<f64> = grid.times().collect();

        assert_eq!(times.len(), 5);
        assert_relative_eq!(times[0], 1.0);
        assert_relative_eq!(times[2], 1.5);
        assert_eq!(times[4], 2.0);
    }

    #[test]
    fn rejects_invalid_grids() {
        assert_eq!(TimeGrid::new(0.0, f64::NAN, 10), Err(GridError::NonFinite));
        assert_eq!(TimeGrid::new(1.0, 1.0, 10), Err(GridError::Reversed));
        assert_eq!(TimeGrid::new(0.0, 1.0, 1), Err(GridError::TooFewPoints));
    }
}
