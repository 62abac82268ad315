//! Utility functions and types.
use nalgebra::Vector2;
use serde::{Deserialize, Serialize};

use crate::error::BGError;

/// A right half-open time interval [start, end).
/// An interval with start == end is empty.
#[derive(PartialEq, Debug, Clone, Copy, Serialize, Deserialize)]
pub struct TimeInterval {
    start: f64,
    end: f64,
}

impl TimeInterval {
    /// Create a time interval [start, end).
    /// Returns an error if the bounds are not finite or if end < start.
    pub fn build(start: f64, end: f64) -> Result<Self, BGError> {
        if !(start.is_finite() && end.is_finite()) {
            return Err(BGError::InvalidParameter(format!(
                "interval bounds must be finite, got [{}, {})",
                start, end
            )));
        }
        if end < start {
            return Err(BGError::InvalidParameter(format!(
                "interval end {} precedes its start {}",
                end, start
            )));
        }
        Ok(TimeInterval { start, end })
    }

    pub fn start(&self) -> f64 {
        self.start
    }

    pub fn end(&self) -> f64 {
        self.end
    }

    pub fn length(&self) -> f64 {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.end <= self.start
    }

    /// Returns true if start <= time < end.
    pub fn contains(&self, time: f64) -> bool {
        time >= self.start && time < self.end
    }

    /// The same interval without its first `margin` seconds, e.g., to skip the settling of the dynamics.
    /// The result is empty if the margin exceeds the interval length.
    pub fn skip(&self, margin: f64) -> TimeInterval {
        TimeInterval {
            start: (self.start + margin).min(self.end),
            end: self.end,
        }
    }
}

/// Rectified linear rate function.
pub fn relu(x: f64) -> f64 {
    x.max(0.0)
}

/// Returns true if both channel values are finite.
pub fn is_finite(values: &Vector2<f64>) -> bool {
    values.iter().all(|x| x.is_finite())
}

/// The number of integration steps covering the given duration.
pub fn num_steps(duration: f64, dt: f64) -> usize {
    (duration / dt).round() as usize
}
