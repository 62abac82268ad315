//! First-order low-pass synapses filtering the signals exchanged between nodes.
use nalgebra::Vector2;

use crate::error::BGError;

/// A low-pass filter `tau * dy/dt = x - y`, discretized exactly for a fixed time step.
/// A zero time constant passes the input through unchanged.
#[derive(Debug, Clone, PartialEq)]
pub struct Lowpass {
    tau: f64,
    // Fraction of the gap between input and state closed in one step.
    coefficient: f64,
    state: Vector2<f64>,
}

impl Lowpass {
    /// Create a low-pass synapse with the given time constant for the given time step.
    /// The function returns an error for a negative time constant or a non-positive time step.
    pub fn build(tau: f64, dt: f64) -> Result<Self, BGError> {
        if !tau.is_finite() || tau < 0.0 {
            return Err(BGError::InvalidParameter(format!(
                "synapse time constant must be finite and non-negative, got {}",
                tau
            )));
        }
        if !dt.is_finite() || dt <= 0.0 {
            return Err(BGError::InvalidParameter(format!(
                "time step must be finite and positive, got {}",
                dt
            )));
        }

        let coefficient = match tau > 0.0 {
            true => 1.0 - (-dt / tau).exp(),
            false => 1.0,
        };

        Ok(Lowpass {
            tau,
            coefficient,
            state: Vector2::zeros(),
        })
    }

    pub fn tau(&self) -> f64 {
        self.tau
    }

    /// Returns the current filtered value.
    pub fn state(&self) -> &Vector2<f64> {
        &self.state
    }

    /// Advance the filter by one time step and return the filtered value.
    pub fn filter(&mut self, input: &Vector2<f64>) -> Vector2<f64> {
        self.state = match self.tau > 0.0 {
            true => self.state + (*input - self.state) * self.coefficient,
            false => *input,
        };
        self.state
    }

    pub fn reset(&mut self) {
        self.state = Vector2::zeros();
    }
}
