//! This module provides the `Population` structure, the leaky-integrator unit composing every node of the circuit.
use nalgebra::Vector2;

use super::utils::{is_finite, relu};
use crate::error::BGError;

/// A pair of rate units (one per channel) relaxing toward their input:
/// `tau * dx/dt = -x + input`, with output `relu(x + bias)`.
#[derive(Debug, PartialEq, Clone)]
pub struct Population {
    // The population name, used in log messages.
    label: String,
    // The relaxation time constant.
    tau: f64,
    // The offset added before rectification; a positive bias makes the population tonically active.
    bias: f64,
    // The activation of each channel.
    state: Vector2<f64>,
}

impl Population {
    /// Create a population at rest.
    /// The function returns an error for a non-positive time constant or a non-finite bias.
    pub fn build(label: &str, tau: f64, bias: f64) -> Result<Self, BGError> {
        if !tau.is_finite() || tau <= 0.0 {
            return Err(BGError::InvalidParameter(format!(
                "time constant of {} must be finite and positive, got {}",
                label, tau
            )));
        }
        if !bias.is_finite() {
            return Err(BGError::InvalidParameter(format!(
                "bias of {} must be finite, got {}",
                label, bias
            )));
        }

        Ok(Population {
            label: label.to_string(),
            tau,
            bias,
            state: Vector2::zeros(),
        })
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn tau(&self) -> f64 {
        self.tau
    }

    pub fn bias(&self) -> f64 {
        self.bias
    }

    pub fn state(&self) -> &Vector2<f64> {
        &self.state
    }

    /// Returns the firing rate of each channel.
    pub fn output(&self) -> Vector2<f64> {
        self.state.add_scalar(self.bias).map(relu)
    }

    /// Relax the activation toward the input over one forward-Euler step.
    pub fn step(&mut self, input: &Vector2<f64>, dt: f64) {
        self.state += (*input - self.state) * (dt / self.tau);
    }

    pub fn is_finite(&self) -> bool {
        is_finite(&self.state)
    }

    pub fn reset(&mut self) {
        self.state = Vector2::zeros();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_population_at_rest() {
        let population = Population::build("gpi", 0.01, 0.2).unwrap();
        assert_eq!(population.label(), "gpi");
        assert_eq!(population.output(), Vector2::new(0.2, 0.2));

        let population = Population::build("stn", 0.01, -0.2).unwrap();
        assert_eq!(population.output(), Vector2::zeros());
    }

    #[test]
    fn test_population_relaxation() {
        let mut population = Population::build("striatum", 0.01, 0.0).unwrap();
        for _ in 0..1000 {
            population.step(&Vector2::new(0.7, -0.3), 1e-3);
        }
        assert_relative_eq!(population.state()[0], 0.7, epsilon = 1e-9);
        assert_relative_eq!(population.state()[1], -0.3, epsilon = 1e-9);
        assert_relative_eq!(population.output()[0], 0.7, epsilon = 1e-9);
        assert_eq!(population.output()[1], 0.0);

        population.reset();
        assert_eq!(population.state(), &Vector2::zeros());
    }

    #[test]
    fn test_monotonic_in_input() {
        let mut weak = Population::build("weak", 0.01, 0.0).unwrap();
        let mut strong = Population::build("strong", 0.01, 0.0).unwrap();
        for _ in 0..50 {
            weak.step(&Vector2::new(0.5, 0.5), 1e-3);
            strong.step(&Vector2::new(0.6, 0.6), 1e-3);
            assert!(strong.output()[0] > weak.output()[0]);
        }
    }

    #[test]
    fn test_invalid_population() {
        assert!(Population::build("bad", 0.0, 0.0).is_err());
        assert!(Population::build("bad", -0.01, 0.0).is_err());
        assert!(Population::build("bad", 0.01, f64::INFINITY).is_err());
    }
}
