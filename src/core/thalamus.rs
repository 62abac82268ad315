//! The thalamic relay: tonically driven action units, gated by the inhibitory GPi output.
use nalgebra::{Matrix2, Vector2};

use super::circuit::Node;
use super::population::Population;
use crate::error::BGError;

/// The thalamus of both channels.
/// Each unit receives a tonic drive, the (negative) basal ganglia output, and the inhibition of the other unit.
#[derive(Debug, Clone, PartialEq)]
pub struct Thalamus {
    actions: Population,
    // (I - 1) * mutual_inhibition: each unit inhibits the other, not itself.
    inhibition: Matrix2<f64>,
    tonic_drive: f64,
}

impl Thalamus {
    /// Create a thalamus at rest.
    /// The mutual inhibition must lie in [0, 1): equal inputs then always settle to equal outputs,
    /// whatever channel was selected before. From 1 upward, the units latch the current winner.
    /// The function returns an error for a mutual inhibition outside [0, 1) or a non-finite tonic drive.
    pub fn build(mutual_inhibition: f64, tonic_drive: f64, tau: f64) -> Result<Self, BGError> {
        if !(0.0..1.0).contains(&mutual_inhibition) {
            return Err(BGError::InvalidParameter(format!(
                "thalamic mutual inhibition must lie in [0, 1), got {}",
                mutual_inhibition
            )));
        }
        if !tonic_drive.is_finite() {
            return Err(BGError::InvalidParameter(format!(
                "thalamic tonic drive must be finite, got {}",
                tonic_drive
            )));
        }

        let inhibition = (Matrix2::identity() - Matrix2::from_element(1.0)) * mutual_inhibition;
        Ok(Thalamus {
            actions: Population::build("thalamus", tau, 0.0)?,
            inhibition,
            tonic_drive,
        })
    }

    pub fn mutual_inhibition(&self) -> f64 {
        -self.inhibition[(0, 1)]
    }

    pub fn tonic_drive(&self) -> f64 {
        self.tonic_drive
    }
}

impl Node for Thalamus {
    fn step(&mut self, bg_output: &Vector2<f64>, dt: f64) {
        let input = bg_output.add_scalar(self.tonic_drive) + self.inhibition * self.actions.output();
        self.actions.step(&input, dt);
    }

    fn output(&self) -> Vector2<f64> {
        self.actions.output()
    }

    fn reset(&mut self) {
        self.actions.reset();
    }

    fn is_finite(&self) -> bool {
        self.actions.is_finite()
    }
}
