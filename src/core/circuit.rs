//! The action-selection loop: Cortex → Striatum → GPi → Thalamus, for two competing channels.
use log;
use nalgebra::Vector2;
use serde::{Deserialize, Serialize};

use super::basal_ganglia::{BGWeights, BasalGanglia};
use super::synapse::Lowpass;
use super::thalamus::Thalamus;
use super::utils::is_finite;
use crate::error::BGError;

/// A stage of the circuit, advanced with a fixed time step.
pub trait Node {
    /// Advance the node by one time step under the given input.
    fn step(&mut self, input: &Vector2<f64>, dt: f64);

    /// The signal the node sends downstream.
    fn output(&self) -> Vector2<f64>;

    /// Bring the node back to rest.
    fn reset(&mut self);

    /// Returns false once the node state has diverged.
    fn is_finite(&self) -> bool;
}

/// Time constants, gains and weights of the circuit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CircuitParams {
    /// Relaxation time constant of every population (in seconds).
    pub population_tau: f64,
    /// Synapse from cortex to the basal ganglia.
    pub input_synapse: f64,
    /// Synapse from the (scaled) GPi output to the thalamus.
    pub output_synapse: f64,
    /// Low-pass filter applied to recorded node outputs, except cortex.
    pub probe_synapse: f64,
    /// Inhibition between the two thalamic units, in [0, 1).
    pub mutual_inhibition: f64,
    /// Tonic drive of the thalamic units.
    pub thalamus_drive: f64,
    pub weights: BGWeights,
}

impl Default for CircuitParams {
    fn default() -> Self {
        CircuitParams {
            population_tau: 0.01,
            input_synapse: 0.02,
            output_synapse: 0.02,
            probe_synapse: 0.05,
            mutual_inhibition: 0.3,
            thalamus_drive: 1.0,
            weights: BGWeights::default(),
        }
    }
}

impl CircuitParams {
    /// Check the parameters against the integration time step.
    /// Forward-Euler relaxation is only monotonic when the time step does not exceed the population time constant.
    pub fn validate(&self, dt: f64) -> Result<(), BGError> {
        if !dt.is_finite() || dt <= 0.0 {
            return Err(BGError::InvalidParameter(format!(
                "time step must be finite and positive, got {}",
                dt
            )));
        }
        if !self.population_tau.is_finite() || self.population_tau <= 0.0 {
            return Err(BGError::InvalidParameter(format!(
                "population time constant must be finite and positive, got {}",
                self.population_tau
            )));
        }
        if dt > self.population_tau {
            return Err(BGError::InvalidParameter(format!(
                "time step {} exceeds the population time constant {}",
                dt, self.population_tau
            )));
        }
        for (name, tau) in [
            ("input", self.input_synapse),
            ("output", self.output_synapse),
            ("probe", self.probe_synapse),
        ] {
            if !tau.is_finite() || tau < 0.0 {
                return Err(BGError::InvalidParameter(format!(
                    "{} synapse time constant must be finite and non-negative, got {}",
                    name, tau
                )));
            }
        }
        self.weights.validate()
    }
}

/// Snapshot of every node output after a step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NodeOutputs {
    /// The cortical drive fed to the circuit.
    pub cortex: Vector2<f64>,
    /// The D1 striatal activity.
    pub striatum: Vector2<f64>,
    /// The GPi activity (non-negative).
    pub gpi: Vector2<f64>,
    /// The inhibitory basal ganglia output after the GPi scale, as sent to the thalamus.
    pub scaled_gpi: Vector2<f64>,
    /// The thalamic activity.
    pub thalamus: Vector2<f64>,
}

impl NodeOutputs {
    pub fn is_finite(&self) -> bool {
        [
            &self.cortex,
            &self.striatum,
            &self.gpi,
            &self.scaled_gpi,
            &self.thalamus,
        ]
        .iter()
        .all(|values| is_finite(values))
    }
}

/// The full circuit for both channels.
#[derive(Debug, Clone, PartialEq)]
pub struct Circuit {
    dt: f64,
    input_synapse: Lowpass,
    basal_ganglia: BasalGanglia,
    output_synapse: Lowpass,
    thalamus: Thalamus,
}

impl Circuit {
    /// Create a circuit at rest for the given time step.
    pub fn build(params: &CircuitParams, dt: f64) -> Result<Self, BGError> {
        params.validate(dt)?;
        let circuit = Circuit {
            dt,
            input_synapse: Lowpass::build(params.input_synapse, dt)?,
            basal_ganglia: BasalGanglia::build(params.weights.clone(), params.population_tau)?,
            output_synapse: Lowpass::build(params.output_synapse, dt)?,
            thalamus: Thalamus::build(
                params.mutual_inhibition,
                params.thalamus_drive,
                params.population_tau,
            )?,
        };
        log::debug!("Circuit built with time step {}", dt);
        Ok(circuit)
    }

    pub fn dt(&self) -> f64 {
        self.dt
    }

    pub fn basal_ganglia(&self) -> &BasalGanglia {
        &self.basal_ganglia
    }

    pub fn thalamus(&self) -> &Thalamus {
        &self.thalamus
    }

    /// Advance the circuit by one time step.
    /// The cortical drive reaches the basal ganglia through the input synapse;
    /// the basal ganglia output, multiplied by `gpi_scale`, reaches the thalamus through the output synapse.
    pub fn step(&mut self, cortex: &Vector2<f64>, gpi_scale: f64) -> NodeOutputs {
        let bg_input = self.input_synapse.filter(cortex);
        self.basal_ganglia.step(&bg_input, self.dt);

        let scaled_gpi = self.basal_ganglia.output() * gpi_scale;
        let thalamus_input = self.output_synapse.filter(&scaled_gpi);
        self.thalamus.step(&thalamus_input, self.dt);

        NodeOutputs {
            cortex: *cortex,
            striatum: self.basal_ganglia.striatum_output(),
            gpi: self.basal_ganglia.gpi_output(),
            scaled_gpi,
            thalamus: self.thalamus.output(),
        }
    }

    /// Bring every node and synapse back to rest.
    pub fn reset(&mut self) {
        self.input_synapse.reset();
        self.basal_ganglia.reset();
        self.output_synapse.reset();
        self.thalamus.reset();
    }

    pub fn is_finite(&self) -> bool {
        self.basal_ganglia.is_finite()
            && self.thalamus.is_finite()
            && is_finite(self.input_synapse.state())
            && is_finite(self.output_synapse.state())
    }
}
