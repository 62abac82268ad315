//! The basal ganglia stage: striatum, subthalamic nucleus (STN), GPe and GPi.
//!
//! The connectivity follows the Gurney, Prescott & Redgrave (2001) model of action selection:
//!
//! - the striatum is split into D1 (selection) and D2 (control) populations driven by cortex;
//! - D1 inhibits the GPi and D2 inhibits the GPe of the same channel;
//! - the STN, driven by cortex and inhibited by the GPe, excites the GPe and GPi of *all* channels;
//! - the GPe inhibits the STN and the GPi of the same channel.
//!
//! The diffuse STN excitation is what makes channels compete: raising the drive of one channel
//! raises the GPi activity of the other, while its own D1 inhibition silences its own GPi.
//! The stage output is the GPi activity times a negative output weight, i.e., an inhibitory signal.
use nalgebra::Vector2;
use serde::{Deserialize, Serialize};

use super::circuit::Node;
use super::population::Population;
use crate::error::BGError;

/// Connection weights and biases of the basal ganglia stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BGWeights {
    /// Cortical gain onto the D1 striatum (dopamine-enhanced).
    pub d1_gain: f64,
    /// Cortical gain onto the D2 striatum (dopamine-attenuated).
    pub d2_gain: f64,
    /// Cortical gain onto the STN.
    pub stn_gain: f64,
    /// Striatal inhibition of the GPi (from D1) and of the GPe (from D2).
    pub striatum_weight: f64,
    /// Diffuse STN excitation of the GPe and GPi.
    pub stn_weight: f64,
    /// GPe inhibition of the GPi.
    pub gpe_gpi_weight: f64,
    /// GPe inhibition of the STN.
    pub gpe_stn_weight: f64,
    pub striatum_bias: f64,
    pub stn_bias: f64,
    pub gpe_bias: f64,
    pub gpi_bias: f64,
    /// Scaling of the GPi activity into the stage output (negative, i.e., inhibitory).
    pub output_weight: f64,
}

impl Default for BGWeights {
    fn default() -> Self {
        BGWeights {
            d1_gain: 1.2,
            d2_gain: 0.8,
            stn_gain: 1.0,
            striatum_weight: 1.0,
            stn_weight: 0.9,
            // Weak enough that the GPi of the weaker channel stays active under close, strong drives.
            gpe_gpi_weight: 0.1,
            gpe_stn_weight: 1.0,
            // A zero threshold lets arbitrarily weak drives reach the selection pathway.
            striatum_bias: 0.0,
            stn_bias: 0.25,
            gpe_bias: 0.2,
            gpi_bias: 0.2,
            output_weight: -3.0,
        }
    }
}

impl BGWeights {
    /// Returns an error if any weight is not finite.
    pub fn validate(&self) -> Result<(), BGError> {
        let weights = [
            ("d1_gain", self.d1_gain),
            ("d2_gain", self.d2_gain),
            ("stn_gain", self.stn_gain),
            ("striatum_weight", self.striatum_weight),
            ("stn_weight", self.stn_weight),
            ("gpe_gpi_weight", self.gpe_gpi_weight),
            ("gpe_stn_weight", self.gpe_stn_weight),
            ("striatum_bias", self.striatum_bias),
            ("stn_bias", self.stn_bias),
            ("gpe_bias", self.gpe_bias),
            ("gpi_bias", self.gpi_bias),
            ("output_weight", self.output_weight),
        ];
        match weights.iter().find(|(_, w)| !w.is_finite()) {
            Some((name, w)) => Err(BGError::InvalidParameter(format!(
                "basal ganglia weight {} must be finite, got {}",
                name, w
            ))),
            None => Ok(()),
        }
    }
}

/// The basal ganglia stage for both channels.
#[derive(Debug, Clone, PartialEq)]
pub struct BasalGanglia {
    weights: BGWeights,
    strd1: Population,
    strd2: Population,
    stn: Population,
    gpe: Population,
    gpi: Population,
}

impl BasalGanglia {
    /// Create the stage at rest, with all populations sharing the same time constant.
    pub fn build(weights: BGWeights, tau: f64) -> Result<Self, BGError> {
        weights.validate()?;
        Ok(BasalGanglia {
            strd1: Population::build("striatum D1", tau, weights.striatum_bias)?,
            strd2: Population::build("striatum D2", tau, weights.striatum_bias)?,
            stn: Population::build("STN", tau, weights.stn_bias)?,
            gpe: Population::build("GPe", tau, weights.gpe_bias)?,
            gpi: Population::build("GPi", tau, weights.gpi_bias)?,
            weights,
        })
    }

    pub fn weights(&self) -> &BGWeights {
        &self.weights
    }

    /// Returns the activity of the D1 striatum, the selection pathway.
    pub fn striatum_output(&self) -> Vector2<f64> {
        self.strd1.output()
    }

    /// Returns the (non-negative) GPi activity, before the output weight is applied.
    pub fn gpi_output(&self) -> Vector2<f64> {
        self.gpi.output()
    }

    fn populations(&self) -> [&Population; 5] {
        [&self.strd1, &self.strd2, &self.stn, &self.gpe, &self.gpi]
    }
}

impl Node for BasalGanglia {
    /// Advance every population by one step; all of them read the rates of the previous step.
    fn step(&mut self, cortex: &Vector2<f64>, dt: f64) {
        let w = &self.weights;
        let d1 = self.strd1.output();
        let d2 = self.strd2.output();
        let stn = self.stn.output();
        let gpe = self.gpe.output();
        let diffuse_stn = Vector2::repeat(stn.sum() * w.stn_weight);

        let d1_input = *cortex * w.d1_gain;
        let d2_input = *cortex * w.d2_gain;
        let stn_input = *cortex * w.stn_gain - gpe * w.gpe_stn_weight;
        let gpe_input = diffuse_stn - d2 * w.striatum_weight;
        let gpi_input = diffuse_stn - d1 * w.striatum_weight - gpe * w.gpe_gpi_weight;

        self.strd1.step(&d1_input, dt);
        self.strd2.step(&d2_input, dt);
        self.stn.step(&stn_input, dt);
        self.gpe.step(&gpe_input, dt);
        self.gpi.step(&gpi_input, dt);
    }

    fn output(&self) -> Vector2<f64> {
        self.gpi.output() * self.weights.output_weight
    }

    fn reset(&mut self) {
        self.strd1.reset();
        self.strd2.reset();
        self.stn.reset();
        self.gpe.reset();
        self.gpi.reset();
    }

    fn is_finite(&self) -> bool {
        self.populations().iter().all(|population| population.is_finite())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::TIME_STEP;

    fn settle(bg: &mut BasalGanglia, cortex: Vector2<f64>) {
        for _ in 0..1000 {
            bg.step(&cortex, TIME_STEP);
        }
    }

    #[test]
    fn test_tonic_gpi_at_rest() {
        let mut bg = BasalGanglia::build(BGWeights::default(), 0.01).unwrap();
        settle(&mut bg, Vector2::zeros());
        let gpi = bg.gpi_output();
        assert!(gpi[0] > 0.0);
        assert_eq!(gpi[0], gpi[1]);
        assert!(bg.output()[0] < 0.0);
    }

    #[test]
    fn test_selective_disinhibition() {
        let mut bg = BasalGanglia::build(BGWeights::default(), 0.01).unwrap();
        settle(&mut bg, Vector2::new(0.8, 0.6));
        let gpi = bg.gpi_output();
        // The GPi of the stronger channel is silenced, the other one is not
        assert!(gpi[0] < gpi[1]);
        assert!(bg.striatum_output()[0] > bg.striatum_output()[1]);
        assert!(bg.is_finite());
    }

    #[test]
    fn test_close_strong_drives() {
        let mut bg = BasalGanglia::build(BGWeights::default(), 0.01).unwrap();
        settle(&mut bg, Vector2::new(2.0, 1.9));
        let gpi = bg.gpi_output();
        // The weaker channel keeps a clearly active GPi, so the selection does not rely on the thalamus
        assert!(gpi[1] > 0.05);
        assert!(gpi[0] < gpi[1]);
    }

    #[test]
    fn test_reset() {
        let mut bg = BasalGanglia::build(BGWeights::default(), 0.01).unwrap();
        let at_rest = bg.clone();
        settle(&mut bg, Vector2::new(0.8, 0.6));
        bg.reset();
        assert_eq!(bg, at_rest);
    }

    #[test]
    fn test_invalid_weights() {
        let weights = BGWeights {
            stn_weight: f64::NAN,
            ..Default::default()
        };
        assert!(matches!(
            BasalGanglia::build(weights, 0.01),
            Err(BGError::InvalidParameter(_))
        ));
        assert!(BasalGanglia::build(BGWeights::default(), 0.0).is_err());
    }
}
