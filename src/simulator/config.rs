//! The configuration of a simulation run.
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;
use std::str::FromStr;

use crate::core::channel::Channel;
use crate::core::circuit::CircuitParams;
use crate::core::signal::{CorticalInput, Drive, DriveStep, GpiScale, ModulationWindow};
use crate::core::utils::{num_steps, TimeInterval};
use crate::core::TIME_STEP;
use crate::error::BGError;
use crate::simulator::MAX_STEPS;

/// The node modulated by the FUS pulse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FusTarget {
    /// The pulse attenuates the cortical drive of one channel by `kappa`.
    #[default]
    Cortex,
    /// The pulse suppresses the GPi output of both channels by `fus_depth`.
    Gpi,
}

impl FromStr for FusTarget {
    type Err = BGError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "cortex" => Ok(FusTarget::Cortex),
            "gpi" => Ok(FusTarget::Gpi),
            _ => Err(BGError::InvalidParameter(format!(
                "FUS target must be one of: cortex, gpi; got {}",
                s
            ))),
        }
    }
}

impl fmt::Display for FusTarget {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            FusTarget::Cortex => write!(f, "cortex"),
            FusTarget::Gpi => write!(f, "gpi"),
        }
    }
}

/// The parameters of a simulation run.
/// A configuration is a plain value: each run reads it, none modifies it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// The cortical drive of channel 1.
    pub a1: f64,
    /// The cortical drive of channel 2.
    pub a2: f64,
    /// The fraction of the drive removed by the FUS pulse, in [0, 1].
    pub kappa: f64,
    /// The start of the FUS pulse (in seconds).
    pub fus_start: f64,
    /// The duration of the FUS pulse (in seconds).
    pub fus_dur: f64,
    /// The tonic multiplier of the GPi output, 0 for a silenced GPi.
    pub gpi_scale_base: f64,
    /// The simulated duration (in seconds).
    pub run_duration: f64,
    pub fus_target: FusTarget,
    /// The channel whose drive the pulse attenuates.
    pub fus_channel: Channel,
    /// The fraction of the GPi output removed by the pulse, in [0, 1].
    pub fus_depth: f64,
    /// Changes of the cortical drives during the run.
    pub drive_steps: Vec<DriveStep>,
    /// The standard deviation of the Gaussian noise added to the cortical drives.
    pub noise_std: f64,
    pub seed: u64,
    /// The integration time step (in seconds).
    pub dt: f64,
    pub circuit: CircuitParams,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        SimulationConfig {
            a1: 0.8,
            a2: 0.6,
            kappa: 0.6,
            fus_start: 0.5,
            fus_dur: 0.3,
            gpi_scale_base: 1.0,
            run_duration: 1.2,
            fus_target: FusTarget::Cortex,
            fus_channel: Channel::One,
            fus_depth: 0.6,
            drive_steps: vec![],
            noise_std: 0.0,
            seed: 1,
            dt: TIME_STEP,
            circuit: CircuitParams::default(),
        }
    }
}

impl SimulationConfig {
    /// Check every parameter before anything is integrated.
    pub fn validate(&self) -> Result<(), BGError> {
        for (name, value) in [("A1", self.a1), ("A2", self.a2)] {
            if !value.is_finite() || value < 0.0 {
                return Err(BGError::InvalidParameter(format!(
                    "cortical drive {} must be finite and non-negative, got {}",
                    name, value
                )));
            }
        }
        if !(0.0..=1.0).contains(&self.kappa) {
            return Err(BGError::InvalidParameter(format!(
                "kappa must lie in [0, 1], got {}",
                self.kappa
            )));
        }
        if !(0.0..=1.0).contains(&self.fus_depth) {
            return Err(BGError::InvalidParameter(format!(
                "FUS depth must lie in [0, 1], got {}",
                self.fus_depth
            )));
        }
        if !self.run_duration.is_finite() || self.run_duration <= 0.0 {
            return Err(BGError::InvalidParameter(format!(
                "run duration must be finite and positive, got {}",
                self.run_duration
            )));
        }
        if !self.noise_std.is_finite() || self.noise_std < 0.0 {
            return Err(BGError::InvalidParameter(format!(
                "noise standard deviation must be finite and non-negative, got {}",
                self.noise_std
            )));
        }
        self.circuit.validate(self.dt)?;
        if self.run_duration / self.dt > MAX_STEPS as f64 {
            return Err(BGError::InvalidParameter(format!(
                "run duration {} over time step {} exceeds {} steps",
                self.run_duration, self.dt, MAX_STEPS
            )));
        }
        if self.num_steps() == 0 {
            return Err(BGError::InvalidParameter(format!(
                "run duration {} is shorter than the time step {}",
                self.run_duration, self.dt
            )));
        }
        for step in self.drive_steps.iter() {
            if !(0.0..self.run_duration).contains(&step.at) {
                return Err(BGError::InvalidParameter(format!(
                    "drive step of channel {} at {} lies outside the run [0, {})",
                    step.channel, step.at, self.run_duration
                )));
            }
        }

        self.cortical_input()?;
        self.gpi_scale()?;
        Ok(())
    }

    /// The FUS pulse interval [fus_start, fus_start + fus_dur).
    pub fn fus_interval(&self) -> Result<TimeInterval, BGError> {
        Ok(*ModulationWindow::build(self.fus_start, self.fus_dur, 1.0)?.interval())
    }

    /// The number of integration steps of the run.
    pub fn num_steps(&self) -> usize {
        num_steps(self.run_duration, self.dt)
    }

    /// The cortical drives of both channels, attenuated by the pulse if it targets the cortex.
    pub fn cortical_input(&self) -> Result<CorticalInput, BGError> {
        let drive = |channel: Channel, initial: f64| {
            let steps = self
                .drive_steps
                .iter()
                .filter(|step| step.channel == channel)
                .map(|step| (step.at, step.value))
                .collect::<Vec<(f64, f64)>>();
            Drive::stepped(initial, &steps)
        };
        let drives = [drive(Channel::One, self.a1)?, drive(Channel::Two, self.a2)?];

        let attenuation = match self.fus_target {
            FusTarget::Cortex => Some((
                self.fus_channel,
                ModulationWindow::attenuation(self.fus_start, self.fus_dur, self.kappa)?,
            )),
            FusTarget::Gpi => None,
        };
        Ok(CorticalInput::new(drives, attenuation))
    }

    /// The multiplier of the GPi output, with a suppression pulse if it targets the GPi.
    pub fn gpi_scale(&self) -> Result<GpiScale, BGError> {
        let pulse = match self.fus_target {
            FusTarget::Gpi => Some(ModulationWindow::suppression(
                self.fus_start,
                self.fus_dur,
                1.0 - self.fus_depth,
            )?),
            FusTarget::Cortex => None,
        };
        GpiScale::build(self.gpi_scale_base, pulse)
    }

    /// Save the configuration to a file.
    pub fn save_to<P: AsRef<Path>>(&self, path: P) -> Result<(), BGError> {
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, self)?;
        writer.flush()?;
        Ok(())
    }

    /// Load a configuration from a file.
    /// The function returns an error if the loaded configuration is invalid.
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self, BGError> {
        let file = File::open(path)?;
        let reader = BufReader::new(file);
        let config: SimulationConfig = serde_json::from_reader(reader)?;
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::signal::Signal;
    use nalgebra::Vector2;

    #[test]
    fn test_default_config() {
        let config = SimulationConfig::default();
        assert_eq!(config.validate(), Ok(()));
        assert_eq!(config.num_steps(), 1200);
        assert_eq!(config.fus_interval().unwrap(), TimeInterval::build(0.5, 0.8).unwrap());
    }

    #[test]
    fn test_cortex_target() {
        let config = SimulationConfig {
            a1: 1.0,
            a2: 0.5,
            kappa: 0.5,
            fus_start: 1.0,
            fus_dur: 1.0,
            ..Default::default()
        };
        let input = config.cortical_input().unwrap();
        assert_eq!(input.value(0.5), Vector2::new(1.0, 0.5));
        assert_eq!(input.value(1.5), Vector2::new(0.5, 0.5));
        assert_eq!(config.gpi_scale().unwrap().value(1.5), 1.0);

        let config = SimulationConfig {
            fus_channel: Channel::Two,
            ..config
        };
        assert_eq!(config.cortical_input().unwrap().value(1.5), Vector2::new(1.0, 0.25));
    }

    #[test]
    fn test_gpi_target() {
        let config = SimulationConfig {
            fus_target: FusTarget::Gpi,
            fus_depth: 0.75,
            gpi_scale_base: 0.8,
            ..Default::default()
        };
        let scale = config.gpi_scale().unwrap();
        assert_eq!(scale.value(0.1), 0.8);
        assert_eq!(scale.value(0.6), 0.8 * 0.25);
        // The drives are left untouched
        assert_eq!(config.cortical_input().unwrap().value(0.6), Vector2::new(0.8, 0.6));
    }

    #[test]
    fn test_drive_steps() {
        let config = SimulationConfig {
            drive_steps: vec![DriveStep {
                channel: Channel::Two,
                at: 0.4,
                value: 1.0,
            }],
            kappa: 0.0,
            ..Default::default()
        };
        assert_eq!(config.validate(), Ok(()));
        let input = config.cortical_input().unwrap();
        assert_eq!(input.value(0.3), Vector2::new(0.8, 0.6));
        assert_eq!(input.value(0.4), Vector2::new(0.8, 1.0));
        assert!(input.drive(Channel::One).is_constant());
    }

    #[test]
    fn test_step_count_is_bounded() {
        let config = SimulationConfig {
            run_duration: 1.0,
            dt: 1e-6,
            ..Default::default()
        };
        assert_eq!(config.validate(), Ok(()));

        let config = SimulationConfig {
            dt: 1e-300,
            ..config
        };
        assert!(matches!(config.validate(), Err(BGError::InvalidParameter(_))));
    }

    #[test]
    fn test_fus_target_from_str() {
        assert_eq!(FusTarget::from_str("GPi"), Ok(FusTarget::Gpi));
        assert_eq!(FusTarget::from_str("cortex"), Ok(FusTarget::Cortex));
        assert!(FusTarget::from_str("striatum").is_err());
        assert_eq!(FusTarget::Gpi.to_string(), "gpi");
    }

    #[test]
    fn test_partial_json() {
        let config: SimulationConfig =
            serde_json::from_str(r#"{"a1": 1.0, "fus_target": "gpi", "fus_channel": 2}"#).unwrap();
        assert_eq!(config.a1, 1.0);
        assert_eq!(config.a2, 0.6);
        assert_eq!(config.fus_target, FusTarget::Gpi);
        assert_eq!(config.fus_channel, Channel::Two);
    }
}
