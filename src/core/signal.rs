//! Time functions driving the circuit: cortical drives, FUS modulation windows and the GPi scale.
use nalgebra::Vector2;
use serde::{Deserialize, Serialize};

use super::channel::Channel;
use super::utils::TimeInterval;
use super::NUM_CHANNELS;
use crate::error::BGError;

/// A scalar function of the simulation time.
pub trait Signal {
    /// Returns the value of the signal at the given time.
    fn value(&self, t: f64) -> f64;
}

/// A change of a cortical drive at a given time.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DriveStep {
    /// The channel whose drive changes.
    pub channel: Channel,
    /// The time from which the new value applies.
    pub at: f64,
    /// The new drive value.
    pub value: f64,
}

/// A piecewise-constant cortical drive.
#[derive(Debug, Clone, PartialEq)]
pub struct Drive {
    initial: f64,
    // Sorted by time of application.
    steps: Vec<(f64, f64)>,
}

impl Drive {
    /// Create a constant drive.
    pub fn constant(value: f64) -> Self {
        Drive {
            initial: value,
            steps: vec![],
        }
    }

    /// Create a stepped drive starting at `initial` and switching to `value` at each `(at, value)` step.
    /// If necessary, the steps are sorted.
    /// The function returns an error for non-finite or negative values.
    pub fn stepped(initial: f64, steps: &[(f64, f64)]) -> Result<Self, BGError> {
        if !initial.is_finite() || initial < 0.0 {
            return Err(BGError::InvalidParameter(format!(
                "cortical drive must be finite and non-negative, got {}",
                initial
            )));
        }
        for &(at, value) in steps {
            if !at.is_finite() || !value.is_finite() || value < 0.0 {
                return Err(BGError::InvalidParameter(format!(
                    "invalid drive step ({}, {})",
                    at, value
                )));
            }
        }

        let mut steps = steps.to_vec();
        steps.sort_by(|s1, s2| s1.0.total_cmp(&s2.0));
        Ok(Drive { initial, steps })
    }

    pub fn is_constant(&self) -> bool {
        self.steps.is_empty()
    }
}

impl Signal for Drive {
    fn value(&self, t: f64) -> f64 {
        self.steps
            .iter()
            .take_while(|(at, _)| *at <= t)
            .last()
            .map_or(self.initial, |(_, value)| *value)
    }
}

/// A boxcar window: the level inside [start, start + duration), 1.0 (no effect) outside.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ModulationWindow {
    interval: TimeInterval,
    level: f64,
}

impl ModulationWindow {
    /// Create a modulation window with the given level.
    /// The function returns an error for a negative start, duration or level.
    pub fn build(start: f64, duration: f64, level: f64) -> Result<Self, BGError> {
        if !start.is_finite() || start < 0.0 {
            return Err(BGError::InvalidWindow(format!(
                "start must be finite and non-negative, got {}",
                start
            )));
        }
        if !duration.is_finite() || duration < 0.0 {
            return Err(BGError::InvalidWindow(format!(
                "duration must be finite and non-negative, got {}",
                duration
            )));
        }
        if !level.is_finite() || level < 0.0 {
            return Err(BGError::InvalidWindow(format!(
                "level must be finite and non-negative, got {}",
                level
            )));
        }
        let interval = TimeInterval::build(start, start + duration)?;
        Ok(ModulationWindow { interval, level })
    }

    /// A window scaling its target by (1 - kappa), e.g., a FUS pulse attenuating a cortical drive.
    pub fn attenuation(start: f64, duration: f64, kappa: f64) -> Result<Self, BGError> {
        if !(0.0..=1.0).contains(&kappa) {
            return Err(BGError::InvalidWindow(format!(
                "attenuation fraction must lie in [0, 1], got {}",
                kappa
            )));
        }
        ModulationWindow::build(start, duration, 1.0 - kappa)
    }

    /// A window scaling its target by `scale`, e.g., a FUS pulse suppressing the GPi output.
    pub fn suppression(start: f64, duration: f64, scale: f64) -> Result<Self, BGError> {
        ModulationWindow::build(start, duration, scale)
    }

    pub fn interval(&self) -> &TimeInterval {
        &self.interval
    }

    pub fn level(&self) -> f64 {
        self.level
    }

    pub fn is_active(&self, t: f64) -> bool {
        self.interval.contains(t)
    }
}

impl Signal for ModulationWindow {
    fn value(&self, t: f64) -> f64 {
        if self.is_active(t) {
            self.level
        } else {
            1.0
        }
    }
}

/// The multiplier applied to the GPi output on its way to the thalamus.
/// A tonic scale (1.0 for normal inhibition, 0.0 for a silenced GPi) times an optional suppression pulse.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GpiScale {
    base: f64,
    pulse: Option<ModulationWindow>,
}

impl GpiScale {
    pub fn build(base: f64, pulse: Option<ModulationWindow>) -> Result<Self, BGError> {
        if !base.is_finite() || base < 0.0 {
            return Err(BGError::InvalidParameter(format!(
                "GPi scale must be finite and non-negative, got {}",
                base
            )));
        }
        Ok(GpiScale { base, pulse })
    }

    pub fn base(&self) -> f64 {
        self.base
    }

    pub fn pulse(&self) -> Option<&ModulationWindow> {
        self.pulse.as_ref()
    }
}

impl Signal for GpiScale {
    fn value(&self, t: f64) -> f64 {
        self.base * self.pulse.map_or(1.0, |pulse| pulse.value(t))
    }
}

/// The cortical drives of both channels, with an optional attenuation window on one of them.
#[derive(Debug, Clone, PartialEq)]
pub struct CorticalInput {
    drives: [Drive; NUM_CHANNELS],
    attenuation: Option<(Channel, ModulationWindow)>,
}

impl CorticalInput {
    pub fn new(
        drives: [Drive; NUM_CHANNELS],
        attenuation: Option<(Channel, ModulationWindow)>,
    ) -> Self {
        CorticalInput {
            drives,
            attenuation,
        }
    }

    pub fn drive(&self, channel: Channel) -> &Drive {
        &self.drives[channel.index()]
    }

    /// Returns the effective drive of both channels at the given time.
    pub fn value(&self, t: f64) -> Vector2<f64> {
        let mut values = Vector2::zeros();
        for channel in Channel::ALL {
            values[channel.index()] = self.drive(channel).value(t);
        }
        if let Some((channel, window)) = &self.attenuation {
            values[channel.index()] *= window.value(t);
        }
        values
    }
}
